//! SQLite-backed repository for course categories.

use sqlx::SqlitePool;

use crate::persistence::traits::CategoryRepository;
use crate::persistence::{CategoryRecord, PersistenceError};

/// SQLite implementation of [`CategoryRepository`].
pub struct SqliteCategoryRepository {
    pool: SqlitePool,
}

impl SqliteCategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl CategoryRepository for SqliteCategoryRepository {
    async fn create_category(
        &self,
        name: &str,
        description: &str,
    ) -> Result<CategoryRecord, PersistenceError> {
        let result = sqlx::query("INSERT INTO categories (name, description) VALUES (?, ?)")
            .bind(name)
            .bind(description)
            .execute(&self.pool)
            .await?;

        Ok(CategoryRecord {
            category_id: result.last_insert_rowid(),
            name: name.to_string(),
            description: description.to_string(),
        })
    }

    async fn find_category(
        &self,
        category_id: i64,
    ) -> Result<Option<CategoryRecord>, PersistenceError> {
        let row: Option<(i64, String, String)> = sqlx::query_as(
            "SELECT category_id, name, description FROM categories WHERE category_id = ?",
        )
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(category_id, name, description)| CategoryRecord {
            category_id,
            name,
            description,
        }))
    }

    async fn find_category_by_name(
        &self,
        name: &str,
    ) -> Result<Option<CategoryRecord>, PersistenceError> {
        let row: Option<(i64, String, String)> = sqlx::query_as(
            "SELECT category_id, name, description FROM categories WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(category_id, name, description)| CategoryRecord {
            category_id,
            name,
            description,
        }))
    }

    async fn save_category(&self, category: &CategoryRecord) -> Result<(), PersistenceError> {
        sqlx::query("UPDATE categories SET name = ?, description = ? WHERE category_id = ?")
            .bind(&category.name)
            .bind(&category.description)
            .bind(category.category_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, PersistenceError> {
        let rows: Vec<(i64, String, String)> =
            sqlx::query_as("SELECT category_id, name, description FROM categories ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(category_id, name, description)| CategoryRecord {
                category_id,
                name,
                description,
            })
            .collect())
    }

    async fn delete_category(&self, category_id: i64) -> Result<(), PersistenceError> {
        sqlx::query("DELETE FROM categories WHERE category_id = ?")
            .bind(category_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
