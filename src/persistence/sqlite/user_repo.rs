//! SQLite-backed repository for provisioned users.

use sqlx::SqlitePool;

use super::helpers::{decode_role, encode_role};
use crate::identity::Role;
use crate::persistence::traits::UserRepository;
use crate::persistence::{now_timestamp, PersistenceError, UserRecord};

/// Row type for user queries, mapped via `sqlx::FromRow`.
#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: i64,
    subject_id: String,
    email: String,
    first_name: String,
    last_name: String,
    role: String,
    created_at: i64,
    updated_at: i64,
}

impl From<UserRow> for UserRecord {
    fn from(r: UserRow) -> Self {
        Self {
            user_id: r.user_id,
            subject_id: r.subject_id,
            email: r.email,
            first_name: r.first_name,
            last_name: r.last_name,
            role: decode_role(&r.role),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

const SELECT_USER: &str = r#"
    SELECT user_id, subject_id, email, first_name, last_name, role,
           created_at, updated_at
    FROM users
"#;

/// SQLite implementation of [`UserRepository`].
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl UserRepository for SqliteUserRepository {
    async fn create_user(
        &self,
        subject_id: &str,
        email: &str,
        first_name: &str,
        last_name: &str,
        role: Role,
    ) -> Result<UserRecord, PersistenceError> {
        let now = now_timestamp();
        let result = sqlx::query(
            r#"
            INSERT INTO users
                (subject_id, email, first_name, last_name, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(subject_id)
        .bind(email)
        .bind(first_name)
        .bind(last_name)
        .bind(encode_role(role))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(UserRecord {
            user_id: result.last_insert_rowid(),
            subject_id: subject_id.to_string(),
            email: email.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            role,
            created_at: now,
            updated_at: now,
        })
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<UserRecord>, PersistenceError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("{SELECT_USER} WHERE user_id = ?"))
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(UserRecord::from))
    }

    async fn find_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserRecord>, PersistenceError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{SELECT_USER} WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(UserRecord::from))
    }

    async fn update_user_role(&self, user_id: i64, role: Role) -> Result<(), PersistenceError> {
        sqlx::query("UPDATE users SET role = ?, updated_at = ? WHERE user_id = ?")
            .bind(encode_role(role))
            .bind(now_timestamp())
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::sqlite::Database;

    async fn test_db() -> (Database, SqliteUserRepository) {
        let db = Database::new_in_memory().await.unwrap();
        let repo = SqliteUserRepository::new(db.pool().clone());
        (db, repo)
    }

    #[tokio::test]
    async fn test_create_and_find_by_email() {
        let (_db, repo) = test_db().await;
        let user = repo
            .create_user("subj-1", "ada@example.com", "Ada", "Lovelace", Role::Student)
            .await
            .unwrap();
        assert!(user.user_id > 0);

        let found = repo.find_user_by_email("ada@example.com").await.unwrap();
        assert_eq!(found, Some(user));
    }

    #[tokio::test]
    async fn test_find_nonexistent() {
        let (_db, repo) = test_db().await;
        assert!(repo.find_user(42).await.unwrap().is_none());
        assert!(repo
            .find_user_by_email("nobody@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let (_db, repo) = test_db().await;
        repo.create_user("subj-1", "dup@example.com", "A", "B", Role::Student)
            .await
            .unwrap();
        let err = repo
            .create_user("subj-2", "dup@example.com", "C", "D", Role::Student)
            .await
            .unwrap_err();
        assert!(matches!(err, PersistenceError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_role() {
        let (_db, repo) = test_db().await;
        let user = repo
            .create_user("subj-1", "x@example.com", "X", "", Role::Student)
            .await
            .unwrap();
        repo.update_user_role(user.user_id, Role::Instructor)
            .await
            .unwrap();
        let found = repo.find_user(user.user_id).await.unwrap().unwrap();
        assert_eq!(found.role, Role::Instructor);
    }
}
