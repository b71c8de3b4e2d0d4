//! Category management.
//!
//! Categories are simple named groupings, but two state guards matter:
//! names are unique, and a category referenced by courses cannot be
//! deleted.

use crate::error::ServiceError;
use crate::persistence::traits::{CategoryRepository, CourseRepository};
use crate::persistence::CategoryRecord;

pub struct CategoryManager<Cat, C> {
    categories: Cat,
    courses: C,
}

impl<Cat, C> CategoryManager<Cat, C>
where
    Cat: CategoryRepository,
    C: CourseRepository,
{
    pub fn new(categories: Cat, courses: C) -> Self {
        Self { categories, courses }
    }

    pub async fn create_category(
        &self,
        name: &str,
        description: &str,
    ) -> Result<CategoryRecord, ServiceError> {
        if name.trim().is_empty() {
            return Err(ServiceError::InvalidArgument(
                "category name must not be empty".to_string(),
            ));
        }
        if self.categories.find_category_by_name(name).await?.is_some() {
            return Err(ServiceError::InvalidState(
                "category with this name already exists".to_string(),
            ));
        }
        let category = self.categories.create_category(name, description).await?;
        tracing::info!(category_id = category.category_id, "created category");
        Ok(category)
    }

    pub async fn update_category(
        &self,
        category_id: i64,
        name: &str,
        description: &str,
    ) -> Result<CategoryRecord, ServiceError> {
        let mut category = self.require_category(category_id).await?;

        if let Some(existing) = self.categories.find_category_by_name(name).await? {
            if existing.category_id != category_id {
                return Err(ServiceError::InvalidState(
                    "category with this name already exists".to_string(),
                ));
            }
        }

        category.name = name.to_string();
        category.description = description.to_string();
        self.categories.save_category(&category).await?;
        Ok(category)
    }

    /// Delete a category. Fails while any course references it.
    pub async fn delete_category(&self, category_id: i64) -> Result<(), ServiceError> {
        self.require_category(category_id).await?;

        let referencing = self.courses.courses_by_category(category_id).await?;
        if !referencing.is_empty() {
            return Err(ServiceError::InvalidState(
                "cannot delete category that has associated courses".to_string(),
            ));
        }

        self.categories.delete_category(category_id).await?;
        tracing::info!(category_id, "deleted category");
        Ok(())
    }

    pub async fn get_category(&self, category_id: i64) -> Result<CategoryRecord, ServiceError> {
        self.require_category(category_id).await
    }

    pub async fn list_categories(&self) -> Result<Vec<CategoryRecord>, ServiceError> {
        Ok(self.categories.list_categories().await?)
    }

    async fn require_category(&self, category_id: i64) -> Result<CategoryRecord, ServiceError> {
        self.categories
            .find_category(category_id)
            .await?
            .ok_or(ServiceError::NotFound("category"))
    }
}
