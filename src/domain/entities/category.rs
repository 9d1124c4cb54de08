//! Category entity and repository trait.
//!
//! Maps to the `categories` table in the blog schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// A blog category. The slug is unique across categories and doubles as the
/// category's URL segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,

    /// Display title (1-80 characters)
    pub title: String,

    /// URL slug, unique (1-80 characters)
    pub slug: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(title: String, slug: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            slug,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Repository trait for Category data access operations.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Find a category by its ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, AppError>;

    /// All categories, oldest first.
    async fn find_all(&self) -> Result<Vec<Category>, AppError>;

    /// Whether any category already uses `slug`.
    async fn slug_exists(&self, slug: &str) -> Result<bool, AppError>;

    /// Create a new category.
    async fn create(&self, category: &Category) -> Result<Category, AppError>;

    /// Update an existing category.
    async fn update(&self, category: &Category) -> Result<Category, AppError>;

    /// Delete a category by ID.
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}
