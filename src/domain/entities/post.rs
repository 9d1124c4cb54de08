//! Post entity and repository trait.
//!
//! Maps to the `posts` table in the blog schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// A published blog post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,

    /// Author's user ID
    pub user_id: Uuid,

    /// Author display name (1-80 characters)
    pub owner_name: String,

    /// Post title (1-80 characters)
    pub title: String,

    /// URL slug, unique (1-80 characters)
    pub slug: String,

    /// Sanitized body text
    pub description: String,

    /// Category this post belongs to
    pub category_id: Uuid,

    /// Visit counter, starts at 1 when the post is created
    pub visit_count: i64,

    /// Stored name of the cover image, as generated by the file store
    pub image_name: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Repository trait for Post data access operations.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Find a post by its ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, AppError>;

    /// Whether any post already uses `slug`.
    async fn slug_exists(&self, slug: &str) -> Result<bool, AppError>;

    /// Whether the category still holds at least one post.
    async fn exists_in_category(&self, category_id: Uuid) -> Result<bool, AppError>;

    /// Create a new post.
    async fn create(&self, post: &Post) -> Result<Post, AppError>;

    /// Update an existing post.
    async fn update(&self, post: &Post) -> Result<Post, AppError>;

    /// Delete a post by ID.
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}
