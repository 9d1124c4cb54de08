//! Post Repository Implementation
//!
//! PostgreSQL implementation of the PostRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Post, PostRepository};
use crate::shared::error::AppError;

/// Database row representation matching the posts table schema.
#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    user_id: Uuid,
    owner_name: String,
    title: String,
    slug: String,
    description: String,
    category_id: Uuid,
    visit_count: i64,
    image_name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PostRow {
    fn into_post(self) -> Post {
        Post {
            id: self.id,
            user_id: self.user_id,
            owner_name: self.owner_name,
            title: self.title,
            slug: self.slug,
            description: self.description,
            category_id: self.category_id,
            visit_count: self.visit_count,
            image_name: self.image_name,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const POST_COLUMNS: &str = "id, user_id, owner_name, title, slug, description, category_id, \
                            visit_count, image_name, created_at, updated_at";

/// PostgreSQL post repository implementation.
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, AppError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_post()))
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM posts WHERE slug = $1)
            "#,
        )
        .bind(slug)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn exists_in_category(&self, category_id: Uuid) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM posts WHERE category_id = $1)
            "#,
        )
        .bind(category_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn create(&self, post: &Post) -> Result<Post, AppError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "INSERT INTO posts ({POST_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {POST_COLUMNS}"
        ))
        .bind(post.id)
        .bind(post.user_id)
        .bind(&post.owner_name)
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.description)
        .bind(post.category_id)
        .bind(post.visit_count)
        .bind(&post.image_name)
        .bind(post.created_at)
        .bind(post.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_post())
    }

    async fn update(&self, post: &Post) -> Result<Post, AppError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "UPDATE posts
             SET user_id = $2, owner_name = $3, title = $4, slug = $5, description = $6,
                 category_id = $7, image_name = $8, updated_at = NOW()
             WHERE id = $1
             RETURNING {POST_COLUMNS}"
        ))
        .bind(post.id)
        .bind(post.user_id)
        .bind(&post.owner_name)
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.description)
        .bind(post.category_id)
        .bind(&post.image_name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_post())
            .ok_or_else(|| AppError::NotFound(format!("Post with id {} not found", post.id)))
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Post with id {} not found", id)));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Integration tests would go here, requiring a test database
}
