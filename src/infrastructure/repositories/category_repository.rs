//! Category Repository Implementation
//!
//! PostgreSQL implementation of the CategoryRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Category, CategoryRepository};
use crate::shared::error::AppError;

/// Database row representation matching the categories table schema.
#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    title: String,
    slug: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CategoryRow {
    fn into_category(self) -> Category {
        Category {
            id: self.id,
            title: self.title,
            slug: self.slug,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// PostgreSQL category repository implementation.
#[derive(Clone)]
pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, AppError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, title, slug, created_at, updated_at
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_category()))
    }

    async fn find_all(&self) -> Result<Vec<Category>, AppError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, title, slug, created_at, updated_at
            FROM categories
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_category()).collect())
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM categories WHERE slug = $1)
            "#,
        )
        .bind(slug)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn create(&self, category: &Category) -> Result<Category, AppError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            INSERT INTO categories (id, title, slug, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, slug, created_at, updated_at
            "#,
        )
        .bind(category.id)
        .bind(&category.title)
        .bind(&category.slug)
        .bind(category.created_at)
        .bind(category.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_category())
    }

    async fn update(&self, category: &Category) -> Result<Category, AppError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            UPDATE categories
            SET title = $2, slug = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, slug, created_at, updated_at
            "#,
        )
        .bind(category.id)
        .bind(&category.title)
        .bind(&category.slug)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_category())
            .ok_or_else(|| AppError::NotFound(format!("Category with id {} not found", category.id)))
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Category with id {} not found",
                id
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Integration tests would go here, requiring a test database
}
