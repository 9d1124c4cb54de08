//! Blog Service
//!
//! Category and post management for the blog module.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::domain::{
    Category, CategoryRepository, Post, PostCreated, PostDeleted, PostRepository,
};
use crate::events::{Notification, Publisher};
use crate::infrastructure::storage::{FileStore, UploadedFile};
use crate::shared::validation::{sanitize_text, validation_message};

/// Directory post cover images are stored under.
const POST_IMAGE_DIR: &str = "post-images";

/// Blog service trait
#[async_trait]
pub trait BlogService: Send + Sync {
    /// Create a new category
    async fn create_category(
        &self,
        command: CreateCategoryCommand,
    ) -> Result<CategoryDto, BlogError>;

    /// Update an existing category's title and slug
    async fn edit_category(&self, command: EditCategoryCommand) -> Result<CategoryDto, BlogError>;

    /// Delete an empty category
    async fn delete_category(&self, category_id: Uuid) -> Result<(), BlogError>;

    /// All categories, oldest first
    async fn get_all_categories(&self) -> Result<Vec<CategoryDto>, BlogError>;

    /// Get a category by ID
    async fn get_category(&self, category_id: Uuid) -> Result<CategoryDto, BlogError>;

    /// Create a new post with its cover image
    async fn create_post(&self, command: CreatePostCommand) -> Result<PostDto, BlogError>;

    /// Update an existing post, optionally replacing its cover image
    async fn edit_post(&self, command: EditPostCommand) -> Result<PostDto, BlogError>;

    /// Delete a post and its stored cover image
    async fn delete_post(&self, post_id: Uuid) -> Result<(), BlogError>;

    /// Get a post by ID
    async fn get_post(&self, post_id: Uuid) -> Result<PostDto, BlogError>;
}

/// Create category request
#[derive(Debug, Clone, Validate)]
pub struct CreateCategoryCommand {
    #[validate(length(min = 1, max = 80))]
    pub title: String,

    #[validate(length(min = 1, max = 80))]
    pub slug: String,
}

/// Edit category request
#[derive(Debug, Clone, Validate)]
pub struct EditCategoryCommand {
    pub id: Uuid,

    #[validate(length(min = 1, max = 80))]
    pub title: String,

    #[validate(length(min = 1, max = 80))]
    pub slug: String,
}

/// Create post request
#[derive(Debug, Clone, Validate)]
pub struct CreatePostCommand {
    pub user_id: Uuid,
    pub category_id: Uuid,

    #[validate(length(min = 1, max = 80))]
    pub owner_name: String,

    #[validate(length(min = 1, max = 80))]
    pub title: String,

    #[validate(length(min = 1, max = 80))]
    pub slug: String,

    #[validate(length(min = 1))]
    pub description: String,

    pub image_file: UploadedFile,
}

/// Edit post request
#[derive(Debug, Clone, Validate)]
pub struct EditPostCommand {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,

    #[validate(length(min = 1, max = 80))]
    pub owner_name: String,

    #[validate(length(min = 1, max = 80))]
    pub title: String,

    #[validate(length(min = 1, max = 80))]
    pub slug: String,

    #[validate(length(min = 1))]
    pub description: String,

    /// Replacement cover image; the current one is kept when absent
    pub image_file: Option<UploadedFile>,
}

/// Category data transfer object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDto {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub created_at: String,
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        Self {
            id: category.id.to_string(),
            title: category.title,
            slug: category.slug,
            created_at: category.created_at.to_rfc3339(),
        }
    }
}

/// Post data transfer object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDto {
    pub id: String,
    pub user_id: String,
    pub owner_name: String,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub category_id: String,
    pub visit_count: i64,
    pub image_name: String,
    pub created_at: String,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id.to_string(),
            user_id: post.user_id.to_string(),
            owner_name: post.owner_name,
            title: post.title,
            slug: post.slug,
            description: post.description,
            category_id: post.category_id.to_string(),
            visit_count: post.visit_count,
            image_name: post.image_name,
            created_at: post.created_at.to_rfc3339(),
        }
    }
}

/// Blog service errors
#[derive(Debug, thiserror::Error)]
pub enum BlogError {
    #[error("Category not found")]
    CategoryNotFound,

    #[error("Post not found")]
    PostNotFound,

    #[error("Slug is already taken")]
    SlugTaken,

    #[error("Category still contains posts")]
    CategoryNotEmpty,

    #[error("Uploaded file is not a valid image")]
    InvalidImage,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// BlogService implementation
pub struct BlogServiceImpl<C, P, F>
where
    C: CategoryRepository,
    P: PostRepository,
    F: FileStore,
{
    category_repo: Arc<C>,
    post_repo: Arc<P>,
    file_store: Arc<F>,
    publisher: Arc<Publisher>,
}

impl<C, P, F> BlogServiceImpl<C, P, F>
where
    C: CategoryRepository,
    P: PostRepository,
    F: FileStore,
{
    pub fn new(
        category_repo: Arc<C>,
        post_repo: Arc<P>,
        file_store: Arc<F>,
        publisher: Arc<Publisher>,
    ) -> Self {
        Self {
            category_repo,
            post_repo,
            file_store,
            publisher,
        }
    }

    fn validate<T: Validate>(command: &T) -> Result<(), BlogError> {
        command
            .validate()
            .map_err(|e| BlogError::Validation(validation_message(&e)))
    }

    /// Event publication is a side effect of an already persisted change; a
    /// failing handler must not fail the operation.
    async fn publish_event<N: Notification>(&self, event: N) {
        if let Err(error) = self.publisher.publish(event).await {
            tracing::warn!(%error, "failed to publish blog event");
        }
    }
}

#[async_trait]
impl<C, P, F> BlogService for BlogServiceImpl<C, P, F>
where
    C: CategoryRepository + 'static,
    P: PostRepository + 'static,
    F: FileStore + 'static,
{
    async fn create_category(
        &self,
        command: CreateCategoryCommand,
    ) -> Result<CategoryDto, BlogError> {
        Self::validate(&command)?;

        if self
            .category_repo
            .slug_exists(&command.slug)
            .await
            .map_err(|e| BlogError::Internal(e.to_string()))?
        {
            return Err(BlogError::SlugTaken);
        }

        let category = Category::new(command.title, command.slug);
        let created = self
            .category_repo
            .create(&category)
            .await
            .map_err(|e| BlogError::Internal(e.to_string()))?;

        Ok(CategoryDto::from(created))
    }

    async fn edit_category(&self, command: EditCategoryCommand) -> Result<CategoryDto, BlogError> {
        Self::validate(&command)?;

        let mut category = self
            .category_repo
            .find_by_id(command.id)
            .await
            .map_err(|e| BlogError::Internal(e.to_string()))?
            .ok_or(BlogError::CategoryNotFound)?;

        // The slug stays reserved for this category; only a changed slug
        // needs a collision check.
        if category.slug != command.slug
            && self
                .category_repo
                .slug_exists(&command.slug)
                .await
                .map_err(|e| BlogError::Internal(e.to_string()))?
        {
            return Err(BlogError::SlugTaken);
        }

        category.title = command.title;
        category.slug = command.slug;

        let updated = self
            .category_repo
            .update(&category)
            .await
            .map_err(|e| BlogError::Internal(e.to_string()))?;

        Ok(CategoryDto::from(updated))
    }

    async fn delete_category(&self, category_id: Uuid) -> Result<(), BlogError> {
        self.category_repo
            .find_by_id(category_id)
            .await
            .map_err(|e| BlogError::Internal(e.to_string()))?
            .ok_or(BlogError::CategoryNotFound)?;

        if self
            .post_repo
            .exists_in_category(category_id)
            .await
            .map_err(|e| BlogError::Internal(e.to_string()))?
        {
            return Err(BlogError::CategoryNotEmpty);
        }

        self.category_repo
            .delete(category_id)
            .await
            .map_err(|e| BlogError::Internal(e.to_string()))?;

        Ok(())
    }

    async fn get_all_categories(&self) -> Result<Vec<CategoryDto>, BlogError> {
        let categories = self
            .category_repo
            .find_all()
            .await
            .map_err(|e| BlogError::Internal(e.to_string()))?;

        Ok(categories.into_iter().map(CategoryDto::from).collect())
    }

    async fn get_category(&self, category_id: Uuid) -> Result<CategoryDto, BlogError> {
        let category = self
            .category_repo
            .find_by_id(category_id)
            .await
            .map_err(|e| BlogError::Internal(e.to_string()))?
            .ok_or(BlogError::CategoryNotFound)?;

        Ok(CategoryDto::from(category))
    }

    async fn create_post(&self, command: CreatePostCommand) -> Result<PostDto, BlogError> {
        Self::validate(&command)?;

        if self
            .post_repo
            .slug_exists(&command.slug)
            .await
            .map_err(|e| BlogError::Internal(e.to_string()))?
        {
            return Err(BlogError::SlugTaken);
        }

        if !command.image_file.is_image() {
            return Err(BlogError::InvalidImage);
        }

        let image_name = self
            .file_store
            .save(POST_IMAGE_DIR, &command.image_file)
            .await
            .map_err(|e| BlogError::Internal(e.to_string()))?;

        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            user_id: command.user_id,
            owner_name: command.owner_name,
            title: command.title,
            slug: command.slug,
            description: sanitize_text(&command.description),
            category_id: command.category_id,
            visit_count: 1,
            image_name,
            created_at: now,
            updated_at: now,
        };

        let created = self
            .post_repo
            .create(&post)
            .await
            .map_err(|e| BlogError::Internal(e.to_string()))?;

        self.publish_event(PostCreated {
            post_id: created.id,
            category_id: created.category_id,
            user_id: created.user_id,
            title: created.title.clone(),
            slug: created.slug.clone(),
        })
        .await;

        Ok(PostDto::from(created))
    }

    async fn edit_post(&self, command: EditPostCommand) -> Result<PostDto, BlogError> {
        Self::validate(&command)?;

        let mut post = self
            .post_repo
            .find_by_id(command.id)
            .await
            .map_err(|e| BlogError::Internal(e.to_string()))?
            .ok_or(BlogError::PostNotFound)?;

        if post.slug != command.slug
            && self
                .post_repo
                .slug_exists(&command.slug)
                .await
                .map_err(|e| BlogError::Internal(e.to_string()))?
        {
            return Err(BlogError::SlugTaken);
        }

        if let Some(image_file) = &command.image_file {
            if !image_file.is_image() {
                return Err(BlogError::InvalidImage);
            }
            post.image_name = self
                .file_store
                .save(POST_IMAGE_DIR, image_file)
                .await
                .map_err(|e| BlogError::Internal(e.to_string()))?;
        }

        post.user_id = command.user_id;
        post.owner_name = command.owner_name;
        post.title = command.title;
        post.slug = command.slug;
        post.description = sanitize_text(&command.description);
        post.category_id = command.category_id;

        let updated = self
            .post_repo
            .update(&post)
            .await
            .map_err(|e| BlogError::Internal(e.to_string()))?;

        Ok(PostDto::from(updated))
    }

    async fn delete_post(&self, post_id: Uuid) -> Result<(), BlogError> {
        let post = self
            .post_repo
            .find_by_id(post_id)
            .await
            .map_err(|e| BlogError::Internal(e.to_string()))?
            .ok_or(BlogError::PostNotFound)?;

        self.post_repo
            .delete(post_id)
            .await
            .map_err(|e| BlogError::Internal(e.to_string()))?;

        // The row is gone; a stale image on disk is worth a warning, not a
        // failed delete.
        if let Err(error) = self.file_store.delete(POST_IMAGE_DIR, &post.image_name).await {
            tracing::warn!(%error, image = %post.image_name, "failed to delete post image");
        }

        self.publish_event(PostDeleted { post_id }).await;

        Ok(())
    }

    async fn get_post(&self, post_id: Uuid) -> Result<PostDto, BlogError> {
        let post = self
            .post_repo
            .find_by_id(post_id)
            .await
            .map_err(|e| BlogError::Internal(e.to_string()))?
            .ok_or(BlogError::PostNotFound)?;

        Ok(PostDto::from(post))
    }
}
