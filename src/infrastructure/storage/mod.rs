//! File storage collaborators.
//!
//! The services only see the narrow [`FileStore`] contract; the default
//! implementation writes to a directory tree on the local filesystem.

pub mod local;

pub use local::LocalFileStore;

use async_trait::async_trait;

use crate::shared::error::AppError;

/// Image extensions accepted for post uploads.
const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// An uploaded file: the client-provided name plus raw content.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Lowercased extension of the client-provided name, if any.
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }

    /// Extension allow-list check for image uploads.
    pub fn is_image(&self) -> bool {
        self.extension()
            .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false)
    }
}

/// Narrow contract for storing binary files grouped by directory.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store `file` under `directory`, returning the generated stored name.
    async fn save(&self, directory: &str, file: &UploadedFile) -> Result<String, AppError>;

    /// Remove a previously stored file. Deleting a missing file is not an
    /// error.
    async fn delete(&self, directory: &str, stored_name: &str) -> Result<(), AppError>;
}
