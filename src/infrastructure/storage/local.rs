//! Local filesystem implementation of the file store.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use crate::shared::error::AppError;

use super::{FileStore, UploadedFile};

/// Stores files under `<root>/<directory>/<generated-name>`.
///
/// Stored names are freshly generated UUIDs carrying over the original
/// extension, so a stored name never collides and never echoes
/// client-controlled path segments.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn generate_name(file: &UploadedFile) -> String {
        match file.extension() {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        }
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn save(&self, directory: &str, file: &UploadedFile) -> Result<String, AppError> {
        let dir = self.root.join(directory);
        fs::create_dir_all(&dir).await?;

        let stored_name = Self::generate_name(file);
        fs::write(dir.join(&stored_name), &file.bytes).await?;

        Ok(stored_name)
    }

    async fn delete(&self, directory: &str, stored_name: &str) -> Result<(), AppError> {
        let path = self.root.join(directory).join(stored_name);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
