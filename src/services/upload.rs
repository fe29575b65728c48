//! Image upload storage
//!
//! Uploaded images are written under `<public_dir>/uploads` and referenced by
//! their public path (`/uploads/<millis>-<uuid>.<ext>`). Only the extension of
//! the client-supplied name is kept.

use crate::config::UploadConfig;
use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// Public path prefix for uploaded images
pub const UPLOADS_PREFIX: &str = "/uploads/";

/// An image received from a client
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

impl ImageUpload {
    pub fn new(bytes: Vec<u8>, file_name: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            file_name: file_name.into(),
            content_type: content_type.into(),
        }
    }
}

/// Error types for image storage
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Invalid file type: {0}")]
    InvalidType(String),

    #[error("File too large ({size} bytes). Maximum size: {max} bytes")]
    TooLarge { size: u64, max: u64 },

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Storage backend for uploaded images
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Persist an image and return its public reference
    async fn store(&self, upload: &ImageUpload) -> Result<String, UploadError>;

    /// Remove a previously stored image.
    ///
    /// Returns `Ok(false)` when the file was already gone. References outside
    /// the uploads directory are rejected without touching the filesystem.
    async fn delete(&self, reference: &str) -> anyhow::Result<bool>;
}

/// Image storage on the local filesystem
pub struct LocalImageStorage {
    config: UploadConfig,
}

impl LocalImageStorage {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    fn validate(&self, upload: &ImageUpload) -> Result<(), UploadError> {
        if !self.config.is_type_allowed(&upload.content_type) {
            return Err(UploadError::InvalidType(upload.content_type.clone()));
        }

        let size = upload.bytes.len() as u64;
        if size > self.config.max_file_size {
            return Err(UploadError::TooLarge {
                size,
                max: self.config.max_file_size,
            });
        }
        Ok(())
    }

    /// Map a public reference to a file path, refusing anything that could
    /// escape the uploads directory
    fn resolve(&self, reference: &str) -> Option<PathBuf> {
        let name = reference.strip_prefix(UPLOADS_PREFIX)?;
        if name.is_empty() || name.contains("..") || name.contains('/') || name.contains('\\') {
            return None;
        }
        Some(self.config.uploads_dir().join(name))
    }
}

#[async_trait]
impl ImageStorage for LocalImageStorage {
    async fn store(&self, upload: &ImageUpload) -> Result<String, UploadError> {
        self.validate(upload)?;

        let dir = self.config.uploads_dir();
        ensure_upload_dir(&dir).await?;

        let ext = get_extension(&upload.file_name, &upload.content_type);
        let file_name = format!("{}-{}.{}", Utc::now().timestamp_millis(), Uuid::new_v4(), ext);
        let file_path = dir.join(&file_name);

        fs::write(&file_path, &upload.bytes)
            .await
            .with_context(|| format!("Failed to save file {}", file_path.display()))?;

        tracing::debug!("Stored image {} ({} bytes)", file_name, upload.bytes.len());
        Ok(format!("{}{}", UPLOADS_PREFIX, file_name))
    }

    async fn delete(&self, reference: &str) -> anyhow::Result<bool> {
        let path = self
            .resolve(reference)
            .with_context(|| format!("Refusing to delete image outside uploads: {}", reference))?;

        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Failed to delete file {}", path.display())),
        }
    }
}

async fn ensure_upload_dir(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .await
            .with_context(|| format!("Failed to create upload dir {}", path.display()))?;
    }
    Ok(())
}

/// Get file extension from filename or content type
fn get_extension(filename: &str, content_type: &str) -> String {
    let from_name = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()));
    if let Some(ext) = from_name {
        return ext.to_ascii_lowercase();
    }

    match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        "image/bmp" => "bmp",
        "image/x-icon" => "ico",
        _ => "bin",
    }
    .to_string()
}
