use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

pub(crate) const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
const ALLOWED_IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) author_id: i64,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) image: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
}

/// Post joined with its author's username.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PostDetail {
    pub(crate) id: i64,
    pub(crate) author_id: i64,
    pub(crate) author: String,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) image: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
}

/// An uploaded file as received from the client, not yet checked.
#[derive(Debug, Clone)]
pub(crate) struct ImageUpload {
    pub(crate) file_name: String,
    pub(crate) bytes: Vec<u8>,
}

/// An upload that passed the size and extension checks.
#[derive(Debug, Clone)]
pub(crate) struct ValidatedImage {
    pub(crate) extension: &'static str,
    pub(crate) bytes: Vec<u8>,
}

impl ImageUpload {
    pub(crate) fn validate(self) -> Result<ValidatedImage, DomainError> {
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(DomainError::validation(
                "image",
                "file size cannot exceed 5MB",
            ));
        }

        let extension = Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .and_then(|ext| {
                ALLOWED_IMAGE_EXTENSIONS
                    .iter()
                    .copied()
                    .find(|allowed| *allowed == ext)
            })
            .ok_or(DomainError::validation(
                "image",
                "file format is invalid (only JPG, PNG, GIF, WEBP)",
            ))?;

        Ok(ValidatedImage {
            extension,
            bytes: self.bytes,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CreatePostRequest {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) image: Option<ImageUpload>,
}

#[derive(Debug, Clone)]
pub(crate) struct UpdatePostRequest {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) image: Option<ImageUpload>,
}

impl Post {
    pub(crate) fn new(
        id: i64,
        author_id: i64,
        title: impl Into<String>,
        content: impl Into<String>,
        image: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        validate_positive_i64("id", id)?;
        validate_positive_i64("author_id", author_id)?;
        let title = normalize_title(&title.into())?;
        let content = normalize_content(&content.into())?;

        Ok(Self {
            id,
            author_id,
            title,
            content,
            image: image.filter(|name| !name.is_empty()),
            created_at,
        })
    }
}

fn validate_positive_i64(field: &'static str, value: i64) -> Result<(), DomainError> {
    if value <= 0 {
        return Err(DomainError::validation(field, "must be > 0"));
    }
    Ok(())
}

pub(crate) fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 255 {
        return Err(DomainError::validation("title", "must be 1..255 chars"));
    }
    Ok(title.to_string())
}

pub(crate) fn normalize_content(content: &str) -> Result<String, DomainError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(DomainError::validation("content", "must not be empty"));
    }
    Ok(content.to_string())
}
