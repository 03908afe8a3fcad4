use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum MediaStoreError {
    #[error("media file not found: {0}")]
    NotFound(String),

    #[error("invalid media file name: {0}")]
    InvalidName(String),

    #[error("media io failed for '{name}'")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Blob storage for uploaded post images, addressed by generated file name.
#[async_trait]
pub(crate) trait MediaStore: Send + Sync {
    async fn write(&self, file_name: &str, bytes: &[u8]) -> Result<(), MediaStoreError>;
    /// Removing a missing file yields `MediaStoreError::NotFound`.
    async fn remove(&self, file_name: &str) -> Result<(), MediaStoreError>;
}

/// `<unix-nanos>_<random hex>.<ext>`; unique enough for uploads, not a secret.
pub(crate) fn generate_file_name(extension: &str) -> String {
    let now = Utc::now();
    let nanos = now
        .timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros().saturating_mul(1000));
    let suffix: u32 = rand::random();
    format!("{nanos}_{suffix:08x}.{extension}")
}

/// Generated names are flat: no separators, no parent references.
pub(crate) fn is_safe_file_name(file_name: &str) -> bool {
    !file_name.is_empty()
        && file_name != "."
        && file_name != ".."
        && !file_name.contains(['/', '\\', '\0'])
}
