use std::path::{Path, PathBuf};

use axum::extract::multipart::{Multipart, MultipartError};
use thiserror::Error;
use uuid::Uuid;

use crate::config;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error(transparent)]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Raw multipart parts for a cat creation request. Presence and content are
/// validated by the handler; this layer only collects.
#[derive(Debug, Default)]
pub struct CatUploadParts {
    /// JSON document with the client-writable cat fields
    pub cat_json: Option<String>,
    /// Original filename of the uploaded image
    pub file_name: Option<String>,
    pub file_bytes: Option<Vec<u8>>,
    /// Derived geocoordinate for the upload, as a "lat,lng" pair
    pub coords_raw: Option<String>,
}

pub async fn collect(multipart: &mut Multipart) -> Result<CatUploadParts, UploadError> {
    let mut parts = CatUploadParts::default();

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("cat") => parts.cat_json = Some(field.text().await?),
            Some("coords") => parts.coords_raw = Some(field.text().await?),
            Some("file") => {
                parts.file_name = field.file_name().map(|s| s.to_string());
                parts.file_bytes = Some(field.bytes().await?.to_vec());
            }
            _ => {}
        }
    }

    Ok(parts)
}

/// Persist an uploaded image under the configured upload directory. The
/// stored name is prefixed with a UUID so concurrent uploads of the same
/// original name never collide; the original name is what gets recorded on
/// the cat document.
pub async fn persist(original_name: &str, bytes: &[u8]) -> Result<PathBuf, std::io::Error> {
    let directory = &config::config().upload.directory;
    tokio::fs::create_dir_all(directory).await?;

    let stored = format!("{}_{}", Uuid::new_v4(), sanitize_filename(original_name));
    let path = Path::new(directory).join(stored);
    tokio::fs::write(&path, bytes).await?;
    tracing::debug!("Stored upload {} at {}", original_name, path.display());
    Ok(path)
}

/// Keep only the final path component and replace hostile characters.
fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    base.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_path_traversal_attempts() {
        assert_eq!(sanitize_filename("siiri.jpg"), "siiri.jpg");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("c:\\temp\\cat photo.png"), "cat_photo.png");
    }
}
