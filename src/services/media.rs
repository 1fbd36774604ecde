//! Media store
//!
//! Recipes arrive with their image as a base64 data URI
//! (`data:image/png;base64,...`). The media store decodes the payload,
//! writes the blob under the configured media directory and hands back the
//! relative URL that gets persisted on the recipe row.

use crate::config::MediaConfig;
use crate::services::ServiceError;
use anyhow::Context;
use data_encoding::BASE64;
use std::path::PathBuf;

/// Decodes and persists recipe image payloads.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    max_size: u64,
}

impl MediaStore {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            root: config.path.clone(),
            max_size: config.max_image_size,
        }
    }

    /// Decode a base64 data URI and write it under the media root.
    ///
    /// Returns the relative URL to store on the recipe.
    pub async fn store_data_uri(&self, payload: &str) -> Result<String, ServiceError> {
        let (extension, encoded) = split_data_uri(payload)?;

        let bytes = BASE64
            .decode(encoded.trim().as_bytes())
            .map_err(|_| ServiceError::Validation("Image payload is not valid base64".into()))?;

        if bytes.is_empty() {
            return Err(ServiceError::Validation("Image payload is empty".into()));
        }
        if bytes.len() as u64 > self.max_size {
            return Err(ServiceError::Validation(format!(
                "Image payload exceeds {} bytes",
                self.max_size
            )));
        }

        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("Failed to create media directory: {:?}", self.root))
            .map_err(ServiceError::Internal)?;

        let filename = format!("{}.{}", uuid::Uuid::new_v4(), extension);
        let path = self.root.join(&filename);
        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("Failed to write image: {:?}", path))
            .map_err(ServiceError::Internal)?;

        Ok(format!("/media/recipes/{}", filename))
    }
}

/// Split a `data:<mime>;base64,<payload>` URI into (extension, payload).
fn split_data_uri(payload: &str) -> Result<(&'static str, &str), ServiceError> {
    let rest = payload
        .strip_prefix("data:")
        .ok_or_else(|| ServiceError::Validation("Image must be a base64 data URI".into()))?;

    let (header, encoded) = rest
        .split_once(";base64,")
        .ok_or_else(|| ServiceError::Validation("Image must be base64-encoded".into()))?;

    let extension = match header {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        other => {
            return Err(ServiceError::Validation(format!(
                "Unsupported image type: {}",
                other
            )))
        }
    };

    Ok((extension, encoded))
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 transparent PNG
    const TINY_PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    fn store(dir: &std::path::Path) -> MediaStore {
        MediaStore::new(&MediaConfig {
            path: dir.to_path_buf(),
            max_image_size: 1024,
        })
    }

    #[tokio::test]
    async fn test_store_png_data_uri() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = store(dir.path());

        let url = store
            .store_data_uri(&format!("data:image/png;base64,{}", TINY_PNG))
            .await
            .expect("Failed to store image");

        assert!(url.starts_with("/media/recipes/"));
        assert!(url.ends_with(".png"));

        let filename = url.rsplit('/').next().unwrap();
        let written = dir.path().join(filename);
        assert!(written.exists());
    }

    #[tokio::test]
    async fn test_rejects_non_data_uri() {
        let dir = tempfile::tempdir().unwrap();
        let result = store(dir.path()).store_data_uri("just-a-string").await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_rejects_bad_base64() {
        let dir = tempfile::tempdir().unwrap();
        let result = store(dir.path())
            .store_data_uri("data:image/png;base64,!!!not-base64!!!")
            .await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_rejects_unsupported_type() {
        let dir = tempfile::tempdir().unwrap();
        let result = store(dir.path())
            .store_data_uri(&format!("data:application/pdf;base64,{}", TINY_PNG))
            .await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_rejects_oversized_payload() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(&MediaConfig {
            path: dir.path().to_path_buf(),
            max_image_size: 8,
        });

        let result = store
            .store_data_uri(&format!("data:image/png;base64,{}", TINY_PNG))
            .await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }
}
