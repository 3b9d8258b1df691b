//! Media store
//!
//! Disk-backed object storage for uploaded images. The rest of the system
//! treats uploads as opaque: it only ever records the storage URL and the
//! storage-assigned public id.

use crate::error::{Error, Result};
use crate::models::ImageRef;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
};
use bytes::Bytes;
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

pub struct MediaStore {
    dir: PathBuf,
    public_base: String,
}

impl MediaStore {
    pub fn new(dir: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            public_base: public_base.into(),
        }
    }

    /// Persist an uploaded image and hand back its storage reference.
    /// The public id keeps the original file extension so the content type
    /// can be recovered on serve.
    pub async fn store(&self, filename: Option<&str>, data: Bytes) -> Result<ImageRef> {
        let ext = filename
            .and_then(|name| name.rsplit_once('.').map(|(_, ext)| ext))
            .filter(|ext| ext.chars().all(char::is_alphanumeric))
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
            .unwrap_or_default();
        let public_id = format!("{}{}", Uuid::new_v4(), ext);

        let path = self.dir.join(&public_id);
        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| Error::Internal(format!("failed to store image: {e}")))?;

        info!("Stored image {} ({} bytes)", public_id, data.len());

        Ok(ImageRef {
            url: format!("{}/media/{}", self.public_base, public_id),
            public_id,
        })
    }

    pub async fn fetch(&self, public_id: &str) -> Result<Bytes> {
        // Public ids are single path segments; anything else is not ours.
        if public_id.contains('/') || public_id.contains("..") {
            return Err(Error::NotFound("No such media".to_string()));
        }
        match tokio::fs::read(self.dir.join(public_id)).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound("No such media".to_string()))
            }
            Err(e) => Err(Error::Internal(format!("failed to read image: {e}"))),
        }
    }
}

/// Content type inferred from a public id's extension.
pub fn content_type_for(public_id: &str) -> &'static str {
    match public_id.rsplit_once('.').map(|(_, ext)| ext) {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// GET /media/{public_id}
pub async fn serve_media(
    Path(public_id): Path<String>,
    State(state): State<AppState>,
) -> Result<(HeaderMap, Bytes)> {
    let data = state.media.fetch(&public_id).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        content_type_for(&public_id)
            .parse()
            .map_err(|_| Error::Internal("invalid content type".to_string()))?,
    );

    Ok((headers, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_types_follow_extension() {
        assert_eq!(content_type_for("abc.png"), "image/png");
        assert_eq!(content_type_for("abc.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("abc.jpg"), "image/jpeg");
        assert_eq!(content_type_for("abc"), "application/octet-stream");
        assert_eq!(content_type_for("abc.exe"), "application/octet-stream");
    }
}
