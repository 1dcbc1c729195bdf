// storage.rs
// Collaborator seams for binary data: photo persistence (local directory or
// remote object-storage endpoint) and the external bill-PDF renderer.
// Failures here never abort the owning write; callers degrade to a warning.

use std::path::PathBuf;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::ServiceBill;
use crate::normalize::normalize_record;

#[async_trait]
pub trait PhotoStorage: Send + Sync {
    /// Persist one decoded photo payload and return the reference stored on
    /// records.
    async fn store(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, AppError>;
}

/// Writes photos under the configured upload directory.
pub struct LocalPhotoStorage {
    dir: PathBuf,
}

impl LocalPhotoStorage {
    pub fn new(dir: PathBuf) -> LocalPhotoStorage {
        LocalPhotoStorage { dir }
    }
}

#[async_trait]
impl PhotoStorage for LocalPhotoStorage {
    async fn store(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, AppError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|err| AppError::Internal(format!("upload dir: {err}")))?;
        let path = self.dir.join(file_name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|err| AppError::Internal(format!("photo write: {err}")))?;
        Ok(file_name.to_string())
    }
}

/// Uploads photos to a remote object-storage endpoint via multipart POST.
pub struct RemotePhotoStorage {
    client: reqwest::Client,
    endpoint: String,
}

impl RemotePhotoStorage {
    pub fn new(endpoint: String) -> RemotePhotoStorage {
        RemotePhotoStorage {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    url: String,
}

#[async_trait]
impl PhotoStorage for RemotePhotoStorage {
    async fn store(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, AppError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|err| AppError::Upstream(format!("photo upload: {err}")))?;
        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "photo upload: storage returned {}",
                response.status()
            )));
        }
        let body: UploadResponse = response
            .json()
            .await
            .map_err(|err| AppError::Upstream(format!("photo upload: {err}")))?;
        Ok(body.url)
    }
}

/// Accept each photo entry either as an already-stored reference (kept
/// verbatim) or as a base64 data URI to decode and persist. Entries whose
/// upload fails are dropped and reported through the returned warning.
pub async fn ingest_photos(
    storage: &dyn PhotoStorage,
    entries: Vec<String>,
    name_hint: &str,
) -> (Vec<String>, Option<String>) {
    let mut stored = Vec::with_capacity(entries.len());
    let mut dropped = 0usize;
    for entry in entries {
        let Some((extension, bytes)) = decode_data_uri(&entry) else {
            stored.push(entry);
            continue;
        };
        let file_name = photo_file_name(name_hint, extension);
        match storage.store(&file_name, bytes).await {
            Ok(reference) => stored.push(reference),
            Err(err) => {
                tracing::warn!(error = %err, "photo upload failed");
                dropped += 1;
            }
        }
    }
    let warning = match dropped {
        0 => None,
        1 => Some("1 photo upload failed and was skipped".to_string()),
        n => Some(format!("{n} photo uploads failed and were skipped")),
    };
    (stored, warning)
}

fn photo_file_name(hint: &str, extension: &str) -> String {
    let mut base = slug::slugify(hint);
    if base.is_empty() {
        base = "photo".to_string();
    }
    format!("{base}-{}.{extension}", Uuid::new_v4())
}

fn decode_data_uri(entry: &str) -> Option<(&str, Vec<u8>)> {
    let rest = entry.strip_prefix("data:")?;
    let (mime, payload) = rest.split_once(";base64,")?;
    let extension = match mime.rsplit_once('/') {
        Some((_, "jpeg")) => "jpg",
        Some((_, subtype)) if !subtype.is_empty() => subtype,
        _ => "bin",
    };
    let bytes = BASE64.decode(payload.as_bytes()).ok()?;
    Some((extension, bytes))
}

pub struct RenderedPdf {
    pub url: String,
    pub public_id: String,
}

#[async_trait]
pub trait BillRenderer: Send + Sync {
    async fn render(&self, bill: &ServiceBill) -> Result<RenderedPdf, AppError>;
}

/// Talks to the external PDF service: POSTs the normalized bill, gets back
/// the hosted document reference.
pub struct HttpBillRenderer {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpBillRenderer {
    pub fn new(endpoint: String) -> HttpBillRenderer {
        HttpBillRenderer {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderResponse {
    url: String,
    public_id: String,
}

#[async_trait]
impl BillRenderer for HttpBillRenderer {
    async fn render(&self, bill: &ServiceBill) -> Result<RenderedPdf, AppError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&normalize_record(bill))
            .send()
            .await
            .map_err(|err| AppError::Upstream(format!("bill render: {err}")))?;
        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "bill render: renderer returned {}",
                response.status()
            )));
        }
        let body: RenderResponse = response
            .json()
            .await
            .map_err(|err| AppError::Upstream(format!("bill render: {err}")))?;
        Ok(RenderedPdf {
            url: body.url,
            public_id: body.public_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_decoding() {
        let (ext, bytes) = decode_data_uri("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(ext, "png");
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn jpeg_maps_to_jpg() {
        let (ext, _) = decode_data_uri("data:image/jpeg;base64,aGVsbG8=").unwrap();
        assert_eq!(ext, "jpg");
    }

    #[test]
    fn plain_references_are_not_data_uris() {
        assert!(decode_data_uri("car-front-1234.png").is_none());
        assert!(decode_data_uri("https://cdn.example.com/p.jpg").is_none());
    }

    #[test]
    fn bad_base64_rejected() {
        assert!(decode_data_uri("data:image/png;base64,!!!not-base64!!!").is_none());
    }

    #[tokio::test]
    async fn local_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalPhotoStorage::new(dir.path().to_path_buf());
        let (stored, warning) = ingest_photos(
            &storage,
            vec![
                "data:image/png;base64,aGVsbG8=".to_string(),
                "existing-ref.png".to_string(),
            ],
            "Swift VXI",
        )
        .await;

        assert!(warning.is_none());
        assert_eq!(stored.len(), 2);
        assert!(stored[0].starts_with("swift-vxi-"));
        assert!(stored[0].ends_with(".png"));
        assert_eq!(stored[1], "existing-ref.png");
        let on_disk = std::fs::read(dir.path().join(&stored[0])).unwrap();
        assert_eq!(on_disk, b"hello");
    }

    struct FailingStorage;

    #[async_trait]
    impl PhotoStorage for FailingStorage {
        async fn store(&self, _file_name: &str, _bytes: Vec<u8>) -> Result<String, AppError> {
            Err(AppError::Upstream("storage offline".into()))
        }
    }

    #[tokio::test]
    async fn failed_uploads_drop_with_warning() {
        let (stored, warning) = ingest_photos(
            &FailingStorage,
            vec![
                "data:image/png;base64,aGVsbG8=".to_string(),
                "kept-ref.png".to_string(),
            ],
            "car",
        )
        .await;

        assert_eq!(stored, vec!["kept-ref.png".to_string()]);
        assert_eq!(
            warning.as_deref(),
            Some("1 photo upload failed and was skipped")
        );
    }
}
