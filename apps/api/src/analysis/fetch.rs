//! Downloads a stored resume into a request-scoped temporary file.
//!
//! The file lives exactly as long as the returned `DownloadedDocument`; it is
//! removed when that value drops, on success and error paths alike. Names come
//! from `tempfile`'s random suffix, so concurrent downloads of the same URL
//! never collide.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use reqwest::Client;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::errors::AppError;

pub const DEFAULT_MIME_TYPE: &str = "application/pdf";

#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn download(&self, url: &str) -> Result<DownloadedDocument, AppError>;
}

/// A downloaded document on local disk.
#[derive(Debug)]
pub struct DownloadedDocument {
    file: NamedTempFile,
    mime_type: String,
}

impl DownloadedDocument {
    /// Writes `bytes` to a fresh temp file.
    pub async fn write(bytes: &[u8], mime_type: String) -> Result<Self, AppError> {
        let file = tempfile::Builder::new()
            .prefix("resume-")
            .tempfile()
            .map_err(|e| AppError::Storage(format!("Could not create temp file: {e}")))?;
        tokio::fs::write(file.path(), bytes)
            .await
            .map_err(|e| AppError::Storage(format!("Could not write temp file: {e}")))?;
        Ok(Self { file, mime_type })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub async fn read(&self) -> Result<Vec<u8>, AppError> {
        tokio::fs::read(self.path())
            .await
            .map_err(|e| AppError::Storage(format!("Could not read temp file: {e}")))
    }
}

/// Fetches `http(s)://` URLs with reqwest and `s3://bucket/key` URLs with the
/// S3 client, when one is configured.
pub struct HttpDocumentFetcher {
    client: Client,
    s3: Option<S3Client>,
}

impl HttpDocumentFetcher {
    pub fn new(timeout: Duration, s3: Option<S3Client>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            s3,
        })
    }

    async fn fetch_http(&self, url: &str) -> Result<(Bytes, Option<String>), AppError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::Storage(format!("Download failed: {e}")))?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Storage(format!("Download failed: {e}")))?;

        Ok((bytes, content_type))
    }

    async fn fetch_s3(&self, location: &str) -> Result<(Bytes, Option<String>), AppError> {
        let s3 = self
            .s3
            .as_ref()
            .ok_or_else(|| AppError::Storage("S3 storage is not configured".to_string()))?;
        let (bucket, key) = location
            .split_once('/')
            .filter(|(b, k)| !b.is_empty() && !k.is_empty())
            .ok_or_else(|| AppError::Storage(format!("Invalid S3 location: s3://{location}")))?;

        let object = s3
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 download failed: {e}")))?;

        let content_type = object.content_type().map(str::to_string);
        let bytes = object
            .body
            .collect()
            .await
            .map_err(|e| AppError::Storage(format!("S3 download failed: {e}")))?
            .into_bytes();

        Ok((bytes, content_type))
    }
}

#[async_trait]
impl DocumentFetcher for HttpDocumentFetcher {
    async fn download(&self, url: &str) -> Result<DownloadedDocument, AppError> {
        let (bytes, content_type) = if let Some(location) = url.strip_prefix("s3://") {
            self.fetch_s3(location).await?
        } else if url.starts_with("http://") || url.starts_with("https://") {
            self.fetch_http(url).await?
        } else {
            return Err(AppError::Storage(format!("Unsupported document URL: {url}")));
        };

        let mime_type = resolve_mime_type(content_type.as_deref(), url);
        debug!("Downloaded {} bytes ({mime_type}) from {url}", bytes.len());
        DownloadedDocument::write(&bytes, mime_type).await
    }
}

/// Content-Type header first, then the URL's extension, then PDF.
/// A generic `application/octet-stream` header carries no information.
pub fn resolve_mime_type(content_type: Option<&str>, url: &str) -> String {
    let from_header = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .filter(|ct| !ct.is_empty() && ct != "application/octet-stream");
    if let Some(mime) = from_header {
        return mime;
    }

    let path = url.split(['?', '#']).next().unwrap_or(url);
    let extension = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "txt" => "text/plain",
        _ => DEFAULT_MIME_TYPE,
    }
    .to_string()
}
