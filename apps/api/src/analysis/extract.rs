//! Local plain-text extraction of a stored resume, without the model.
//!
//! PDFs go through `pdf-extract` on the blocking pool. Text documents are
//! decoded as lossy UTF-8. Anything else, or a document with no text layer,
//! yields `success = false` and asks the user to paste the text instead.

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::documents::{find_owned, DocumentStore};
use crate::analysis::fetch::DocumentFetcher;
use crate::auth::CurrentUser;
use crate::errors::AppError;

pub const PASTE_MANUALLY_MESSAGE: &str =
    "Could not extract text from this resume. Please copy and paste the resume text manually.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedText {
    pub success: bool,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ExtractedText {
    fn found(text: String) -> Self {
        Self {
            success: true,
            text,
            message: None,
        }
    }

    fn unavailable() -> Self {
        Self {
            success: false,
            text: String::new(),
            message: Some(PASTE_MANUALLY_MESSAGE.to_string()),
        }
    }
}

pub async fn extract_text(
    user: &CurrentUser,
    resume_id: Uuid,
    documents: &dyn DocumentStore,
    fetcher: &dyn DocumentFetcher,
) -> Result<ExtractedText, AppError> {
    let resume = find_owned(documents, user, resume_id).await?;
    let downloaded = fetcher.download(&resume.url).await?;
    let bytes = downloaded.read().await?;
    let mime_type = downloaded.mime_type().to_string();
    drop(downloaded);

    let text = match mime_type.as_str() {
        "application/pdf" => pdf_text(bytes).await?,
        m if m.starts_with("text/") => Some(String::from_utf8_lossy(&bytes).into_owned()),
        other => {
            warn!("No local text extraction for {other} resume {resume_id}");
            None
        }
    };

    Ok(match text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) {
        Some(text) => {
            info!(
                "Extracted {} chars from resume {resume_id} for user {}",
                text.len(),
                user.id
            );
            ExtractedText::found(text)
        }
        None => ExtractedText::unavailable(),
    })
}

/// `None` when the PDF cannot be read or has no text layer.
async fn pdf_text(bytes: Vec<u8>) -> Result<Option<String>, AppError> {
    run_extraction(move || pdf_extract::extract_text_from_mem(&bytes)).await
}

/// Runs `extract` on the blocking pool. `pdf-extract` panics on some malformed
/// files, so a panic is treated like an extraction error.
async fn run_extraction<F, E>(extract: F) -> Result<Option<String>, AppError>
where
    F: FnOnce() -> Result<String, E> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    match tokio::task::spawn_blocking(extract).await {
        Ok(Ok(text)) => Ok(Some(text)),
        Ok(Err(e)) => {
            warn!("PDF text extraction failed: {e}");
            Ok(None)
        }
        Err(e) if e.is_panic() => {
            warn!("PDF text extraction panicked: {e}");
            Ok(None)
        }
        Err(e) => Err(AppError::Internal(anyhow::anyhow!(
            "spawn_blocking failed in pdf extraction: {e}"
        ))),
    }
}
