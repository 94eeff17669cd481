//! Test doubles for the analysis collaborators.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::analysis::documents::DocumentStore;
use crate::analysis::fetch::{DocumentFetcher, DownloadedDocument};
use crate::errors::AppError;
use crate::llm_client::{GenerativeModel, LlmError};
use crate::models::resume::ResumeDocument;

/// One call observed by `FakeModel`.
#[derive(Debug, Clone)]
pub struct ModelCall {
    pub system: String,
    pub prompt: String,
    pub document: Option<(Vec<u8>, String)>,
}

/// Replies with a fixed text, or fails every call.
pub struct FakeModel {
    reply: Result<String, String>,
    calls: Mutex<Vec<ModelCall>>,
}

impl FakeModel {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<ModelCall> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, call: ModelCall) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(call);
        self.reply.clone().map_err(|message| LlmError::Api {
            status: 500,
            message,
        })
    }
}

#[async_trait]
impl GenerativeModel for FakeModel {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        self.answer(ModelCall {
            system: system.to_string(),
            prompt: prompt.to_string(),
            document: None,
        })
    }

    async fn generate_with_document(
        &self,
        system: &str,
        prompt: &str,
        document: &[u8],
        mime_type: &str,
    ) -> Result<String, LlmError> {
        self.answer(ModelCall {
            system: system.to_string(),
            prompt: prompt.to_string(),
            document: Some((document.to_vec(), mime_type.to_string())),
        })
    }
}

#[derive(Default)]
pub struct InMemoryDocumentStore {
    documents: Mutex<Vec<ResumeDocument>>,
    fail: bool,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            documents: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Each added document is newer than the previous one.
    pub fn add(&self, user_id: Uuid, url: &str, name: Option<&str>) -> ResumeDocument {
        let mut documents = self.documents.lock().unwrap();
        let document = ResumeDocument {
            id: Uuid::new_v4(),
            user_id,
            url: url.to_string(),
            name: name.map(str::to_string),
            created_at: Utc::now() + Duration::seconds(documents.len() as i64),
        };
        documents.push(document.clone());
        document
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ResumeDocument>, AppError> {
        if self.fail {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        let mut documents: Vec<ResumeDocument> = self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect();
        documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(documents)
    }
}

/// Serves fixed bytes for every URL and remembers where it put them.
pub struct FakeFetcher {
    content: Result<(Vec<u8>, String), String>,
    paths: Mutex<Vec<std::path::PathBuf>>,
    urls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn serving(bytes: &[u8], mime_type: &str) -> Self {
        Self {
            content: Ok((bytes.to_vec(), mime_type.to_string())),
            paths: Mutex::new(Vec::new()),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            content: Err(message.to_string()),
            paths: Mutex::new(Vec::new()),
            urls: Mutex::new(Vec::new()),
        }
    }

    /// Temp file paths handed out so far.
    pub fn paths(&self) -> Vec<std::path::PathBuf> {
        self.paths.lock().unwrap().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentFetcher for FakeFetcher {
    async fn download(&self, url: &str) -> Result<DownloadedDocument, AppError> {
        self.urls.lock().unwrap().push(url.to_string());
        let (bytes, mime_type) = self.content.clone().map_err(AppError::Storage)?;
        let document = DownloadedDocument::write(&bytes, mime_type).await?;
        self.paths.lock().unwrap().push(document.path().to_path_buf());
        Ok(document)
    }
}
