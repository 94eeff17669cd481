//! Resume document ingestion: stored file -> model document understanding ->
//! `ParsedResumeProfile`.
//!
//! Ownership and store failures are errors. Everything after the resume has
//! been resolved degrades instead: download or model failures come back as
//! `IngestOutcome::Failed`, undecodable model text as `IngestOutcome::RawText`.

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::documents::{find_owned, DocumentStore};
use crate::analysis::fetch::DocumentFetcher;
use crate::analysis::prompts::{INGESTION_PROMPT, INGESTION_SYSTEM};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::llm_client::GenerativeModel;
use crate::models::resume::ParsedResumeProfile;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IngestOutcome {
    Parsed(ParsedResumeProfile),
    /// Model text that did not decode; the caller shows it for manual review.
    RawText(String),
    Failed { error: String },
}

pub async fn ingest(
    user: &CurrentUser,
    resume_id: Uuid,
    documents: &dyn DocumentStore,
    fetcher: &dyn DocumentFetcher,
    model: &dyn GenerativeModel,
) -> Result<IngestOutcome, AppError> {
    let resume = find_owned(documents, user, resume_id).await?;
    info!(
        "Ingesting resume {} ({}) for user {}",
        resume.id,
        resume.display_name(),
        user.id
    );

    // Held until return so the temp file outlives the model call.
    let downloaded = match fetcher.download(&resume.url).await {
        Ok(d) => d,
        Err(e) => return Ok(failed(resume_id, e.to_string())),
    };
    let bytes = match downloaded.read().await {
        Ok(b) => b,
        Err(e) => return Ok(failed(resume_id, e.to_string())),
    };

    let raw = match model
        .generate_with_document(
            INGESTION_SYSTEM,
            INGESTION_PROMPT,
            &bytes,
            downloaded.mime_type(),
        )
        .await
    {
        Ok(raw) => raw,
        Err(e) => return Ok(failed(resume_id, AppError::from(e).to_string())),
    };

    Ok(decode_profile(&raw))
}

fn failed(resume_id: Uuid, error: String) -> IngestOutcome {
    warn!("Ingestion of resume {resume_id} failed: {error}");
    IngestOutcome::Failed { error }
}

/// Profile when the (optionally fenced) text decodes to at least one filled
/// section, raw text otherwise.
fn decode_profile(raw: &str) -> IngestOutcome {
    match serde_json::from_str::<ParsedResumeProfile>(strip_json_fences(raw)) {
        Ok(profile) if profile.is_empty() => {
            warn!("Resume profile decoded with no sections, returning raw text");
            IngestOutcome::RawText(raw.to_string())
        }
        Ok(profile) => IngestOutcome::Parsed(profile),
        Err(e) => {
            warn!("Resume profile did not decode, returning raw text: {e}");
            IngestOutcome::RawText(raw.to_string())
        }
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => {
            let stripped = stripped.trim_start();
            stripped
                .strip_suffix("```")
                .map(str::trim)
                .unwrap_or(stripped)
        }
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fakes::{FakeFetcher, FakeModel, InMemoryDocumentStore};

    const PROFILE_JSON: &str = r#"{
        "languages and technologies": ["Rust", "SQL"],
        "experience": [{"job_title": "Engineer", "company_name": "Acme", "description": "Built things"}],
        "education": [{"degree": "BSc", "institution": "Uni", "year": "2019"}],
        "summary": "Engineer who builds things."
    }"#;

    struct Fixture {
        user: CurrentUser,
        resume_id: Uuid,
        store: InMemoryDocumentStore,
    }

    fn fixture() -> Fixture {
        let user = CurrentUser { id: Uuid::new_v4() };
        let store = InMemoryDocumentStore::new();
        let doc = store.add(user.id, "https://files.test/cv.pdf", Some("CV"));
        Fixture {
            user,
            resume_id: doc.id,
            store,
        }
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "  {\"key\": \"value\"}\n";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[tokio::test]
    async fn test_fenced_profile_is_parsed() {
        let f = fixture();
        let fetcher = FakeFetcher::serving(b"%PDF-1.4", "application/pdf");
        let model = FakeModel::replying(&format!("```json\n{PROFILE_JSON}\n```"));

        let outcome = ingest(&f.user, f.resume_id, &f.store, &fetcher, &model)
            .await
            .unwrap();

        let IngestOutcome::Parsed(profile) = outcome else {
            panic!("expected parsed profile");
        };
        assert_eq!(profile.languages_and_technologies, vec!["Rust", "SQL"]);
        assert_eq!(profile.experience[0].company_name, "Acme");
        assert_eq!(profile.education[0].year, Some(2019));
        assert_eq!(profile.summary, "Engineer who builds things.");
    }

    #[tokio::test]
    async fn test_document_sent_with_schema_prompt() {
        let f = fixture();
        let fetcher = FakeFetcher::serving(b"%PDF-1.4", "application/pdf");
        let model = FakeModel::replying(PROFILE_JSON);

        ingest(&f.user, f.resume_id, &f.store, &fetcher, &model)
            .await
            .unwrap();

        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].prompt, INGESTION_PROMPT);
        assert_eq!(
            calls[0].document,
            Some((b"%PDF-1.4".to_vec(), "application/pdf".to_string()))
        );
        assert_eq!(fetcher.urls(), vec!["https://files.test/cv.pdf"]);
    }

    #[tokio::test]
    async fn test_undecodable_output_returns_raw_text() {
        let f = fixture();
        let fetcher = FakeFetcher::serving(b"%PDF", "application/pdf");
        let model = FakeModel::replying("Jane Doe, Rust engineer at Acme.");

        let outcome = ingest(&f.user, f.resume_id, &f.store, &fetcher, &model)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            IngestOutcome::RawText("Jane Doe, Rust engineer at Acme.".to_string())
        );
    }

    #[tokio::test]
    async fn test_object_without_profile_sections_returns_raw_text() {
        let f = fixture();
        let fetcher = FakeFetcher::serving(b"%PDF", "application/pdf");
        let model = FakeModel::replying("```json\n{\"error\": \"unreadable\"}\n```");

        let outcome = ingest(&f.user, f.resume_id, &f.store, &fetcher, &model)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            IngestOutcome::RawText("```json\n{\"error\": \"unreadable\"}\n```".to_string())
        );
    }

    #[tokio::test]
    async fn test_download_failure_is_tagged_error() {
        let f = fixture();
        let fetcher = FakeFetcher::failing("connection reset");
        let model = FakeModel::replying(PROFILE_JSON);

        let outcome = ingest(&f.user, f.resume_id, &f.store, &fetcher, &model)
            .await
            .unwrap();
        let IngestOutcome::Failed { error } = outcome else {
            panic!("expected failure");
        };
        assert!(error.contains("connection reset"));
        assert!(model.calls().is_empty());
    }

    #[tokio::test]
    async fn test_model_failure_is_tagged_error_and_releases_file() {
        let f = fixture();
        let fetcher = FakeFetcher::serving(b"%PDF", "application/pdf");
        let model = FakeModel::failing("overloaded");

        let outcome = ingest(&f.user, f.resume_id, &f.store, &fetcher, &model)
            .await
            .unwrap();
        assert!(matches!(outcome, IngestOutcome::Failed { .. }));
        assert!(!fetcher.paths()[0].exists());
    }

    #[tokio::test]
    async fn test_temp_file_released_after_success() {
        let f = fixture();
        let fetcher = FakeFetcher::serving(b"%PDF", "application/pdf");
        let model = FakeModel::replying(PROFILE_JSON);

        ingest(&f.user, f.resume_id, &f.store, &fetcher, &model)
            .await
            .unwrap();
        let paths = fetcher.paths();
        assert_eq!(paths.len(), 1);
        assert!(!paths[0].exists());
    }

    #[tokio::test]
    async fn test_foreign_resume_is_not_found() {
        let f = fixture();
        let stranger = CurrentUser { id: Uuid::new_v4() };
        let fetcher = FakeFetcher::serving(b"%PDF", "application/pdf");
        let model = FakeModel::replying(PROFILE_JSON);

        let result = ingest(&stranger, f.resume_id, &f.store, &fetcher, &model).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(fetcher.urls().is_empty());
    }

    #[test]
    fn test_outcome_wire_shapes() {
        let failed = IngestOutcome::Failed {
            error: "boom".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({"error": "boom"})
        );
        let raw = IngestOutcome::RawText("text".to_string());
        assert_eq!(serde_json::to_value(&raw).unwrap(), serde_json::json!("text"));
    }
}
