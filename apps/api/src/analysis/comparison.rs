//! Resume vs. job-description comparison.
//!
//! One model call, then the response parser. Output that cannot be decoded
//! is a soft success: `analysis` is `None` and the raw text is returned for
//! manual review.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analysis::prompts::{comparison_prompt, COMPARISON_SYSTEM};
use crate::analysis::response_parser::{self, Unparseable};
use crate::errors::AppError;
use crate::llm_client::GenerativeModel;
use crate::models::analysis::AnalysisResult;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRequest {
    pub resume: String,
    pub job_description: String,
    #[serde(default)]
    pub is_structured_data: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonOutcome {
    pub success: bool,
    pub analysis: Option<AnalysisResult>,
    pub raw_analysis: String,
}

pub async fn compare(
    model: &dyn GenerativeModel,
    resume: &str,
    job_description: &str,
    is_structured: bool,
) -> Result<ComparisonOutcome, AppError> {
    if resume.trim().is_empty() {
        return Err(AppError::Validation("Resume is required".to_string()));
    }
    if job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "Job description is required".to_string(),
        ));
    }

    let prompt = comparison_prompt(resume, job_description, is_structured);
    let raw = model.generate(COMPARISON_SYSTEM, &prompt).await?;

    let analysis = match response_parser::parse_as::<AnalysisResult>(&raw) {
        Ok(analysis) => {
            match analysis.score {
                Some(_) if !analysis.score_in_range() => {
                    warn!("Comparison score {:?} outside 0-100", analysis.score)
                }
                None => warn!("Comparison result has no score"),
                _ => {}
            }
            Some(analysis)
        }
        Err(Unparseable::Empty) => {
            warn!("Comparison returned no text");
            None
        }
        Err(Unparseable::Malformed(e)) => {
            warn!("Comparison output unparseable, returning raw text: {e}");
            None
        }
    };

    info!(
        "Comparison complete (structured={is_structured}, parsed={})",
        analysis.is_some()
    );

    Ok(ComparisonOutcome {
        success: true,
        analysis,
        raw_analysis: raw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fakes::FakeModel;
    use crate::analysis::prompts::STRUCTURED_RESUME_NOTE;

    #[tokio::test]
    async fn test_fenced_analysis_is_parsed() {
        let model = FakeModel::replying(
            "Sure!\n```json\n{\"score\": 85, \"strengths\": [{\"title\": \"Rust\"}]}\n```",
        );
        let outcome = compare(&model, "Rust dev", "Rust role", false).await.unwrap();
        assert!(outcome.success);
        let analysis = outcome.analysis.unwrap();
        assert_eq!(analysis.score, Some(85.0));
        assert_eq!(analysis.strengths.unwrap()[0].title, "Rust");
    }

    #[tokio::test]
    async fn test_unparseable_output_is_soft_success() {
        let model = FakeModel::replying("Score: 70. Strengths: good Rust.");
        let outcome = compare(&model, "Rust dev", "Rust role", false).await.unwrap();
        assert!(outcome.success);
        assert!(outcome.analysis.is_none());
        assert_eq!(outcome.raw_analysis, "Score: 70. Strengths: good Rust.");
    }

    #[tokio::test]
    async fn test_empty_output_is_soft_success() {
        let model = FakeModel::replying("");
        let outcome = compare(&model, "Rust dev", "Rust role", false).await.unwrap();
        assert!(outcome.success);
        assert!(outcome.analysis.is_none());
        assert_eq!(outcome.raw_analysis, "");
    }

    #[tokio::test]
    async fn test_out_of_range_score_passes_through() {
        let model = FakeModel::replying("{\"score\": 140}");
        let outcome = compare(&model, "r", "j", false).await.unwrap();
        assert_eq!(outcome.analysis.unwrap().score, Some(140.0));
    }

    #[tokio::test]
    async fn test_missing_score_passes_through() {
        let model = FakeModel::replying("{\"weaknesses\": [\"No Go experience\"]}");
        let outcome = compare(&model, "r", "j", false).await.unwrap();
        let analysis = outcome.analysis.unwrap();
        assert_eq!(analysis.score, None);
        assert_eq!(analysis.weaknesses.unwrap()[0].title, "No Go experience");
    }

    #[tokio::test]
    async fn test_blank_inputs_rejected_without_model_call() {
        let model = FakeModel::replying("{}");
        let blank_resume = compare(&model, "   ", "Rust role", false).await;
        let blank_jd = compare(&model, "Rust dev", "\n\t", false).await;
        assert!(matches!(blank_resume, Err(AppError::Validation(_))));
        assert!(matches!(blank_jd, Err(AppError::Validation(_))));
        assert!(model.calls().is_empty());
    }

    #[tokio::test]
    async fn test_structured_flag_reaches_prompt() {
        let model = FakeModel::replying("{}");
        compare(&model, "{\"skills\": [\"Rust\"]}", "Rust role", true)
            .await
            .unwrap();
        compare(&model, "Rust dev", "Rust role", false).await.unwrap();

        let calls = model.calls();
        assert!(calls[0].prompt.contains(STRUCTURED_RESUME_NOTE));
        assert!(!calls[1].prompt.contains(STRUCTURED_RESUME_NOTE));
        assert_eq!(calls[0].system, COMPARISON_SYSTEM);
        assert!(calls[0].document.is_none());
    }

    #[tokio::test]
    async fn test_model_failure_propagates() {
        let model = FakeModel::failing("overloaded");
        let result = compare(&model, "r", "j", false).await;
        let err = result.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_request_accepts_camel_case() {
        let request: ComparisonRequest = serde_json::from_str(
            r#"{"resume": "r", "jobDescription": "j", "isStructuredData": true}"#,
        )
        .unwrap();
        assert_eq!(request.job_description, "j");
        assert!(request.is_structured_data);

        let request: ComparisonRequest =
            serde_json::from_str(r#"{"resume": "r", "jobDescription": "j"}"#).unwrap();
        assert!(!request.is_structured_data);
    }
}
