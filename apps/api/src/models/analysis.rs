use serde::{Deserialize, Serialize};

use crate::models::lenient::opt_number;

/// One strength, weakness or recommendation reported by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "FindingRepr")]
pub struct Finding {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Models sometimes answer with bare strings instead of objects.
#[derive(Deserialize)]
#[serde(untagged)]
enum FindingRepr {
    Full {
        title: String,
        #[serde(default)]
        description: Option<String>,
    },
    Title(String),
}

impl From<FindingRepr> for Finding {
    fn from(repr: FindingRepr) -> Self {
        match repr {
            FindingRepr::Full { title, description } => Finding { title, description },
            FindingRepr::Title(title) => Finding {
                title,
                description: None,
            },
        }
    }
}

/// Typed resume-vs-job comparison. Every section is optional because the
/// model may omit it. `score` is not clamped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, deserialize_with = "opt_number")]
    pub score: Option<f64>,
    #[serde(default)]
    pub strengths: Option<Vec<Finding>>,
    #[serde(default)]
    pub weaknesses: Option<Vec<Finding>>,
    #[serde(default)]
    pub recommendations: Option<Vec<Finding>>,
}

impl AnalysisResult {
    pub fn score_in_range(&self) -> bool {
        self.score.is_some_and(|s| (0.0..=100.0).contains(&s))
    }
}
