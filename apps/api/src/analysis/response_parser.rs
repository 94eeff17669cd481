//! Recovers a JSON value from free-form model output.
//!
//! Tiers, in order:
//! 1. the first ```json fenced block (non-greedy), decoded
//! 2. the whole text, decoded
//! 3. `Unparseable`
//!
//! `Unparseable` is an expected outcome. Callers degrade to a null analysis or
//! raw-text passthrough; it never becomes an `AppError`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

static JSON_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").expect("valid fence regex"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Unparseable {
    #[error("model returned no text")]
    Empty,

    #[error("model output is not JSON: {0}")]
    Malformed(String),
}

/// Decodes `raw` into a JSON value using the fenced-then-whole fallback.
pub fn parse(raw: &str) -> Result<Value, Unparseable> {
    if raw.trim().is_empty() {
        return Err(Unparseable::Empty);
    }

    if let Some(inner) = fenced_block(raw) {
        if let Ok(value) = serde_json::from_str(inner) {
            return Ok(value);
        }
    }

    serde_json::from_str(raw.trim()).map_err(|e| Unparseable::Malformed(e.to_string()))
}

/// `parse` followed by a typed decode. A value of the wrong shape is `Malformed`.
pub fn parse_as<T: DeserializeOwned>(raw: &str) -> Result<T, Unparseable> {
    let value = parse(raw)?;
    serde_json::from_value(value).map_err(|e| Unparseable::Malformed(e.to_string()))
}

fn fenced_block(raw: &str) -> Option<&str> {
    JSON_FENCE
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}
