//! Deserializers for fields that external sources and the model fill inconsistently.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolOrString {
    Bool(bool),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

/// Accepts `true`, `"true"`, `"TRUE"`; everything else (including null) is false.
pub fn bool_or_string<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<BoolOrString>::deserialize(deserializer)? {
        Some(BoolOrString::Bool(b)) => b,
        Some(BoolOrString::Text(s)) => s.trim().eq_ignore_ascii_case("true"),
        None => false,
    })
}

/// Accepts `85`, `85.5`, `"85"`. Non-numeric strings and null become `None`.
pub fn opt_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(NumberOrString::Number(n)) => Some(n),
        Some(NumberOrString::Text(s)) => s.trim().trim_end_matches('%').parse::<f64>().ok(),
        None => None,
    })
}

/// Accepts `2021`, `"2021"`, `"2019-2021"` (last year wins).
pub fn opt_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(NumberOrString::Number(n)) => Some(n as i32),
        Some(NumberOrString::Text(s)) => s
            .split(|c: char| !c.is_ascii_digit())
            .filter(|part| part.len() == 4)
            .last()
            .and_then(|part| part.parse().ok()),
        None => None,
    })
}
