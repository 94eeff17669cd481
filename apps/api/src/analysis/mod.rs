// AI document analysis: resume vs. job comparison, resume ingestion into a
// structured profile, and local text extraction. Model output is untrusted
// and goes through response_parser or the ingestion decoder only.

pub mod comparison;
pub mod documents;
pub mod extract;
#[cfg(test)]
pub mod fakes;
pub mod fetch;
pub mod handlers;
pub mod ingestion;
pub mod prompts;
pub mod response_parser;
