// Prompt constants for resume comparison and resume ingestion.
// Reuses cross-cutting fragments from llm_client::prompts.
//
// User text is never substituted into these templates with `.replace`:
// the comparison prompt is assembled by concatenation so placeholder-looking
// text inside a resume stays literal.

use crate::llm_client::prompts::{JSON_BLOCK_INSTRUCTION, UNTRUSTED_INPUT_INSTRUCTION};

/// System prompt for resume vs. job comparison.
pub const COMPARISON_SYSTEM: &str =
    "You are an applicant tracking system (ATS) that evaluates resumes against job descriptions. \
    You are precise, evidence-driven and never invent qualifications the resume does not show.";

/// Task description placed before the resume.
pub const COMPARISON_TASK: &str = "\
You will receive a resume and a job description. Analyze the resume and provide a detailed \
comparison, highlighting its strengths and weaknesses in relation to the job description. \
Focus on the key skills, qualifications and experiences the job requires. \
Provide a score from 0 to 100, where 0 means no match and 100 means a perfect match.";

/// Appended when the resume payload is a parsed profile rather than free text.
pub const STRUCTURED_RESUME_NOTE: &str = "\
NOTE: The resume below is pre-structured JSON extracted from the candidate's document. \
Treat its fields as high-confidence evidence of the candidate's background.";

/// Output contract, including one static worked example of the expected shape.
/// The example candidate is fictional and must not be reused in the answer.
pub const COMPARISON_OUTPUT_FORMAT: &str = r#"Return your analysis as JSON with this EXACT schema:
{
  "score": <integer 0-100>,
  "strengths": [{"title": "<short label>", "description": "<evidence from the resume>"}],
  "weaknesses": [{"title": "<short label>", "description": "<what the job needs that is missing>"}],
  "recommendations": [{"title": "<short label>", "description": "<concrete improvement>"}]
}

EXAMPLE (for a fictional candidate and job, shown only to illustrate the shape):
```json
{
  "score": 68,
  "strengths": [
    {"title": "Backend experience", "description": "Four years building REST services in Go, matching the core stack."}
  ],
  "weaknesses": [
    {"title": "No cloud certification", "description": "The role asks for an AWS certification that the resume does not list."}
  ],
  "recommendations": [
    {"title": "Quantify impact", "description": "Add latency or cost figures to the payment service project."}
  ]
}
```"#;

/// Builds the comparison prompt. Inputs are embedded verbatim.
pub fn comparison_prompt(resume: &str, job_description: &str, is_structured: bool) -> String {
    let mut prompt = String::with_capacity(resume.len() + job_description.len() + 4096);
    prompt.push_str(COMPARISON_TASK);
    prompt.push_str("\n\n");
    prompt.push_str(UNTRUSTED_INPUT_INSTRUCTION);
    prompt.push_str("\n\n");
    if is_structured {
        prompt.push_str(STRUCTURED_RESUME_NOTE);
        prompt.push_str("\n\n");
    }
    prompt.push_str("Resume:\n");
    prompt.push_str(resume);
    prompt.push_str("\n\nJob Description:\n");
    prompt.push_str(job_description);
    prompt.push_str("\n\n");
    prompt.push_str(COMPARISON_OUTPUT_FORMAT);
    prompt.push_str("\n\n");
    prompt.push_str(JSON_BLOCK_INSTRUCTION);
    prompt
}

/// System prompt for resume document ingestion.
pub const INGESTION_SYSTEM: &str =
    "You are a resume parser. You read a resume document and return its content as JSON. \
    You copy facts exactly as written and never guess missing values.";

/// Ingestion instruction sent alongside the resume document.
/// Keys with spaces are part of the stored profile format.
pub const INGESTION_PROMPT: &str = r#"Extract the resume in the attached document into JSON with this EXACT schema:
{
  "languages and technologies": ["string"],
  "projects": [{"title": "string", "description": "string"}],
  "skills": ["string"],
  "qualifications": ["string"],
  "experience": [{"job_title": "string", "company_name": "string", "description": "string"}],
  "education": [{"degree": "string", "institution": "string", "year": 2020}],
  "certifications": [{"name": "string", "issuing_organization": "string"}],
  "awards": [{"name": "string", "year": 2020}],
  "volunteer experience": [{"organization_name": "string", "role": "string", "description": "string"}],
  "publications": [{"title": "string", "publication_name": "string", "year": 2020}],
  "summary": "string"
}

Rules:
- Use an empty list for any section the resume does not have.
- Omit "year" when the document gives none.
- "summary" is the resume's own profile or objective statement. When it has
  none, write two sentences describing the candidate from the document alone.
- Do NOT summarize or rewrite descriptions."#;
