//! Extraction adapter: raw résumé text → model → brace span → validated record.
//!
//! Parse and schema failures are returned as errors. Nothing here retries; the
//! pipeline decides whether the whole run is attempted again.

use tracing::info;

use crate::errors::AppError;
use crate::ingest::prompts::extraction_prompt;
use crate::ingest::validation::{validate_resume, SchemaError};
use crate::llm_client::{extract_json_span, Credential, TextModel, EXTRACTION_TEMPERATURE};
use crate::models::ResumeData;

pub async fn extract_resume(
    model: &dyn TextModel,
    credential: &Credential,
    resume_text: &str,
) -> Result<ResumeData, AppError> {
    let request = credential.request(extraction_prompt(resume_text), EXTRACTION_TEMPERATURE);
    info!(
        "Extracting resume ({} chars) with {}",
        resume_text.len(),
        credential.model
    );

    let reply = model.generate(&credential.key, &request).await?;
    parse_extraction_reply(&reply)
}

/// The reply must contain a JSON object that satisfies the résumé schema.
pub fn parse_extraction_reply(reply: &str) -> Result<ResumeData, AppError> {
    let span = extract_json_span(reply).map_err(|e| AppError::ResponseParseFailed(e.to_string()))?;
    let value = serde_json::from_str(span).map_err(|e| {
        AppError::ResponseParseFailed(format!("extracted span is not valid JSON: {e}"))
    })?;
    match validate_resume(value) {
        Ok(record) => Ok(record),
        Err(err @ SchemaError::WrongShape(_)) => Err(AppError::SchemaMismatch(err)),
        Err(err) => Err(AppError::ResponseParseFailed(err.to_string())),
    }
}
