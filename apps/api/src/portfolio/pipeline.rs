//! Portfolio pipeline: decoded upload → record → brief → design → render config.
//!
//! Steps run strictly in sequence. A run produces a `PortfolioSnapshot` without
//! touching the session; the caller commits it only on success.

use std::future::Future;

use chrono::Utc;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::ingest::extraction::extract_resume;
use crate::ingest::upload::DecodedUpload;
use crate::ingest::validation::parse_resume;
use crate::llm_client::{Credential, TextModel};
use crate::models::ResumeData;
use crate::planning::{plan_design, Planner};
use crate::portfolio::session::PortfolioSnapshot;

/// Retries allowed after the first failure of a whole run.
pub const MAX_PIPELINE_RETRIES: u32 = 1;

/// The collaborators a run needs.
#[derive(Clone, Copy)]
pub struct Pipeline<'a> {
    pub model: &'a dyn TextModel,
    pub planner: &'a dyn Planner,
}

/// Fails with `MissingCredential` when any step of this run would need a key
/// the session does not have. Runs before any network I/O.
pub fn check_credential(
    upload: &DecodedUpload,
    planner: &dyn Planner,
    credential: Option<&Credential>,
) -> Result<(), AppError> {
    if credential.is_none() && matches!(upload, DecodedUpload::Text(_)) {
        return Err(AppError::MissingCredential);
    }
    check_planner_credential(planner, credential)
}

/// The planning-only half of the gate, used when re-planning an existing record.
pub fn check_planner_credential(
    planner: &dyn Planner,
    credential: Option<&Credential>,
) -> Result<(), AppError> {
    if credential.is_none() && planner.requires_credential() {
        return Err(AppError::MissingCredential);
    }
    Ok(())
}

impl Pipeline<'_> {
    pub async fn ingest(
        &self,
        credential: Option<&Credential>,
        upload: &DecodedUpload,
    ) -> Result<ResumeData, AppError> {
        match upload {
            DecodedUpload::Json(text) => {
                info!("Validating uploaded JSON resume");
                Ok(parse_resume(text)?)
            }
            DecodedUpload::Text(text) => {
                let credential = credential.ok_or(AppError::MissingCredential)?;
                extract_resume(self.model, credential, text).await
            }
        }
    }

    /// One full run from upload to snapshot.
    pub async fn run(
        &self,
        credential: Option<&Credential>,
        upload: &DecodedUpload,
        seed: u32,
    ) -> Result<PortfolioSnapshot, AppError> {
        let record = self.ingest(credential, upload).await?;
        let brief_md = self.planner.write_brief(credential, &record).await?;
        self.design(credential, record, brief_md, seed).await
    }

    /// Re-plans the design for an existing record and brief.
    pub async fn design(
        &self,
        credential: Option<&Credential>,
        record: ResumeData,
        brief_md: String,
        seed: u32,
    ) -> Result<PortfolioSnapshot, AppError> {
        let design = plan_design(self.planner, credential, &record, &brief_md, seed).await?;
        Ok(PortfolioSnapshot {
            record,
            brief_md,
            design_plan: design.plan,
            render_config: design.render_config,
            seed,
            created_at: Utc::now(),
        })
    }
}

/// Runs `op`, and once more if the first attempt fails with a retryable error.
pub async fn run_with_retry<T, F, Fut>(label: &str, mut op: F) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < MAX_PIPELINE_RETRIES && err.is_retryable() => {
                attempt += 1;
                warn!(
                    "{label} attempt {}/{} failed: {err}; retrying",
                    attempt,
                    MAX_PIPELINE_RETRIES + 1
                );
            }
            Err(err) => return Err(err),
        }
    }
}
