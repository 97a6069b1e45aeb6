// Planning: record → brief → design plan → render configuration.
// Backends live behind the `Planner` trait; every configuration passes the
// render contract before anyone sees it.

pub mod contract;
pub mod design_plan;
pub mod planner;
pub mod presets;
pub mod prompts;

pub use design_plan::DesignPlan;
pub use planner::{Design, LlmPlanner, Planner, PresetPlanner};

use tracing::info;

use crate::errors::AppError;
use crate::llm_client::Credential;
use crate::models::ResumeData;

/// Runs the planner's design step and enforces the render contract on its output.
pub async fn plan_design(
    planner: &dyn Planner,
    credential: Option<&Credential>,
    record: &ResumeData,
    brief_md: &str,
    seed: u32,
) -> Result<Design, AppError> {
    let design = planner.design(credential, record, brief_md, seed).await?;
    let render_config = contract::enforce(design.render_config, record)?;
    info!(
        "Design ready via {} backend: {} sections",
        planner.backend(),
        render_config.sections.len()
    );
    Ok(Design {
        plan: design.plan,
        render_config,
    })
}
