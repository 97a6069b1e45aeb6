use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::TextModel;
use crate::planning::Planner;
use crate::portfolio::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: Arc<SessionStore>,
    /// Model used for extraction. `LlmClient` in production, scripted in tests.
    pub model: Arc<dyn TextModel>,
    /// Pluggable planner. Default: LlmPlanner. Swap via PLANNER_BACKEND.
    pub planner: Arc<dyn Planner>,
}
