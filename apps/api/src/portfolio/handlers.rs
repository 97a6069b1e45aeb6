use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::MutexGuard;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::export::{export_zip, BUNDLE_FILENAME};
use crate::ingest::upload::{
    check_declared_size, decode_upload, read_file_field, MULTIPART_OVERHEAD_BYTES,
};
use crate::ingest::validation::{parse_resume, validate_resume};
use crate::llm_client::{ApiKey, Credential, GeminiModel};
use crate::models::{RenderConfig, ResumeData};
use crate::portfolio::pipeline::{
    check_credential, check_planner_credential, run_with_retry, Pipeline,
};
use crate::planning::DesignPlan;
use crate::portfolio::session::{PortfolioSnapshot, Session, SessionSummary};
use crate::render::{render_preview, RenderedPage};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CredentialRequest {
    pub api_key: String,
    pub model: Option<String>,
}

#[derive(Deserialize)]
pub struct ShuffleRequest {
    pub seed: Option<u32>,
}

#[derive(Serialize)]
pub struct RunResponse {
    pub session: SessionSummary,
    pub sections: Vec<&'static str>,
    pub design_plan: DesignPlan,
}

impl RunResponse {
    /// Commits `snapshot`, releases the run slot and reports the new state.
    async fn commit(
        session: &Session,
        guard: MutexGuard<'_, ()>,
        snapshot: PortfolioSnapshot,
    ) -> Self {
        let sections = snapshot
            .render_config
            .effective_sections()
            .map(|s| s.kind().as_str())
            .collect();
        let design_plan = snapshot.design_plan.clone();
        session.commit(snapshot).await;
        drop(guard);
        Self {
            session: session.summary().await,
            sections,
            design_plan,
        }
    }
}

#[derive(Deserialize)]
pub struct RenderRequest {
    pub record: Value,
    #[serde(default)]
    pub config: Value,
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionSummary>) {
    let session = state.sessions.create().await;
    (StatusCode::CREATED, Json(session.summary().await))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSummary>, AppError> {
    let session = state.sessions.get(id).await?;
    Ok(Json(session.summary().await))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/sessions/:id/credential
pub async fn handle_set_credential(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CredentialRequest>,
) -> Result<Json<SessionSummary>, AppError> {
    let session = state.sessions.get(id).await?;
    let key = ApiKey::new(req.api_key)
        .ok_or_else(|| AppError::Validation("api_key must not be blank".to_string()))?;
    let model = match req.model.as_deref() {
        Some(name) => GeminiModel::parse(name)
            .ok_or_else(|| AppError::Validation(format!("Unsupported model '{name}'")))?,
        None => state.config.llm_default_model,
    };
    session.set_credential(Credential { key, model }).await;
    Ok(Json(session.summary().await))
}

/// DELETE /api/v1/sessions/:id/credential
pub async fn handle_clear_credential(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let session = state.sessions.get(id).await?;
    session.clear_credential().await;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/runs
///
/// Multipart upload with a `file` field. Runs the whole pipeline (retried once)
/// and commits the snapshot only when it succeeds.
pub async fn handle_run(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<RunResponse>, AppError> {
    let limit = state.config.max_upload_bytes;
    if let Some(declared) = declared_length(&headers) {
        check_declared_size(declared.saturating_sub(MULTIPART_OVERHEAD_BYTES), limit)?;
    }

    let session = state.sessions.get(id).await?;
    let guard = session.begin_run()?;

    let upload = read_file_field(&mut multipart, limit).await?;
    let decoded = decode_upload(&upload).await?;

    let credential = session.credential().await;
    check_credential(&decoded, state.planner.as_ref(), credential.as_ref())?;

    let pipeline = Pipeline {
        model: state.model.as_ref(),
        planner: state.planner.as_ref(),
    };
    let seed = rand::random::<u32>();
    info!("Session {id}: starting run for {} (seed {seed})", upload.filename);

    let snapshot = run_with_retry("Portfolio run", || {
        pipeline.run(credential.as_ref(), &decoded, seed)
    })
    .await?;

    Ok(Json(RunResponse::commit(&session, guard, snapshot).await))
}

/// POST /api/v1/sessions/:id/shuffle
///
/// Re-plans the design for the committed record and brief with a new seed.
pub async fn handle_shuffle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    req: Option<Json<ShuffleRequest>>,
) -> Result<Json<RunResponse>, AppError> {
    let session = state.sessions.get(id).await?;
    let guard = session.begin_run()?;
    let current = session.require_snapshot().await?;

    let credential = session.credential().await;
    check_planner_credential(state.planner.as_ref(), credential.as_ref())?;

    let seed = req
        .and_then(|Json(r)| r.seed)
        .unwrap_or_else(rand::random::<u32>);
    info!("Session {id}: shuffling design (seed {seed})");

    let pipeline = Pipeline {
        model: state.model.as_ref(),
        planner: state.planner.as_ref(),
    };
    let snapshot = run_with_retry("Design shuffle", || {
        pipeline.design(
            credential.as_ref(),
            current.record.clone(),
            current.brief_md.clone(),
            seed,
        )
    })
    .await?;

    Ok(Json(RunResponse::commit(&session, guard, snapshot).await))
}

/// GET /api/v1/sessions/:id/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RenderedPage>, AppError> {
    let snapshot = state.sessions.get(id).await?.require_snapshot().await?;
    Ok(Json(render_preview(&snapshot.record, &snapshot.render_config)))
}

/// GET /api/v1/sessions/:id/prd
pub async fn handle_prd(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = state.sessions.get(id).await?.require_snapshot().await?;
    Ok((
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        snapshot.brief_md.clone(),
    ))
}

/// GET /api/v1/sessions/:id/export
pub async fn handle_export(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = state.sessions.get(id).await?.require_snapshot().await?;
    let bytes = export_zip(
        &snapshot.record,
        &snapshot.render_config,
        Some(&snapshot.brief_md),
        Utc::now().year(),
    )?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{BUNDLE_FILENAME}\""),
            ),
        ],
        bytes,
    ))
}

/// POST /api/v1/render
pub async fn handle_render(Json(req): Json<RenderRequest>) -> Result<Json<RenderedPage>, AppError> {
    let record = validate_resume(req.record)?;
    let config = if req.config.is_null() {
        RenderConfig::default()
    } else {
        RenderConfig::from_value(req.config)
            .map_err(|e| AppError::Validation(format!("Invalid render configuration: {e}")))?
    };
    Ok(Json(render_preview(&record, &config)))
}

/// POST /api/v1/validate
pub async fn handle_validate(body: Bytes) -> Result<Json<ResumeData>, AppError> {
    let text = String::from_utf8_lossy(&body);
    Ok(Json(parse_resume(&text)?))
}

fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use axum::Router;
    use tower::ServiceExt;

    use crate::config::{Config, PlannerBackend};
    use crate::llm_client::scripted::ScriptedModel;
    use crate::planning::{LlmPlanner, Planner, PresetPlanner};
    use crate::portfolio::session::SessionStore;
    use crate::routes::build_router;

    const RESUME_JSON: &str = r#"{
        "name": "Ada Lovelace",
        "headline": "Analyst",
        "summary": "Writes programs for engines.",
        "skills_core": ["Analysis"],
        "experience": [{"role": "Analyst", "company": "Engine Co", "highlights": ["Notes"]}],
        "contact": {"email": "ada@example.com"}
    }"#;

    fn state_with(model: Arc<ScriptedModel>, planner: Arc<dyn Planner>) -> AppState {
        let planner_backend = if planner.requires_credential() {
            PlannerBackend::Llm
        } else {
            PlannerBackend::Preset
        };
        AppState {
            config: Config {
                planner_backend,
                ..Config::default()
            },
            sessions: Arc::new(SessionStore::new(Duration::from_secs(600))),
            model,
            planner,
        }
    }

    fn preset_state() -> AppState {
        state_with(Arc::new(ScriptedModel::new()), Arc::new(PresetPlanner))
    }

    fn upload_request(uri: &str, filename: &str, content: &str) -> Request<Body> {
        let boundary = "folio-test-boundary";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n{content}\r\n--{boundary}--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body))
            .unwrap()
    }

    fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let (status, bytes) = send(app, request).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create_session(app: &Router) -> String {
        let (status, json) = send_json(app, empty_request("POST", "/api/v1/sessions")).await;
        assert_eq!(status, StatusCode::CREATED);
        json["session_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(preset_state());
        let (status, json) = send_json(&app, empty_request("GET", "/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "folio-api");
    }

    #[tokio::test]
    async fn test_json_upload_produces_preview_prd_and_export() {
        let app = build_router(preset_state());
        let id = create_session(&app).await;

        let (status, json) = send_json(
            &app,
            upload_request(&format!("/api/v1/sessions/{id}/runs"), "resume.json", RESUME_JSON),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{json}");
        assert_eq!(json["session"]["has_portfolio"], true);
        assert_eq!(json["session"]["run_in_progress"], false);
        assert!(json["sections"]
            .as_array()
            .unwrap()
            .iter()
            .any(|s| s == "hero"));

        let (status, preview) =
            send_json(&app, empty_request("GET", &format!("/api/v1/sessions/{id}/preview"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(preview["sections"][0]["kind"], "hero");

        let (status, prd) =
            send(&app, empty_request("GET", &format!("/api/v1/sessions/{id}/prd"))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(prd).unwrap().contains("Ada Lovelace"));

        let response = app
            .clone()
            .oneshot(empty_request("GET", &format!("/api/v1/sessions/{id}/export")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/zip");
        assert!(response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("portfolio-site.zip"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        let mut html = String::new();
        archive
            .by_name("index.html")
            .unwrap()
            .read_to_string(&mut html)
            .unwrap();
        assert!(html.contains("Ada Lovelace"));
    }

    #[tokio::test]
    async fn test_text_upload_without_key_is_rejected_before_any_model_call() {
        let model = Arc::new(ScriptedModel::new());
        let app = build_router(state_with(model.clone(), Arc::new(PresetPlanner)));
        let id = create_session(&app).await;

        let (status, json) = send_json(
            &app,
            upload_request(&format!("/api/v1/sessions/{id}/runs"), "resume.txt", "Ada Lovelace"),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["code"], "MISSING_CREDENTIAL");
        assert_eq!(model.calls(), 0);

        let (_, summary) =
            send_json(&app, empty_request("GET", &format!("/api/v1/sessions/{id}"))).await;
        assert_eq!(summary["has_portfolio"], false);
    }

    #[tokio::test]
    async fn test_llm_planner_without_key_is_rejected_for_json_upload() {
        let model = Arc::new(ScriptedModel::new());
        let planner = Arc::new(LlmPlanner::new(model.clone()));
        let app = build_router(state_with(model.clone(), planner));
        let id = create_session(&app).await;

        let (status, _) = send_json(
            &app,
            upload_request(&format!("/api/v1/sessions/{id}/runs"), "resume.json", RESUME_JSON),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_text_upload_with_key_extracts_then_plans() {
        let model = Arc::new(ScriptedModel::with_replies([RESUME_JSON]));
        let app = build_router(state_with(model.clone(), Arc::new(PresetPlanner)));
        let id = create_session(&app).await;

        let (status, _) = send_json(
            &app,
            json_request(
                "PUT",
                &format!("/api/v1/sessions/{id}/credential"),
                r#"{"api_key": "secret-key", "model": "gemini-1.5-pro"}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, json) = send_json(
            &app,
            upload_request(&format!("/api/v1/sessions/{id}/runs"), "resume.txt", "Ada Lovelace"),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{json}");
        assert_eq!(json["session"]["model"], "gemini-1.5-pro");
        assert_eq!(model.calls(), 1);
        assert!(!json.to_string().contains("secret-key"));
    }

    #[tokio::test]
    async fn test_declared_oversize_upload_is_rejected() {
        let app = build_router(preset_state());
        let id = create_session(&app).await;

        let mut request =
            upload_request(&format!("/api/v1/sessions/{id}/runs"), "resume.pdf", "tiny");
        request.headers_mut().insert(
            header::CONTENT_LENGTH,
            (12 * 1024 * 1024).to_string().parse().unwrap(),
        );
        let (status, json) = send_json(&app, request).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json["error"]["code"], "FILE_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_undeclared_oversize_upload_is_cut_off_while_streaming() {
        let mut state = preset_state();
        state.config.max_upload_bytes = 1024;
        let sessions = state.sessions.clone();
        let app = build_router(state);
        let id = create_session(&app).await;

        let mut request = upload_request(
            &format!("/api/v1/sessions/{id}/runs"),
            "resume.json",
            &"x".repeat(4096),
        );
        request.headers_mut().remove(header::CONTENT_LENGTH);
        assert!(request.headers().get(header::CONTENT_LENGTH).is_none());

        let (status, json) = send_json(&app, request).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE, "{json}");
        assert_eq!(json["error"]["code"], "FILE_TOO_LARGE");

        // nothing was committed and the run slot was released
        let session = sessions.get(id.parse().unwrap()).await.unwrap();
        assert!(session.snapshot().await.is_none());
        assert!(session.begin_run().is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_run_is_refused() {
        let state = preset_state();
        let sessions = state.sessions.clone();
        let app = build_router(state);
        let id = create_session(&app).await;

        let session = sessions.get(id.parse().unwrap()).await.unwrap();
        let _guard = session.begin_run().unwrap();

        let (status, json) = send_json(
            &app,
            upload_request(&format!("/api/v1/sessions/{id}/runs"), "resume.json", RESUME_JSON),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "RUN_IN_PROGRESS");
    }

    #[tokio::test]
    async fn test_shuffle_with_seed_replans_design() {
        let app = build_router(preset_state());
        let id = create_session(&app).await;

        let (status, json) = send_json(
            &app,
            json_request("POST", &format!("/api/v1/sessions/{id}/shuffle"), "{}"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{json}");

        send(
            &app,
            upload_request(&format!("/api/v1/sessions/{id}/runs"), "resume.json", RESUME_JSON),
        )
        .await;

        let (status, json) = send_json(
            &app,
            json_request(
                "POST",
                &format!("/api/v1/sessions/{id}/shuffle"),
                r#"{"seed": 42}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{json}");
        assert_eq!(json["session"]["seed"], 42);
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let app = build_router(preset_state());
        let id = create_session(&app).await;

        let (status, _) = send(
            &app,
            json_request(
                "PUT",
                &format!("/api/v1/sessions/{id}/credential"),
                r#"{"api_key": "   "}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            json_request(
                "PUT",
                &format!("/api/v1/sessions/{id}/credential"),
                r#"{"api_key": "k", "model": "gpt-4"}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) =
            send(&app, empty_request("DELETE", &format!("/api/v1/sessions/{id}"))).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, json) =
            send_json(&app, empty_request("GET", &format!("/api/v1/sessions/{id}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_render_endpoint_renders_configured_sections() {
        let app = build_router(preset_state());
        let body = format!(
            r#"{{"record": {RESUME_JSON}, "config": {{"sections": [{{"type": "about"}}, {{"type": "projects"}}, {{"type": "hero", "ctaLabel": "Say hi"}}]}}}}"#
        );
        let (status, json) = send_json(&app, json_request("POST", "/api/v1/render", &body)).await;
        assert_eq!(status, StatusCode::OK, "{json}");

        let kinds: Vec<&str> = json["sections"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["kind"].as_str().unwrap())
            .collect();
        assert_eq!(kinds, ["about", "hero"]);
    }

    #[tokio::test]
    async fn test_validate_endpoint_reports_schema_kind() {
        let app = build_router(preset_state());

        let (status, json) =
            send_json(&app, json_request("POST", "/api/v1/validate", "{ nope")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"]["kind"], "not_json");

        let (status, json) = send_json(
            &app,
            json_request("POST", "/api/v1/validate", r#"{"name": "  ", "skills_core": ["Rust"]}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["name"].is_null());
        assert_eq!(json["skills_core"][0], "Rust");
    }
}
