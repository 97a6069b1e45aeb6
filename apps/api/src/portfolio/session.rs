//! In-memory session store. Nothing here is persisted: dropping a session
//! (or restarting the process) forgets its credential and portfolio.
//!
//! Sessions idle for longer than the store's timeout are evicted, both lazily
//! on lookup and by a periodic sweep.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::Credential;
use crate::models::{RenderConfig, ResumeData};
use crate::planning::DesignPlan;

/// Everything one successful run produces. Built off-session and committed whole.
#[derive(Debug, Clone)]
pub struct PortfolioSnapshot {
    pub record: ResumeData,
    pub brief_md: String,
    pub design_plan: DesignPlan,
    pub render_config: RenderConfig,
    pub seed: u32,
    pub created_at: DateTime<Utc>,
}

pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    credential: RwLock<Option<Credential>>,
    snapshot: RwLock<Option<Arc<PortfolioSnapshot>>>,
    run_lock: Mutex<()>,
    last_used: RwLock<Instant>,
}

#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub has_credential: bool,
    pub model: Option<String>,
    pub has_portfolio: bool,
    pub seed: Option<u32>,
    pub portfolio_created_at: Option<DateTime<Utc>>,
    pub run_in_progress: bool,
}

impl Session {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            credential: RwLock::new(None),
            snapshot: RwLock::new(None),
            run_lock: Mutex::new(()),
            last_used: RwLock::new(Instant::now()),
        }
    }

    async fn touch(&self) {
        *self.last_used.write().await = Instant::now();
    }

    /// Idle past `timeout` and not running. A running session is never expired.
    async fn is_expired(&self, timeout: Duration) -> bool {
        self.last_used.read().await.elapsed() >= timeout && self.run_lock.try_lock().is_ok()
    }

    pub async fn credential(&self) -> Option<Credential> {
        self.credential.read().await.clone()
    }

    pub async fn set_credential(&self, credential: Credential) {
        info!("Session {}: credential set (model {})", self.id, credential.model);
        *self.credential.write().await = Some(credential);
    }

    pub async fn clear_credential(&self) {
        info!("Session {}: credential cleared", self.id);
        *self.credential.write().await = None;
    }

    pub async fn snapshot(&self) -> Option<Arc<PortfolioSnapshot>> {
        self.snapshot.read().await.clone()
    }

    /// The committed snapshot, or `NotFound` if no run has succeeded yet.
    pub async fn require_snapshot(&self) -> Result<Arc<PortfolioSnapshot>, AppError> {
        self.snapshot().await.ok_or_else(|| {
            AppError::NotFound(format!("Session {} has no portfolio yet", self.id))
        })
    }

    /// Replaces the previous snapshot in a single assignment.
    pub async fn commit(&self, snapshot: PortfolioSnapshot) {
        info!(
            "Session {}: committed portfolio (seed {}, {} sections)",
            self.id,
            snapshot.seed,
            snapshot.render_config.sections.len()
        );
        *self.snapshot.write().await = Some(Arc::new(snapshot));
    }

    /// Claims the session's single run slot. A second concurrent run is refused.
    pub fn begin_run(&self) -> Result<MutexGuard<'_, ()>, AppError> {
        self.run_lock.try_lock().map_err(|_| AppError::RunInProgress)
    }

    pub async fn summary(&self) -> SessionSummary {
        let credential = self.credential().await;
        let snapshot = self.snapshot().await;
        SessionSummary {
            session_id: self.id,
            created_at: self.created_at,
            has_credential: credential.is_some(),
            model: credential.map(|c| c.model.to_string()),
            has_portfolio: snapshot.is_some(),
            seed: snapshot.as_ref().map(|s| s.seed),
            portfolio_created_at: snapshot.map(|s| s.created_at),
            run_in_progress: self.run_lock.try_lock().is_err(),
        }
    }
}

pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Arc<Session>>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    pub async fn create(&self) -> Arc<Session> {
        self.evict_idle().await;
        let session = Arc::new(Session::new());
        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());
        info!("Session {} created", session.id);
        session
    }

    /// Looks up a live session and marks it used. An expired session is
    /// dropped and reported as `NotFound`.
    pub async fn get(&self, id: Uuid) -> Result<Arc<Session>, AppError> {
        let not_found = || AppError::NotFound(format!("Session {id} not found"));
        let session = self
            .sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(not_found)?;

        if session.is_expired(self.idle_timeout).await {
            self.sessions.write().await.remove(&id);
            info!("Session {id} expired after {:?} idle", self.idle_timeout);
            return Err(not_found());
        }
        session.touch().await;
        Ok(session)
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        match self.sessions.write().await.remove(&id) {
            Some(_) => {
                info!("Session {id} removed");
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Session {id} not found"))),
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops every expired session, returning how many went.
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let mut expired = Vec::new();
        for (id, session) in sessions.iter() {
            if session.is_expired(self.idle_timeout).await {
                expired.push(*id);
            }
        }
        for id in &expired {
            sessions.remove(id);
        }
        if !expired.is_empty() {
            info!("Evicted {} idle sessions", expired.len());
        }
        expired.len()
    }

    /// Background task calling `evict_idle` every `period`.
    pub fn spawn_idle_sweep(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let evicted = store.evict_idle().await;
                debug!("Idle sweep finished ({evicted} evicted)");
            }
        })
    }
}
