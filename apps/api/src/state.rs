//! Shared application state.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::leonar::LeonarClient;
use crate::llm_client::LlmClient;
use crate::usage::UsageTracker;

/// A configured pair of vendor clients, built when the user submits their
/// keys and replaced wholesale when they submit new ones.
#[derive(Clone)]
pub struct Session {
    pub leonar: LeonarClient,
    pub llm: LlmClient,
}

/// Shared state for all routes.
///
/// The API keys live only inside the clients held here, in memory. Nothing
/// is written to disk and a restart clears them.
#[derive(Clone)]
pub struct AppState {
    session: Arc<RwLock<Option<Session>>>,
    pub usage: UsageTracker,
}

impl AppState {
    pub fn new(usage: UsageTracker) -> Self {
        Self {
            session: Arc::new(RwLock::new(None)),
            usage,
        }
    }

    /// Replaces the active session.
    pub async fn set_session(&self, session: Session) {
        *self.session.write().await = Some(session);
    }

    /// Clones the active session, or fails if keys were never submitted.
    pub async fn session(&self) -> Result<Session, AppError> {
        self.session
            .read()
            .await
            .clone()
            .ok_or(AppError::MissingCredentials)
    }

    pub async fn has_session(&self) -> bool {
        self.session.read().await.is_some()
    }
}
