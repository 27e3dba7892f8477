//! Shared state and session cookie handling for the web form.

use std::sync::Arc;

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use uuid::Uuid;

use crate::feedback::FeedbackReporter;
use crate::pipeline::Simplifier;
use crate::session::SessionStore;

/// Cookie carrying the session id.
pub const SESSION_COOKIE: &str = "simplifier_session";

// ═══════════════════════════════════════════════════════════
// App state shared by every handler
// ═══════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub simplifier: Arc<Simplifier>,
    pub feedback: Arc<dyn FeedbackReporter>,
}

impl AppState {
    pub fn new(
        sessions: SessionStore,
        simplifier: Simplifier,
        feedback: Arc<dyn FeedbackReporter>,
    ) -> Self {
        Self {
            sessions: Arc::new(sessions),
            simplifier: Arc::new(simplifier),
            feedback,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Session cookie
// ═══════════════════════════════════════════════════════════

/// Session id from the request's cookies, if present and well-formed.
pub fn session_id_from(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// `Set-Cookie` value binding the browser to a session.
pub fn session_cookie(id: Uuid) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}
