//! Per-session interaction state.
//!
//! Key properties:
//! - State exists only in memory and is never persisted
//! - One `Session` per browser session, keyed by a server-minted UUID
//! - Each session sits behind its own async mutex; a submission holds it
//!   for the whole request so the usage cap cannot be raced
//! - Idle sessions are evicted, which ends them like a restart would
//! - The number of live sessions is capped; at the cap the least recently
//!   seen session is ended to make room

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::config;

// ═══════════════════════════════════════════════════════════
// Session, one user's interaction state
// ═══════════════════════════════════════════════════════════

/// Counters and cached values for one user session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    usage_count: u32,
    last_result: Option<String>,
    detected_language: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn usage_count(&self) -> u32 {
        self.usage_count
    }

    pub fn last_result(&self) -> Option<&str> {
        self.last_result.as_deref()
    }

    pub fn detected_language(&self) -> Option<&str> {
        self.detected_language.as_deref()
    }

    /// Whether another submission may reach the provider. Never mutates.
    pub fn check_allowed(&self) -> bool {
        self.usage_count < config::USAGE_CAP
    }

    /// Uses left before the cap.
    pub fn remaining(&self) -> u32 {
        config::USAGE_CAP.saturating_sub(self.usage_count)
    }

    /// Count one successful completion and cache its output.
    ///
    /// Only called after the provider answered; failed calls never reach here.
    pub fn record_success(&mut self, result: String, language: Option<String>) {
        debug_assert!(self.check_allowed());
        self.usage_count = (self.usage_count + 1).min(config::USAGE_CAP);
        self.last_result = Some(result);
        self.detected_language = language;
    }
}

// ═══════════════════════════════════════════════════════════
// SessionStore, all live sessions
// ═══════════════════════════════════════════════════════════

pub type SharedSession = Arc<tokio::sync::Mutex<Session>>;

struct Entry {
    session: SharedSession,
    last_seen: Instant,
}

/// Live sessions keyed by session id.
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, Entry>>,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_timeout,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Look up a session, creating one when the id is absent or unknown.
    ///
    /// Returns the effective id, which differs from the requested one when
    /// a new session was minted. Client-supplied ids are never adopted.
    pub fn get_or_create(&self, id: Option<Uuid>) -> Result<(Uuid, SharedSession), SessionStoreError> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| SessionStoreError::LockPoisoned)?;

        let now = Instant::now();
        let timeout = self.idle_timeout;
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) <= timeout);
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted idle sessions");
        }

        if let Some(id) = id {
            if let Some(entry) = sessions.get_mut(&id) {
                entry.last_seen = now;
                return Ok((id, entry.session.clone()));
            }
        }

        if sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| *id);
            if let Some(oldest) = oldest {
                sessions.remove(&oldest);
                tracing::warn!(max = self.max_sessions, "Session limit reached, ended least recent session");
            }
        }

        let id = Uuid::new_v4();
        let session: SharedSession = Arc::new(tokio::sync::Mutex::new(Session::new()));
        sessions.insert(
            id,
            Entry {
                session: session.clone(),
                last_seen: now,
            },
        );
        tracing::debug!(live = sessions.len(), "Session created");
        Ok((id, session))
    }

    /// End a session now. Unknown ids are ignored.
    pub fn end(&self, id: &Uuid) -> Result<(), SessionStoreError> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| SessionStoreError::LockPoisoned)?;
        if sessions.remove(id).is_some() {
            tracing::debug!("Session ended");
        }
        Ok(())
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Session store lock poisoned")]
    LockPoisoned,
}
