//! Feedback reporting.
//!
//! A record is posted once to the webhook as JSON. Delivery is at most
//! once: there is no retry and the record is dropped after the call,
//! whatever the outcome.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::config;

/// Thumbs-up / thumbs-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Yes,
    No,
}

impl Verdict {
    pub fn from_helpful(helpful: bool) -> Self {
        if helpful {
            Self::Yes
        } else {
            Self::No
        }
    }
}

/// One feedback submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    /// RFC 3339 (ISO-8601) time of submission.
    pub timestamp: String,
    pub feedback: Verdict,
    pub comment: String,
}

impl FeedbackRecord {
    /// Stamp a record now. The comment is trimmed and cut to the maximum length.
    pub fn new(verdict: Verdict, comment: &str) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            feedback: verdict,
            comment: clamp_comment(comment),
        }
    }
}

fn clamp_comment(comment: &str) -> String {
    comment
        .trim()
        .chars()
        .take(config::FEEDBACK_COMMENT_MAX_CHARS)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedbackError {
    #[error("Feedback endpoint answered with status {status}")]
    Rejected { status: u16 },
    #[error("Error sending feedback: {0}")]
    Transport(String),
}

/// Sink for feedback records.
pub trait FeedbackReporter: Send + Sync {
    fn submit(&self, record: &FeedbackRecord) -> Result<(), FeedbackError>;
}

/// Posts records to a fixed webhook URL.
pub struct WebhookReporter {
    url: String,
    client: reqwest::blocking::Client,
}

impl WebhookReporter {
    /// Must be called outside an async context (blocking client).
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl FeedbackReporter for WebhookReporter {
    fn submit(&self, record: &FeedbackRecord) -> Result<(), FeedbackError> {
        let response = self
            .client
            .post(&self.url)
            .json(record)
            .send()
            .map_err(|e| FeedbackError::Transport(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(FeedbackError::Rejected {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

/// Mock reporter: records every submitted record.
pub struct MockFeedbackReporter {
    outcome: Result<(), FeedbackError>,
    calls: AtomicUsize,
    records: Mutex<Vec<FeedbackRecord>>,
}

impl MockFeedbackReporter {
    pub fn accepting() -> Self {
        Self::with_outcome(Ok(()))
    }

    pub fn with_outcome(outcome: Result<(), FeedbackError>) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn records(&self) -> Vec<FeedbackRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl FeedbackReporter for MockFeedbackReporter {
    fn submit(&self, record: &FeedbackRecord) -> Result<(), FeedbackError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
        self.outcome.clone()
    }
}
