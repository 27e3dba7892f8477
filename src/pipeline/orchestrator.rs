use std::sync::Arc;

use super::completion::CompletionClient;
use super::language_detect::{detect_or_default, LanguageDetector};
use super::prompt::compose;
use super::SimplifyError;
use crate::config;
use crate::secrets::ApiKeyResolver;
use crate::session::Session;

/// Successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Simplification {
    pub text: String,
    pub language: String,
    pub usage_count: u32,
}

/// Report simplification orchestrator.
///
/// Coordinates: validate → gate → resolve key → detect → compose → complete → cache.
pub struct Simplifier {
    completion: Arc<dyn CompletionClient>,
    detector: Arc<dyn LanguageDetector>,
    keys: ApiKeyResolver,
}

impl Simplifier {
    pub fn new(
        completion: Arc<dyn CompletionClient>,
        detector: Arc<dyn LanguageDetector>,
        keys: ApiKeyResolver,
    ) -> Self {
        Self {
            completion,
            detector,
            keys,
        }
    }

    /// Run one submission against `session`.
    ///
    /// Blocks for the provider call. The session is only mutated on
    /// success, so rejected or failed submissions never consume a use.
    pub fn simplify(&self, session: &mut Session, report: &str) -> Result<Simplification, SimplifyError> {
        let trimmed = report.trim();
        if trimmed.is_empty() {
            return Err(SimplifyError::Input);
        }
        if !session.check_allowed() {
            tracing::info!(usage = session.usage_count(), "Submission rejected: usage cap reached");
            return Err(SimplifyError::UsageLimit {
                cap: config::USAGE_CAP,
            });
        }

        let api_key = self.keys.resolve().map_err(|e| {
            tracing::error!(error = %e, "Provider API key missing");
            SimplifyError::from(e)
        })?;

        let detection = detect_or_default(self.detector.as_ref(), trimmed);
        let prompt = compose(report, &detection.code);

        tracing::info!(
            report_chars = report.chars().count(),
            language = %detection.code,
            fell_back = detection.fell_back,
            "Requesting simplification"
        );

        let text = self
            .completion
            .complete(&prompt.system, &prompt.user, &api_key)
            .map_err(|e| {
                tracing::error!(error = %e, "Completion failed");
                SimplifyError::Provider(e)
            })?;

        session.record_success(text.clone(), Some(detection.code.clone()));
        tracing::info!(usage = session.usage_count(), "Simplification complete");

        Ok(Simplification {
            text,
            language: detection.code,
            usage_count: session.usage_count(),
        })
    }
}
