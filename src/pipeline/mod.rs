pub mod language_detect;
pub mod prompt;
pub mod completion;
pub mod orchestrator;

pub use completion::{CompletionClient, CompletionError, MockCompletionClient, OpenAiClient};
pub use language_detect::{detect_or_default, Detection, DetectionError, LanguageDetector, WhatlangDetector};
pub use orchestrator::{Simplification, Simplifier};
pub use prompt::{compose, PromptPair};

use thiserror::Error;

use crate::secrets::ConfigurationError;

/// Why a submission produced no simplification.
///
/// `Display` is the user-facing message; provider detail stays in the
/// source chain and is exposed separately through [`SimplifyError::detail`].
#[derive(Error, Debug)]
pub enum SimplifyError {
    #[error("Please paste a report first.")]
    Input,

    #[error("You've reached the limit of {cap} uses for this session. Please refresh or restart to continue.")]
    UsageLimit { cap: u32 },

    #[error("❌ {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Something went wrong. Please try again.")]
    Provider(#[source] CompletionError),
}

impl SimplifyError {
    /// Recovered locally and shown as a warning rather than an error.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Input | Self::UsageLimit { .. })
    }

    /// Diagnostic text to show alongside the primary message.
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Provider(e) => Some(e.to_string()),
            _ => None,
        }
    }
}
