use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Application-level constants
pub const APP_NAME: &str = "Radiology Simplifier";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum number of successful simplifications per session.
pub const USAGE_CAP: u32 = 3;

/// Completion model and sampling temperature sent with every request.
pub const MODEL: &str = "gpt-4o-mini";
pub const TEMPERATURE: f32 = 0.4;

/// Name of the secret holding the provider API key (env var and secrets file key).
pub const API_KEY_NAME: &str = "OPENAI_API_KEY";

/// Language code used when detection cannot decide.
pub const FALLBACK_LANGUAGE: &str = "en";

/// File name offered for the downloaded explanation.
pub const DOWNLOAD_FILE_NAME: &str = "simplified_report.txt";

/// Longest feedback comment accepted, in characters.
pub const FEEDBACK_COMMENT_MAX_CHARS: usize = 300;

pub const DEFAULT_BIND: &str = "127.0.0.1:8501";
pub const DEFAULT_PROVIDER_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_FEEDBACK_URL: &str = "https://script.google.com/macros/s/AKfycbwTye0hGdBuedw5ujTvkfVneULDhz7YETxuwJjUwiBb5YiprxEciU2kLLo4uPCGeIfVxw/exec";
pub const DEFAULT_SECRETS_FILE: &str = ".streamlit/secrets.toml";

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "radiology_simplifier=info,tower_http=warn"
}

/// Runtime settings, from command-line flags or environment variables.
#[derive(Debug, Clone, Parser)]
#[command(name = "radiology-simplifier", version, about = "Rewrite radiology reports in plain language")]
pub struct Settings {
    /// Address the web form listens on.
    #[arg(long, env = "SIMPLIFIER_BIND", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// Base URL of the OpenAI-compatible completion API.
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_PROVIDER_URL)]
    pub provider_url: String,

    /// Transport timeout for one completion request.
    #[arg(long, env = "SIMPLIFIER_PROVIDER_TIMEOUT_SECS", default_value_t = 120)]
    pub provider_timeout_secs: u64,

    /// Webhook receiving feedback records.
    #[arg(long, env = "SIMPLIFIER_FEEDBACK_URL", default_value = DEFAULT_FEEDBACK_URL)]
    pub feedback_url: String,

    /// TOML file consulted for OPENAI_API_KEY when the env var is unset.
    #[arg(long, env = "SIMPLIFIER_SECRETS_FILE", default_value = DEFAULT_SECRETS_FILE)]
    pub secrets_file: PathBuf,

    /// Sessions idle longer than this are dropped.
    #[arg(long, env = "SIMPLIFIER_SESSION_IDLE_SECS", default_value_t = 3600)]
    pub session_idle_secs: u64,

    /// Live sessions kept at once; the least recently seen is ended beyond this.
    #[arg(long, env = "SIMPLIFIER_MAX_SESSIONS", default_value_t = 10_000)]
    pub max_sessions: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_flags() {
        let settings = Settings::try_parse_from(["radiology-simplifier"]).unwrap();
        assert_eq!(settings.bind, DEFAULT_BIND.parse::<SocketAddr>().unwrap());
        assert_eq!(settings.provider_url, DEFAULT_PROVIDER_URL);
        assert_eq!(settings.secrets_file, PathBuf::from(DEFAULT_SECRETS_FILE));
        assert_eq!(settings.session_idle_secs, 3600);
        assert_eq!(settings.max_sessions, 10_000);
    }

    #[test]
    fn flags_override_defaults() {
        let settings = Settings::try_parse_from([
            "radiology-simplifier",
            "--bind",
            "0.0.0.0:9000",
            "--feedback-url",
            "http://localhost:1/hook",
            "--provider-timeout-secs",
            "5",
        ])
        .unwrap();
        assert_eq!(settings.bind.port(), 9000);
        assert_eq!(settings.feedback_url, "http://localhost:1/hook");
        assert_eq!(settings.provider_timeout_secs, 5);
    }

    #[test]
    fn invalid_bind_is_rejected() {
        assert!(Settings::try_parse_from(["radiology-simplifier", "--bind", "nope"]).is_err());
    }

    #[test]
    fn usage_cap_is_three() {
        assert_eq!(USAGE_CAP, 3);
    }
}
