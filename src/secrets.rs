//! Provider API key resolution.
//!
//! The key is looked up on every submission: the process environment
//! wins, then a TOML secrets file. Empty values count as absent. Neither
//! source is cached, so rotating the key needs no restart.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config;

/// No API key could be resolved from any source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("OpenAI API key not found. Please set {name} in the environment or the secrets file.")]
pub struct ConfigurationError {
    pub name: &'static str,
}

/// A named-secret lookup.
pub trait SecretSource: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads secrets from process environment variables.
pub struct EnvSource;

impl SecretSource for EnvSource {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Reads top-level string keys from a TOML file, re-read on each lookup.
pub struct TomlSecretsFile {
    path: PathBuf,
}

impl TomlSecretsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SecretSource for TomlSecretsFile {
    fn get(&self, name: &str) -> Option<String> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "Secrets file not readable");
                return None;
            }
        };
        let table: toml::Table = match raw.parse() {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Secrets file is not valid TOML");
                return None;
            }
        };
        table.get(name).and_then(|v| v.as_str()).map(str::to_string)
    }
}

/// In-memory secrets, for tests and embedding.
#[derive(Default)]
pub struct StaticSecrets(HashMap<String, String>);

impl StaticSecrets {
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.0.insert(name.to_string(), value.to_string());
        self
    }
}

impl SecretSource for StaticSecrets {
    fn get(&self, name: &str) -> Option<String> {
        self.0.get(name).cloned()
    }
}

/// Resolves the provider API key from the environment, then the secrets store.
pub struct ApiKeyResolver {
    env: Box<dyn SecretSource>,
    store: Box<dyn SecretSource>,
}

impl ApiKeyResolver {
    pub fn new(env: Box<dyn SecretSource>, store: Box<dyn SecretSource>) -> Self {
        Self { env, store }
    }

    /// Environment plus the given secrets file.
    pub fn from_env_and_file(path: impl Into<PathBuf>) -> Self {
        Self::new(Box::new(EnvSource), Box::new(TomlSecretsFile::new(path)))
    }

    pub fn resolve(&self) -> Result<String, ConfigurationError> {
        let name = config::API_KEY_NAME;
        non_empty(self.env.get(name))
            .or_else(|| non_empty(self.store.get(name)))
            .ok_or(ConfigurationError { name })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn resolver(env: StaticSecrets, store: StaticSecrets) -> ApiKeyResolver {
        ApiKeyResolver::new(Box::new(env), Box::new(store))
    }

    #[test]
    fn environment_takes_priority() {
        let r = resolver(
            StaticSecrets::default().with("OPENAI_API_KEY", "sk-env"),
            StaticSecrets::default().with("OPENAI_API_KEY", "sk-file"),
        );
        assert_eq!(r.resolve().unwrap(), "sk-env");
    }

    #[test]
    fn falls_back_to_store() {
        let r = resolver(
            StaticSecrets::default(),
            StaticSecrets::default().with("OPENAI_API_KEY", "sk-file"),
        );
        assert_eq!(r.resolve().unwrap(), "sk-file");
    }

    #[test]
    fn empty_env_value_counts_as_missing() {
        let r = resolver(
            StaticSecrets::default().with("OPENAI_API_KEY", "  "),
            StaticSecrets::default().with("OPENAI_API_KEY", "sk-file"),
        );
        assert_eq!(r.resolve().unwrap(), "sk-file");
    }

    #[test]
    fn both_missing_is_configuration_error() {
        let r = resolver(StaticSecrets::default(), StaticSecrets::default());
        let err = r.resolve().unwrap_err();
        assert_eq!(err.name, "OPENAI_API_KEY");
        assert!(err.to_string().contains("API key not found"));
    }

    #[test]
    fn toml_file_reads_top_level_key() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "OPENAI_API_KEY = \"sk-toml\"\nOTHER = 1").unwrap();
        let source = TomlSecretsFile::new(file.path());
        assert_eq!(source.get("OPENAI_API_KEY").as_deref(), Some("sk-toml"));
        assert_eq!(source.get("OTHER"), None);
    }

    #[test]
    fn missing_toml_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let source = TomlSecretsFile::new(dir.path().join("absent.toml"));
        assert_eq!(source.get("OPENAI_API_KEY"), None);
    }

    #[test]
    fn malformed_toml_file_is_empty_store() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "this is = = not toml").unwrap();
        let source = TomlSecretsFile::new(file.path());
        assert_eq!(source.get("OPENAI_API_KEY"), None);
    }
}
