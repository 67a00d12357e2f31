//! Runtime configuration and credential resolution.
//!
//! Settings arrive from CLI flags with environment fallbacks (see `main.rs`).
//! Credentials are resolved through a [`CredentialProvider`] handed to the
//! completion client at construction, so nothing deep in the library reads
//! the process environment on its own.

use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::commit::impact::{HistoryPolicy, ImpactWeights};

/// Default chat-completion endpoint.
pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "anthropic/claude-4.5-sonnet";

/// Environment variables checked for the API credential, in order.
pub const CREDENTIAL_ENV_VARS: [&str; 2] = ["OPENROUTER_API_KEY", "GITGENIE_API_KEY"];

/// Fixed client-side timeout for a completion request.
pub const COMPLETION_TIMEOUT_SECS: u64 = 120;

/// Default directory for generated change pages, under the repository root.
pub const DEFAULT_DOCS_DIR: &str = "docs/changes";

/// Default changelog index file, under the repository root.
pub const DEFAULT_CHANGELOG: &str = "CHANGELOG.md";

/// Result of looking up a credential.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Present(String),
    /// No value was found; `variable` names where it was expected.
    Missing { variable: String },
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Present(_) => f.write_str("Credential::Present(***)"),
            Credential::Missing { variable } => {
                write!(f, "Credential::Missing {{ variable: {variable} }}")
            }
        }
    }
}

/// Source of the bearer credential for the completion endpoint.
pub trait CredentialProvider: Send + Sync {
    fn resolve(&self) -> Credential;
}

/// Reads the credential from the first non-empty environment variable.
pub struct EnvCredentials {
    variables: Vec<String>,
}

impl EnvCredentials {
    pub fn new<I, S>(variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            variables: variables.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new(CREDENTIAL_ENV_VARS)
    }
}

impl CredentialProvider for EnvCredentials {
    fn resolve(&self) -> Credential {
        for name in &self.variables {
            if let Ok(value) = env::var(name) {
                let value = value.trim();
                if !value.is_empty() {
                    return Credential::Present(value.to_string());
                }
            }
        }

        Credential::Missing {
            variable: self.variables.join(" or "),
        }
    }
}

/// A credential supplied directly, e.g. from `--api-key`.
pub struct StaticCredentials(String);

impl StaticCredentials {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl CredentialProvider for StaticCredentials {
    fn resolve(&self) -> Credential {
        if self.0.trim().is_empty() {
            Credential::Missing {
                variable: "--api-key".to_string(),
            }
        } else {
            Credential::Present(self.0.trim().to_string())
        }
    }
}

/// Wire format spoken by the completion endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ApiFormat {
    /// `{model, messages, temperature}` chat-completions payload.
    #[default]
    Chat,
    /// `{model, max_tokens, temperature, system, messages}` payload.
    Messages,
}

/// Completion endpoint settings.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_url: String,
    pub model: String,
    pub format: ApiFormat,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            format: ApiFormat::Chat,
        }
    }
}

/// Everything the pipelines need apart from the credential.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub completion: CompletionConfig,
    pub record_store: Option<String>,
    pub weights: ImpactWeights,
    pub history_policy: HistoryPolicy,
    pub docs_dir: PathBuf,
    pub changelog_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            completion: CompletionConfig::default(),
            record_store: None,
            weights: ImpactWeights::default(),
            history_policy: HistoryPolicy::default(),
            docs_dir: PathBuf::from(DEFAULT_DOCS_DIR),
            changelog_path: PathBuf::from(DEFAULT_CHANGELOG),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_env_credentials_reads_first_variable() {
        temp_env::with_vars(
            [
                ("OPENROUTER_API_KEY", Some("sk-primary")),
                ("GITGENIE_API_KEY", Some("sk-secondary")),
            ],
            || {
                let cred = EnvCredentials::default().resolve();
                assert_eq!(cred, Credential::Present("sk-primary".to_string()));
            },
        );
    }

    #[test]
    #[serial]
    fn test_env_credentials_falls_back_to_second_variable() {
        temp_env::with_vars(
            [
                ("OPENROUTER_API_KEY", Some("  ")),
                ("GITGENIE_API_KEY", Some("sk-secondary")),
            ],
            || {
                let cred = EnvCredentials::default().resolve();
                assert_eq!(cred, Credential::Present("sk-secondary".to_string()));
            },
        );
    }

    #[test]
    #[serial]
    fn test_env_credentials_missing_names_variables() {
        temp_env::with_vars_unset(["OPENROUTER_API_KEY", "GITGENIE_API_KEY"], || {
            let cred = EnvCredentials::default().resolve();
            assert_eq!(
                cred,
                Credential::Missing {
                    variable: "OPENROUTER_API_KEY or GITGENIE_API_KEY".to_string()
                }
            );
        });
    }

    #[test]
    fn test_static_credentials_blank_is_missing() {
        assert!(matches!(
            StaticCredentials::new("   ").resolve(),
            Credential::Missing { .. }
        ));
        assert_eq!(
            StaticCredentials::new("sk-1").resolve(),
            Credential::Present("sk-1".to_string())
        );
    }

    #[test]
    fn test_credential_debug_hides_secret() {
        let cred = Credential::Present("sk-secret".to_string());
        assert!(!format!("{:?}", cred).contains("sk-secret"));
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.completion.api_url, DEFAULT_API_URL);
        assert_eq!(config.completion.format, ApiFormat::Chat);
        assert_eq!(config.docs_dir, PathBuf::from("docs/changes"));
        assert!(config.record_store.is_none());
    }
}
