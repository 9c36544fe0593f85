//! Runtime configuration.
//!
//! Configuration is read once from a TOML file and handed to each component's
//! constructor. Components never consult the process environment directly;
//! secrets supplied through environment variables are merged explicitly with
//! [`FaultlineConfig::apply_env`].

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::Deserialize;
use thiserror::Error;

/// Environment variable overriding the remote tracker token.
pub const SENTRY_TOKEN_ENV: &str = "FAULTLINE_SENTRY_TOKEN";
/// Environment variable overriding the primary reasoning API key.
pub const REASONING_API_KEY_ENV: &str = "FAULTLINE_REASONING_API_KEY";
/// Environment variable overriding the GitHub token.
pub const GITHUB_TOKEN_ENV: &str = "FAULTLINE_GITHUB_TOKEN";
/// Environment variable overriding the database URL.
pub const DATABASE_URL_ENV: &str = "FAULTLINE_DATABASE_URL";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read configuration file {path}: {source}")]
    Read {
        /// Configuration file path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("invalid configuration file {path}: {source}")]
    Parse {
        /// Configuration file path.
        path: Utf8PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FaultlineConfig {
    /// Local log file scanning.
    pub local: LocalLogConfig,
    /// Remote error tracker access.
    pub sentry: SentryConfig,
    /// Reasoning providers used by the classifier.
    pub reasoning: ReasoningConfig,
    /// Issue tracker used for escalation.
    pub github: GitHubConfig,
    /// Persistent store.
    pub database: DatabaseConfig,
}

impl FaultlineConfig {
    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`toml::de::Error`] when the text does not match the schema.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Loads configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let read_error = |source| ConfigError::Read {
            path: path.to_owned(),
            source,
        };
        let file_name = path
            .file_name()
            .ok_or_else(|| read_error(std::io::Error::other("path must include a file name")))?;
        let parent = path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
        let text = dir.read_to_string(file_name).map_err(read_error)?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Merges secrets from an environment lookup.
    ///
    /// Values found through `lookup` replace those from the file.
    #[must_use]
    pub fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(token) = lookup(SENTRY_TOKEN_ENV) {
            self.sentry.auth_token = Some(token);
        }
        if let Some(key) = lookup(REASONING_API_KEY_ENV) {
            self.reasoning.primary.api_key = Some(key);
        }
        if let Some(token) = lookup(GITHUB_TOKEN_ENV) {
            self.github.token = Some(token);
        }
        if let Some(url) = lookup(DATABASE_URL_ENV) {
            self.database.url = Some(url);
        }
        self
    }
}

/// Local log directory settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocalLogConfig {
    /// Directory containing the log files.
    pub directory: Utf8PathBuf,
    /// Glob matching the base log file and its rotations.
    pub file_pattern: String,
}

impl Default for LocalLogConfig {
    fn default() -> Self {
        Self {
            directory: Utf8PathBuf::from("logs"),
            file_pattern: "app.log*".to_owned(),
        }
    }
}

/// Remote error tracker settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SentryConfig {
    /// API base URL, without trailing slash.
    pub base_url: String,
    /// Organisation slug.
    pub organization: Option<String>,
    /// Project slug.
    pub project: Option<String>,
    /// Bearer token.
    pub auth_token: Option<String>,
    /// Free-text issue query.
    pub query: String,
    /// Maximum number of issues fetched per run.
    pub issue_limit: usize,
    /// Maximum number of events fetched per issue.
    pub events_per_issue: usize,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl SentryConfig {
    /// Returns `true` when organisation, project and token are all set.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.organization.is_some() && self.project.is_some() && self.auth_token.is_some()
    }
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://sentry.io/api/0".to_owned(),
            organization: None,
            project: None,
            auth_token: None,
            query: "is:unresolved".to_owned(),
            issue_limit: 100,
            events_per_issue: 5,
            timeout_secs: 30,
        }
    }
}

/// Kind of reasoning backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningBackendKind {
    /// OpenAI-compatible chat completions endpoint.
    #[default]
    ChatCompletions,
    /// Agent gateway executing a named agent.
    Kigate,
}

/// Settings for one reasoning backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReasoningBackendConfig {
    /// Backend protocol.
    pub kind: ReasoningBackendKind,
    /// API base URL, without trailing slash.
    pub base_url: String,
    /// Bearer token.
    pub api_key: Option<String>,
    /// Model name.
    pub model: String,
    /// Agent name, used by agent gateways.
    pub agent_name: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ReasoningBackendConfig {
    fn default() -> Self {
        Self {
            kind: ReasoningBackendKind::ChatCompletions,
            base_url: "https://api.openai.com/v1".to_owned(),
            api_key: None,
            model: "gpt-4o-mini".to_owned(),
            agent_name: "log-analysis-agent".to_owned(),
            timeout_secs: 60,
        }
    }
}

/// Reasoning provider settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReasoningConfig {
    /// Provider used first.
    pub primary: ReasoningBackendConfig,
    /// Provider used when the primary is unreachable.
    pub fallback: Option<ReasoningBackendConfig>,
}

/// Issue tracker settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitHubConfig {
    /// API base URL, without trailing slash.
    pub api_url: String,
    /// Target repository in `owner/repo` format.
    pub repository: Option<String>,
    /// Bearer token.
    pub token: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_owned(),
            repository: None,
            token: None,
            timeout_secs: 30,
        }
    }
}

/// Persistent store settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: Option<String>,
    /// Connection pool size.
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
        }
    }
}
