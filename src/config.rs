//! Configuration loading and management
//!
//! Handles parsing of the optional `frappe-report.toml` file. Values from the
//! file are overridden by environment variables, which are overridden by
//! command-line flags; clap folds the last two together before they reach
//! [`Config::credentials`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::Credentials;
use crate::error::{Error, Result};

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "frappe-report.toml";

pub const ENV_URL: &str = "FRAPPE_URL";
pub const ENV_API_KEY: &str = "FRAPPE_API_KEY";
pub const ENV_API_SECRET: &str = "FRAPPE_API_SECRET";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend connection
    #[serde(default)]
    pub backend: BackendConfig,

    /// Batch and page sizes for backend queries
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Report defaults
    #[serde(default)]
    pub report: ReportConfig,
}

/// Backend connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Site base URL, e.g. `https://erp.example.com`
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub api_secret: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            api_secret: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Fetch sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Rows requested per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Project ids per task-by-project query
    #[serde(default = "default_project_chunk")]
    pub project_chunk: usize,

    /// Names per lookup-by-name query
    #[serde(default = "default_lookup_chunk")]
    pub lookup_chunk: usize,

    /// Task ids per comment-by-task query
    #[serde(default = "default_comment_chunk")]
    pub comment_chunk: usize,
}

fn default_page_size() -> usize {
    500
}

fn default_project_chunk() -> usize {
    50
}

fn default_lookup_chunk() -> usize {
    200
}

fn default_comment_chunk() -> usize {
    400
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            project_chunk: default_project_chunk(),
            lookup_chunk: default_lookup_chunk(),
            comment_chunk: default_comment_chunk(),
        }
    }
}

/// Report defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory receiving report files
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Task statuses kept when `--status` is not given
    #[serde(default = "default_statuses")]
    pub default_statuses: Vec<String>,
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("out")
}

pub fn default_statuses() -> Vec<String> {
    ["Open", "Working", "Completed", "Overdue", "Pending Review"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            default_statuses: default_statuses(),
        }
    }
}

/// Credential values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct CredentialOverrides {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load an explicit config file, else `frappe-report.toml` in `dir` if
    /// present, else defaults.
    pub fn resolve(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            tracing::debug!(path = %path.display(), "loading config");
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Merge overrides over the file values and require all three parts.
    pub fn credentials(&self, overrides: &CredentialOverrides) -> Result<Credentials> {
        let url = pick(overrides.url.as_deref(), self.backend.url.as_deref())
            .ok_or(Error::MissingCredential(ENV_URL))?;
        let api_key = pick(overrides.api_key.as_deref(), self.backend.api_key.as_deref())
            .ok_or(Error::MissingCredential(ENV_API_KEY))?;
        let api_secret = pick(
            overrides.api_secret.as_deref(),
            self.backend.api_secret.as_deref(),
        )
        .ok_or(Error::MissingCredential(ENV_API_SECRET))?;

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::InvalidConfig(format!(
                "backend url must start with http:// or https:// (got '{url}')"
            )));
        }

        Ok(Credentials {
            url,
            api_key,
            api_secret,
        })
    }

    fn validate(&self) -> Result<()> {
        self.backend.validate()?;
        self.fetch.validate()?;
        self.report.validate()?;
        Ok(())
    }
}

fn pick(primary: Option<&str>, fallback: Option<&str>) -> Option<String> {
    primary
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| fallback.map(str::trim).filter(|v| !v.is_empty()))
        .map(str::to_string)
}

impl BackendConfig {
    fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(Error::InvalidConfig(
                "backend.timeout_secs must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl FetchConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("fetch.page_size", self.page_size),
            ("fetch.project_chunk", self.project_chunk),
            ("fetch.lookup_chunk", self.lookup_chunk),
            ("fetch.comment_chunk", self.comment_chunk),
        ] {
            if value == 0 {
                return Err(Error::InvalidConfig(format!("{name} must be > 0")));
            }
        }
        Ok(())
    }
}

impl ReportConfig {
    fn validate(&self) -> Result<()> {
        if self.default_statuses.is_empty() {
            return Err(Error::InvalidConfig(
                "report.default_statuses cannot be empty".to_string(),
            ));
        }
        if self.default_statuses.iter().any(|s| s.trim().is_empty()) {
            return Err(Error::InvalidConfig(
                "report.default_statuses cannot include empty entries".to_string(),
            ));
        }
        if self.out_dir.as_os_str().is_empty() {
            return Err(Error::InvalidConfig(
                "report.out_dir cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
