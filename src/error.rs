//! Error types for frappe-report
//!
//! Exit codes:
//! - 0: Success (including "nothing matched")
//! - 1: Configuration or fetch failure

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the frappe-report CLI
pub mod exit_codes {
    pub const FAILURE: i32 = 1;
}

/// Main error type for report runs
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors, raised before any fetch
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Missing {0} (set it in the environment, the config file, or via flag)")]
    MissingCredential(&'static str),

    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    // Fetch failures
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned {status} for {doctype}: {body}")]
    Backend {
        doctype: String,
        status: u16,
        body: String,
    },

    #[error("Unexpected {doctype} record: {source}")]
    Decode {
        doctype: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        exit_codes::FAILURE
    }

    /// Short machine-readable label for the error class
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::MissingCredential(_)
            | Error::ConfigNotFound(_) => "config_error",

            Error::Http(_) | Error::Backend { .. } | Error::Decode { .. } => "fetch_failed",

            Error::Io(_) | Error::Json(_) | Error::TomlParse(_) => "operation_failed",
        }
    }

    /// Structured details for the JSON error envelope
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::Backend {
                doctype,
                status,
                body,
            } => Some(serde_json::json!({
                "doctype": doctype,
                "status": status,
                "body": body,
            })),
            Error::MissingCredential(name) => Some(serde_json::json!({ "missing": name })),
            Error::ConfigNotFound(path) => Some(serde_json::json!({ "path": path })),
            _ => None,
        }
    }
}

/// Result type alias for report operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error body of the JSON error envelope
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub message: String,
    pub code: i32,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            message: err.to_string(),
            code: err.exit_code(),
            kind: err.kind(),
            details: err.details(),
        }
    }
}
