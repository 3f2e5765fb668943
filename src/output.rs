//! Run results and how they are printed.
//!
//! `--json` wraps a [`RunResult`] in a versioned envelope on stdout. Otherwise
//! a short text block names the written file and the counts.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::{Error, JsonError, Result};
use crate::report::ReportSummary;

pub const SCHEMA_VERSION: &str = "frappe-report.v1";

const NO_COMMENTS_WARNING: &str = "no comments matched; tasks are listed without comments";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

/// What a report command produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub summary: ReportSummary,
    /// Narrowing filters that shaped the report.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl RunResult {
    /// Nothing matched; no file was written.
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            matched: false,
            file: None,
            message: Some(message.into()),
            summary: ReportSummary::default(),
            notes: Vec::new(),
        }
    }

    pub fn written(file: PathBuf, summary: ReportSummary) -> Self {
        Self {
            matched: true,
            file: Some(file),
            message: None,
            summary,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn warnings(&self) -> Vec<&'static str> {
        if self.matched && self.summary.comments == 0 {
            vec![NO_COMMENTS_WARNING]
        } else {
            Vec::new()
        }
    }
}

#[derive(Serialize)]
struct SuccessEnvelope<'a> {
    schema_version: &'static str,
    command: &'a str,
    status: &'static str,
    data: &'a RunResult,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<&'static str>,
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    schema_version: &'static str,
    command: &'a str,
    status: &'static str,
    error: JsonError,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    next_steps: Vec<String>,
}

pub fn emit_success(options: OutputOptions, command: &str, result: &RunResult) -> Result<()> {
    if options.json {
        let payload = SuccessEnvelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data: result,
            warnings: result.warnings(),
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if !options.quiet {
        println!("{}", render_result(command, result));
    }
    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let next_steps = error_next_steps(err);
    if json {
        let payload = ErrorEnvelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            error: JsonError::from(err),
            next_steps,
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    if let Some(hint) = next_steps.first() {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

/// Text form of a run: the header, then the file and counts when a report
/// was written.
pub fn render_result(command: &str, result: &RunResult) -> String {
    let file = match (&result.file, result.matched) {
        (Some(file), true) => file,
        _ => {
            let message = result.message.as_deref().unwrap_or("nothing matched");
            return format!("{command}: {message}");
        }
    };

    let summary = &result.summary;
    let mut lines = vec![
        format!("{command}: report written"),
        String::new(),
        format!("- file: {}", file.display()),
        format!("- projects: {}", summary.projects),
        format!("- tasks: {}", summary.tasks),
        format!("- comments: {}", summary.comments),
    ];
    for note in &result.notes {
        lines.push(format!("note: {note}"));
    }
    for warning in result.warnings() {
        lines.push(format!("warning: {warning}"));
    }
    lines.join("\n")
}

/// First positional argument, used to label error envelopes when clap has
/// not produced a parsed command.
pub fn infer_command_name_from_args() -> String {
    command_name(std::env::args().skip(1))
}

fn command_name(args: impl Iterator<Item = String>) -> String {
    args.into_iter()
        .find(|arg| !arg.starts_with('-'))
        .filter(|arg| matches!(arg.as_str(), "personal" | "progress"))
        .unwrap_or_else(|| "frappe-report".to_string())
}

fn error_next_steps(err: &Error) -> Vec<String> {
    match err {
        Error::MissingCredential(name) => vec![format!(
            "export {name}=... (or pass --url/--api-key/--api-secret)"
        )],
        Error::InvalidConfig(_) | Error::TomlParse(_) => {
            vec!["fix frappe-report.toml then retry".to_string()]
        }
        Error::ConfigNotFound(_) => vec!["check the --config path".to_string()],
        Error::Backend { status: 401 | 403, .. } => {
            vec!["check FRAPPE_API_KEY and FRAPPE_API_SECRET".to_string()]
        }
        _ => Vec::new(),
    }
}
