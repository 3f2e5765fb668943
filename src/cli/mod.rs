//! Command-line interface for frappe-report
//!
//! This module defines the CLI structure using clap derive macros.
//! Each report variant is defined in its own submodule.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::CredentialOverrides;
use crate::error::Result;

mod common;
mod personal;
mod progress;

pub use common::CommonOptions;

/// frappe-report - task and comment reports from a Frappe site
///
/// Fetches projects, tasks and task comments, filters them and writes the
/// project → task tree → comment hierarchy as a JSON file.
#[derive(Parser, Debug)]
#[command(name = "frappe-report")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (defaults to ./frappe-report.toml when present)
    #[arg(long, global = true, env = "FRAPPE_REPORT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory receiving the report file
    #[arg(long, global = true)]
    pub out_dir: Option<PathBuf>,

    /// Serve records from a JSON fixture instead of the backend
    #[arg(long, global = true)]
    pub fixture: Option<PathBuf>,

    /// Site base URL
    #[arg(long, global = true, env = "FRAPPE_URL", hide_env_values = true)]
    pub url: Option<String>,

    /// API key of the token pair
    #[arg(long, global = true, env = "FRAPPE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// API secret of the token pair
    #[arg(long, global = true, env = "FRAPPE_API_SECRET", hide_env_values = true)]
    pub api_secret: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Tasks one person is responsible for, with that person's comments
    Personal {
        /// Responsible identity, matched against the task's responsible list
        #[arg(long)]
        email: String,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Projects with recent comment activity and all their tasks
    ///
    /// Without --project or --company, the projects come from the matching
    /// comments. With either flag, only those projects are reported and
    /// comments on other projects do not add to the scope.
    Progress {
        /// Only comments written by this user
        #[arg(long, visible_alias = "comment-owner", alias = "comment_owner")]
        owner: Option<String>,

        #[command(flatten)]
        filters: FilterArgs,
    },
}

/// Filters shared by both report variants
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// First comment day, YYYY-MM-DD
    #[arg(long, value_name = "DATE", visible_alias = "from-date", alias = "from_date")]
    pub from: Option<String>,

    /// Last comment day (inclusive), YYYY-MM-DD
    #[arg(long, value_name = "DATE", visible_alias = "to-date", alias = "to_date")]
    pub to: Option<String>,

    /// Restrict to one project id
    #[arg(long)]
    pub project: Option<String>,

    /// Restrict to the projects of one company
    #[arg(long)]
    pub company: Option<String>,

    /// Comma-separated task statuses to keep
    #[arg(long, visible_alias = "task-status", alias = "task_status")]
    pub status: Option<String>,

    /// Keep only comments whose text contains this keyword
    #[arg(long, visible_alias = "keyword")]
    pub kw: Option<String>,

    /// Drop group tasks
    #[arg(long)]
    pub leaf: bool,

    /// Keep only the newest comment of each task
    #[arg(long)]
    pub latest: bool,

    /// Add the markup-free text of each comment
    #[arg(long)]
    pub plain: bool,
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let common = CommonOptions {
            config: self.config,
            out_dir: self.out_dir,
            fixture: self.fixture,
            overrides: CredentialOverrides {
                url: self.url,
                api_key: self.api_key,
                api_secret: self.api_secret,
            },
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::Personal { email, filters } => personal::run(personal::PersonalOptions {
                email,
                filters,
                common,
            }),
            Commands::Progress { owner, filters } => progress::run(progress::ProgressOptions {
                owner,
                filters,
                common,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn legacy_flag_aliases_parse() {
        let cli = Cli::try_parse_from([
            "frappe-report",
            "progress",
            "--comment-owner=a@x.com",
            "--from-date=2025-08-01",
            "--to_date=2025-08-08",
            "--task-status=Open,Working",
            "--keyword=mẫu",
            "--leaf",
        ])
        .expect("parse");
        match cli.command {
            Commands::Progress { owner, filters } => {
                assert_eq!(owner.as_deref(), Some("a@x.com"));
                assert_eq!(filters.from.as_deref(), Some("2025-08-01"));
                assert_eq!(filters.to.as_deref(), Some("2025-08-08"));
                assert_eq!(filters.status.as_deref(), Some("Open,Working"));
                assert_eq!(filters.kw.as_deref(), Some("mẫu"));
                assert!(filters.leaf);
                assert!(!filters.latest);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn personal_requires_email() {
        assert!(Cli::try_parse_from(["frappe-report", "personal"]).is_err());
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "frappe-report",
            "personal",
            "--email",
            "a@x.com",
            "--json",
            "--out-dir",
            "reports",
        ])
        .expect("parse");
        assert!(cli.json);
        assert_eq!(cli.out_dir, Some(PathBuf::from("reports")));
    }
}
