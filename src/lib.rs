//! frappe-report - Task Activity Reports Library
//!
//! This library provides the core functionality for the frappe-report CLI,
//! turning flat Frappe project, task and comment records into per-project
//! task trees with their comments.
//!
//! # Core Concepts
//!
//! - **Document Source**: list queries against a doctype, over HTTP or from memory
//! - **Responsibility**: tasks carry a JSON-encoded list of responsible emails
//! - **Filters**: date window, statuses, leaf-only, keyword, latest comment per task
//! - **Task Tree**: parent/child hierarchy rebuilt from `parent_task` pointers
//! - **Scope**: task-first (personal) or comment-first (progress) discovery
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `client`: Frappe REST client using reqwest
//! - `collate`: Display-name ordering
//! - `config`: Configuration loading from `frappe-report.toml`
//! - `error`: Error types and result aliases
//! - `filter`: In-memory reductions over tasks and comments
//! - `html`: Comment markup stripping and sanitizing
//! - `model`: Backend record types and field lists
//! - `normalize`: Responsible-list parsing and identity matching
//! - `output`: Human and JSON command output
//! - `pipeline`: Fetch/filter/assemble sequence for both report variants
//! - `report`: Project grouping and report file output
//! - `source`: Document source trait, pagination and the in-memory source
//! - `tree`: Task hierarchy reconstruction

pub mod cli;
pub mod client;
pub mod collate;
pub mod config;
pub mod error;
pub mod filter;
pub mod html;
pub mod model;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod source;
pub mod tree;

pub use error::{Error, Result};
