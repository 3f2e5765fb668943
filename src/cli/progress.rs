//! frappe-report progress command implementation
//!
//! Comments drive the scope: projects with matching comment activity are
//! reported with all of their tasks, unless `--project` or `--company` names
//! the scope explicitly.

use super::common::{self, CommonOptions};
use super::FilterArgs;
use crate::error::Result;
use crate::pipeline::Scope;
use crate::report::ReportKind;

/// Options for the progress command
pub struct ProgressOptions {
    pub owner: Option<String>,
    pub filters: FilterArgs,
    pub common: CommonOptions,
}

pub fn run(options: ProgressOptions) -> Result<()> {
    let config = common::load_config(&options.common)?;
    let filters = common::build_filters(&options.filters, &config)?;
    let owner = common::non_blank(options.owner.as_deref()).map(str::to_string);
    tracing::debug!(owner = ?owner, ?filters, "progress report");

    common::execute(
        &options.common,
        &config,
        &filters,
        &Scope::Comments { owner },
        &ReportKind::Progress,
        "progress",
    )
}
