//! frappe-report personal command implementation
//!
//! Reports the tasks one identity is responsible for, grouped by project,
//! with the comments that identity wrote on them.

use super::common::{self, CommonOptions};
use super::FilterArgs;
use crate::error::{Error, Result};
use crate::pipeline::Scope;
use crate::report::ReportKind;

/// Options for the personal command
pub struct PersonalOptions {
    pub email: String,
    pub filters: FilterArgs,
    pub common: CommonOptions,
}

pub fn run(options: PersonalOptions) -> Result<()> {
    let email = options.email.trim().to_string();
    if email.is_empty() {
        return Err(Error::InvalidArgument(
            "--email must not be empty (e.g. --email=nhi.nguyen@abc.com)".to_string(),
        ));
    }

    let config = common::load_config(&options.common)?;
    let filters = common::build_filters(&options.filters, &config)?;
    tracing::debug!(email = %email, ?filters, "personal report");

    let kind = ReportKind::Personal {
        identity: email.clone(),
    };
    common::execute(
        &options.common,
        &config,
        &filters,
        &Scope::Responsible { email },
        &kind,
        "personal",
    )
}
