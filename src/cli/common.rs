//! Steps shared by the report commands: config and filter resolution, source
//! selection, the pipeline run and the result message.

use std::path::PathBuf;

use super::FilterArgs;
use crate::client::FrappeClient;
use crate::config::{Config, CredentialOverrides};
use crate::error::Result;
use crate::filter::{parse_status_list, DateRange, ReportFilters};
use crate::output::{emit_success, OutputOptions, RunResult};
use crate::pipeline::{self, Outcome, Scope};
use crate::report::{write_report, ReportKind, ReportSummary};
use crate::source::MemorySource;

/// Options shared by every report command
#[derive(Debug, Clone, Default)]
pub struct CommonOptions {
    pub config: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub fixture: Option<PathBuf>,
    pub overrides: CredentialOverrides,
    pub json: bool,
    pub quiet: bool,
}

pub fn load_config(common: &CommonOptions) -> Result<Config> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    Config::resolve(common.config.as_deref(), &cwd)
}

/// Validate filter flags against the config defaults.
pub fn build_filters(args: &FilterArgs, config: &Config) -> Result<ReportFilters> {
    let range = DateRange::parse(
        non_blank(args.from.as_deref()),
        non_blank(args.to.as_deref()),
    )?;
    let statuses = args
        .status
        .as_deref()
        .map(parse_status_list)
        .filter(|list| !list.is_empty())
        .unwrap_or_else(|| config.report.default_statuses.clone());

    Ok(ReportFilters {
        range,
        project: non_blank(args.project.as_deref()).map(str::to_string),
        company: non_blank(args.company.as_deref()).map(str::to_string),
        statuses,
        keyword: non_blank(args.kw.as_deref()).map(str::to_string),
        leaf_only: args.leaf,
        latest_only: args.latest,
        include_plain: args.plain,
    })
}

pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Run the pipeline against the fixture or the backend, write the report and
/// print the outcome.
pub fn execute(
    common: &CommonOptions,
    config: &Config,
    filters: &ReportFilters,
    scope: &Scope,
    kind: &ReportKind,
    command: &str,
) -> Result<()> {
    let outcome = match &common.fixture {
        Some(path) => {
            tracing::debug!(path = %path.display(), "using fixture source");
            let source = MemorySource::from_fixture_file(path)?;
            pipeline::run(&source, &config.fetch, filters, scope)?
        }
        None => {
            let credentials = config.credentials(&common.overrides)?;
            tracing::debug!(url = %credentials.url, "using backend source");
            let client = FrappeClient::new(&credentials, config.backend.timeout())?;
            pipeline::run(&client, &config.fetch, filters, scope)?
        }
    };

    let options = OutputOptions {
        json: common.json,
        quiet: common.quiet,
    };

    let result = match outcome {
        Outcome::Empty(message) => RunResult::empty(message),
        Outcome::Report(report) => {
            let out_dir = common
                .out_dir
                .clone()
                .unwrap_or_else(|| config.report.out_dir.clone());
            let millis = chrono::Utc::now().timestamp_millis();
            let path = write_report(&out_dir, &kind.file_name(millis), &report)?;

            let mut result = RunResult::written(path, ReportSummary::of(&report));
            if filters.latest_only {
                result = result.with_note("latest comment per task only");
            }
            if filters.leaf_only {
                result = result.with_note("group tasks excluded");
            }
            result
        }
    };
    emit_success(options, command, &result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_status_falls_back_to_config_defaults() {
        let config = Config::default();
        let args = FilterArgs {
            status: Some(" , ".to_string()),
            ..FilterArgs::default()
        };
        let filters = build_filters(&args, &config).expect("filters");
        assert_eq!(filters.statuses, config.report.default_statuses);
    }

    #[test]
    fn blank_values_are_unset() {
        let args = FilterArgs {
            project: Some("  ".to_string()),
            kw: Some(String::new()),
            company: Some(" Company F ".to_string()),
            ..FilterArgs::default()
        };
        let filters = build_filters(&args, &Config::default()).expect("filters");
        assert_eq!(filters.project, None);
        assert_eq!(filters.keyword, None);
        assert_eq!(filters.company.as_deref(), Some("Company F"));
    }

    #[test]
    fn explicit_statuses_replace_defaults() {
        let args = FilterArgs {
            status: Some("Open,Completed".to_string()),
            ..FilterArgs::default()
        };
        let filters = build_filters(&args, &Config::default()).expect("filters");
        assert_eq!(filters.statuses, vec!["Open", "Completed"]);
    }

    #[test]
    fn malformed_dates_are_rejected() {
        let args = FilterArgs {
            from: Some("2025/08/01".to_string()),
            ..FilterArgs::default()
        };
        assert!(build_filters(&args, &Config::default()).is_err());
    }
}
