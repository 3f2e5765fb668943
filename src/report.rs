//! Report assembly and output.
//!
//! Tasks are grouped per project, turned into trees, and the project groups
//! are ordered by display name. Projects missing from the lookup map are
//! dropped along with their tasks.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::collate;
use crate::error::Result;
use crate::model::{Comment, Project, Task};
use crate::normalize::file_token;
use crate::tree::{build_tree, TaskNode, TreeOptions};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProjectReport {
    pub project_id: String,
    pub project_name: String,
    pub project_status: String,
    pub project_company: String,
    pub project_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible_email: Option<String>,
    pub tasks: Vec<TaskNode>,
}

/// Counts shown after a run.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct ReportSummary {
    pub projects: usize,
    pub tasks: usize,
    pub comments: usize,
}

impl ReportSummary {
    pub fn of(report: &[ProjectReport]) -> Self {
        Self {
            projects: report.len(),
            tasks: report
                .iter()
                .flat_map(|p| p.tasks.iter())
                .map(TaskNode::node_count)
                .sum(),
            comments: report
                .iter()
                .flat_map(|p| p.tasks.iter())
                .map(TaskNode::comment_count)
                .sum(),
        }
    }
}

pub fn assemble(
    projects: &HashMap<String, Project>,
    tasks: Vec<Task>,
    comments: &HashMap<String, Vec<Comment>>,
    options: &TreeOptions,
    responsible: Option<&str>,
) -> Vec<ProjectReport> {
    let mut by_project: HashMap<String, Vec<Task>> = HashMap::new();
    for task in tasks {
        by_project.entry(task.project.clone()).or_default().push(task);
    }

    let mut groups: Vec<(&Project, Vec<Task>)> = Vec::new();
    for (project_id, tasks) in by_project {
        match projects.get(&project_id) {
            Some(project) => groups.push((project, tasks)),
            None => tracing::warn!(
                project = %project_id,
                tasks = tasks.len(),
                "dropping tasks of unresolved project"
            ),
        }
    }
    groups.sort_by(|(a, _), (b, _)| {
        collate::compare(&a.project_name, &b.project_name).then_with(|| a.name.cmp(&b.name))
    });

    groups
        .into_iter()
        .map(|(project, tasks)| ProjectReport {
            project_id: project.name.clone(),
            project_name: project.project_name.clone(),
            project_status: project.status.clone(),
            project_company: project.company.clone(),
            project_percent: project.percent_complete,
            responsible_email: responsible.map(str::to_string),
            tasks: build_tree(&tasks, comments, options),
        })
        .collect()
}

/// Artifact naming for each report variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportKind {
    Personal { identity: String },
    Progress,
}

impl ReportKind {
    pub fn file_name(&self, millis: i64) -> String {
        match self {
            ReportKind::Personal { identity } => format!(
                "personal_report_by_responsible_{}_{millis}.json",
                file_token(identity)
            ),
            ReportKind::Progress => format!("progress_tree_{millis}.json"),
        }
    }
}

/// Write the report as pretty JSON into `out_dir`, creating it if needed.
///
/// The file is written to a temporary sibling and renamed into place. The
/// temporary file is removed if any step fails.
pub fn write_report(
    out_dir: &Path,
    file_name: &str,
    report: &[ProjectReport],
) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(file_name);
    let json = serde_json::to_string_pretty(report)?;

    let temp_path = out_dir.join(format!(".{file_name}.tmp.{}", std::process::id()));
    let written = write_synced(&temp_path, json.as_bytes())
        .and_then(|()| fs::rename(&temp_path, &path));
    if let Err(err) = written {
        if let Err(cleanup) = fs::remove_file(&temp_path) {
            tracing::debug!(path = %temp_path.display(), error = %cleanup, "temp file not removed");
        }
        return Err(err.into());
    }

    tracing::info!(path = %path.display(), bytes = json.len(), "report written");
    Ok(path)
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
