#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::{json, Value};
use tempfile::TempDir;

pub const EMAIL: &str = "nhi.nguyen@abc.com";

/// Scratch directory holding a fixture, optional config and the report output.
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_file(&self, rel_path: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn write_fixture(&self, fixture: &Value) -> std::io::Result<PathBuf> {
        self.write_file("fixture.json", &fixture.to_string())
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        self.write_file("frappe-report.toml", contents)
    }

    pub fn out_dir(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    /// Report files in `dir`, sorted by name.
    pub fn reports_in(&self, dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// The single report written to the default output directory.
    pub fn only_report(&self) -> Result<(PathBuf, Value), Box<dyn std::error::Error>> {
        let files = self.reports_in(&self.out_dir())?;
        assert_eq!(files.len(), 1, "expected one report, found {files:?}");
        let path = files[0].clone();
        let value: Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
        Ok((path, value))
    }

    /// The binary, run inside the workspace with backend env vars cleared.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("frappe-report").expect("binary");
        cmd.current_dir(self.dir.path())
            .env_remove("FRAPPE_URL")
            .env_remove("FRAPPE_API_KEY")
            .env_remove("FRAPPE_API_SECRET")
            .env_remove("FRAPPE_REPORT_CONFIG")
            .env_remove("RUST_LOG");
        cmd
    }

    /// [`Self::cmd`] with the sample fixture and `out/` preconfigured.
    pub fn report_cmd(&self, subcommand: &str) -> Command {
        let fixture = self.write_fixture(&sample_fixture()).expect("write fixture");
        let mut cmd = self.cmd();
        cmd.arg(subcommand)
            .arg("--fixture")
            .arg(fixture)
            .arg("--out-dir")
            .arg(self.out_dir());
        cmd
    }
}

fn comment(name: &str, task: &str, creation: &str, owner: &str, content: &str) -> Value {
    json!({
        "name": name,
        "creation": creation,
        "owner": owner,
        "comment_email": owner,
        "comment_type": "Comment",
        "reference_doctype": "Task",
        "reference_name": task,
        "content": content,
    })
}

/// Two projects, a small task tree and comments around the 2025-08-08 boundary.
pub fn sample_fixture() -> Value {
    let mut info = comment("C6", "T1", "2025-08-02 08:00:00", EMAIL, "assigned");
    info["comment_type"] = json!("Info");

    json!({
        "Project": [
            {"name": "PROJ-0001", "project_name": "Website Revamp", "status": "Open", "company": "Company F", "percent_complete": 35.5},
            {"name": "PROJ-0002", "project_name": "alpha warehouse", "status": "Open", "company": "Company G", "percent_complete": null}
        ],
        "Task": [
            {"name": "TASK-1", "subject": "Design", "status": "Open", "progress": 20, "priority": "High", "is_group": 0,
             "project": "PROJ-0001", "parent_task": "", "lft": 1, "rgt": 6, "custom_nguoi_phu_trach": "[\"nhi.nguyen@abc.com\"]"},
            {"name": "TASK-2", "subject": "Mockups", "status": "Working", "progress": "50", "priority": "Medium", "is_group": 0,
             "project": "PROJ-0001", "parent_task": "TASK-1", "lft": 2, "rgt": 3, "custom_nguoi_phu_trach": "[\"b@x.com\", \"nhi.nguyen@abc.com\"]"},
            {"name": "TASK-3", "subject": "Copy", "status": "Completed", "progress": 100, "priority": null, "is_group": 0,
             "project": "PROJ-0001", "parent_task": "TASK-1", "lft": 4, "rgt": 5, "custom_nguoi_phu_trach": "[\"NHI.NGUYEN@ABC.COM\"]"},
            {"name": "TASK-4", "subject": "Inventory", "status": "Open", "progress": 0, "priority": "Low", "is_group": 1,
             "project": "PROJ-0002", "parent_task": null, "lft": 1, "rgt": 2, "custom_nguoi_phu_trach": "[\"b@x.com\"]"},
            {"name": "TASK-5", "subject": "Dropped idea", "status": "Cancelled", "progress": 0, "priority": null, "is_group": 0,
             "project": "PROJ-0001", "parent_task": "TASK-1", "lft": 7, "rgt": 8, "custom_nguoi_phu_trach": "[\"nhi.nguyen@abc.com\"]"}
        ],
        "Comment": [
            comment("C1", "TASK-2", "2025-08-01 09:00:00", EMAIL, "<p>Gửi <b>mẫu</b></p><script>alert(1)</script>"),
            comment("C2", "TASK-2", "2025-08-03 10:30:00.123456", EMAIL, "Updated mockups"),
            comment("C3", "TASK-3", "2025-08-08 23:30:00", EMAIL, "done &amp; shipped"),
            comment("C4", "TASK-3", "2025-08-09 00:00:00", EMAIL, "late"),
            comment("C5", "TASK-4", "2025-08-02 14:00:00", "b@x.com", "counting"),
            info,
            comment("C7", "TASK-404", "2025-08-04 12:00:00", "b@x.com", "orphan")
        ]
    })
}

pub fn ids(nodes: &Value) -> Vec<String> {
    nodes
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|node| node["task_id"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

pub fn comment_times(node: &Value) -> Vec<String> {
    node["comments"]
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|c| c["comment_time"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
