mod support;

use predicates::str::contains;
use serde_json::Value;
use support::{comment_times, ids, TestWorkspace, EMAIL};

#[test]
fn personal_report_builds_tree_for_responsible_tasks() -> Result<(), Box<dyn std::error::Error>> {
    let ws = TestWorkspace::new();
    ws.report_cmd("personal")
        .arg(format!("--email={EMAIL}"))
        .args(["--from=2025-08-01", "--to=2025-08-08"])
        .assert()
        .success()
        .stdout(contains("personal: report written"))
        .stdout(contains("- projects: 1"))
        .stdout(contains("- tasks: 3"));

    let (path, report) = ws.only_report()?;
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    assert!(file_name.starts_with("personal_report_by_responsible_nhi_nguyen_abc_com_"));

    let projects = report.as_array().expect("report array");
    assert_eq!(projects.len(), 1);
    let project = &projects[0];
    assert_eq!(project["project_id"], "PROJ-0001");
    assert_eq!(project["project_name"], "Website Revamp");
    assert_eq!(project["project_company"], "Company F");
    assert_eq!(project["project_percent"], 35.5);
    assert_eq!(project["responsible_email"], EMAIL);

    assert_eq!(ids(&project["tasks"]), vec!["TASK-1"]);
    let root = &project["tasks"][0];
    assert_eq!(root["is_group"], true);
    assert_eq!(root["task_priority"], "High");
    assert_eq!(ids(&root["children"]), vec!["TASK-2", "TASK-3"]);

    let mockups = &root["children"][0];
    assert_eq!(mockups["task_progress"], 50.0);
    assert_eq!(
        comment_times(mockups),
        vec!["2025-08-03 10:30:00.123456", "2025-08-01 09:00:00"]
    );
    assert_eq!(mockups["comments"][1]["comment_html"], "<p>Gửi <b>mẫu</b></p>");
    assert!(mockups["comments"][1].get("comment_plain").is_none());

    // The 2025-08-09 00:00:00 comment falls outside --to=2025-08-08.
    let copy = &root["children"][1];
    assert_eq!(comment_times(copy), vec!["2025-08-08 23:30:00"]);
    assert_eq!(copy["task_priority"], Value::Null);
    Ok(())
}

#[test]
fn personal_latest_keeps_newest_comment_per_task() -> Result<(), Box<dyn std::error::Error>> {
    let ws = TestWorkspace::new();
    ws.report_cmd("personal")
        .arg(format!("--email={EMAIL}"))
        .arg("--latest")
        .assert()
        .success();

    let (_, report) = ws.only_report()?;
    let children = &report[0]["tasks"][0]["children"];
    assert_eq!(comment_times(&children[0]), vec!["2025-08-03 10:30:00.123456"]);
    assert_eq!(comment_times(&children[1]), vec!["2025-08-09 00:00:00"]);
    Ok(())
}

#[test]
fn personal_keyword_and_plain_text() -> Result<(), Box<dyn std::error::Error>> {
    let ws = TestWorkspace::new();
    ws.report_cmd("personal")
        .arg(format!("--email={EMAIL}"))
        .args(["--kw=MẪU", "--plain"])
        .assert()
        .success();

    let (_, report) = ws.only_report()?;
    let root = &report[0]["tasks"][0];
    assert!(comment_times(root).is_empty());
    let mockups = &root["children"][0];
    assert_eq!(comment_times(mockups), vec!["2025-08-01 09:00:00"]);
    assert_eq!(mockups["comments"][0]["comment_plain"], "Gửi mẫu");
    assert!(comment_times(&root["children"][1]).is_empty());
    Ok(())
}

#[test]
fn personal_status_flag_replaces_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let ws = TestWorkspace::new();
    ws.report_cmd("personal")
        .arg(format!("--email={EMAIL}"))
        .arg("--task-status=Cancelled,Working")
        .assert()
        .success();

    // TASK-1 is filtered out, so its children become roots.
    let (_, report) = ws.only_report()?;
    assert_eq!(ids(&report[0]["tasks"]), vec!["TASK-2", "TASK-5"]);
    Ok(())
}

#[test]
fn personal_company_filter_without_match_writes_nothing() {
    let ws = TestWorkspace::new();
    ws.report_cmd("personal")
        .arg(format!("--email={EMAIL}"))
        .arg("--company=Company G")
        .assert()
        .success()
        .stdout(contains("no tasks assigned"));

    assert!(!ws.out_dir().exists());
}

#[test]
fn personal_unknown_identity_is_not_an_error() {
    let ws = TestWorkspace::new();
    ws.report_cmd("personal")
        .arg("--email=nobody@abc.com")
        .assert()
        .success()
        .stdout(contains("no tasks assigned to nobody@abc.com"));

    assert!(!ws.out_dir().exists());
}

#[test]
fn personal_json_envelope_reports_file() -> Result<(), Box<dyn std::error::Error>> {
    let ws = TestWorkspace::new();
    let output = ws
        .report_cmd("personal")
        .arg(format!("--email={EMAIL}"))
        .arg("--json")
        .output()?;
    assert!(output.status.success());

    let envelope: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(envelope["schema_version"], "frappe-report.v1");
    assert_eq!(envelope["command"], "personal");
    assert_eq!(envelope["status"], "success");
    assert_eq!(envelope["data"]["matched"], true);
    assert_eq!(envelope["data"]["projects"], 1);
    assert_eq!(envelope["data"]["tasks"], 3);
    assert_eq!(envelope["data"]["comments"], 4);

    let file = envelope["data"]["file"].as_str().expect("file path");
    assert!(std::path::Path::new(file).exists());
    Ok(())
}

#[test]
fn out_dir_comes_from_config_file() -> Result<(), Box<dyn std::error::Error>> {
    let ws = TestWorkspace::new();
    ws.write_config("[report]\nout_dir = \"reports\"\n")?;
    let fixture = ws.write_fixture(&support::sample_fixture())?;

    ws.cmd()
        .args(["personal", "--email", EMAIL, "--fixture"])
        .arg(fixture)
        .assert()
        .success();

    assert_eq!(ws.reports_in(&ws.path().join("reports"))?.len(), 1);
    assert!(!ws.out_dir().exists());
    Ok(())
}
