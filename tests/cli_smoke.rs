mod support;

use assert_cmd::Command;
use predicates::str::contains;
use support::TestWorkspace;

#[test]
fn help_works() {
    Command::cargo_bin("frappe-report")
        .expect("binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("personal"))
        .stdout(contains("progress"));
}

#[test]
fn subcommand_help_works() {
    for cmd in ["personal", "progress"] {
        Command::cargo_bin("frappe-report")
            .expect("binary")
            .arg(cmd)
            .arg("--help")
            .assert()
            .success()
            .stdout(contains("--from"));
    }
}

#[test]
fn progress_help_explains_explicit_scope() {
    Command::cargo_bin("frappe-report")
        .expect("binary")
        .args(["progress", "--help"])
        .assert()
        .success()
        .stdout(contains("the projects come from the matching"))
        .stdout(contains("only those projects are reported"));
}

#[test]
fn personal_requires_email_flag() {
    TestWorkspace::new()
        .cmd()
        .arg("personal")
        .assert()
        .failure()
        .stderr(contains("--email"));
}

#[test]
fn empty_email_is_rejected() {
    TestWorkspace::new()
        .cmd()
        .args(["personal", "--email="])
        .assert()
        .code(1)
        .stderr(contains("--email must not be empty"));
}

#[test]
fn missing_credentials_fail_before_fetch() {
    TestWorkspace::new()
        .cmd()
        .args(["personal", "--email=a@x.com"])
        .assert()
        .code(1)
        .stderr(contains("FRAPPE_URL"));
}

#[test]
fn partial_credentials_name_the_missing_part() {
    TestWorkspace::new()
        .cmd()
        .args(["progress", "--url=https://erp.example.com"])
        .env("FRAPPE_API_KEY", "key")
        .assert()
        .code(1)
        .stderr(contains("FRAPPE_API_SECRET"));
}

#[test]
fn missing_credentials_json_envelope() {
    TestWorkspace::new()
        .cmd()
        .args(["--json", "progress"])
        .assert()
        .code(1)
        .stdout(contains("\"status\": \"error\""))
        .stdout(contains("\"kind\": \"config_error\""))
        .stdout(contains("\"command\": \"progress\""));
}

#[test]
fn malformed_date_is_rejected() {
    let ws = TestWorkspace::new();
    ws.report_cmd("progress")
        .arg("--from=01/08/2025")
        .assert()
        .code(1)
        .stderr(contains("--from expects YYYY-MM-DD"));
    assert!(!ws.out_dir().exists());
}

#[test]
fn reversed_date_range_is_rejected() {
    TestWorkspace::new()
        .report_cmd("progress")
        .args(["--from=2025-08-09", "--to=2025-08-01"])
        .assert()
        .code(1)
        .stderr(contains("is after"));
}

#[test]
fn invalid_config_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let ws = TestWorkspace::new();
    ws.write_config("[fetch]\npage_size = 0\n")?;
    ws.report_cmd("progress")
        .assert()
        .code(1)
        .stderr(contains("fetch.page_size"));
    Ok(())
}

#[test]
fn explicit_config_must_exist() {
    TestWorkspace::new()
        .report_cmd("progress")
        .arg("--config=missing.toml")
        .assert()
        .code(1)
        .stderr(contains("Config file not found"));
}

#[test]
fn unreadable_fixture_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
    let ws = TestWorkspace::new();
    let fixture = ws.write_file("broken.json", "[1, 2]")?;
    ws.cmd()
        .args(["progress", "--fixture"])
        .arg(fixture)
        .assert()
        .code(1)
        .stderr(contains("fixture must be a JSON object"));
    Ok(())
}
