use std::path::PathBuf;

use frappe_report::error::{exit_codes, Error, JsonError};

#[test]
fn every_error_exits_with_failure() {
    let errors = [
        Error::InvalidArgument("bad".to_string()),
        Error::MissingCredential("FRAPPE_URL"),
        Error::Backend {
            doctype: "Task".to_string(),
            status: 500,
            body: "boom".to_string(),
        },
    ];
    for err in errors {
        assert_eq!(err.exit_code(), exit_codes::FAILURE);
    }
}

#[test]
fn kinds_separate_config_from_fetch() {
    assert_eq!(Error::InvalidConfig("x".to_string()).kind(), "config_error");
    assert_eq!(Error::ConfigNotFound(PathBuf::from("a.toml")).kind(), "config_error");
    let backend = Error::Backend {
        doctype: "Comment".to_string(),
        status: 502,
        body: String::new(),
    };
    assert_eq!(backend.kind(), "fetch_failed");
    let io = Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
    assert_eq!(io.kind(), "operation_failed");
}

#[test]
fn json_error_includes_details() {
    let err = Error::Backend {
        doctype: "Task".to_string(),
        status: 403,
        body: "Not permitted".to_string(),
    };
    let json = JsonError::from(&err);
    assert_eq!(json.code, exit_codes::FAILURE);
    assert_eq!(json.kind, "fetch_failed");
    assert!(json.message.contains("403"));
    let details = json.details.expect("details");
    assert_eq!(details["doctype"], "Task");
    assert_eq!(details["status"], 403);
}

#[test]
fn missing_credential_names_variable() {
    let err = Error::MissingCredential("FRAPPE_API_KEY");
    assert!(err.to_string().contains("FRAPPE_API_KEY"));
    let json = JsonError::from(&err);
    assert_eq!(json.details.expect("details")["missing"], "FRAPPE_API_KEY");
}
