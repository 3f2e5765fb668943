//! Backend records used by the reports.
//!
//! Frappe stores check fields as `0`/`1` and sends numbers either as JSON
//! numbers or strings depending on the site, so the numeric fields go through
//! tolerant deserializers.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub const PROJECT_DOCTYPE: &str = "Project";
pub const TASK_DOCTYPE: &str = "Task";
pub const COMMENT_DOCTYPE: &str = "Comment";

/// Task field holding the JSON-encoded list of responsible emails.
pub const RESPONSIBLE_FIELD: &str = "custom_nguoi_phu_trach";

/// `comment_type` value of user-written comments.
pub const COMMENT_KIND: &str = "Comment";

pub const PROJECT_FIELDS: [&str; 5] = [
    "name",
    "project_name",
    "status",
    "company",
    "percent_complete",
];

pub const TASK_FIELDS: [&str; 10] = [
    "name",
    "subject",
    "status",
    "progress",
    "priority",
    "is_group",
    "project",
    "parent_task",
    "lft",
    "rgt",
];

pub const COMMENT_FIELDS: [&str; 6] = [
    "name",
    "creation",
    "owner",
    "comment_type",
    "content",
    "reference_name",
];

/// Task projection including the responsible-party field.
pub fn task_fields_with_responsible() -> Vec<String> {
    TASK_FIELDS
        .iter()
        .copied()
        .chain(std::iter::once(RESPONSIBLE_FIELD))
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Project {
    pub name: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub project_name: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub status: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub company: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub percent_complete: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Task {
    pub name: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub subject: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub progress: Option<f64>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub is_group: bool,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub project: String,
    #[serde(default)]
    pub parent_task: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub lft: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub rgt: Option<i64>,
    #[serde(default, rename = "custom_nguoi_phu_trach")]
    pub responsible: Option<Value>,
}

impl Task {
    /// Parent id, with empty strings treated as "no parent".
    pub fn parent(&self) -> Option<&str> {
        self.parent_task
            .as_deref()
            .map(str::trim)
            .filter(|parent| !parent.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Comment {
    pub name: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub creation: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub owner: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub comment_type: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub content: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub reference_name: String,
}

impl Comment {
    pub fn is_comment_kind(&self) -> bool {
        self.comment_type.eq_ignore_ascii_case(COMMENT_KIND)
    }
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("true") || s.parse::<f64>().map(|f| f != 0.0).unwrap_or(false)
        }
        _ => false,
    })
}
