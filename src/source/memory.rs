//! In-memory document source.
//!
//! Evaluates the same filter operators as the backend over JSON records.
//! Comparisons use the text form of each value; `like` is case-insensitive
//! with `%` and `_` wildcards, as on a MariaDB-backed site.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

use serde_json::{Map, Value};

use super::{DocumentSource, Filter, ListQuery, Operator, SortOrder};
use crate::error::{Error, Result};

#[derive(Debug, Default)]
pub struct MemorySource {
    tables: HashMap<String, Vec<Value>>,
    requests: RefCell<Vec<(String, ListQuery)>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(mut self, doctype: &str, records: Vec<Value>) -> Self {
        self.tables
            .entry(doctype.to_string())
            .or_default()
            .extend(records);
        self
    }

    /// Build from a JSON object mapping doctype to an array of records.
    pub fn from_json(value: Value) -> Result<Self> {
        let Value::Object(tables) = value else {
            return Err(Error::InvalidArgument(
                "fixture must be a JSON object of doctype -> records".to_string(),
            ));
        };

        let mut source = Self::new();
        for (doctype, records) in tables {
            let Value::Array(records) = records else {
                return Err(Error::InvalidArgument(format!(
                    "fixture entry '{doctype}' must be an array"
                )));
            };
            source = source.with_records(&doctype, records);
        }
        Ok(source)
    }

    pub fn from_fixture_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&content)?;
        Self::from_json(value)
    }

    /// Every query served so far, in order.
    pub fn requests(&self) -> Vec<(String, ListQuery)> {
        self.requests.borrow().clone()
    }
}

impl DocumentSource for MemorySource {
    fn list(&self, doctype: &str, query: &ListQuery) -> Result<Vec<Value>> {
        self.requests
            .borrow_mut()
            .push((doctype.to_string(), query.clone()));

        let Some(records) = self.tables.get(doctype) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<&Value> = records
            .iter()
            .filter(|record| query.filters.iter().all(|f| matches(record, f)))
            .collect();

        if let Some(order) = &query.order_by {
            matched.sort_by(|a, b| {
                let ordering = text(field(a, &order.field)).cmp(&text(field(b, &order.field)));
                match order.order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            });
        }

        let take = if query.limit == 0 { usize::MAX } else { query.limit };
        Ok(matched
            .into_iter()
            .skip(query.start)
            .take(take)
            .map(|record| project(record, &query.fields))
            .collect())
    }
}

fn field<'a>(record: &'a Value, name: &str) -> &'a Value {
    record.get(name).unwrap_or(&Value::Null)
}

fn text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn matches(record: &Value, filter: &Filter) -> bool {
    let actual = text(field(record, &filter.field));
    match filter.op {
        Operator::Eq => actual == text(&filter.value),
        Operator::In => match &filter.value {
            Value::Array(options) => options.iter().any(|option| text(option) == actual),
            other => text(other) == actual,
        },
        Operator::Like => like(&actual, &text(&filter.value)),
        Operator::Gte => actual >= text(&filter.value),
        Operator::Lt => actual < text(&filter.value),
    }
}

fn like(value: &str, pattern: &str) -> bool {
    let value: Vec<char> = value.to_lowercase().chars().collect();
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();

    let (mut vi, mut pi) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;
    while vi < value.len() {
        if pi < pattern.len() && pattern[pi] == '%' {
            backtrack = Some((pi, vi));
            pi += 1;
        } else if pi < pattern.len() && (pattern[pi] == '_' || pattern[pi] == value[vi]) {
            vi += 1;
            pi += 1;
        } else if let Some((star, mark)) = backtrack {
            pi = star + 1;
            vi = mark + 1;
            backtrack = Some((star, mark + 1));
        } else {
            return false;
        }
    }
    pattern[pi..].iter().all(|ch| *ch == '%')
}

fn project(record: &Value, fields: &[String]) -> Value {
    let Value::Object(map) = record else {
        return record.clone();
    };
    if fields.is_empty() || fields.iter().any(|f| f == "*") {
        return record.clone();
    }
    let projected: Map<String, Value> = fields
        .iter()
        .filter_map(|f| map.get(f).map(|v| (f.clone(), v.clone())))
        .collect();
    Value::Object(projected)
}
