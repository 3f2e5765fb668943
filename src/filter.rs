//! Record filters applied between fetching and tree building.
//!
//! Every reduction here is also expressible as a backend filter, but each one
//! is re-applied in memory: `like` pre-filters over-match and sites differ in
//! how they compare values.

use std::collections::{HashMap, HashSet};

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{Error, Result};
use crate::html::strip_html;
use crate::model::{Comment, Task};
use crate::normalize::is_responsible_for;
use crate::source::Filter;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// User-supplied criteria shared by both report variants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilters {
    pub range: DateRange,
    pub project: Option<String>,
    pub company: Option<String>,
    /// Task statuses to keep; matched case-insensitively
    pub statuses: Vec<String>,
    pub keyword: Option<String>,
    pub leaf_only: bool,
    pub latest_only: bool,
    /// Add the stripped text of each comment to the report
    pub include_plain: bool,
}

/// Comment creation window. `to` covers its whole day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self> {
        let range = Self {
            from: from.map(|v| parse_date("--from", v)).transpose()?,
            to: to.map(|v| parse_date("--to", v)).transpose()?,
        };
        if let (Some(from), Some(to)) = (range.from, range.to) {
            if from > to {
                return Err(Error::InvalidArgument(format!(
                    "--from {from} is after --to {to}"
                )));
            }
        }
        Ok(range)
    }

    /// Inclusive lower bound, midnight of `from`.
    pub fn start(&self) -> Option<NaiveDateTime> {
        self.from.map(|d| d.and_time(NaiveTime::MIN))
    }

    /// Exclusive upper bound, midnight of the day after `to`.
    pub fn end(&self) -> Option<NaiveDateTime> {
        self.to
            .and_then(|d| d.checked_add_days(Days::new(1)))
            .map(|d| d.and_time(NaiveTime::MIN))
    }

    /// Backend filters on `field` for this window.
    pub fn query_filters(&self, field: &str) -> Vec<Filter> {
        let mut filters = Vec::new();
        if let Some(start) = self.start() {
            filters.push(Filter::gte(field, start.format(TIMESTAMP_FORMAT).to_string()));
        }
        if let Some(end) = self.end() {
            filters.push(Filter::lt(field, end.format(TIMESTAMP_FORMAT).to_string()));
        }
        filters
    }

    pub fn contains(&self, creation: &str) -> bool {
        match parse_timestamp(creation) {
            Some(at) => {
                self.start().map_or(true, |start| at >= start)
                    && self.end().map_or(true, |end| at < end)
            }
            None => {
                // Unparseable values fall back to the backend's text ordering.
                let text = creation.trim();
                let bound = |at: NaiveDateTime| at.format(TIMESTAMP_FORMAT).to_string();
                self.start().map_or(true, |start| text >= bound(start).as_str())
                    && self.end().map_or(true, |end| text < bound(end).as_str())
            }
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

fn parse_date(flag: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        Error::InvalidArgument(format!("{flag} expects YYYY-MM-DD (got '{value}')"))
    })
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(at) = NaiveDateTime::parse_from_str(value, format) {
            return Some(at);
        }
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Split a comma-separated status list, dropping blanks.
pub fn parse_status_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn retain_responsible(tasks: &mut Vec<Task>, identity: &str) {
    tasks.retain(|task| is_responsible_for(task.responsible.as_ref(), identity));
}

/// Keep tasks whose status is in `statuses`. An empty list keeps everything.
pub fn retain_statuses(tasks: &mut Vec<Task>, statuses: &[String]) {
    if statuses.is_empty() {
        return;
    }
    let wanted: HashSet<String> = statuses.iter().map(|s| s.trim().to_lowercase()).collect();
    tasks.retain(|task| wanted.contains(&task.status.trim().to_lowercase()));
}

pub fn retain_leaves(tasks: &mut Vec<Task>) {
    tasks.retain(|task| !task.is_group);
}

pub fn retain_comment_kind(comments: &mut Vec<Comment>) {
    comments.retain(Comment::is_comment_kind);
}

pub fn retain_in_range(comments: &mut Vec<Comment>, range: &DateRange) {
    if range.is_unbounded() {
        return;
    }
    comments.retain(|comment| range.contains(&comment.creation));
}

/// Case-insensitive substring match on the markup-free comment text.
pub fn retain_keyword(comments: &mut Vec<Comment>, keyword: &str) {
    let keyword = keyword.to_lowercase();
    if keyword.is_empty() {
        return;
    }
    comments.retain(|comment| strip_html(&comment.content).to_lowercase().contains(&keyword));
}

pub fn retain_owner(comments: &mut Vec<Comment>, owner: &str) {
    comments.retain(|comment| comment.owner == owner);
}

/// Newest comment per task, by text comparison of `creation`.
///
/// On equal timestamps the first one seen wins. Output follows the order in
/// which tasks first appear.
pub fn latest_per_task(comments: Vec<Comment>) -> Vec<Comment> {
    let mut order: Vec<String> = Vec::new();
    let mut latest: HashMap<String, Comment> = HashMap::new();
    for comment in comments {
        match latest.get(&comment.reference_name) {
            Some(current) if comment.creation <= current.creation => {}
            Some(_) => {
                latest.insert(comment.reference_name.clone(), comment);
            }
            None => {
                order.push(comment.reference_name.clone());
                latest.insert(comment.reference_name.clone(), comment);
            }
        }
    }
    order
        .into_iter()
        .filter_map(|task| latest.remove(&task))
        .collect()
}

pub fn group_by_task(comments: Vec<Comment>) -> HashMap<String, Vec<Comment>> {
    let mut grouped: HashMap<String, Vec<Comment>> = HashMap::new();
    for comment in comments {
        grouped
            .entry(comment.reference_name.clone())
            .or_default()
            .push(comment);
    }
    grouped
}
