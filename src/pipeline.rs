//! Fetch, filter and assemble a report.
//!
//! Both report variants run through [`run`]; the [`Scope`] decides whether
//! tasks or comments are fetched first. All backend access goes through a
//! [`DocumentSource`], in fixed-size batches, one request at a time.

use std::collections::{HashMap, HashSet};

use crate::config::FetchConfig;
use crate::error::Result;
use crate::filter::{self, ReportFilters};
use crate::model::{
    task_fields_with_responsible, Comment, Project, Task, COMMENT_DOCTYPE, COMMENT_FIELDS,
    COMMENT_KIND, PROJECT_DOCTYPE, PROJECT_FIELDS, RESPONSIBLE_FIELD, TASK_DOCTYPE, TASK_FIELDS,
};
use crate::report::{assemble, ProjectReport};
use crate::source::{fetch_typed, DocumentSource, Filter, ListQuery, SortOrder};
use crate::tree::{GroupFlag, TreeOptions};

/// Which records drive the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Tasks the identity is responsible for, with the comments on them.
    Responsible { email: String },
    /// Projects discovered from matching comments, optionally by one author.
    Comments { owner: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Report(Vec<ProjectReport>),
    /// Nothing matched; carries the message shown to the user.
    Empty(String),
}

pub fn run<S: DocumentSource + ?Sized>(
    source: &S,
    fetch: &FetchConfig,
    filters: &ReportFilters,
    scope: &Scope,
) -> Result<Outcome> {
    fetch.validate()?;
    let fetcher = Fetcher { source, fetch };
    match scope {
        Scope::Responsible { email } => personal(&fetcher, filters, email.trim()),
        Scope::Comments { owner } => progress(&fetcher, filters, owner.as_deref()),
    }
}

fn personal<S: DocumentSource + ?Sized>(
    fetcher: &Fetcher<'_, S>,
    filters: &ReportFilters,
    email: &str,
) -> Result<Outcome> {
    let mut projects: HashMap<String, Project> = HashMap::new();
    let mut targets: Vec<String> = Vec::new();
    if let Some(project) = &filters.project {
        targets.push(project.clone());
    }
    if let Some(company) = &filters.company {
        for project in fetcher.projects_of_company(company)? {
            push_unique(&mut targets, &project.name);
            projects.insert(project.name.clone(), project);
        }
    }

    let mut tasks = fetcher.responsible_tasks(&targets, email)?;
    tracing::debug!(count = tasks.len(), "tasks matching responsible pre-filter");
    filter::retain_responsible(&mut tasks, email);
    filter::retain_statuses(&mut tasks, &filters.statuses);
    if filters.leaf_only {
        filter::retain_leaves(&mut tasks);
    }
    tracing::debug!(count = tasks.len(), "tasks after task filters");
    if tasks.is_empty() {
        return Ok(Outcome::Empty(format!(
            "no tasks assigned to {email} match the current filters"
        )));
    }

    let project_ids = distinct(tasks.iter().map(|t| t.project.as_str()));
    fetcher.load_missing_projects(&mut projects, &project_ids)?;
    if let Some(company) = &filters.company {
        tasks.retain(|task| {
            projects
                .get(&task.project)
                .is_some_and(|project| &project.company == company)
        });
    }

    let task_ids = distinct(tasks.iter().map(|t| t.name.as_str()));
    let mut comments = fetcher.comments_on_tasks(&task_ids, email, filters)?;
    let known: HashSet<&str> = task_ids.iter().map(String::as_str).collect();
    comments.retain(|comment| known.contains(comment.reference_name.as_str()));
    let comments = reduce_comments(comments, filters);

    let options = TreeOptions {
        group_flag: GroupFlag::PromoteParents,
        include_plain: filters.include_plain,
    };
    let report = assemble(
        &projects,
        tasks,
        &filter::group_by_task(comments),
        &options,
        Some(email),
    );
    Ok(finish(report))
}

fn progress<S: DocumentSource + ?Sized>(
    fetcher: &Fetcher<'_, S>,
    filters: &ReportFilters,
    owner: Option<&str>,
) -> Result<Outcome> {
    let mut comments = fetcher.recent_comments(owner, filters)?;
    filter::retain_comment_kind(&mut comments);
    if let Some(owner) = owner {
        filter::retain_owner(&mut comments, owner);
    }
    filter::retain_in_range(&mut comments, &filters.range);
    tracing::debug!(count = comments.len(), "comments after comment filters");

    let referenced = distinct(
        comments
            .iter()
            .map(|c| c.reference_name.as_str())
            .filter(|name| !name.is_empty()),
    );
    let commented: HashMap<String, String> = fetcher
        .tasks_by_name(&referenced)?
        .into_iter()
        .map(|task| (task.name, task.project))
        .collect();

    let before = comments.len();
    comments.retain(|comment| commented.contains_key(&comment.reference_name));
    if comments.len() < before {
        tracing::warn!(
            dropped = before - comments.len(),
            "dropping comments on tasks that no longer exist"
        );
    }

    let mut projects: HashMap<String, Project> = HashMap::new();
    let mut targets: Vec<String> = Vec::new();
    if filters.project.is_some() || filters.company.is_some() {
        if let Some(project) = &filters.project {
            targets.push(project.clone());
        }
        if let Some(company) = &filters.company {
            for project in fetcher.projects_of_company(company)? {
                push_unique(&mut targets, &project.name);
                projects.insert(project.name.clone(), project);
            }
        }
    } else {
        for comment in &comments {
            if let Some(project) = commented.get(&comment.reference_name) {
                if !project.is_empty() {
                    push_unique(&mut targets, project);
                }
            }
        }
    }
    if targets.is_empty() {
        return Ok(Outcome::Empty(
            "no target project: no matching comments and no --project or --company given"
                .to_string(),
        ));
    }
    tracing::debug!(count = targets.len(), "target projects");

    fetcher.load_missing_projects(&mut projects, &targets)?;
    let scoped: HashSet<&str> = targets.iter().map(String::as_str).collect();
    comments.retain(|comment| {
        commented
            .get(&comment.reference_name)
            .is_some_and(|project| scoped.contains(project.as_str()))
    });

    let mut tasks = fetcher.tasks_of_projects(&targets)?;
    filter::retain_statuses(&mut tasks, &filters.statuses);
    if filters.leaf_only {
        filter::retain_leaves(&mut tasks);
    }
    tracing::debug!(count = tasks.len(), "tasks after task filters");

    let comments = reduce_comments(comments, filters);
    let options = TreeOptions {
        group_flag: GroupFlag::Source,
        include_plain: filters.include_plain,
    };
    let report = assemble(
        &projects,
        tasks,
        &filter::group_by_task(comments),
        &options,
        None,
    );
    Ok(finish(report))
}

/// Kind, date, keyword and latest-only reductions shared by both variants.
fn reduce_comments(mut comments: Vec<Comment>, filters: &ReportFilters) -> Vec<Comment> {
    filter::retain_comment_kind(&mut comments);
    filter::retain_in_range(&mut comments, &filters.range);
    if let Some(keyword) = &filters.keyword {
        filter::retain_keyword(&mut comments, keyword);
    }
    if filters.latest_only {
        comments = filter::latest_per_task(comments);
    }
    tracing::debug!(count = comments.len(), "comments kept for report");
    comments
}

fn finish(report: Vec<ProjectReport>) -> Outcome {
    if report.is_empty() {
        Outcome::Empty("nothing matched the current filters".to_string())
    } else {
        Outcome::Report(report)
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|existing| existing == value) {
        list.push(value.to_string());
    }
}

/// Distinct values in first-seen order.
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|value| seen.insert(*value))
        .map(str::to_string)
        .collect()
}

struct Fetcher<'a, S: ?Sized> {
    source: &'a S,
    fetch: &'a FetchConfig,
}

impl<S: DocumentSource + ?Sized> Fetcher<'_, S> {
    fn query<T: serde::de::DeserializeOwned>(
        &self,
        doctype: &str,
        query: &ListQuery,
    ) -> Result<Vec<T>> {
        fetch_typed(self.source, doctype, query, self.fetch.page_size)
    }

    fn projects_of_company(&self, company: &str) -> Result<Vec<Project>> {
        let query = ListQuery::new(&PROJECT_FIELDS).filter(Filter::eq("company", company));
        let projects: Vec<Project> = self.query(PROJECT_DOCTYPE, &query)?;
        tracing::debug!(company, count = projects.len(), "projects of company");
        Ok(projects)
    }

    fn load_missing_projects(
        &self,
        projects: &mut HashMap<String, Project>,
        ids: &[String],
    ) -> Result<()> {
        let missing: Vec<&String> = ids.iter().filter(|id| !projects.contains_key(*id)).collect();
        for part in missing.chunks(self.fetch.lookup_chunk) {
            let query = ListQuery::new(&PROJECT_FIELDS).filter(Filter::is_in("name", part));
            for project in self.query::<Project>(PROJECT_DOCTYPE, &query)? {
                projects.insert(project.name.clone(), project);
            }
        }
        Ok(())
    }

    /// Tasks whose responsible field mentions `email`, within `targets` when
    /// any are given.
    fn responsible_tasks(&self, targets: &[String], email: &str) -> Result<Vec<Task>> {
        let fields = task_fields_with_responsible();
        let like = Filter::contains(RESPONSIBLE_FIELD, email);
        if targets.is_empty() {
            let query = ListQuery::new(fields.as_slice()).filter(like);
            return self.query(TASK_DOCTYPE, &query);
        }

        let mut tasks = Vec::new();
        for part in targets.chunks(self.fetch.project_chunk) {
            let query = ListQuery::new(fields.as_slice())
                .filter(Filter::is_in("project", part))
                .filter(like.clone());
            tasks.extend(self.query::<Task>(TASK_DOCTYPE, &query)?);
        }
        Ok(tasks)
    }

    fn tasks_by_name(&self, names: &[String]) -> Result<Vec<Task>> {
        let mut tasks = Vec::new();
        for part in names.chunks(self.fetch.lookup_chunk) {
            let query = ListQuery::new(&TASK_FIELDS).filter(Filter::is_in("name", part));
            tasks.extend(self.query::<Task>(TASK_DOCTYPE, &query)?);
        }
        Ok(tasks)
    }

    fn tasks_of_projects(&self, projects: &[String]) -> Result<Vec<Task>> {
        let mut tasks = Vec::new();
        for part in projects.chunks(self.fetch.project_chunk) {
            let query = ListQuery::new(&TASK_FIELDS).filter(Filter::is_in("project", part));
            tasks.extend(self.query::<Task>(TASK_DOCTYPE, &query)?);
        }
        Ok(tasks)
    }

    fn comments_on_tasks(
        &self,
        task_ids: &[String],
        email: &str,
        filters: &ReportFilters,
    ) -> Result<Vec<Comment>> {
        let mut comments = Vec::new();
        for part in task_ids.chunks(self.fetch.comment_chunk) {
            let query = comment_query(filters)
                .filter(Filter::is_in("reference_name", part))
                .filter(Filter::eq("comment_email", email));
            comments.extend(self.query::<Comment>(COMMENT_DOCTYPE, &query)?);
        }
        Ok(comments)
    }

    fn recent_comments(
        &self,
        owner: Option<&str>,
        filters: &ReportFilters,
    ) -> Result<Vec<Comment>> {
        let mut query = comment_query(filters);
        if let Some(owner) = owner {
            query = query.filter(Filter::eq("owner", owner));
        }
        self.query(COMMENT_DOCTYPE, &query)
    }
}

/// Task comments in the date window, oldest first.
fn comment_query(filters: &ReportFilters) -> ListQuery {
    ListQuery::new(&COMMENT_FIELDS)
        .filter(Filter::eq("reference_doctype", TASK_DOCTYPE))
        .filter(Filter::eq("comment_type", COMMENT_KIND))
        .filters(filters.range.query_filters("creation"))
        .order_by("creation", SortOrder::Asc)
}
