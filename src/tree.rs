//! Task hierarchy reconstruction.
//!
//! Tasks arrive as a flat list with `parent_task` back-references. A task is a
//! root when its parent is empty, is itself, or is not in the list. Siblings
//! are ordered by `lft` when every one of them has it, by subject otherwise.
//!
//! Parent pointers are assumed acyclic, as the tracker enforces. Tasks on a
//! cycle have no path to a root and are left out of the result.

use std::collections::HashMap;

use serde::Serialize;

use crate::collate;
use crate::html::{sanitize_html, strip_html};
use crate::model::{Comment, Task};

/// How a node's `is_group` flag is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GroupFlag {
    /// Keep the flag stored on the task
    #[default]
    Source,
    /// Also mark any task that has children in the tree
    PromoteParents,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeOptions {
    pub group_flag: GroupFlag,
    pub include_plain: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CommentEntry {
    pub comment_time: String,
    pub comment_owner: String,
    pub comment_html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_plain: Option<String>,
}

impl CommentEntry {
    pub fn from_comment(comment: &Comment, include_plain: bool) -> Self {
        Self {
            comment_time: comment.creation.clone(),
            comment_owner: comment.owner.clone(),
            comment_html: sanitize_html(&comment.content),
            comment_plain: include_plain.then(|| strip_html(&comment.content)),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TaskNode {
    pub task_id: String,
    pub task_subject: String,
    pub task_status: String,
    pub task_progress: Option<f64>,
    pub task_priority: Option<String>,
    pub is_group: bool,
    /// Newest first
    pub comments: Vec<CommentEntry>,
    pub children: Vec<TaskNode>,
}

impl TaskNode {
    /// Number of nodes in this subtree, including itself.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TaskNode::node_count).sum::<usize>()
    }

    pub fn comment_count(&self) -> usize {
        self.comments.len() + self.children.iter().map(TaskNode::comment_count).sum::<usize>()
    }
}

/// Build the ordered root list for the tasks of one project.
///
/// `comments` maps task id to that task's comments in any order. Duplicate
/// task ids keep their first occurrence.
pub fn build_tree(
    tasks: &[Task],
    comments: &HashMap<String, Vec<Comment>>,
    options: &TreeOptions,
) -> Vec<TaskNode> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut unique: Vec<&Task> = Vec::new();
    for task in tasks {
        if !index.contains_key(task.name.as_str()) {
            index.insert(task.name.as_str(), unique.len());
            unique.push(task);
        }
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); unique.len()];
    let mut roots = Vec::new();
    for (id, task) in unique.iter().enumerate() {
        let parent = task
            .parent()
            .and_then(|name| index.get(name).copied())
            .filter(|&parent| parent != id && unique[parent].project == task.project);
        match parent {
            Some(parent) => children[parent].push(id),
            None => roots.push(id),
        }
    }

    sort_siblings(&mut roots, &unique);
    for siblings in &mut children {
        sort_siblings(siblings, &unique);
    }

    let builder = Builder {
        tasks: &unique,
        children: &children,
        comments,
        options,
    };
    roots.into_iter().map(|id| builder.node(id)).collect()
}

fn sort_siblings(ids: &mut [usize], tasks: &[&Task]) {
    if ids.iter().all(|&id| tasks[id].lft.is_some()) {
        ids.sort_by(|&a, &b| {
            tasks[a]
                .lft
                .cmp(&tasks[b].lft)
                .then_with(|| tasks[a].name.cmp(&tasks[b].name))
        });
    } else {
        ids.sort_by(|&a, &b| {
            collate::compare(&tasks[a].subject, &tasks[b].subject)
                .then_with(|| tasks[a].name.cmp(&tasks[b].name))
        });
    }
}

struct Builder<'a> {
    tasks: &'a [&'a Task],
    children: &'a [Vec<usize>],
    comments: &'a HashMap<String, Vec<Comment>>,
    options: &'a TreeOptions,
}

impl Builder<'_> {
    fn node(&self, id: usize) -> TaskNode {
        let task = self.tasks[id];
        let children: Vec<TaskNode> = self.children[id]
            .iter()
            .map(|&child| self.node(child))
            .collect();

        let mut comments: Vec<&Comment> = self
            .comments
            .get(&task.name)
            .map(|list| list.iter().collect())
            .unwrap_or_default();
        comments.sort_by(|a, b| b.creation.cmp(&a.creation));

        let is_group = match self.options.group_flag {
            GroupFlag::Source => task.is_group,
            GroupFlag::PromoteParents => task.is_group || !children.is_empty(),
        };

        TaskNode {
            task_id: task.name.clone(),
            task_subject: task.subject.clone(),
            task_status: task.status.clone(),
            task_progress: task.progress,
            task_priority: task.priority.clone(),
            is_group,
            comments: comments
                .into_iter()
                .map(|c| CommentEntry::from_comment(c, self.options.include_plain))
                .collect(),
            children,
        }
    }
}
