use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::config::StatusIds;
use crate::error::{Error, Result};
use crate::model::flat_task::FlatTask;
use crate::model::jira::Priority;

const MAX_LABEL_LEN: usize = 255;

/// Notion priority option -> Jira priority name. Unlisted values pass through.
const PRIORITY_ALIASES: [(&str, &str); 4] = [
    ("P: Lav", "Uviktig"),
    ("P: Medium", "Mindre alvorlig"),
    ("P: Høy", "Alvorlig"),
    ("P: Haster", "Kritisk"),
];

static ESTIMATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d+)\s*t\)").expect("valid estimate regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));
static LABEL_STRIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\-_]+").expect("valid label regex"));

/// A task expressed in Jira vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskMappingResult {
    pub summary: String,
    pub description: String,
    pub labels: Vec<String>,
    pub priority_id: Option<String>,
    pub original_estimate: Option<String>,
    pub target_status_id: Option<String>,
    pub comments: Vec<String>,
}

pub struct TaskMapper {
    status_map: Vec<(&'static str, String)>,
}

impl TaskMapper {
    pub fn new(statuses: &StatusIds) -> Self {
        Self {
            status_map: vec![
                ("archived", statuses.done.clone()),
                ("done", statuses.done.clone()),
                ("qa", statuses.qa.clone()),
                ("in progress", statuses.in_progress.clone()),
                ("ready for development", statuses.ready.clone()),
                ("backlog", statuses.backlog.clone()),
            ],
        }
    }

    pub fn map_status_id(&self, src: &str) -> Option<String> {
        let key = src.trim().to_lowercase();
        self.status_map
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, id)| id.clone())
    }

    pub fn map_priority(&self, src: &str, priorities: &[Priority]) -> Option<String> {
        let src = src.trim();
        if src.is_empty() {
            return None;
        }
        let mapped = PRIORITY_ALIASES
            .iter()
            .find(|(from, _)| *from == src)
            .map(|(_, to)| *to)
            .unwrap_or(src)
            .to_lowercase();

        let found = priorities.iter().find(|p| {
            p.name.as_deref().unwrap_or_default().trim().to_lowercase() == mapped
        });
        if found.is_none() {
            warn!(priority = %mapped, "No Jira priority match");
        }
        found.map(|p| p.id.clone())
    }

    /// Map one task. A task without a title is rejected.
    pub fn map_task(&self, task: &FlatTask, priorities: &[Priority]) -> Result<TaskMappingResult> {
        let summary = task.title.trim();
        if summary.is_empty() {
            return Err(Error::MissingTitle);
        }

        Ok(TaskMappingResult {
            summary: summary.to_string(),
            description: task.description.trim().to_string(),
            labels: merge_labels(&[parse_tags(&task.tags), parse_tags(&task.codebase)]),
            priority_id: self.map_priority(&task.priority, priorities),
            original_estimate: parse_estimate(&task.estimate),
            target_status_id: self.map_status_id(&task.status),
            comments: map_comments(&task.comments),
        })
    }
}

/// Lowercase, hyphenate whitespace, drop anything Jira rejects in a label.
pub fn normalize_label(s: &str) -> String {
    let lower = s.trim().to_lowercase();
    let hyphenated = WHITESPACE_RE.replace_all(&lower, "-");
    let stripped = LABEL_STRIP_RE.replace_all(&hyphenated, "");
    stripped.chars().take(MAX_LABEL_LEN).collect()
}

pub fn parse_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(normalize_label)
        .collect()
}

/// Union of label lists in first-seen order, without duplicates or empties.
pub fn merge_labels(lists: &[Vec<String>]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for label in lists.iter().flatten() {
        if !label.is_empty() && seen.insert(label.as_str()) {
            out.push(label.clone());
        }
    }
    out
}

/// `"S: Liten (4t)"` -> `"4h"`.
pub fn parse_estimate(original: &str) -> Option<String> {
    let lower = original.to_lowercase();
    let caps = ESTIMATE_RE.captures(&lower)?;
    let hours: u64 = caps[1].parse().ok()?;
    Some(format!("{hours}h"))
}

pub fn map_comments(src: &str) -> Vec<String> {
    src.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::priority;

    fn mapper() -> TaskMapper {
        TaskMapper::new(&StatusIds::default())
    }

    fn priorities() -> Vec<Priority> {
        vec![
            priority("1", "Kritisk"),
            priority("2", "Alvorlig"),
            priority("4", "Mindre alvorlig"),
            priority("5", "Uviktig"),
            priority("9", "Highest"),
        ]
    }

    #[test]
    fn labels_are_normalized_and_merged() {
        let labels = merge_labels(&[parse_tags("Bug Fix!, API "), parse_tags("api, Backend  Core")]);
        assert_eq!(labels, ["bug-fix", "api", "backend-core"]);
    }

    #[test]
    fn labels_drop_entries_that_strip_to_nothing() {
        assert_eq!(parse_tags(" , !!, ok"), ["", "ok"]);
        assert_eq!(merge_labels(&[parse_tags(" , !!, ok")]), ["ok"]);
    }

    #[test]
    fn labels_are_truncated() {
        let long = "a".repeat(300);
        assert_eq!(normalize_label(&long).len(), 255);
    }

    #[test]
    fn estimate_hours() {
        assert_eq!(parse_estimate("S: Liten (4t)"), Some("4h".to_string()));
        assert_eq!(parse_estimate("L: Stor (16 T)"), Some("16h".to_string()));
        assert_eq!(parse_estimate("no hours here"), None);
        assert_eq!(parse_estimate(""), None);
    }

    #[test]
    fn status_lookup_is_case_insensitive() {
        let m = mapper();
        assert_eq!(m.map_status_id("Archived"), Some("13382".to_string()));
        assert_eq!(m.map_status_id(" IN PROGRESS "), Some("13381".to_string()));
        assert_eq!(m.map_status_id("Ready for development"), Some("13383".to_string()));
        assert_eq!(m.map_status_id("QA"), Some("13384".to_string()));
        assert_eq!(m.map_status_id("Backlog"), Some("13380".to_string()));
        assert_eq!(m.map_status_id("Blocked"), None);
        assert_eq!(m.map_status_id(""), None);
    }

    #[test]
    fn priority_aliases_then_live_names() {
        let m = mapper();
        let p = priorities();
        assert_eq!(m.map_priority("P: Høy", &p), Some("2".to_string()));
        assert_eq!(m.map_priority("P: Lav", &p), Some("5".to_string()));
        assert_eq!(m.map_priority("highest", &p), Some("9".to_string()));
        assert_eq!(m.map_priority("P: Ukjent", &p), None);
        assert_eq!(m.map_priority("", &p), None);
    }

    #[test]
    fn comments_split_into_trimmed_lines() {
        assert_eq!(map_comments("  one \n\n two\n   \n"), ["one", "two"]);
        assert!(map_comments("").is_empty());
    }

    #[test]
    fn map_task_rejects_missing_title() {
        let task = FlatTask {
            title: "   ".into(),
            status: "Done".into(),
            ..Default::default()
        };
        assert!(matches!(
            mapper().map_task(&task, &priorities()),
            Err(Error::MissingTitle)
        ));
    }

    #[test]
    fn map_task_collects_every_field() {
        let task = FlatTask {
            title: " Fix login ".into(),
            status: "QA".into(),
            priority: "P: Haster".into(),
            estimate: "M: Middels (8t)".into(),
            tags: "Bug, Frontend".into(),
            codebase: "frontend, Web App".into(),
            description: "Line 1\nLine 2".into(),
            comments: "2025-01-01: hi\nsecond".into(),
            ..Default::default()
        };
        let mapped = mapper().map_task(&task, &priorities()).unwrap();
        assert_eq!(mapped.summary, "Fix login");
        assert_eq!(mapped.labels, ["bug", "frontend", "web-app"]);
        assert_eq!(mapped.priority_id, Some("1".to_string()));
        assert_eq!(mapped.original_estimate, Some("8h".to_string()));
        assert_eq!(mapped.target_status_id, Some("13384".to_string()));
        assert_eq!(mapped.comments, ["2025-01-01: hi", "second"]);
    }
}
