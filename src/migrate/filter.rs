use chrono::NaiveDate;

use crate::model::flat_task::FlatTask;

const ARCHIVED: &str = "archived";

/// Parse `YYYY-MM-DD`, the start of `start..end`, or the date part of a timestamp.
pub fn parse_date_start(value: &str) -> Option<NaiveDate> {
    let s = value.trim();
    let s = s.split("..").next().unwrap_or_default().trim();
    if s.is_empty() {
        return None;
    }
    let date: String = s.chars().take(10).collect();
    NaiveDate::parse_from_str(&date, "%Y-%m-%d").ok()
}

pub fn is_archived(task: &FlatTask) -> bool {
    task.status.trim().eq_ignore_ascii_case(ARCHIVED)
}

/// Keep every non-archived task, and archived ones archived strictly after `cutoff`.
pub fn filter_tasks(tasks: Vec<FlatTask>, cutoff: NaiveDate) -> Vec<FlatTask> {
    tasks
        .into_iter()
        .filter(|t| {
            !is_archived(t) || parse_date_start(&t.archived).is_some_and(|d| d > cutoff)
        })
        .collect()
}
