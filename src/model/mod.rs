pub mod flat_task;
pub mod jira;
pub mod notion;
