pub mod filter;
pub mod mapper;
pub mod payload;

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::model::flat_task::FlatTask;
use crate::model::jira::Priority;
use crate::providers::JiraApi;
use mapper::{TaskMapper, TaskMappingResult};
use payload::{build_create_payload, build_update_fields, metadata_comment, CustomFieldIds};

/// Write steps performed for each task, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Create,
    CustomFields,
    MoveToBoard,
    Transition,
    Comments,
    Metadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Done,
    Skipped(String),
    Failed(String),
}

/// What happened to one created issue.
#[derive(Debug, Clone)]
pub struct RecordOutcome {
    pub index: usize,
    pub summary: String,
    pub key: String,
    pub steps: Vec<(Step, StepStatus)>,
}

impl RecordOutcome {
    fn new(index: usize, summary: &str, key: &str) -> Self {
        Self {
            index,
            summary: summary.to_string(),
            key: key.to_string(),
            steps: Vec::new(),
        }
    }

    fn log(&mut self, step: Step, status: StepStatus) {
        match &status {
            StepStatus::Failed(reason) => {
                warn!(key = %self.key, ?step, %reason, "step failed")
            }
            StepStatus::Skipped(reason) => {
                debug!(key = %self.key, ?step, %reason, "step skipped")
            }
            StepStatus::Done => info!(key = %self.key, ?step, "step done"),
        }
        self.steps.push((step, status));
    }

    pub fn status(&self, step: Step) -> Option<&StepStatus> {
        self.steps.iter().find(|(s, _)| *s == step).map(|(_, st)| st)
    }

    pub fn has_failures(&self) -> bool {
        self.steps
            .iter()
            .any(|(_, st)| matches!(st, StepStatus::Failed(_)))
    }
}

/// A task that produced no issue: invalid input or a failed create call.
#[derive(Debug, Clone)]
pub struct Rejected {
    pub index: usize,
    pub title: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct MigrationReport {
    /// Tasks handed to the run, after filtering.
    pub total: usize,
    pub created: Vec<String>,
    pub outcomes: Vec<RecordOutcome>,
    pub rejected: Vec<Rejected>,
}

/// Lookups done once per run, before any task is written.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub priorities: Vec<Priority>,
    pub field_ids: CustomFieldIds,
    /// First issue on the board before this run created anything.
    pub anchor: Option<String>,
}

pub struct Migrator<'a> {
    api: &'a dyn JiraApi,
    config: &'a AppConfig,
    mapper: TaskMapper,
}

impl<'a> Migrator<'a> {
    pub fn new(api: &'a dyn JiraApi, config: &'a AppConfig) -> Self {
        Self {
            api,
            config,
            mapper: TaskMapper::new(&config.jira.statuses),
        }
    }

    /// Jira Cloud addresses custom fields by id, so resolve them by display name.
    pub async fn resolve_field_ids(&self) -> Result<CustomFieldIds> {
        let fields = self.api.fields().await?;
        let by_name: HashMap<&str, &str> = fields
            .iter()
            .filter_map(|f| Some((f.name.as_deref()?, f.id.as_deref()?)))
            .collect();

        let migration = &self.config.migration;
        let wanted = [
            migration.category_field.as_str(),
            migration.work_category_field.as_str(),
        ];
        let missing: Vec<String> = wanted
            .iter()
            .filter(|name| !by_name.contains_key(*name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(Error::UnresolvedFields(missing));
        }

        Ok(CustomFieldIds {
            category: by_name[wanted[0]].to_string(),
            work_category: by_name[wanted[1]].to_string(),
        })
    }

    pub async fn prepare(&self) -> Result<RunContext> {
        let priorities = self.api.priorities().await?;
        let field_ids = self.resolve_field_ids().await?;
        info!(?field_ids, "resolved field ids");

        let anchor = self
            .api
            .board_issues(1)
            .await?
            .into_iter()
            .next()
            .map(|issue| issue.key);

        Ok(RunContext {
            priorities,
            field_ids,
            anchor,
        })
    }

    /// Migrate tasks in order. Invalid tasks and failed creates are skipped and
    /// reported; run-level lookups failing aborts before any write.
    pub async fn migrate_tasks(&self, tasks: &[FlatTask], dry_run: bool) -> Result<MigrationReport> {
        let ctx = self.prepare().await?;
        let total = tasks.len();
        let mut report = MigrationReport {
            total,
            ..Default::default()
        };

        for (i, task) in tasks.iter().enumerate() {
            let index = i + 1;
            let mapped = match self.mapper.map_task(task, &ctx.priorities) {
                Ok(mapped) => mapped,
                Err(e) => {
                    warn!(index, error = %e, "skipping task");
                    report.rejected.push(Rejected {
                        index,
                        title: task.title.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            info!(
                index,
                total,
                summary = %mapped.summary,
                labels = ?mapped.labels,
                priority = ?mapped.priority_id,
                estimate = ?mapped.original_estimate,
                target_status = ?mapped.target_status_id,
                comments = mapped.comments.len(),
                "migrating task"
            );
            if dry_run {
                continue;
            }

            match self.migrate_one(&ctx, index, task, &mapped).await {
                Ok(outcome) => {
                    report.created.push(outcome.key.clone());
                    report.outcomes.push(outcome);
                }
                Err(e) => {
                    warn!(index, error = %e, "create failed, skipping task");
                    report.rejected.push(Rejected {
                        index,
                        title: mapped.summary.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    async fn migrate_one(
        &self,
        ctx: &RunContext,
        index: usize,
        task: &FlatTask,
        mapped: &TaskMappingResult,
    ) -> Result<RecordOutcome> {
        let payload = build_create_payload(mapped, &self.config.jira);
        let key = self.api.create_issue(&payload).await?.key;

        let mut outcome = RecordOutcome::new(index, &mapped.summary, &key);
        outcome.log(Step::Create, StepStatus::Done);

        let fields = build_update_fields(&ctx.field_ids, &self.config.migration);
        let status = match self.api.set_issue_fields(&key, &fields).await {
            Ok(()) => StepStatus::Done,
            Err(e) => StepStatus::Failed(format!("could not set custom fields: {e}")),
        };
        outcome.log(Step::CustomFields, status);

        let status = match self.api.move_to_board(&key, ctx.anchor.as_deref()).await {
            Ok(()) => StepStatus::Done,
            Err(e) => StepStatus::Failed(format!("move to board failed: {e}")),
        };
        outcome.log(Step::MoveToBoard, status);

        let status = self
            .transition_step(&key, mapped.target_status_id.as_deref())
            .await;
        outcome.log(Step::Transition, status);

        let status = self.comment_step(&key, &mapped.comments).await;
        outcome.log(Step::Comments, status);

        let status = match metadata_comment(task) {
            Some(text) => match self.api.add_comment(&key, &text).await {
                Ok(()) => StepStatus::Done,
                Err(e) => StepStatus::Failed(format!("metadata comment failed: {e}")),
            },
            None => StepStatus::Skipped("no original dates".into()),
        };
        outcome.log(Step::Metadata, status);

        Ok(outcome)
    }

    async fn transition_step(&self, key: &str, target: Option<&str>) -> StepStatus {
        let Some(target) = target else {
            return StepStatus::Skipped("no mapped status".into());
        };
        if target == self.config.jira.statuses.backlog {
            return StepStatus::Skipped("already in initial status".into());
        }

        let transitions = match self.api.transitions(key).await {
            Ok(t) => t,
            Err(e) => return StepStatus::Failed(format!("transition failed: {e}")),
        };
        let found = transitions
            .iter()
            .find(|t| t.to.as_ref().and_then(|to| to.id.as_deref()) == Some(target));
        let Some(found) = found else {
            let available: Vec<String> = transitions
                .iter()
                .map(|t| {
                    let to = t.to.as_ref();
                    format!(
                        "{} {} -> {} ({})",
                        t.id,
                        t.name.as_deref().unwrap_or("?"),
                        to.and_then(|to| to.name.as_deref()).unwrap_or("?"),
                        to.and_then(|to| to.id.as_deref()).unwrap_or("?"),
                    )
                })
                .collect();
            return StepStatus::Failed(format!(
                "No transition from {key} to status id {target}. Available: {available:?}"
            ));
        };

        match self.api.transition(key, &found.id).await {
            Ok(()) => StepStatus::Done,
            Err(e) => StepStatus::Failed(format!("transition failed: {e}")),
        }
    }

    async fn comment_step(&self, key: &str, comments: &[String]) -> StepStatus {
        if comments.is_empty() {
            return StepStatus::Skipped("no comments".into());
        }

        let delay = Duration::from_millis(self.config.migration.comment_delay_ms);
        let mut failed = 0;
        for comment in comments {
            if let Err(e) = self.api.add_comment(key, comment).await {
                warn!(%key, error = %e, "could not add comment");
                failed += 1;
            }
            tokio::time::sleep(delay).await;
        }

        if failed == 0 {
            StepStatus::Done
        } else {
            StepStatus::Failed(format!("{failed} of {} comments failed", comments.len()))
        }
    }
}
