use serde_json::{json, Map, Value};

use super::mapper::TaskMappingResult;
use crate::config::{JiraConfig, MigrationConfig};
use crate::model::flat_task::FlatTask;
use crate::util::adf::adf_doc;

/// Create payload with base fields only; custom fields are set afterwards.
pub fn build_create_payload(mapped: &TaskMappingResult, jira: &JiraConfig) -> Value {
    let mut fields = Map::new();
    fields.insert("project".into(), json!({ "key": jira.project_key }));
    fields.insert("summary".into(), json!(mapped.summary));
    fields.insert("issuetype".into(), json!({ "name": jira.issue_type }));

    if !mapped.description.is_empty() {
        fields.insert("description".into(), adf_doc(&mapped.description));
    }
    if !mapped.labels.is_empty() {
        fields.insert("labels".into(), json!(mapped.labels));
    }
    if let Some(id) = &mapped.priority_id {
        fields.insert("priority".into(), json!({ "id": id }));
    }
    if let Some(estimate) = &mapped.original_estimate {
        fields.insert(
            "timetracking".into(),
            json!({ "originalEstimate": estimate }),
        );
    }

    json!({ "fields": fields })
}

/// Custom field ids resolved by display name at the start of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomFieldIds {
    pub category: String,
    pub work_category: String,
}

/// Select-type custom field values, `{"value": ...}` each.
pub fn build_update_fields(ids: &CustomFieldIds, migration: &MigrationConfig) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert(
        ids.category.clone(),
        json!({ "value": migration.category_value }),
    );
    fields.insert(
        ids.work_category.clone(),
        json!({ "value": migration.work_category_value }),
    );
    fields
}

/// Comment carrying the original completion and archival dates, if any.
pub fn metadata_comment(task: &FlatTask) -> Option<String> {
    let mut lines = Vec::new();
    if !task.completed.trim().is_empty() {
        lines.push(format!("Original Ferdigstilt: {}", task.completed.trim()));
    }
    if !task.archived.trim().is_empty() {
        lines.push(format!("Original Arkiveringsdato: {}", task.archived.trim()));
    }
    if lines.is_empty() {
        return None;
    }
    Some(format!("Migration metadata:\n{}", lines.join("\n")))
}
