use serde::{Deserialize, Deserializer, Serialize};

/// JSON keys of a normalized task, in file order.
#[cfg(test)]
pub const FIELD_NAMES: [&str; 11] = [
    "Title",
    "Status",
    "Prioritet",
    "Estimater",
    "Tilordnet",
    "Tags",
    "Ferdigstilt",
    "Arkiveringsdato",
    "Kodebase / type",
    "Description",
    "Comments",
];

/// One Notion task flattened to plain strings. Absent values are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredTask")]
pub struct FlatTask {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Prioritet")]
    pub priority: String,
    #[serde(rename = "Estimater")]
    pub estimate: String,
    #[serde(rename = "Tilordnet")]
    pub assignees: String,
    #[serde(rename = "Tags")]
    pub tags: String,
    #[serde(rename = "Ferdigstilt")]
    pub completed: String,
    #[serde(rename = "Arkiveringsdato")]
    pub archived: String,
    #[serde(rename = "Kodebase / type")]
    pub codebase: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Comments")]
    pub comments: String,
}

/// On-disk shape of a task. Older batch files spell the codebase key without
/// spaces; when both spellings are present the spaced one wins.
#[derive(Deserialize, Default)]
#[serde(default)]
struct StoredTask {
    #[serde(rename = "Title", deserialize_with = "nullable")]
    title: String,
    #[serde(rename = "Status", deserialize_with = "nullable")]
    status: String,
    #[serde(rename = "Prioritet", deserialize_with = "nullable")]
    priority: String,
    #[serde(rename = "Estimater", deserialize_with = "nullable")]
    estimate: String,
    #[serde(rename = "Tilordnet", deserialize_with = "nullable")]
    assignees: String,
    #[serde(rename = "Tags", deserialize_with = "nullable")]
    tags: String,
    #[serde(rename = "Ferdigstilt", deserialize_with = "nullable")]
    completed: String,
    #[serde(rename = "Arkiveringsdato", deserialize_with = "nullable")]
    archived: String,
    #[serde(rename = "Kodebase / type", deserialize_with = "nullable_key")]
    codebase: Option<String>,
    #[serde(rename = "Kodebase/type", deserialize_with = "nullable_key")]
    codebase_compact: Option<String>,
    #[serde(rename = "Description", deserialize_with = "nullable")]
    description: String,
    #[serde(rename = "Comments", deserialize_with = "nullable")]
    comments: String,
}

impl From<StoredTask> for FlatTask {
    fn from(stored: StoredTask) -> Self {
        Self {
            title: stored.title,
            status: stored.status,
            priority: stored.priority,
            estimate: stored.estimate,
            assignees: stored.assignees,
            tags: stored.tags,
            completed: stored.completed,
            archived: stored.archived,
            codebase: stored
                .codebase
                .or(stored.codebase_compact)
                .unwrap_or_default(),
            description: stored.description,
            comments: stored.comments,
        }
    }
}

fn nullable<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// `Some` when the key is present, even if its value is null.
fn nullable_key<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    nullable(deserializer).map(Some)
}
