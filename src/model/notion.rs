use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One page of a cursor-paginated Notion list response.
#[derive(Debug, Clone, Deserialize)]
pub struct PaginatedList<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub properties: BTreeMap<String, Property>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Property {
    Title {
        #[serde(default)]
        title: Vec<RichText>,
    },
    RichText {
        #[serde(default)]
        rich_text: Vec<RichText>,
    },
    Select {
        select: Option<SelectOption>,
    },
    Status {
        status: Option<SelectOption>,
    },
    MultiSelect {
        #[serde(default)]
        multi_select: Vec<SelectOption>,
    },
    People {
        #[serde(default)]
        people: Vec<Person>,
    },
    Date {
        date: Option<DateRange>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectOption {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Person {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateRange {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

/// A content block. The type-specific payload lives under a key named after the type.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub has_children: bool,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockContent {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub checked: bool,
}

impl Block {
    pub fn content(&self) -> BlockContent {
        self.payload
            .get(&self.kind)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub rich_text: Vec<RichText>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Database {
    #[serde(default)]
    pub data_sources: Vec<DataSourceRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataSourceRef {
    #[serde(default)]
    pub id: Option<String>,
}

/// Concatenated `plain_text` of a rich text array, trimmed.
pub fn plain_text(rich_text: &[RichText]) -> String {
    rich_text
        .iter()
        .filter_map(|rt| rt.plain_text.as_deref())
        .collect::<String>()
        .trim()
        .to_string()
}
