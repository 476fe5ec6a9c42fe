use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedIssue {
    pub key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoardIssue {
    pub key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BoardIssuesResponse {
    #[serde(default)]
    pub issues: Vec<BoardIssue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Transition {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub to: Option<TransitionTarget>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransitionTarget {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TransitionsResponse {
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Priority {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}
