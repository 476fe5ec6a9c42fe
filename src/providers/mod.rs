pub mod jira;
pub mod notion;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::model::jira::{BoardIssue, CreatedIssue, FieldInfo, Priority, Transition};
use crate::model::notion::{Block, Comment, Database, Page, PaginatedList};

/// Where a Notion query is sent: a database or one of its data sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryTarget {
    Database(String),
    DataSource(String),
}

impl QueryTarget {
    pub fn path(&self) -> String {
        match self {
            QueryTarget::Database(id) => format!("/databases/{id}/query"),
            QueryTarget::DataSource(id) => format!("/data_sources/{id}/query"),
        }
    }
}

/// Read-only Notion endpoints used by the extractor. Each call returns one page.
#[async_trait]
pub trait NotionApi: Send + Sync {
    async fn query(
        &self,
        target: &QueryTarget,
        cursor: Option<String>,
    ) -> Result<PaginatedList<Page>>;
    async fn get_database(&self, database_id: &str) -> Result<Database>;
    async fn block_children(
        &self,
        block_id: &str,
        cursor: Option<String>,
    ) -> Result<PaginatedList<Block>>;
    async fn comments(&self, block_id: &str, cursor: Option<String>)
        -> Result<PaginatedList<Comment>>;
}

/// Jira endpoints used by the migrator.
#[async_trait]
pub trait JiraApi: Send + Sync {
    async fn create_issue(&self, payload: &Value) -> Result<CreatedIssue>;
    async fn set_issue_fields(&self, key: &str, fields: &Map<String, Value>) -> Result<()>;
    async fn board_issues(&self, max_results: u32) -> Result<Vec<BoardIssue>>;
    async fn move_to_board(&self, key: &str, rank_before: Option<&str>) -> Result<()>;
    async fn transitions(&self, key: &str) -> Result<Vec<Transition>>;
    async fn transition(&self, key: &str, transition_id: &str) -> Result<()>;
    async fn add_comment(&self, key: &str, text: &str) -> Result<()>;
    async fn priorities(&self) -> Result<Vec<Priority>>;
    async fn fields(&self) -> Result<Vec<FieldInfo>>;
}

/// Turn a non-2xx response into `Error::Http`, keeping the body for diagnosis.
pub(crate) async fn ensure_success(
    method: &reqwest::Method,
    url: &str,
    resp: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(Error::http(method.as_str(), url, status.as_u16(), body))
}

#[cfg(test)]
pub mod mock;
