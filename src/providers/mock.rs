//! In-memory stand-ins for the Notion and Jira APIs, recording every call.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::{JiraApi, NotionApi, QueryTarget};
use crate::error::{Error, Result};
use crate::model::jira::{
    BoardIssue, CreatedIssue, FieldInfo, Priority, Transition, TransitionTarget,
};
use crate::model::notion::{Block, Comment, Database, DataSourceRef, Page, PaginatedList};

/// Split `chunks` into linked pages with cursors `cursor-1`, `cursor-2`, ...
pub fn pages<T>(chunks: Vec<Vec<T>>) -> Vec<PaginatedList<T>> {
    let total = chunks.len();
    chunks
        .into_iter()
        .enumerate()
        .map(|(i, results)| {
            let has_more = i + 1 < total;
            PaginatedList {
                results,
                has_more,
                next_cursor: has_more.then(|| format!("cursor-{}", i + 1)),
            }
        })
        .collect()
}

/// Serve the page a cursor points at: no cursor is the first page.
fn serve<T: Clone>(list: Option<&Vec<PaginatedList<T>>>, cursor: Option<&str>) -> PaginatedList<T> {
    let Some(list) = list else {
        return PaginatedList {
            results: Vec::new(),
            has_more: false,
            next_cursor: None,
        };
    };
    let index = match cursor {
        None => 0,
        Some(c) => list
            .iter()
            .position(|p| p.next_cursor.as_deref() == Some(c))
            .map(|i| i + 1)
            .unwrap_or(list.len()),
    };
    list.get(index).cloned().unwrap_or(PaginatedList {
        results: Vec::new(),
        has_more: false,
        next_cursor: None,
    })
}

pub fn page(id: &str, properties: Value) -> Page {
    serde_json::from_value(json!({ "id": id, "properties": properties })).unwrap()
}

pub fn block(id: &str, kind: &str, text: &str, has_children: bool) -> Block {
    serde_json::from_value(json!({
        "id": id,
        "type": kind,
        "has_children": has_children,
        kind: { "rich_text": [{ "plain_text": text }] },
    }))
    .unwrap()
}

pub fn todo(id: &str, text: &str, checked: bool) -> Block {
    serde_json::from_value(json!({
        "id": id,
        "type": "to_do",
        "has_children": false,
        "to_do": { "rich_text": [{ "plain_text": text }], "checked": checked },
    }))
    .unwrap()
}

pub fn comment(created: Option<&str>, text: &str) -> Comment {
    serde_json::from_value(json!({
        "created_time": created,
        "rich_text": [{ "plain_text": text }],
    }))
    .unwrap()
}

#[derive(Default)]
pub struct MockNotion {
    pub queries: HashMap<String, Vec<PaginatedList<Page>>>,
    pub failing_queries: HashSet<String>,
    /// Block or page ids whose children/comments/descriptor requests fail.
    pub failing_children: HashSet<String>,
    pub failing_comments: HashSet<String>,
    pub failing_databases: HashSet<String>,
    pub databases: HashMap<String, Database>,
    pub children: HashMap<String, Vec<PaginatedList<Block>>>,
    pub comments: HashMap<String, Vec<PaginatedList<Comment>>>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockNotion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, target: QueryTarget, list: Vec<PaginatedList<Page>>) -> Self {
        self.queries.insert(target.path(), list);
        self
    }

    pub fn with_failing_query(mut self, target: QueryTarget) -> Self {
        self.failing_queries.insert(target.path());
        self
    }

    pub fn with_failing_children(mut self, block_id: &str) -> Self {
        self.failing_children.insert(block_id.to_string());
        self
    }

    pub fn with_failing_comments(mut self, block_id: &str) -> Self {
        self.failing_comments.insert(block_id.to_string());
        self
    }

    pub fn with_failing_database(mut self, database_id: &str) -> Self {
        self.failing_databases.insert(database_id.to_string());
        self
    }

    pub fn with_data_sources(mut self, database_id: &str, ids: &[&str]) -> Self {
        let data_sources = ids
            .iter()
            .map(|id| DataSourceRef {
                id: Some(id.to_string()),
            })
            .collect();
        self.databases
            .insert(database_id.to_string(), Database { data_sources });
        self
    }

    pub fn with_children(mut self, block_id: &str, blocks: Vec<Block>) -> Self {
        self.children
            .insert(block_id.to_string(), pages(vec![blocks]));
        self
    }

    pub fn with_paged_children(mut self, block_id: &str, list: Vec<PaginatedList<Block>>) -> Self {
        self.children.insert(block_id.to_string(), list);
        self
    }

    pub fn with_comments(mut self, block_id: &str, list: Vec<PaginatedList<Comment>>) -> Self {
        self.comments.insert(block_id.to_string(), list);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl NotionApi for MockNotion {
    async fn query(
        &self,
        target: &QueryTarget,
        cursor: Option<String>,
    ) -> Result<PaginatedList<Page>> {
        let path = target.path();
        self.log(format!("query {path} {cursor:?}"));
        if self.failing_queries.contains(&path) {
            return Err(Error::http("POST", path, 400, "invalid_request_url"));
        }
        Ok(serve(self.queries.get(&path), cursor.as_deref()))
    }

    async fn get_database(&self, database_id: &str) -> Result<Database> {
        self.log(format!("database {database_id}"));
        if self.failing_databases.contains(database_id) {
            return Err(Error::http(
                "GET",
                format!("/databases/{database_id}"),
                404,
                "object_not_found",
            ));
        }
        Ok(self.databases.get(database_id).cloned().unwrap_or_default())
    }

    async fn block_children(
        &self,
        block_id: &str,
        cursor: Option<String>,
    ) -> Result<PaginatedList<Block>> {
        self.log(format!("children {block_id} {cursor:?}"));
        if self.failing_children.contains(block_id) {
            return Err(Error::http(
                "GET",
                format!("/blocks/{block_id}/children"),
                502,
                "bad gateway",
            ));
        }
        Ok(serve(self.children.get(block_id), cursor.as_deref()))
    }

    async fn comments(
        &self,
        block_id: &str,
        cursor: Option<String>,
    ) -> Result<PaginatedList<Comment>> {
        self.log(format!("comments {block_id} {cursor:?}"));
        if self.failing_comments.contains(block_id) {
            return Err(Error::http("GET", "/comments", 403, "restricted_resource"));
        }
        Ok(serve(self.comments.get(block_id), cursor.as_deref()))
    }
}

pub fn priority(id: &str, name: &str) -> Priority {
    Priority {
        id: id.to_string(),
        name: Some(name.to_string()),
    }
}

pub fn transition(id: &str, to_status: &str) -> Transition {
    Transition {
        id: id.to_string(),
        name: Some(format!("to {to_status}")),
        to: Some(TransitionTarget {
            id: Some(to_status.to_string()),
            name: None,
        }),
    }
}

/// Records Jira writes. Operations named in `failing` return HTTP 400.
pub struct MockJira {
    pub priorities: Vec<Priority>,
    pub fields: Vec<FieldInfo>,
    pub board: Vec<BoardIssue>,
    pub transitions: Vec<Transition>,
    pub failing: HashSet<&'static str>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub payloads: Arc<Mutex<Vec<Value>>>,
    pub comments: Arc<Mutex<Vec<(String, String)>>>,
    next_key: Mutex<u32>,
}

impl MockJira {
    pub fn new() -> Self {
        Self {
            priorities: vec![
                priority("1", "Kritisk"),
                priority("2", "Alvorlig"),
                priority("4", "Mindre alvorlig"),
                priority("5", "Uviktig"),
            ],
            fields: vec![
                FieldInfo {
                    id: Some("customfield_100".into()),
                    name: Some("Oppgavekategori".into()),
                },
                FieldInfo {
                    id: Some("customfield_200".into()),
                    name: Some("Category of work".into()),
                },
                FieldInfo {
                    id: Some("summary".into()),
                    name: Some("Summary".into()),
                },
            ],
            board: vec![BoardIssue {
                key: "PROJ-ANCHOR".into(),
            }],
            transitions: vec![
                transition("11", "13383"),
                transition("21", "13381"),
                transition("31", "13384"),
                transition("41", "13382"),
            ],
            failing: HashSet::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
            payloads: Arc::new(Mutex::new(Vec::new())),
            comments: Arc::new(Mutex::new(Vec::new())),
            next_key: Mutex::new(0),
        }
    }

    pub fn with_failure(mut self, op: &'static str) -> Self {
        self.failing.insert(op);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn comments(&self) -> Vec<(String, String)> {
        self.comments.lock().unwrap().clone()
    }

    pub fn payloads(&self) -> Vec<Value> {
        self.payloads.lock().unwrap().clone()
    }

    fn record(&self, op: &'static str, call: String) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing.contains(op) {
            return Err(Error::http("MOCK", op, 400, format!("{op} rejected")));
        }
        Ok(())
    }
}

#[async_trait]
impl JiraApi for MockJira {
    async fn create_issue(&self, payload: &Value) -> Result<CreatedIssue> {
        let summary = payload["fields"]["summary"].as_str().unwrap_or_default();
        self.record("create", format!("create {summary}"))?;
        self.payloads.lock().unwrap().push(payload.clone());
        let mut next = self.next_key.lock().unwrap();
        *next += 1;
        Ok(CreatedIssue {
            key: format!("PROJ-{}", *next),
        })
    }

    async fn set_issue_fields(&self, key: &str, fields: &Map<String, Value>) -> Result<()> {
        let mut names: Vec<&String> = fields.keys().collect();
        names.sort();
        self.record("set_fields", format!("set_fields {key} {names:?}"))
    }

    async fn board_issues(&self, max_results: u32) -> Result<Vec<BoardIssue>> {
        self.record("board", format!("board {max_results}"))?;
        Ok(self.board.clone())
    }

    async fn move_to_board(&self, key: &str, rank_before: Option<&str>) -> Result<()> {
        self.record("move", format!("move {key} before={rank_before:?}"))
    }

    async fn transitions(&self, key: &str) -> Result<Vec<Transition>> {
        self.record("transitions", format!("transitions {key}"))?;
        Ok(self.transitions.clone())
    }

    async fn transition(&self, key: &str, transition_id: &str) -> Result<()> {
        self.record("transition", format!("transition {key} {transition_id}"))
    }

    async fn add_comment(&self, key: &str, text: &str) -> Result<()> {
        self.record("comment", format!("comment {key}"))?;
        self.comments
            .lock()
            .unwrap()
            .push((key.to_string(), text.to_string()));
        Ok(())
    }

    async fn priorities(&self) -> Result<Vec<Priority>> {
        self.record("priorities", "priorities".to_string())?;
        Ok(self.priorities.clone())
    }

    async fn fields(&self) -> Result<Vec<FieldInfo>> {
        self.record("fields", "fields".to_string())?;
        Ok(self.fields.clone())
    }
}
