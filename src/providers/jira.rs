use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::{ensure_success, JiraApi};
use crate::config::JiraConfig;
use crate::error::Result;
use crate::model::jira::{
    BoardIssue, BoardIssuesResponse, CreatedIssue, FieldInfo, Priority, Transition,
    TransitionsResponse,
};
use crate::util::adf::adf_doc;

pub struct JiraClient {
    base_url: String,
    auth_header: String,
    board_id: u64,
    rank_custom_field_id: u64,
    client: reqwest::Client,
}

impl JiraClient {
    pub fn new(config: &JiraConfig) -> Result<Self> {
        let creds = format!("{}:{}", config.email, config.api_token);
        let encoded = base64::engine::general_purpose::STANDARD.encode(creds);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_header: format!("Basic {encoded}"),
            board_id: config.board_id,
            rank_custom_field_id: config.rank_custom_field_id,
            client,
        })
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "jira request");

        let mut req = self
            .client
            .request(method.clone(), &url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json");
        if !params.is_empty() {
            req = req.query(params);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        ensure_success(&method, &url, req.send().await?).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        Ok(self.send(Method::GET, path, params, None).await?.json().await?)
    }

    fn issue_path(key: &str) -> String {
        format!("/rest/api/3/issue/{}", urlencoding::encode(key))
    }
}

#[async_trait]
impl JiraApi for JiraClient {
    async fn create_issue(&self, payload: &Value) -> Result<CreatedIssue> {
        let resp = self
            .send(Method::POST, "/rest/api/3/issue", &[], Some(payload))
            .await?;
        Ok(resp.json().await?)
    }

    async fn set_issue_fields(&self, key: &str, fields: &Map<String, Value>) -> Result<()> {
        let body = json!({ "fields": fields });
        self.send(Method::PUT, &Self::issue_path(key), &[], Some(&body))
            .await?;
        Ok(())
    }

    async fn board_issues(&self, max_results: u32) -> Result<Vec<BoardIssue>> {
        let path = format!("/rest/agile/1.0/board/{}/issue", self.board_id);
        let resp: BoardIssuesResponse = self
            .get_json(&path, &[("maxResults", max_results.to_string())])
            .await?;
        Ok(resp.issues)
    }

    async fn move_to_board(&self, key: &str, rank_before: Option<&str>) -> Result<()> {
        let mut body = json!({
            "issues": [key],
            "rankCustomFieldId": self.rank_custom_field_id,
        });
        if let Some(anchor) = rank_before {
            body["rankBeforeIssue"] = Value::String(anchor.to_string());
        }
        // 204 on success, 207 on partial success.
        let path = format!("/rest/agile/1.0/board/{}/issue", self.board_id);
        self.send(Method::POST, &path, &[], Some(&body)).await?;
        Ok(())
    }

    async fn transitions(&self, key: &str) -> Result<Vec<Transition>> {
        let path = format!("{}/transitions", Self::issue_path(key));
        let resp: TransitionsResponse = self.get_json(&path, &[]).await?;
        Ok(resp.transitions)
    }

    async fn transition(&self, key: &str, transition_id: &str) -> Result<()> {
        let path = format!("{}/transitions", Self::issue_path(key));
        let body = json!({ "transition": { "id": transition_id } });
        self.send(Method::POST, &path, &[], Some(&body)).await?;
        Ok(())
    }

    async fn add_comment(&self, key: &str, text: &str) -> Result<()> {
        let path = format!("{}/comment", Self::issue_path(key));
        let body = json!({ "body": adf_doc(text) });
        self.send(Method::POST, &path, &[], Some(&body)).await?;
        Ok(())
    }

    async fn priorities(&self) -> Result<Vec<Priority>> {
        self.get_json("/rest/api/3/priority", &[]).await
    }

    async fn fields(&self) -> Result<Vec<FieldInfo>> {
        self.get_json("/rest/api/3/field", &[]).await
    }
}
