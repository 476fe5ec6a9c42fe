use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use super::{ensure_success, NotionApi, QueryTarget};
use crate::config::NotionConfig;
use crate::error::Result;
use crate::model::notion::{Block, Comment, Database, Page, PaginatedList};

const PAGE_SIZE: u32 = 100;

pub struct NotionClient {
    base_url: String,
    token: String,
    version: String,
    client: reqwest::Client,
}

impl NotionClient {
    pub fn new(config: &NotionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            version: config.version.clone(),
            client,
        })
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "notion request");

        let mut req = self
            .client
            .request(method.clone(), &url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Notion-Version", &self.version)
            .header("Accept", "application/json");
        if !params.is_empty() {
            req = req.query(params);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = ensure_success(&method, &url, req.send().await?).await?;
        Ok(resp.json().await?)
    }

    fn list_params(cursor: Option<String>) -> Vec<(&'static str, String)> {
        let mut params = vec![("page_size", PAGE_SIZE.to_string())];
        if let Some(cursor) = cursor {
            params.push(("start_cursor", cursor));
        }
        params
    }
}

#[async_trait]
impl NotionApi for NotionClient {
    async fn query(
        &self,
        target: &QueryTarget,
        cursor: Option<String>,
    ) -> Result<PaginatedList<Page>> {
        let mut body = json!({ "page_size": PAGE_SIZE });
        if let Some(cursor) = cursor {
            body["start_cursor"] = Value::String(cursor);
        }
        self.request(Method::POST, &target.path(), &[], Some(&body))
            .await
    }

    async fn get_database(&self, database_id: &str) -> Result<Database> {
        let path = format!("/databases/{}", urlencoding::encode(database_id));
        self.request(Method::GET, &path, &[], None).await
    }

    async fn block_children(
        &self,
        block_id: &str,
        cursor: Option<String>,
    ) -> Result<PaginatedList<Block>> {
        let path = format!("/blocks/{}/children", urlencoding::encode(block_id));
        self.request(Method::GET, &path, &Self::list_params(cursor), None)
            .await
    }

    async fn comments(
        &self,
        block_id: &str,
        cursor: Option<String>,
    ) -> Result<PaginatedList<Comment>> {
        let mut params = vec![("block_id", block_id.to_string())];
        if let Some(cursor) = cursor {
            params.push(("start_cursor", cursor));
        }
        self.request(Method::GET, "/comments", &params, None).await
    }
}
