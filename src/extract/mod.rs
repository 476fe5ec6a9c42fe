pub mod blocks;
pub mod normalize;

use std::fmt;
use std::future::Future;

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::model::flat_task::FlatTask;
use crate::model::notion::{plain_text, Block, Page, PaginatedList};
use crate::providers::{NotionApi, QueryTarget};
use blocks::{indent, is_comments_sentinel, is_description_label, render_block};

/// Nesting below this depth is not fetched.
pub const MAX_BLOCK_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    DatabaseQuery,
    DataSourceQuery,
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionMode::DatabaseQuery => write!(f, "database_query"),
            ExtractionMode::DataSourceQuery => write!(f, "data_source_query"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractionMeta {
    pub mode: ExtractionMode,
    pub count: usize,
    pub data_sources: Vec<String>,
}

/// Follow `next_cursor` until the server reports no more pages.
///
/// `has_more` without a cursor is a protocol violation and stops immediately.
pub async fn paginate<T, F, Fut>(label: &str, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<PaginatedList<T>>>,
{
    let mut out = Vec::new();
    let mut cursor = None;
    loop {
        let page = fetch(cursor.take()).await?;
        out.extend(page.results);
        if !page.has_more {
            return Ok(out);
        }
        match page.next_cursor.filter(|c| !c.is_empty()) {
            Some(next) => cursor = Some(next),
            None => {
                return Err(Error::Pagination {
                    url: label.to_string(),
                })
            }
        }
    }
}

pub struct Extractor<'a> {
    api: &'a dyn NotionApi,
}

impl<'a> Extractor<'a> {
    pub fn new(api: &'a dyn NotionApi) -> Self {
        Self { api }
    }

    /// Query the database directly, falling back to its data sources.
    pub async fn extract_all_tasks(&self, database_id: &str) -> Result<(Vec<Page>, ExtractionMeta)> {
        let first_error = match self
            .query_all(&QueryTarget::Database(database_id.to_string()))
            .await
        {
            Ok(pages) => {
                let meta = ExtractionMeta {
                    mode: ExtractionMode::DatabaseQuery,
                    count: pages.len(),
                    data_sources: Vec::new(),
                };
                return Ok((pages, meta));
            }
            Err(e) => e.to_string(),
        };
        warn!(database_id, error = %first_error, "database query failed, trying data sources");

        let database = self.api.get_database(database_id).await?;
        if database.data_sources.is_empty() {
            return Err(Error::NoDataSources { first_error });
        }

        let data_sources: Vec<String> = database
            .data_sources
            .into_iter()
            .filter_map(|ds| ds.id)
            .collect();

        let mut all = Vec::new();
        for id in &data_sources {
            let pages = self
                .query_all(&QueryTarget::DataSource(id.clone()))
                .await?;
            info!(data_source = %id, count = pages.len(), "queried data source");
            all.extend(pages);
        }

        let meta = ExtractionMeta {
            mode: ExtractionMode::DataSourceQuery,
            count: all.len(),
            data_sources,
        };
        Ok((all, meta))
    }

    async fn query_all(&self, target: &QueryTarget) -> Result<Vec<Page>> {
        let api = self.api;
        paginate(&target.path(), move |cursor| api.query(target, cursor)).await
    }

    async fn block_children(&self, block_id: &str) -> Result<Vec<Block>> {
        let api = self.api;
        let label = format!("/blocks/{block_id}/children");
        paginate(&label, move |cursor| api.block_children(block_id, cursor)).await
    }

    /// Comments rendered as `<created_time>: <text>`, one per line.
    pub async fn fetch_comments(&self, page_id: &str) -> Result<String> {
        let api = self.api;
        let comments = paginate("/comments", move |cursor| api.comments(page_id, cursor)).await?;

        let lines: Vec<String> = comments
            .iter()
            .filter_map(|c| {
                let text = plain_text(&c.rich_text);
                if text.is_empty() {
                    return None;
                }
                let created = c.created_time.as_deref().unwrap_or_default().trim();
                Some(if created.is_empty() {
                    text
                } else {
                    format!("{created}: {text}")
                })
            })
            .collect();

        Ok(lines.join("\n").trim().to_string())
    }

    /// Everything after the first top-level "Beskrivelse" block, flattened.
    pub async fn extract_description(&self, page_id: &str) -> Result<String> {
        let top = self.block_children(page_id).await?;
        let Some(idx) = top.iter().position(is_description_label) else {
            return Ok(String::new());
        };

        let after: Vec<Block> = top.into_iter().skip(idx + 1).collect();
        let lines = self.flatten_blocks(after).await?;
        Ok(lines.join("\n").trim().to_string())
    }

    /// Depth-first walk over `blocks` and their children, one line per block.
    ///
    /// Stops at the first comments-section line.
    pub async fn flatten_blocks(&self, blocks: Vec<Block>) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        let mut stack = vec![(blocks.into_iter(), 0usize)];

        while let Some((iter, depth)) = stack.last_mut() {
            let depth = *depth;
            let Some(block) = iter.next() else {
                stack.pop();
                continue;
            };

            let text = render_block(&block);
            if !text.is_empty() {
                if is_comments_sentinel(&text) {
                    break;
                }
                lines.push(indent(depth, &text));
            }

            if !block.has_children || block.id.is_empty() {
                continue;
            }
            if depth + 1 >= MAX_BLOCK_DEPTH {
                warn!(block_id = %block.id, depth, "block nesting too deep, skipping children");
                continue;
            }
            let children = self.block_children(&block.id).await?;
            stack.push((children.into_iter(), depth + 1));
        }

        Ok(lines)
    }

    /// Fetch comments and description for each page and flatten it.
    pub async fn normalize_tasks(&self, pages: &[Page]) -> Result<Vec<FlatTask>> {
        let mut out = Vec::with_capacity(pages.len());
        for (i, page) in pages.iter().enumerate() {
            let (comments, description) = if page.id.is_empty() {
                (String::new(), String::new())
            } else {
                (
                    self.fetch_comments(&page.id).await?,
                    self.extract_description(&page.id).await?,
                )
            };
            let task = normalize::normalize_page(page, &description, &comments);
            info!(index = i + 1, total = pages.len(), title = %task.title, "normalized task");
            out.push(task);
        }
        Ok(out)
    }
}
