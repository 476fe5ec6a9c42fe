use thiserror::Error;

/// Errors raised while extracting from Notion or writing to Jira.
#[derive(Error, Debug)]
pub enum Error {
    /// Server claimed more pages but did not hand out a cursor.
    #[error("Pagination error for {url}: has_more=true but next_cursor is missing")]
    Pagination { url: String },

    /// Non-success HTTP response from either API.
    #[error("{method} {url} failed with status {status}: {body}")]
    Http {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Task missing Title")]
    MissingTitle,

    #[error("Could not resolve Jira field IDs for: {0:?}")]
    UnresolvedFields(Vec<String>),

    #[error(
        "Database query failed, and no data_sources were found on the database object.\n\nOriginal database query error:\n{first_error}"
    )]
    NoDataSources { first_error: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn http(
        method: impl Into<String>,
        url: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        Error::Http {
            method: method.into(),
            url: url.into(),
            status,
            body: body.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
