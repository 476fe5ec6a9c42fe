use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::Error;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub notion: NotionConfig,
    pub jira: JiraConfig,
    pub migration: MigrationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotionConfig {
    pub base_url: String,
    pub token: String,
    pub database_id: String,
    pub version: String,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.notion.com/v1".into(),
            token: String::new(),
            database_id: String::new(),
            version: "2025-09-03".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JiraConfig {
    pub base_url: String,
    pub email: String,
    pub api_token: String,
    pub project_key: String,
    pub issue_type: String,
    pub board_id: u64,
    pub rank_custom_field_id: u64,
    pub statuses: StatusIds,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            email: String::new(),
            api_token: String::new(),
            project_key: String::new(),
            issue_type: "Oppgave".into(),
            board_id: 527,
            rank_custom_field_id: 10201,
            statuses: StatusIds::default(),
        }
    }
}

/// Workflow status IDs from the target board configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StatusIds {
    pub backlog: String,
    pub ready: String,
    pub in_progress: String,
    pub qa: String,
    pub done: String,
}

impl Default for StatusIds {
    fn default() -> Self {
        Self {
            backlog: "13380".into(),
            ready: "13383".into(),
            in_progress: "13381".into(),
            qa: "13384".into(),
            done: "13382".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Archived tasks are only migrated when archived strictly after this date.
    pub archive_cutoff: NaiveDate,
    pub comment_delay_ms: u64,
    pub category_field: String,
    pub category_value: String,
    pub work_category_field: String,
    pub work_category_value: String,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            archive_cutoff: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default(),
            comment_delay_ms: 100,
            category_field: "Oppgavekategori".into(),
            category_value: "Markedsinitiativ".into(),
            work_category_field: "Category of work".into(),
            work_category_value: "Strategic intent".into(),
        }
    }
}

impl AppConfig {
    /// Overlay credentials and identifiers from the environment (or any lookup).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let set = |target: &mut String, key: &str| {
            if let Some(v) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *target = v.trim().to_string();
            }
        };
        set(&mut self.notion.token, "NOTION_TOKEN");
        set(&mut self.notion.database_id, "NOTION_DATABASE_ID");
        set(&mut self.notion.version, "NOTION_VERSION");
        set(&mut self.jira.base_url, "JIRA_BASE_URL");
        set(&mut self.jira.email, "JIRA_EMAIL");
        set(&mut self.jira.api_token, "JIRA_API_TOKEN");
        set(&mut self.jira.project_key, "JIRA_PROJECT_KEY");
        self.jira.base_url = self.jira.base_url.trim_end_matches('/').to_string();
    }

    pub fn validate_notion(&self) -> crate::error::Result<()> {
        require("NOTION_TOKEN", &self.notion.token)?;
        require("NOTION_DATABASE_ID", &self.notion.database_id)
    }

    pub fn validate_jira(&self) -> crate::error::Result<()> {
        require("JIRA_BASE_URL", &self.jira.base_url)?;
        require("JIRA_EMAIL", &self.jira.email)?;
        require("JIRA_API_TOKEN", &self.jira.api_token)?;
        require("JIRA_PROJECT_KEY", &self.jira.project_key)
    }
}

fn require(name: &str, value: &str) -> crate::error::Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Config(format!("Missing required setting: {name}")));
    }
    Ok(())
}

pub fn config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".notion-jira")
        .join("config.toml")
}

/// Load the config file (if any) and apply environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);
    let mut config = if path.exists() {
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?
    } else {
        AppConfig::default()
    };
    config.apply_overrides(|key| std::env::var(key).ok());
    Ok(config)
}
