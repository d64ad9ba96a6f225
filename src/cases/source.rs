use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use super::types::Correspondence;
use crate::config::ServiceConfig;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid cookie header: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

/// Where case data comes from. Implemented over HTTP and over local files.
pub trait CaseSource {
    /// Case behind a task; `None` for tasks without a case (signals)
    fn case_id_for_task(&self, task_id: &str) -> Result<Option<String>, FetchError>;

    /// All correspondence on a case, in whatever order the source keeps it
    fn correspondences(&self, case_id: &str) -> Result<Vec<Correspondence>, FetchError>;
}

static TASK_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)/tasks/([a-f0-9-]{36})").unwrap_or_else(|_| unreachable!())
});

/// Extract the task UUID from a case tool URL like `.../wims/tasks/<uuid>`
pub fn task_id_from_url(url: &str) -> Option<&str> {
    TASK_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Case id from a task payload, which may or may not be wrapped in `task`
pub fn extract_case_id(payload: &Value) -> Option<String> {
    let task = payload
        .get("task")
        .filter(|t| t.is_object())
        .unwrap_or(payload);

    match task.pointer("/context/entities/case/id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Correspondence list from a messages payload.
///
/// Accepts `{"correspondences": [...]}` or a bare array. Entries that are not
/// objects become empty records, which the reducer drops.
pub fn parse_correspondences(payload: &Value) -> Vec<Correspondence> {
    let items = match payload {
        Value::Array(items) => Some(items),
        other => other.get("correspondences").and_then(Value::as_array),
    };

    items
        .map(|items| {
            items
                .iter()
                .map(|item| Correspondence::deserialize(item).unwrap_or_default())
                .collect()
        })
        .unwrap_or_default()
}

/// Blocking client for the case tool's task and message endpoints
pub struct WimsClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl WimsClient {
    pub fn new(config: &ServiceConfig) -> Result<Self, FetchError> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(cookie) = config.cookie.as_deref() {
            headers.insert(
                reqwest::header::COOKIE,
                reqwest::header::HeaderValue::from_str(cookie)?,
            );
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn get_json(&self, url: String) -> Result<Value, FetchError> {
        tracing::debug!(%url, "GET");
        let response = self.client.get(&url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        Ok(response.json()?)
    }
}

impl CaseSource for WimsClient {
    fn case_id_for_task(&self, task_id: &str) -> Result<Option<String>, FetchError> {
        let url = format!(
            "{}/wims/task/{}",
            self.base_url,
            urlencoding::encode(task_id)
        );
        Ok(extract_case_id(&self.get_json(url)?))
    }

    fn correspondences(&self, case_id: &str) -> Result<Vec<Correspondence>, FetchError> {
        let url = format!(
            "{}/wims/case/{}/messages",
            self.base_url,
            urlencoding::encode(case_id)
        );
        Ok(parse_correspondences(&self.get_json(url)?))
    }
}

/// A saved messages payload on disk. The case id is the file stem.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn case_id(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

impl CaseSource for FileSource {
    fn case_id_for_task(&self, _task_id: &str) -> Result<Option<String>, FetchError> {
        Ok(Some(self.case_id()))
    }

    fn correspondences(&self, _case_id: &str) -> Result<Vec<Correspondence>, FetchError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| FetchError::Io {
            path: self.path.clone(),
            source,
        })?;
        let payload: Value = serde_json::from_str(&content)?;
        Ok(parse_correspondences(&payload))
    }
}
