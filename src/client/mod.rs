//! Lightweight HTTP client for the task API.
//!
//! The terminal UI (`taskd ui`) and one-shot commands (`taskd tasks ...`,
//! `taskd status`) use this to call the running server.

use anyhow::{bail, Context as _, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

/// Per-request timeout for client-to-server calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// One task as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub task: String,
    pub completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// A short-lived HTTP client for client-to-server calls.
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a client targeting the API at the given base URL
    /// (e.g. `http://127.0.0.1:5000/api`).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { base_url, http })
    }

    /// Fetch all tasks, newest first.
    pub async fn list(&self) -> Result<Vec<Task>> {
        let resp = self
            .http
            .get(format!("{}/tasks", self.base_url))
            .send()
            .await
            .context("task list request failed")?;
        Self::expect_success(resp)
            .await?
            .json()
            .await
            .context("invalid task list response")
    }

    /// Create a task and return the server-assigned record.
    pub async fn create(&self, text: &str) -> Result<Task> {
        let resp = self
            .http
            .post(format!("{}/tasks", self.base_url))
            .json(&json!({ "task": text }))
            .send()
            .await
            .context("task create request failed")?;
        Self::expect_success(resp)
            .await?
            .json()
            .await
            .context("invalid task create response")
    }

    /// Set a task's completion state and return the updated record.
    pub async fn set_completed(&self, id: &str, completed: bool) -> Result<Task> {
        let resp = self
            .http
            .put(format!("{}/tasks/{id}", self.base_url))
            .json(&json!({ "completed": completed }))
            .send()
            .await
            .context("task update request failed")?;
        Self::expect_success(resp)
            .await?
            .json()
            .await
            .context("invalid task update response")
    }

    /// Delete a task.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let resp = self
            .http
            .delete(format!("{}/tasks/{id}", self.base_url))
            .send()
            .await
            .context("task delete request failed")?;
        Self::expect_success(resp).await?;
        Ok(())
    }

    /// Fetch the server health summary.
    pub async fn health(&self) -> Result<Value> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .context("health request failed")?;
        Self::expect_success(resp)
            .await?
            .json()
            .await
            .context("invalid health response")
    }

    /// Turn a non-2xx response into an error carrying the server's message.
    async fn expect_success(resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .or_else(|| v.get("error"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or(body);
        bail!("server returned {status}: {message}")
    }
}
