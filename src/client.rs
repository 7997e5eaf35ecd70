//! Client side of the task tracker: a typed HTTP client for the task
//! endpoints plus the local list state the presentation layer owns.
//!
//! The cache is synchronized only by replacing whole entries with
//! server-returned canonical rows. A failed call never touches the cache.

use log::error;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::{
    CreateTaskRequest, DeleteResponse, HealthcheckResponse, Task, UpdateTaskRequest,
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("task not found")]
    NotFound,
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("server error: {0}")]
    Server(String),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Typed client over the RPC surface, one method per procedure.
pub struct TaskClient {
    http: reqwest::Client,
    base_url: String,
}

impl TaskClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        TaskClient {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn healthcheck(&self) -> Result<HealthcheckResponse, ClientError> {
        let resp = self.http.get(self.url("/healthcheck")).send().await?;
        check(resp).await
    }

    pub async fn create_task(&self, input: &CreateTaskRequest) -> Result<Task, ClientError> {
        let resp = self.http.post(self.url("/tasks")).json(input).send().await?;
        check(resp).await
    }

    pub async fn get_tasks(&self) -> Result<Vec<Task>, ClientError> {
        let resp = self.http.get(self.url("/tasks")).send().await?;
        check(resp).await
    }

    /// `Ok(None)` for an unknown id; the server answers 200 with a null body.
    pub async fn get_task_by_id(&self, id: i64) -> Result<Option<Task>, ClientError> {
        let resp = self.http.get(self.url(&format!("/tasks/{}", id))).send().await?;
        check(resp).await
    }

    pub async fn update_task(
        &self,
        id: i64,
        changes: &UpdateTaskRequest,
    ) -> Result<Task, ClientError> {
        let resp = self
            .http
            .put(self.url(&format!("/tasks/{}", id)))
            .json(changes)
            .send()
            .await?;
        check(resp).await
    }

    pub async fn toggle_task(&self, id: i64) -> Result<Task, ClientError> {
        let resp = self
            .http
            .post(self.url(&format!("/tasks/{}/toggle", id)))
            .send()
            .await?;
        check(resp).await
    }

    pub async fn delete_task(&self, id: i64) -> Result<DeleteResponse, ClientError> {
        let resp = self
            .http
            .delete(self.url(&format!("/tasks/{}", id)))
            .send()
            .await?;
        check(resp).await
    }
}

async fn check<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json().await?);
    }
    let body = resp.text().await.unwrap_or_default();
    error!("Task request failed ({}): {}", status, body);
    match status {
        StatusCode::NOT_FOUND => Err(ClientError::NotFound),
        StatusCode::BAD_REQUEST => Err(ClientError::Rejected(body)),
        _ => Err(ClientError::Server(body)),
    }
}

/// The local task list, newest first. Owned by the presentation layer and
/// mutated only with canonical rows coming back from the server; concurrent
/// edits are overwritten wholesale, never field-merged.
#[derive(Debug, Default)]
pub struct TaskCache {
    tasks: Vec<Task>,
}

impl TaskCache {
    pub fn new() -> Self {
        TaskCache::default()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Replaces the whole list with a list response.
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    /// Replaces the cached row with the same id, or inserts the row at its
    /// created_at-descending position.
    pub fn upsert(&mut self, task: Task) {
        match self.tasks.iter().position(|t| t.id == task.id) {
            Some(i) => self.tasks[i] = task,
            None => {
                let at = self
                    .tasks
                    .iter()
                    .position(|t| (t.created_at, t.id) < (task.created_at, task.id))
                    .unwrap_or(self.tasks.len());
                self.tasks.insert(at, task);
            }
        }
    }

    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }
}
