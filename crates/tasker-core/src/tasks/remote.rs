//! Remote task API client.
//!
//! REST resource at `{base_url}/tasks`. Requests carry the session token in
//! the `Authorization` header (raw, no scheme prefix). Create and update
//! responses are either `{ "message": ..., "task": {...} }` or a bare task.

use chrono::NaiveDate;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{NewTask, Priority, Task, TaskError, TaskPatch};
use crate::shared::{self, join_url, real_api_blocked};

/// HTTP client for the task API.
#[derive(Debug, Clone)]
pub struct RemoteTasks {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TaskList {
    #[serde(default)]
    tasks: Vec<Task>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TaskEnvelope {
    Wrapped { task: Task },
    Bare(Task),
}

impl TaskEnvelope {
    fn into_task(self) -> Task {
        match self {
            TaskEnvelope::Wrapped { task } | TaskEnvelope::Bare(task) => task,
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    task_id: Option<&'a str>,
    task_name: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    deadline: Option<NaiveDate>,
    priority: Priority,
}

impl RemoteTasks {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// `GET /tasks`.
    ///
    /// # Errors
    /// Returns `Remote` on a non-2xx answer and `Transport` when the request
    /// or decoding fails.
    pub async fn list(&self, token: &str) -> Result<Vec<Task>, TaskError> {
        let request = self.http.get(self.url("tasks")?);
        let response = self.send(request, token).await?;
        let list: TaskList = decode(response).await?;
        Ok(list.tasks)
    }

    /// `POST /tasks`.
    ///
    /// # Errors
    /// Returns `InvalidInput` for an empty name, `Remote` on a non-2xx answer
    /// and `Transport` when the request or decoding fails.
    pub async fn create(&self, token: &str, input: &NewTask) -> Result<Task, TaskError> {
        input.validate()?;

        let name = input.name.trim();
        let body = CreateBody {
            task_id: input.id.as_deref(),
            task_name: name,
            description: &input.description,
            deadline: input.deadline,
            priority: input.priority,
        };
        let request = self.http.post(self.url("tasks")?).json(&body);
        let response = self.send(request, token).await?;
        let envelope: TaskEnvelope = decode(response).await?;
        Ok(envelope.into_task())
    }

    /// `PUT /tasks/{id}`. A 404 maps to `NotFound`.
    ///
    /// # Errors
    /// Returns `InvalidInput` for an invalid patch, `NotFound`, `Remote` on
    /// other non-2xx answers and `Transport` when the request or decoding fails.
    pub async fn update(&self, token: &str, id: &str, patch: &TaskPatch) -> Result<Task, TaskError> {
        patch.validate()?;

        let request = self
            .http
            .put(self.url(&format!("tasks/{}", encode_segment(id)))?)
            .json(patch);
        let response = match self.send(request, token).await {
            Err(TaskError::Remote {
                status_code: 404, ..
            }) => return Err(TaskError::not_found(id)),
            other => other?,
        };
        let envelope: TaskEnvelope = decode(response).await?;
        Ok(envelope.into_task())
    }

    /// `DELETE /tasks/{id}`. A 404 counts as already deleted.
    ///
    /// # Errors
    /// Returns `Remote` on other non-2xx answers and `Transport` when the
    /// request fails.
    pub async fn delete(&self, token: &str, id: &str) -> Result<(), TaskError> {
        let request = self
            .http
            .delete(self.url(&format!("tasks/{}", encode_segment(id)))?);
        match self.send(request, token).await {
            Ok(_) => Ok(()),
            Err(TaskError::Remote {
                status_code: 404, ..
            }) => {
                tracing::debug!(id, "Task already absent on delete");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn url(&self, path: &str) -> Result<String, TaskError> {
        let url = join_url(&self.base_url, path);
        if real_api_blocked(&url) {
            return Err(TaskError::Transport(format!(
                "{}=1 but trying to use a production task API: {url}",
                shared::BLOCK_REAL_API_ENV
            )));
        }
        Ok(url)
    }

    /// Attaches the shared headers, sends, and maps non-2xx to `Remote`.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        token: &str,
    ) -> Result<reqwest::Response, TaskError> {
        let response = request
            .header(AUTHORIZATION, token)
            .header(USER_AGENT, shared::USER_AGENT)
            .send()
            .await
            .map_err(|e| TaskError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = TaskError::remote(status.as_u16(), &body);
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("Task API rejected the session token");
        } else {
            tracing::debug!(status = status.as_u16(), error = %err, "Task API error");
        }
        Err(err)
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, TaskError> {
    let text = response
        .text()
        .await
        .map_err(|e| TaskError::Transport(e.to_string()))?;
    serde_json::from_str(&text)
        .map_err(|e| TaskError::Transport(format!("Invalid response from task API: {e}")))
}

/// Percent-encodes a path segment.
fn encode_segment(segment: &str) -> String {
    let mut url = url::Url::parse("http://placeholder/").ok();
    if let Some(u) = url.as_mut()
        && let Ok(mut segments) = u.path_segments_mut()
    {
        segments.clear().push(segment);
    }
    url.map_or_else(
        || segment.to_string(),
        |u| u.path().trim_start_matches('/').to_string(),
    )
}
