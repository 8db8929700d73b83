//! Task records and the inputs used to create and patch them.
//!
//! Wire names follow the task API (`task_id`, `task_name`, `created_at`) so the
//! same types serialize to the remote API and to the local fallback store.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::TaskError;

/// Lifecycle status of a task. Transitions only from `Pending` to `Completed`.
///
/// Serialized lowercase; the capitalized spelling used by the task API is
/// accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    #[serde(alias = "Pending")]
    Pending,
    #[serde(alias = "Completed")]
    Completed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "completed" | "complete" | "done" => Ok(Self::Completed),
            _ => Err(format!("Unknown task status: {value}")),
        }
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[serde(alias = "Low")]
    Low,
    #[default]
    #[serde(alias = "Medium")]
    Medium,
    #[serde(alias = "High")]
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" | "med" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!(
                "Unknown priority: {value} (expected low, medium, or high)"
            )),
        }
    }
}

/// A user-owned to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "task_id")]
    pub id: String,
    #[serde(rename = "task_name")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "deserialize_deadline")]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(deserialize_with = "deserialize_created_at")]
    pub created_at: DateTime<Utc>,
    /// Owner id echoed by the task API. Never shown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Returns a copy of this task with the patch's present fields overwritten.
    ///
    /// # Errors
    /// Returns `InvalidInput` if the patch fails validation.
    pub fn merged(&self, patch: &TaskPatch) -> Result<Task, TaskError> {
        patch.validate()?;

        let mut task = self.clone();
        if let Some(name) = &patch.name {
            task.name = name.trim().to_string();
        }
        if let Some(description) = &patch.description {
            task.description.clone_from(description);
        }
        if let Some(deadline) = patch.deadline {
            task.deadline = deadline;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(status) = patch.status {
            task.status = status;
        }
        Ok(task)
    }
}

/// Accepts a missing value, `null`, `""`, `YYYY-MM-DD`, or a full RFC 3339 timestamp.
fn deserialize_deadline<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };
    parse_deadline(&raw).map_err(serde::de::Error::custom)
}

/// Accepts RFC 3339 or a naive ISO timestamp, which is read as UTC.
fn deserialize_created_at<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| serde::de::Error::custom(format!("invalid created_at: {raw}")))
}

/// Parses a deadline as entered by a user or stored by older clients.
///
/// # Errors
/// Returns a message if the value is neither empty nor a recognizable date.
pub fn parse_deadline(raw: &str) -> Result<Option<NaiveDate>, String> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| Some(dt.date_naive()))
        .map_err(|_| format!("Invalid deadline '{value}' (expected YYYY-MM-DD)"))
}

/// Input for `TaskGateway::create`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewTask {
    /// Caller-supplied id; generated when absent.
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub deadline: Option<NaiveDate>,
    pub priority: Priority,
    /// Caller-supplied creation time; set to now when absent.
    pub created_at: Option<DateTime<Utc>>,
}

impl NewTask {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Option<NaiveDate>) -> Self {
        self.deadline = deadline;
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// # Errors
    /// Returns `InvalidInput` when the name is empty.
    pub fn validate(&self) -> Result<(), TaskError> {
        if self.name.trim().is_empty() {
            return Err(TaskError::InvalidInput(
                "Task name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds the stored record, filling in id and creation time if absent.
    pub fn into_task(self, now: DateTime<Utc>) -> Task {
        Task {
            id: self.id.unwrap_or_else(generate_task_id),
            name: self.name.trim().to_string(),
            description: self.description,
            deadline: self.deadline,
            priority: self.priority,
            status: TaskStatus::Pending,
            created_at: self.created_at.unwrap_or(now),
            user_id: None,
        }
    }
}

/// Generates a client-side task id.
pub fn generate_task_id() -> String {
    format!("task_{}", uuid::Uuid::new_v4().simple())
}

/// Partial update for `TaskGateway::update`. Present fields overwrite; absent
/// fields are left alone.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TaskPatch {
    #[serde(rename = "task_name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `Some(None)` clears the deadline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    /// Patch that marks a task completed.
    pub fn complete() -> Self {
        Self {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// An empty patch is valid and merges to the unchanged task.
    ///
    /// # Errors
    /// Returns `InvalidInput` for an empty name or an attempt to move a task
    /// back to pending.
    pub fn validate(&self) -> Result<(), TaskError> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(TaskError::InvalidInput(
                "Task name must not be empty".to_string(),
            ));
        }
        if self.status == Some(TaskStatus::Pending) {
            return Err(TaskError::InvalidInput(
                "Completed tasks cannot be reopened".to_string(),
            ));
        }
        Ok(())
    }
}
