use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TrackerError;

/// Verified identity of the caller, supplied by the identity layer.
///
/// The core never re-validates it; it only scopes every query by it.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A project owned by a single user.
///
/// `name` is unique per owner among non-deleted projects. A deleted project
/// keeps its row with `is_deleted` set and `deleted_at` stamped.
///
/// # Examples
///
/// ```rust
/// use tracker_core::models::{OwnerId, Project};
/// use chrono::Utc;
///
/// let now = Utc::now();
/// let project = Project {
///     id: uuid::Uuid::new_v4(),
///     name: "Website relaunch".to_string(),
///     description: None,
///     owner_id: OwnerId::new("user-1"),
///     is_deleted: false,
///     deleted_at: None,
///     created_at: now,
///     updated_at: now,
/// };
///
/// assert!(project.is_active());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: OwnerId,
    pub is_deleted: bool,
    /// Set iff `is_deleted`
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}

/// A task owned by a single user, optionally filed under one of their projects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: DateTime<Utc>,
    pub owner_id: OwnerId,
    /// Weak reference: lookup only, the project may be deleted independently
    pub project_id: Option<Uuid>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}

/// Task progress
#[derive(Debug, Clone, Copy, Hash, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "To-Do")]
    ToDo,
    #[serde(rename = "In-Progress")]
    InProgress,
    #[serde(rename = "Done")]
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::ToDo, TaskStatus::InProgress, TaskStatus::Done];

    /// Stored and wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "To-Do",
            TaskStatus::InProgress => "In-Progress",
            TaskStatus::Done => "Done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| TrackerError::Validation(format!("Invalid task status: '{s}'")))
    }
}

/// Task urgency
#[derive(Debug, Clone, Copy, Hash, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TaskPriority {
    #[default]
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 3] = [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskPriority::ALL
            .into_iter()
            .find(|priority| priority.as_str() == s)
            .ok_or_else(|| TrackerError::Validation(format!("Invalid task priority: '{s}'")))
    }
}

/// Writable fields of a project, already validated.
///
/// Used both for inserts and for full-replace updates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectInput {
    pub name: String,
    pub description: Option<String>,
}

impl ProjectInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }
}

/// Writable fields of a task, already validated
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskInput {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: DateTime<Utc>,
    pub project_id: Option<Uuid>,
}

impl TaskInput {
    pub fn new(title: impl Into<String>, due_date: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            due_date,
            project_id: None,
        }
    }
}

/// Project as returned to its owner
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: OwnerId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Project> for ProjectView {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            name: project.name,
            description: project.description,
            owner_id: project.owner_id,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

/// Resolved task→project reference
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectRef {
    pub id: Uuid,
    pub name: String,
}

/// Task as returned to its owner, with the project reference resolved.
///
/// `project_id` is `None` both when the task has no project and when the
/// referenced project is missing or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: DateTime<Utc>,
    pub owner_id: OwnerId,
    pub project_id: Option<ProjectRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskView {
    pub fn from_task(task: Task, project: Option<ProjectRef>) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
            owner_id: task.owner_id,
            project_id: project,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_values() {
        assert_eq!(serde_json::to_string(&TaskStatus::ToDo).unwrap(), "\"To-Do\"");
        assert_eq!(
            serde_json::from_str::<TaskStatus>("\"In-Progress\"").unwrap(),
            TaskStatus::InProgress
        );
        assert_eq!("Done".parse::<TaskStatus>().unwrap(), TaskStatus::Done);
        assert!("done".parse::<TaskStatus>().unwrap_err().is_validation());
        assert!("ToDo".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_priority_wire_values() {
        assert_eq!(TaskPriority::default(), TaskPriority::Low);
        assert_eq!("High".parse::<TaskPriority>().unwrap(), TaskPriority::High);
        assert!("Urgent".parse::<TaskPriority>().is_err());
        assert_eq!(TaskPriority::Medium.to_string(), "Medium");
    }

    #[test]
    fn test_task_view_serializes_camel_case() {
        let now = Utc::now();
        let project_id = Uuid::new_v4();
        let task = Task {
            id: Uuid::new_v4(),
            title: "Write docs".to_string(),
            description: None,
            status: TaskStatus::InProgress,
            priority: TaskPriority::High,
            due_date: now,
            owner_id: OwnerId::new("u1"),
            project_id: Some(project_id),
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        let view = TaskView::from_task(
            task,
            Some(ProjectRef {
                id: project_id,
                name: "Docs".to_string(),
            }),
        );
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["projectId"]["name"], "Docs");
        assert_eq!(json["status"], "In-Progress");
        assert_eq!(json["ownerId"], "u1");
        assert!(json.get("isDeleted").is_none());
    }
}
