//! Builder pattern implementations for easy test data construction
//!
//! Provides fluent builders for:
//! - Stored `Project` and `Task` records with sensible defaults
//! - JSON write payloads as the boundary would receive them
//! - Raw list query parameters

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Map, Value as Json};
use tracker_core::{OwnerId, Project, Task, TaskPriority, TaskStatus};
use uuid::Uuid;

/// Builder for constructing Project instances in tests
pub struct ProjectBuilder {
    project: Project,
}

impl Default for ProjectBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectBuilder {
    /// Create new builder with default values
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            project: Project {
                id: Uuid::new_v4(),
                name: "Test Project".to_string(),
                description: Some("A test project".to_string()),
                owner_id: OwnerId::new("test-user"),
                is_deleted: false,
                deleted_at: None,
                created_at: now,
                updated_at: now,
            },
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.project.id = id;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.project.name = name.into();
        self
    }

    pub fn with_description(mut self, description: Option<&str>) -> Self {
        self.project.description = description.map(str::to_string);
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.project.owner_id = OwnerId::new(owner);
        self
    }

    /// Set creation (and update) timestamp
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.project.created_at = created_at;
        self.project.updated_at = created_at;
        self
    }

    /// Mark the project deleted at `created_at + 1h`
    pub fn deleted(mut self) -> Self {
        self.project.is_deleted = true;
        self.project.deleted_at = Some(self.project.created_at + Duration::hours(1));
        self
    }

    /// Build the final Project
    pub fn build(self) -> Project {
        self.project
    }
}

/// Builder for constructing Task instances in tests
pub struct TaskBuilder {
    task: Task,
}

impl Default for TaskBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskBuilder {
    /// Create new builder with default values
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            task: Task {
                id: Uuid::new_v4(),
                title: "Test Task".to_string(),
                description: Some("A test task".to_string()),
                status: TaskStatus::ToDo,
                priority: TaskPriority::Low,
                due_date: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
                owner_id: OwnerId::new("test-user"),
                project_id: None,
                is_deleted: false,
                deleted_at: None,
                created_at: now,
                updated_at: now,
            },
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.task.id = id;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.task.title = title.into();
        self
    }

    pub fn with_description(mut self, description: Option<&str>) -> Self {
        self.task.description = description.map(str::to_string);
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.task.status = status;
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.task.priority = priority;
        self
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.task.due_date = due_date;
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.task.owner_id = OwnerId::new(owner);
        self
    }

    pub fn with_project(mut self, project_id: Uuid) -> Self {
        self.task.project_id = Some(project_id);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.task.created_at = created_at;
        self.task.updated_at = created_at;
        self
    }

    pub fn deleted(mut self) -> Self {
        self.task.is_deleted = true;
        self.task.deleted_at = Some(self.task.created_at + Duration::hours(1));
        self
    }

    /// Build the final Task
    pub fn build(self) -> Task {
        self.task
    }
}

/// Builder for a project write payload
pub struct ProjectPayloadBuilder {
    payload: Map<String, Json>,
}

impl ProjectPayloadBuilder {
    pub fn new(name: &str) -> Self {
        let mut payload = Map::new();
        payload.insert("name".to_string(), json!(name));
        Self { payload }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.payload
            .insert("description".to_string(), json!(description));
        self
    }

    /// Add an arbitrary key, allowed or not
    pub fn with_field(mut self, key: &str, value: Json) -> Self {
        self.payload.insert(key.to_string(), value);
        self
    }

    pub fn build(self) -> Map<String, Json> {
        self.payload
    }
}

/// Builder for a task write payload
pub struct TaskPayloadBuilder {
    payload: Map<String, Json>,
}

impl TaskPayloadBuilder {
    /// Minimal valid payload: title and due date
    pub fn new(title: &str) -> Self {
        let mut payload = Map::new();
        payload.insert("title".to_string(), json!(title));
        payload.insert("dueDate".to_string(), json!("2030-01-01"));
        Self { payload }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.payload
            .insert("status".to_string(), json!(status.as_str()));
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.payload
            .insert("priority".to_string(), json!(priority.as_str()));
        self
    }

    pub fn with_due_date(mut self, due_date: &str) -> Self {
        self.payload.insert("dueDate".to_string(), json!(due_date));
        self
    }

    pub fn with_project(mut self, project_id: Uuid) -> Self {
        self.payload
            .insert("projectId".to_string(), json!(project_id.to_string()));
        self
    }

    pub fn with_field(mut self, key: &str, value: Json) -> Self {
        self.payload.insert(key.to_string(), value);
        self
    }

    pub fn build(self) -> Map<String, Json> {
        self.payload
    }
}

/// Builder for raw list query parameters
#[derive(Default)]
pub struct ListParamsBuilder {
    params: Vec<(String, String)>,
}

impl ListParamsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, page: u32) -> Self {
        self.param("page", &page.to_string())
    }

    pub fn limit(self, limit: u32) -> Self {
        self.param("limit", &limit.to_string())
    }

    pub fn sort(self, field: &str, order: &str) -> Self {
        self.param("sortBy", field).param("sortOrder", order)
    }

    /// Add any key/value pair; repeated keys are kept as-is
    pub fn param(mut self, key: &str, value: &str) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    pub fn build(self) -> Vec<(String, String)> {
        self.params
    }
}
