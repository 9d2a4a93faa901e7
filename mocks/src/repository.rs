//! In-memory implementations of the repository traits
//!
//! Both mocks evaluate filters with [`Filter::matches`] and sort with
//! [`SortSpec::compare`], so they define the reference behavior the SQLite
//! backend is checked against. They also provide:
//! - Error injection for failure testing
//! - Call tracking for verification

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracker_core::{
    Filter, OwnerId, Pagination, Project, ProjectInput, ProjectRepository, Record, Result, Task,
    TaskInput, TaskRepository, TrackerError, Value,
};
use uuid::Uuid;

/// Shared storage and instrumentation behind each mock
struct MockTable<R> {
    rows: Arc<Mutex<Vec<R>>>,
    error_injection: Arc<Mutex<Option<TrackerError>>>,
    call_history: Arc<Mutex<Vec<String>>>,
}

impl<R: Record + Clone> MockTable<R> {
    fn new(rows: Vec<R>) -> Self {
        Self {
            rows: Arc::new(Mutex::new(rows)),
            error_injection: Arc::new(Mutex::new(None)),
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Record the call, then fail if an error was injected
    fn enter(&self, method: &str) -> Result<()> {
        self.call_history.lock().push(format!("{method}()"));
        match self.error_injection.lock().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn select(&self, filter: &Filter, pagination: Option<&Pagination>) -> Vec<R> {
        let mut matched: Vec<R> = self
            .rows
            .lock()
            .iter()
            .filter(|row| filter.matches(*row))
            .cloned()
            .collect();

        let Some(pagination) = pagination else {
            return matched;
        };
        matched.sort_by(|a, b| {
            pagination
                .sort
                .compare(a, b)
                .then_with(|| a.field_value("id").compare(&b.field_value("id")))
        });
        matched
            .into_iter()
            .skip(pagination.skip() as usize)
            .take(pagination.limit as usize)
            .collect()
    }

    fn count(&self, filter: &Filter) -> u64 {
        self.rows.lock().iter().filter(|row| filter.matches(*row)).count() as u64
    }

    /// Apply `change` to the first row matching `filter`
    fn modify_one(&self, filter: &Filter, change: impl FnOnce(&mut R)) -> Option<R> {
        let mut rows = self.rows.lock();
        let row = rows.iter_mut().find(|row| filter.matches(&**row))?;
        change(row);
        Some(row.clone())
    }
}

/// Mock implementation of ProjectRepository for testing
///
/// Enforces the (owner, name) uniqueness among Active projects the way the
/// SQLite partial unique index does.
pub struct MockProjectRepository {
    table: MockTable<Project>,
}

impl Default for MockProjectRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProjectRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self::with_projects(Vec::new())
    }

    /// Create mock repository with pre-populated projects
    pub fn with_projects(projects: Vec<Project>) -> Self {
        Self {
            table: MockTable::new(projects),
        }
    }

    /// Inject error for next operation
    pub fn inject_error(&self, error: TrackerError) {
        *self.table.error_injection.lock() = Some(error);
    }

    /// Get history of called methods
    pub fn call_history(&self) -> Vec<String> {
        self.table.call_history.lock().clone()
    }

    /// Clear call history
    pub fn clear_history(&self) {
        self.table.call_history.lock().clear();
    }

    /// Assert method was called
    pub fn assert_called(&self, method: &str) {
        let history = self.table.call_history.lock();
        assert!(
            history.iter().any(|call| call.contains(method)),
            "Method '{}' was not called. Call history: {:?}",
            method,
            *history
        );
    }

    /// Every stored project, deleted ones included
    pub fn snapshot(&self) -> Vec<Project> {
        self.table.rows.lock().clone()
    }

    fn name_taken(rows: &[Project], owner: &OwnerId, name: &str, except: Option<Uuid>) -> bool {
        rows.iter().any(|p| {
            p.is_active() && p.owner_id == *owner && p.name == name && Some(p.id) != except
        })
    }
}

#[async_trait]
impl ProjectRepository for MockProjectRepository {
    async fn insert(&self, owner: &OwnerId, input: ProjectInput) -> Result<Project> {
        self.table.enter("insert")?;

        let mut rows = self.table.rows.lock();
        if Self::name_taken(&rows, owner, &input.name, None) {
            return Err(TrackerError::Conflict(
                "UNIQUE constraint failed: projects.owner_id, projects.name".to_string(),
            ));
        }

        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            owner_id: owner.clone(),
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        rows.push(project.clone());
        Ok(project)
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Project>> {
        self.table.enter("find_one")?;
        Ok(self.table.select(filter, None).into_iter().next())
    }

    async fn find(&self, filter: &Filter, pagination: Option<&Pagination>) -> Result<Vec<Project>> {
        self.table.enter("find")?;
        Ok(self.table.select(filter, pagination))
    }

    async fn count(&self, filter: &Filter) -> Result<u64> {
        self.table.enter("count")?;
        Ok(self.table.count(filter))
    }

    async fn replace_one(&self, filter: &Filter, input: ProjectInput) -> Result<Option<Project>> {
        self.table.enter("replace_one")?;

        let target = self.table.select(filter, None).into_iter().next();
        if let Some(target) = &target {
            let rows = self.table.rows.lock();
            if Self::name_taken(&rows, &target.owner_id, &input.name, Some(target.id)) {
                return Err(TrackerError::Conflict(
                    "UNIQUE constraint failed: projects.owner_id, projects.name".to_string(),
                ));
            }
        }

        Ok(self.table.modify_one(filter, |project| {
            project.name = input.name;
            project.description = input.description;
            project.updated_at = Utc::now();
        }))
    }

    async fn soft_delete_one(&self, filter: &Filter, at: DateTime<Utc>) -> Result<Option<Project>> {
        self.table.enter("soft_delete_one")?;
        let active = filter.clone().eq("isDeleted", Value::Bool(false));
        Ok(self.table.modify_one(&active, |project| {
            project.is_deleted = true;
            project.deleted_at = Some(at);
            project.updated_at = at;
        }))
    }

    async fn health_check(&self) -> Result<()> {
        self.table.enter("health_check")
    }
}

/// Mock implementation of TaskRepository for testing
pub struct MockTaskRepository {
    table: MockTable<Task>,
}

impl Default for MockTaskRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTaskRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self::with_tasks(Vec::new())
    }

    /// Create mock repository with pre-populated tasks
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            table: MockTable::new(tasks),
        }
    }

    /// Inject error for next operation
    pub fn inject_error(&self, error: TrackerError) {
        *self.table.error_injection.lock() = Some(error);
    }

    /// Get history of called methods
    pub fn call_history(&self) -> Vec<String> {
        self.table.call_history.lock().clone()
    }

    /// Clear call history
    pub fn clear_history(&self) {
        self.table.call_history.lock().clear();
    }

    /// Assert method was called
    pub fn assert_called(&self, method: &str) {
        let history = self.table.call_history.lock();
        assert!(
            history.iter().any(|call| call.contains(method)),
            "Method '{}' was not called. Call history: {:?}",
            method,
            *history
        );
    }

    /// Every stored task, deleted ones included
    pub fn snapshot(&self) -> Vec<Task> {
        self.table.rows.lock().clone()
    }

    /// Look up a stored task by id regardless of owner or state
    pub fn get(&self, id: Uuid) -> Option<Task> {
        self.table.rows.lock().iter().find(|t| t.id == id).cloned()
    }
}

#[async_trait]
impl TaskRepository for MockTaskRepository {
    async fn insert(&self, owner: &OwnerId, input: TaskInput) -> Result<Task> {
        self.table.enter("insert")?;

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            status: input.status,
            priority: input.priority,
            due_date: input.due_date,
            owner_id: owner.clone(),
            project_id: input.project_id,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        self.table.rows.lock().push(task.clone());
        Ok(task)
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Task>> {
        self.table.enter("find_one")?;
        Ok(self.table.select(filter, None).into_iter().next())
    }

    async fn find(&self, filter: &Filter, pagination: Option<&Pagination>) -> Result<Vec<Task>> {
        self.table.enter("find")?;
        Ok(self.table.select(filter, pagination))
    }

    async fn count(&self, filter: &Filter) -> Result<u64> {
        self.table.enter("count")?;
        Ok(self.table.count(filter))
    }

    async fn replace_one(&self, filter: &Filter, input: TaskInput) -> Result<Option<Task>> {
        self.table.enter("replace_one")?;
        Ok(self.table.modify_one(filter, |task| {
            task.title = input.title;
            task.description = input.description;
            task.status = input.status;
            task.priority = input.priority;
            task.due_date = input.due_date;
            task.project_id = input.project_id;
            task.updated_at = Utc::now();
        }))
    }

    async fn soft_delete_one(&self, filter: &Filter, at: DateTime<Utc>) -> Result<Option<Task>> {
        self.table.enter("soft_delete_one")?;
        let active = filter.clone().eq("isDeleted", Value::Bool(false));
        Ok(self.table.modify_one(&active, |task| {
            task.is_deleted = true;
            task.deleted_at = Some(at);
            task.updated_at = at;
        }))
    }

    async fn clear_project_refs(&self, filter: &Filter) -> Result<u64> {
        self.table.enter("clear_project_refs")?;
        let now = Utc::now();
        let mut cleared = 0;
        for task in self.table.rows.lock().iter_mut() {
            if filter.matches(&*task) && task.project_id.is_some() {
                task.project_id = None;
                task.updated_at = now;
                cleared += 1;
            }
        }
        Ok(cleared)
    }

    async fn health_check(&self) -> Result<()> {
        self.table.enter("health_check")
    }
}
