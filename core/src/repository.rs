use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    error::Result,
    models::{OwnerId, Project, ProjectInput, Task, TaskInput},
    pagination::Pagination,
    query::Filter,
};

/// Repository trait for project persistence
///
/// Every read and write is addressed by a [`Filter`]; callers build those
/// through the access guard so ownership and visibility are always applied.
/// Implementations must be thread-safe and support concurrent access; no
/// operation is atomic with any other.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Insert a new Active project
    ///
    /// # Returns
    /// * `Ok(Project)` - The stored project with assigned id and timestamps
    /// * `Err(TrackerError::Conflict)` - If the store's uniqueness constraint on
    ///   (owner, name) among Active projects is violated
    /// * `Err(TrackerError::Database)` - If the database operation fails
    async fn insert(&self, owner: &OwnerId, input: ProjectInput) -> Result<Project>;

    /// First project matching the filter
    async fn find_one(&self, filter: &Filter) -> Result<Option<Project>>;

    /// Projects matching the filter, sorted and paged when `pagination` is given
    async fn find(&self, filter: &Filter, pagination: Option<&Pagination>) -> Result<Vec<Project>>;

    /// Number of projects matching the filter
    async fn count(&self, filter: &Filter) -> Result<u64>;

    /// Replace the writable fields of the project matching the filter
    ///
    /// # Returns
    /// * `Ok(Some(Project))` - The updated project
    /// * `Ok(None)` - If nothing matched
    /// * `Err(TrackerError::Conflict)` - If the new name collides with another Active project
    async fn replace_one(&self, filter: &Filter, input: ProjectInput) -> Result<Option<Project>>;

    /// Mark the Active project matching the filter as deleted
    ///
    /// Only a project that is not yet deleted is touched, so two racing
    /// deletes cannot both succeed.
    ///
    /// # Returns
    /// * `Ok(Some(Project))` - The project as it was deleted
    /// * `Ok(None)` - If no Active project matched
    async fn soft_delete_one(&self, filter: &Filter, at: DateTime<Utc>) -> Result<Option<Project>>;

    /// Verify connectivity
    async fn health_check(&self) -> Result<()>;
}

/// Repository trait for task persistence
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Insert a new Active task
    async fn insert(&self, owner: &OwnerId, input: TaskInput) -> Result<Task>;

    /// First task matching the filter
    async fn find_one(&self, filter: &Filter) -> Result<Option<Task>>;

    /// Tasks matching the filter, sorted and paged when `pagination` is given
    async fn find(&self, filter: &Filter, pagination: Option<&Pagination>) -> Result<Vec<Task>>;

    /// Number of tasks matching the filter
    async fn count(&self, filter: &Filter) -> Result<u64>;

    /// Replace the writable fields of the task matching the filter
    async fn replace_one(&self, filter: &Filter, input: TaskInput) -> Result<Option<Task>>;

    /// Mark the Active task matching the filter as deleted
    async fn soft_delete_one(&self, filter: &Filter, at: DateTime<Utc>) -> Result<Option<Task>>;

    /// Set `projectId` to null on every task matching the filter
    ///
    /// # Returns
    /// * `Ok(u64)` - Number of tasks whose reference was cleared
    async fn clear_project_refs(&self, filter: &Filter) -> Result<u64>;

    /// Verify connectivity
    async fn health_check(&self) -> Result<()>;
}
