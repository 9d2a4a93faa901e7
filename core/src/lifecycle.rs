//! Create/read/update/delete orchestration for projects and tasks.
//!
//! [`ResourceLifecycle`] is the only entry point the boundary calls. Each method
//! validates raw input, scopes every repository call through a
//! [`ResourceAccessGuard`] and wraps the result in a response envelope.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value as Json};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::{
    access::ResourceAccessGuard,
    error::{Result, TrackerError},
    fields::EntityType,
    models::{OwnerId, ProjectRef, ProjectView, Task, TaskView},
    query::{QueryFilterBuilder, Value},
    repository::{ProjectRepository, TaskRepository},
    response::{ItemResponse, ListResponse, MessageResponse, Messages},
    validation::{parse_id, InputValidator, ListQuery},
};

/// Outcome of an orphaned-reference repair run
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReconcileReport {
    pub message: String,
    pub cleared: u64,
}

/// Project and task lifecycle over a pair of repositories
#[derive(Clone)]
pub struct ResourceLifecycle<P, T> {
    projects: Arc<P>,
    tasks: Arc<T>,
}

impl<P, T> ResourceLifecycle<P, T> {
    pub fn new(projects: Arc<P>, tasks: Arc<T>) -> Self {
        Self { projects, tasks }
    }

    pub fn project_repository(&self) -> Arc<P> {
        self.projects.clone()
    }

    pub fn task_repository(&self) -> Arc<T> {
        self.tasks.clone()
    }
}

impl<P, T> ResourceLifecycle<P, T>
where
    P: ProjectRepository,
    T: TaskRepository,
{
    // Projects

    /// One page of the owner's Active projects
    pub async fn list_projects(
        &self,
        owner: &OwnerId,
        params: &[(String, String)],
    ) -> Result<ListResponse<ProjectView>> {
        let entity = EntityType::Project;
        let guard = ResourceAccessGuard::new(owner.clone());
        let query = ListQuery::parse(entity, params)?;
        let filter = QueryFilterBuilder::build(guard.visible(entity), &query.search, entity)?;
        debug!(owner = %owner, ?filter, pagination = ?query.pagination, "Listing projects");

        let total = self.projects.count(&filter).await?;
        let projects = self.projects.find(&filter, Some(&query.pagination)).await?;

        Ok(ListResponse {
            message: Messages::listed(entity),
            data: projects.into_iter().map(ProjectView::from).collect(),
            meta: query.pagination.meta(total),
        })
    }

    pub async fn get_project(&self, owner: &OwnerId, id: &str) -> Result<ItemResponse<ProjectView>> {
        let entity = EntityType::Project;
        let guard = ResourceAccessGuard::new(owner.clone());
        let id = parse_id("id", id)?;

        let found = self.projects.find_one(&guard.visible_one(entity, id)).await?;
        let project = guard.require(entity, id, found)?;

        Ok(ItemResponse {
            message: Messages::fetched(entity),
            data: project.into(),
        })
    }

    /// Create a project; the name must be free among the owner's Active projects
    pub async fn create_project(
        &self,
        owner: &OwnerId,
        payload: &Map<String, Json>,
    ) -> Result<MessageResponse> {
        let guard = ResourceAccessGuard::new(owner.clone());
        let input = InputValidator::project_input(payload)?;
        self.ensure_name_available(&guard, &input.name, None).await?;

        let name = input.name.clone();
        let project = self
            .projects
            .insert(owner, input)
            .await
            .map_err(|e| name_conflict(e, &name))?;
        info!(owner = %owner, project_id = %project.id, "Project created");

        Ok(MessageResponse::new(Messages::created(EntityType::Project)))
    }

    /// Replace the writable fields of an Active project
    pub async fn update_project(
        &self,
        owner: &OwnerId,
        id: &str,
        payload: &Map<String, Json>,
    ) -> Result<MessageResponse> {
        let entity = EntityType::Project;
        let guard = ResourceAccessGuard::new(owner.clone());
        let id = parse_id("id", id)?;
        let input = InputValidator::project_input(payload)?;

        let filter = guard.visible_one(entity, id);
        guard.require(entity, id, self.projects.find_one(&filter).await?)?;
        self.ensure_name_available(&guard, &input.name, Some(id))
            .await?;

        let name = input.name.clone();
        let updated = self
            .projects
            .replace_one(&filter, input)
            .await
            .map_err(|e| name_conflict(e, &name))?;
        guard.require(entity, id, updated)?;
        info!(owner = %owner, project_id = %id, "Project updated");

        Ok(MessageResponse::new(Messages::updated(entity)))
    }

    /// Soft-delete a project, then sever every Active task reference to it.
    ///
    /// The delete is reported once the project is marked deleted. A failure
    /// while severing references is logged and left for
    /// [`reconcile_orphaned_tasks`](Self::reconcile_orphaned_tasks); reads
    /// already treat such references as null.
    pub async fn delete_project(&self, owner: &OwnerId, id: &str) -> Result<MessageResponse> {
        let entity = EntityType::Project;
        let guard = ResourceAccessGuard::new(owner.clone());
        let id = parse_id("id", id)?;

        let deleted = self
            .projects
            .soft_delete_one(&guard.deletable_one(entity, id), Utc::now())
            .await?;
        guard.require(entity, id, deleted)?;
        info!(owner = %owner, project_id = %id, "Project deleted");

        let referencing = guard
            .visible(EntityType::Task)
            .eq("projectId", Value::Id(id));
        match self.tasks.clear_project_refs(&referencing).await {
            Ok(cleared) => {
                info!(owner = %owner, project_id = %id, cleared, "Task references severed")
            }
            Err(e) => error!(
                owner = %owner,
                project_id = %id,
                error = %e,
                "Failed to sever task references to deleted project"
            ),
        }

        Ok(MessageResponse::new(Messages::deleted(entity)))
    }

    // Tasks

    /// One page of the owner's Active tasks with project references resolved
    pub async fn list_tasks(
        &self,
        owner: &OwnerId,
        params: &[(String, String)],
    ) -> Result<ListResponse<TaskView>> {
        let entity = EntityType::Task;
        let guard = ResourceAccessGuard::new(owner.clone());
        let query = ListQuery::parse(entity, params)?;
        let filter = QueryFilterBuilder::build(guard.visible(entity), &query.search, entity)?;
        debug!(owner = %owner, ?filter, pagination = ?query.pagination, "Listing tasks");

        let total = self.tasks.count(&filter).await?;
        let tasks = self.tasks.find(&filter, Some(&query.pagination)).await?;
        let data = self.resolve_projects(&guard, tasks).await?;

        Ok(ListResponse {
            message: Messages::listed(entity),
            data,
            meta: query.pagination.meta(total),
        })
    }

    pub async fn get_task(&self, owner: &OwnerId, id: &str) -> Result<ItemResponse<TaskView>> {
        let entity = EntityType::Task;
        let guard = ResourceAccessGuard::new(owner.clone());
        let id = parse_id("id", id)?;

        let found = self.tasks.find_one(&guard.visible_one(entity, id)).await?;
        let task = guard.require(entity, id, found)?;
        let data = self
            .resolve_projects(&guard, vec![task])
            .await?
            .pop()
            .ok_or_else(|| TrackerError::Internal("Resolved task went missing".to_string()))?;

        Ok(ItemResponse {
            message: Messages::fetched(entity),
            data,
        })
    }

    pub async fn create_task(
        &self,
        owner: &OwnerId,
        payload: &Map<String, Json>,
    ) -> Result<MessageResponse> {
        let guard = ResourceAccessGuard::new(owner.clone());
        let input = InputValidator::task_input(payload)?;
        if let Some(project_id) = input.project_id {
            self.ensure_project_exists(&guard, project_id).await?;
        }

        let task = self.tasks.insert(owner, input).await?;
        info!(owner = %owner, task_id = %task.id, "Task created");

        Ok(MessageResponse::new(Messages::created(EntityType::Task)))
    }

    /// Replace the writable fields of an Active task.
    ///
    /// A set `projectId` is checked before anything is written, so a task is
    /// left untouched when the reference does not resolve.
    pub async fn update_task(
        &self,
        owner: &OwnerId,
        id: &str,
        payload: &Map<String, Json>,
    ) -> Result<MessageResponse> {
        let entity = EntityType::Task;
        let guard = ResourceAccessGuard::new(owner.clone());
        let id = parse_id("id", id)?;
        let input = InputValidator::task_input(payload)?;

        let filter = guard.visible_one(entity, id);
        guard.require(entity, id, self.tasks.find_one(&filter).await?)?;
        if let Some(project_id) = input.project_id {
            self.ensure_project_exists(&guard, project_id).await?;
        }

        let updated = self.tasks.replace_one(&filter, input).await?;
        guard.require(entity, id, updated)?;
        info!(owner = %owner, task_id = %id, "Task updated");

        Ok(MessageResponse::new(Messages::updated(entity)))
    }

    pub async fn delete_task(&self, owner: &OwnerId, id: &str) -> Result<MessageResponse> {
        let entity = EntityType::Task;
        let guard = ResourceAccessGuard::new(owner.clone());
        let id = parse_id("id", id)?;

        let deleted = self
            .tasks
            .soft_delete_one(&guard.deletable_one(entity, id), Utc::now())
            .await?;
        guard.require(entity, id, deleted)?;
        info!(owner = %owner, task_id = %id, "Task deleted");

        Ok(MessageResponse::new(Messages::deleted(entity)))
    }

    // Maintenance

    /// Clear every Active task reference of `owner` that no longer resolves to
    /// an Active project. Safe to run any number of times.
    pub async fn reconcile_orphaned_tasks(&self, owner: &OwnerId) -> Result<ReconcileReport> {
        let guard = ResourceAccessGuard::new(owner.clone());
        let linked = guard
            .visible(EntityType::Task)
            .not_eq("projectId", Value::Null);
        let referenced: BTreeSet<Uuid> = self
            .tasks
            .find(&linked, None)
            .await?
            .into_iter()
            .filter_map(|task| task.project_id)
            .collect();

        let live = self.active_project_names(&guard, &referenced).await?;
        let orphaned: Vec<Value> = referenced
            .iter()
            .filter(|id| !live.contains_key(id))
            .map(|id| Value::Id(*id))
            .collect();

        let cleared = if orphaned.is_empty() {
            0
        } else {
            let filter = guard
                .visible(EntityType::Task)
                .is_in("projectId", orphaned);
            self.tasks.clear_project_refs(&filter).await?
        };
        info!(owner = %owner, cleared, "Orphaned task references reconciled");

        Ok(ReconcileReport {
            message: "Orphaned task references reconciled successfully".to_string(),
            cleared,
        })
    }

    /// Verify both repositories are reachable
    pub async fn health_check(&self) -> Result<()> {
        self.projects.health_check().await?;
        self.tasks.health_check().await
    }

    async fn ensure_name_available(
        &self,
        guard: &ResourceAccessGuard,
        name: &str,
        exclude: Option<Uuid>,
    ) -> Result<()> {
        let mut filter = guard
            .visible(EntityType::Project)
            .eq("name", Value::Text(name.to_string()));
        if let Some(id) = exclude {
            filter = filter.not_eq("id", Value::Id(id));
        }
        if self.projects.count(&filter).await? > 0 {
            return Err(TrackerError::duplicate_project_name(name));
        }
        Ok(())
    }

    async fn ensure_project_exists(&self, guard: &ResourceAccessGuard, id: Uuid) -> Result<()> {
        let found = self
            .projects
            .find_one(&guard.visible_one(EntityType::Project, id))
            .await?;
        guard.require(EntityType::Project, id, found).map(|_| ())
    }

    async fn active_project_names(
        &self,
        guard: &ResourceAccessGuard,
        ids: &BTreeSet<Uuid>,
    ) -> Result<HashMap<Uuid, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let filter = guard
            .visible(EntityType::Project)
            .is_in("id", ids.iter().map(|id| Value::Id(*id)).collect());
        Ok(self
            .projects
            .find(&filter, None)
            .await?
            .into_iter()
            .map(|project| (project.id, project.name))
            .collect())
    }

    /// Secondary lookup of referenced projects; unresolvable references read as null
    async fn resolve_projects(
        &self,
        guard: &ResourceAccessGuard,
        tasks: Vec<Task>,
    ) -> Result<Vec<TaskView>> {
        let referenced: BTreeSet<Uuid> = tasks.iter().filter_map(|task| task.project_id).collect();
        let names = self.active_project_names(guard, &referenced).await?;

        Ok(tasks
            .into_iter()
            .map(|task| {
                let project = task.project_id.and_then(|id| {
                    names.get(&id).map(|name| ProjectRef {
                        id,
                        name: name.clone(),
                    })
                });
                TaskView::from_task(task, project)
            })
            .collect())
    }
}

/// A store-level uniqueness violation reads the same as the advisory check
fn name_conflict(error: TrackerError, name: &str) -> TrackerError {
    if error.is_conflict() {
        TrackerError::duplicate_project_name(name)
    } else {
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_conflict_reads_as_duplicate_name() {
        let raw = TrackerError::Conflict("UNIQUE constraint failed: projects.name".to_string());
        assert_eq!(
            name_conflict(raw, "Alpha"),
            TrackerError::duplicate_project_name("Alpha")
        );

        let other = TrackerError::Database("disk I/O error".to_string());
        assert_eq!(name_conflict(other.clone(), "Alpha"), other);
    }
}
