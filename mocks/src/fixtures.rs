//! Standard test fixtures for consistent testing
//!
//! Provides pre-built test data including:
//! - Owners and a lifecycle wired to fresh in-memory repositories
//! - Standard projects and tasks
//! - A two-tenant dataset for isolation scenarios

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use tracker_core::{OwnerId, Project, ResourceLifecycle, Task, TaskPriority, TaskStatus};

use crate::{MockProjectRepository, MockTaskRepository, ProjectBuilder, TaskBuilder};

/// Lifecycle over in-memory repositories
pub type MockLifecycle = ResourceLifecycle<MockProjectRepository, MockTaskRepository>;

pub const OWNER_A: &str = "user-a";
pub const OWNER_B: &str = "user-b";

pub fn owner_a() -> OwnerId {
    OwnerId::new(OWNER_A)
}

pub fn owner_b() -> OwnerId {
    OwnerId::new(OWNER_B)
}

/// Lifecycle over empty repositories, with handles to both for inspection
pub fn create_lifecycle() -> (MockLifecycle, Arc<MockProjectRepository>, Arc<MockTaskRepository>) {
    create_lifecycle_with(Vec::new(), Vec::new())
}

/// Lifecycle over repositories seeded with the given records
pub fn create_lifecycle_with(
    projects: Vec<Project>,
    tasks: Vec<Task>,
) -> (MockLifecycle, Arc<MockProjectRepository>, Arc<MockTaskRepository>) {
    let projects = Arc::new(MockProjectRepository::with_projects(projects));
    let tasks = Arc::new(MockTaskRepository::with_tasks(tasks));
    (
        ResourceLifecycle::new(projects.clone(), tasks.clone()),
        projects,
        tasks,
    )
}

/// Create a basic test project with sensible defaults
pub fn create_test_project(owner: &str, name: &str) -> Project {
    ProjectBuilder::new().with_owner(owner).with_name(name).build()
}

/// Create a basic test task, optionally filed under a project
pub fn create_test_task(owner: &str, title: &str, project: Option<&Project>) -> Task {
    let builder = TaskBuilder::new().with_owner(owner).with_title(title);
    match project {
        Some(project) => builder.with_project(project.id).build(),
        None => builder.build(),
    }
}

/// Projects and tasks for two owners with distinct, ordered creation times
///
/// Owner A: projects "Alpha", "Beta" (deleted) and five tasks, three of them in
/// "Alpha". Owner B: project "Alpha" and one task.
pub fn create_two_tenant_dataset() -> (Vec<Project>, Vec<Task>) {
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    let at = |minutes: i64| base + Duration::minutes(minutes);

    let alpha = ProjectBuilder::new()
        .with_owner(OWNER_A)
        .with_name("Alpha")
        .with_created_at(at(0))
        .build();
    let beta = ProjectBuilder::new()
        .with_owner(OWNER_A)
        .with_name("Beta")
        .with_created_at(at(1))
        .deleted()
        .build();
    let foreign = ProjectBuilder::new()
        .with_owner(OWNER_B)
        .with_name("Alpha")
        .with_created_at(at(2))
        .build();

    let tasks = vec![
        TaskBuilder::new()
            .with_owner(OWNER_A)
            .with_title("Write report")
            .with_project(alpha.id)
            .with_status(TaskStatus::InProgress)
            .with_priority(TaskPriority::High)
            .with_due_date(Utc.with_ymd_and_hms(2024, 4, 1, 9, 30, 0).unwrap())
            .with_created_at(at(10))
            .build(),
        TaskBuilder::new()
            .with_owner(OWNER_A)
            .with_title("Review report")
            .with_project(alpha.id)
            .with_due_date(Utc.with_ymd_and_hms(2024, 4, 2, 0, 0, 0).unwrap())
            .with_created_at(at(11))
            .build(),
        TaskBuilder::new()
            .with_owner(OWNER_A)
            .with_title("Plan launch")
            .with_project(alpha.id)
            .with_status(TaskStatus::Done)
            .with_priority(TaskPriority::Medium)
            .with_due_date(Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap())
            .with_created_at(at(12))
            .build(),
        TaskBuilder::new()
            .with_owner(OWNER_A)
            .with_title("Orphaned chore")
            .with_project(beta.id)
            .with_created_at(at(13))
            .build(),
        TaskBuilder::new()
            .with_owner(OWNER_A)
            .with_title("Old report")
            .with_created_at(at(14))
            .deleted()
            .build(),
        TaskBuilder::new()
            .with_owner(OWNER_B)
            .with_title("Foreign report")
            .with_project(foreign.id)
            .with_created_at(at(15))
            .build(),
    ];

    (vec![alpha, beta, foreign], tasks)
}
