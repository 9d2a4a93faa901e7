//! Lifecycle scenarios over the in-memory repositories

use mocks::*;
use serde_json::json;
use tracker_core::{ErrorKind, TaskPriority, TaskStatus, TrackerError};
use uuid::Uuid;

#[tokio::test]
async fn test_project_crud_round() {
    let (lifecycle, projects, _) = create_lifecycle();
    let owner = owner_a();

    let created = lifecycle
        .create_project(
            &owner,
            &ProjectPayloadBuilder::new("Alpha")
                .with_description("First")
                .build(),
        )
        .await
        .unwrap();
    assert_eq!(created.message, "Project created successfully");

    let listed = lifecycle.list_projects(&owner, &[]).await.unwrap();
    assert_eq!(listed.message, "Projects fetched successfully");
    assert_eq!(listed.data.len(), 1);
    assert_page_meta(&listed.meta, 1, 10, 1, 1);
    let id = listed.data[0].id.to_string();

    let fetched = lifecycle.get_project(&owner, &id).await.unwrap();
    assert_eq!(fetched.message, "Project details fetched successfully");
    assert_eq!(fetched.data.name, "Alpha");

    let updated = lifecycle
        .update_project(&owner, &id, &ProjectPayloadBuilder::new("Alpha 2").build())
        .await
        .unwrap();
    assert_eq!(updated.message, "Project details updated successfully");
    let fetched = lifecycle.get_project(&owner, &id).await.unwrap();
    assert_eq!(fetched.data.name, "Alpha 2");
    assert_eq!(fetched.data.description, None);

    let deleted = lifecycle.delete_project(&owner, &id).await.unwrap();
    assert_eq!(deleted.message, "Project deleted successfully");
    assert_project_deleted(&projects.snapshot()[0]);

    let missing = lifecycle.get_project(&owner, &id).await;
    assert_error(
        &missing,
        ErrorKind::NotFound,
        &format!("Project with id {id} not found"),
    );
    let again = lifecycle.delete_project(&owner, &id).await;
    assert_error_kind(&again, ErrorKind::NotFound);
    let update_deleted = lifecycle
        .update_project(&owner, &id, &ProjectPayloadBuilder::new("Zombie").build())
        .await;
    assert_error_kind(&update_deleted, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_project_name_uniqueness_per_owner() {
    let (lifecycle, _, _) = create_lifecycle();
    let alpha = ProjectPayloadBuilder::new("Alpha").build();

    lifecycle.create_project(&owner_a(), &alpha).await.unwrap();
    let duplicate = lifecycle.create_project(&owner_a(), &alpha).await;
    assert_error(
        &duplicate,
        ErrorKind::Conflict,
        "Project with the name Alpha already exists",
    );
    lifecycle.create_project(&owner_b(), &alpha).await.unwrap();

    // Renaming onto an existing name conflicts, keeping one's own name does not
    lifecycle
        .create_project(&owner_a(), &ProjectPayloadBuilder::new("Beta").build())
        .await
        .unwrap();
    let listed = lifecycle
        .list_projects(
            &owner_a(),
            &ListParamsBuilder::new().param("name", "beta").build(),
        )
        .await
        .unwrap();
    let beta_id = listed.data[0].id.to_string();
    let rename = lifecycle.update_project(&owner_a(), &beta_id, &alpha).await;
    assert_error_kind(&rename, ErrorKind::Conflict);
    lifecycle
        .update_project(
            &owner_a(),
            &beta_id,
            &ProjectPayloadBuilder::new("Beta")
                .with_description("same name")
                .build(),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_foreign_resources_are_not_found() {
    let (projects, tasks) = create_two_tenant_dataset();
    let foreign_project = projects[2].id.to_string();
    let foreign_task = tasks[5].id.to_string();
    let (lifecycle, project_repo, task_repo) = create_lifecycle_with(projects, tasks);

    assert_error_kind(
        &lifecycle.get_project(&owner_a(), &foreign_project).await,
        ErrorKind::NotFound,
    );
    assert_error_kind(
        &lifecycle.delete_project(&owner_a(), &foreign_project).await,
        ErrorKind::NotFound,
    );
    assert_error_kind(
        &lifecycle.get_task(&owner_a(), &foreign_task).await,
        ErrorKind::NotFound,
    );
    assert_error_kind(
        &lifecycle
            .update_task(
                &owner_a(),
                &foreign_task,
                &TaskPayloadBuilder::new("Mine now").build(),
            )
            .await,
        ErrorKind::NotFound,
    );

    assert!(project_repo.snapshot().iter().filter(|p| p.is_deleted).count() == 1);
    assert_eq!(
        task_repo.snapshot()[5].title,
        "Foreign report",
        "Foreign task must be unmodified"
    );
}

#[tokio::test]
async fn test_malformed_ids_are_validation_errors() {
    let (lifecycle, _, _) = create_lifecycle();
    assert_error_kind(
        &lifecycle.get_project(&owner_a(), "not-an-id").await,
        ErrorKind::Validation,
    );
    assert_error_kind(
        &lifecycle.delete_task(&owner_a(), "42").await,
        ErrorKind::Validation,
    );
}

#[tokio::test]
async fn test_task_list_resolves_projects_and_tolerates_orphans() {
    let (projects, tasks) = create_two_tenant_dataset();
    let alpha_id = projects[0].id;
    let (lifecycle, _, _) = create_lifecycle_with(projects, tasks);

    let listed = lifecycle
        .list_tasks(&owner_a(), &ListParamsBuilder::new().sort("createdAt", "asc").build())
        .await
        .unwrap();
    assert_eq!(listed.message, "Tasks fetched successfully");
    assert_page_meta(&listed.meta, 1, 10, 4, 1);

    let titles: Vec<&str> = listed.data.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(
        titles,
        ["Write report", "Review report", "Plan launch", "Orphaned chore"]
    );
    let resolved = listed.data[0].project_id.as_ref().unwrap();
    assert_eq!(resolved.id, alpha_id);
    assert_eq!(resolved.name, "Alpha");
    // References a deleted project
    assert!(listed.data[3].project_id.is_none());

    let json = serde_json::to_value(&listed).unwrap();
    assert_eq!(json["data"][0]["projectId"]["name"], "Alpha");
    assert!(json["data"][3]["projectId"].is_null());
    assert_eq!(json["meta"]["totalData"], 4);
}

#[tokio::test]
async fn test_task_search_and_pagination() {
    let (projects, tasks) = create_two_tenant_dataset();
    let (lifecycle, _, _) = create_lifecycle_with(projects, tasks);
    let owner = owner_a();

    let by_title = lifecycle
        .list_tasks(&owner, &ListParamsBuilder::new().param("title", "REPORT").build())
        .await
        .unwrap();
    // "Old report" is deleted and "Foreign report" belongs to another owner
    assert_eq!(by_title.meta.total_data, 2);

    let by_day = lifecycle
        .list_tasks(&owner, &ListParamsBuilder::new().param("dueDate", "2024-04-01").build())
        .await
        .unwrap();
    assert_eq!(by_day.data.len(), 1);
    assert_eq!(by_day.data[0].title, "Write report");

    let second_page = lifecycle
        .list_tasks(
            &owner,
            &ListParamsBuilder::new()
                .limit(3)
                .page(2)
                .sort("title", "asc")
                .build(),
        )
        .await
        .unwrap();
    assert_page_meta(&second_page.meta, 2, 3, 4, 2);
    assert_eq!(second_page.data.len(), 1);
    assert_eq!(second_page.data[0].title, "Write report");

    let empty = lifecycle
        .list_tasks(&owner, &ListParamsBuilder::new().param("title", "nothing").build())
        .await
        .unwrap();
    assert!(empty.data.is_empty());
    assert_page_meta(&empty.meta, 1, 10, 0, 1);
}

#[tokio::test]
async fn test_list_rejects_bad_parameters() {
    let (lifecycle, _, _) = create_lifecycle();
    let owner = owner_a();

    let unknown = lifecycle
        .list_tasks(&owner, &ListParamsBuilder::new().param("color", "red").build())
        .await;
    assert_error(&unknown, ErrorKind::Validation, "Invalid query parameters: color");

    let repeated = lifecycle
        .list_tasks(
            &owner,
            &ListParamsBuilder::new()
                .param("status", "Done")
                .param("status", "To-Do")
                .build(),
        )
        .await;
    assert_error(&repeated, ErrorKind::Validation, "Invalid query parameters: status");

    let unsortable = lifecycle
        .list_projects(&owner, &ListParamsBuilder::new().sort("ownerId", "asc").build())
        .await;
    assert_error(&unsortable, ErrorKind::Validation, "Invalid sortBy for project: ownerId");

    let too_many = lifecycle
        .list_projects(&owner, &ListParamsBuilder::new().limit(101).build())
        .await;
    assert_error_kind(&too_many, ErrorKind::Validation);
}

#[tokio::test]
async fn test_task_create_defaults_and_project_checks() {
    let (projects, tasks) = create_two_tenant_dataset();
    let alpha = projects[0].id;
    let beta = projects[1].id;
    let foreign = projects[2].id;
    let (lifecycle, _, task_repo) = create_lifecycle_with(projects, tasks);
    let owner = owner_a();

    lifecycle
        .create_task(&owner, &TaskPayloadBuilder::new("Fresh").with_project(alpha).build())
        .await
        .unwrap();
    let fresh = task_repo
        .snapshot()
        .into_iter()
        .find(|t| t.title == "Fresh")
        .unwrap();
    assert_eq!(fresh.status, TaskStatus::ToDo);
    assert_eq!(fresh.priority, TaskPriority::Low);
    assert_eq!(fresh.project_id, Some(alpha));

    for missing in [beta, foreign, Uuid::new_v4()] {
        let result = lifecycle
            .create_task(&owner, &TaskPayloadBuilder::new("Nope").with_project(missing).build())
            .await;
        assert_error(
            &result,
            ErrorKind::NotFound,
            &format!("Project with id {missing} not found"),
        );
    }

    let extra = lifecycle
        .create_task(
            &owner,
            &TaskPayloadBuilder::new("Sneaky")
                .with_field("ownerId", json!(OWNER_B))
                .with_field("isDeleted", json!(true))
                .build(),
        )
        .await;
    assert_error(
        &extra,
        ErrorKind::Validation,
        "Fields not allowed for task: isDeleted, ownerId",
    );
}

#[tokio::test]
async fn test_task_update_to_foreign_project_leaves_task_unmodified() {
    let (projects, tasks) = create_two_tenant_dataset();
    let foreign = projects[2].id;
    let task = tasks[0].clone();
    let (lifecycle, _, task_repo) = create_lifecycle_with(projects, tasks);

    let result = lifecycle
        .update_task(
            &owner_a(),
            &task.id.to_string(),
            &TaskPayloadBuilder::new("Moved")
                .with_status(TaskStatus::Done)
                .with_project(foreign)
                .build(),
        )
        .await;
    assert_error(
        &result,
        ErrorKind::NotFound,
        &format!("Project with id {foreign} not found"),
    );
    assert_eq!(task_repo.get(task.id).unwrap(), task);
}

#[tokio::test]
async fn test_task_update_replaces_writable_fields() {
    let (projects, tasks) = create_two_tenant_dataset();
    let task = tasks[0].clone();
    let (lifecycle, _, task_repo) = create_lifecycle_with(projects, tasks);

    let updated = lifecycle
        .update_task(
            &owner_a(),
            &task.id.to_string(),
            &TaskPayloadBuilder::new("Rewritten")
                .with_status(TaskStatus::Done)
                .with_due_date("2024-09-30")
                .build(),
        )
        .await
        .unwrap();
    assert_eq!(updated.message, "Task details updated successfully");

    let stored = task_repo.get(task.id).unwrap();
    assert_eq!(stored.title, "Rewritten");
    assert_eq!(stored.status, TaskStatus::Done);
    assert_eq!(stored.priority, TaskPriority::Low);
    assert_eq!(stored.project_id, None, "Omitted projectId clears the reference");
    assert_eq!(stored.created_at, task.created_at);
}

#[tokio::test]
async fn test_project_delete_severs_task_references() {
    let (projects, tasks) = create_two_tenant_dataset();
    let alpha = projects[0].id;
    let (lifecycle, _, task_repo) = create_lifecycle_with(projects, tasks);
    let owner = owner_a();

    lifecycle
        .delete_project(&owner, &alpha.to_string())
        .await
        .unwrap();
    task_repo.assert_called("clear_project_refs");

    let detached: Vec<_> = task_repo
        .snapshot()
        .into_iter()
        .filter(|t| t.owner_id == owner && t.title.contains("report") && t.is_active())
        .collect();
    assert_eq!(detached.len(), 2);
    detached.iter().for_each(assert_task_detached);

    for task in &detached {
        let fetched = lifecycle
            .get_task(&owner, &task.id.to_string())
            .await
            .unwrap();
        assert!(fetched.data.project_id.is_none());
    }

    // The other owner's project of the same name is untouched
    let foreign = task_repo
        .snapshot()
        .into_iter()
        .find(|t| t.title == "Foreign report")
        .unwrap();
    assert!(foreign.project_id.is_some());
}

#[tokio::test]
async fn test_cascade_failure_still_reports_delete_and_reconcile_repairs() {
    let (projects, tasks) = create_two_tenant_dataset();
    let alpha = projects[0].id;
    let (lifecycle, project_repo, task_repo) = create_lifecycle_with(projects, tasks);
    let owner = owner_a();

    task_repo.inject_error(TrackerError::Database("connection reset".to_string()));
    let deleted = lifecycle
        .delete_project(&owner, &alpha.to_string())
        .await
        .unwrap();
    assert_eq!(deleted.message, "Project deleted successfully");
    assert!(project_repo
        .snapshot()
        .iter()
        .any(|p| p.id == alpha && p.is_deleted));

    // References survive in storage but read as null
    assert!(task_repo
        .snapshot()
        .iter()
        .any(|t| t.project_id == Some(alpha)));
    let listed = lifecycle.list_tasks(&owner, &[]).await.unwrap();
    assert!(listed.data.iter().all(|t| t.project_id.is_none()));

    // Alpha's three tasks plus the one pointing at the deleted Beta
    let report = lifecycle.reconcile_orphaned_tasks(&owner).await.unwrap();
    assert_eq!(report.cleared, 4);
    let again = lifecycle.reconcile_orphaned_tasks(&owner).await.unwrap();
    assert_eq!(again.cleared, 0);

    assert!(task_repo
        .snapshot()
        .iter()
        .filter(|t| t.owner_id == owner && t.is_active())
        .all(|t| t.project_id.is_none()));
    let foreign = lifecycle.reconcile_orphaned_tasks(&owner_b()).await.unwrap();
    assert_eq!(foreign.cleared, 0);
}

#[tokio::test]
async fn test_task_delete_is_terminal() {
    let (projects, tasks) = create_two_tenant_dataset();
    let task_id = tasks[1].id.to_string();
    let (lifecycle, _, _) = create_lifecycle_with(projects, tasks);
    let owner = owner_a();

    let deleted = lifecycle.delete_task(&owner, &task_id).await.unwrap();
    assert_eq!(deleted.message, "Task deleted successfully");

    assert_error_kind(&lifecycle.get_task(&owner, &task_id).await, ErrorKind::NotFound);
    assert_error(
        &lifecycle.delete_task(&owner, &task_id).await,
        ErrorKind::NotFound,
        &format!("Task with id {task_id} not found"),
    );
    let listed = lifecycle.list_tasks(&owner, &[]).await.unwrap();
    assert_eq!(listed.meta.total_data, 3);
}

#[tokio::test]
async fn test_repository_failures_surface_as_internal() {
    let (lifecycle, projects, _) = create_lifecycle();
    projects.inject_error(TrackerError::Database("disk I/O error".to_string()));

    let result = lifecycle.list_projects(&owner_a(), &[]).await;
    assert_error(&result, ErrorKind::Internal, "Internal server error");
    if let Err(e) = result {
        assert_eq!(e.status_code(), 500);
        assert!(e.internal_message().contains("disk I/O error"));
    }
}

#[tokio::test]
async fn test_health_check() {
    let (lifecycle, projects, tasks) = create_lifecycle();
    lifecycle.health_check().await.unwrap();
    projects.assert_called("health_check");
    tasks.assert_called("health_check");
}
