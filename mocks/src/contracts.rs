//! Contract test helpers for validating repository implementations
//!
//! Provides standardized tests that any implementation of the repository
//! traits should pass, so the in-memory and SQLite backends agree on filter,
//! sort, paging, soft-delete and reference-clearing behavior.
//!
//! Each suite expects an empty store.

use chrono::{Duration, TimeZone, Utc};
use tracker_core::{
    Clause, EntityType, Filter, OwnerId, Pagination, ProjectInput, ProjectRepository,
    QueryFilterBuilder, ResourceAccessGuard, SearchParams, SortOrder, SortSpec, TaskInput,
    TaskRepository, TaskStatus, Value,
};

/// Test any ProjectRepository implementation with the full contract
pub async fn test_project_repository_contract<R: ProjectRepository>(repo: &R) {
    test_project_insert_contract(repo).await;
    test_project_filter_contract(repo).await;
    test_project_unicode_search_contract(repo).await;
    test_project_update_contract(repo).await;
    test_project_soft_delete_contract(repo).await;
    test_health_check_contract(repo.health_check().await);
}

/// Test any TaskRepository implementation with the full contract
pub async fn test_task_repository_contract<R: TaskRepository>(repo: &R) {
    test_task_insert_contract(repo).await;
    test_task_paging_contract(repo).await;
    test_task_search_contract(repo).await;
    test_clear_project_refs_contract(repo).await;
    test_health_check_contract(repo.health_check().await);
}

fn guard(owner: &str) -> ResourceAccessGuard {
    ResourceAccessGuard::new(OwnerId::new(owner))
}

/// Insert assigns identity and timestamps; names are unique per owner
pub async fn test_project_insert_contract<R: ProjectRepository>(repo: &R) {
    let owner = OwnerId::new("contract-insert");
    let input = ProjectInput {
        name: "Alpha".to_string(),
        description: Some("First".to_string()),
    };
    let project = repo
        .insert(&owner, input.clone())
        .await
        .expect("Insert should succeed");

    assert_eq!(project.name, "Alpha");
    assert_eq!(project.description.as_deref(), Some("First"));
    assert_eq!(project.owner_id, owner);
    assert!(project.is_active(), "New project should be Active");
    assert!(project.deleted_at.is_none());
    assert_eq!(project.created_at, project.updated_at);

    let duplicate = repo.insert(&owner, input.clone()).await;
    match duplicate {
        Err(e) => assert!(e.is_conflict(), "Expected Conflict, got: {e:?}"),
        Ok(_) => panic!("Should reject duplicate name for the same owner"),
    }

    repo.insert(&OwnerId::new("contract-insert-other"), input)
        .await
        .expect("Same name for another owner should succeed");

    let stored = repo
        .find_one(&guard("contract-insert").visible_one(EntityType::Project, project.id))
        .await
        .expect("Find should succeed")
        .expect("Inserted project should be found");
    assert_eq!(stored.id, project.id);
    assert_eq!(stored.name, project.name);
}

/// Ownership scoping, text search and counts
pub async fn test_project_filter_contract<R: ProjectRepository>(repo: &R) {
    let owner = OwnerId::new("contract-filter");
    for name in ["Website Relaunch", "Mobile app", "website audit"] {
        repo.insert(&owner, ProjectInput::new(name))
            .await
            .expect("Insert should succeed");
    }
    repo.insert(&OwnerId::new("contract-filter-other"), ProjectInput::new("Website"))
        .await
        .expect("Insert should succeed");

    let visible = guard("contract-filter").visible(EntityType::Project);
    assert_eq!(repo.count(&visible).await.unwrap(), 3);

    let mut search = SearchParams::new();
    search.insert("name".to_string(), "WEBSITE".to_string());
    let filter = QueryFilterBuilder::build(visible, &search, EntityType::Project).unwrap();
    let found = repo.find(&filter, None).await.unwrap();
    assert_eq!(found.len(), 2, "Substring match should ignore case");
    assert!(found.iter().all(|p| p.owner_id == owner));

    // LIKE wildcards are literal
    let literal = guard("contract-filter")
        .visible(EntityType::Project)
        .and(Clause::ContainsIgnoreCase {
            field: "name",
            needle: "%".to_string(),
        });
    assert_eq!(repo.count(&literal).await.unwrap(), 0);
}

/// Case-insensitive search folds accented and other non-ASCII letters,
/// and stays current across a full replace
pub async fn test_project_unicode_search_contract<R: ProjectRepository>(repo: &R) {
    let owner = OwnerId::new("contract-unicode");
    let school = repo
        .insert(
            &owner,
            ProjectInput {
                name: "École Straße".to_string(),
                description: Some("Équipe NORDIQUE".to_string()),
            },
        )
        .await
        .expect("Insert should succeed");
    repo.insert(&owner, ProjectInput::new("Ecole primaire"))
        .await
        .expect("Insert should succeed");

    let g = guard("contract-unicode");
    let search = |field: &str, needle: &str| -> Filter {
        let mut params = SearchParams::new();
        params.insert(field.to_string(), needle.to_string());
        QueryFilterBuilder::build(g.visible(EntityType::Project), &params, EntityType::Project)
            .unwrap()
    };

    for needle in ["école", "ÉCOLE", "STRAßE", "le str"] {
        let found = repo.find(&search("name", needle), None).await.unwrap();
        assert_eq!(found.len(), 1, "'{needle}' should match only 'École Straße'");
        assert_eq!(found[0].id, school.id);
    }
    assert_eq!(repo.count(&search("name", "ecole")).await.unwrap(), 1);
    assert_eq!(
        repo.count(&search("description", "équipe nordique"))
            .await
            .unwrap(),
        1
    );

    repo.replace_one(
        &g.visible_one(EntityType::Project, school.id),
        ProjectInput::new("Öffentliche Bibliothek"),
    )
    .await
    .unwrap()
    .expect("Project should match");
    assert_eq!(repo.count(&search("name", "öffentliche")).await.unwrap(), 1);
    assert_eq!(repo.count(&search("name", "école")).await.unwrap(), 0);
    assert_eq!(repo.count(&search("description", "équipe")).await.unwrap(), 0);
}

/// Full replace of writable fields
pub async fn test_project_update_contract<R: ProjectRepository>(repo: &R) {
    let owner = OwnerId::new("contract-update");
    let project = repo
        .insert(
            &owner,
            ProjectInput {
                name: "Draft".to_string(),
                description: Some("Old".to_string()),
            },
        )
        .await
        .unwrap();
    repo.insert(&owner, ProjectInput::new("Taken")).await.unwrap();

    let filter = guard("contract-update").visible_one(EntityType::Project, project.id);
    let updated = repo
        .replace_one(&filter, ProjectInput::new("Final"))
        .await
        .expect("Update should succeed")
        .expect("Project should match");
    assert_eq!(updated.id, project.id);
    assert_eq!(updated.name, "Final");
    assert_eq!(updated.description, None, "Replace should clear omitted fields");
    assert!(updated.updated_at >= project.updated_at);
    assert_eq!(updated.created_at, project.created_at);

    match repo.replace_one(&filter, ProjectInput::new("Taken")).await {
        Err(e) => assert!(e.is_conflict(), "Expected Conflict, got: {e:?}"),
        Ok(_) => panic!("Should reject renaming onto an Active project's name"),
    }

    let foreign = guard("someone-else").visible_one(EntityType::Project, project.id);
    assert!(repo
        .replace_one(&foreign, ProjectInput::new("Hijack"))
        .await
        .unwrap()
        .is_none());
}

/// Soft delete hides the row, frees the name and only happens once
pub async fn test_project_soft_delete_contract<R: ProjectRepository>(repo: &R) {
    let owner = OwnerId::new("contract-delete");
    let project = repo.insert(&owner, ProjectInput::new("Doomed")).await.unwrap();
    let g = guard("contract-delete");
    let at = Utc::now();

    let deleted = repo
        .soft_delete_one(&g.deletable_one(EntityType::Project, project.id), at)
        .await
        .unwrap()
        .expect("First delete should match");
    assert!(deleted.is_deleted);
    assert!(deleted.deleted_at.is_some());

    assert!(repo
        .soft_delete_one(&g.deletable_one(EntityType::Project, project.id), at)
        .await
        .unwrap()
        .is_none());
    assert!(repo
        .find_one(&g.visible_one(EntityType::Project, project.id))
        .await
        .unwrap()
        .is_none());

    repo.insert(&owner, ProjectInput::new("Doomed"))
        .await
        .expect("Name of a deleted project should be reusable");
}

pub async fn test_task_insert_contract<R: TaskRepository>(repo: &R) {
    let owner = OwnerId::new("contract-task-insert");
    let due = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
    let project_id = uuid::Uuid::new_v4();
    let input = TaskInput {
        project_id: Some(project_id),
        ..TaskInput::new("Write tests", due)
    };
    let task = repo.insert(&owner, input).await.expect("Insert should succeed");

    assert_eq!(task.title, "Write tests");
    assert_eq!(task.status, TaskStatus::ToDo);
    assert_eq!(task.due_date, due);
    assert_eq!(task.project_id, Some(project_id));
    assert!(task.is_active());

    let stored = repo
        .find_one(&guard("contract-task-insert").visible_one(EntityType::Task, task.id))
        .await
        .unwrap()
        .expect("Inserted task should be found");
    assert_eq!(stored.due_date, due, "Timestamps should survive storage");
    assert_eq!(stored.project_id, Some(project_id));
}

/// Sorting, skip and limit, with counts unaffected by paging
pub async fn test_task_paging_contract<R: TaskRepository>(repo: &R) {
    let owner = OwnerId::new("contract-paging");
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    for i in 0..7 {
        repo.insert(
            &owner,
            TaskInput::new(format!("Task {i}"), base + Duration::days(i)),
        )
        .await
        .unwrap();
    }

    let filter = guard("contract-paging").visible(EntityType::Task);
    assert_eq!(repo.count(&filter).await.unwrap(), 7);

    let pagination = Pagination {
        page: 2,
        limit: 3,
        sort: SortSpec {
            field: "dueDate",
            order: SortOrder::Asc,
        },
    };
    let page = repo.find(&filter, Some(&pagination)).await.unwrap();
    let titles: Vec<&str> = page.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["Task 3", "Task 4", "Task 5"]);

    let last = Pagination { page: 3, ..pagination };
    assert_eq!(repo.find(&filter, Some(&last)).await.unwrap().len(), 1);

    let beyond = Pagination { page: 4, ..pagination };
    assert!(repo.find(&filter, Some(&beyond)).await.unwrap().is_empty());

    let newest_first = Pagination {
        page: 1,
        limit: 2,
        sort: SortSpec {
            field: "dueDate",
            order: SortOrder::Desc,
        },
    };
    let page = repo.find(&filter, Some(&newest_first)).await.unwrap();
    assert_eq!(page[0].title, "Task 6");
    assert_eq!(page[1].title, "Task 5");
}

/// Date-day, identifier and enum-text search semantics
pub async fn test_task_search_contract<R: TaskRepository>(repo: &R) {
    let owner = OwnerId::new("contract-search");
    let project_id = uuid::Uuid::new_v4();
    let late_evening = Utc.with_ymd_and_hms(2024, 6, 1, 23, 59, 59).unwrap();
    let next_midnight = Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap();

    repo.insert(
        &owner,
        TaskInput {
            status: TaskStatus::InProgress,
            project_id: Some(project_id),
            ..TaskInput::new("Evening", late_evening)
        },
    )
    .await
    .unwrap();
    repo.insert(&owner, TaskInput::new("Midnight", next_midnight))
        .await
        .unwrap();

    let base = guard("contract-search").visible(EntityType::Task);
    let search = |pairs: &[(&str, &str)]| -> Filter {
        let params: SearchParams = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        QueryFilterBuilder::build(base.clone(), &params, EntityType::Task).unwrap()
    };

    let on_first = repo.find(&search(&[("dueDate", "2024-06-01")]), None).await.unwrap();
    assert_eq!(on_first.len(), 1);
    assert_eq!(on_first[0].title, "Evening");

    let on_second = repo.find(&search(&[("dueDate", "2024-06-02")]), None).await.unwrap();
    assert_eq!(on_second.len(), 1);
    assert_eq!(on_second[0].title, "Midnight");

    let project_text = project_id.to_string();
    assert_eq!(
        repo.count(&search(&[("projectId", project_text.as_str())]))
            .await
            .unwrap(),
        1
    );
    assert_eq!(repo.count(&search(&[("status", "progress")])).await.unwrap(), 1);
    assert_eq!(repo.count(&search(&[("status", "to-do")])).await.unwrap(), 1);

    let unassigned = base.clone().eq("projectId", Value::Null);
    assert_eq!(repo.count(&unassigned).await.unwrap(), 1);

    repo.insert(
        &owner,
        TaskInput {
            description: Some("Préparer l'ORDRE DU JOUR".to_string()),
            ..TaskInput::new("Réunion d'ÉQUIPE", next_midnight)
        },
    )
    .await
    .unwrap();
    assert_eq!(repo.count(&search(&[("title", "réunion d'équipe")])).await.unwrap(), 1);
    assert_eq!(repo.count(&search(&[("title", "RÉUNION")])).await.unwrap(), 1);
    assert_eq!(repo.count(&search(&[("description", "préparer")])).await.unwrap(), 1);
    assert_eq!(repo.count(&search(&[("title", "reunion")])).await.unwrap(), 0);
}

/// Bulk reference clearing touches only matching tasks and is idempotent
pub async fn test_clear_project_refs_contract<R: TaskRepository>(repo: &R) {
    let owner = OwnerId::new("contract-clear");
    let other = OwnerId::new("contract-clear-other");
    let due = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
    let project_id = uuid::Uuid::new_v4();
    let linked = |title: &str| TaskInput {
        project_id: Some(project_id),
        ..TaskInput::new(title, due)
    };

    for title in ["One", "Two", "Three"] {
        repo.insert(&owner, linked(title)).await.unwrap();
    }
    let foreign = repo.insert(&other, linked("Foreign")).await.unwrap();

    let g = guard("contract-clear");
    let referencing = g
        .visible(EntityType::Task)
        .eq("projectId", Value::Id(project_id));
    assert_eq!(repo.clear_project_refs(&referencing).await.unwrap(), 3);
    assert_eq!(repo.clear_project_refs(&referencing).await.unwrap(), 0);

    let remaining = repo
        .find(&g.visible(EntityType::Task), None)
        .await
        .unwrap();
    assert_eq!(remaining.len(), 3, "Tasks should stay Active");
    assert!(remaining.iter().all(|t| t.project_id.is_none()));

    let untouched = repo
        .find_one(&guard("contract-clear-other").visible_one(EntityType::Task, foreign.id))
        .await
        .unwrap()
        .expect("Foreign task should exist");
    assert_eq!(untouched.project_id, Some(project_id));
}

pub fn test_health_check_contract(result: tracker_core::Result<()>) {
    assert!(result.is_ok(), "Health check should succeed: {result:?}");
}
