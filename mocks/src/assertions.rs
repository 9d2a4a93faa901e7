//! Custom assertion helpers for testing
//!
//! Provides specialized assertions for:
//! - Error kinds and messages with clear failure output
//! - Ordering of listed records
//! - Page metadata

use tracker_core::{ErrorKind, PageMeta, Project, Record, Result, SortSpec, Task};

/// Assert a result failed with the given kind
pub fn assert_error_kind<T: std::fmt::Debug>(result: &Result<T>, expected: ErrorKind) {
    match result {
        Err(e) => assert_eq!(
            e.kind(),
            expected,
            "Expected {expected} but got {}: {e}",
            e.kind()
        ),
        Ok(value) => panic!("Expected {expected} but operation succeeded with {value:?}"),
    }
}

/// Assert a result failed with the given kind and exact user message
pub fn assert_error<T: std::fmt::Debug>(result: &Result<T>, expected: ErrorKind, message: &str) {
    assert_error_kind(result, expected);
    if let Err(e) = result {
        assert_eq!(e.user_message(), message, "Unexpected error message");
    }
}

/// Assert records are ordered under `sort`
pub fn assert_sorted_by<R: Record + std::fmt::Debug>(records: &[R], sort: &SortSpec) {
    for pair in records.windows(2) {
        assert!(
            sort.compare(&pair[0], &pair[1]) != std::cmp::Ordering::Greater,
            "Records out of order for {sort:?}: {:?} before {:?}",
            pair[0],
            pair[1]
        );
    }
}

/// Assert page metadata fields
pub fn assert_page_meta(meta: &PageMeta, page: u32, limit: u32, total_data: u64, total_pages: u64) {
    assert_eq!(meta.page, page, "page mismatch");
    assert_eq!(meta.limit, limit, "limit mismatch");
    assert_eq!(meta.total_data, total_data, "totalData mismatch");
    assert_eq!(meta.total_pages, total_pages, "totalPages mismatch");
}

/// Assert a stored project is soft-deleted
pub fn assert_project_deleted(project: &Project) {
    assert!(project.is_deleted, "Project {} should be deleted", project.id);
    assert!(
        project.deleted_at.is_some(),
        "Deleted project {} should carry deletedAt",
        project.id
    );
}

/// Assert a stored task is Active and no longer references any project
pub fn assert_task_detached(task: &Task) {
    assert!(task.is_active(), "Task {} should stay Active", task.id);
    assert!(
        task.project_id.is_none(),
        "Task {} should have no project, has {:?}",
        task.id,
        task.project_id
    );
}
