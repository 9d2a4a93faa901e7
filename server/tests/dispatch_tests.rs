//! Command dispatch over the in-memory repositories

use clap::Parser;
use mocks::{create_lifecycle_with, create_two_tenant_dataset};
use tracker_core::TrackerError;
use tracker_server::{dispatch, handle_error, Cli};

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["tracker"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

#[tokio::test]
async fn test_list_renders_envelope() {
    let (projects, tasks) = create_two_tenant_dataset();
    let (lifecycle, _, _) = create_lifecycle_with(projects, tasks);

    let cli = parse(&[
        "task", "list", "--owner", "user-a", "-p", "limit=2", "-p", "sortBy=title",
    ]);
    let output = dispatch(&lifecycle, &cli.command).await.unwrap();

    assert_eq!(output["message"], "Tasks fetched successfully");
    assert_eq!(output["meta"]["limit"], 2);
    assert_eq!(output["meta"]["totalData"], 4);
    assert_eq!(output["meta"]["totalPages"], 2);
    assert_eq!(output["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_reconcile_reports_cleared_count() {
    let (projects, tasks) = create_two_tenant_dataset();
    let (lifecycle, _, _) = create_lifecycle_with(projects, tasks);

    let cli = parse(&["reconcile", "--owner", "user-a"]);
    let first = dispatch(&lifecycle, &cli.command).await.unwrap();
    assert_eq!(first["cleared"], 1);
    assert_eq!(first["message"], "Orphaned task references reconciled successfully");

    let second = dispatch(&lifecycle, &cli.command).await.unwrap();
    assert_eq!(second["cleared"], 0);
}

#[tokio::test]
async fn test_storage_failure_becomes_internal_body() {
    let (lifecycle, projects, _) = mocks::create_lifecycle();
    projects.inject_error(TrackerError::Database("database is locked".to_string()));

    let cli = parse(&["project", "list", "--owner", "user-a"]);
    let error = dispatch(&lifecycle, &cli.command).await.unwrap_err();
    let body = handle_error(&error);

    assert_eq!(body.status, 500);
    assert_eq!(body.message, "Internal server error");
}

#[tokio::test]
async fn test_validation_failure_names_the_key() {
    let (lifecycle, _, _) = mocks::create_lifecycle();

    let cli = parse(&["task", "list", "--owner", "user-a", "-p", "assignee=me"]);
    let error = dispatch(&lifecycle, &cli.command).await.unwrap_err();
    let body = handle_error(&error);

    assert_eq!(body.status, 400);
    assert_eq!(body.message, "Invalid query parameters: assignee");
}
