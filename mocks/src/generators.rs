//! Random test data generators using the fake crate
//!
//! Provides realistic random data including:
//! - Project names and task titles
//! - Owner ids from a small pool
//! - Property-based testing strategies for pagination and search input

use chrono::{Duration, TimeZone, Utc};
use fake::faker::lorem::en::{Paragraph, Sentence, Words};
use fake::Fake;
use proptest::prelude::*;
use rand::Rng;
use tracker_core::{Project, Task, TaskPriority, TaskStatus};

use crate::{ProjectBuilder, TaskBuilder};

/// Generate a realistic project name
pub fn generate_project_name() -> String {
    let words: Vec<String> = Words(2..4).fake();
    words.join(" ")
}

/// Generate a realistic task title
pub fn generate_task_title() -> String {
    Sentence(3..8).fake()
}

pub fn generate_description() -> String {
    Paragraph(1..3).fake()
}

/// Generate an owner id from a fixed pool
pub fn generate_owner() -> String {
    let owners = ["user-1", "user-2", "user-3"];
    owners[rand::thread_rng().gen_range(0..owners.len())].to_string()
}

pub fn generate_random_status() -> TaskStatus {
    TaskStatus::ALL[rand::thread_rng().gen_range(0..TaskStatus::ALL.len())]
}

pub fn generate_random_priority() -> TaskPriority {
    TaskPriority::ALL[rand::thread_rng().gen_range(0..TaskPriority::ALL.len())]
}

/// Generate a random Active project for `owner`
pub fn generate_random_project(owner: &str) -> Project {
    ProjectBuilder::new()
        .with_owner(owner)
        .with_name(generate_project_name())
        .with_description(Some(&generate_description()))
        .build()
}

/// Generate a random Active task for `owner` due within the next year
pub fn generate_random_task(owner: &str) -> Task {
    let days: i64 = (0..365).fake();
    TaskBuilder::new()
        .with_owner(owner)
        .with_title(generate_task_title())
        .with_status(generate_random_status())
        .with_priority(generate_random_priority())
        .with_due_date(Utc::now() + Duration::days(days))
        .build()
}

/// `count` tasks for `owner` with strictly increasing creation times
pub fn generate_task_series(owner: &str, count: usize) -> Vec<Task> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            TaskBuilder::new()
                .with_owner(owner)
                .with_title(format!("Task {i:03}"))
                .with_created_at(base + Duration::minutes(i as i64))
                .build()
        })
        .collect()
}

/// Proptest strategy for in-range (page, limit) pairs
pub fn page_limit_strategy() -> impl Strategy<Value = (u32, u32)> {
    (1u32..=50, 1u32..=100)
}

pub fn sort_order_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("asc"), Just("desc")]
}

/// Proptest strategy for task sortable fields
pub fn task_sort_field_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("title"),
        Just("status"),
        Just("priority"),
        Just("dueDate"),
        Just("createdAt"),
        Just("updatedAt"),
    ]
}

/// Proptest strategy for query keys no entity accepts
pub fn unknown_key_strategy() -> impl Strategy<Value = String> {
    "[a-z]{3,10}".prop_filter("must not be a known key", |key| {
        ![
            "page",
            "limit",
            "name",
            "title",
            "description",
            "status",
            "priority",
        ]
        .contains(&key.as_str())
    })
}
