//! SQLite persistence for the project/task tracker
//!
//! Implements [`ProjectRepository`] and [`TaskRepository`] over a shared
//! SQLite pool. Filters from `tracker-core` are rendered to SQL with every
//! value bound as a parameter and every column name taken from the field
//! registry.
//!
//! # Features
//!
//! - WAL mode for file databases, a pinned single connection for `:memory:`
//! - Embedded migrations, including the partial unique index on active project names
//! - Unique constraint violations surface as `TrackerError::Conflict`
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use database::SqliteStore;
//! use tracker_core::ResourceLifecycle;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = SqliteStore::new("sqlite::memory:").await?;
//!     store.migrate().await?;
//!
//!     let lifecycle = ResourceLifecycle::new(Arc::new(store.projects()), Arc::new(store.tasks()));
//!     lifecycle.health_check().await?;
//!     println!("Database is healthy!");
//!
//!     Ok(())
//! }
//! ```

mod common;
mod sqlite;

pub use sqlite::{SqliteProjectRepository, SqliteStore, SqliteTaskRepository, StoreOptions};

// Re-export commonly used types from tracker-core for convenience
pub use tracker_core::{
    error::{Result, TrackerError},
    models::{OwnerId, Project, ProjectInput, Task, TaskInput},
    repository::{ProjectRepository, TaskRepository},
};
