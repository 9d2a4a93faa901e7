//! Tracker Core Library
//!
//! Domain models, query construction, ownership scoping and the resource
//! lifecycle for a multi-tenant project/task tracker. Persistence backends
//! implement the repository traits defined here; the binary drives
//! [`ResourceLifecycle`].
//!
//! # Architecture
//!
//! - [`fields`] - Per-entity registry of sortable, searchable and writable fields
//! - [`query`] - Filter expressions and the search-parameter builder
//! - [`pagination`] - Page/limit/sort normalization
//! - [`access`] - Owner and visibility scoping of every filter
//! - [`lifecycle`] - Create, read, update and soft-delete with the project→task cascade
//! - [`validation`] - List query and write payload validation
//! - [`repository`] - Repository traits for data persistence
//! - [`models`], [`response`], [`error`] - Data types, envelopes and errors
//!
//! # Example
//!
//! ```rust
//! use tracker_core::{
//!     fields::EntityType,
//!     validation::ListQuery,
//! };
//!
//! let params = vec![
//!     ("title".to_string(), "report".to_string()),
//!     ("sortBy".to_string(), "dueDate".to_string()),
//! ];
//! let query = ListQuery::parse(EntityType::Task, &params).unwrap();
//! assert_eq!(query.pagination.limit, 10);
//! assert_eq!(query.search["title"], "report");
//! ```

pub mod access;
pub mod dates;
pub mod error;
pub mod fields;
pub mod lifecycle;
pub mod models;
pub mod pagination;
pub mod query;
pub mod repository;
pub mod response;
pub mod validation;

// Re-export commonly used types at the crate root for convenience
pub use access::ResourceAccessGuard;
pub use error::{ErrorKind, Result, TrackerError};
pub use fields::{EntityType, FieldClass, FieldRegistry};
pub use lifecycle::{ReconcileReport, ResourceLifecycle};
pub use models::{
    OwnerId, Project, ProjectInput, ProjectRef, ProjectView, Task, TaskInput, TaskPriority,
    TaskStatus, TaskView,
};
pub use pagination::{PageMeta, Pagination, PaginationSorter, SortOrder, SortSpec};
pub use query::{Clause, Filter, QueryFilterBuilder, Record, SearchParams, Value};
pub use repository::{ProjectRepository, TaskRepository};
pub use response::{ItemResponse, ListResponse, MessageResponse};
pub use validation::{InputValidator, ListQuery};

/// Current version of the core crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Current crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
