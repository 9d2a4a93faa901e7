//! Mock implementations and test utilities for the project/task tracker
//!
//! This crate provides comprehensive testing infrastructure including:
//! - In-memory implementations of both repository traits
//! - Builders, fixtures and realistic random data
//! - Custom assertion helpers
//! - Property-based testing strategies
//! - Repository contract suites shared with the SQLite backend

pub mod assertions;
pub mod builders;
pub mod contracts;
pub mod fixtures;
pub mod generators;
pub mod repository;

pub use assertions::*;
pub use builders::*;
pub use contracts::*;
pub use fixtures::*;
pub use generators::*;
pub use repository::{MockProjectRepository, MockTaskRepository};
