//! Tracker server library
//!
//! Configuration loading, telemetry, application wiring and the error boundary
//! behind the `tracker` binary. The binary drives the lifecycle services on
//! behalf of an owner whose identity was verified upstream.

pub mod boundary;
pub mod cli;
pub mod config;
pub mod setup;
pub mod telemetry;

pub use boundary::{handle_error, ErrorBody};
pub use cli::{dispatch, Cli, Command, ResourceAction};
pub use config::Config;
pub use setup::{
    create_lifecycle, create_store, ensure_database_directory, initialize_app, AppLifecycle,
};
pub use telemetry::init_telemetry;
