use anyhow::{Context, Result};
use database::{SqliteProjectRepository, SqliteStore, SqliteTaskRepository};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracker_core::ResourceLifecycle;

use crate::config::Config;

/// The lifecycle service wired to SQLite
pub type AppLifecycle = ResourceLifecycle<SqliteProjectRepository, SqliteTaskRepository>;

/// Connect to the configured database and bring its schema up to date
pub async fn create_store(config: &Config) -> Result<SqliteStore> {
    let database_url = config.database_url();
    ensure_database_directory(&database_url).context("Failed to create database directory")?;

    info!("Initializing SQLite store at: {}", database_url);
    let store = SqliteStore::connect(&database_url, &config.store_options())
        .await
        .context("Failed to connect to SQLite database")?;

    store
        .migrate()
        .await
        .context("Failed to run database migrations")?;

    Ok(store)
}

/// Build the lifecycle service over an open store
pub fn create_lifecycle(store: &SqliteStore) -> AppLifecycle {
    ResourceLifecycle::new(Arc::new(store.projects()), Arc::new(store.tasks()))
}

/// Initialize the complete application
pub async fn initialize_app(config: &Config) -> Result<AppLifecycle> {
    let store = create_store(config)
        .await
        .context("Failed to create store")?;
    let lifecycle = create_lifecycle(&store);

    lifecycle
        .health_check()
        .await
        .context("Database health check failed")?;

    info!("Application initialized successfully");
    Ok(lifecycle)
}

/// Ensure the database directory exists, owner-only on Unix
pub fn ensure_database_directory(database_url: &str) -> Result<()> {
    let Some(db_path) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    if db_path.starts_with(":memory:") {
        return Ok(());
    }

    let db_path = Path::new(db_path);
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating database directory: {}", parent.display());
            std::fs::create_dir_all(parent).context("Failed to create database directory")?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let permissions = std::fs::Permissions::from_mode(0o700);
                std::fs::set_permissions(parent, permissions)
                    .context("Failed to set directory permissions")?;
            }
        }
    }

    if db_path.exists() {
        set_secure_file_permissions(db_path)?;
    }
    Ok(())
}

fn set_secure_file_permissions(file_path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(file_path, permissions)
            .with_context(|| format!("Failed to set permissions for {}", file_path.display()))?;
    }

    #[cfg(not(unix))]
    let _ = file_path;

    Ok(())
}
