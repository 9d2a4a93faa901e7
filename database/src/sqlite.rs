use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    QueryBuilder, Row, Sqlite, SqlitePool,
};
use tracker_core::{
    error::{Result, TrackerError},
    fields::EntityType,
    models::{OwnerId, Project, ProjectInput, Task, TaskInput},
    pagination::Pagination,
    query::{fold_case, Filter, Value},
    repository::{ProjectRepository, TaskRepository},
};
use uuid::Uuid;

use crate::common::{
    build_select, push_filter, push_order, push_single_row_target, row_to_project, row_to_task,
    sqlx_error_to_tracker_error, PROJECT_COLUMNS, TASK_COLUMNS,
};

/// Connection pool settings
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub max_connections: u32,
    pub connection_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            max_connections: 10,
            connection_timeout: Duration::from_secs(30),
        }
    }
}

/// Owner of the SQLite connection pool and schema
///
/// Hands out the project and task repositories, which share the pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect with default pool settings
    ///
    /// # Arguments
    /// * `database_url` - `sqlite://path`, a plain file path, or `sqlite::memory:`
    ///
    /// # Examples
    /// ```rust,no_run
    /// use database::SqliteStore;
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// // In-memory database for testing
    /// let store = SqliteStore::new("sqlite::memory:").await?;
    ///
    /// // File-based database
    /// let store = SqliteStore::new("sqlite:///tmp/tracker.db").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new(database_url: &str) -> Result<Self> {
        Self::connect(database_url, &StoreOptions::default()).await
    }

    /// Connect with explicit pool settings
    ///
    /// File databases are created if missing and run in WAL mode. An in-memory
    /// database lives in a single pooled connection that is never recycled, so
    /// every query sees the same data.
    ///
    /// # Returns
    /// * `Ok(SqliteStore)` - Successfully connected store
    /// * `Err(TrackerError::Database)` - If connection fails
    pub async fn connect(database_url: &str, options: &StoreOptions) -> Result<Self> {
        let location = database_url
            .strip_prefix("sqlite://")
            .or_else(|| database_url.strip_prefix("sqlite:"))
            .unwrap_or(database_url);

        let pool = if location.starts_with(":memory:") {
            let connect_options = SqliteConnectOptions::new()
                .filename(":memory:")
                .journal_mode(SqliteJournalMode::Memory)
                .busy_timeout(Duration::from_secs(5));
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .acquire_timeout(options.connection_timeout)
                .connect_with(connect_options)
                .await
        } else {
            let connect_options = SqliteConnectOptions::new()
                .filename(location)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(Duration::from_secs(5));
            SqlitePoolOptions::new()
                .max_connections(options.max_connections)
                .acquire_timeout(options.connection_timeout)
                .connect_with(connect_options)
                .await
        }
        .map_err(sqlx_error_to_tracker_error)?;

        tracing::info!(database = %location, "Connected to SQLite");
        Ok(Self { pool })
    }

    /// Run database migrations
    ///
    /// # Returns
    /// * `Ok(())` - Migrations completed successfully
    /// * `Err(TrackerError::Database)` - If migration fails
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations/sqlite")
            .run(&self.pool)
            .await
            .map_err(|e| TrackerError::Database(format!("Migration failed: {e}")))?;

        tracing::info!("Database migrations completed successfully");
        Ok(())
    }

    /// Get access to the underlying database pool for custom operations
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn projects(&self) -> SqliteProjectRepository {
        SqliteProjectRepository {
            pool: self.pool.clone(),
        }
    }

    pub fn tasks(&self) -> SqliteTaskRepository {
        SqliteTaskRepository {
            pool: self.pool.clone(),
        }
    }
}

fn ensure_entity(filter: &Filter, entity: EntityType) -> Result<()> {
    if filter.entity() == entity {
        Ok(())
    } else {
        Err(TrackerError::Internal(format!(
            "{} filter passed to the {entity} repository",
            filter.entity()
        )))
    }
}

async fn health_check(pool: &SqlitePool) -> Result<()> {
    sqlx::query("SELECT 1")
        .fetch_one(pool)
        .await
        .map_err(sqlx_error_to_tracker_error)?;
    Ok(())
}

async fn count(pool: &SqlitePool, filter: &Filter) -> Result<u64> {
    let mut query_builder = build_select("COUNT(*) AS total", filter)?;
    let row = query_builder
        .build()
        .fetch_one(pool)
        .await
        .map_err(sqlx_error_to_tracker_error)?;
    let total: i64 = row.try_get("total").map_err(sqlx_error_to_tracker_error)?;
    Ok(total as u64)
}

/// SQLite implementation of ProjectRepository
#[derive(Debug, Clone)]
pub struct SqliteProjectRepository {
    pool: SqlitePool,
}

impl SqliteProjectRepository {
    async fn fetch_updated(
        &self,
        mut query_builder: QueryBuilder<'static, Sqlite>,
        filter: &Filter,
    ) -> Result<Option<Project>> {
        push_single_row_target(&mut query_builder, filter)?;
        query_builder.push(format!(" RETURNING {PROJECT_COLUMNS}"));
        tracing::debug!(sql = query_builder.sql(), "Updating project");

        let row = query_builder
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(sqlx_error_to_tracker_error)?;
        row.as_ref().map(row_to_project).transpose()
    }
}

#[async_trait]
impl ProjectRepository for SqliteProjectRepository {
    async fn insert(&self, owner: &OwnerId, input: ProjectInput) -> Result<Project> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO projects (id, name, description, name_folded, description_folded, \
             owner_id, is_deleted, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?) RETURNING {PROJECT_COLUMNS}"
        );

        let row = sqlx::query(&sql)
            .bind(Uuid::new_v4().to_string())
            .bind(&input.name)
            .bind(&input.description)
            .bind(fold_case(&input.name))
            .bind(input.description.as_deref().map(fold_case))
            .bind(owner.as_str())
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(sqlx_error_to_tracker_error)?;

        row_to_project(&row)
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Project>> {
        ensure_entity(filter, EntityType::Project)?;
        let mut query_builder = build_select(PROJECT_COLUMNS, filter)?;
        query_builder.push(" LIMIT 1");

        let row = query_builder
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(sqlx_error_to_tracker_error)?;
        row.as_ref().map(row_to_project).transpose()
    }

    async fn find(&self, filter: &Filter, pagination: Option<&Pagination>) -> Result<Vec<Project>> {
        ensure_entity(filter, EntityType::Project)?;
        let mut query_builder = build_select(PROJECT_COLUMNS, filter)?;
        push_order(&mut query_builder, EntityType::Project, pagination)?;
        tracing::debug!(sql = query_builder.sql(), "Finding projects");

        let rows = query_builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(sqlx_error_to_tracker_error)?;
        rows.iter().map(row_to_project).collect()
    }

    async fn count(&self, filter: &Filter) -> Result<u64> {
        ensure_entity(filter, EntityType::Project)?;
        count(&self.pool, filter).await
    }

    async fn replace_one(&self, filter: &Filter, input: ProjectInput) -> Result<Option<Project>> {
        ensure_entity(filter, EntityType::Project)?;
        let mut query_builder = QueryBuilder::new("UPDATE projects SET name_folded = ");
        query_builder.push_bind(fold_case(&input.name));
        query_builder.push(", description_folded = ");
        query_builder.push_bind(input.description.as_deref().map(fold_case));
        query_builder.push(", name = ");
        query_builder.push_bind(input.name);
        query_builder.push(", description = ");
        query_builder.push_bind(input.description);
        query_builder.push(", updated_at = ");
        query_builder.push_bind(Utc::now());

        self.fetch_updated(query_builder, filter).await
    }

    async fn soft_delete_one(&self, filter: &Filter, at: DateTime<Utc>) -> Result<Option<Project>> {
        ensure_entity(filter, EntityType::Project)?;
        let active = filter.clone().eq("isDeleted", Value::Bool(false));
        let mut query_builder = QueryBuilder::new("UPDATE projects SET is_deleted = 1, deleted_at = ");
        query_builder.push_bind(at);
        query_builder.push(", updated_at = ");
        query_builder.push_bind(at);

        self.fetch_updated(query_builder, &active).await
    }

    async fn health_check(&self) -> Result<()> {
        health_check(&self.pool).await
    }
}

/// SQLite implementation of TaskRepository
#[derive(Debug, Clone)]
pub struct SqliteTaskRepository {
    pool: SqlitePool,
}

impl SqliteTaskRepository {
    async fn fetch_updated(
        &self,
        mut query_builder: QueryBuilder<'static, Sqlite>,
        filter: &Filter,
    ) -> Result<Option<Task>> {
        push_single_row_target(&mut query_builder, filter)?;
        query_builder.push(format!(" RETURNING {TASK_COLUMNS}"));
        tracing::debug!(sql = query_builder.sql(), "Updating task");

        let row = query_builder
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(sqlx_error_to_tracker_error)?;
        row.as_ref().map(row_to_task).transpose()
    }
}

#[async_trait]
impl TaskRepository for SqliteTaskRepository {
    async fn insert(&self, owner: &OwnerId, input: TaskInput) -> Result<Task> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO tasks (id, title, description, title_folded, description_folded, \
             status, priority, due_date, owner_id, project_id, is_deleted, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?) RETURNING {TASK_COLUMNS}"
        );

        let row = sqlx::query(&sql)
            .bind(Uuid::new_v4().to_string())
            .bind(&input.title)
            .bind(&input.description)
            .bind(fold_case(&input.title))
            .bind(input.description.as_deref().map(fold_case))
            .bind(input.status.as_str())
            .bind(input.priority.as_str())
            .bind(input.due_date)
            .bind(owner.as_str())
            .bind(input.project_id.map(|id| id.to_string()))
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(sqlx_error_to_tracker_error)?;

        row_to_task(&row)
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Task>> {
        ensure_entity(filter, EntityType::Task)?;
        let mut query_builder = build_select(TASK_COLUMNS, filter)?;
        query_builder.push(" LIMIT 1");

        let row = query_builder
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(sqlx_error_to_tracker_error)?;
        row.as_ref().map(row_to_task).transpose()
    }

    async fn find(&self, filter: &Filter, pagination: Option<&Pagination>) -> Result<Vec<Task>> {
        ensure_entity(filter, EntityType::Task)?;
        let mut query_builder = build_select(TASK_COLUMNS, filter)?;
        push_order(&mut query_builder, EntityType::Task, pagination)?;
        tracing::debug!(sql = query_builder.sql(), "Finding tasks");

        let rows = query_builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(sqlx_error_to_tracker_error)?;
        rows.iter().map(row_to_task).collect()
    }

    async fn count(&self, filter: &Filter) -> Result<u64> {
        ensure_entity(filter, EntityType::Task)?;
        count(&self.pool, filter).await
    }

    async fn replace_one(&self, filter: &Filter, input: TaskInput) -> Result<Option<Task>> {
        ensure_entity(filter, EntityType::Task)?;
        let mut query_builder = QueryBuilder::new("UPDATE tasks SET title_folded = ");
        query_builder.push_bind(fold_case(&input.title));
        query_builder.push(", description_folded = ");
        query_builder.push_bind(input.description.as_deref().map(fold_case));
        query_builder.push(", title = ");
        query_builder.push_bind(input.title);
        query_builder.push(", description = ");
        query_builder.push_bind(input.description);
        query_builder.push(", status = ");
        query_builder.push_bind(input.status.as_str());
        query_builder.push(", priority = ");
        query_builder.push_bind(input.priority.as_str());
        query_builder.push(", due_date = ");
        query_builder.push_bind(input.due_date);
        query_builder.push(", project_id = ");
        query_builder.push_bind(input.project_id.map(|id| id.to_string()));
        query_builder.push(", updated_at = ");
        query_builder.push_bind(Utc::now());

        self.fetch_updated(query_builder, filter).await
    }

    async fn soft_delete_one(&self, filter: &Filter, at: DateTime<Utc>) -> Result<Option<Task>> {
        ensure_entity(filter, EntityType::Task)?;
        let active = filter.clone().eq("isDeleted", Value::Bool(false));
        let mut query_builder = QueryBuilder::new("UPDATE tasks SET is_deleted = 1, deleted_at = ");
        query_builder.push_bind(at);
        query_builder.push(", updated_at = ");
        query_builder.push_bind(at);

        self.fetch_updated(query_builder, &active).await
    }

    async fn clear_project_refs(&self, filter: &Filter) -> Result<u64> {
        ensure_entity(filter, EntityType::Task)?;
        let linked = filter.clone().not_eq("projectId", Value::Null);
        let mut query_builder = QueryBuilder::new("UPDATE tasks SET project_id = NULL, updated_at = ");
        query_builder.push_bind(Utc::now());
        push_filter(&mut query_builder, &linked)?;
        tracing::debug!(sql = query_builder.sql(), "Clearing project references");

        let result = query_builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(sqlx_error_to_tracker_error)?;
        Ok(result.rows_affected())
    }

    async fn health_check(&self) -> Result<()> {
        health_check(&self.pool).await
    }
}
