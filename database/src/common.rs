use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite};
use tracker_core::{
    error::{Result, TrackerError},
    fields::{EntityType, FieldRegistry},
    models::{OwnerId, Project, Task},
    pagination::Pagination,
    query::{fold_case, Clause, Filter, Value},
};
use uuid::Uuid;

pub const PROJECT_COLUMNS: &str =
    "id, name, description, owner_id, is_deleted, deleted_at, created_at, updated_at";

pub const TASK_COLUMNS: &str = "id, title, description, status, priority, due_date, owner_id, \
     project_id, is_deleted, deleted_at, created_at, updated_at";

/// Table holding rows of an entity type
pub fn table(entity: EntityType) -> &'static str {
    match entity {
        EntityType::Project => "projects",
        EntityType::Task => "tasks",
    }
}

fn decode<'r, T>(row: &'r SqliteRow, column: &str) -> Result<T>
where
    T: sqlx::Decode<'r, Sqlite> + sqlx::Type<Sqlite>,
{
    row.try_get(column)
        .map_err(|e| TrackerError::Database(format!("Failed to read column {column}: {e}")))
}

fn decode_id(row: &SqliteRow, column: &str) -> Result<Uuid> {
    let text: String = decode(row, column)?;
    Uuid::parse_str(&text)
        .map_err(|_| TrackerError::Database(format!("Invalid id in column {column}: {text}")))
}

fn decode_optional_id(row: &SqliteRow, column: &str) -> Result<Option<Uuid>> {
    let text: Option<String> = decode(row, column)?;
    text.map(|text| {
        Uuid::parse_str(&text)
            .map_err(|_| TrackerError::Database(format!("Invalid id in column {column}: {text}")))
    })
    .transpose()
}

/// Convert SQLite row to Project model
pub fn row_to_project(row: &SqliteRow) -> Result<Project> {
    Ok(Project {
        id: decode_id(row, "id")?,
        name: decode(row, "name")?,
        description: decode(row, "description")?,
        owner_id: OwnerId::new(decode::<String>(row, "owner_id")?),
        is_deleted: decode(row, "is_deleted")?,
        deleted_at: decode::<Option<DateTime<Utc>>>(row, "deleted_at")?,
        created_at: decode(row, "created_at")?,
        updated_at: decode(row, "updated_at")?,
    })
}

/// Convert SQLite row to Task model
pub fn row_to_task(row: &SqliteRow) -> Result<Task> {
    let status: String = decode(row, "status")?;
    let priority: String = decode(row, "priority")?;

    Ok(Task {
        id: decode_id(row, "id")?,
        title: decode(row, "title")?,
        description: decode(row, "description")?,
        status: status
            .parse()
            .map_err(|_| TrackerError::Database(format!("Invalid task status in database: {status}")))?,
        priority: priority.parse().map_err(|_| {
            TrackerError::Database(format!("Invalid task priority in database: {priority}"))
        })?,
        due_date: decode(row, "due_date")?,
        owner_id: OwnerId::new(decode::<String>(row, "owner_id")?),
        project_id: decode_optional_id(row, "project_id")?,
        is_deleted: decode(row, "is_deleted")?,
        deleted_at: decode::<Option<DateTime<Utc>>>(row, "deleted_at")?,
        created_at: decode(row, "created_at")?,
        updated_at: decode(row, "updated_at")?,
    })
}

/// Convert SQLx error to TrackerError
pub fn sqlx_error_to_tracker_error(err: sqlx::Error) -> TrackerError {
    match &err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code().unwrap_or_default();
            let message = db_err.message();

            // SQLITE_CONSTRAINT_UNIQUE / SQLITE_CONSTRAINT_PRIMARYKEY
            if code == "2067" || code == "1555" || message.contains("UNIQUE constraint failed") {
                TrackerError::Conflict(message.to_string())
            } else {
                TrackerError::Database(format!("Database constraint error: {message}"))
            }
        }
        sqlx::Error::RowNotFound => {
            TrackerError::Database("Unexpected RowNotFound error".to_string())
        }
        sqlx::Error::PoolTimedOut => TrackerError::Database("Connection pool timeout".to_string()),
        sqlx::Error::Io(io_err) => TrackerError::Database(format!("Database I/O error: {io_err}")),
        _ => TrackerError::Database(format!("Database operation failed: {err}")),
    }
}

fn column(entity: EntityType, field: &str) -> Result<&'static str> {
    FieldRegistry::column(entity, field)
        .ok_or_else(|| TrackerError::Internal(format!("No column for {entity} field '{field}'")))
}

/// Column holding the `fold_case` copy of a free-text field, if it has one
fn folded_column(entity: EntityType, field: &str) -> Option<&'static str> {
    match (entity, field) {
        (EntityType::Project, "name") => Some("name_folded"),
        (EntityType::Task, "title") => Some("title_folded"),
        (_, "description") => Some("description_folded"),
        _ => None,
    }
}

fn push_value(query_builder: &mut QueryBuilder<'static, Sqlite>, value: &Value) {
    match value {
        Value::Null => {
            query_builder.push("NULL");
        }
        Value::Bool(flag) => {
            query_builder.push_bind(*flag);
        }
        Value::Text(text) => {
            query_builder.push_bind(text.clone());
        }
        Value::Id(id) => {
            query_builder.push_bind(id.to_string());
        }
        Value::Timestamp(ts) => {
            query_builder.push_bind(*ts);
        }
    }
}

/// Append the filter as a WHERE clause with bound parameters.
///
/// Column names come from the field registry only; every value is bound.
pub fn push_filter(query_builder: &mut QueryBuilder<'static, Sqlite>, filter: &Filter) -> Result<()> {
    for (i, clause) in filter.clauses().iter().enumerate() {
        query_builder.push(if i == 0 { " WHERE " } else { " AND " });
        let column = column(filter.entity(), clause.field())?;

        match clause {
            Clause::Eq { value, .. } if value.is_null() => {
                query_builder.push(format!("{column} IS NULL"));
            }
            Clause::Eq { value, .. } => {
                query_builder.push(format!("{column} = "));
                push_value(query_builder, value);
            }
            Clause::NotEq { value, .. } if value.is_null() => {
                query_builder.push(format!("{column} IS NOT NULL"));
            }
            Clause::NotEq { value, .. } => {
                query_builder.push(format!("({column} IS NOT NULL AND {column} <> "));
                push_value(query_builder, value);
                query_builder.push(")");
            }
            Clause::In { values, .. } if values.is_empty() => {
                query_builder.push("1 = 0");
            }
            Clause::In { values, .. } => {
                query_builder.push(format!("{column} IN ("));
                for (j, value) in values.iter().enumerate() {
                    if j > 0 {
                        query_builder.push(", ");
                    }
                    push_value(query_builder, value);
                }
                query_builder.push(")");
            }
            Clause::ContainsIgnoreCase { field, needle } => {
                // INSTR keeps LIKE wildcards literal. Enum columns are ASCII, so
                // LOWER() is enough for them.
                match folded_column(filter.entity(), field) {
                    Some(folded) => query_builder.push(format!("INSTR({folded}, ")),
                    None => query_builder.push(format!("INSTR(LOWER({column}), ")),
                };
                query_builder.push_bind(fold_case(needle));
                query_builder.push(") > 0");
            }
            Clause::Range { start, end, .. } => {
                query_builder.push(format!("({column} >= "));
                query_builder.push_bind(*start);
                query_builder.push(format!(" AND {column} < "));
                query_builder.push_bind(*end);
                query_builder.push(")");
            }
        }
    }
    Ok(())
}

/// Append ORDER BY and, when paging, LIMIT/OFFSET
pub fn push_order(
    query_builder: &mut QueryBuilder<'static, Sqlite>,
    entity: EntityType,
    pagination: Option<&Pagination>,
) -> Result<()> {
    let Some(pagination) = pagination else {
        query_builder.push(" ORDER BY created_at ASC, id ASC");
        return Ok(());
    };

    let column = column(entity, pagination.sort.field)?;
    query_builder.push(format!(
        " ORDER BY {column} {}, id ASC",
        pagination.sort.order.as_sql()
    ));
    query_builder.push(" LIMIT ");
    query_builder.push_bind(i64::from(pagination.limit));
    query_builder.push(" OFFSET ");
    query_builder.push_bind(pagination.skip() as i64);
    Ok(())
}

/// `SELECT <columns> FROM <table> WHERE <filter>`
pub fn build_select(columns: &str, filter: &Filter) -> Result<QueryBuilder<'static, Sqlite>> {
    let mut query_builder =
        QueryBuilder::new(format!("SELECT {columns} FROM {}", table(filter.entity())));
    push_filter(&mut query_builder, filter)?;
    Ok(query_builder)
}

/// `WHERE id = (first row matching the filter)`, so an update touches one row at most
pub fn push_single_row_target(
    query_builder: &mut QueryBuilder<'static, Sqlite>,
    filter: &Filter,
) -> Result<()> {
    query_builder.push(format!(" WHERE id = (SELECT id FROM {}", table(filter.entity())));
    push_filter(query_builder, filter)?;
    query_builder.push(" LIMIT 1)");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sqlx::Execute;
    use tracker_core::{pagination::SortOrder, pagination::SortSpec, ResourceAccessGuard};

    #[test]
    fn test_filter_rendering() {
        let guard = ResourceAccessGuard::new(OwnerId::new("u1"));
        let filter = guard
            .visible(EntityType::Task)
            .eq("projectId", Value::Null)
            .and(Clause::ContainsIgnoreCase {
                field: "title",
                needle: "report".to_string(),
            })
            .and(Clause::Range {
                field: "dueDate",
                start: Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap(),
                end: Utc.with_ymd_and_hms(2024, 4, 2, 0, 0, 0).unwrap(),
            });

        let mut query_builder = build_select("id", &filter).unwrap();
        let query = query_builder.build();
        let sql = query.sql();
        assert!(sql.starts_with("SELECT id FROM tasks WHERE owner_id = "));
        assert!(sql.contains("AND is_deleted = "));
        assert!(sql.contains("AND project_id IS NULL"));
        assert!(sql.contains("INSTR(title_folded, ?) > 0"));
        assert!(sql.contains("(due_date >= "));
        assert!(!sql.contains("report"), "values must be bound, not inlined");
    }

    #[test]
    fn test_search_uses_folded_columns() {
        let filter = Filter::new(EntityType::Task)
            .and(Clause::ContainsIgnoreCase {
                field: "description",
                needle: "ÉCOLE".to_string(),
            })
            .and(Clause::ContainsIgnoreCase {
                field: "status",
                needle: "progress".to_string(),
            });

        let mut query_builder = build_select("id", &filter).unwrap();
        let query = query_builder.build();
        let sql = query.sql();
        assert!(sql.contains("INSTR(description_folded, ?) > 0"));
        assert!(sql.contains("INSTR(LOWER(status), ?) > 0"));
    }

    #[test]
    fn test_in_and_not_eq_rendering() {
        let filter = Filter::new(EntityType::Project)
            .is_in("id", vec![Value::Id(Uuid::nil()), Value::Id(Uuid::nil())])
            .not_eq("id", Value::Id(Uuid::nil()))
            .is_in("name", Vec::new());

        let mut query_builder = build_select("id", &filter).unwrap();
        let query = query_builder.build();
        let sql = query.sql();
        assert!(sql.contains("id IN (?, ?)"));
        assert!(sql.contains("(id IS NOT NULL AND id <> ?)"));
        assert!(sql.ends_with("1 = 0"));
    }

    #[test]
    fn test_order_rendering() {
        let pagination = Pagination {
            page: 3,
            limit: 20,
            sort: SortSpec {
                field: "dueDate",
                order: SortOrder::Asc,
            },
        };
        let mut query_builder = build_select("id", &Filter::new(EntityType::Task)).unwrap();
        push_order(&mut query_builder, EntityType::Task, Some(&pagination)).unwrap();
        let query = query_builder.build();
        assert!(query
            .sql()
            .ends_with("ORDER BY due_date ASC, id ASC LIMIT ? OFFSET ?"));
    }

    #[test]
    fn test_unregistered_field_is_internal_error() {
        let filter = Filter::new(EntityType::Project).eq("projectId", Value::Null);
        let error = build_select("id", &filter)
            .err()
            .expect("expected an error for unregistered field");
        assert!(matches!(error, TrackerError::Internal(_)));
    }
}
