use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value as Json};
use uuid::Uuid;

use crate::{
    dates::{parse_calendar_day, parse_timestamp},
    error::{Result, TrackerError},
    fields::{EntityType, FieldClass, FieldRegistry},
    models::{ProjectInput, TaskInput, TaskPriority, TaskStatus},
    pagination::{Pagination, PaginationSorter, RawPagination},
    query::SearchParams,
};

/// Query keys handled by pagination rather than search
pub const PAGINATION_KEYS: [&str; 4] = ["page", "limit", "sortBy", "sortOrder"];

const MAX_NAME_LEN: usize = 200;
const MAX_DESCRIPTION_LEN: usize = 2000;

/// A list request after validation: pagination plus search pairs
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub pagination: Pagination,
    pub search: SearchParams,
}

impl ListQuery {
    /// Validate raw query pairs for a list call on `entity`.
    ///
    /// Pairs come straight from the query string, so the same key may appear
    /// more than once. Repeated keys and keys that are neither pagination nor
    /// searchable are rejected together, naming every offender. Date values
    /// must be real calendar dates and identifier values must be UUIDs.
    ///
    /// # Returns
    /// * `Ok(ListQuery)` - Normalized pagination and one value per search key
    /// * `Err(TrackerError::Validation)` - If any key or value is rejected
    pub fn parse<K, V>(entity: EntityType, pairs: &[(K, V)]) -> Result<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut values: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (key, value) in pairs {
            values.entry(key.as_ref()).or_default().push(value.as_ref());
        }

        let searchable = FieldRegistry::searchable(entity);
        let offending: BTreeSet<&str> = values
            .iter()
            .filter(|&(&key, vals)| {
                vals.len() > 1 || !(PAGINATION_KEYS.contains(&key) || searchable.contains(key))
            })
            .map(|(key, _)| *key)
            .collect();
        if !offending.is_empty() {
            let keys: Vec<String> = offending.into_iter().map(str::to_string).collect();
            return Err(TrackerError::invalid_keys("Invalid query parameters", &keys));
        }

        let single = |key: &str| values.get(key).and_then(|vals| vals.first().copied());
        let pagination = PaginationSorter::normalize(
            entity,
            RawPagination {
                page: single("page"),
                limit: single("limit"),
                sort_by: single("sortBy"),
                sort_order: single("sortOrder"),
            },
        )?;

        let mut search = SearchParams::new();
        for (key, vals) in &values {
            if PAGINATION_KEYS.contains(key) {
                continue;
            }
            let value = vals[0];
            match searchable.classify(key) {
                Some(FieldClass::Date) if parse_calendar_day(value).is_none() => {
                    return Err(TrackerError::Validation(format!(
                        "Invalid date for '{key}': '{value}'"
                    )));
                }
                Some(FieldClass::Identifier) => {
                    parse_id(key, value)?;
                }
                _ => {}
            }
            search.insert(key.to_string(), value.to_string());
        }

        Ok(Self { pagination, search })
    }
}

/// Parse a caller-supplied identifier
pub fn parse_id(field: &str, value: &str) -> Result<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|_| TrackerError::invalid_id(field, value))
}

/// Validation of write payloads against the writable allow-list
pub struct InputValidator;

impl InputValidator {
    /// Reject any payload key outside `writable(entity)`, naming all of them
    pub fn check_writable(entity: EntityType, payload: &Map<String, Json>) -> Result<()> {
        let writable = FieldRegistry::writable(entity);
        let extra: Vec<String> = payload
            .keys()
            .filter(|key| !writable.contains(&key.as_str()))
            .cloned()
            .collect();
        if extra.is_empty() {
            Ok(())
        } else {
            Err(TrackerError::invalid_keys(
                &format!("Fields not allowed for {entity}"),
                &extra,
            ))
        }
    }

    /// Validate a project payload (create or full replace)
    pub fn project_input(payload: &Map<String, Json>) -> Result<ProjectInput> {
        Self::check_writable(EntityType::Project, payload)?;
        Ok(ProjectInput {
            name: required_text(payload, "name", MAX_NAME_LEN)?,
            description: optional_text(payload, "description", MAX_DESCRIPTION_LEN)?,
        })
    }

    /// Validate a task payload (create or full replace)
    ///
    /// Absent `status`/`priority` fall back to `To-Do`/`Low`; absent
    /// `projectId` means no project.
    pub fn task_input(payload: &Map<String, Json>) -> Result<TaskInput> {
        Self::check_writable(EntityType::Task, payload)?;

        let status = match optional_string(payload, "status")? {
            Some(value) => value.parse::<TaskStatus>()?,
            None => TaskStatus::default(),
        };
        let priority = match optional_string(payload, "priority")? {
            Some(value) => value.parse::<TaskPriority>()?,
            None => TaskPriority::default(),
        };
        let due_date = match optional_string(payload, "dueDate")? {
            Some(value) => parse_timestamp(value).ok_or_else(|| {
                TrackerError::Validation(format!("Invalid date for 'dueDate': '{value}'"))
            })?,
            None => return Err(TrackerError::empty_field("dueDate")),
        };
        let project_id = optional_string(payload, "projectId")?
            .map(|value| parse_id("projectId", value))
            .transpose()?;

        Ok(TaskInput {
            title: required_text(payload, "title", MAX_NAME_LEN)?,
            description: optional_text(payload, "description", MAX_DESCRIPTION_LEN)?,
            status,
            priority,
            due_date,
            project_id,
        })
    }
}

fn optional_string<'a>(payload: &'a Map<String, Json>, field: &str) -> Result<Option<&'a str>> {
    match payload.get(field) {
        None | Some(Json::Null) => Ok(None),
        Some(Json::String(value)) => Ok(Some(value)),
        Some(_) => Err(TrackerError::Validation(format!(
            "Field '{field}' must be a string"
        ))),
    }
}

fn required_text(payload: &Map<String, Json>, field: &str, max_len: usize) -> Result<String> {
    match optional_text(payload, field, max_len)? {
        Some(value) => Ok(value),
        None => Err(TrackerError::empty_field(field)),
    }
}

fn optional_text(payload: &Map<String, Json>, field: &str, max_len: usize) -> Result<Option<String>> {
    let Some(value) = optional_string(payload, field)? else {
        return Ok(None);
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > max_len {
        return Err(TrackerError::Validation(format!(
            "Field '{field}' must be at most {max_len} characters long"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Json) -> Map<String, Json> {
        match value {
            Json::Object(map) => map,
            _ => panic!("payload must be an object"),
        }
    }

    #[test]
    fn test_list_query_defaults_and_search() {
        let query = ListQuery::parse(
            EntityType::Task,
            &[("title", "report"), ("page", "2"), ("dueDate", "2024-06-01")],
        )
        .unwrap();
        assert_eq!(query.pagination.page, 2);
        assert_eq!(query.pagination.limit, 10);
        assert_eq!(query.search.len(), 2);
        assert_eq!(query.search["title"], "report");
    }

    #[test]
    fn test_list_query_rejects_unknown_keys() {
        let error = ListQuery::parse(EntityType::Project, &[("color", "red")]).unwrap_err();
        assert_eq!(
            error,
            TrackerError::Validation("Invalid query parameters: color".to_string())
        );
    }

    #[test]
    fn test_list_query_rejects_repeated_keys() {
        let error = ListQuery::parse(
            EntityType::Task,
            &[("status", "Done"), ("status", "To-Do"), ("limit", "5"), ("owner", "x")],
        )
        .unwrap_err();
        assert_eq!(
            error,
            TrackerError::Validation("Invalid query parameters: owner, status".to_string())
        );
    }

    #[test]
    fn test_list_query_rejects_bad_values() {
        assert!(ListQuery::parse(EntityType::Task, &[("dueDate", "2024-02-30")])
            .unwrap_err()
            .is_validation());
        assert!(ListQuery::parse(EntityType::Task, &[("projectId", "123")])
            .unwrap_err()
            .is_validation());
        assert!(ListQuery::parse(EntityType::Task, &[("limit", "500")])
            .unwrap_err()
            .is_validation());
        let error = ListQuery::parse(EntityType::Task, &[("sortBy", "projectId")]).unwrap_err();
        assert!(error.user_message().ends_with("projectId"));
    }

    #[test]
    fn test_project_input() {
        let input = InputValidator::project_input(&payload(json!({
            "name": "  Alpha  ",
            "description": "First project"
        })))
        .unwrap();
        assert_eq!(input.name, "Alpha");
        assert_eq!(input.description.as_deref(), Some("First project"));

        let error = InputValidator::project_input(&payload(json!({
            "name": "Alpha",
            "ownerId": "someone-else",
            "isDeleted": true
        })))
        .unwrap_err();
        assert!(error.is_validation());
        assert!(error.user_message().contains("ownerId"));
        assert!(error.user_message().contains("isDeleted"));

        assert!(InputValidator::project_input(&payload(json!({ "name": "   " }))).is_err());
        assert!(InputValidator::project_input(&payload(json!({ "name": 7 }))).is_err());
        assert!(InputValidator::project_input(&payload(json!({
            "name": "x".repeat(201)
        })))
        .is_err());
    }

    #[test]
    fn test_task_input() {
        let project_id = Uuid::new_v4();
        let input = InputValidator::task_input(&payload(json!({
            "title": "Ship it",
            "dueDate": "2024-07-01",
            "priority": "High",
            "projectId": project_id.to_string()
        })))
        .unwrap();
        assert_eq!(input.status, TaskStatus::ToDo);
        assert_eq!(input.priority, TaskPriority::High);
        assert_eq!(input.project_id, Some(project_id));
        assert_eq!(input.due_date.to_rfc3339(), "2024-07-01T00:00:00+00:00");

        let cleared = InputValidator::task_input(&payload(json!({
            "title": "Ship it",
            "dueDate": "2024-07-01",
            "projectId": null
        })))
        .unwrap();
        assert_eq!(cleared.project_id, None);
    }

    #[test]
    fn test_task_input_rejections() {
        for bad in [
            json!({ "dueDate": "2024-07-01" }),
            json!({ "title": "t" }),
            json!({ "title": "t", "dueDate": "2024-02-30" }),
            json!({ "title": "t", "dueDate": "2024-07-01", "status": "Blocked" }),
            json!({ "title": "t", "dueDate": "2024-07-01", "priority": "low" }),
            json!({ "title": "t", "dueDate": "2024-07-01", "projectId": "p-1" }),
            json!({ "title": "t", "dueDate": "2024-07-01", "ownerId": "u2" }),
        ] {
            let error = InputValidator::task_input(&payload(bad.clone())).unwrap_err();
            assert!(error.is_validation(), "{bad} should be rejected");
        }
    }
}
