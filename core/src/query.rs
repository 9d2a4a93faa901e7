//! Persistence-neutral filter expressions and the search-parameter builder.
//!
//! A [`Filter`] is an AND-list of [`Clause`]s over registry field names. Backends
//! render it (SQL in the `database` crate); [`Filter::matches`] is the reference
//! in-memory semantics every backend has to agree with.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    dates::{day_bounds, parse_calendar_day},
    error::{Result, TrackerError},
    fields::{EntityType, FieldClass, FieldRegistry},
    models::{Project, Task},
};

/// Already-validated search pairs: registered keys, one scalar value each
pub type SearchParams = BTreeMap<String, String>;

/// A scalar a clause compares against
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Text(String),
    Id(Uuid),
    Timestamp(DateTime<Utc>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Ordering used for in-memory sorting; `Null` sorts first.
    ///
    /// Values of different kinds never occur on the same field and compare equal.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Id(a), Value::Id(b)) => a.to_string().cmp(&b.to_string()),
            (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl From<Option<Uuid>> for Value {
    fn from(id: Option<Uuid>) -> Self {
        id.map(Value::Id).unwrap_or(Value::Null)
    }
}

impl From<Option<DateTime<Utc>>> for Value {
    fn from(ts: Option<DateTime<Utc>>) -> Self {
        ts.map(Value::Timestamp).unwrap_or(Value::Null)
    }
}

impl From<Option<String>> for Value {
    fn from(text: Option<String>) -> Self {
        text.map(Value::Text).unwrap_or(Value::Null)
    }
}

/// One condition on one field
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// `field = value`, or `field IS NULL` for [`Value::Null`]
    Eq { field: &'static str, value: Value },
    /// `field <> value`; a null field never matches
    NotEq { field: &'static str, value: Value },
    /// `field IN (values)`
    In { field: &'static str, values: Vec<Value> },
    /// Case-insensitive literal substring match
    ContainsIgnoreCase { field: &'static str, needle: String },
    /// `start <= field < end`
    Range {
        field: &'static str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// Lowercase form used on both sides of a case-insensitive text match.
///
/// Unicode-aware, so `É` folds to `é`. Backends that store a folded copy of a
/// text column must produce it with this function.
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

impl Clause {
    pub fn field(&self) -> &'static str {
        match self {
            Clause::Eq { field, .. }
            | Clause::NotEq { field, .. }
            | Clause::In { field, .. }
            | Clause::ContainsIgnoreCase { field, .. }
            | Clause::Range { field, .. } => field,
        }
    }

    fn matches<R: Record>(&self, record: &R) -> bool {
        let actual = record.field_value(self.field());
        match self {
            Clause::Eq { value, .. } => actual == *value,
            Clause::NotEq { value, .. } => !actual.is_null() && actual != *value,
            Clause::In { values, .. } => !actual.is_null() && values.contains(&actual),
            Clause::ContainsIgnoreCase { needle, .. } => match actual {
                Value::Text(text) => fold_case(&text).contains(&fold_case(needle)),
                _ => false,
            },
            Clause::Range { start, end, .. } => match actual {
                Value::Timestamp(ts) => *start <= ts && ts < *end,
                _ => false,
            },
        }
    }
}

/// Conjunction of clauses over one entity type
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    entity: EntityType,
    clauses: Vec<Clause>,
}

impl Filter {
    /// Empty filter, matches everything
    pub fn new(entity: EntityType) -> Self {
        Self {
            entity,
            clauses: Vec::new(),
        }
    }

    pub fn entity(&self) -> EntityType {
        self.entity
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn and(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn eq(self, field: &'static str, value: Value) -> Self {
        self.and(Clause::Eq { field, value })
    }

    pub fn not_eq(self, field: &'static str, value: Value) -> Self {
        self.and(Clause::NotEq { field, value })
    }

    pub fn is_in(self, field: &'static str, values: Vec<Value>) -> Self {
        self.and(Clause::In { field, values })
    }

    /// Append every clause of `other`
    pub fn merge(mut self, other: Filter) -> Self {
        self.clauses.extend(other.clauses);
        self
    }

    /// Reference semantics: does `record` satisfy every clause
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        R::ENTITY == self.entity && self.clauses.iter().all(|clause| clause.matches(record))
    }
}

/// A persisted entity whose fields can be read by registry name
pub trait Record {
    const ENTITY: EntityType;

    /// Current value of a field, [`Value::Null`] for absent or unknown fields
    fn field_value(&self, field: &str) -> Value;
}

impl Record for Project {
    const ENTITY: EntityType = EntityType::Project;

    fn field_value(&self, field: &str) -> Value {
        match field {
            "id" => Value::Id(self.id),
            "name" => Value::Text(self.name.clone()),
            "description" => self.description.clone().into(),
            "ownerId" => Value::Text(self.owner_id.to_string()),
            "isDeleted" => Value::Bool(self.is_deleted),
            "deletedAt" => self.deleted_at.into(),
            "createdAt" => Value::Timestamp(self.created_at),
            "updatedAt" => Value::Timestamp(self.updated_at),
            _ => Value::Null,
        }
    }
}

impl Record for Task {
    const ENTITY: EntityType = EntityType::Task;

    fn field_value(&self, field: &str) -> Value {
        match field {
            "id" => Value::Id(self.id),
            "title" => Value::Text(self.title.clone()),
            "description" => self.description.clone().into(),
            "status" => Value::Text(self.status.as_str().to_string()),
            "priority" => Value::Text(self.priority.as_str().to_string()),
            "dueDate" => Value::Timestamp(self.due_date),
            "ownerId" => Value::Text(self.owner_id.to_string()),
            "projectId" => self.project_id.into(),
            "isDeleted" => Value::Bool(self.is_deleted),
            "deletedAt" => self.deleted_at.into(),
            "createdAt" => Value::Timestamp(self.created_at),
            "updatedAt" => Value::Timestamp(self.updated_at),
            _ => Value::Null,
        }
    }
}

/// Turns search key/value pairs into filter clauses
pub struct QueryFilterBuilder;

impl QueryFilterBuilder {
    /// Extend `base` with one clause per search pair.
    ///
    /// Identifier fields match exactly, text fields by case-insensitive
    /// substring, date fields by whole UTC day. A date value that is not a real
    /// calendar date contributes no clause at all. A key that is not searchable
    /// for `entity` is rejected.
    pub fn build(base: Filter, search: &SearchParams, entity: EntityType) -> Result<Filter> {
        if base.entity() != entity {
            return Err(TrackerError::Internal(format!(
                "Filter for {} used to search {entity}",
                base.entity()
            )));
        }

        let mut filter = base;
        for (key, value) in search {
            let class = FieldRegistry::classify(entity, key);
            let field = FieldRegistry::canonical(entity, key);
            let (Some(class), Some(field)) = (class, field) else {
                return Err(TrackerError::invalid_keys(
                    "Unknown search parameters",
                    std::slice::from_ref(key),
                ));
            };

            filter = match class {
                FieldClass::Identifier => {
                    let id = Uuid::parse_str(value.trim())
                        .map_err(|_| TrackerError::invalid_id(field, value))?;
                    filter.eq(field, Value::Id(id))
                }
                FieldClass::Text => filter.and(Clause::ContainsIgnoreCase {
                    field,
                    needle: value.clone(),
                }),
                FieldClass::Date => match parse_calendar_day(value) {
                    Some(day) => {
                        let (start, end) = day_bounds(day);
                        filter.and(Clause::Range { field, start, end })
                    }
                    None => {
                        tracing::debug!(field, value = %value, "Omitting unparseable date clause");
                        filter
                    }
                },
            };
        }

        Ok(filter)
    }
}
