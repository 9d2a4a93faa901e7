//! Static per-entity field configuration.
//!
//! Which fields of each entity may be sorted on, searched (and how), and written.
//! Everything here is immutable and built at compile time; lookups never allocate.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The two owned entity types
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Project,
    Task,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityType::Project => write!(f, "project"),
            EntityType::Task => write!(f, "task"),
        }
    }
}

/// How a searchable field is matched
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum FieldClass {
    /// Exact equality
    Identifier,
    /// Case-insensitive substring
    Text,
    /// Whole calendar day
    Date,
}

/// Searchable fields of an entity, grouped by class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchableFields {
    pub identifier_fields: &'static [&'static str],
    pub text_fields: &'static [&'static str],
    pub date_fields: &'static [&'static str],
}

impl SearchableFields {
    /// Classify a field, `None` when it is not searchable
    pub fn classify(&self, field: &str) -> Option<FieldClass> {
        if self.identifier_fields.contains(&field) {
            Some(FieldClass::Identifier)
        } else if self.text_fields.contains(&field) {
            Some(FieldClass::Text)
        } else if self.date_fields.contains(&field) {
            Some(FieldClass::Date)
        } else {
            None
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.classify(field).is_some()
    }
}

/// Full field configuration of one entity type
#[derive(Debug)]
pub struct EntityFields {
    pub sortable: &'static [&'static str],
    pub searchable: SearchableFields,
    pub writable: &'static [&'static str],
    /// Every addressable field and its persistence column
    pub columns: &'static [(&'static str, &'static str)],
}

static PROJECT_FIELDS: EntityFields = EntityFields {
    sortable: &["name", "description", "createdAt", "updatedAt"],
    searchable: SearchableFields {
        identifier_fields: &[],
        text_fields: &["name", "description"],
        date_fields: &["createdAt", "updatedAt"],
    },
    writable: &["name", "description"],
    columns: &[
        ("id", "id"),
        ("name", "name"),
        ("description", "description"),
        ("ownerId", "owner_id"),
        ("isDeleted", "is_deleted"),
        ("deletedAt", "deleted_at"),
        ("createdAt", "created_at"),
        ("updatedAt", "updated_at"),
    ],
};

static TASK_FIELDS: EntityFields = EntityFields {
    sortable: &[
        "title",
        "description",
        "status",
        "priority",
        "dueDate",
        "createdAt",
        "updatedAt",
    ],
    searchable: SearchableFields {
        identifier_fields: &["projectId"],
        text_fields: &["title", "description", "status", "priority"],
        date_fields: &["dueDate", "createdAt", "updatedAt"],
    },
    writable: &[
        "title",
        "description",
        "status",
        "priority",
        "dueDate",
        "projectId",
    ],
    columns: &[
        ("id", "id"),
        ("title", "title"),
        ("description", "description"),
        ("status", "status"),
        ("priority", "priority"),
        ("dueDate", "due_date"),
        ("ownerId", "owner_id"),
        ("projectId", "project_id"),
        ("isDeleted", "is_deleted"),
        ("deletedAt", "deleted_at"),
        ("createdAt", "created_at"),
        ("updatedAt", "updated_at"),
    ],
};

/// Read-only lookup over the per-entity field configuration
pub struct FieldRegistry;

impl FieldRegistry {
    /// Full configuration of an entity type
    pub fn fields(entity: EntityType) -> &'static EntityFields {
        match entity {
            EntityType::Project => &PROJECT_FIELDS,
            EntityType::Task => &TASK_FIELDS,
        }
    }

    /// Sortable fields in declaration order
    pub fn sortable(entity: EntityType) -> &'static [&'static str] {
        Self::fields(entity).sortable
    }

    pub fn searchable(entity: EntityType) -> &'static SearchableFields {
        &Self::fields(entity).searchable
    }

    pub fn writable(entity: EntityType) -> &'static [&'static str] {
        Self::fields(entity).writable
    }

    pub fn classify(entity: EntityType, field: &str) -> Option<FieldClass> {
        Self::searchable(entity).classify(field)
    }

    /// Resolve a caller-facing field name to the registry's static name.
    ///
    /// Filters and sort specs only ever hold names that passed through here, so
    /// persistence backends can trust them.
    pub fn canonical(entity: EntityType, field: &str) -> Option<&'static str> {
        Self::fields(entity)
            .columns
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(name, _)| *name)
    }

    /// Persistence column of a field
    pub fn column(entity: EntityType, field: &str) -> Option<&'static str> {
        Self::fields(entity)
            .columns
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, column)| *column)
    }
}
