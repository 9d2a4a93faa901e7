//! Response envelopes returned by the lifecycle services.

use serde::{Deserialize, Serialize};

use crate::{fields::EntityType, pagination::PageMeta};

/// One page of a list call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub message: String,
    pub data: Vec<T>,
    pub meta: PageMeta,
}

/// A single resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemResponse<T> {
    pub message: String,
    pub data: T,
}

/// Acknowledgement of a write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Wording of the success messages for an entity
pub(crate) struct Messages;

impl Messages {
    fn title(entity: EntityType) -> &'static str {
        match entity {
            EntityType::Project => "Project",
            EntityType::Task => "Task",
        }
    }

    pub(crate) fn listed(entity: EntityType) -> String {
        format!("{}s fetched successfully", Self::title(entity))
    }

    pub(crate) fn fetched(entity: EntityType) -> String {
        format!("{} details fetched successfully", Self::title(entity))
    }

    pub(crate) fn created(entity: EntityType) -> String {
        format!("{} created successfully", Self::title(entity))
    }

    pub(crate) fn updated(entity: EntityType) -> String {
        format!("{} details updated successfully", Self::title(entity))
    }

    pub(crate) fn deleted(entity: EntityType) -> String {
        format!("{} deleted successfully", Self::title(entity))
    }
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
