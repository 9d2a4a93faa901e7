//! Ownership and visibility scoping.
//!
//! Every filter the lifecycle hands to a repository starts here. A resource owned
//! by someone else and a resource that does not exist produce the same NotFound.

use uuid::Uuid;

use crate::{
    error::{Result, TrackerError},
    fields::EntityType,
    models::OwnerId,
    query::{Filter, Value},
};

/// Scopes reads and writes to one verified owner
#[derive(Debug, Clone)]
pub struct ResourceAccessGuard {
    owner: OwnerId,
}

impl ResourceAccessGuard {
    pub fn new(owner: OwnerId) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    fn owned(&self, entity: EntityType) -> Filter {
        Filter::new(entity).eq("ownerId", Value::Text(self.owner.to_string()))
    }

    /// Owner's Active resources: base of every list, fetch and update
    pub fn visible(&self, entity: EntityType) -> Filter {
        self.owned(entity).eq("isDeleted", Value::Bool(false))
    }

    /// One of the owner's Active resources
    pub fn visible_one(&self, entity: EntityType, id: Uuid) -> Filter {
        self.visible(entity).eq("id", Value::Id(id))
    }

    /// One of the owner's resources regardless of deletion state.
    ///
    /// Only the delete path uses this, so that a second delete is seen and
    /// rejected rather than silently re-applied.
    pub fn deletable_one(&self, entity: EntityType, id: Uuid) -> Filter {
        self.owned(entity).eq("id", Value::Id(id))
    }

    /// Turn an absent lookup result into the uniform NotFound
    pub fn require<T>(&self, entity: EntityType, id: Uuid, found: Option<T>) -> Result<T> {
        found.ok_or_else(|| TrackerError::not_found(entity, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Clause;

    #[test]
    fn test_visible_scope() {
        let guard = ResourceAccessGuard::new(OwnerId::new("u1"));
        let filter = guard.visible(EntityType::Task);
        assert_eq!(
            filter.clauses(),
            &[
                Clause::Eq {
                    field: "ownerId",
                    value: Value::Text("u1".to_string())
                },
                Clause::Eq {
                    field: "isDeleted",
                    value: Value::Bool(false)
                },
            ]
        );
    }

    #[test]
    fn test_delete_scope_ignores_deletion_state() {
        let guard = ResourceAccessGuard::new(OwnerId::new("u1"));
        let id = Uuid::new_v4();
        let filter = guard.deletable_one(EntityType::Project, id);
        assert!(filter.clauses().iter().all(|clause| clause.field() != "isDeleted"));
        assert!(filter.clauses().contains(&Clause::Eq {
            field: "id",
            value: Value::Id(id)
        }));
    }

    #[test]
    fn test_require_yields_uniform_not_found() {
        let guard = ResourceAccessGuard::new(OwnerId::new("u1"));
        let id = Uuid::new_v4();
        let error = guard
            .require::<()>(EntityType::Project, id, None)
            .unwrap_err();
        assert_eq!(error, TrackerError::project_not_found_id(id));
        assert_eq!(guard.require(EntityType::Task, id, Some(5)).unwrap(), 5);
    }
}
