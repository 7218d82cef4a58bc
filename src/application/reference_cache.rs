// Reference cache - source entity id to target entity id, for one run
use crate::domain::entity::EntityId;
use std::collections::{HashMap, HashSet};

/// Mappings discovered while migrating; shared by every dashboard in a run
/// and never persisted.
///
/// Ids that could not be resolved are remembered as well, so a dangling
/// reference costs one round of lookups per run rather than one per widget.
#[derive(Debug, Default)]
pub struct ReferenceCache {
    resolved: HashMap<EntityId, EntityId>,
    unresolved: HashSet<EntityId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedReference<'a> {
    Resolved(&'a EntityId),
    Unresolved,
}

impl ReferenceCache {
    pub fn lookup(&self, source_id: &EntityId) -> Option<CachedReference<'_>> {
        if let Some(target_id) = self.resolved.get(source_id) {
            return Some(CachedReference::Resolved(target_id));
        }
        self.unresolved
            .contains(source_id)
            .then_some(CachedReference::Unresolved)
    }

    pub fn insert(&mut self, source_id: EntityId, target_id: EntityId) {
        self.unresolved.remove(&source_id);
        self.resolved.insert(source_id, target_id);
    }

    pub fn mark_unresolved(&mut self, source_id: EntityId) {
        if !self.resolved.contains_key(&source_id) {
            self.unresolved.insert(source_id);
        }
    }

    /// Number of resolved mappings.
    pub fn len(&self) -> usize {
        self.resolved.len()
    }
}
