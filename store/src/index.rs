//! Indexes for entity lookups.

use kith_core::{EntityId, TypeId};
use std::collections::{HashMap, HashSet};

/// Type index: TypeId -> Set<EntityId>
#[derive(Debug, Default)]
pub struct TypeIndex {
    index: HashMap<TypeId, HashSet<EntityId>>,
}

impl TypeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, type_id: TypeId, entity_id: EntityId) {
        self.index.entry(type_id).or_default().insert(entity_id);
    }

    pub fn remove(&mut self, type_id: TypeId, entity_id: EntityId) {
        if let Some(set) = self.index.get_mut(&type_id) {
            set.remove(&entity_id);
            if set.is_empty() {
                self.index.remove(&type_id);
            }
        }
    }

    pub fn get(&self, type_id: TypeId) -> impl Iterator<Item = EntityId> + '_ {
        self.index
            .get(&type_id)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }
}

/// Inbound index: target -> Set<(source, link name)>
#[derive(Debug, Default)]
pub struct InboundIndex {
    index: HashMap<EntityId, HashSet<(EntityId, String)>>,
}

impl InboundIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, target: EntityId, source: EntityId, link: &str) {
        self.index
            .entry(target)
            .or_default()
            .insert((source, link.to_string()));
    }

    pub fn remove(&mut self, target: EntityId, source: EntityId, link: &str) {
        if let Some(set) = self.index.get_mut(&target) {
            set.remove(&(source, link.to_string()));
            if set.is_empty() {
                self.index.remove(&target);
            }
        }
    }

    /// Every (source, link name) pair pointing at `target`.
    pub fn sources(&self, target: EntityId) -> impl Iterator<Item = (EntityId, &str)> + '_ {
        self.index
            .get(&target)
            .into_iter()
            .flat_map(|set| set.iter().map(|(s, l)| (*s, l.as_str())))
    }
}
