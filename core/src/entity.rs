//! The stored entity record.
//!
//! An entity carries scalar properties and named link sets. Link sets are
//! ordered by insertion and never contain the same target twice.

use crate::{EntityId, Properties, TypeId, Value};
use std::collections::HashMap;

/// An entity in the store.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Unique identifier for this entity.
    pub id: EntityId,
    /// Type of this entity (reference to the schema).
    pub type_id: TypeId,
    /// Property values. Absent and null are the same thing.
    pub properties: Properties,
    /// Link sets by link name.
    pub links: HashMap<String, Vec<EntityId>>,
}

impl Entity {
    /// Create a new entity with the given properties and no links.
    pub fn new(id: EntityId, type_id: TypeId, properties: Properties) -> Self {
        Self {
            id,
            type_id,
            properties,
            links: HashMap::new(),
        }
    }

    /// Get a property value by name.
    pub fn get_property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name).filter(|v| !v.is_null())
    }

    /// Set a property value, returning the previous one. Null clears it.
    pub fn set_property(&mut self, name: &str, value: Value) -> Option<Value> {
        if value.is_null() {
            self.properties.remove(name)
        } else {
            self.properties.insert(name.to_string(), value)
        }
    }

    /// Get the targets of a link.
    pub fn links(&self, name: &str) -> &[EntityId] {
        self.links.get(name).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Check whether a link contains a target.
    pub fn has_link(&self, name: &str, target: EntityId) -> bool {
        self.links(name).contains(&target)
    }

    /// Position of a target within a link.
    pub fn link_position(&self, name: &str, target: EntityId) -> Option<usize> {
        self.links(name).iter().position(|t| *t == target)
    }

    /// Add a target to a link. Returns false if it was already there.
    pub fn add_link(&mut self, name: &str, target: EntityId) -> bool {
        self.insert_link(name, usize::MAX, target)
    }

    /// Add a target at `index`, or at the end if `index` is past it.
    pub fn insert_link(&mut self, name: &str, index: usize, target: EntityId) -> bool {
        let targets = self.links.entry(name.to_string()).or_default();
        if targets.contains(&target) {
            return false;
        }
        targets.insert(index.min(targets.len()), target);
        true
    }

    /// Remove a target from a link. Returns false if it was not there.
    pub fn remove_link(&mut self, name: &str, target: EntityId) -> bool {
        let Some(targets) = self.links.get_mut(name) else {
            return false;
        };
        let Some(pos) = targets.iter().position(|t| *t == target) else {
            return false;
        };
        targets.remove(pos);
        if targets.is_empty() {
            self.links.remove(name);
        }
        true
    }

    /// Iterate over every (link name, target) pair.
    pub fn all_links(&self) -> impl Iterator<Item = (&str, EntityId)> + '_ {
        self.links
            .iter()
            .flat_map(|(name, targets)| targets.iter().map(move |t| (name.as_str(), *t)))
    }
}
