//! Core entity storage implementation.

use crate::index::{InboundIndex, TypeIndex};
use kith_core::{Entity, EntityId, Properties, StoreError, StoreResult, TypeId, Value};
use std::collections::HashMap;

/// ID allocator for entities.
#[derive(Debug)]
struct IdAllocator {
    next_entity_id: u64,
}

impl IdAllocator {
    fn new() -> Self {
        Self { next_entity_id: 1 }
    }

    fn alloc_entity_id(&mut self) -> EntityId {
        let id = EntityId::new(self.next_entity_id);
        self.next_entity_id += 1;
        id
    }
}

/// An entity taken out of the store, together with the links that pointed
/// at it. Feeding it back to [`EntityStore::restore_entity`] undoes the
/// deletion.
#[derive(Debug, Clone)]
pub struct RemovedEntity {
    /// The entity record, outgoing links included.
    pub entity: Entity,
    /// (source, link name) pairs that targeted the entity.
    pub inbound: Vec<(EntityId, String)>,
}

/// The in-memory entity storage.
#[derive(Debug)]
pub struct EntityStore {
    /// Entity storage
    entities: HashMap<EntityId, Entity>,
    /// ID allocator
    id_alloc: IdAllocator,
    /// Type index
    type_index: TypeIndex,
    /// Inbound link index
    inbound: InboundIndex,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            entities: HashMap::new(),
            id_alloc: IdAllocator::new(),
            type_index: TypeIndex::new(),
            inbound: InboundIndex::new(),
        }
    }

    // ==================== Entity Operations ====================

    /// Create a new entity with the given type and properties.
    pub fn create_entity(&mut self, type_id: TypeId, properties: Properties) -> EntityId {
        let id = self.id_alloc.alloc_entity_id();
        let properties = properties.into_iter().filter(|(_, v)| !v.is_null()).collect();
        let entity = Entity::new(id, type_id, properties);

        self.type_index.insert(type_id, id);
        self.entities.insert(id, entity);
        id
    }

    /// Get an entity by ID.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Check if an entity exists.
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    fn entity(&self, id: EntityId) -> StoreResult<&Entity> {
        self.entities.get(&id).ok_or(StoreError::EntityNotFound(id))
    }

    fn entity_mut(&mut self, id: EntityId) -> StoreResult<&mut Entity> {
        self.entities
            .get_mut(&id)
            .ok_or(StoreError::EntityNotFound(id))
    }

    /// Delete an entity, detaching every link that targets it.
    pub fn delete_entity(&mut self, id: EntityId) -> StoreResult<RemovedEntity> {
        let entity = self
            .entities
            .remove(&id)
            .ok_or(StoreError::EntityNotFound(id))?;

        self.type_index.remove(entity.type_id, id);
        for (name, target) in entity.all_links() {
            self.inbound.remove(target, id, name);
        }

        let inbound: Vec<(EntityId, String)> = self
            .inbound
            .sources(id)
            .map(|(source, name)| (source, name.to_string()))
            .collect();
        for (source, name) in &inbound {
            if let Some(source_entity) = self.entities.get_mut(source) {
                source_entity.remove_link(name, id);
            }
            self.inbound.remove(id, *source, name);
        }

        Ok(RemovedEntity { entity, inbound })
    }

    /// Put a deleted entity back, with its outgoing and inbound links.
    ///
    /// Links to or from entities that no longer exist are dropped.
    pub fn restore_entity(&mut self, removed: RemovedEntity) -> StoreResult<()> {
        let RemovedEntity { mut entity, inbound } = removed;
        let id = entity.id;
        if self.entities.contains_key(&id) {
            return Err(StoreError::EntityExists(id));
        }

        let dangling: Vec<(String, EntityId)> = entity
            .all_links()
            .filter(|(_, target)| *target != id && !self.entities.contains_key(target))
            .map(|(name, target)| (name.to_string(), target))
            .collect();
        for (name, target) in dangling {
            entity.remove_link(&name, target);
        }
        for (name, target) in entity.all_links() {
            self.inbound.insert(target, id, name);
        }

        self.type_index.insert(entity.type_id, id);
        self.entities.insert(id, entity);

        for (source, name) in inbound {
            if let Some(source_entity) = self.entities.get_mut(&source) {
                if source_entity.add_link(&name, id) {
                    self.inbound.insert(id, source, &name);
                }
            }
        }

        Ok(())
    }

    /// Set a property on an entity, returning the previous value.
    pub fn set_property(
        &mut self,
        id: EntityId,
        name: &str,
        value: Value,
    ) -> StoreResult<Option<Value>> {
        let entity = self.entity_mut(id)?;
        Ok(entity.set_property(name, value))
    }

    // ==================== Link Operations ====================

    /// Add `target` to the link set `name` of `source`.
    ///
    /// Returns false if the pair was already linked.
    pub fn add_link(&mut self, source: EntityId, name: &str, target: EntityId) -> StoreResult<bool> {
        self.insert_link(source, name, usize::MAX, target)
    }

    /// Add `target` at position `index` of the link set, or at its end.
    pub fn insert_link(
        &mut self,
        source: EntityId,
        name: &str,
        index: usize,
        target: EntityId,
    ) -> StoreResult<bool> {
        if !self.entities.contains_key(&target) {
            return Err(StoreError::EntityNotFound(target));
        }
        let added = self.entity_mut(source)?.insert_link(name, index, target);
        if added {
            self.inbound.insert(target, source, name);
        }
        Ok(added)
    }

    /// Remove `target` from the link set `name` of `source`.
    ///
    /// Returns false if the pair was not linked.
    pub fn remove_link(
        &mut self,
        source: EntityId,
        name: &str,
        target: EntityId,
    ) -> StoreResult<bool> {
        let removed = self.entity_mut(source)?.remove_link(name, target);
        if removed {
            self.inbound.remove(target, source, name);
        }
        Ok(removed)
    }

    /// Get the targets of a link.
    pub fn links(&self, id: EntityId, name: &str) -> StoreResult<&[EntityId]> {
        Ok(self.entity(id)?.links(name))
    }

    /// Every (source, link name) pair pointing at `target`.
    pub fn inbound(&self, target: EntityId) -> impl Iterator<Item = (EntityId, &str)> + '_ {
        self.inbound.sources(target)
    }

    // ==================== Lookups ====================

    /// Find entities by exact type (subtypes are the caller's concern).
    pub fn entities_by_type(&self, type_id: TypeId) -> impl Iterator<Item = EntityId> + '_ {
        self.type_index.get(type_id)
    }

    /// Find entities of a type by exact property value.
    pub fn entities_by_property<'a>(
        &'a self,
        type_id: TypeId,
        name: &'a str,
        value: &'a Value,
    ) -> impl Iterator<Item = EntityId> + 'a {
        self.type_index.get(type_id).filter(move |id| {
            self.entities
                .get(id)
                .and_then(|e| e.get_property(name))
                .is_some_and(|v| v == value)
        })
    }

    /// Get the number of entities in the store.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }
}
