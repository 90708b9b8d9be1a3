//! Entity views handed to constraints.

use kith_constraint::EntityView;
use kith_core::{Entity, EntityId, Value};
use kith_registry::Registry;

/// An entity together with the registry that knows its type.
#[derive(Debug, Clone, Copy)]
pub struct EntityRef<'a> {
    registry: &'a Registry,
    entity: &'a Entity,
}

impl<'a> EntityRef<'a> {
    pub fn new(registry: &'a Registry, entity: &'a Entity) -> Self {
        Self { registry, entity }
    }

    pub fn entity(&self) -> &'a Entity {
        self.entity
    }
}

impl EntityView for EntityRef<'_> {
    fn id(&self) -> EntityId {
        self.entity.id
    }

    fn type_name(&self) -> &str {
        self.registry.type_name(self.entity.type_id)
    }

    fn is_instance_of(&self, type_name: &str) -> bool {
        self.registry
            .get_type_id(type_name)
            .is_some_and(|t| self.registry.is_subtype(self.entity.type_id, t))
    }

    fn property(&self, name: &str) -> Option<&Value> {
        self.entity.get_property(name)
    }

    fn links(&self, name: &str) -> &[EntityId] {
        self.entity.links(name)
    }
}
