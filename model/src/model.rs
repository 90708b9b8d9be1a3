//! Registration of domain entity types.

use crate::declaration::{Members, TypeDeclaration};
use crate::entity::DomainEntity;
use kith_registry::{Registry, RegistryBuilder, RegistryError};
use kith_transaction::{Database, StoreConfig};
use tracing::debug;

/// Collects entity types and extensions, in any order, into a registry.
#[derive(Debug, Default)]
pub struct Model {
    builder: RegistryBuilder,
    errors: Vec<RegistryError>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `E` with the members from [`DomainEntity::declare`].
    pub fn register<E: DomainEntity>(&mut self) -> &mut Self {
        let mut declaration = TypeDeclaration::<E>::new();
        E::declare(&mut declaration);
        let TypeDeclaration {
            members,
            parents,
            is_abstract,
        } = declaration;
        self.errors.extend(members.errors);

        let mut type_builder = self.builder.add_type(E::TYPE_NAME);
        for parent in parents {
            type_builder = type_builder.extends(parent);
        }
        if is_abstract {
            type_builder = type_builder.abstract_type();
        }
        for property in members.properties {
            type_builder = type_builder.property(property);
        }
        for link in members.links {
            type_builder = type_builder.link(link);
        }
        if let Err(e) = type_builder.done() {
            self.errors.push(e);
        }
        debug!(type_name = E::TYPE_NAME, "entity type registered");
        self
    }

    /// Add members to `E` from outside its declaration, typically links
    /// whose opposite lives on another type.
    pub fn extend<E: DomainEntity>(&mut self, f: impl FnOnce(&mut Members<E>)) -> &mut Self {
        let mut members = Members::<E>::new();
        f(&mut members);
        self.errors.extend(members.errors);

        let mut extension = self.builder.extend_type(E::TYPE_NAME);
        for property in members.properties {
            extension = extension.property(property);
        }
        for link in members.links {
            extension = extension.link(link);
        }
        extension.done();
        self
    }

    /// Resolve everything registered so far.
    pub fn build(self) -> Result<Registry, RegistryError> {
        if let Some(e) = self.errors.into_iter().next() {
            return Err(e);
        }
        self.builder.build()
    }

    /// Build the registry and open an empty database over it.
    pub fn open(self, config: StoreConfig) -> Result<Database, RegistryError> {
        Ok(Database::new(self.build()?).with_config(config))
    }
}
