//! Declarations of entity types and their members.

use crate::entity::{DomainEntity, Link, Prop};
use crate::value::PropertyValue;
use kith_constraint::ConstraintBuilder;
use kith_registry::{Cardinality, LinkDef, OnTargetDelete, PropertyDef, RegistryError};
use std::marker::PhantomData;

/// Properties and links declared for entity type `E`.
///
/// Used directly for extensions declared outside the type, and through
/// [`TypeDeclaration`] for the type's own members.
pub struct Members<E> {
    pub(crate) properties: Vec<PropertyDef>,
    pub(crate) links: Vec<LinkDef>,
    pub(crate) errors: Vec<RegistryError>,
    _marker: PhantomData<fn() -> E>,
}

impl<E: DomainEntity> Members<E> {
    pub(crate) fn new() -> Self {
        Self {
            properties: Vec::new(),
            links: Vec::new(),
            errors: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Declare a property. Finish with [`PropertyDeclaration::done`].
    pub fn property<T: PropertyValue>(&mut self, prop: Prop<E, T>) -> PropertyDeclaration<'_, E, T> {
        PropertyDeclaration {
            members: self,
            def: PropertyDef::new(prop.name(), T::PROPERTY_TYPE),
            constraints: ConstraintBuilder::new(),
        }
    }

    /// Declare a link. Finish with [`LinkDeclaration::done`].
    pub fn link<T: DomainEntity>(
        &mut self,
        link: Link<E, T>,
        cardinality: Cardinality,
    ) -> LinkDeclaration<'_, E, T> {
        LinkDeclaration {
            members: self,
            def: LinkDef::new(link.name(), T::TYPE_NAME, cardinality),
            _marker: PhantomData,
        }
    }
}

/// Everything declared for entity type `E` by [`DomainEntity::declare`].
pub struct TypeDeclaration<E> {
    pub(crate) members: Members<E>,
    pub(crate) parents: Vec<&'static str>,
    pub(crate) is_abstract: bool,
}

impl<E: DomainEntity> TypeDeclaration<E> {
    pub(crate) fn new() -> Self {
        Self {
            members: Members::new(),
            parents: Vec::new(),
            is_abstract: false,
        }
    }

    /// Inherit the members and constraints of `P`.
    pub fn extends<P: DomainEntity>(&mut self) -> &mut Self {
        self.parents.push(P::TYPE_NAME);
        self
    }

    /// Forbid direct instances.
    pub fn abstract_type(&mut self) -> &mut Self {
        self.is_abstract = true;
        self
    }

    pub fn property<T: PropertyValue>(&mut self, prop: Prop<E, T>) -> PropertyDeclaration<'_, E, T> {
        self.members.property(prop)
    }

    pub fn link<T: DomainEntity>(
        &mut self,
        link: Link<E, T>,
        cardinality: Cardinality,
    ) -> LinkDeclaration<'_, E, T> {
        self.members.link(link, cardinality)
    }
}

/// A property being declared.
#[must_use = "call done() to add the property"]
pub struct PropertyDeclaration<'a, E, T> {
    members: &'a mut Members<E>,
    def: PropertyDef,
    constraints: ConstraintBuilder<E, T>,
}

impl<'a, E: DomainEntity, T: PropertyValue> PropertyDeclaration<'a, E, T> {
    /// The property must have a value at commit.
    pub fn required(mut self) -> Self {
        self.def = self.def.required();
        self
    }

    /// Value given to new entities.
    pub fn default_value(mut self, value: T) -> Self {
        self.def = self.def.with_default(value.into_value());
        self
    }

    /// Attach constraints, evaluated in the order they are added.
    pub fn constrain(mut self, f: impl FnOnce(&mut ConstraintBuilder<E, T>)) -> Self {
        f(&mut self.constraints);
        self
    }

    pub fn done(self) {
        let PropertyDeclaration {
            members,
            def,
            constraints,
        } = self;
        match constraints.finish() {
            Ok(constraints) => members.properties.push(def.with_constraints(constraints)),
            Err(e) => members
                .errors
                .push(RegistryError::invalid_constraint(E::TYPE_NAME, def.name, e)),
        }
    }
}

/// A link being declared.
#[must_use = "call done() to add the link"]
pub struct LinkDeclaration<'a, E, T> {
    members: &'a mut Members<E>,
    def: LinkDef,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, E: DomainEntity, T: DomainEntity> LinkDeclaration<'a, E, T> {
    /// The link on `T` that mirrors this one. Both sides must name each
    /// other.
    pub fn opposite(mut self, opposite: Link<T, E>) -> Self {
        self.def = self.def.with_opposite(opposite.name());
        self
    }

    pub fn on_target_delete(mut self, policy: OnTargetDelete) -> Self {
        self.def = self.def.on_target_delete(policy);
        self
    }

    pub fn done(self) {
        self.members.links.push(self.def);
    }
}

impl<'a, E: DomainEntity> PropertyDeclaration<'a, E, String> {
    pub fn default_str(self, value: &str) -> Self {
        self.default_value(value.to_string())
    }
}
