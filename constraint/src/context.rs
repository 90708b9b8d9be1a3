//! The entity seen by a constraint at commit time.
//!
//! Most constraints only look at the property value. `require_if` needs the
//! whole owning entity, and gets it through [`Typed`], a view that has been
//! checked against the declared entity kind before the predicate runs.

use crate::error::{ConstraintError, ConstraintResult};
use kith_core::{EntityId, Value};
use std::marker::PhantomData;

/// Read-only access to an entity during validation.
pub trait EntityView {
    /// The entity's identifier.
    fn id(&self) -> EntityId;

    /// Name of the entity's concrete type.
    fn type_name(&self) -> &str;

    /// Whether the entity is of `type_name` or one of its subtypes.
    fn is_instance_of(&self, type_name: &str) -> bool;

    /// A property value, `None` when absent.
    fn property(&self, name: &str) -> Option<&Value>;

    /// The targets of a link.
    fn links(&self, name: &str) -> &[EntityId];
}

/// A declared entity type known at compile time.
pub trait EntityKind: 'static {
    /// Name the type is registered under in the schema.
    const TYPE_NAME: &'static str;
}

/// An [`EntityView`] proven to be an instance of `K`.
pub struct Typed<'a, K: EntityKind> {
    view: &'a dyn EntityView,
    _kind: PhantomData<fn() -> K>,
}

impl<'a, K: EntityKind> Typed<'a, K> {
    /// Bind a view to kind `K`, failing if the entity is not a `K`.
    pub fn bind(view: &'a dyn EntityView) -> ConstraintResult<Self> {
        if !view.is_instance_of(K::TYPE_NAME) {
            return Err(ConstraintError::kind_mismatch(K::TYPE_NAME, view.type_name()));
        }
        Ok(Self {
            view,
            _kind: PhantomData,
        })
    }

    pub fn id(&self) -> EntityId {
        self.view.id()
    }

    pub fn property(&self, name: &str) -> Option<&'a Value> {
        self.view.property(name)
    }

    pub fn links(&self, name: &str) -> &'a [EntityId] {
        self.view.links(name)
    }

    /// The underlying untyped view.
    pub fn view(&self) -> &'a dyn EntityView {
        self.view
    }
}
