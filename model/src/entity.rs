//! Typed entity handles and accessors.

use crate::declaration::TypeDeclaration;
use crate::value::PropertyValue;
use kith_constraint::EntityKind;
use kith_core::{EntityId, Value};
use kith_transaction::{Transaction, TransactionResult};
use std::fmt;
use std::marker::PhantomData;

/// A handle to an entity of a declared type.
///
/// Handles are plain ids; all state lives in the store and is read and
/// written through a [`Transaction`].
pub trait DomainEntity: EntityKind + Copy + Eq + fmt::Debug {
    fn wrap(id: EntityId) -> Self;

    fn id(&self) -> EntityId;

    /// Declare parents, properties and links of this type.
    fn declare(_declaration: &mut TypeDeclaration<Self>) {}

    /// Create a new instance.
    fn create(tx: &mut Transaction<'_>) -> TransactionResult<Self> {
        Ok(Self::wrap(tx.new_entity(Self::TYPE_NAME)?))
    }

    /// The entity as `Self`, if it is an instance of this type or a subtype.
    fn cast(tx: &Transaction<'_>, id: EntityId) -> TransactionResult<Option<Self>> {
        Ok(tx
            .is_instance_of(id, Self::TYPE_NAME)?
            .then(|| Self::wrap(id)))
    }

    /// All instances, subtypes included.
    fn all(tx: &Transaction<'_>) -> TransactionResult<Vec<Self>> {
        Ok(tx
            .all_of_type(Self::TYPE_NAME)?
            .into_iter()
            .map(Self::wrap)
            .collect())
    }

    fn delete(self, tx: &mut Transaction<'_>) -> TransactionResult<()> {
        tx.delete_entity(self.id())
    }
}

/// A property of entity type `E` holding values of type `T`.
pub struct Prop<E, T> {
    name: &'static str,
    _marker: PhantomData<fn() -> (E, T)>,
}

impl<E, T> Prop<E, T> {
    /// A property stored under `name`.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<E, T> Clone for Prop<E, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, T> Copy for Prop<E, T> {}

impl<E, T> fmt::Debug for Prop<E, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Prop({})", self.name)
    }
}

impl<E: DomainEntity, T: PropertyValue> Prop<E, T> {
    pub fn get(&self, tx: &Transaction<'_>, entity: E) -> TransactionResult<Option<T>> {
        Ok(tx
            .get_property(entity.id(), self.name)?
            .and_then(T::from_value))
    }

    pub fn set(&self, tx: &mut Transaction<'_>, entity: E, value: T) -> TransactionResult<()> {
        tx.set_property(entity.id(), self.name, value.into_value())
    }

    pub fn clear(&self, tx: &mut Transaction<'_>, entity: E) -> TransactionResult<()> {
        tx.set_property(entity.id(), self.name, Value::Null)
    }
}

/// A link from entity type `E` to entity type `T`.
pub struct Link<E, T> {
    name: &'static str,
    _marker: PhantomData<fn() -> (E, T)>,
}

impl<E, T> Link<E, T> {
    /// A link stored under `name`.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<E, T> Clone for Link<E, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, T> Copy for Link<E, T> {}

impl<E, T> fmt::Debug for Link<E, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Link({})", self.name)
    }
}

impl<E: DomainEntity, T: DomainEntity> Link<E, T> {
    /// Target of a single-valued link.
    pub fn get(&self, tx: &Transaction<'_>, entity: E) -> TransactionResult<Option<T>> {
        Ok(tx.link(entity.id(), self.name)?.map(T::wrap))
    }

    /// Set or clear a single-valued link.
    pub fn set(&self, tx: &mut Transaction<'_>, entity: E, target: Option<T>) -> TransactionResult<()> {
        tx.set_link(entity.id(), self.name, target.map(|t| t.id()))
    }

    /// All targets.
    pub fn all(&self, tx: &Transaction<'_>, entity: E) -> TransactionResult<Vec<T>> {
        Ok(tx
            .links(entity.id(), self.name)?
            .iter()
            .copied()
            .map(T::wrap)
            .collect())
    }

    pub fn add(&self, tx: &mut Transaction<'_>, entity: E, target: T) -> TransactionResult<()> {
        tx.add_link(entity.id(), self.name, target.id())
    }

    pub fn remove(&self, tx: &mut Transaction<'_>, entity: E, target: T) -> TransactionResult<bool> {
        tx.remove_link(entity.id(), self.name, target.id())
    }

    pub fn clear(&self, tx: &mut Transaction<'_>, entity: E) -> TransactionResult<()> {
        tx.clear_links(entity.id(), self.name)
    }
}
