//! Typed reads on constraint views.

use crate::entity::{DomainEntity, Link, Prop};
use crate::value::PropertyValue;
use kith_constraint::Typed;

/// Typed property and link reads for `require_if` predicates.
pub trait TypedExt<E> {
    /// The entity handle.
    fn entity(&self) -> E;

    fn get<T: PropertyValue>(&self, prop: Prop<E, T>) -> Option<T>;

    fn linked<T: DomainEntity>(&self, link: Link<E, T>) -> Vec<T>;
}

impl<E: DomainEntity> TypedExt<E> for Typed<'_, E> {
    fn entity(&self) -> E {
        E::wrap(self.id())
    }

    fn get<T: PropertyValue>(&self, prop: Prop<E, T>) -> Option<T> {
        self.property(prop.name()).and_then(T::from_value)
    }

    fn linked<T: DomainEntity>(&self, link: Link<E, T>) -> Vec<T> {
        self.links(link.name()).iter().copied().map(T::wrap).collect()
    }
}
