//! Kith Model
//!
//! Typed domain layer over transactions: entity handles, typed property and
//! link accessors, and declarations that register entity types with their
//! constraints and opposite links.

mod declaration;
mod entity;
mod model;
mod typed;
mod value;

pub use declaration::{LinkDeclaration, Members, PropertyDeclaration, TypeDeclaration};
pub use entity::{DomainEntity, Link, Prop};
pub use model::Model;
pub use typed::TypedExt;
pub use value::PropertyValue;

pub use kith_constraint::{ConstraintBuilder, EntityKind, Typed};
pub use kith_registry::{Cardinality, OnTargetDelete};
