//! Kith Registry
//!
//! Runtime schema lookup: entity types, their properties, links and
//! constraints. Built in two phases by [`RegistryBuilder`] (declare in any
//! order, then resolve) and immutable afterwards.

mod builder;
mod registry;
mod types;

pub use builder::{ExtensionBuilder, RegistryBuilder, RegistryError, TypeBuilder};
pub use registry::Registry;
pub use types::*;
