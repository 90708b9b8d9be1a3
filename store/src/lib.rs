//! Kith Entity Store
//!
//! In-memory host store for typed entities:
//! - Entity storage with property maps and named link sets
//! - Type index: find entities by type
//! - Inbound index: find the entities linking to an entity
//!
//! The store knows nothing about the schema. Opposite links, cardinality and
//! validation are the transaction layer's business.

mod index;
mod store;

pub use store::*;
