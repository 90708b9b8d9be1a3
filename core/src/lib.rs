//! Kith Core Types
//!
//! This crate provides the foundational types used throughout Kith:
//! - Identity types (EntityId, TypeId)
//! - Value types (the Value enum stored in entity properties)
//! - The stored entity record (properties plus named link sets)
//! - Common store error types

mod entity;
mod error;
mod id;
mod value;

pub use entity::*;
pub use error::*;
pub use id::*;
pub use value::*;
