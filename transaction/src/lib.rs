//! Kith Transaction
//!
//! Single-writer transactions over the in-memory store.
//!
//! Responsibilities:
//! - Apply changes directly and track them for rollback
//! - Keep opposite links consistent inside the transaction
//! - Apply on-delete policies of inbound links
//! - Validate every mutated entity at commit and aggregate violations

mod buffer;
mod config;
mod database;
mod error;
mod manager;
mod validation;
mod view;

pub use buffer::{Change, ChangeLog};
pub use config::{ConfigError, StoreConfig, ValidationPolicy};
pub use database::Database;
pub use error::{ConstraintsValidationError, TransactionError, TransactionResult};
pub use manager::Transaction;
pub use view::EntityRef;
