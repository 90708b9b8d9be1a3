//! Kith integration test harness.
//!
//! Scenarios run a sequence of steps against a fresh database. Each step is
//! one transaction; its outcome (commit, rejected commit, or error) is
//! checked against an [`Assertion`].

pub mod assertion;
pub mod scenario;

pub use assertion::Assertion;
pub use error::{ScenarioError, ScenarioResult};
pub use scenario::{Bindings, Scenario};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Route `tracing` output to the test harness. Safe to call from every test.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

/// Everything a scenario file needs.
pub mod prelude {
    pub use crate::domain::{spy_model, user_model, Person, Spy, User};
    pub use crate::{init_tracing, Assertion, Bindings, Scenario, ScenarioError};
    pub use kith_constraint::{Violation, Violations};
    pub use kith_core::{EntityId, Value};
    pub use kith_model::{
        Cardinality, ConstraintBuilder, DomainEntity, EntityKind, Link, Model, OnTargetDelete,
        Prop, Typed, TypedExt,
    };
    pub use kith_registry::{Registry, RegistryError};
    pub use kith_transaction::{
        Database, StoreConfig, Transaction, TransactionError, TransactionResult, ValidationPolicy,
    };
}
