//! Scenario definition and runner.

use std::collections::HashMap;

use kith_core::EntityId;
use kith_model::{DomainEntity, Model};
use kith_transaction::{Database, StoreConfig, Transaction, TransactionResult};
use tracing::debug;

use crate::assertion::Assertion;
use crate::error::ScenarioResult;

/// Entities created by earlier steps, by name.
#[derive(Debug, Default)]
pub struct Bindings {
    entities: HashMap<String, EntityId>,
}

impl Bindings {
    pub fn bind<E: DomainEntity>(&mut self, name: &str, entity: E) -> E {
        self.entities.insert(name.to_string(), entity.id());
        entity
    }

    pub fn get<E: DomainEntity>(&self, name: &str) -> Option<E> {
        self.entities.get(name).copied().map(E::wrap)
    }
}

type Action = Box<dyn Fn(&mut Transaction<'_>, &mut Bindings) -> TransactionResult<()>>;

struct Step {
    name: String,
    action: Action,
    assertion: Assertion,
}

/// A sequence of transactions against one database.
pub struct Scenario {
    name: String,
    model: fn() -> Model,
    config: StoreConfig,
    steps: Vec<Step>,
}

impl Scenario {
    pub fn new(name: &str, model: fn() -> Model) -> Self {
        Self {
            name: name.to_string(),
            model,
            config: StoreConfig::default(),
            steps: Vec::new(),
        }
    }

    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a step: `action` runs in its own transaction, which is committed
    /// if it returns `Ok`, and the outcome is checked by `expect`.
    pub fn step<A, X>(mut self, name: &str, action: A, expect: X) -> Self
    where
        A: Fn(&mut Transaction<'_>, &mut Bindings) -> TransactionResult<()> + 'static,
        X: FnOnce(Assertion) -> Assertion,
    {
        self.steps.push(Step {
            name: name.to_string(),
            action: Box::new(action),
            assertion: expect(Assertion::new()),
        });
        self
    }

    /// Run all steps in order and return the resulting database.
    pub fn run(&self) -> ScenarioResult<Database> {
        crate::init_tracing();
        let registry = (self.model)().build()?;
        let mut db = Database::new(registry).with_config(self.config.clone());
        let mut bindings = Bindings::default();

        for step in &self.steps {
            let mut tx = db.begin();
            let result = match (step.action)(&mut tx, &mut bindings) {
                Ok(()) => tx.commit(),
                Err(e) => {
                    tx.rollback();
                    Err(e)
                }
            };
            step.assertion.verify(&step.name, &result)?;
            debug!(scenario = %self.name, step = %step.name, "step passed");
        }

        Ok(db)
    }
}
