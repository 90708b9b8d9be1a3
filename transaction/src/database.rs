//! The database: registry, store and configuration.

use crate::config::StoreConfig;
use crate::manager::Transaction;
use kith_core::{Entity, EntityId};
use kith_registry::Registry;
use kith_store::EntityStore;

/// Owns the committed state. Writes go through [`Transaction`]s, one at a
/// time.
#[derive(Debug)]
pub struct Database {
    registry: Registry,
    store: EntityStore,
    config: StoreConfig,
}

impl Database {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            store: EntityStore::new(),
            config: StoreConfig::default(),
        }
    }

    pub fn with_config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Begin a transaction.
    pub fn begin(&mut self) -> Transaction<'_> {
        Transaction::new(&self.registry, &mut self.store, &self.config)
    }

    /// Run `f` in a transaction, committing on `Ok` and rolling back on
    /// `Err`.
    pub fn transactional<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<T, E>,
        E: From<crate::TransactionError>,
    {
        let mut tx = self.begin();
        match f(&mut tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(e) => {
                tx.rollback();
                Err(e)
            }
        }
    }

    /// Committed state of an entity.
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.store.get(id)
    }

    pub fn entity_count(&self) -> usize {
        self.store.entity_count()
    }
}
