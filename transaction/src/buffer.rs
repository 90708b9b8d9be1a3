//! Change log for rolling back a transaction.

use kith_core::{EntityId, StoreResult, Value};
use kith_store::{EntityStore, RemovedEntity};
use std::collections::BTreeSet;
use tracing::warn;

/// One applied change, with what is needed to undo it.
#[derive(Debug, Clone)]
pub enum Change {
    /// Entity created.
    Created(EntityId),
    /// Entity deleted; holds the removed record.
    Deleted(RemovedEntity),
    /// Property written; holds the previous value.
    PropertySet {
        id: EntityId,
        name: String,
        old: Option<Value>,
    },
    LinkAdded {
        source: EntityId,
        link: String,
        target: EntityId,
    },
    /// Link removed; `index` is where the target sat.
    LinkRemoved {
        source: EntityId,
        link: String,
        index: usize,
        target: EntityId,
    },
}

impl Change {
    /// Revert this change in the store.
    fn undo(self, store: &mut EntityStore) -> StoreResult<()> {
        match self {
            Change::Created(id) => store.delete_entity(id).map(drop),
            Change::Deleted(removed) => store.restore_entity(removed),
            Change::PropertySet { id, name, old } => store
                .set_property(id, &name, old.unwrap_or(Value::Null))
                .map(drop),
            Change::LinkAdded {
                source,
                link,
                target,
            } => store.remove_link(source, &link, target).map(drop),
            Change::LinkRemoved {
                source,
                link,
                index,
                target,
            } => store.insert_link(source, &link, index, target).map(drop),
        }
    }
}

/// Changes applied by a transaction, in order, and the entities they touched.
#[derive(Debug, Clone, Default)]
pub struct ChangeLog {
    changes: Vec<Change>,
    touched: BTreeSet<EntityId>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change made to `entity`.
    pub fn record(&mut self, entity: EntityId, change: Change) {
        self.touched.insert(entity);
        self.changes.push(change);
    }

    /// Entities whose state changed, in id order.
    pub fn touched(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.touched.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Undo every change recorded after `mark`, newest first.
    ///
    /// Touched entities are kept; validation skips the ones that no longer
    /// exist.
    pub fn undo_to(&mut self, mark: usize, store: &mut EntityStore) {
        while self.changes.len() > mark {
            if let Some(change) = self.changes.pop() {
                // only fails when the store was changed outside this log
                if let Err(e) = change.undo(store) {
                    warn!(error = %e, "rollback step failed, store may be inconsistent");
                }
            }
        }
    }

    /// Undo everything and forget the touched set.
    pub fn undo_all(&mut self, store: &mut EntityStore) {
        self.undo_to(0, store);
        self.touched.clear();
    }

    pub fn clear(&mut self) {
        self.changes.clear();
        self.touched.clear();
    }
}
