//! Transactions over the entity store.

use crate::buffer::{Change, ChangeLog};
use crate::config::StoreConfig;
use crate::error::{ConstraintsValidationError, TransactionError, TransactionResult};
use crate::validation::CommitValidator;
use crate::view::EntityRef;
use kith_constraint::Violations;
use kith_core::{Entity, EntityId, Properties, TypeId, Value};
use kith_registry::{LinkDef, OnTargetDelete, PropertyDef, Registry, TypeDef};
use kith_store::EntityStore;
use std::collections::HashSet;
use tracing::{debug, warn};

/// A single-writer transaction.
///
/// Changes are applied to the store immediately and recorded for rollback,
/// so every read inside the transaction sees its own writes. Opposite links
/// are updated together with the link that was changed.
///
/// [`commit`](Self::commit) validates every entity touched by the
/// transaction and rolls everything back if any constraint fails. Dropping
/// a transaction without committing rolls it back as well.
pub struct Transaction<'d> {
    registry: &'d Registry,
    store: &'d mut EntityStore,
    config: &'d StoreConfig,
    log: ChangeLog,
    finished: bool,
}

impl<'d> Transaction<'d> {
    pub(crate) fn new(
        registry: &'d Registry,
        store: &'d mut EntityStore,
        config: &'d StoreConfig,
    ) -> Self {
        debug!("transaction begin");
        Self {
            registry,
            store,
            config,
            log: ChangeLog::new(),
            finished: false,
        }
    }

    pub fn registry(&self) -> &'d Registry {
        self.registry
    }

    /// Changes applied so far.
    pub fn changes(&self) -> &ChangeLog {
        &self.log
    }

    // ========== Lifecycle ==========

    /// Validate all touched entities and make the changes permanent.
    ///
    /// On violations the transaction is rolled back and the violations are
    /// returned as [`TransactionError::Validation`].
    pub fn commit(mut self) -> TransactionResult<()> {
        self.finished = true;

        let mut violations = match self.validate() {
            Ok(violations) => violations,
            Err(e) => {
                self.log.undo_all(self.store);
                return Err(e);
            }
        };
        if !violations.is_empty() {
            warn!(
                violations = violations.len(),
                changes = self.log.len(),
                "commit rejected, rolling back"
            );
            self.log.undo_all(self.store);
            // a rejected commit reports at least one violation
            if let Some(max) = self.config.max_reported_violations {
                violations.truncate(max.max(1));
            }
            return Err(ConstraintsValidationError::new(violations).into());
        }

        debug!(changes = self.log.len(), "transaction commit");
        self.log.clear();
        Ok(())
    }

    /// Discard all changes.
    pub fn rollback(mut self) {
        self.finished = true;
        self.undo();
    }

    fn undo(&mut self) {
        debug!(changes = self.log.len(), "transaction rollback");
        self.log.undo_all(self.store);
    }

    /// Run commit-time validation without committing.
    pub fn validate(&self) -> TransactionResult<Violations> {
        let validator = CommitValidator::new(self.registry, self.store, self.config);
        Ok(validator.validate(self.log.touched())?)
    }

    // ========== Entities ==========

    /// Create an entity of the named type with its property defaults.
    pub fn new_entity(&mut self, type_name: &str) -> TransactionResult<EntityId> {
        let type_def = self
            .registry
            .get_type_by_name(type_name)
            .ok_or_else(|| TransactionError::unknown_type(type_name))?;
        if type_def.is_abstract {
            return Err(TransactionError::AbstractType {
                name: type_def.name.clone(),
            });
        }

        let defaults: Properties = self
            .registry
            .all_properties(type_def.id)
            .into_iter()
            .filter_map(|p| p.default.clone().map(|v| (p.name.clone(), v)))
            .collect();
        let id = self.store.create_entity(type_def.id, defaults);
        self.log.record(id, Change::Created(id));
        debug!(entity = %id, type_name, "entity created");
        Ok(id)
    }

    pub fn exists(&self, id: EntityId) -> bool {
        self.store.contains(id)
    }

    pub fn entity(&self, id: EntityId) -> TransactionResult<&Entity> {
        self.store.get(id).ok_or(TransactionError::EntityNotFound(id))
    }

    /// The entity as seen by constraints.
    pub fn view(&self, id: EntityId) -> TransactionResult<EntityRef<'_>> {
        Ok(EntityRef::new(self.registry, self.entity(id)?))
    }

    pub fn type_of(&self, id: EntityId) -> TransactionResult<&'d TypeDef> {
        let type_id = self.entity(id)?.type_id;
        self.registry
            .get_type(type_id)
            .ok_or_else(|| TransactionError::unknown_type(type_id.to_string()))
    }

    /// Whether the entity is of the named type or one of its subtypes.
    pub fn is_instance_of(&self, id: EntityId, type_name: &str) -> TransactionResult<bool> {
        let type_id = self.entity(id)?.type_id;
        Ok(self
            .registry
            .get_type_id(type_name)
            .is_some_and(|t| self.registry.is_subtype(type_id, t)))
    }

    /// Delete an entity.
    ///
    /// Its outgoing links are removed together with their opposites. Links
    /// pointing at it follow their on-delete policy. If the delete fails, no
    /// part of it is applied.
    pub fn delete_entity(&mut self, id: EntityId) -> TransactionResult<()> {
        self.entity(id)?;
        let mark = self.log.len();
        let mut deleting = HashSet::new();
        if let Err(e) = self.delete_cascading(id, &mut deleting) {
            self.log.undo_to(mark, self.store);
            return Err(e);
        }
        Ok(())
    }

    fn delete_cascading(
        &mut self,
        id: EntityId,
        deleting: &mut HashSet<EntityId>,
    ) -> TransactionResult<()> {
        if !self.store.contains(id) || !deleting.insert(id) {
            return Ok(());
        }

        let inbound: Vec<(EntityId, String)> = self
            .store
            .inbound(id)
            .map(|(source, link)| (source, link.to_string()))
            .collect();
        let mut cascade = Vec::new();
        for (source, link) in &inbound {
            if *source == id || deleting.contains(source) {
                continue;
            }
            match self.link_def(*source, link)?.on_target_delete {
                OnTargetDelete::Clear => {}
                OnTargetDelete::Cascade => cascade.push(*source),
                OnTargetDelete::Fail => {
                    return Err(TransactionError::DeleteRestricted {
                        entity: id,
                        referrer: *source,
                        link: link.clone(),
                    })
                }
            }
        }
        for source in cascade {
            self.delete_cascading(source, deleting)?;
        }

        let outgoing: Vec<(String, EntityId)> = self
            .entity(id)?
            .all_links()
            .map(|(link, target)| (link.to_string(), target))
            .collect();
        let registry = self.registry;
        for (link, target) in outgoing {
            let def = self.link_def(id, &link)?;
            self.unlink_pair(id, def, registry.opposite_of(def), target)?;
        }

        let remaining: Vec<(EntityId, String)> = self
            .store
            .inbound(id)
            .map(|(source, link)| (source, link.to_string()))
            .collect();
        for (source, link) in remaining {
            let def = self.link_def(source, &link)?;
            self.unlink_pair(source, def, registry.opposite_of(def), id)?;
        }

        let removed = self.store.delete_entity(id)?;
        self.log.record(id, Change::Deleted(removed));
        debug!(entity = %id, "entity deleted");
        Ok(())
    }

    // ========== Properties ==========

    fn property_def(&self, id: EntityId, name: &str) -> TransactionResult<&'d PropertyDef> {
        let type_def = self.type_of(id)?;
        self.registry
            .find_property(type_def.id, name)
            .ok_or_else(|| TransactionError::unknown_property(&type_def.name, name))
    }

    /// Read a property; `None` when absent.
    pub fn get_property(&self, id: EntityId, name: &str) -> TransactionResult<Option<&Value>> {
        self.property_def(id, name)?;
        Ok(self.entity(id)?.get_property(name))
    }

    /// Write a property. `Value::Null` clears it.
    pub fn set_property(
        &mut self,
        id: EntityId,
        name: &str,
        value: impl Into<Value>,
    ) -> TransactionResult<()> {
        let value = value.into();
        let def = self.property_def(id, name)?;
        if !def.property_type.accepts(&value) {
            return Err(TransactionError::PropertyTypeMismatch {
                type_name: self.type_of(id)?.name.clone(),
                property: name.to_string(),
                expected: def.property_type.name(),
                actual: value.type_name(),
            });
        }

        let old = self.store.set_property(id, name, value)?;
        self.log.record(
            id,
            Change::PropertySet {
                id,
                name: name.to_string(),
                old,
            },
        );
        Ok(())
    }

    // ========== Links ==========

    fn link_def(&self, id: EntityId, name: &str) -> TransactionResult<&'d LinkDef> {
        let type_def = self.type_of(id)?;
        self.registry
            .find_link(type_def.id, name)
            .ok_or_else(|| TransactionError::unknown_link(&type_def.name, name))
    }

    fn single_valued_def(&self, id: EntityId, name: &str) -> TransactionResult<&'d LinkDef> {
        let def = self.link_def(id, name)?;
        if def.cardinality.is_multi() {
            return Err(TransactionError::not_single_valued(&self.type_of(id)?.name, name));
        }
        Ok(def)
    }

    /// Targets of a link.
    pub fn links(&self, id: EntityId, name: &str) -> TransactionResult<&[EntityId]> {
        self.link_def(id, name)?;
        Ok(self.store.links(id, name)?)
    }

    /// Target of a single-valued link.
    pub fn link(&self, id: EntityId, name: &str) -> TransactionResult<Option<EntityId>> {
        self.single_valued_def(id, name)?;
        Ok(self.store.links(id, name)?.first().copied())
    }

    /// Link `source` to `target`, replacing the previous target of a
    /// single-valued link and updating the opposite side.
    pub fn add_link(&mut self, source: EntityId, name: &str, target: EntityId) -> TransactionResult<()> {
        let registry = self.registry;
        let def = self.link_def(source, name)?;
        self.check_target(source, def, target)?;
        if self.store.links(source, name)?.contains(&target) {
            return Ok(());
        }

        let opposite = registry.opposite_of(def);
        if !def.cardinality.is_multi() {
            let previous = self.store.links(source, name)?.to_vec();
            for old in previous {
                self.unlink_pair(source, def, opposite, old)?;
            }
        }
        self.link_pair(source, def, opposite, target)
    }

    /// Unlink `source` from `target` on both sides. Returns false if they
    /// were not linked.
    pub fn remove_link(
        &mut self,
        source: EntityId,
        name: &str,
        target: EntityId,
    ) -> TransactionResult<bool> {
        let registry = self.registry;
        let def = self.link_def(source, name)?;
        if !self.store.links(source, name)?.contains(&target) {
            return Ok(false);
        }
        self.unlink_pair(source, def, registry.opposite_of(def), target)?;
        Ok(true)
    }

    /// Set or clear a single-valued link.
    pub fn set_link(
        &mut self,
        source: EntityId,
        name: &str,
        target: Option<EntityId>,
    ) -> TransactionResult<()> {
        self.single_valued_def(source, name)?;
        match target {
            Some(target) => self.add_link(source, name, target),
            None => self.clear_links(source, name),
        }
    }

    /// Remove every target of a link, on both sides.
    pub fn clear_links(&mut self, source: EntityId, name: &str) -> TransactionResult<()> {
        let registry = self.registry;
        let def = self.link_def(source, name)?;
        let opposite = registry.opposite_of(def);
        let previous = self.store.links(source, name)?.to_vec();
        for old in previous {
            self.unlink_pair(source, def, opposite, old)?;
        }
        Ok(())
    }

    fn check_target(&self, source: EntityId, def: &LinkDef, target: EntityId) -> TransactionResult<()> {
        let target_type = self.entity(target)?.type_id;
        let accepted = def
            .target_id
            .is_some_and(|expected| self.registry.is_subtype(target_type, expected));
        if !accepted {
            return Err(TransactionError::LinkTargetMismatch {
                type_name: self.type_of(source)?.name.clone(),
                link: def.name.clone(),
                expected: def.target.clone(),
                actual: self.registry.type_name(target_type).to_string(),
            });
        }
        Ok(())
    }

    fn link_pair(
        &mut self,
        source: EntityId,
        def: &'d LinkDef,
        opposite: Option<&'d LinkDef>,
        target: EntityId,
    ) -> TransactionResult<()> {
        self.attach(source, &def.name, target)?;
        if let Some(opposite) = opposite {
            if !opposite.cardinality.is_multi() {
                let previous = self.store.links(target, &opposite.name)?.to_vec();
                for old in previous.into_iter().filter(|old| *old != source) {
                    self.unlink_pair(target, opposite, Some(def), old)?;
                }
            }
            self.attach(target, &opposite.name, source)?;
            debug!(%source, %target, link = %def.name, opposite = %opposite.name, "opposite linked");
        }
        Ok(())
    }

    fn unlink_pair(
        &mut self,
        source: EntityId,
        def: &LinkDef,
        opposite: Option<&LinkDef>,
        target: EntityId,
    ) -> TransactionResult<()> {
        self.detach(source, &def.name, target)?;
        if let Some(opposite) = opposite {
            self.detach(target, &opposite.name, source)?;
        }
        Ok(())
    }

    fn attach(&mut self, source: EntityId, link: &str, target: EntityId) -> TransactionResult<()> {
        if self.store.add_link(source, link, target)? {
            self.log.record(
                source,
                Change::LinkAdded {
                    source,
                    link: link.to_string(),
                    target,
                },
            );
        }
        Ok(())
    }

    fn detach(&mut self, source: EntityId, link: &str, target: EntityId) -> TransactionResult<()> {
        if !self.store.contains(source) {
            return Ok(());
        }
        let Some(index) = self.entity(source)?.link_position(link, target) else {
            return Ok(());
        };
        self.store.remove_link(source, link, target)?;
        self.log.record(
            source,
            Change::LinkRemoved {
                source,
                link: link.to_string(),
                index,
                target,
            },
        );
        Ok(())
    }

    // ========== Lookups ==========

    fn type_and_subtypes(&self, type_name: &str) -> TransactionResult<Vec<TypeId>> {
        let type_id = self
            .registry
            .get_type_id(type_name)
            .ok_or_else(|| TransactionError::unknown_type(type_name))?;
        let mut types = vec![type_id];
        types.extend(self.registry.get_subtypes(type_id));
        Ok(types)
    }

    /// All entities of the named type and its subtypes, in id order.
    pub fn all_of_type(&self, type_name: &str) -> TransactionResult<Vec<EntityId>> {
        let mut ids: Vec<EntityId> = self
            .type_and_subtypes(type_name)?
            .into_iter()
            .flat_map(|t| self.store.entities_by_type(t))
            .collect();
        ids.sort();
        Ok(ids)
    }

    /// Entities of the named type (or a subtype) whose property equals
    /// `value`, in id order.
    pub fn find_by_property(
        &self,
        type_name: &str,
        property: &str,
        value: &Value,
    ) -> TransactionResult<Vec<EntityId>> {
        let types = self.type_and_subtypes(type_name)?;
        let mut ids: Vec<EntityId> = types
            .into_iter()
            .flat_map(|t| self.store.entities_by_property(t, property, value))
            .collect();
        ids.sort();
        Ok(ids)
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.finished && !self.log.is_empty() {
            self.undo();
        }
    }
}
