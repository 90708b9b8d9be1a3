//! Commit-time validation of mutated entities.

use crate::config::{StoreConfig, ValidationPolicy};
use crate::view::EntityRef;
use kith_constraint::{ConstraintResult, Violation, Violations};
use kith_core::{EntityId, Value};
use kith_registry::{LinkDef, PropertyDef, Registry};
use kith_store::EntityStore;

static NULL: Value = Value::Null;

/// Checks entities against their declared properties and links.
pub(crate) struct CommitValidator<'a> {
    registry: &'a Registry,
    store: &'a EntityStore,
    config: &'a StoreConfig,
}

impl<'a> CommitValidator<'a> {
    pub fn new(registry: &'a Registry, store: &'a EntityStore, config: &'a StoreConfig) -> Self {
        Self {
            registry,
            store,
            config,
        }
    }

    /// Validate the given entities. Ids no longer in the store are skipped.
    pub fn validate(&self, ids: impl IntoIterator<Item = EntityId>) -> ConstraintResult<Violations> {
        let mut violations = Violations::new();
        for id in ids {
            let Some(entity) = self.store.get(id) else {
                continue;
            };
            let view = EntityRef::new(self.registry, entity);

            for property in self.registry.all_properties(entity.type_id) {
                self.check_property(&view, property, &mut violations)?;
            }
            if self.config.enforce_link_cardinality {
                for link in self.registry.all_links(entity.type_id) {
                    check_link(&view, link, &mut violations);
                }
            }
        }

        Ok(violations)
    }

    fn check_property(
        &self,
        view: &EntityRef<'_>,
        property: &PropertyDef,
        violations: &mut Violations,
    ) -> ConstraintResult<()> {
        let value = view.entity().get_property(&property.name).unwrap_or(&NULL);

        if property.required && value.is_null() {
            violations.push(
                Violation::new(
                    "required",
                    format!("Value for {} is required", property.name),
                    "required",
                )
                .at(view, &property.name),
            );
            return Ok(());
        }

        for constraint in &property.constraints {
            if let Some(violation) = constraint.check(view, &property.name, value)? {
                violations.push(violation);
                if self.config.validation == ValidationPolicy::FirstPerProperty {
                    break;
                }
            }
        }
        Ok(())
    }
}

fn check_link(view: &EntityRef<'_>, link: &LinkDef, violations: &mut Violations) {
    let count = view.entity().links(&link.name).len();
    if link.cardinality.admits(count) {
        return;
    }
    let display = if count == 0 {
        "required".to_string()
    } else {
        format!("should have {} link(s)", link.cardinality)
    };
    violations.push(
        Violation::new(
            "cardinality",
            format!(
                "{} should have {} link(s) but had {}",
                link.name, link.cardinality, count
            ),
            display,
        )
        .at(view, &link.name),
    );
}
