//! The property constraint protocol.

use crate::context::EntityView;
use crate::error::ConstraintResult;
use crate::violation::Violation;
use kith_core::Value;
use std::fmt;
use std::sync::Arc;

/// A validation rule attached to one property.
///
/// Constraints are immutable once registered and must be free of side
/// effects: they run on every commit for every mutated entity.
pub trait PropertyConstraint: Send + Sync + fmt::Debug {
    /// Short name of the constraint kind, reported in violations.
    fn kind(&self) -> &'static str;

    /// Check a value on its own. Absent values are `Value::Null`.
    fn is_valid(&self, value: &Value) -> bool;

    /// Message for logs.
    fn exception_message(&self, property: &str, value: &Value) -> String;

    /// Message for end users.
    fn display_message(&self, property: &str, value: &Value) -> String;

    /// Check a property of a whole entity.
    ///
    /// The default defers to [`is_valid`](Self::is_valid). Constraints that
    /// need the owning entity override this instead.
    fn check(
        &self,
        entity: &dyn EntityView,
        property: &str,
        value: &Value,
    ) -> ConstraintResult<Option<Violation>> {
        if self.is_valid(value) {
            return Ok(None);
        }
        Ok(Some(
            Violation::new(
                self.kind(),
                self.exception_message(property, value),
                self.display_message(property, value),
            )
            .at(entity, property),
        ))
    }
}

/// Shared handle to a registered constraint.
pub type ConstraintRef = Arc<dyn PropertyConstraint>;
