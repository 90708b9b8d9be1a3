//! Conditional presence constraint.

use crate::constraint::PropertyConstraint;
use crate::context::{EntityKind, EntityView, Typed};
use crate::error::ConstraintResult;
use crate::violation::Violation;
use kith_core::Value;
use std::fmt;

type Predicate<K> = Box<dyn for<'a> Fn(&Typed<'a, K>) -> bool + Send + Sync>;

/// The property is required whenever `predicate` holds for the owning
/// entity.
///
/// This is the one constraint that needs the whole entity. The entity is
/// bound to kind `K` before the predicate runs; an entity of another kind is
/// a declaration bug and surfaces as [`ConstraintError::KindMismatch`].
///
/// [`ConstraintError::KindMismatch`]: crate::ConstraintError::KindMismatch
pub struct RequireIf<K: EntityKind> {
    message: Option<String>,
    predicate: Predicate<K>,
}

impl<K: EntityKind> RequireIf<K> {
    pub fn new<F>(message: Option<&str>, predicate: F) -> Self
    where
        F: for<'a> Fn(&Typed<'a, K>) -> bool + Send + Sync + 'static,
    {
        Self {
            message: message.map(str::to_string),
            predicate: Box::new(predicate),
        }
    }
}

impl<K: EntityKind> fmt::Debug for RequireIf<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequireIf")
            .field("kind", &K::TYPE_NAME)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl<K: EntityKind> PropertyConstraint for RequireIf<K> {
    fn kind(&self) -> &'static str {
        "requireIf"
    }

    /// A value alone never fails: absence only matters in entity context.
    fn is_valid(&self, _value: &Value) -> bool {
        true
    }

    fn exception_message(&self, property: &str, _value: &Value) -> String {
        format!("Value for {} is required", property)
    }

    fn display_message(&self, _property: &str, _value: &Value) -> String {
        self.message.clone().unwrap_or_else(|| "required".to_string())
    }

    fn check(
        &self,
        entity: &dyn EntityView,
        property: &str,
        value: &Value,
    ) -> ConstraintResult<Option<Violation>> {
        if !value.is_null() {
            return Ok(None);
        }
        let typed = Typed::<K>::bind(entity)?;
        if !(self.predicate)(&typed) {
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
