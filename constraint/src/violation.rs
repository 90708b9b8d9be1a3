//! Constraint violation types.

use crate::context::EntityView;
use kith_core::EntityId;
use std::fmt;

/// A failed property constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Kind of the constraint that failed (`regex`, `length`, `required`, ...).
    pub constraint: String,
    /// Message for logs, naming the property and the offending value.
    pub message: String,
    /// Message for end users.
    pub display_message: String,
    /// The entity the property belongs to.
    pub entity_id: Option<EntityId>,
    /// Concrete type of that entity.
    pub type_name: Option<String>,
    /// The property (or link) that failed.
    pub property: Option<String>,
}

impl Violation {
    /// Create a new violation.
    pub fn new(
        constraint: impl Into<String>,
        message: impl Into<String>,
        display_message: impl Into<String>,
    ) -> Self {
        Self {
            constraint: constraint.into(),
            message: message.into(),
            display_message: display_message.into(),
            entity_id: None,
            type_name: None,
            property: None,
        }
    }

    /// Attach the entity and property the violation was found on.
    pub fn at(mut self, entity: &dyn EntityView, property: &str) -> Self {
        self.entity_id = Some(entity.id());
        self.type_name = Some(entity.type_name().to_string());
        self.property = Some(property.to_string());
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.type_name, self.entity_id) {
            (Some(type_name), Some(id)) => write!(f, "{}[{}]: {}", type_name, id, self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}

/// Collection of violations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations {
    violations: Vec<Violation>,
}

impl Violations {
    /// Create a new empty violations collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a violation.
    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Check if there are any violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Get all violations.
    pub fn all(&self) -> &[Violation] {
        &self.violations
    }

    /// Get the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Violations reported for one property.
    pub fn for_property<'a>(&'a self, property: &'a str) -> impl Iterator<Item = &'a Violation> {
        self.violations
            .iter()
            .filter(move |v| v.property.as_deref() == Some(property))
    }

    /// Keep at most `max` violations.
    pub fn truncate(&mut self, max: usize) {
        self.violations.truncate(max);
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}
