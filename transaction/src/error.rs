//! Transaction error types.

use kith_constraint::{ConstraintError, Violations};
use kith_core::{EntityId, StoreError};
use thiserror::Error;

/// Commit rejected because mutated entities violate their constraints.
#[derive(Debug, Clone, Error)]
#[error("{} constraint violation(s): {}", .violations.len(), .violations)]
pub struct ConstraintsValidationError {
    pub violations: Violations,
}

impl ConstraintsValidationError {
    pub fn new(violations: Violations) -> Self {
        Self { violations }
    }

    pub fn violations(&self) -> &Violations {
        &self.violations
    }
}

/// Transaction errors.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// Entity type not in the registry.
    #[error("unknown entity type: {name}")]
    UnknownType { name: String },

    /// Abstract types have no instances.
    #[error("cannot instantiate abstract type {name}")]
    AbstractType { name: String },

    /// Entity does not exist (or was deleted in this transaction).
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error("unknown property {type_name}.{property}")]
    UnknownProperty { type_name: String, property: String },

    #[error("unknown link {type_name}.{link}")]
    UnknownLink { type_name: String, link: String },

    /// Value does not fit the declared property type.
    #[error("{type_name}.{property} expects {expected}, got {actual}")]
    PropertyTypeMismatch {
        type_name: String,
        property: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Link target is not an instance of the declared target type.
    #[error("{type_name}.{link} targets {expected}, got {actual}")]
    LinkTargetMismatch {
        type_name: String,
        link: String,
        expected: String,
        actual: String,
    },

    /// Single-target operation used on a multi-valued link.
    #[error("{type_name}.{link} holds many targets")]
    NotSingleValued { type_name: String, link: String },

    /// A link with on-delete `Fail` still points at the entity.
    #[error("cannot delete {entity}: referenced by {referrer} through {link}")]
    DeleteRestricted {
        entity: EntityId,
        referrer: EntityId,
        link: String,
    },

    /// Commit rejected; the transaction was rolled back.
    #[error(transparent)]
    Validation(#[from] ConstraintsValidationError),

    /// A constraint could not be evaluated.
    #[error("constraint error: {0}")]
    Constraint(#[from] ConstraintError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl TransactionError {
    pub fn unknown_type(name: impl Into<String>) -> Self {
        Self::UnknownType { name: name.into() }
    }

    pub fn unknown_property(type_name: impl Into<String>, property: impl Into<String>) -> Self {
        Self::UnknownProperty {
            type_name: type_name.into(),
            property: property.into(),
        }
    }

    pub fn unknown_link(type_name: impl Into<String>, link: impl Into<String>) -> Self {
        Self::UnknownLink {
            type_name: type_name.into(),
            link: link.into(),
        }
    }

    pub fn not_single_valued(type_name: impl Into<String>, link: impl Into<String>) -> Self {
        Self::NotSingleValued {
            type_name: type_name.into(),
            link: link.into(),
        }
    }

    /// Violations of a rejected commit, if that is what this error is.
    pub fn violations(&self) -> Option<&Violations> {
        match self {
            Self::Validation(e) => Some(&e.violations),
            _ => None,
        }
    }
}

/// Result type for transaction operations.
pub type TransactionResult<T> = Result<T, TransactionError>;
