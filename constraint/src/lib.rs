//! Kith Constraint
//!
//! Property constraints and the protocol for evaluating them.
//!
//! Responsibilities:
//! - Define the constraint protocol (value check plus entity-aware check)
//! - Provide the built-in constraints (pattern, format, length, range, require-if)
//! - Accumulate constraints per property through [`ConstraintBuilder`]
//! - Produce violations carrying both a log message and a display message

mod builder;
mod constraint;
mod context;
mod error;
mod format;
mod range;
mod require;
mod string;
mod violation;

pub use builder::{ConstraintBuilder, NumericValue};
pub use constraint::{ConstraintRef, PropertyConstraint};
pub use context::{EntityKind, EntityView, Typed};
pub use error::{ConstraintError, ConstraintResult};
pub use format::{UriConstraint, UrlConstraint};
pub use range::InRange;
pub use require::RequireIf;
pub use string::{CharClass, CharClassConstraint, ContainsNone, Email, Length, Pattern};
pub use violation::{Violation, Violations};
