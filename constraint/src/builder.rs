//! Declarative accumulation of property constraints.

use crate::constraint::{ConstraintRef, PropertyConstraint};
use crate::context::{EntityKind, Typed};
use crate::error::{ConstraintError, ConstraintResult};
use crate::format::{UriConstraint, UrlConstraint};
use crate::range::InRange;
use crate::require::RequireIf;
use crate::string::{CharClass, CharClassConstraint, ContainsNone, Email, Length, Pattern};
use std::marker::PhantomData;
use std::sync::Arc;

/// Property value types that accept `min`/`max` bounds.
pub trait NumericValue {}

impl NumericValue for i32 {}
impl NumericValue for i64 {}
impl NumericValue for f64 {}

/// Ordered list of constraints for one property of entity kind `K` with
/// value type `T`.
///
/// String-only operations exist on `ConstraintBuilder<K, String>`, bounds on
/// numeric value types, and `require_if` on every property. Every operation
/// takes an optional message that replaces the constraint's display
/// message.
///
/// Patterns that fail to compile are remembered and reported by
/// [`finish`](Self::finish), so declaration code can chain freely.
pub struct ConstraintBuilder<K, T> {
    constraints: Vec<ConstraintRef>,
    errors: Vec<ConstraintError>,
    _marker: PhantomData<fn() -> (K, T)>,
}

impl<K: EntityKind, T> Default for ConstraintBuilder<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: EntityKind, T> ConstraintBuilder<K, T> {
    pub fn new() -> Self {
        Self {
            constraints: Vec::new(),
            errors: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Append a constraint.
    pub fn add(&mut self, constraint: impl PropertyConstraint + 'static) -> &mut Self {
        self.constraints.push(Arc::new(constraint));
        self
    }

    fn add_checked<C: PropertyConstraint + 'static>(
        &mut self,
        constraint: ConstraintResult<C>,
    ) -> &mut Self {
        match constraint {
            Ok(constraint) => {
                self.constraints.push(Arc::new(constraint));
            }
            Err(e) => self.errors.push(e),
        }
        self
    }

    /// Require a value whenever `predicate` holds for the owning entity.
    pub fn require_if<F>(&mut self, message: Option<&str>, predicate: F) -> &mut Self
    where
        F: for<'a> Fn(&Typed<'a, K>) -> bool + Send + Sync + 'static,
    {
        self.add(RequireIf::<K>::new(message, predicate))
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// The constraints in declaration order, or the first declaration error.
    pub fn finish(self) -> ConstraintResult<Vec<ConstraintRef>> {
        match self.errors.into_iter().next() {
            Some(e) => Err(e),
            None => Ok(self.constraints),
        }
    }
}

impl<K: EntityKind> ConstraintBuilder<K, String> {
    /// The whole value must match `pattern`.
    pub fn regex(&mut self, pattern: &str, message: Option<&str>) -> &mut Self {
        self.add_checked(Pattern::new(pattern).map(|c| c.with_message(message)))
    }

    /// The value must be an email address; `pattern` replaces the default
    /// address pattern.
    pub fn email(&mut self, pattern: Option<&str>, message: Option<&str>) -> &mut Self {
        self.add_checked(Email::new(pattern).map(|c| c.with_message(message)))
    }

    pub fn contains_none(&mut self, chars: &str, message: Option<&str>) -> &mut Self {
        self.add(ContainsNone::new(chars).with_message(message))
    }

    pub fn alpha(&mut self, message: Option<&str>) -> &mut Self {
        self.add(CharClassConstraint::new(CharClass::Alpha).with_message(message))
    }

    pub fn numeric(&mut self, message: Option<&str>) -> &mut Self {
        self.add(CharClassConstraint::new(CharClass::Numeric).with_message(message))
    }

    pub fn alpha_numeric(&mut self, message: Option<&str>) -> &mut Self {
        self.add(CharClassConstraint::new(CharClass::AlphaNumeric).with_message(message))
    }

    pub fn url(&mut self, message: Option<&str>) -> &mut Self {
        self.add(UrlConstraint::new().with_message(message))
    }

    pub fn uri(&mut self, message: Option<&str>) -> &mut Self {
        self.add(UriConstraint::new().with_message(message))
    }

    /// Character count in `[min, max]`. Pass `0` or `usize::MAX` to leave a
    /// bound open.
    pub fn length(&mut self, min: usize, max: usize, message: Option<&str>) -> &mut Self {
        self.add(Length::new(min, max).with_message(message))
    }
}

impl<K: EntityKind, T: NumericValue> ConstraintBuilder<K, T> {
    pub fn min(&mut self, min: i64, message: Option<&str>) -> &mut Self {
        self.add(InRange::at_least(min).with_min_message(message))
    }

    pub fn max(&mut self, max: i64, message: Option<&str>) -> &mut Self {
        self.add(InRange::at_most(max).with_max_message(message))
    }
}
