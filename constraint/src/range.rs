//! Numeric range constraint.

use crate::constraint::PropertyConstraint;
use kith_core::Value;

/// The value must lie within `[min, max]`. Unset bounds are open.
///
/// Absent and non-numeric values pass.
#[derive(Debug, Clone)]
pub struct InRange {
    min: Option<i64>,
    max: Option<i64>,
    min_message: String,
    max_message: String,
}

impl InRange {
    pub fn new(min: Option<i64>, max: Option<i64>) -> Self {
        Self {
            min,
            max,
            min_message: min
                .map(|m| format!("should be at least {}", m))
                .unwrap_or_default(),
            max_message: max
                .map(|m| format!("should be at most {}", m))
                .unwrap_or_default(),
        }
    }

    /// Lower bound only.
    pub fn at_least(min: i64) -> Self {
        Self::new(Some(min), None)
    }

    /// Upper bound only.
    pub fn at_most(max: i64) -> Self {
        Self::new(None, Some(max))
    }

    pub fn with_min_message(mut self, message: Option<&str>) -> Self {
        if let Some(message) = message {
            self.min_message = message.to_string();
        }
        self
    }

    pub fn with_max_message(mut self, message: Option<&str>) -> Self {
        if let Some(message) = message {
            self.max_message = message.to_string();
        }
        self
    }

    fn below_min(&self, value: &Value) -> bool {
        self.min.is_some_and(|min| !value.gte(min))
    }

    fn above_max(&self, value: &Value) -> bool {
        self.max.is_some_and(|max| !value.lte(max))
    }
}

impl PropertyConstraint for InRange {
    fn kind(&self) -> &'static str {
        "inRange"
    }

    fn is_valid(&self, value: &Value) -> bool {
        !self.below_min(value) && !self.above_max(value)
    }

    fn exception_message(&self, property: &str, value: &Value) -> String {
        let min = self.min.map(|m| m.to_string()).unwrap_or_else(|| "-inf".to_string());
        let max = self.max.map(|m| m.to_string()).unwrap_or_else(|| "inf".to_string());
        format!(
            "{} should be in range [{}, {}] but was {}",
            property, min, max, value
        )
    }

    fn display_message(&self, _property: &str, value: &Value) -> String {
        if self.below_min(value) {
            self.min_message.clone()
        } else {
            self.max_message.clone()
        }
    }
}
