//! Constraints over string properties.
//!
//! Every constraint here passes absent values and values that are not
//! strings; nullability is policed by `required` and `require_if`.

use crate::constraint::PropertyConstraint;
use crate::error::{ConstraintError, ConstraintResult};
use kith_core::Value;
use regex_lite::Regex;

const DEFAULT_EMAIL_PATTERN: &str =
    r"[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@([A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}";

/// Compile `pattern` so that it must match the whole value.
fn compile_full_match(pattern: &str) -> ConstraintResult<Regex> {
    Regex::new(&format!("^(?:{})$", pattern))
        .map_err(|e| ConstraintError::invalid_pattern(pattern, e.to_string()))
}

fn string_passes(value: &Value, check: impl FnOnce(&str) -> bool) -> bool {
    match value {
        Value::String(s) => check(s),
        _ => true,
    }
}

/// The value must match a regular expression in full.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
    message: String,
}

impl Pattern {
    pub fn new(pattern: &str) -> ConstraintResult<Self> {
        Ok(Self {
            source: pattern.to_string(),
            regex: compile_full_match(pattern)?,
            message: "does not match the pattern".to_string(),
        })
    }

    pub fn with_message(mut self, message: Option<&str>) -> Self {
        if let Some(message) = message {
            self.message = message.to_string();
        }
        self
    }

    pub fn pattern(&self) -> &str {
        &self.source
    }
}

impl PropertyConstraint for Pattern {
    fn kind(&self) -> &'static str {
        "regex"
    }

    fn is_valid(&self, value: &Value) -> bool {
        string_passes(value, |s| self.regex.is_match(s))
    }

    fn exception_message(&self, property: &str, value: &Value) -> String {
        format!(
            "{} should match pattern {} but was {}",
            property, self.source, value
        )
    }

    fn display_message(&self, _property: &str, _value: &Value) -> String {
        self.message.clone()
    }
}

/// The value must be an email address.
#[derive(Debug, Clone)]
pub struct Email {
    regex: Regex,
    message: String,
}

impl Email {
    /// Use `pattern` instead of the built-in address pattern when given.
    pub fn new(pattern: Option<&str>) -> ConstraintResult<Self> {
        Ok(Self {
            regex: compile_full_match(pattern.unwrap_or(DEFAULT_EMAIL_PATTERN))?,
            message: "is not a valid email".to_string(),
        })
    }

    pub fn with_message(mut self, message: Option<&str>) -> Self {
        if let Some(message) = message {
            self.message = message.to_string();
        }
        self
    }
}

impl PropertyConstraint for Email {
    fn kind(&self) -> &'static str {
        "email"
    }

    fn is_valid(&self, value: &Value) -> bool {
        string_passes(value, |s| self.regex.is_match(s))
    }

    fn exception_message(&self, property: &str, value: &Value) -> String {
        format!("{} should be a valid email but was {}", property, value)
    }

    fn display_message(&self, _property: &str, _value: &Value) -> String {
        self.message.clone()
    }
}

/// The value must not contain any of the given characters.
#[derive(Debug, Clone)]
pub struct ContainsNone {
    chars: String,
    message: String,
}

impl ContainsNone {
    pub fn new(chars: &str) -> Self {
        Self {
            chars: chars.to_string(),
            message: format!("shouldn't contain characters {}", chars),
        }
    }

    pub fn with_message(mut self, message: Option<&str>) -> Self {
        if let Some(message) = message {
            self.message = message.to_string();
        }
        self
    }
}

impl PropertyConstraint for ContainsNone {
    fn kind(&self) -> &'static str {
        "containsNone"
    }

    fn is_valid(&self, value: &Value) -> bool {
        string_passes(value, |s| !s.chars().any(|c| self.chars.contains(c)))
    }

    fn exception_message(&self, property: &str, value: &Value) -> String {
        format!(
            "{} shouldn't contain any of '{}' but was {}",
            property, self.chars, value
        )
    }

    fn display_message(&self, _property: &str, _value: &Value) -> String {
        self.message.clone()
    }
}

/// Character classes for [`CharClassConstraint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Letters only.
    Alpha,
    /// Decimal digits `0-9` only.
    Numeric,
    /// Letters and decimal digits `0-9` only.
    AlphaNumeric,
}

impl CharClass {
    fn admits(self, c: char) -> bool {
        match self {
            CharClass::Alpha => c.is_alphabetic(),
            CharClass::Numeric => c.is_ascii_digit(),
            CharClass::AlphaNumeric => c.is_alphabetic() || c.is_ascii_digit(),
        }
    }

    fn kind(self) -> &'static str {
        match self {
            CharClass::Alpha => "alpha",
            CharClass::Numeric => "numeric",
            CharClass::AlphaNumeric => "alphaNumeric",
        }
    }

    fn description(self) -> &'static str {
        match self {
            CharClass::Alpha => "letters",
            CharClass::Numeric => "digits",
            CharClass::AlphaNumeric => "letters and digits",
        }
    }
}

/// Every character of the value must belong to a [`CharClass`].
///
/// The empty string passes.
#[derive(Debug, Clone)]
pub struct CharClassConstraint {
    class: CharClass,
    message: String,
}

impl CharClassConstraint {
    pub fn new(class: CharClass) -> Self {
        Self {
            class,
            message: format!("should contain only {}", class.description()),
        }
    }

    pub fn with_message(mut self, message: Option<&str>) -> Self {
        if let Some(message) = message {
            self.message = message.to_string();
        }
        self
    }
}

impl PropertyConstraint for CharClassConstraint {
    fn kind(&self) -> &'static str {
        self.class.kind()
    }

    fn is_valid(&self, value: &Value) -> bool {
        string_passes(value, |s| s.chars().all(|c| self.class.admits(c)))
    }

    fn exception_message(&self, property: &str, value: &Value) -> String {
        format!(
            "{} should contain only {} but was {}",
            property,
            self.class.description(),
            value
        )
    }

    fn display_message(&self, _property: &str, _value: &Value) -> String {
        self.message.clone()
    }
}

/// The value's length (in characters) must lie in `[min, max]`.
#[derive(Debug, Clone)]
pub struct Length {
    min: usize,
    max: usize,
    min_message: String,
    max_message: String,
    range_message: String,
}

impl Length {
    /// `min = 0` and `max = usize::MAX` mean the bound is not set.
    pub fn new(min: usize, max: usize) -> Self {
        Self {
            min,
            max,
            min_message: format!("should be at least {} characters long", min),
            max_message: format!("should be at most {} characters long", max),
            range_message: format!("should be from {} to {} characters long", min, max),
        }
    }

    /// Route a custom message to the bound(s) actually configured.
    ///
    /// Both bounds set: range message. Only min: min message. Only max: max
    /// message. Neither: the message is dropped.
    pub fn with_message(mut self, message: Option<&str>) -> Self {
        let Some(message) = message else {
            return self;
        };
        match (self.has_min(), self.has_max()) {
            (true, true) => self.range_message = message.to_string(),
            (true, false) => self.min_message = message.to_string(),
            (false, true) => self.max_message = message.to_string(),
            (false, false) => {}
        }
        self
    }

    fn has_min(&self) -> bool {
        self.min > 0
    }

    fn has_max(&self) -> bool {
        self.max < usize::MAX
    }
}

impl PropertyConstraint for Length {
    fn kind(&self) -> &'static str {
        "length"
    }

    fn is_valid(&self, value: &Value) -> bool {
        string_passes(value, |s| {
            let len = s.chars().count();
            len >= self.min && len <= self.max
        })
    }

    fn exception_message(&self, property: &str, value: &Value) -> String {
        let len = value.as_str().map(|s| s.chars().count()).unwrap_or(0);
        format!(
            "{} length should be in range [{}, {}] but was {}",
            property, self.min, self.max, len
        )
    }

    fn display_message(&self, _property: &str, value: &Value) -> String {
        if self.has_min() && self.has_max() {
            return self.range_message.clone();
        }
        let len = value.as_str().map(|s| s.chars().count()).unwrap_or(0);
        if len < self.min {
            self.min_message.clone()
        } else {
            self.max_message.clone()
        }
    }
}
