//! Assertion types and builders for verifying step outcomes.

use kith_constraint::Violation;
use kith_transaction::TransactionResult;

use crate::error::{ScenarioError, ScenarioResult};

/// Expected outcome of one step.
#[derive(Debug, Default)]
pub struct Assertion {
    /// The commit must succeed.
    pub committed: bool,
    /// The commit must be rejected by validation.
    pub rejected: bool,
    /// Exact number of violations in a rejected commit.
    pub violations: Option<usize>,
    /// (property, constraint kind) pairs that must be among the violations.
    pub violated: Vec<(String, String)>,
    /// (property, display message) pairs that must be among the violations.
    pub displays: Vec<(String, String)>,
    /// Properties that must not be among the violations.
    pub clean: Vec<String>,
    /// The step must fail with an error whose message contains this text.
    pub error: Option<String>,
}

impl Assertion {
    /// Create a new empty assertion.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn committed(mut self) -> Self {
        self.committed = true;
        self
    }

    pub fn rejected(mut self) -> Self {
        self.rejected = true;
        self
    }

    pub fn violations(mut self, count: usize) -> Self {
        self.rejected = true;
        self.violations = Some(count);
        self
    }

    pub fn violated(mut self, property: &str, kind: &str) -> Self {
        self.rejected = true;
        self.violated.push((property.to_string(), kind.to_string()));
        self
    }

    pub fn display(mut self, property: &str, message: &str) -> Self {
        self.rejected = true;
        self.displays.push((property.to_string(), message.to_string()));
        self
    }

    pub fn clean(mut self, property: &str) -> Self {
        self.clean.push(property.to_string());
        self
    }

    pub fn error(mut self, contains: &str) -> Self {
        self.error = Some(contains.to_string());
        self
    }

    /// Verify the assertion against the outcome of a step.
    pub fn verify(&self, step: &str, result: &TransactionResult<()>) -> ScenarioResult<()> {
        if let Some(ref expected) = self.error {
            return match result {
                Err(e) if e.to_string().contains(expected.as_str()) => Ok(()),
                Err(e) => Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected error containing '{}', got: {}", expected, e),
                )),
                Ok(()) => Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected error containing '{}', but step committed", expected),
                )),
            };
        }

        match result {
            Ok(()) if self.rejected => Err(ScenarioError::assertion_failed(
                step,
                "expected the commit to be rejected, but it committed",
            )),
            Ok(()) => Ok(()),
            Err(e) => match e.violations() {
                Some(violations) if self.rejected => self.verify_violations(step, violations.all()),
                _ => Err(ScenarioError::assertion_failed(step, format!("step failed: {}", e))),
            },
        }
    }

    fn verify_violations(&self, step: &str, violations: &[Violation]) -> ScenarioResult<()> {
        if let Some(expected) = self.violations {
            if violations.len() != expected {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!(
                        "expected {} violations, got {}: {:?}",
                        expected,
                        violations.len(),
                        violations.iter().map(|v| v.to_string()).collect::<Vec<_>>()
                    ),
                ));
            }
        }

        for (property, kind) in &self.violated {
            if !on(violations, property).any(|v| &v.constraint == kind) {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected a '{}' violation on {}", kind, property),
                ));
            }
        }

        for (property, message) in &self.displays {
            if !on(violations, property).any(|v| &v.display_message == message) {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected display message '{}' on {}", message, property),
                ));
            }
        }

        for property in &self.clean {
            if let Some(v) = on(violations, property).next() {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected no violation on {}, got: {}", property, v),
                ));
            }
        }

        Ok(())
    }
}

fn on<'a>(violations: &'a [Violation], property: &'a str) -> impl Iterator<Item = &'a Violation> {
    violations
        .iter()
        .filter(move |v| v.property.as_deref() == Some(property))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kith_constraint::Violations;
    use kith_core::EntityId;
    use kith_transaction::{ConstraintsValidationError, TransactionError};

    fn rejected_with(violation: Violation) -> TransactionResult<()> {
        let mut violations = Violations::new();
        violations.push(violation);
        Err(TransactionError::Validation(ConstraintsValidationError::new(violations)))
    }

    fn name_violation() -> Violation {
        let mut violation = Violation::new("length", "name length should be ...", "too short");
        violation.entity_id = Some(EntityId::new(1));
        violation.property = Some("name".to_string());
        violation
    }

    #[test]
    fn test_committed_passes_on_ok() {
        assert!(Assertion::new().committed().verify("s", &Ok(())).is_ok());
    }

    #[test]
    fn test_rejected_fails_on_ok() {
        assert!(Assertion::new().rejected().verify("s", &Ok(())).is_err());
    }

    #[test]
    fn test_violation_matching() {
        let result = rejected_with(name_violation());

        assert!(Assertion::new().violated("name", "length").verify("s", &result).is_ok());
        assert!(Assertion::new().display("name", "too short").verify("s", &result).is_ok());
        assert!(Assertion::new().violated("name", "regex").verify("s", &result).is_err());
        assert!(Assertion::new().violations(1).clean("name").verify("s", &result).is_err());
    }

    #[test]
    fn test_unexpected_rejection_fails_committed() {
        let result = rejected_with(name_violation());

        assert!(Assertion::new().committed().verify("s", &result).is_err());
    }
}
