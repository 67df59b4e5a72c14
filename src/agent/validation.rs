//! Response validation
//!
//! Validation is a normal return value, not an error: an agent's hook says
//! `Valid` or `Invalid { reason }` and the agent loop decides what to do.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::SharedStateRef;

/// Key the context validator reads by default
pub const DEFAULT_CONTEXT_KEY: &str = "context";

/// Outcome of validating a response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationOutcome {
    /// The response may be returned
    Valid,
    /// The response must not be returned
    Invalid {
        /// Why validation failed
        reason: String,
    },
}

impl ValidationOutcome {
    /// Create an invalid outcome
    pub fn invalid(reason: impl Into<String>) -> Self {
        ValidationOutcome::Invalid {
            reason: reason.into(),
        }
    }

    /// Check if the response passed
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    /// The failure reason, if invalid
    pub fn reason(&self) -> Option<&str> {
        match self {
            ValidationOutcome::Valid => None,
            ValidationOutcome::Invalid { reason } => Some(reason),
        }
    }
}

/// Something that can check a response
pub trait ResponseValidator: Send + Sync {
    /// Validate the response
    fn validate(&self, response: &str) -> ValidationOutcome;
}

impl<F> ResponseValidator for F
where
    F: Fn(&str) -> ValidationOutcome + Send + Sync,
{
    fn validate(&self, response: &str) -> ValidationOutcome {
        (self)(response)
    }
}

/// Accepts a response only if it appears in context stored in the shared state
///
/// The check is an exact, case-sensitive substring match against the string
/// stored under `key`. A missing context or a non-string value fails.
pub struct ContextContainsValidator {
    state: SharedStateRef,
    key: String,
}

impl ContextContainsValidator {
    /// Validate against the string stored under `key`
    pub fn new(state: SharedStateRef, key: impl Into<String>) -> Self {
        Self {
            state,
            key: key.into(),
        }
    }

    /// Validate against the string stored under `"context"`
    pub fn for_context(state: SharedStateRef) -> Self {
        Self::new(state, DEFAULT_CONTEXT_KEY)
    }

    /// The key this validator reads
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl ResponseValidator for ContextContainsValidator {
    fn validate(&self, response: &str) -> ValidationOutcome {
        if response.is_empty() {
            return ValidationOutcome::invalid("Response is empty");
        }

        let context = match self.state.get(&self.key) {
            Some(Value::String(c)) => c,
            Some(_) => {
                return ValidationOutcome::invalid(format!(
                    "Value stored under '{}' is not text and cannot be validated against",
                    self.key
                ))
            }
            None => {
                return ValidationOutcome::invalid(format!(
                    "No context stored under '{}' to validate against",
                    self.key
                ))
            }
        };

        if context.contains(response) {
            ValidationOutcome::Valid
        } else {
            ValidationOutcome::invalid(format!(
                "Response '{}' is not supported by the stored '{}'",
                response, self.key
            ))
        }
    }
}

impl std::fmt::Debug for ContextContainsValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextContainsValidator")
            .field("key", &self.key)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SharedState;

    fn validator_with_context() -> ContextContainsValidator {
        let state = SharedState::shared();
        state.set("context", "Paris is the capital of France");
        ContextContainsValidator::for_context(state)
    }

    #[test]
    fn test_supported_response_is_valid() {
        assert_eq!(validator_with_context().validate("Paris"), ValidationOutcome::Valid);
    }

    #[test]
    fn test_unsupported_response_is_invalid() {
        let outcome = validator_with_context().validate("Berlin");
        assert!(!outcome.is_valid());
        assert_eq!(
            outcome.reason(),
            Some("Response 'Berlin' is not supported by the stored 'context'")
        );
    }

    #[test]
    fn test_missing_context_is_invalid() {
        let validator = ContextContainsValidator::for_context(SharedState::shared());
        let outcome = validator.validate("Paris");
        assert_eq!(
            outcome.reason(),
            Some("No context stored under 'context' to validate against")
        );
    }

    #[test]
    fn test_non_text_context_is_invalid() {
        let state = SharedState::shared();
        state.set("context", serde_json::json!(42));
        let outcome = ContextContainsValidator::for_context(state).validate("42");
        assert_eq!(
            outcome.reason(),
            Some("Value stored under 'context' is not text and cannot be validated against")
        );
    }

    #[test]
    fn test_empty_response_is_invalid() {
        assert!(!validator_with_context().validate("").is_valid());
    }

    #[test]
    fn test_sees_later_writes() {
        let state = SharedState::shared();
        let validator = ContextContainsValidator::new(state.clone(), "facts");
        assert!(!validator.validate("Rome").is_valid());

        state.set("facts", "Rome is the capital of Italy");
        assert!(validator.validate("Rome").is_valid());
        assert_eq!(validator.key(), "facts");
    }

    #[test]
    fn test_closure_validator() {
        let validator = |response: &str| {
            if response.ends_with('.') {
                ValidationOutcome::Valid
            } else {
                ValidationOutcome::invalid("must end with a period")
            }
        };
        assert!(validator.validate("Done.").is_valid());
        assert_eq!(validator.validate("Done").reason(), Some("must end with a period"));
    }
}
