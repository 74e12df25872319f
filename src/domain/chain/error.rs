//! Chain misuse errors

use thiserror::Error;

/// Errors raised by misusing a chain, as opposed to failures of its steps
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ChainError {
    #[error("Invalid chain construction: {0}")]
    InvalidConstruction(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ChainError {
    pub fn invalid_construction(message: impl Into<String>) -> Self {
        Self::InvalidConstruction(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// A handler was attached before any step existed
    pub fn no_step_to_catch() -> Self {
        Self::invalid_construction("cannot attach an error handler before any step is added")
    }

    /// `Fallback::UseDefault` was requested on a chain built without one
    pub fn missing_default_fallback() -> Self {
        Self::configuration(
            "the default fallback was requested, but no default fallback was registered",
        )
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ChainError::no_step_to_catch();
        assert_eq!(
            err.to_string(),
            "Invalid chain construction: cannot attach an error handler before any step is added"
        );

        let err = ChainError::configuration("bad setup");
        assert_eq!(err.to_string(), "Configuration error: bad setup");
    }

    #[test]
    fn test_error_kinds_are_distinct() {
        assert!(ChainError::missing_default_fallback().is_configuration());
        assert!(!ChainError::no_step_to_catch().is_configuration());
        assert_ne!(
            ChainError::missing_default_fallback(),
            ChainError::no_step_to_catch()
        );
    }
}
