use std::fmt::{Display, Formatter};

use thiserror::Error;

/// Validation and configuration errors exposed by `valuegate-core`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("vrm cannot be empty")]
    EmptyVrm,
    #[error("vrm must be {max} characters or less, got {len}")]
    VrmTooLong { len: usize, max: usize },

    #[error("mileage must be a positive number")]
    NonPositiveMileage,

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },
    #[error("highest value must be >= lowest value")]
    InvalidValuationRange,

    #[error("gate window size must be at least 1")]
    EmptyWindow,
    #[error("gate failure threshold must be within [0, 1], got {value}")]
    InvalidFailureThreshold { value: f64 },
    #[error("gate reset timeout must be greater than zero")]
    ZeroResetTimeout,

    #[error("environment variable {name} has invalid value '{value}'")]
    InvalidEnvValue { name: &'static str, value: String },
}

/// Which provider path a gate request was routed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderPath {
    Primary,
    Fallback,
}

impl ProviderPath {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Fallback => "fallback",
        }
    }
}

impl Display for ProviderPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when the provider chosen by the gate fails.
///
/// The underlying provider error is logged by the gate and never carried
/// here; callers only learn which path failed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Unable to get valuation from the {path} provider")]
pub struct ServiceUnavailable {
    path: ProviderPath,
}

impl ServiceUnavailable {
    pub const fn primary() -> Self {
        Self {
            path: ProviderPath::Primary,
        }
    }

    pub const fn fallback() -> Self {
        Self {
            path: ProviderPath::Fallback,
        }
    }

    pub const fn path(&self) -> ProviderPath {
        self.path
    }

    /// HTTP status equivalent for outer surfaces.
    pub const fn status_code(&self) -> u16 {
        503
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_unavailable_messages_name_the_failed_path() {
        assert_eq!(
            ServiceUnavailable::primary().to_string(),
            "Unable to get valuation from the primary provider"
        );
        assert_eq!(
            ServiceUnavailable::fallback().to_string(),
            "Unable to get valuation from the fallback provider"
        );
        assert_eq!(ServiceUnavailable::fallback().status_code(), 503);
    }
}
