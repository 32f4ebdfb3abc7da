//! Valuation provider contract.
//!
//! A provider turns a VRM and mileage into a [`Valuation`] or fails. How it
//! gets there (remote call, cache, fixture) is its own business, including
//! any deadline it enforces on itself.
//!
//! ```rust,ignore
//! use valuegate_core::{ProviderFuture, Valuation, ValuationProvider};
//!
//! struct Fixed;
//!
//! impl ValuationProvider for Fixed {
//!     fn name(&self) -> &str {
//!         "fixed"
//!     }
//!
//!     fn valuation<'a>(&'a self, vrm: &'a str, _mileage: u32) -> ProviderFuture<'a> {
//!         Box::pin(async move {
//!             Ok(Valuation::new(vrm, 1000.0, 2000.0, Some("fixed".into()))?)
//!         })
//!     }
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{Valuation, ValidationError};

/// Boxed future returned by [`ValuationProvider::valuation`].
pub type ProviderFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Valuation, ProviderError>> + Send + 'a>>;

/// Provider-level failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// The request never produced an HTTP response (connect, timeout, IO).
    Transport,
    /// The upstream answered with a non-success status.
    UpstreamStatus,
    /// The upstream answered but the payload was unusable.
    InvalidResponse,
}

/// Structured provider failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    kind: ProviderErrorKind,
    message: String,
    status: Option<u16>,
}

impl ProviderError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Transport,
            message: message.into(),
            status: None,
        }
    }

    pub fn upstream_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::UpstreamStatus,
            message: message.into(),
            status: Some(status),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::InvalidResponse,
            message: message.into(),
            status: None,
        }
    }

    pub const fn kind(&self) -> ProviderErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    /// Status recorded in audit logs: the upstream status when one exists,
    /// otherwise 500.
    pub const fn response_code(&self) -> u16 {
        match self.status {
            Some(status) => status,
            None => 500,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            ProviderErrorKind::Transport => "provider.transport",
            ProviderErrorKind::UpstreamStatus => "provider.upstream_status",
            ProviderErrorKind::InvalidResponse => "provider.invalid_response",
        }
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for ProviderError {}

impl From<ValidationError> for ProviderError {
    fn from(error: ValidationError) -> Self {
        Self::invalid_response(error.to_string())
    }
}

/// Source of vehicle valuations.
///
/// Implementations must be `Send + Sync`; one instance is shared by every
/// in-flight request.
pub trait ValuationProvider: Send + Sync {
    /// Name used in logs and audit entries.
    fn name(&self) -> &str;

    /// Fetch a valuation. The arguments are passed through untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] for any provider-side failure.
    fn valuation<'a>(&'a self, vrm: &'a str, mileage: u32) -> ProviderFuture<'a>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_code_prefers_upstream_status() {
        assert_eq!(ProviderError::upstream_status(404, "missing").response_code(), 404);
        assert_eq!(ProviderError::transport("timeout").response_code(), 500);
        assert_eq!(ProviderError::invalid_response("bad json").response_code(), 500);
    }

    #[test]
    fn validation_failures_become_invalid_responses() {
        let error = ProviderError::from(ValidationError::InvalidValuationRange);
        assert_eq!(error.kind(), ProviderErrorKind::InvalidResponse);
        assert_eq!(error.code(), "provider.invalid_response");
    }
}
