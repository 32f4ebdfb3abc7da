//! Failure gate between a primary and a fallback valuation provider.
//!
//! # States
//!
//! ```text
//! Closed --(window full && failure rate > threshold)--> Open { since }
//! Open   --(now - since >= reset timeout, checked on next request)--> Closed
//! ```
//!
//! Closed routes to the primary provider and records every primary outcome.
//! Open routes to the fallback provider; fallback outcomes are never recorded.
//! Each request invokes exactly one provider and is never retried.
//!
//! State lives behind one mutex that is released before any provider call,
//! so concurrent requests run their provider calls in parallel. Two requests
//! may both observe `Closed` right before the gate opens; both outcomes are
//! still recorded.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::{ProviderPath, ServiceUnavailable, ValidationError};
use crate::provider::ValuationProvider;
use crate::window::{Outcome, OutcomeWindow};
use crate::Valuation;

/// Gate thresholds and timers, fixed for the lifetime of a gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateConfig {
    /// Number of primary outcomes kept for the failure-rate computation.
    pub window_size: usize,
    /// The gate opens when the failure rate of a full window is strictly greater.
    pub failure_threshold: f64,
    /// Minimum time spent open before the next request closes the gate.
    pub reset_timeout: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            window_size: 10,
            failure_threshold: 0.5,
            reset_timeout: Duration::from_millis(300_000),
        }
    }
}

impl GateConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.window_size == 0 {
            return Err(ValidationError::EmptyWindow);
        }
        if !self.failure_threshold.is_finite() || !(0.0..=1.0).contains(&self.failure_threshold)
        {
            return Err(ValidationError::InvalidFailureThreshold {
                value: self.failure_threshold,
            });
        }
        if self.reset_timeout.is_zero() {
            return Err(ValidationError::ZeroResetTimeout);
        }
        Ok(())
    }
}

/// Routing state. The open timestamp exists only while open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Closed,
    Open { since: Instant },
}

impl GateState {
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open { .. } => "open",
        }
    }
}

/// Point-in-time view of the gate, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateSnapshot {
    pub state: GateState,
    pub window_len: usize,
    pub window_capacity: usize,
    pub failures: usize,
}

#[derive(Debug)]
struct GateInner {
    state: GateState,
    window: OutcomeWindow,
}

/// Routes each valuation request to the primary or fallback provider.
pub struct FailureGate {
    primary: Arc<dyn ValuationProvider>,
    fallback: Arc<dyn ValuationProvider>,
    config: GateConfig,
    clock: Arc<dyn Clock>,
    inner: Mutex<GateInner>,
}

impl FailureGate {
    pub fn new(
        primary: Arc<dyn ValuationProvider>,
        fallback: Arc<dyn ValuationProvider>,
        config: GateConfig,
    ) -> Result<Self, ValidationError> {
        Self::with_clock(primary, fallback, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        primary: Arc<dyn ValuationProvider>,
        fallback: Arc<dyn ValuationProvider>,
        config: GateConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self {
            primary,
            fallback,
            config,
            clock,
            inner: Mutex::new(GateInner {
                state: GateState::Closed,
                window: OutcomeWindow::new(config.window_size),
            }),
        })
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Fetch a valuation through whichever provider the current state selects.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceUnavailable`] naming the path whose provider failed.
    pub async fn request(&self, vrm: &str, mileage: u32) -> Result<Valuation, ServiceUnavailable> {
        match self.route() {
            ProviderPath::Fallback => self.call_fallback(vrm, mileage).await,
            ProviderPath::Primary => self.call_primary(vrm, mileage).await,
        }
    }

    /// Current state without applying a pending reset.
    pub fn state(&self) -> GateState {
        self.lock().state
    }

    pub fn snapshot(&self) -> GateSnapshot {
        let inner = self.lock();
        GateSnapshot {
            state: inner.state,
            window_len: inner.window.len(),
            window_capacity: inner.window.capacity(),
            failures: inner.window.failures(),
        }
    }

    async fn call_fallback(&self, vrm: &str, mileage: u32) -> Result<Valuation, ServiceUnavailable> {
        info!(provider = self.fallback.name(), vrm, "gate open, using fallback provider");
        match self.fallback.valuation(vrm, mileage).await {
            Ok(valuation) => {
                info!(provider = self.fallback.name(), vrm, "returning fallback valuation");
                Ok(valuation)
            }
            Err(provider_error) => {
                let unavailable = ServiceUnavailable::fallback();
                error!(
                    provider = self.fallback.name(),
                    vrm,
                    error = %provider_error,
                    "{unavailable}"
                );
                Err(unavailable)
            }
        }
    }

    async fn call_primary(&self, vrm: &str, mileage: u32) -> Result<Valuation, ServiceUnavailable> {
        info!(provider = self.primary.name(), vrm, "gate closed, using primary provider");
        match self.primary.valuation(vrm, mileage).await {
            Ok(valuation) => {
                self.record(Outcome::Success);
                info!(provider = self.primary.name(), vrm, "returning primary valuation");
                Ok(valuation)
            }
            Err(provider_error) => {
                self.record(Outcome::Failure);
                let unavailable = ServiceUnavailable::primary();
                error!(
                    provider = self.primary.name(),
                    vrm,
                    error = %provider_error,
                    "{unavailable}"
                );
                Err(unavailable)
            }
        }
    }

    /// Apply a due reset, then pick the path for this request.
    fn route(&self) -> ProviderPath {
        let now = self.clock.now();
        let mut inner = self.lock();

        if let GateState::Open { since } = inner.state {
            let open_for = now.saturating_duration_since(since);
            if open_for >= self.config.reset_timeout {
                inner.state = GateState::Closed;
                inner.window.clear();
                info!(
                    open_for_ms = u64::try_from(open_for.as_millis()).unwrap_or(u64::MAX),
                    "reset timeout elapsed, closing gate"
                );
            }
        }

        match inner.state {
            GateState::Closed => ProviderPath::Primary,
            GateState::Open { .. } => ProviderPath::Fallback,
        }
    }

    /// Record a primary outcome and open the gate if the full window crosses
    /// the threshold. An open gate is never re-opened or extended here.
    fn record(&self, outcome: Outcome) {
        let now = self.clock.now();
        let mut inner = self.lock();
        inner.window.record(outcome);

        if inner.state.is_open() {
            return;
        }
        let Some(failure_rate) = inner.window.failure_rate() else {
            return;
        };
        if failure_rate > self.config.failure_threshold {
            inner.state = GateState::Open { since: now };
            warn!(
                failure_rate,
                threshold = self.config.failure_threshold,
                window_size = inner.window.capacity(),
                "failure rate above threshold, opening gate"
            );
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::provider::{ProviderError, ProviderFuture};

    struct Unused;

    impl ValuationProvider for Unused {
        fn name(&self) -> &str {
            "unused"
        }

        fn valuation<'a>(&'a self, _vrm: &'a str, _mileage: u32) -> ProviderFuture<'a> {
            Box::pin(async { Err(ProviderError::transport("not called in these tests")) })
        }
    }

    fn gate(config: GateConfig, clock: Arc<ManualClock>) -> FailureGate {
        FailureGate::with_clock(Arc::new(Unused), Arc::new(Unused), config, clock)
            .expect("valid config")
    }

    #[test]
    fn default_config_matches_documented_values() {
        let config = GateConfig::default();
        assert_eq!(config.window_size, 10);
        assert_eq!(config.failure_threshold, 0.5);
        assert_eq!(config.reset_timeout, Duration::from_secs(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_invalid_config() {
        let empty = GateConfig {
            window_size: 0,
            ..GateConfig::default()
        };
        assert_eq!(empty.validate(), Err(ValidationError::EmptyWindow));

        let threshold = GateConfig {
            failure_threshold: 1.5,
            ..GateConfig::default()
        };
        assert!(matches!(
            threshold.validate(),
            Err(ValidationError::InvalidFailureThreshold { .. })
        ));

        let timeout = GateConfig {
            reset_timeout: Duration::ZERO,
            ..GateConfig::default()
        };
        assert_eq!(timeout.validate(), Err(ValidationError::ZeroResetTimeout));
    }

    #[test]
    fn exactly_half_failures_keeps_gate_closed() {
        let gate = gate(GateConfig::default(), Arc::new(ManualClock::new()));
        for index in 0..10 {
            gate.record(if index % 2 == 0 {
                Outcome::Failure
            } else {
                Outcome::Success
            });
        }
        assert_eq!(gate.state(), GateState::Closed);

        // Evicts a failure and adds one: still 5/10.
        gate.record(Outcome::Failure);
        assert_eq!(gate.state(), GateState::Closed);

        // Evicts a success: 6/10.
        gate.record(Outcome::Failure);
        assert!(gate.state().is_open());
    }

    #[test]
    fn outcomes_recorded_while_open_do_not_move_open_timestamp() {
        let clock = Arc::new(ManualClock::new());
        let gate = gate(
            GateConfig {
                window_size: 2,
                ..GateConfig::default()
            },
            Arc::clone(&clock),
        );
        gate.record(Outcome::Failure);
        gate.record(Outcome::Failure);
        let opened = gate.state();
        assert!(opened.is_open());

        clock.advance(Duration::from_secs(60));
        gate.record(Outcome::Failure);
        assert_eq!(gate.state(), opened);
        assert_eq!(gate.snapshot().window_len, 2);
    }

    #[test]
    fn reset_clears_window_and_closes() {
        let clock = Arc::new(ManualClock::new());
        let gate = gate(
            GateConfig {
                window_size: 1,
                reset_timeout: Duration::from_secs(5),
                ..GateConfig::default()
            },
            Arc::clone(&clock),
        );
        gate.record(Outcome::Failure);
        assert_eq!(gate.route(), ProviderPath::Fallback);

        clock.advance(Duration::from_secs(5));
        assert_eq!(gate.route(), ProviderPath::Primary);
        let snapshot = gate.snapshot();
        assert_eq!(snapshot.state, GateState::Closed);
        assert_eq!(snapshot.window_len, 0);
    }
}
