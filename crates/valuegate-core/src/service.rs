//! Valuation service and its builder.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::adapters::{PremiumCarAdapter, SuperCarAdapter, PREMIUM_CAR_BASE_URL, SUPER_CAR_BASE_URL};
use crate::audit::{AuditedProvider, ProviderLogStore};
use crate::circuit_breaker::{FailureGate, GateConfig};
use crate::clock::{Clock, SystemClock};
use crate::error::{ServiceUnavailable, ValidationError};
use crate::http_client::{HttpClient, ReqwestHttpClient, DEFAULT_TIMEOUT_MS};
use crate::provider::ValuationProvider;
use crate::Valuation;

pub const ENV_SUPER_CAR_URL: &str = "VALUEGATE_SUPERCAR_URL";
pub const ENV_PREMIUM_CAR_URL: &str = "VALUEGATE_PREMIUMCAR_URL";
pub const ENV_HTTP_TIMEOUT_MS: &str = "VALUEGATE_HTTP_TIMEOUT_MS";
pub const ENV_GATE_WINDOW_SIZE: &str = "VALUEGATE_GATE_WINDOW_SIZE";
pub const ENV_GATE_FAILURE_THRESHOLD: &str = "VALUEGATE_GATE_FAILURE_THRESHOLD";
pub const ENV_GATE_RESET_TIMEOUT_MS: &str = "VALUEGATE_GATE_RESET_TIMEOUT_MS";

/// Entry point for valuation lookups. Every call goes straight to the gate.
#[derive(Clone)]
pub struct ValuationService {
    gate: Arc<FailureGate>,
}

impl ValuationService {
    pub fn new(gate: Arc<FailureGate>) -> Self {
        Self { gate }
    }

    /// # Errors
    ///
    /// Propagates the gate's [`ServiceUnavailable`] unchanged.
    pub async fn get_valuation(
        &self,
        vrm: &str,
        mileage: u32,
    ) -> Result<Valuation, ServiceUnavailable> {
        self.gate.request(vrm, mileage).await
    }

    pub fn gate(&self) -> &FailureGate {
        &self.gate
    }
}

/// Builder for a [`ValuationService`] wired to the SuperCar (primary) and
/// PremiumCar (fallback) providers.
///
/// # Example
///
/// ```rust,ignore
/// use valuegate_core::ValuationServiceBuilder;
///
/// let service = ValuationServiceBuilder::from_env()?.build()?;
///
/// let offline = ValuationServiceBuilder::new().with_mock_mode().build()?;
/// ```
pub struct ValuationServiceBuilder {
    use_mock: bool,
    super_car_url: String,
    premium_car_url: String,
    http_timeout_ms: u64,
    gate_config: GateConfig,
    clock: Arc<dyn Clock>,
    log_store: Option<Arc<dyn ProviderLogStore>>,
    providers: Option<(Arc<dyn ValuationProvider>, Arc<dyn ValuationProvider>)>,
}

impl Default for ValuationServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ValuationServiceBuilder {
    pub fn new() -> Self {
        Self {
            use_mock: false,
            super_car_url: SUPER_CAR_BASE_URL.to_string(),
            premium_car_url: PREMIUM_CAR_BASE_URL.to_string(),
            http_timeout_ms: DEFAULT_TIMEOUT_MS,
            gate_config: GateConfig::default(),
            clock: Arc::new(SystemClock),
            log_store: None,
            providers: None,
        }
    }

    /// Read overrides from `VALUEGATE_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidEnvValue`] when a numeric variable
    /// does not parse.
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::new().apply_overrides(|name| env::var(name).ok())
    }

    /// Both adapters answer from built-in fixtures; nothing leaves the process.
    pub fn with_mock_mode(mut self) -> Self {
        self.use_mock = true;
        self
    }

    pub fn with_super_car_url(mut self, url: impl Into<String>) -> Self {
        self.super_car_url = url.into();
        self
    }

    pub fn with_premium_car_url(mut self, url: impl Into<String>) -> Self {
        self.premium_car_url = url.into();
        self
    }

    pub fn with_http_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.http_timeout_ms = timeout_ms;
        self
    }

    pub fn with_gate_config(mut self, config: GateConfig) -> Self {
        self.gate_config = config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Audit every provider call into `store`.
    pub fn with_log_store(mut self, store: Arc<dyn ProviderLogStore>) -> Self {
        self.log_store = Some(store);
        self
    }

    /// Replace the built-in adapters.
    pub fn with_providers(
        mut self,
        primary: Arc<dyn ValuationProvider>,
        fallback: Arc<dyn ValuationProvider>,
    ) -> Self {
        self.providers = Some((primary, fallback));
        self
    }

    pub fn gate_config(&self) -> &GateConfig {
        &self.gate_config
    }

    /// # Errors
    ///
    /// Returns [`ValidationError`] when the gate configuration is invalid.
    pub fn build(self) -> Result<ValuationService, ValidationError> {
        let (primary, fallback) = match self.providers {
            Some(providers) => providers,
            None => adapters(
                self.use_mock,
                &self.super_car_url,
                &self.premium_car_url,
                self.http_timeout_ms,
            ),
        };

        let (primary, fallback) = match &self.log_store {
            Some(store) => (
                audited(primary, store, &self.super_car_url),
                audited(fallback, store, &self.premium_car_url),
            ),
            None => (primary, fallback),
        };

        debug!(
            primary = primary.name(),
            fallback = fallback.name(),
            mock = self.use_mock,
            audited = self.log_store.is_some(),
            "building valuation service"
        );

        let gate = FailureGate::with_clock(primary, fallback, self.gate_config, self.clock)?;
        Ok(ValuationService::new(Arc::new(gate)))
    }

    fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_SUPER_CAR_URL) {
            self.super_car_url = url;
        }
        if let Some(url) = lookup(ENV_PREMIUM_CAR_URL) {
            self.premium_car_url = url;
        }
        if let Some(value) = lookup(ENV_HTTP_TIMEOUT_MS) {
            self.http_timeout_ms = parse_env(ENV_HTTP_TIMEOUT_MS, value)?;
        }
        if let Some(value) = lookup(ENV_GATE_WINDOW_SIZE) {
            self.gate_config.window_size = parse_env(ENV_GATE_WINDOW_SIZE, value)?;
        }
        if let Some(value) = lookup(ENV_GATE_FAILURE_THRESHOLD) {
            self.gate_config.failure_threshold = parse_env(ENV_GATE_FAILURE_THRESHOLD, value)?;
        }
        if let Some(value) = lookup(ENV_GATE_RESET_TIMEOUT_MS) {
            let millis: u64 = parse_env(ENV_GATE_RESET_TIMEOUT_MS, value)?;
            self.gate_config.reset_timeout = Duration::from_millis(millis);
        }
        Ok(self)
    }
}

fn adapters(
    use_mock: bool,
    super_car_url: &str,
    premium_car_url: &str,
    timeout_ms: u64,
) -> (Arc<dyn ValuationProvider>, Arc<dyn ValuationProvider>) {
    if use_mock {
        return (
            Arc::new(SuperCarAdapter::default()),
            Arc::new(PremiumCarAdapter::default()),
        );
    }

    let http_client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    (
        Arc::new(
            SuperCarAdapter::with_http_client(Arc::clone(&http_client), super_car_url)
                .with_timeout_ms(timeout_ms),
        ),
        Arc::new(
            PremiumCarAdapter::with_http_client(http_client, premium_car_url)
                .with_timeout_ms(timeout_ms),
        ),
    )
}

fn audited(
    provider: Arc<dyn ValuationProvider>,
    store: &Arc<dyn ProviderLogStore>,
    url: &str,
) -> Arc<dyn ValuationProvider> {
    Arc::new(AuditedProvider::new(provider, Arc::clone(store), url))
}

fn parse_env<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ValidationError> {
    value
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidEnvValue { name, value })
}
