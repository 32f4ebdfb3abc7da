//! Provider call auditing by composition.
//!
//! [`AuditedProvider`] wraps any [`ValuationProvider`] and writes one
//! [`ProviderLog`] per call, success or failure, before handing the inner
//! result back untouched.
//!
//! ```rust,ignore
//! let store = Arc::new(InMemoryProviderLogStore::default());
//! let primary = AuditedProvider::new(
//!     Arc::new(SuperCarAdapter::default()),
//!     store.clone(),
//!     SUPER_CAR_BASE_URL,
//! );
//! ```

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::warn;
use valuegate_warehouse::{ProviderLogRecord, Warehouse, WarehouseError};

use crate::provider::{ProviderFuture, ValuationProvider};

/// One outbound provider call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderLog {
    pub vrm: String,
    /// Call start, unix epoch milliseconds.
    pub timestamp_ms: i64,
    pub request_duration_ms: u64,
    pub response_code: u16,
    pub error_message: Option<String>,
    pub url: String,
    pub provider: String,
}

impl From<&ProviderLog> for ProviderLogRecord {
    fn from(log: &ProviderLog) -> Self {
        Self {
            vrm: log.vrm.clone(),
            timestamp_ms: log.timestamp_ms,
            request_duration_ms: i64::try_from(log.request_duration_ms).unwrap_or(i64::MAX),
            response_code: i32::from(log.response_code),
            error_message: log.error_message.clone(),
            url: log.url.clone(),
            provider: log.provider.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error(transparent)]
    Warehouse(#[from] WarehouseError),

    #[error("audit store rejected entry: {0}")]
    Rejected(String),
}

/// Destination for provider audit entries.
pub trait ProviderLogStore: Send + Sync {
    fn insert(&self, log: &ProviderLog) -> Result<(), AuditError>;
}

/// Keeps audit entries in memory; used in tests and mock mode.
#[derive(Debug, Default)]
pub struct InMemoryProviderLogStore {
    logs: Mutex<Vec<ProviderLog>>,
}

impl InMemoryProviderLogStore {
    pub fn logs(&self) -> Vec<ProviderLog> {
        self.logs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ProviderLogStore for InMemoryProviderLogStore {
    fn insert(&self, log: &ProviderLog) -> Result<(), AuditError> {
        self.logs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(log.clone());
        Ok(())
    }
}

impl ProviderLogStore for Warehouse {
    fn insert(&self, log: &ProviderLog) -> Result<(), AuditError> {
        self.insert_provider_log(&ProviderLogRecord::from(log))?;
        Ok(())
    }
}

/// Provider wrapper that records every call to a [`ProviderLogStore`].
pub struct AuditedProvider {
    inner: Arc<dyn ValuationProvider>,
    store: Arc<dyn ProviderLogStore>,
    url: String,
}

impl AuditedProvider {
    pub fn new(
        inner: Arc<dyn ValuationProvider>,
        store: Arc<dyn ProviderLogStore>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            inner,
            store,
            url: url.into(),
        }
    }

    fn write(&self, log: ProviderLog) {
        if let Err(error) = self.store.insert(&log) {
            warn!(
                provider = %log.provider,
                vrm = %log.vrm,
                error = %error,
                "failed to write provider audit log"
            );
        }
    }
}

impl ValuationProvider for AuditedProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn valuation<'a>(&'a self, vrm: &'a str, mileage: u32) -> ProviderFuture<'a> {
        Box::pin(async move {
            let timestamp_ms = unix_millis(OffsetDateTime::now_utc());
            let started = Instant::now();

            let result = self.inner.valuation(vrm, mileage).await;

            let request_duration_ms =
                u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            let (response_code, error_message) = match &result {
                Ok(_) => (200, None),
                Err(error) => (error.response_code(), Some(error.message().to_string())),
            };

            self.write(ProviderLog {
                vrm: vrm.to_string(),
                timestamp_ms,
                request_duration_ms,
                response_code,
                error_message,
                url: self.url.clone(),
                provider: self.inner.name().to_string(),
            });

            result
        })
    }
}

fn unix_millis(at: OffsetDateTime) -> i64 {
    i64::try_from(at.unix_timestamp_nanos() / 1_000_000).unwrap_or(i64::MAX)
}
