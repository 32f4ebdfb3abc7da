//! # Valuegate Core
//!
//! Vehicle valuation lookups behind a failure gate.
//!
//! ## Overview
//!
//! - **Failure gate** routing between a primary and a fallback provider
//! - **Outcome window** and injectable **clock** driving the gate
//! - **Provider contract** and the SuperCar / PremiumCar adapters
//! - **Valuation service** and its builder
//! - **Audited providers** that log every outbound call
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | SuperCar (primary) and PremiumCar (fallback) adapters |
//! | [`audit`] | Provider call logging by composition |
//! | [`circuit_breaker`] | Failure gate, configuration, state |
//! | [`clock`] | System and manual time sources |
//! | [`domain`] | VRM, valuation request, valuation |
//! | [`error`] | Validation errors and `ServiceUnavailable` |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`provider`] | `ValuationProvider` trait and `ProviderError` |
//! | [`service`] | `ValuationService` and builder |
//! | [`source`] | Provider identifiers |
//! | [`window`] | Bounded outcome window |
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ ValuationService │
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │   Failure Gate   │────▶│  Outcome Window  │
//! └───┬──────────┬───┘     └──────────────────┘
//!     │ closed   │ open
//!     ▼          ▼
//! ┌────────┐ ┌──────────┐  ┌──────────────────┐
//! │SuperCar│ │PremiumCar│─▶│ HTTP Client      │
//! └────────┘ └──────────┘  │ (reqwest/static) │
//!                          └──────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use valuegate_core::ValuationServiceBuilder;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = ValuationServiceBuilder::new().with_mock_mode().build()?;
//!     let valuation = service.get_valuation("ABC123", 50_000).await?;
//!     println!("{} - {}", valuation.lowest_value, valuation.highest_value);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod audit;
pub mod circuit_breaker;
pub mod clock;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod provider;
pub mod service;
pub mod source;
pub mod window;

pub use adapters::{PremiumCarAdapter, SuperCarAdapter, PREMIUM_CAR_BASE_URL, SUPER_CAR_BASE_URL};
pub use audit::{
    AuditError, AuditedProvider, InMemoryProviderLogStore, ProviderLog, ProviderLogStore,
};
pub use circuit_breaker::{FailureGate, GateConfig, GateSnapshot, GateState};
pub use clock::{Clock, ManualClock, SystemClock};
pub use domain::{Valuation, ValuationRequest, Vrm};
pub use error::{ProviderPath, ServiceUnavailable, ValidationError};
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient, StaticHttpClient,
};
pub use provider::{ProviderError, ProviderErrorKind, ProviderFuture, ValuationProvider};
pub use service::{ValuationService, ValuationServiceBuilder};
pub use source::ProviderId;
pub use valuegate_warehouse::{
    ProviderLogFilter, ProviderLogRecord, ValuationRecord, Warehouse, WarehouseConfig,
    WarehouseError,
};
pub use window::{Outcome, OutcomeWindow};
