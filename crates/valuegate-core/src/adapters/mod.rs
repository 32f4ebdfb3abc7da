//! HTTP-backed valuation providers.
//!
//! | Adapter | Role | Endpoint |
//! |---------|------|----------|
//! | [`SuperCarAdapter`] | primary | `GET {base}/valuations/{vrm}?mileage={mileage}` |
//! | [`PremiumCarAdapter`] | fallback | `GET {base}/valueCar?vrm={vrm}` |
//!
//! `Default` instances answer from a canned payload and never touch the
//! network.

mod premium_car;
mod super_car;

pub use premium_car::{PremiumCarAdapter, PREMIUM_CAR_BASE_URL};
pub use super_car::{SuperCarAdapter, SUPER_CAR_BASE_URL};

use serde::de::DeserializeOwned;

use crate::http_client::{HttpClient, HttpRequest};
use crate::provider::ProviderError;
use crate::ProviderId;

/// Execute `request` and decode a successful JSON body.
async fn fetch_json<T: DeserializeOwned>(
    http_client: &dyn HttpClient,
    provider: ProviderId,
    request: HttpRequest,
) -> Result<T, ProviderError> {
    let timeout_ms = request.timeout_ms;
    let response = http_client.execute(request).await.map_err(|error| {
        if error.timed_out() {
            ProviderError::transport(format!(
                "{provider} timed out after {timeout_ms}ms: {}",
                error.message()
            ))
        } else {
            ProviderError::transport(format!("{provider} transport error: {}", error.message()))
        }
    })?;

    if !response.is_success() {
        return Err(ProviderError::upstream_status(
            response.status,
            format!("{provider} upstream returned status {}", response.status),
        ));
    }

    serde_json::from_str(&response.body).map_err(|error| {
        ProviderError::invalid_response(format!("{provider} returned an unreadable body: {error}"))
    })
}

/// GET request for a JSON endpoint.
fn json_get(url: String, timeout_ms: u64) -> HttpRequest {
    HttpRequest::get(url)
        .with_header("Accept", "application/json")
        .with_timeout_ms(timeout_ms)
}

fn join_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}
