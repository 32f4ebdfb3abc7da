use std::sync::Arc;

use serde::Deserialize;

use super::{fetch_json, join_url, json_get};
use crate::http_client::{HttpClient, StaticHttpClient, DEFAULT_TIMEOUT_MS};
use crate::provider::{ProviderFuture, ValuationProvider};
use crate::{ProviderId, Valuation};

pub const SUPER_CAR_BASE_URL: &str =
    "https://run.mocky.io/v3/9245229e-5c57-44e1-964b-36c7fb29168b";

const FIXTURE: &str = r#"{"valuation":{"lowerValue":10000,"upperValue":30000}}"#;

#[derive(Debug, Deserialize)]
struct SuperCarValuationResponse {
    valuation: SuperCarValuationRange,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuperCarValuationRange {
    lower_value: f64,
    upper_value: f64,
}

/// SuperCar valuations, the primary provider.
#[derive(Clone)]
pub struct SuperCarAdapter {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    timeout_ms: u64,
}

impl Default for SuperCarAdapter {
    fn default() -> Self {
        Self {
            http_client: Arc::new(StaticHttpClient::ok_json(FIXTURE)),
            base_url: SUPER_CAR_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl SuperCarAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn request_url(&self, vrm: &str, mileage: u32) -> String {
        join_url(
            &self.base_url,
            &format!("valuations/{}?mileage={mileage}", urlencoding::encode(vrm)),
        )
    }
}

impl ValuationProvider for SuperCarAdapter {
    fn name(&self) -> &str {
        ProviderId::SuperCar.as_str()
    }

    fn valuation<'a>(&'a self, vrm: &'a str, mileage: u32) -> ProviderFuture<'a> {
        Box::pin(async move {
            let request = json_get(self.request_url(vrm, mileage), self.timeout_ms);
            let payload: SuperCarValuationResponse =
                fetch_json(self.http_client.as_ref(), ProviderId::SuperCar, request).await?;

            Ok(Valuation::new(
                vrm,
                payload.valuation.lower_value,
                payload.valuation.upper_value,
                Some(ProviderId::SuperCar.to_string()),
            )?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_path_with_encoded_vrm_and_mileage() {
        let adapter = SuperCarAdapter::with_http_client(
            Arc::new(StaticHttpClient::ok_json(FIXTURE)),
            "https://example.test/base/",
        );
        assert_eq!(
            adapter.request_url("AB 12", 50000),
            "https://example.test/base/valuations/AB%2012?mileage=50000"
        );
    }

    #[tokio::test]
    async fn maps_lower_and_upper_values() {
        let adapter = SuperCarAdapter::default();
        let valuation = adapter.valuation("ABC123", 50000).await.expect("fixture parses");
        assert_eq!(valuation.vrm, "ABC123");
        assert_eq!(valuation.lowest_value, 10_000.0);
        assert_eq!(valuation.highest_value, 30_000.0);
        assert_eq!(valuation.provider.as_deref(), Some("SuperCar"));
    }
}
