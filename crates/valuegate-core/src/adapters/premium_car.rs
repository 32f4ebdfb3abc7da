use std::sync::Arc;

use serde::Deserialize;

use super::{fetch_json, join_url, json_get};
use crate::http_client::{HttpClient, StaticHttpClient, DEFAULT_TIMEOUT_MS};
use crate::provider::{ProviderFuture, ValuationProvider};
use crate::{ProviderId, Valuation};

pub const PREMIUM_CAR_BASE_URL: &str =
    "https://run.mocky.io/v3/0dfda26a-3a5a-43e5-b68c-51f148eda473";

const FIXTURE: &str = r#"{
  "RegistrationDate": "2012-06-14T00:00:00.0000000",
  "RegistrationYear": 2012,
  "RegistrationMonth": 6,
  "ValuationPrivateSaleMinimum": 11500,
  "ValuationPrivateSaleMaximum": 12750,
  "ValuationDealershipMinimum": 9500,
  "ValuationDealershipMaximum": 13000
}"#;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PremiumCarValuationResponse {
    valuation_private_sale_minimum: f64,
    valuation_private_sale_maximum: f64,
    valuation_dealership_minimum: f64,
    valuation_dealership_maximum: f64,
}

impl PremiumCarValuationResponse {
    fn lowest(&self) -> f64 {
        self.valuation_private_sale_minimum
            .min(self.valuation_dealership_minimum)
    }

    fn highest(&self) -> f64 {
        self.valuation_private_sale_maximum
            .max(self.valuation_dealership_maximum)
    }
}

/// PremiumCar valuations, the fallback provider. Mileage is not sent upstream.
#[derive(Clone)]
pub struct PremiumCarAdapter {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    timeout_ms: u64,
}

impl Default for PremiumCarAdapter {
    fn default() -> Self {
        Self {
            http_client: Arc::new(StaticHttpClient::ok_json(FIXTURE)),
            base_url: PREMIUM_CAR_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl PremiumCarAdapter {
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

    pub fn request_url(&self, vrm: &str) -> String {
        join_url(
            &self.base_url,
            &format!("valueCar?vrm={}", urlencoding::encode(vrm)),
        )
    }
}

impl ValuationProvider for PremiumCarAdapter {
    fn name(&self) -> &str {
        ProviderId::PremiumCar.as_str()
    }

    fn valuation<'a>(&'a self, vrm: &'a str, _mileage: u32) -> ProviderFuture<'a> {
        Box::pin(async move {
            let request = json_get(self.request_url(vrm), self.timeout_ms);
            let payload: PremiumCarValuationResponse =
                fetch_json(self.http_client.as_ref(), ProviderId::PremiumCar, request).await?;

            Ok(Valuation::new(
                vrm,
                payload.lowest(),
                payload.highest(),
                Some(ProviderId::PremiumCar.to_string()),
            )?)
        })
    }
}
