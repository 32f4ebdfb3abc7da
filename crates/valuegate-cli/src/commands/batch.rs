use std::fs::File;
use std::io::{self, BufRead, BufReader};

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use valuegate_core::{Valuation, ValuationRequest, ValuationService, Vrm};
use valuegate_warehouse::Warehouse;

use crate::cli::BatchArgs;
use crate::error::CliError;

use super::build_service;
use super::valuate::fetch_or_load;

/// Result of one input line.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchEntry {
    line: usize,
    vrm: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    valuation: Option<Valuation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub async fn run(args: &BatchArgs, mock: bool, warehouse: &Warehouse) -> Result<Value, CliError> {
    let lines = match &args.input {
        Some(path) => read_lines(BufReader::new(File::open(path)?))?,
        None => read_lines(io::stdin().lock())?,
    };

    let service = build_service(mock, warehouse)?;
    let entries = process(&lines, &service, warehouse).await?;
    Ok(serde_json::to_value(entries)?)
}

fn read_lines(reader: impl BufRead) -> io::Result<Vec<String>> {
    reader.lines().collect()
}

/// Route every `VRM MILEAGE` line through the same service, so the gate sees
/// the whole run. Blank lines and `#` comments are skipped. A bad line or an
/// unavailable provider fails that line only; storage errors abort the run.
async fn process(
    lines: &[String],
    service: &ValuationService,
    warehouse: &Warehouse,
) -> Result<Vec<BatchEntry>, CliError> {
    let mut entries = Vec::new();

    for (index, raw) in lines.iter().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let vrm = line.split_whitespace().next().unwrap_or_default().to_string();
        let outcome = match parse_request(line) {
            Ok(request) => fetch_or_load(&request, service, warehouse).await,
            Err(error) => Err(error),
        };

        let entry = match outcome {
            Ok(valuation) => BatchEntry {
                line: index + 1,
                vrm,
                valuation: Some(valuation),
                error: None,
            },
            Err(error @ (CliError::Warehouse(_) | CliError::Io(_))) => return Err(error),
            Err(error) => {
                warn!(line = index + 1, vrm = %vrm, error = %error, "batch line failed");
                BatchEntry {
                    line: index + 1,
                    vrm,
                    valuation: None,
                    error: Some(error.to_string()),
                }
            }
        };
        entries.push(entry);
    }

    let snapshot = service.gate().snapshot();
    info!(
        lines = entries.len(),
        gate = snapshot.state.label(),
        window_failures = snapshot.failures,
        "batch finished"
    );
    Ok(entries)
}

fn parse_request(line: &str) -> Result<ValuationRequest, CliError> {
    let mut fields = line.split_whitespace();
    let (Some(vrm), Some(mileage), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(CliError::InvalidInput(format!(
            "expected 'VRM MILEAGE', got '{line}'"
        )));
    };

    let mileage = mileage.parse::<u32>().map_err(|_| {
        CliError::InvalidInput(format!("mileage must be a positive number, got '{mileage}'"))
    })?;
    Ok(ValuationRequest::new(Vrm::parse(vrm)?, mileage)?)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;
    use valuegate_core::{
        GateConfig, HttpResponse, PremiumCarAdapter, ProviderLogFilter, StaticHttpClient,
        SuperCarAdapter, ValuationServiceBuilder, WarehouseConfig,
    };

    use super::*;

    fn temp_warehouse() -> (TempDir, Warehouse) {
        let temp = tempfile::tempdir().expect("tempdir");
        let warehouse =
            Warehouse::open(WarehouseConfig::with_home(temp.path())).expect("open warehouse");
        (temp, warehouse)
    }

    fn lines(input: &[&str]) -> Vec<String> {
        input.iter().map(|line| line.to_string()).collect()
    }

    #[tokio::test]
    async fn failing_primary_fails_over_once_window_fills() {
        let (_temp, warehouse) = temp_warehouse();
        let down = StaticHttpClient::respond(HttpResponse::with_status(500, "down"));
        let service = ValuationServiceBuilder::new()
            .with_providers(
                Arc::new(SuperCarAdapter::with_http_client(
                    Arc::new(down),
                    "https://supercar.test",
                )),
                Arc::new(PremiumCarAdapter::default()),
            )
            .with_log_store(Arc::new(warehouse.clone()))
            .with_gate_config(GateConfig {
                window_size: 2,
                ..GateConfig::default()
            })
            .build()
            .expect("service");

        let entries = process(
            &lines(&["AAA111 1000", "BBB222 2000", "CCC333 3000", "DDD444 4000"]),
            &service,
            &warehouse,
        )
        .await
        .expect("batch");

        assert_eq!(entries.len(), 4);
        for entry in &entries[..2] {
            assert_eq!(
                entry.error.as_deref(),
                Some("Unable to get valuation from the primary provider")
            );
        }
        for entry in &entries[2..] {
            let valuation = entry.valuation.as_ref().expect("fallback valuation");
            assert_eq!(valuation.provider.as_deref(), Some("PremiumCar"));
            assert_eq!(valuation.vrm, entry.vrm);
        }
        assert!(service.gate().state().is_open());

        let providers: Vec<String> = warehouse
            .provider_logs(&ProviderLogFilter::default())
            .expect("logs")
            .into_iter()
            .map(|log| log.provider)
            .collect();
        assert_eq!(providers, ["PremiumCar", "PremiumCar", "SuperCar", "SuperCar"]);
    }

    #[tokio::test]
    async fn bad_lines_fail_individually_and_comments_are_skipped() {
        let (_temp, warehouse) = temp_warehouse();
        let service = ValuationServiceBuilder::new()
            .with_mock_mode()
            .build()
            .expect("service");

        let entries = process(
            &lines(&["# vrm mileage", "", "AAA111", "BBB222 abc", "CCC333 0", "DDD444 100"]),
            &service,
            &warehouse,
        )
        .await
        .expect("batch");

        let numbers: Vec<usize> = entries.iter().map(|entry| entry.line).collect();
        assert_eq!(numbers, [3, 4, 5, 6]);
        assert!(entries[..3].iter().all(|entry| entry.error.is_some()));
        assert_eq!(
            entries[2].error.as_deref(),
            Some("mileage must be a positive number")
        );
        assert_eq!(
            entries[3]
                .valuation
                .as_ref()
                .and_then(|valuation| valuation.provider.as_deref()),
            Some("SuperCar")
        );
    }

    #[tokio::test]
    async fn repeated_vrm_is_served_from_the_warehouse() {
        let (_temp, warehouse) = temp_warehouse();
        let service = ValuationServiceBuilder::new()
            .with_mock_mode()
            .with_log_store(Arc::new(warehouse.clone()))
            .build()
            .expect("service");

        let entries = process(&lines(&["AAA111 100", "AAA111 200"]), &service, &warehouse)
            .await
            .expect("batch");

        assert!(entries.iter().all(|entry| entry.valuation.is_some()));
        let logs = warehouse
            .provider_logs(&ProviderLogFilter::default())
            .expect("logs");
        assert_eq!(logs.len(), 1);
    }

    #[test]
    fn entries_serialize_without_empty_fields() {
        let entry = BatchEntry {
            line: 1,
            vrm: "AAA111".into(),
            valuation: None,
            error: Some("boom".into()),
        };
        let json = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(json["error"], "boom");
        assert!(json.get("valuation").is_none());
    }
}
