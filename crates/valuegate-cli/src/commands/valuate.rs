use serde_json::Value;
use tracing::info;
use valuegate_core::{Valuation, ValuationRequest, ValuationService, Vrm};
use valuegate_warehouse::{ValuationRecord, Warehouse};

use crate::cli::ValuateArgs;
use crate::error::CliError;

use super::{build_service, valuation_from_record};

pub async fn run(args: &ValuateArgs, mock: bool, warehouse: &Warehouse) -> Result<Value, CliError> {
    let request = ValuationRequest::new(Vrm::parse(&args.vrm)?, args.mileage)?;
    let service = build_service(mock, warehouse)?;
    let valuation = fetch_or_load(&request, &service, warehouse).await?;
    Ok(serde_json::to_value(valuation)?)
}

/// Stored valuation if there is one, otherwise fetch through `service` and store it.
pub(super) async fn fetch_or_load(
    request: &ValuationRequest,
    service: &ValuationService,
    warehouse: &Warehouse,
) -> Result<Valuation, CliError> {
    let vrm = request.vrm.as_str();

    if let Some(record) = warehouse.find_valuation(vrm)? {
        info!(vrm, "returning stored valuation");
        return Ok(valuation_from_record(record));
    }

    let valuation = service.get_valuation(vrm, request.mileage).await?;

    let record = ValuationRecord {
        vrm: valuation.vrm.clone(),
        lowest_value: valuation.lowest_value,
        highest_value: valuation.highest_value,
        provider: valuation.provider.clone(),
    };
    if !warehouse.insert_valuation(&record)? {
        info!(vrm, "valuation stored concurrently, keeping existing row");
    }

    Ok(valuation)
}
