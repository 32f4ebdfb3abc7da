use serde_json::Value;
use valuegate_core::Vrm;
use valuegate_warehouse::{ProviderLogFilter, Warehouse};

use crate::cli::LogsArgs;
use crate::error::CliError;

pub fn run(args: &LogsArgs, warehouse: &Warehouse) -> Result<Value, CliError> {
    let vrm = args
        .vrm
        .as_deref()
        .map(Vrm::parse)
        .transpose()?
        .map(|vrm| vrm.as_str().to_string());

    let filter = ProviderLogFilter {
        vrm,
        provider: args.provider.clone(),
        limit: Some(args.limit),
    };
    let records = warehouse.provider_logs(&filter)?;
    Ok(serde_json::to_value(records)?)
}
