use serde_json::Value;
use valuegate_core::Vrm;
use valuegate_warehouse::Warehouse;

use crate::cli::ShowArgs;
use crate::error::CliError;

use super::valuation_from_record;

pub fn run(args: &ShowArgs, warehouse: &Warehouse) -> Result<Value, CliError> {
    let vrm = Vrm::parse(&args.vrm)?;
    let record = warehouse
        .find_valuation(vrm.as_str())?
        .ok_or_else(|| CliError::NotFound {
            vrm: vrm.as_str().to_string(),
        })?;
    Ok(serde_json::to_value(valuation_from_record(record))?)
}
