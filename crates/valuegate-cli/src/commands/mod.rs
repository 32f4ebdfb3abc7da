mod batch;
mod logs;
mod show;
mod valuate;

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use valuegate_core::{Valuation, ValuationService, ValuationServiceBuilder};
use valuegate_warehouse::{ValuationRecord, Warehouse, WarehouseConfig};

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<Value, CliError> {
    let warehouse = open_warehouse(cli.db_path.as_deref())?;

    match &cli.command {
        Command::Valuate(args) => valuate::run(args, cli.mock, &warehouse).await,
        Command::Batch(args) => batch::run(args, cli.mock, &warehouse).await,
        Command::Show(args) => show::run(args, &warehouse),
        Command::Logs(args) => logs::run(args, &warehouse),
    }
}

fn open_warehouse(db_path: Option<&Path>) -> Result<Warehouse, CliError> {
    let config = match db_path {
        Some(path) => WarehouseConfig {
            db_path: path.to_path_buf(),
            ..WarehouseConfig::default()
        },
        None => WarehouseConfig::default(),
    };
    Ok(Warehouse::open(config)?)
}

/// Service wired to the warehouse as its audit log store.
fn build_service(mock: bool, warehouse: &Warehouse) -> Result<ValuationService, CliError> {
    let builder = if mock {
        ValuationServiceBuilder::new().with_mock_mode()
    } else {
        ValuationServiceBuilder::from_env()?
    };
    Ok(builder.with_log_store(Arc::new(warehouse.clone())).build()?)
}

fn valuation_from_record(record: ValuationRecord) -> Valuation {
    Valuation {
        vrm: record.vrm,
        lowest_value: record.lowest_value,
        highest_value: record.highest_value,
        provider: record.provider,
    }
}
