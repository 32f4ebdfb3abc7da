//! # Valuegate Warehouse
//!
//! DuckDB-backed storage for vehicle valuations and provider audit logs.
//!
//! ## Tables
//!
//! | Table | Description |
//! |-------|-------------|
//! | `vehicle_valuations` | One stored valuation per VRM |
//! | `provider_logs` | One row per outbound provider call |
//! | `schema_migrations` | Applied migration versions |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use valuegate_warehouse::{ValuationRecord, Warehouse};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let warehouse = Warehouse::open_default()?;
//!
//!     warehouse.insert_valuation(&ValuationRecord {
//!         vrm: "ABC123".to_string(),
//!         lowest_value: 10_000.0,
//!         highest_value: 30_000.0,
//!         provider: Some("SuperCar".to_string()),
//!     })?;
//!
//!     let stored = warehouse.find_valuation("ABC123")?;
//!     assert!(stored.is_some());
//!     Ok(())
//! }
//! ```
//!
//! All caller-supplied values are bound as query parameters.

pub mod duckdb;
pub mod migrations;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use ::duckdb::{params, Row, ToSql};
use serde::Serialize;
use thiserror::Error;

pub use duckdb::{DuckDbConnectionManager, PooledConnection};

/// Errors that can occur during warehouse operations.
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// `DuckDB` database error.
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    /// I/O error (creating the database directory).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A stored row could not be mapped back into a record.
    #[error("invalid stored data: {0}")]
    InvalidData(String),
}

/// Configuration for the warehouse database.
#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    /// Root directory for valuegate data.
    pub valuegate_home: PathBuf,
    /// Path to the `DuckDB` database file.
    pub db_path: PathBuf,
    /// Maximum number of idle connections kept by the pool.
    pub max_pool_size: usize,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self::with_home(resolve_valuegate_home())
    }
}

impl WarehouseConfig {
    /// Configuration rooted at `valuegate_home` with the default file layout.
    pub fn with_home(valuegate_home: impl Into<PathBuf>) -> Self {
        let valuegate_home = valuegate_home.into();
        let db_path = valuegate_home.join("data").join("valuegate.duckdb");
        Self {
            valuegate_home,
            db_path,
            max_pool_size: 4,
        }
    }
}

/// A stored vehicle valuation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationRecord {
    pub vrm: String,
    pub lowest_value: f64,
    pub highest_value: f64,
    pub provider: Option<String>,
}

/// A stored provider call audit entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderLogRecord {
    pub vrm: String,
    /// Call start, unix epoch milliseconds.
    pub timestamp_ms: i64,
    pub request_duration_ms: i64,
    pub response_code: i32,
    pub error_message: Option<String>,
    pub url: String,
    pub provider: String,
}

/// Filter for [`Warehouse::provider_logs`]; `None` fields match everything.
#[derive(Debug, Clone, Default)]
pub struct ProviderLogFilter {
    pub vrm: Option<String>,
    pub provider: Option<String>,
    pub limit: Option<usize>,
}

/// The main warehouse interface.
#[derive(Clone)]
pub struct Warehouse {
    config: WarehouseConfig,
    manager: DuckDbConnectionManager,
}

impl Warehouse {
    /// Open a warehouse with default configuration.
    pub fn open_default() -> Result<Self, WarehouseError> {
        Self::open(WarehouseConfig::default())
    }

    /// Open a warehouse with the specified configuration.
    pub fn open(config: WarehouseConfig) -> Result<Self, WarehouseError> {
        if let Some(parent) = config.db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let manager = DuckDbConnectionManager::open(config.db_path.clone(), config.max_pool_size)?;
        let warehouse = Self { config, manager };
        warehouse.initialize()?;
        Ok(warehouse)
    }

    /// Apply pending schema migrations.
    pub fn initialize(&self) -> Result<(), WarehouseError> {
        let connection = self.manager.acquire()?;
        migrations::apply_migrations(&connection)?;
        Ok(())
    }

    pub fn config(&self) -> &WarehouseConfig {
        &self.config
    }

    pub fn db_path(&self) -> &Path {
        self.manager.db_path()
    }

    /// Store a valuation unless one already exists for the VRM.
    ///
    /// Returns `true` when a row was written and `false` when an existing
    /// valuation was kept.
    pub fn insert_valuation(&self, record: &ValuationRecord) -> Result<bool, WarehouseError> {
        let connection = self.manager.acquire()?;
        let changed = connection.execute(
            "INSERT OR IGNORE INTO vehicle_valuations (vrm, lowest_value, highest_value, provider) \
             VALUES (?, ?, ?, ?)",
            params![
                record.vrm,
                record.lowest_value,
                record.highest_value,
                record.provider
            ],
        )?;
        Ok(changed > 0)
    }

    /// Look up the stored valuation for a VRM.
    pub fn find_valuation(&self, vrm: &str) -> Result<Option<ValuationRecord>, WarehouseError> {
        let connection = self.manager.acquire()?;
        let mut statement = connection.prepare(
            "SELECT vrm, lowest_value, highest_value, provider \
             FROM vehicle_valuations WHERE vrm = ?",
        )?;
        let mut rows = statement.query_map(params![vrm], read_valuation)?;

        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Append one provider call audit entry.
    pub fn insert_provider_log(&self, record: &ProviderLogRecord) -> Result<(), WarehouseError> {
        let connection = self.manager.acquire()?;
        let params: [&dyn ToSql; 7] = [
            &record.vrm,
            &record.timestamp_ms,
            &record.request_duration_ms,
            &record.response_code,
            &record.error_message,
            &record.url,
            &record.provider,
        ];
        connection.execute(
            "INSERT INTO provider_logs \
             (vrm, timestamp_ms, request_duration_ms, response_code, error_message, url, provider) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params.as_slice(),
        )?;
        Ok(())
    }

    /// List audit entries, newest first.
    pub fn provider_logs(
        &self,
        filter: &ProviderLogFilter,
    ) -> Result<Vec<ProviderLogRecord>, WarehouseError> {
        let mut sql = String::from(
            "SELECT vrm, timestamp_ms, request_duration_ms, response_code, error_message, url, provider \
             FROM provider_logs",
        );
        let mut clauses = Vec::new();
        let mut values: Vec<&dyn ToSql> = Vec::new();

        if let Some(vrm) = &filter.vrm {
            clauses.push("vrm = ?");
            values.push(vrm);
        }
        if let Some(provider) = &filter.provider {
            clauses.push("provider = ?");
            values.push(provider);
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY timestamp_ms DESC, id DESC");
        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let connection = self.manager.acquire()?;
        let mut statement = connection.prepare(&sql)?;
        let rows = statement.query_map(values.as_slice(), read_provider_log)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}

fn read_valuation(row: &Row<'_>) -> Result<ValuationRecord, ::duckdb::Error> {
    Ok(ValuationRecord {
        vrm: row.get(0)?,
        lowest_value: row.get(1)?,
        highest_value: row.get(2)?,
        provider: row.get(3)?,
    })
}

fn read_provider_log(row: &Row<'_>) -> Result<ProviderLogRecord, ::duckdb::Error> {
    Ok(ProviderLogRecord {
        vrm: row.get(0)?,
        timestamp_ms: row.get(1)?,
        request_duration_ms: row.get(2)?,
        response_code: row.get(3)?,
        error_message: row.get(4)?,
        url: row.get(5)?,
        provider: row.get(6)?,
    })
}

/// Resolve the valuegate home directory from environment or default.
fn resolve_valuegate_home() -> PathBuf {
    if let Some(path) = env::var_os("VALUEGATE_HOME") {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".valuegate");
    }

    PathBuf::from(".valuegate")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    fn open_temp() -> (TempDir, Warehouse) {
        let temp = tempdir().expect("tempdir");
        let warehouse =
            Warehouse::open(WarehouseConfig::with_home(temp.path().join("valuegate-home")))
                .expect("warehouse open");
        (temp, warehouse)
    }

    fn log(vrm: &str, provider: &str, timestamp_ms: i64) -> ProviderLogRecord {
        ProviderLogRecord {
            vrm: vrm.to_string(),
            timestamp_ms,
            request_duration_ms: 12,
            response_code: 200,
            error_message: None,
            url: "https://example.test".to_string(),
            provider: provider.to_string(),
        }
    }

    #[test]
    fn open_creates_database_under_home() {
        let (temp, warehouse) = open_temp();
        assert!(warehouse.db_path().starts_with(temp.path()));
        assert!(warehouse.db_path().exists());
    }

    #[test]
    fn reopening_applies_migrations_once() {
        let temp = tempdir().expect("tempdir");
        let config = WarehouseConfig::with_home(temp.path());
        {
            let warehouse = Warehouse::open(config.clone()).expect("first open");
            warehouse.initialize().expect("second initialize");
        }
        Warehouse::open(config).expect("reopen");
    }

    #[test]
    fn stores_and_finds_valuation() {
        let (_temp, warehouse) = open_temp();
        let record = ValuationRecord {
            vrm: "ABC123".to_string(),
            lowest_value: 10_000.0,
            highest_value: 30_000.0,
            provider: Some("SuperCar".to_string()),
        };

        assert!(warehouse.insert_valuation(&record).expect("insert"));
        assert_eq!(
            warehouse.find_valuation("ABC123").expect("find"),
            Some(record)
        );
        assert_eq!(warehouse.find_valuation("ZZZ999").expect("find"), None);
    }

    #[test]
    fn duplicate_valuation_keeps_first_row() {
        let (_temp, warehouse) = open_temp();
        let first = ValuationRecord {
            vrm: "ABC123".to_string(),
            lowest_value: 1.0,
            highest_value: 2.0,
            provider: None,
        };
        let second = ValuationRecord {
            lowest_value: 5.0,
            highest_value: 6.0,
            ..first.clone()
        };

        assert!(warehouse.insert_valuation(&first).expect("first insert"));
        assert!(!warehouse.insert_valuation(&second).expect("second insert"));
        assert_eq!(warehouse.find_valuation("ABC123").expect("find"), Some(first));
    }

    #[test]
    fn provider_logs_use_parameterized_filters() {
        let (_temp, warehouse) = open_temp();
        let dangerous = r#"AB'; DROP TABLE provider_logs; --"#;
        warehouse
            .insert_provider_log(&log(dangerous, "SuperCar", 1))
            .expect("insert dangerous");
        warehouse
            .insert_provider_log(&log("XYZ789", "PremiumCar", 2))
            .expect("insert second");

        let filtered = warehouse
            .provider_logs(&ProviderLogFilter {
                vrm: Some(dangerous.to_string()),
                ..ProviderLogFilter::default()
            })
            .expect("filter by vrm");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].vrm, dangerous);

        let all = warehouse
            .provider_logs(&ProviderLogFilter::default())
            .expect("list all");
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn provider_logs_are_newest_first_and_limited() {
        let (_temp, warehouse) = open_temp();
        for ts in [10, 30, 20] {
            warehouse
                .insert_provider_log(&log("ABC123", "SuperCar", ts))
                .expect("insert");
        }
        let mut failed = log("ABC123", "PremiumCar", 40);
        failed.response_code = 503;
        failed.error_message = Some("upstream returned status 503".to_string());
        warehouse.insert_provider_log(&failed).expect("insert failed");

        let super_car = warehouse
            .provider_logs(&ProviderLogFilter {
                provider: Some("SuperCar".to_string()),
                limit: Some(2),
                ..ProviderLogFilter::default()
            })
            .expect("list");
        let timestamps: Vec<i64> = super_car.iter().map(|row| row.timestamp_ms).collect();
        assert_eq!(timestamps, vec![30, 20]);

        let premium = warehouse
            .provider_logs(&ProviderLogFilter {
                provider: Some("PremiumCar".to_string()),
                ..ProviderLogFilter::default()
            })
            .expect("list");
        assert_eq!(premium, vec![failed]);
    }
}
