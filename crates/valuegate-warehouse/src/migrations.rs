use ::duckdb::{params, Connection};

struct Migration {
    version: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "0001_valuation_tables",
        sql: r#"
CREATE TABLE IF NOT EXISTS vehicle_valuations (
    vrm VARCHAR(7) PRIMARY KEY,
    lowest_value DOUBLE NOT NULL,
    highest_value DOUBLE NOT NULL,
    provider TEXT,
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE SEQUENCE IF NOT EXISTS provider_logs_id_seq START 1;

CREATE TABLE IF NOT EXISTS provider_logs (
    id BIGINT PRIMARY KEY DEFAULT nextval('provider_logs_id_seq'),
    vrm TEXT NOT NULL,
    timestamp_ms BIGINT NOT NULL,
    request_duration_ms BIGINT NOT NULL,
    response_code INTEGER NOT NULL,
    error_message TEXT,
    url TEXT NOT NULL,
    provider TEXT NOT NULL
);
"#,
    },
    Migration {
        version: "0002_indexes",
        sql: r#"
CREATE INDEX IF NOT EXISTS idx_vehicle_valuations_provider ON vehicle_valuations(provider);
CREATE INDEX IF NOT EXISTS idx_provider_logs_provider_ts ON provider_logs(provider, timestamp_ms);
CREATE INDEX IF NOT EXISTS idx_provider_logs_vrm_ts ON provider_logs(vrm, timestamp_ms);
"#,
    },
];

/// Apply every migration not yet recorded in `schema_migrations`.
pub fn apply_migrations(connection: &Connection) -> Result<(), ::duckdb::Error> {
    connection.execute_batch(
        r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version TEXT PRIMARY KEY,
    applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#,
    )?;

    for migration in MIGRATIONS {
        let applied_count: i64 = connection.query_row(
            "SELECT COUNT(*) FROM schema_migrations WHERE version = ?",
            params![migration.version],
            |row| row.get(0),
        )?;

        if applied_count == 0 {
            connection.execute_batch(migration.sql)?;
            connection.execute(
                "INSERT INTO schema_migrations (version) VALUES (?)",
                params![migration.version],
            )?;
        }
    }

    Ok(())
}
