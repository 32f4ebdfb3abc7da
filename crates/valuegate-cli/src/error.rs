use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] valuegate_core::ValidationError),

    #[error(transparent)]
    ServiceUnavailable(#[from] valuegate_core::ServiceUnavailable),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no stored valuation for vrm '{vrm}'")]
    NotFound { vrm: String },

    #[error(transparent)]
    Warehouse(#[from] valuegate_warehouse::WarehouseError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::InvalidInput(_) => 2,
            Self::ServiceUnavailable(_) => 3,
            Self::NotFound { .. } => 4,
            Self::Warehouse(_) => 5,
            Self::Serialization(_) => 6,
            Self::Io(_) => 10,
        }
    }
}
