use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Unknown station: {0}")]
    UnknownStation(String),

    #[error("Unknown store: {0}")]
    UnknownStore(String),

    #[error("Unknown event template: {0}")]
    UnknownTemplate(String),

    #[error("Unknown SKU {sku} at store {store}")]
    UnknownSku { store: String, sku: String },

    #[error("Unknown payroll role {role} at store {store}")]
    UnknownRole { store: String, role: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("days must be in 1..={max}, got {days}")]
    DaysOutOfRange { days: u32, max: u32 },

    #[error("No snapshot available for day {0}")]
    NoSnapshot(u32),

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
