use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KaratError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    #[error("Allocation error: {0}")]
    Allocation(#[from] AllocationError),

    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl KaratError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },
}

/// Data-integrity and state-machine errors from the job workflow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Unmapped job status '{0}'")]
    UnmappedStatus(String),

    #[error("Unknown job phase '{0}'")]
    UnknownPhase(String),

    #[error("Unknown order status '{0}'")]
    UnknownOrderStatus(String),

    #[error("Illegal transition from '{from}' to '{to}'")]
    IllegalTransition { from: String, to: String },

    #[error("Job {job_id} stored phase '{stored}' does not match status '{status}' (expected '{expected}')")]
    PhaseMismatch {
        job_id: String,
        status: String,
        stored: String,
        expected: String,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AllocationError {
    #[error("Lot {lot_id} has {available} pieces available, {requested} requested")]
    InsufficientQuantity {
        lot_id: String,
        available: i64,
        requested: i64,
    },

    #[error("Lot {lot_id} has {available:.3} ct available, {requested:.3} ct requested")]
    InsufficientWeight {
        lot_id: String,
        available: f64,
        requested: f64,
    },

    #[error("Lot {lot_id} is a {actual} lot, expected a {expected} lot")]
    WrongLotKind {
        lot_id: String,
        expected: String,
        actual: String,
    },

    #[error("Allocation must be positive (quantity {quantity}, weight {weight_ct} ct)")]
    NonPositive { quantity: i64, weight_ct: f64 },

    #[error("Manufacturer {manufacturer_id} is at capacity ({capacity})")]
    ManufacturerAtCapacity {
        manufacturer_id: String,
        capacity: i64,
    },
}

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Failed to read image '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, KaratError>;
