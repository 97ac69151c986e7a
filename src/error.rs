//! Error types for flybox

use thiserror::Error;

/// Main error type for flybox operations
#[derive(Error, Debug)]
pub enum FlyboxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{name} already included in compendium (as \"{existing}\")")]
    DuplicateFly { name: String, existing: String },

    #[error("Fly not found: {0}")]
    FlyNotFound(String),

    #[error("Material not found in catalog: {0}")]
    MaterialNotFound(String),

    #[error("Inventory item not found: {0}")]
    InventoryItemNotFound(String),

    #[error("Fly belongs to the shared catalog and cannot be modified: {0}")]
    ReadOnlyFly(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for flybox operations
pub type Result<T> = std::result::Result<T, FlyboxError>;

impl FlyboxError {
    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a duplicate fly error
    pub fn duplicate(name: impl Into<String>, existing: impl Into<String>) -> Self {
        Self::DuplicateFly {
            name: name.into(),
            existing: existing.into(),
        }
    }

    /// Create a fly not found error
    pub fn fly_not_found(id: impl Into<String>) -> Self {
        Self::FlyNotFound(id.into())
    }
}
