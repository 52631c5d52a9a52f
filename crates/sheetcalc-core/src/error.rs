//! Error types for Sheetcalc core.

use thiserror::Error;

use sheetcalc_engine::engine::FormatError;

/// Errors that can occur while editing, loading or saving a spreadsheet
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Invalid cell name: {0:?}")]
    InvalidName(String),

    #[error("Formula format error: {0}")]
    Format(#[from] FormatError),

    #[error("Circular dependency detected in cell {0}")]
    Circular(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid name pattern: {0}")]
    NamePattern(#[from] regex::Error),

    #[error("Version mismatch: expected {expected:?}, found {found:?}")]
    VersionMismatch { expected: String, found: String },

    #[error("Failed to load cell {cell}: {source}")]
    Load {
        cell: String,
        #[source]
        source: Box<SheetError>,
    },

    #[error("No file path set")]
    NoFilePath,
}

pub type Result<T> = std::result::Result<T, SheetError>;
