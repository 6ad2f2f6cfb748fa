//! Writer backend trait for wallet-day exports
//!
//! Defines the interface for persisting exported wallet summaries to different backends.

use super::export::WalletDayExport;

#[derive(Debug)]
pub enum ExportWriterError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
    Database(String),
}

impl From<std::io::Error> for ExportWriterError {
    fn from(err: std::io::Error) -> Self {
        ExportWriterError::Io(err)
    }
}

impl From<serde_json::Error> for ExportWriterError {
    fn from(err: serde_json::Error) -> Self {
        ExportWriterError::Serialization(err)
    }
}

impl From<rusqlite::Error> for ExportWriterError {
    fn from(err: rusqlite::Error) -> Self {
        ExportWriterError::Database(err.to_string())
    }
}

impl std::fmt::Display for ExportWriterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportWriterError::Io(e) => write!(f, "IO error: {}", e),
            ExportWriterError::Serialization(e) => write!(f, "Serialization error: {}", e),
            ExportWriterError::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for ExportWriterError {}

/// Backend trait for persisting wallet-day exports
pub trait ExportBackend: Send {
    /// Persist one wallet's transactions and summary for a date
    fn persist(&mut self, export: &WalletDayExport) -> Result<(), ExportWriterError>;

    /// Get backend type for logging
    fn backend_type(&self) -> &'static str;
}
