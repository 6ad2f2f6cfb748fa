//! Unified writer interface for wallet-day exports
//!
//! Routes writes to either JSON or SQLite backend based on configuration.

use super::export::WalletDayExport;
use super::json_writer::JsonExportWriter;
use super::sqlite_writer::SqliteExportWriter;
use super::writer_backend::{ExportBackend, ExportWriterError};
use crate::config::BackendType;
use std::path::PathBuf;

/// Unified writer that routes to either JSON or SQLite backend
pub enum ExportWriter {
    Json(JsonExportWriter),
    Sqlite(SqliteExportWriter),
}

impl ExportWriter {
    /// Create a new export writer based on backend type.
    ///
    /// `output_path` is a directory for JSON and a database file for SQLite.
    /// Dry run only applies to the JSON backend.
    pub fn new(backend: BackendType, output_path: PathBuf, dry_run: bool) -> Result<Self, ExportWriterError> {
        match backend {
            BackendType::Json => {
                let writer = JsonExportWriter::new(output_path, dry_run)?;
                Ok(ExportWriter::Json(writer))
            }
            BackendType::Sqlite => {
                if dry_run {
                    log::warn!("EXPORT_DRY_RUN is ignored by the SQLite backend");
                }
                let writer = SqliteExportWriter::new(output_path)?;
                Ok(ExportWriter::Sqlite(writer))
            }
        }
    }
}

impl ExportBackend for ExportWriter {
    fn persist(&mut self, export: &WalletDayExport) -> Result<(), ExportWriterError> {
        match self {
            ExportWriter::Json(w) => w.persist(export),
            ExportWriter::Sqlite(w) => w.persist(export),
        }
    }

    fn backend_type(&self) -> &'static str {
        match self {
            ExportWriter::Json(w) => w.backend_type(),
            ExportWriter::Sqlite(w) => w.backend_type(),
        }
    }
}
