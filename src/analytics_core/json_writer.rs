//! JSON writer for wallet-day exports - one pretty-printed file per wallet per date

use super::export::WalletDayExport;
use super::writer_backend::{ExportBackend, ExportWriterError};
use std::fs;
use std::path::{Path, PathBuf};

pub struct JsonExportWriter {
    base_path: PathBuf,
    dry_run: bool,
}

impl JsonExportWriter {
    pub fn new(base_path: PathBuf, dry_run: bool) -> Result<Self, ExportWriterError> {
        if !dry_run {
            fs::create_dir_all(&base_path)?;
        }

        log::info!(
            "📝 Writing wallet exports to: {}{}",
            base_path.display(),
            if dry_run { " (dry run)" } else { "" }
        );

        Ok(Self { base_path, dry_run })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// `{base}/{YYYY-MM-DD}/{wallet_address}.json`, lowercased address.
    /// The display name lives inside the file only.
    pub fn path_for(&self, export: &WalletDayExport) -> PathBuf {
        let filename = format!(
            "{}.json",
            sanitize_file_component(&export.wallet_address.to_lowercase())
        );
        self.base_path
            .join(export.date.format("%Y-%m-%d").to_string())
            .join(filename)
    }
}

impl ExportBackend for JsonExportWriter {
    fn persist(&mut self, export: &WalletDayExport) -> Result<(), ExportWriterError> {
        let path = self.path_for(export);

        if self.dry_run {
            log::info!(
                "🧪 Dry run: would write {} transactions to {}",
                export.transactions.len(),
                path.display()
            );
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(export)?;
        fs::write(&path, json)?;

        log::debug!("Wrote {}", path.display());
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "JSON"
    }
}

fn sanitize_file_component(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}
