//! Export adapter: packages a wallet-day for the persistence backend

use super::normalizer::{CanonicalTransaction, UNKNOWN_WALLET_NAME};
use super::summarizer::PerformanceSummary;
use super::writer_backend::{ExportBackend, ExportWriterError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Persisted record for one wallet on one UTC date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletDayExport {
    pub wallet_name: String,
    pub wallet_address: String,
    pub date: NaiveDate,
    pub transactions: Vec<CanonicalTransaction>,
    pub summary: PerformanceSummary,
}

impl WalletDayExport {
    /// The display name comes from the first transaction, or "Unknown"
    pub fn new(
        wallet_address: &str,
        date: NaiveDate,
        transactions: Vec<CanonicalTransaction>,
        summary: PerformanceSummary,
    ) -> Self {
        let wallet_name = transactions
            .first()
            .map(|tx| tx.wallet_name.clone())
            .unwrap_or_else(|| UNKNOWN_WALLET_NAME.to_string());

        Self {
            wallet_name,
            wallet_address: wallet_address.to_string(),
            date,
            transactions,
            summary,
        }
    }
}

pub struct ExportAdapter<B: ExportBackend> {
    backend: B,
}

impl<B: ExportBackend> ExportAdapter<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Hand a filtered wallet-day and its summary to the backend.
    ///
    /// Failures are logged and returned; nothing is retried here.
    pub fn export(
        &mut self,
        wallet_address: &str,
        date: NaiveDate,
        transactions: Vec<CanonicalTransaction>,
        summary: PerformanceSummary,
    ) -> Result<WalletDayExport, ExportWriterError> {
        let export = WalletDayExport::new(wallet_address, date, transactions, summary);

        match self.backend.persist(&export) {
            Ok(()) => {
                log::info!(
                    "💾 Exported {} transactions for {} ({}) on {} via {}",
                    export.transactions.len(),
                    export.wallet_name,
                    export.wallet_address,
                    export.date,
                    self.backend.backend_type()
                );
                Ok(export)
            }
            Err(e) => {
                log::error!(
                    "Failed to export {} on {} via {}: {}",
                    export.wallet_address,
                    export.date,
                    self.backend.backend_type(),
                    e
                );
                Err(e)
            }
        }
    }
}
