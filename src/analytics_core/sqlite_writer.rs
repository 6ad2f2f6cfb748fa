//! SQLite writer for wallet-day exports
//!
//! Decimal amounts are stored as TEXT so no precision is lost in the database.
//! Swaps are keyed by the indexer's swap id, since one transaction hash can
//! carry several swaps. Re-exporting a wallet-day replaces its rows.

use super::export::WalletDayExport;
use super::writer_backend::{ExportBackend, ExportWriterError};
use crate::sqlite_pragma::apply_optimized_pragmas;
use rusqlite::{params, Connection};
use std::path::Path;

pub struct SqliteExportWriter {
    conn: Connection,
}

impl SqliteExportWriter {
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, ExportWriterError> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;
        apply_optimized_pragmas(&conn)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS wallet_summaries (
                wallet_address TEXT NOT NULL,
                date TEXT NOT NULL,
                wallet_name TEXT NOT NULL,
                transaction_count INTEGER NOT NULL,
                buy_count INTEGER NOT NULL,
                sell_count INTEGER NOT NULL,
                total_buy_eth TEXT NOT NULL,
                total_sell_eth TEXT NOT NULL,
                total_buy_usdc TEXT NOT NULL,
                total_sell_usdc TEXT NOT NULL,
                net_eth_position TEXT NOT NULL,
                net_usdc_position TEXT NOT NULL,
                avg_buy_price TEXT NOT NULL,
                avg_sell_price TEXT NOT NULL,
                PRIMARY KEY (wallet_address, date)
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS wallet_transactions (
                id TEXT PRIMARY KEY,
                transaction_hash TEXT NOT NULL,
                wallet_address TEXT NOT NULL,
                date TEXT NOT NULL,
                timestamp INTEGER NOT NULL,
                block_number INTEGER NOT NULL,
                wallet_name TEXT NOT NULL,
                trade_type TEXT NOT NULL,
                eth_amount TEXT NOT NULL,
                usdc_amount TEXT NOT NULL,
                price TEXT NOT NULL,
                protocol TEXT NOT NULL,
                pool_address TEXT NOT NULL,
                pool_fee TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_wallet_date ON wallet_transactions(wallet_address, date)",
            [],
        )?;

        log::info!("✅ SQLite export writer initialized");

        Ok(Self { conn })
    }
}

impl ExportBackend for SqliteExportWriter {
    fn persist(&mut self, export: &WalletDayExport) -> Result<(), ExportWriterError> {
        let wallet_address = export.wallet_address.to_lowercase();
        let date = export.date.format("%Y-%m-%d").to_string();
        let summary = &export.summary;

        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT OR REPLACE INTO wallet_summaries
             (wallet_address, date, wallet_name, transaction_count, buy_count, sell_count,
              total_buy_eth, total_sell_eth, total_buy_usdc, total_sell_usdc,
              net_eth_position, net_usdc_position, avg_buy_price, avg_sell_price)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                wallet_address,
                date,
                export.wallet_name,
                summary.transaction_count as i64,
                summary.buy_count as i64,
                summary.sell_count as i64,
                summary.total_buy_eth.to_string(),
                summary.total_sell_eth.to_string(),
                summary.total_buy_usdc.to_string(),
                summary.total_sell_usdc.to_string(),
                summary.net_eth_position.to_string(),
                summary.net_usdc_position.to_string(),
                summary.avg_buy_price.to_string(),
                summary.avg_sell_price.to_string(),
            ],
        )?;

        tx.execute(
            "DELETE FROM wallet_transactions WHERE wallet_address = ?1 AND date = ?2",
            params![wallet_address, date],
        )?;

        for trade in &export.transactions {
            tx.execute(
                "INSERT OR REPLACE INTO wallet_transactions
                 (id, transaction_hash, wallet_address, date, timestamp, block_number, wallet_name,
                  trade_type, eth_amount, usdc_amount, price, protocol, pool_address, pool_fee)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                params![
                    trade.id,
                    trade.transaction_hash,
                    wallet_address,
                    date,
                    trade.timestamp.timestamp(),
                    trade.block_number as i64,
                    trade.wallet_name,
                    trade.direction.as_str(),
                    trade.eth_amount.to_string(),
                    trade.usdc_amount.to_string(),
                    trade.price.to_string(),
                    trade.protocol,
                    trade.pool_address,
                    trade.pool_fee,
                ],
            )?;
        }

        tx.commit()?;

        log::debug!(
            "✅ Stored {} transactions for {} on {}",
            export.transactions.len(),
            wallet_address,
            date
        );

        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "SQLite"
    }
}
