//! Copy-trade analytics service
//!
//! Wires the data source, normalizer, summarizer, matcher and export adapter
//! together. All analysis runs on fully fetched snapshots; the only awaits are
//! the data-source calls.

use crate::analytics_core::{
    for_wallet, normalize_batch, CanonicalTransaction, ExportAdapter, ExportBackend, ExportWriterError,
    PatternMatch, PatternMatcher, PerformanceSummarizer, PerformanceSummary, TimeWindow,
    WalletDayExport,
};
use crate::envio::{DailySummary, SourceError, TradeQuery, TradeSource, WalletActivity, DEFAULT_TRADE_LIMIT};
use chrono::{DateTime, NaiveDate, Utc};

/// Rows requested per analysed day for performance queries
pub const TRADES_PER_DAY_ESTIMATE: usize = 100;

#[derive(Debug)]
pub enum AnalyticsError {
    Source(SourceError),
    Export(ExportWriterError),
}

impl From<SourceError> for AnalyticsError {
    fn from(err: SourceError) -> Self {
        AnalyticsError::Source(err)
    }
}

impl From<ExportWriterError> for AnalyticsError {
    fn from(err: ExportWriterError) -> Self {
        AnalyticsError::Export(err)
    }
}

impl std::fmt::Display for AnalyticsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalyticsError::Source(e) => write!(f, "Data source error: {}", e),
            AnalyticsError::Export(e) => write!(f, "Export error: {}", e),
        }
    }
}

impl std::error::Error for AnalyticsError {}

pub struct CopyTradeAnalytics<S: TradeSource, B: ExportBackend> {
    source: S,
    exporter: ExportAdapter<B>,
    summarizer: PerformanceSummarizer,
    query_limit: usize,
}

impl<S: TradeSource, B: ExportBackend> CopyTradeAnalytics<S, B> {
    pub fn new(source: S, backend: B) -> Self {
        log::info!("✅ Copy-trade analytics initialized ({} export)", backend.backend_type());

        Self {
            source,
            exporter: ExportAdapter::new(backend),
            summarizer: PerformanceSummarizer::new(),
            query_limit: DEFAULT_TRADE_LIMIT,
        }
    }

    /// Row limit for detection and export queries
    pub fn with_query_limit(mut self, query_limit: usize) -> Self {
        self.query_limit = query_limit;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn backend(&self) -> &B {
        self.exporter.backend()
    }

    /// Fetch and normalize a wallet's most recent trades
    pub async fn fetch_transactions(
        &self,
        wallet_address: &str,
        limit: usize,
    ) -> Result<Vec<CanonicalTransaction>, AnalyticsError> {
        let raw = self
            .source
            .fetch_trades(&TradeQuery::for_wallet(wallet_address, limit))
            .await?;
        let transactions = normalize_batch(&raw);
        let fetched = transactions.len();

        let transactions = for_wallet(transactions, wallet_address);
        if transactions.len() < fetched {
            log::warn!(
                "⚠️  Dropped {} trades not belonging to {}",
                fetched - transactions.len(),
                wallet_address
            );
        }
        Ok(transactions)
    }

    pub async fn analyze_wallet_performance(
        &self,
        wallet_address: &str,
        days: u32,
    ) -> Result<PerformanceSummary, AnalyticsError> {
        self.analyze_wallet_performance_at(wallet_address, days, Utc::now())
            .await
    }

    /// Summarize the wallet's trades from the `days` before `now`
    pub async fn analyze_wallet_performance_at(
        &self,
        wallet_address: &str,
        days: u32,
        now: DateTime<Utc>,
    ) -> Result<PerformanceSummary, AnalyticsError> {
        log::info!(
            "📊 Analyzing performance for {} (last {} days)",
            wallet_address,
            days
        );

        let limit = (days as usize).saturating_mul(TRADES_PER_DAY_ESTIMATE);
        let transactions = self.fetch_transactions(wallet_address, limit).await?;
        let transactions = TimeWindow::trailing_days(days, now).filter(transactions);

        let summary = self.summarizer.summarize(&transactions);

        log::info!(
            "✅ Performance analysis complete: {} transactions",
            summary.transaction_count
        );
        Ok(summary)
    }

    pub async fn detect_copy_trading_patterns(
        &self,
        reference_wallet: &str,
        suspect_wallet: &str,
        days: u32,
        time_threshold_secs: u64,
    ) -> Result<Vec<PatternMatch>, AnalyticsError> {
        self.detect_copy_trading_patterns_at(
            reference_wallet,
            suspect_wallet,
            days,
            time_threshold_secs,
            Utc::now(),
        )
        .await
    }

    /// Match the suspect wallet's trades against the reference wallet's,
    /// both restricted to the `days` before `now`
    pub async fn detect_copy_trading_patterns_at(
        &self,
        reference_wallet: &str,
        suspect_wallet: &str,
        days: u32,
        time_threshold_secs: u64,
        now: DateTime<Utc>,
    ) -> Result<Vec<PatternMatch>, AnalyticsError> {
        log::info!(
            "🔍 Detecting copy trading patterns: {}... vs {}...",
            short_address(reference_wallet),
            short_address(suspect_wallet)
        );

        let window = TimeWindow::trailing_days(days, now);
        let reference = window.filter(self.fetch_transactions(reference_wallet, self.query_limit).await?);
        let suspect = window.filter(self.fetch_transactions(suspect_wallet, self.query_limit).await?);

        let matches = PatternMatcher::new(time_threshold_secs).find_matches_windowed(&reference, &suspect);

        log::info!(
            "🎯 Detected {} potential copy trading patterns ({} reference / {} suspect trades)",
            matches.len(),
            reference.len(),
            suspect.len()
        );
        Ok(matches)
    }

    /// Export the wallet's trades on a UTC date together with their summary
    pub async fn export_wallet_day(
        &mut self,
        wallet_address: &str,
        target_date: NaiveDate,
    ) -> Result<WalletDayExport, AnalyticsError> {
        log::info!("📤 Exporting data for {} on {}", wallet_address, target_date);

        let transactions = self.fetch_transactions(wallet_address, self.query_limit).await?;
        let transactions = TimeWindow::utc_day(target_date).filter(transactions);
        let summary = self.summarizer.summarize(&transactions);

        let export = self
            .exporter
            .export(wallet_address, target_date, transactions, summary)?;
        Ok(export)
    }

    pub async fn wallet_activity(
        &self,
        wallet_address: &str,
        date: NaiveDate,
    ) -> Result<Option<WalletActivity>, AnalyticsError> {
        Ok(self.source.fetch_wallet_activity(wallet_address, date).await?)
    }

    pub async fn daily_summary(&self, date: NaiveDate) -> Result<Option<DailySummary>, AnalyticsError> {
        Ok(self.source.fetch_daily_summary(date).await?)
    }
}

fn short_address(address: &str) -> &str {
    address.get(..10).unwrap_or(address)
}
