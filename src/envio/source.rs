//! Data source trait for indexed trade records

use super::types::{DailySummary, WalletActivity};
use crate::analytics_core::normalizer::RawTrade;
use async_trait::async_trait;
use chrono::NaiveDate;

pub const DEFAULT_TRADE_LIMIT: usize = 1000;

/// Filter for a trades query; newest trades come first
#[derive(Debug, Clone, PartialEq)]
pub struct TradeQuery {
    pub wallet_address: Option<String>,
    pub limit: usize,
}

impl TradeQuery {
    pub fn for_wallet(wallet_address: &str, limit: usize) -> Self {
        Self {
            wallet_address: Some(wallet_address.to_lowercase()),
            limit,
        }
    }
}

impl Default for TradeQuery {
    fn default() -> Self {
        Self {
            wallet_address: None,
            limit: DEFAULT_TRADE_LIMIT,
        }
    }
}

#[derive(Debug)]
pub enum SourceError {
    Http(reqwest::Error),
    Status(u16),
    GraphQl(String),
    Decode(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Http(err)
    }
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Http(e) => write!(f, "HTTP error: {}", e),
            SourceError::Status(code) => write!(f, "GraphQL endpoint returned status {}", code),
            SourceError::GraphQl(e) => write!(f, "GraphQL errors: {}", e),
            SourceError::Decode(e) => write!(f, "Decode error: {}", e),
        }
    }
}

impl std::error::Error for SourceError {}

/// Supplier of raw trades and indexer-side aggregates
#[async_trait]
pub trait TradeSource: Send + Sync {
    async fn fetch_trades(&self, query: &TradeQuery) -> Result<Vec<RawTrade>, SourceError>;

    async fn fetch_wallet_activity(
        &self,
        wallet_address: &str,
        date: NaiveDate,
    ) -> Result<Option<WalletActivity>, SourceError>;

    async fn fetch_daily_summary(&self, date: NaiveDate) -> Result<Option<DailySummary>, SourceError>;
}
