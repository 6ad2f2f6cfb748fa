//! Envio HyperIndex data source
//!
//! Fetches raw trade records and indexer-side aggregates over GraphQL. Nothing
//! here interprets the records; conversion happens in
//! [`analytics_core::normalizer`](crate::analytics_core::normalizer).

pub mod client;
pub mod source;
pub mod types;

pub use client::EnvioClient;
pub use source::{SourceError, TradeQuery, TradeSource, DEFAULT_TRADE_LIMIT};
pub use types::{DailySummary, WalletActivity};
