//! GraphQL request/response shapes for the Envio HyperIndex API

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Standard GraphQL envelope
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<Value>>,
}

#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub variables: Value,
}

/// Trades stay untyped here and are decoded one record at a time
#[derive(Debug, Deserialize)]
pub struct TradesData {
    #[serde(default)]
    pub trades: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct WalletActivityData {
    #[serde(rename = "walletActivity")]
    pub wallet_activity: Option<WalletActivity>,
}

#[derive(Debug, Deserialize)]
pub struct DailySummaryData {
    #[serde(rename = "dailySummary")]
    pub daily_summary: Option<DailySummary>,
}

/// Per-wallet, per-day aggregate maintained by the indexer.
///
/// Informational only; local summaries are always recomputed from trades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletActivity {
    pub id: String,
    pub wallet_address: String,
    pub wallet_name: Option<String>,
    pub date: String,
    #[serde(deserialize_with = "lenient_u64")]
    pub transaction_count: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub buy_count: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub sell_count: u64,
    pub total_buy_eth: Decimal,
    pub total_sell_eth: Decimal,
    pub total_buy_usdc: Decimal,
    pub total_sell_usdc: Decimal,
    pub net_eth_position: Decimal,
    pub net_usdc_position: Decimal,
    pub avg_buy_price: Option<Decimal>,
    pub avg_sell_price: Option<Decimal>,
}

/// Chain-wide daily aggregate maintained by the indexer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub id: String,
    pub date: String,
    #[serde(deserialize_with = "lenient_u64")]
    pub total_transactions: u64,
    pub total_volume_eth: Decimal,
    pub total_volume_usdc: Decimal,
    #[serde(deserialize_with = "lenient_u64")]
    pub unique_wallets: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub buy_count: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub sell_count: u64,
    pub avg_buy_price: Option<Decimal>,
    pub avg_sell_price: Option<Decimal>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

/// Hasura exposes BigInt columns as strings; accept either form
fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| serde::de::Error::custom(format!("expected unsigned integer, got {}", n))),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid integer '{}': {}", s, e))),
        other => Err(serde::de::Error::custom(format!("expected integer, got {}", other))),
    }
}
