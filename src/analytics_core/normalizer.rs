//! Trade normalization from indexed GraphQL records to the canonical transaction

use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const UNKNOWN_WALLET_NAME: &str = "Unknown";
pub const DEFAULT_PROTOCOL: &str = "uniswap_v3";
pub const UNKNOWN_POOL_FEE: &str = "unknown";

/// Trade record as returned by the indexer.
///
/// Fields are kept as loose JSON so a wrongly typed value only rejects its own
/// record during conversion, never the surrounding response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTrade {
    pub id: Option<Value>,
    pub transaction_hash: Option<Value>,
    pub timestamp: Option<Value>,
    pub block_number: Option<Value>,
    pub wallet_address: Option<Value>,
    pub wallet_name: Option<Value>,
    pub trade_type: Option<Value>,
    pub eth_amount: Option<Value>,
    pub usdc_amount: Option<Value>,
    pub price: Option<Value>,
    pub protocol: Option<Value>,
    pub pool_address: Option<Value>,
    pub pool_fee: Option<Value>,
}

impl RawTrade {
    /// Transaction hash when present as a string, for log lines
    pub fn hash_hint(&self) -> &str {
        self.transaction_hash
            .as_ref()
            .and_then(Value::as_str)
            .unwrap_or("<no hash>")
    }
}

/// Largest accepted amount or price. Sums of these stay far below
/// `Decimal::MAX` for any realistic batch size.
pub fn max_amount() -> Decimal {
    Decimal::from(1_000_000_000_000_000_000u64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeDirection {
    #[serde(rename = "buy")]
    Buy,
    #[serde(rename = "sell")]
    Sell,
}

impl TradeDirection {
    /// Case-insensitive parse of the indexer's `tradeType`
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "buy" => Some(TradeDirection::Buy),
            "sell" => Some(TradeDirection::Sell),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TradeDirection::Buy => "buy",
            TradeDirection::Sell => "sell",
        }
    }
}

impl std::fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ETH/USDC swap attributed to a wallet, with exact decimal amounts.
///
/// `eth_amount` is the base asset and `usdc_amount` the quote asset; both are
/// non-negative. `price` is taken as reported and is not recomputed from the
/// amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalTransaction {
    /// Indexer swap id; unique even when one transaction carries several swaps
    pub id: String,
    pub transaction_hash: String,
    pub timestamp: DateTime<Utc>,
    pub block_number: u64,
    pub wallet_address: String,
    pub wallet_name: String,
    #[serde(rename = "type")]
    pub direction: TradeDirection,
    pub eth_amount: Decimal,
    pub usdc_amount: Decimal,
    pub price: Decimal,
    pub protocol: String,
    pub pool_address: String,
    pub pool_fee: String,
}

/// Reasons a raw record is rejected as malformed
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizeError {
    MissingField(&'static str),
    InvalidField { field: &'static str, value: String },
    InvalidNumber { field: &'static str, value: String },
    InvalidTimestamp(String),
    UnknownTradeType(String),
}

impl std::fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizeError::MissingField(field) => write!(f, "Missing field: {}", field),
            NormalizeError::InvalidField { field, value } => {
                write!(f, "Expected text for {}, got {}", field, value)
            }
            NormalizeError::InvalidNumber { field, value } => {
                write!(f, "Invalid number for {}: {}", field, value)
            }
            NormalizeError::InvalidTimestamp(value) => write!(f, "Invalid timestamp: {}", value),
            NormalizeError::UnknownTradeType(value) => write!(f, "Unknown trade type: {}", value),
        }
    }
}

impl std::error::Error for NormalizeError {}

impl CanonicalTransaction {
    /// Convert one indexed record. Timestamps are unix seconds in UTC.
    pub fn from_raw(raw: &RawTrade) -> Result<Self, NormalizeError> {
        let transaction_hash = required_text(&raw.transaction_hash, "transactionHash")?;
        let id = optional_text(&raw.id, "id")?.unwrap_or_else(|| transaction_hash.clone());

        let timestamp_text = required_number_text(&raw.timestamp, "timestamp")?;
        let timestamp = parse_unix_seconds(&timestamp_text)
            .ok_or(NormalizeError::InvalidTimestamp(timestamp_text))?;

        let block_text = required_number_text(&raw.block_number, "blockNumber")?;
        let block_number = block_text
            .parse::<u64>()
            .map_err(|_| NormalizeError::InvalidNumber {
                field: "blockNumber",
                value: block_text.clone(),
            })?;

        let wallet_address = required_text(&raw.wallet_address, "walletAddress")?.to_lowercase();

        let trade_type = required_text(&raw.trade_type, "tradeType")?;
        let direction = TradeDirection::parse(&trade_type)
            .ok_or(NormalizeError::UnknownTradeType(trade_type))?;

        let eth_amount = parse_amount(&raw.eth_amount, "ethAmount")?;
        let usdc_amount = parse_amount(&raw.usdc_amount, "usdcAmount")?;
        let price_text = required_number_text(&raw.price, "price")?;
        let price = match parse_decimal(&price_text) {
            Some(price) if price.abs() <= max_amount() => price,
            _ => {
                return Err(NormalizeError::InvalidNumber {
                    field: "price",
                    value: price_text,
                })
            }
        };

        let pool_address = required_text(&raw.pool_address, "poolAddress")?;
        let wallet_name = optional_text(&raw.wallet_name, "walletName")?;
        let protocol = optional_text(&raw.protocol, "protocol")?;

        Ok(Self {
            id,
            transaction_hash,
            timestamp,
            block_number,
            wallet_address,
            wallet_name: wallet_name.unwrap_or_else(|| UNKNOWN_WALLET_NAME.to_string()),
            direction,
            eth_amount,
            usdc_amount,
            price,
            protocol: protocol.unwrap_or_else(|| DEFAULT_PROTOCOL.to_string()),
            pool_address,
            pool_fee: raw
                .pool_fee
                .as_ref()
                .and_then(value_text)
                .unwrap_or_else(|| UNKNOWN_POOL_FEE.to_string()),
        })
    }

    pub fn is_buy(&self) -> bool {
        matches!(self.direction, TradeDirection::Buy)
    }

    pub fn is_sell(&self) -> bool {
        matches!(self.direction, TradeDirection::Sell)
    }
}

/// Convert a batch, dropping malformed records with a warning
pub fn normalize_batch(raw_trades: &[RawTrade]) -> Vec<CanonicalTransaction> {
    let mut transactions = Vec::with_capacity(raw_trades.len());
    let mut skipped = 0usize;

    for raw in raw_trades {
        match CanonicalTransaction::from_raw(raw) {
            Ok(tx) => transactions.push(tx),
            Err(e) => {
                skipped += 1;
                log::warn!(
                    "⚠️  Skipping malformed trade {}: {}",
                    raw.hash_hint(),
                    e
                );
            }
        }
    }

    if skipped > 0 {
        log::info!(
            "Normalized {} trades ({} malformed skipped)",
            transactions.len(),
            skipped
        );
    }

    transactions
}

fn required_text(field: &Option<Value>, name: &'static str) -> Result<String, NormalizeError> {
    optional_text(field, name)?.ok_or(NormalizeError::MissingField(name))
}

/// Absent, null and blank are all "not set"; any non-string value is malformed
fn optional_text(field: &Option<Value>, name: &'static str) -> Result<Option<String>, NormalizeError> {
    match field {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(other) => Err(NormalizeError::InvalidField {
            field: name,
            value: other.to_string(),
        }),
    }
}

fn required_number_text(field: &Option<Value>, name: &'static str) -> Result<String, NormalizeError> {
    field
        .as_ref()
        .and_then(value_text)
        .ok_or(NormalizeError::MissingField(name))
}

/// Text form of a JSON string or number; other JSON types have none
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

fn parse_amount(field: &Option<Value>, name: &'static str) -> Result<Decimal, NormalizeError> {
    let text = required_number_text(field, name)?;
    match parse_decimal(&text) {
        Some(amount) if amount >= Decimal::ZERO && amount <= max_amount() => Ok(amount),
        _ => Err(NormalizeError::InvalidNumber { field: name, value: text }),
    }
}

fn parse_unix_seconds(text: &str) -> Option<DateTime<Utc>> {
    let secs = match text.parse::<i64>() {
        Ok(secs) => secs,
        // "1700000000.0" style values are accepted when the fraction is zero
        Err(_) => {
            let value = parse_decimal(text)?;
            if !value.fract().is_zero() {
                return None;
            }
            value.to_i64()?
        }
    };
    DateTime::<Utc>::from_timestamp(secs, 0)
}
