//! Envio HyperIndex GraphQL client
//!
//! Queries the Hasura endpoint that fronts the indexer. Three queries are used:
//!
//! - `trades` filtered by wallet, newest first
//! - `walletActivity` by id `{wallet}-{YYYY-MM-DD}`
//! - `dailySummary` by id `{YYYY-MM-DD}-ethereum-mainnet`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use copyflow::envio::{EnvioClient, TradeQuery, TradeSource};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = EnvioClient::new("http://localhost:8080/v1/graphql", 30)?;
//! let trades = client.fetch_trades(&TradeQuery::for_wallet("0xabc", 100)).await?;
//! println!("{} trades", trades.len());
//! # Ok(())
//! # }
//! ```

use super::source::{SourceError, TradeQuery, TradeSource};
use super::types::{
    DailySummary, DailySummaryData, GraphQlRequest, GraphQlResponse, TradesData, WalletActivity,
    WalletActivityData,
};
use crate::analytics_core::normalizer::RawTrade;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;

const TRADES_QUERY: &str = r#"
query GetTrades($walletAddress: String, $limit: Int!) {
  trades(
    where: { walletAddress: { _eq: $walletAddress } }
    limit: $limit
    orderBy: { timestamp: desc }
  ) {
    id
    transactionHash
    timestamp
    blockNumber
    walletAddress
    walletName
    tradeType
    ethAmount
    usdcAmount
    price
    protocol
    poolAddress
    poolFee
  }
}
"#;

const WALLET_ACTIVITY_QUERY: &str = r#"
query GetWalletActivity($id: ID!) {
  walletActivity(id: $id) {
    id
    walletAddress
    walletName
    date
    transactionCount
    buyCount
    sellCount
    totalBuyEth
    totalSellEth
    totalBuyUsdc
    totalSellUsdc
    netEthPosition
    netUsdcPosition
    avgBuyPrice
    avgSellPrice
  }
}
"#;

const DAILY_SUMMARY_QUERY: &str = r#"
query GetDailySummary($id: ID!) {
  dailySummary(id: $id) {
    id
    date
    totalTransactions
    totalVolumeEth
    totalVolumeUsdc
    uniqueWallets
    buyCount
    sellCount
    avgBuyPrice
    avgSellPrice
    minPrice
    maxPrice
  }
}
"#;

pub fn wallet_activity_id(wallet_address: &str, date: NaiveDate) -> String {
    format!("{}-{}", wallet_address.to_lowercase(), date.format("%Y-%m-%d"))
}

pub fn daily_summary_id(date: NaiveDate) -> String {
    format!("{}-ethereum-mainnet", date.format("%Y-%m-%d"))
}

pub struct EnvioClient {
    endpoint: String,
    http: reqwest::Client,
}

impl EnvioClient {
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        log::info!("🔌 Initialized Envio data fetcher: {}", endpoint);

        Ok(Self {
            endpoint: endpoint.to_string(),
            http,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T, SourceError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status().as_u16()));
        }

        let body: GraphQlResponse<T> = response
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;

        unwrap_response(body)
    }
}

/// Decode each trade record on its own; a record that is not an object is
/// dropped with a warning and the rest of the page is kept
fn decode_trade_records(records: Vec<Value>) -> Vec<RawTrade> {
    records
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<RawTrade>(record) {
            Ok(trade) => Some(trade),
            Err(e) => {
                log::warn!("⚠️  Skipping undecodable trade record: {}", e);
                None
            }
        })
        .collect()
}

/// Surface GraphQL-level errors and require a `data` payload
fn unwrap_response<T>(body: GraphQlResponse<T>) -> Result<T, SourceError> {
    if let Some(errors) = body.errors.filter(|e| !e.is_empty()) {
        return Err(SourceError::GraphQl(Value::Array(errors).to_string()));
    }

    body.data
        .ok_or_else(|| SourceError::Decode("response has no data".to_string()))
}

#[async_trait]
impl TradeSource for EnvioClient {
    async fn fetch_trades(&self, query: &TradeQuery) -> Result<Vec<RawTrade>, SourceError> {
        let variables = json!({
            "walletAddress": query.wallet_address.as_ref().map(|w| w.to_lowercase()),
            "limit": query.limit,
        });

        let data: TradesData = self.post(TRADES_QUERY, variables).await?;
        let trades = decode_trade_records(data.trades);
        log::info!("📥 Fetched {} trades from Envio", trades.len());
        Ok(trades)
    }

    async fn fetch_wallet_activity(
        &self,
        wallet_address: &str,
        date: NaiveDate,
    ) -> Result<Option<WalletActivity>, SourceError> {
        let variables = json!({ "id": wallet_activity_id(wallet_address, date) });
        let data: WalletActivityData = self.post(WALLET_ACTIVITY_QUERY, variables).await?;
        Ok(data.wallet_activity)
    }

    async fn fetch_daily_summary(&self, date: NaiveDate) -> Result<Option<DailySummary>, SourceError> {
        let variables = json!({ "id": daily_summary_id(date) });
        let data: DailySummaryData = self.post(DAILY_SUMMARY_QUERY, variables).await?;
        Ok(data.daily_summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entity_ids() {
        let date = NaiveDate::from_ymd_opt(2023, 11, 4).unwrap();
        assert_eq!(wallet_activity_id("0xABCdef", date), "0xabcdef-2023-11-04");
        assert_eq!(daily_summary_id(date), "2023-11-04-ethereum-mainnet");
    }

    #[test]
    fn test_graphql_errors_become_source_error() {
        let body: GraphQlResponse<TradesData> = serde_json::from_value(json!({
            "data": { "trades": [] },
            "errors": [{ "message": "permission denied" }]
        }))
        .unwrap();

        match unwrap_response(body) {
            Err(SourceError::GraphQl(msg)) => assert!(msg.contains("permission denied")),
            other => panic!("expected GraphQl error, got {:?}", other.map(|d| d.trades.len())),
        }
    }

    #[test]
    fn test_trades_payload_decodes() {
        let body: GraphQlResponse<TradesData> = serde_json::from_value(json!({
            "data": {
                "trades": [{
                    "id": "0xabc-1",
                    "transactionHash": "0xabc",
                    "timestamp": "1700000000",
                    "blockNumber": "18573000",
                    "walletAddress": "0xwallet",
                    "walletName": null,
                    "tradeType": "buy",
                    "ethAmount": "1.0",
                    "usdcAmount": "2000",
                    "price": "2000",
                    "protocol": null,
                    "poolAddress": "0xpool",
                    "poolFee": null
                }]
            }
        }))
        .unwrap();

        let trades = decode_trade_records(unwrap_response(body).unwrap().trades);
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].hash_hint(), "0xabc");
        assert!(trades[0].wallet_name.is_none());
    }

    #[test]
    fn test_one_bad_record_keeps_the_page() {
        let good = json!({
            "id": "0xabc-1",
            "transactionHash": "0xabc",
            "timestamp": "1700000000",
            "blockNumber": "18573000",
            "walletAddress": "0xwallet",
            "walletName": "Whale",
            "tradeType": "buy",
            "ethAmount": "1.0",
            "usdcAmount": "2000",
            "price": "2000",
            "poolAddress": "0xpool"
        });
        let mut numeric_name = good.clone();
        numeric_name["transactionHash"] = json!("0xdef");
        numeric_name["walletName"] = json!(42);

        let body: GraphQlResponse<TradesData> = serde_json::from_value(json!({
            "data": { "trades": [good, numeric_name, "not-a-record", null] }
        }))
        .unwrap();

        let trades = decode_trade_records(unwrap_response(body).unwrap().trades);
        assert_eq!(trades.len(), 2);

        let normalized = crate::analytics_core::normalize_batch(&trades);
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].transaction_hash, "0xabc");
    }

    #[test]
    fn test_missing_data_is_decode_error() {
        let body: GraphQlResponse<TradesData> =
            serde_json::from_value(json!({ "data": null })).unwrap();
        assert!(matches!(unwrap_response(body), Err(SourceError::Decode(_))));
    }

    #[test]
    fn test_client_builds_with_timeout() {
        assert!(EnvioClient::new("http://localhost:8080/v1/graphql", 5).is_ok());
    }
}
