//! Integration tests for the copy-trade analytics service
//!
//! Drives `CopyTradeAnalytics` end to end with an in-memory trade source and a
//! recording export backend:
//! - Trailing-window performance summaries
//! - Copy-trade detection across two wallets
//! - Wallet-day export, including empty days and backend failures
//! - Source errors surfacing to the caller

#[cfg(test)]
mod copy_detection_tests {
    use async_trait::async_trait;
    use chrono::{DateTime, NaiveDate, Utc};
    use copyflow::analytics_core::{
        ExportBackend, ExportWriter, ExportWriterError, RawTrade, TradeDirection, WalletDayExport,
    };
    use copyflow::envio::{DailySummary, SourceError, TradeQuery, TradeSource, WalletActivity};
    use copyflow::{AnalyticsError, BackendType, CopyTradeAnalytics};
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::sync::Mutex;

    const REFERENCE: &str = "0x66a9893c904a664803c4fcbfa47e75f5d30e7dab";
    const SUSPECT: &str = "0xfbd4cdb40e862397a2f89a854e0e7e8f7e794c37";

    // 2023-11-15T00:00:00Z
    const NOW_TS: i64 = 1_700_006_400;

    struct InMemorySource {
        trades: Vec<RawTrade>,
        activity: Option<WalletActivity>,
        fail: bool,
        ignore_wallet_filter: bool,
        queries: Mutex<Vec<TradeQuery>>,
    }

    impl InMemorySource {
        fn new(trades: Vec<RawTrade>) -> Self {
            Self {
                trades,
                activity: None,
                fail: false,
                ignore_wallet_filter: false,
                queries: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new(Vec::new())
            }
        }
    }

    #[async_trait]
    impl TradeSource for InMemorySource {
        async fn fetch_trades(&self, query: &TradeQuery) -> Result<Vec<RawTrade>, SourceError> {
            self.queries.lock().unwrap().push(query.clone());
            if self.fail {
                return Err(SourceError::Status(503));
            }

            let mut trades: Vec<RawTrade> = self
                .trades
                .iter()
                .filter(|t| {
                    let wallet = t.wallet_address.as_ref().and_then(|v| v.as_str());
                    match (&query.wallet_address, wallet) {
                        _ if self.ignore_wallet_filter => true,
                        (Some(wanted), Some(wallet)) => wallet.to_lowercase() == *wanted,
                        (None, _) => true,
                        _ => false,
                    }
                })
                .cloned()
                .collect();
            trades.truncate(query.limit);
            Ok(trades)
        }

        async fn fetch_wallet_activity(
            &self,
            _wallet_address: &str,
            _date: NaiveDate,
        ) -> Result<Option<WalletActivity>, SourceError> {
            Ok(self.activity.clone())
        }

        async fn fetch_daily_summary(&self, _date: NaiveDate) -> Result<Option<DailySummary>, SourceError> {
            Ok(None)
        }
    }

    #[derive(Default)]
    struct RecordingBackend {
        persisted: Vec<WalletDayExport>,
        fail: bool,
    }

    impl ExportBackend for RecordingBackend {
        fn persist(&mut self, export: &WalletDayExport) -> Result<(), ExportWriterError> {
            if self.fail {
                return Err(ExportWriterError::Database("disk full".to_string()));
            }
            self.persisted.push(export.clone());
            Ok(())
        }

        fn backend_type(&self) -> &'static str {
            "Recording"
        }
    }

    fn create_test_trade(hash: &str, wallet: &str, ts: i64, trade_type: &str, eth: &str, price: &str) -> RawTrade {
        let name = if wallet == REFERENCE { "Smart Money" } else { "Follower" };
        serde_json::from_value(json!({
            "id": format!("{}-0", hash),
            "transactionHash": hash,
            "timestamp": ts.to_string(),
            "blockNumber": "18573000",
            "walletAddress": wallet,
            "walletName": name,
            "tradeType": trade_type,
            "ethAmount": eth,
            "usdcAmount": "2000",
            "price": price,
            "protocol": "uniswap_v3",
            "poolAddress": "0x88e6a0c2ddd26feeb64f039a2c41296fcb3f5640",
            "poolFee": "500"
        }))
        .unwrap()
    }

    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(NOW_TS, 0).unwrap()
    }

    fn create_test_trades() -> Vec<RawTrade> {
        let day = 86_400;
        vec![
            // Reference wallet: two recent trades, one long before the window
            create_test_trade("0xr1", REFERENCE, NOW_TS - day, "buy", "2.0", "2000"),
            create_test_trade("0xr2", REFERENCE, NOW_TS - day + 3_600, "sell", "1.0", "2100"),
            create_test_trade("0xr_old", REFERENCE, NOW_TS - 30 * day, "buy", "5.0", "1800"),
            // Suspect wallet: one copy of each recent reference trade, plus noise
            create_test_trade("0xs1", SUSPECT, NOW_TS - day + 120, "buy", "1.5", "2001"),
            create_test_trade("0xs2", SUSPECT, NOW_TS - day + 3_600 + 300, "sell", "1.0", "2099"),
            create_test_trade("0xs3", SUSPECT, NOW_TS - day + 60, "sell", "2.0", "2000"),
            create_test_trade("0xs_old", SUSPECT, NOW_TS - 30 * day + 10, "buy", "5.0", "1800"),
            create_test_trade("0xs_bad", SUSPECT, NOW_TS - day + 90, "swap", "1.0", "2000"),
        ]
    }

    fn create_test_service() -> CopyTradeAnalytics<InMemorySource, RecordingBackend> {
        CopyTradeAnalytics::new(InMemorySource::new(create_test_trades()), RecordingBackend::default())
    }

    #[tokio::test]
    async fn test_performance_uses_trailing_window() {
        let service = create_test_service();

        let summary = service
            .analyze_wallet_performance_at(REFERENCE, 7, now())
            .await
            .unwrap();

        assert_eq!(summary.transaction_count, 2);
        assert_eq!(summary.buy_count, 1);
        assert_eq!(summary.sell_count, 1);
        assert_eq!(summary.total_buy_eth, dec!(2.0));
        assert_eq!(summary.total_sell_eth, dec!(1.0));
        assert_eq!(summary.net_eth_position, dec!(1.0));
        assert_eq!(summary.avg_buy_price, dec!(2000));
        assert_eq!(summary.avg_sell_price, dec!(2100));

        // Row limit scales with the requested day count
        let queries = service.source().queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].limit, 700);
        assert_eq!(queries[0].wallet_address.as_deref(), Some(REFERENCE));
    }

    #[tokio::test]
    async fn test_performance_for_unknown_wallet_is_empty() {
        let service = create_test_service();

        let summary = service
            .analyze_wallet_performance_at("0x0000000000000000000000000000000000000000", 7, now())
            .await
            .unwrap();

        assert!(summary.is_empty());
        assert_eq!(summary.avg_buy_price, dec!(0));
    }

    #[tokio::test]
    async fn test_detect_copy_trading_patterns() {
        let service = create_test_service();

        let matches = service
            .detect_copy_trading_patterns_at(REFERENCE, SUSPECT, 7, 300, now())
            .await
            .unwrap();

        let pairs: Vec<_> = matches
            .iter()
            .map(|m| (m.reference_tx.as_str(), m.suspect_tx.as_str(), m.time_diff_seconds))
            .collect();
        assert_eq!(pairs, vec![("0xr1", "0xs1", 120), ("0xr2", "0xs2", 300)]);

        assert_eq!(matches[0].trade_type, TradeDirection::Buy);
        assert!((matches[0].similarity_score - 0.75).abs() < 1e-12);
        assert_eq!(matches[0].reference_eth, dec!(2.0));
        assert_eq!(matches[0].suspect_eth, dec!(1.5));
        assert_eq!(matches[1].similarity_score, 1.0);
    }

    #[tokio::test]
    async fn test_detect_respects_threshold_and_window() {
        let service = create_test_service();

        // 0xs2 trails by exactly 300s and drops out at 299
        let matches = service
            .detect_copy_trading_patterns_at(REFERENCE, SUSPECT, 7, 299, now())
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].suspect_tx, "0xs1");

        // A 60-day window brings the old pair back in
        let matches = service
            .detect_copy_trading_patterns_at(REFERENCE, SUSPECT, 60, 300, now())
            .await
            .unwrap();
        assert_eq!(matches.len(), 3);
        assert_eq!(matches[2].reference_tx, "0xr_old");
        assert_eq!(matches[2].suspect_tx, "0xs_old");
    }

    #[tokio::test]
    async fn test_export_wallet_day() {
        let mut service = create_test_service();
        let date = NaiveDate::from_ymd_opt(2023, 11, 14).unwrap();

        let export = service.export_wallet_day(REFERENCE, date).await.unwrap();

        assert_eq!(export.wallet_name, "Smart Money");
        assert_eq!(export.wallet_address, REFERENCE);
        assert_eq!(export.date, date);
        assert_eq!(export.transactions.len(), 2);
        assert_eq!(export.summary.transaction_count, 2);

        let persisted = &service.backend().persisted;
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0], export);
    }

    #[tokio::test]
    async fn test_export_empty_day_uses_unknown_name() {
        let mut service = create_test_service();
        let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();

        let export = service.export_wallet_day(REFERENCE, date).await.unwrap();

        assert_eq!(export.wallet_name, "Unknown");
        assert!(export.transactions.is_empty());
        assert!(export.summary.is_empty());
        assert_eq!(service.backend().persisted.len(), 1);
    }

    #[tokio::test]
    async fn test_export_failure_is_returned() {
        let backend = RecordingBackend {
            fail: true,
            ..Default::default()
        };
        let mut service = CopyTradeAnalytics::new(InMemorySource::new(create_test_trades()), backend);
        let date = NaiveDate::from_ymd_opt(2023, 11, 14).unwrap();

        let result = service.export_wallet_day(REFERENCE, date).await;

        assert!(matches!(
            result,
            Err(AnalyticsError::Export(ExportWriterError::Database(_)))
        ));
        assert!(service.backend().persisted.is_empty());
    }

    #[tokio::test]
    async fn test_export_to_json_backend() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ExportWriter::new(BackendType::Json, dir.path().to_path_buf(), false).unwrap();
        let mut service = CopyTradeAnalytics::new(InMemorySource::new(create_test_trades()), writer);
        let date = NaiveDate::from_ymd_opt(2023, 11, 14).unwrap();

        service.export_wallet_day(SUSPECT, date).await.unwrap();

        let path = dir
            .path()
            .join("2023-11-14")
            .join(format!("{}.json", SUSPECT));
        let written: WalletDayExport =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        // 0xs_bad is rejected during normalization
        assert_eq!(written.wallet_name, "Follower");
        assert_eq!(written.transactions.len(), 3);
        assert_eq!(written.summary.buy_count, 1);
        assert_eq!(written.summary.sell_count, 2);
    }

    #[tokio::test]
    async fn test_source_errors_propagate() {
        let service = CopyTradeAnalytics::new(InMemorySource::failing(), RecordingBackend::default());

        let result = service.analyze_wallet_performance_at(REFERENCE, 7, now()).await;
        assert!(matches!(result, Err(AnalyticsError::Source(SourceError::Status(503)))));

        let result = service
            .detect_copy_trading_patterns_at(REFERENCE, SUSPECT, 7, 300, now())
            .await;
        assert!(matches!(result, Err(AnalyticsError::Source(_))));
    }

    #[tokio::test]
    async fn test_indexer_aggregates_pass_through() {
        let mut source = InMemorySource::new(Vec::new());
        source.activity = Some(
            serde_json::from_value(json!({
                "id": format!("{}-2023-11-14", REFERENCE),
                "walletAddress": REFERENCE,
                "walletName": "Smart Money",
                "date": "2023-11-14",
                "transactionCount": "2",
                "buyCount": 1,
                "sellCount": 1,
                "totalBuyEth": "2.0",
                "totalSellEth": "1.0",
                "totalBuyUsdc": "4000",
                "totalSellUsdc": "2100",
                "netEthPosition": "1.0",
                "netUsdcPosition": "-1900",
                "avgBuyPrice": "2000",
                "avgSellPrice": "2100"
            }))
            .unwrap(),
        );
        let service = CopyTradeAnalytics::new(source, RecordingBackend::default());
        let date = NaiveDate::from_ymd_opt(2023, 11, 14).unwrap();

        let activity = service.wallet_activity(REFERENCE, date).await.unwrap().unwrap();
        assert_eq!(activity.transaction_count, 2);
        assert_eq!(activity.net_usdc_position, dec!(-1900));

        assert!(service.daily_summary(date).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_foreign_wallet_rows_are_dropped() {
        let mut source = InMemorySource::new(create_test_trades());
        source.ignore_wallet_filter = true;
        let service = CopyTradeAnalytics::new(source, RecordingBackend::default());

        let txs = service.fetch_transactions(REFERENCE, 100).await.unwrap();
        assert_eq!(txs.len(), 3);
        assert!(txs.iter().all(|t| t.wallet_address == REFERENCE));

        // Same pairs as with a source that honours the wallet filter
        let matches = service
            .detect_copy_trading_patterns_at(REFERENCE, SUSPECT, 7, 300, now())
            .await
            .unwrap();
        assert_eq!(matches.len(), 2);
    }

    #[tokio::test]
    async fn test_wrongly_typed_record_does_not_block_analysis() {
        let mut trades = create_test_trades();
        let mut odd: serde_json::Value = serde_json::to_value(&trades[0]).unwrap();
        odd["transactionHash"] = json!("0xr_odd");
        odd["walletName"] = json!(42);
        trades.push(serde_json::from_value(odd).unwrap());

        let service = CopyTradeAnalytics::new(InMemorySource::new(trades), RecordingBackend::default());
        let summary = service
            .analyze_wallet_performance_at(REFERENCE, 7, now())
            .await
            .unwrap();
        assert_eq!(summary.transaction_count, 2);
    }
}
