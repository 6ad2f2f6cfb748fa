//! Wallet performance summary over a set of canonical transactions

use super::normalizer::{CanonicalTransaction, TradeDirection};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Aggregate metrics for one wallet over a caller-chosen window.
///
/// Average prices are the plain mean of reported unit prices per direction.
/// A direction with no trades reports an average of `0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub transaction_count: usize,
    pub buy_count: usize,
    pub sell_count: usize,
    pub total_buy_eth: Decimal,
    pub total_sell_eth: Decimal,
    pub total_buy_usdc: Decimal,
    pub total_sell_usdc: Decimal,
    pub net_eth_position: Decimal,
    pub net_usdc_position: Decimal,
    pub avg_buy_price: Decimal,
    pub avg_sell_price: Decimal,
}

impl PerformanceSummary {
    pub fn is_empty(&self) -> bool {
        self.transaction_count == 0
    }
}

#[derive(Default)]
struct DirectionTotals {
    count: usize,
    eth: Decimal,
    usdc: Decimal,
    price_sum: Decimal,
}

impl DirectionTotals {
    // Totals saturate at Decimal::MAX
    fn add(&mut self, tx: &CanonicalTransaction) {
        self.count += 1;
        self.eth = self.eth.saturating_add(tx.eth_amount);
        self.usdc = self.usdc.saturating_add(tx.usdc_amount);
        self.price_sum = self.price_sum.saturating_add(tx.price);
    }

    fn average_price(&self) -> Decimal {
        if self.count == 0 {
            return Decimal::ZERO;
        }
        self.price_sum
            .checked_div(Decimal::from(self.count))
            .unwrap_or(Decimal::ZERO)
    }
}

pub struct PerformanceSummarizer;

impl PerformanceSummarizer {
    pub fn new() -> Self {
        Self
    }

    /// Fold transactions into a summary.
    ///
    /// Filtering to a wallet and time window is the caller's job. Only sums
    /// and counts are accumulated, so the result does not depend on input
    /// order.
    pub fn summarize<'a, I>(&self, transactions: I) -> PerformanceSummary
    where
        I: IntoIterator<Item = &'a CanonicalTransaction>,
    {
        let mut buys = DirectionTotals::default();
        let mut sells = DirectionTotals::default();

        for tx in transactions {
            match tx.direction {
                TradeDirection::Buy => buys.add(tx),
                TradeDirection::Sell => sells.add(tx),
            }
        }

        PerformanceSummary {
            transaction_count: buys.count + sells.count,
            buy_count: buys.count,
            sell_count: sells.count,
            total_buy_eth: buys.eth,
            total_sell_eth: sells.eth,
            total_buy_usdc: buys.usdc,
            total_sell_usdc: sells.usdc,
            net_eth_position: buys.eth.saturating_sub(sells.eth),
            net_usdc_position: sells.usdc.saturating_sub(buys.usdc),
            avg_buy_price: buys.average_price(),
            avg_sell_price: sells.average_price(),
        }
    }
}

impl Default for PerformanceSummarizer {
    fn default() -> Self {
        Self::new()
    }
}
