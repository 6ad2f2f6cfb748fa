//! Time windows used to select transactions before summarizing or matching
//!
//! All bucketing is done in UTC.

use super::normalizer::CanonicalTransaction;
use chrono::{DateTime, Duration, NaiveDate, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    /// Everything at or after `now - days`
    Trailing { days: u32, now: DateTime<Utc> },
    /// One UTC calendar day
    UtcDay(NaiveDate),
}

impl TimeWindow {
    pub fn trailing_days(days: u32, now: DateTime<Utc>) -> Self {
        TimeWindow::Trailing { days, now }
    }

    pub fn utc_day(date: NaiveDate) -> Self {
        TimeWindow::UtcDay(date)
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        match self {
            TimeWindow::Trailing { days, now } => now
                .checked_sub_signed(Duration::days(*days as i64))
                .map_or(true, |cutoff| timestamp >= cutoff),
            TimeWindow::UtcDay(date) => timestamp.date_naive() == *date,
        }
    }

    pub fn filter(&self, transactions: Vec<CanonicalTransaction>) -> Vec<CanonicalTransaction> {
        transactions
            .into_iter()
            .filter(|tx| self.contains(tx.timestamp))
            .collect()
    }
}

/// Keep only the wallet's own trades; addresses compare case-insensitively
pub fn for_wallet(transactions: Vec<CanonicalTransaction>, wallet_address: &str) -> Vec<CanonicalTransaction> {
    let wallet = wallet_address.to_lowercase();
    transactions
        .into_iter()
        .filter(|tx| tx.wallet_address == wallet)
        .collect()
}
