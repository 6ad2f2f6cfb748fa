//! Copy-trade pattern matching between a reference wallet and a suspect wallet

use super::normalizer::{CanonicalTransaction, TradeDirection};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TIME_THRESHOLD_SECS: u64 = 300;

/// A suspect trade that followed a reference trade in the same direction
/// within the time threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub reference_tx: String,
    pub suspect_tx: String,
    pub time_diff_seconds: u64,
    pub trade_type: TradeDirection,
    /// Size closeness in `[0.0, 1.0]`
    pub similarity_score: f64,
    pub reference_eth: Decimal,
    pub suspect_eth: Decimal,
}

pub struct PatternMatcher {
    time_threshold_secs: u64,
}

impl PatternMatcher {
    pub fn new(time_threshold_secs: u64) -> Self {
        Self {
            time_threshold_secs,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_TIME_THRESHOLD_SECS)
    }

    pub fn time_threshold_secs(&self) -> u64 {
        self.time_threshold_secs
    }

    /// Compare every reference trade against every suspect trade.
    ///
    /// A pair matches when both trades have the same direction and their
    /// timestamps are at most the threshold apart (inclusive). Matches are
    /// emitted in reference order, then suspect order.
    pub fn find_matches(
        &self,
        reference: &[CanonicalTransaction],
        suspect: &[CanonicalTransaction],
    ) -> Vec<PatternMatch> {
        let mut matches = Vec::new();

        for ref_tx in reference {
            for sus_tx in suspect {
                let time_diff = time_diff_secs(ref_tx, sus_tx);

                if time_diff <= self.time_threshold_secs && ref_tx.direction == sus_tx.direction {
                    matches.push(build_match(ref_tx, sus_tx, time_diff));
                }
            }
        }

        matches
    }

    /// Same result as [`find_matches`](Self::find_matches), computed with a
    /// sliding window over timestamp-sorted copies of both inputs.
    ///
    /// Candidate pairs are collected by index and re-sorted, so the output
    /// order is identical to the cross-product version.
    pub fn find_matches_windowed(
        &self,
        reference: &[CanonicalTransaction],
        suspect: &[CanonicalTransaction],
    ) -> Vec<PatternMatch> {
        if reference.is_empty() || suspect.is_empty() {
            return Vec::new();
        }

        let mut reference_order: Vec<usize> = (0..reference.len()).collect();
        reference_order.sort_by_key(|&i| reference[i].timestamp);

        let mut suspect_order: Vec<usize> = (0..suspect.len()).collect();
        suspect_order.sort_by_key(|&i| suspect[i].timestamp);

        let threshold = self.time_threshold_secs as i128;
        let mut window_start_idx = 0;
        let mut pairs: Vec<(usize, usize)> = Vec::new();

        for &ri in &reference_order {
            let ref_tx = &reference[ri];
            let ref_ts = ref_tx.timestamp.timestamp() as i128;
            let earliest = ref_ts - threshold;
            let latest = ref_ts + threshold;

            // Reference timestamps only grow, so the lower edge never moves back
            while window_start_idx < suspect_order.len()
                && (suspect[suspect_order[window_start_idx]].timestamp.timestamp() as i128) < earliest
            {
                window_start_idx += 1;
            }

            for &si in &suspect_order[window_start_idx..] {
                let sus_tx = &suspect[si];
                if sus_tx.timestamp.timestamp() as i128 > latest {
                    break;
                }
                if ref_tx.direction == sus_tx.direction {
                    pairs.push((ri, si));
                }
            }
        }

        pairs.sort_unstable();

        pairs
            .into_iter()
            .map(|(ri, si)| {
                let (ref_tx, sus_tx) = (&reference[ri], &suspect[si]);
                build_match(ref_tx, sus_tx, time_diff_secs(ref_tx, sus_tx))
            })
            .collect()
    }
}

/// `1 - min(|suspect - reference| / reference, 1)`.
///
/// A zero reference amount has no relative difference and scores `0`.
pub fn similarity_score(reference_eth: Decimal, suspect_eth: Decimal) -> f64 {
    if reference_eth <= Decimal::ZERO {
        return 0.0;
    }

    let relative_difference = suspect_eth
        .checked_sub(reference_eth)
        .and_then(|diff| diff.abs().checked_div(reference_eth))
        .unwrap_or(Decimal::ONE);

    (Decimal::ONE - relative_difference.min(Decimal::ONE))
        .normalize()
        .to_f64()
        .unwrap_or(0.0)
}

fn time_diff_secs(a: &CanonicalTransaction, b: &CanonicalTransaction) -> u64 {
    a.timestamp.timestamp().abs_diff(b.timestamp.timestamp())
}

fn build_match(
    ref_tx: &CanonicalTransaction,
    sus_tx: &CanonicalTransaction,
    time_diff_seconds: u64,
) -> PatternMatch {
    PatternMatch {
        reference_tx: ref_tx.transaction_hash.clone(),
        suspect_tx: sus_tx.transaction_hash.clone(),
        time_diff_seconds,
        trade_type: ref_tx.direction,
        similarity_score: similarity_score(ref_tx.eth_amount, sus_tx.eth_amount),
        reference_eth: ref_tx.eth_amount,
        suspect_eth: sus_tx.eth_amount,
    }
}
