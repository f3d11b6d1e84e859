use serde::Serialize;

use crate::models::tiers::Tier;

/// Point-in-time state of the token sale as read from the contract.
/// All amounts are base units (wei); no precision is lost on the way in.
/// A snapshot is built fresh on every aggregator invocation and is never
/// cached or persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleSnapshot {
    pub sale_active: bool,
    pub token_price: u128,
    pub total_tokens_for_sale: u128,
    pub total_tokens_sold: u128,
    pub min_purchase: u128,
    pub max_purchase: u128,
    pub sale_start_time: u64,
    pub sale_end_time: u64,
}

impl SaleSnapshot {
    /// Validates the cross-field invariants the contract is supposed to
    /// maintain. A violation means the response is malformed and the caller
    /// should treat it the same way as an unreachable node.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sale_active: bool,
        token_price: u128,
        total_tokens_for_sale: u128,
        total_tokens_sold: u128,
        min_purchase: u128,
        max_purchase: u128,
        sale_start_time: u64,
        sale_end_time: u64,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(
            total_tokens_sold <= total_tokens_for_sale,
            "`totalTokensSold` ({}) exceeds `totalTokensForSale` ({})",
            total_tokens_sold,
            total_tokens_for_sale
        );
        anyhow::ensure!(
            min_purchase <= max_purchase,
            "`minPurchase` ({}) exceeds `maxPurchase` ({})",
            min_purchase,
            max_purchase
        );
        if sale_start_time != 0 && sale_end_time != 0 {
            anyhow::ensure!(
                sale_start_time <= sale_end_time,
                "`saleStartTime` ({}) is after `saleEndTime` ({})",
                sale_start_time,
                sale_end_time
            );
        }
        Ok(Self {
            sale_active,
            token_price,
            total_tokens_for_sale,
            total_tokens_sold,
            min_purchase,
            max_purchase,
            sale_start_time,
            sale_end_time,
        })
    }

    /// The Fallback Snapshot: a fixed placeholder served when the live data
    /// source is unavailable. The sale is reported inactive with all amounts
    /// zeroed so the UI renders a quiet zero-state instead of an error.
    pub fn fallback() -> Self {
        Self {
            sale_active: false,
            token_price: 0,
            total_tokens_for_sale: 0,
            total_tokens_sold: 0,
            min_purchase: 0,
            max_purchase: 0,
            sale_start_time: 0,
            sale_end_time: 0,
        }
    }

    /// Whether the sale window contains `now_unix`. A zero bound is treated
    /// as unbounded on that side.
    pub fn is_window_open(&self, now_unix: u64) -> bool {
        let after_start = self.sale_start_time == 0 || now_unix >= self.sale_start_time;
        let before_end = self.sale_end_time == 0 || now_unix <= self.sale_end_time;
        after_start && before_end
    }
}

/// Derived, UI-ready view of a [SaleSnapshot]. Amount fields are decimal
/// strings (tokens/currency, not base units); recomputed on every fetch and
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySnapshot {
    pub current_price: String,
    pub amount_raised: String,
    pub token_value: String,
    pub progress_percentage: String,
    pub total_tokens_for_sale: String,
    pub total_tokens_sold: String,
    pub min_purchase: String,
    pub max_purchase: String,
    pub sale_active: bool,
    pub sale_start_time: u64,
    pub sale_end_time: u64,
    pub current_tier: Tier,
    pub next_tier: Tier,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_consistent_snapshot() {
        let snapshot = SaleSnapshot::new(
            true,
            7_125_000_000_000_000,
            1_000_000 * 10u128.pow(18),
            250_000 * 10u128.pow(18),
            10u128.pow(16),
            10 * 10u128.pow(18),
            1_700_000_000,
            1_731_536_000,
        )
        .unwrap();
        assert!(snapshot.sale_active);
    }

    #[test]
    fn rejects_sold_exceeding_for_sale() {
        let result = SaleSnapshot::new(true, 1, 100, 101, 0, 0, 0, 0);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_min_purchase_above_max() {
        let result = SaleSnapshot::new(true, 1, 100, 0, 10, 5, 0, 0);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_inverted_sale_window() {
        let result = SaleSnapshot::new(true, 1, 100, 0, 0, 0, 2_000, 1_000);
        assert!(result.is_err());
    }

    #[test]
    fn zero_window_bounds_are_unbounded() {
        let snapshot = SaleSnapshot::new(true, 1, 100, 0, 0, 0, 0, 0).unwrap();
        assert!(snapshot.is_window_open(0));
        assert!(snapshot.is_window_open(u64::MAX));
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let snapshot = SaleSnapshot::new(true, 1, 100, 0, 0, 0, 1_000, 2_000).unwrap();
        assert!(!snapshot.is_window_open(999));
        assert!(snapshot.is_window_open(1_000));
        assert!(snapshot.is_window_open(2_000));
        assert!(!snapshot.is_window_open(2_001));
    }

    #[test]
    fn fallback_reports_an_inactive_zero_state() {
        let fallback = SaleSnapshot::fallback();
        assert!(!fallback.sale_active);
        assert_eq!(fallback.token_price, 0);
        assert_eq!(fallback.total_tokens_for_sale, 0);
        assert_eq!(fallback.total_tokens_sold, 0);
    }
}
