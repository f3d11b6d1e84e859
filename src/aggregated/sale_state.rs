use anyhow::Context;

use crate::models::sale::SaleSnapshot;
use crate::rpc::{SaleInfo, SaleInfoProvider};

/// Performs the view-only sale info query and validates the response.
///
/// Failures are returned to the caller instead of being swallowed here;
/// whether to mask them behind the fallback snapshot is the HTTP layer's
/// decision, and it makes that decision explicitly and logs it.
pub async fn fetch_sale_snapshot(
    provider: &dyn SaleInfoProvider,
) -> anyhow::Result<SaleSnapshot> {
    let info = provider
        .get_sale_info()
        .await
        .context("Failed to query sale info from the presale contract")?;
    snapshot_from_info(&info)
}

fn snapshot_from_info(info: &SaleInfo) -> anyhow::Result<SaleSnapshot> {
    SaleSnapshot::new(
        info.sale_active,
        info.token_price,
        info.total_tokens_for_sale,
        info.total_tokens_sold,
        info.min_purchase,
        info.max_purchase,
        info.sale_start_time,
        info.sale_end_time,
    )
    .context("Sale info response violates the sale invariants")
}

/// Lifecycle of the sale data fetch, as observed by callers of the API.
///
/// `Degraded` is entered whenever a fetch fails and the fallback snapshot is
/// served instead; it is not terminal, a later fetch moves back through
/// `Loading` to `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Loading,
    Ready,
    Degraded,
}

impl FetchState {
    pub fn begin(&mut self) {
        *self = FetchState::Loading;
    }

    pub fn complete(&mut self) {
        *self = FetchState::Ready;
    }

    pub fn degrade(&mut self) {
        *self = FetchState::Degraded;
    }

    /// Numeric code for the metrics gauge.
    pub fn code(self) -> i64 {
        match self {
            FetchState::Idle => 0,
            FetchState::Loading => 1,
            FetchState::Ready => 2,
            FetchState::Degraded => 3,
        }
    }
}
