//! Pure derivation of the UI-ready snapshot.
//!
//! Token amounts arrive as 18-decimal base-unit integers. All conversion
//! happens in [BigDecimal]; native floats would drift at high token counts.

use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode};

use crate::models::sale::{DisplaySnapshot, SaleSnapshot};
use crate::models::tiers::TierSchedule;

/// 10^18 base units per display token.
const BASE_UNIT_SCALE: &str = "1000000000000000000";

/// Display precision: two decimals for percentages and currency totals,
/// six for per-token prices and purchase bounds.
const AMOUNT_SCALE: i64 = 2;
const PRICE_SCALE: i64 = 6;

pub fn base_units_to_decimal(amount: u128) -> BigDecimal {
    let value = BigDecimal::from_str(&amount.to_string())
        .expect("u128 renders as a valid decimal literal");
    value / base_unit_scale()
}

/// Progress through the sale in percent, clamped to [0, 100].
/// Defined as 0 when nothing is for sale to avoid division by zero.
pub fn progress_percentage(total_tokens_sold: u128, total_tokens_for_sale: u128) -> BigDecimal {
    if total_tokens_for_sale == 0 {
        return BigDecimal::from(0);
    }
    let sold = BigDecimal::from_str(&total_tokens_sold.to_string())
        .expect("u128 renders as a valid decimal literal");
    let for_sale = BigDecimal::from_str(&total_tokens_for_sale.to_string())
        .expect("u128 renders as a valid decimal literal");
    let hundred = BigDecimal::from(100);
    let percentage = sold * &hundred / for_sale;
    if percentage > hundred {
        hundred
    } else {
        percentage
    }
}

/// Derives the display view of a snapshot. Pure and idempotent: equal
/// inputs always produce equal outputs.
pub fn derive_display_snapshot(
    snapshot: &SaleSnapshot,
    schedule: &TierSchedule,
) -> DisplaySnapshot {
    let sold_tokens = base_units_to_decimal(snapshot.total_tokens_sold);
    let for_sale_tokens = base_units_to_decimal(snapshot.total_tokens_for_sale);
    let price = base_units_to_decimal(snapshot.token_price);
    let amount_raised = &sold_tokens * &price;
    let progress =
        progress_percentage(snapshot.total_tokens_sold, snapshot.total_tokens_for_sale);
    let (current_tier, next_tier) = schedule.resolve(&sold_tokens);

    DisplaySnapshot {
        current_price: format_scaled(&price, PRICE_SCALE),
        amount_raised: format_scaled(&amount_raised, AMOUNT_SCALE),
        token_value: format_scaled(&current_tier.price, PRICE_SCALE),
        progress_percentage: format_scaled(&progress, AMOUNT_SCALE),
        total_tokens_for_sale: format_scaled(&for_sale_tokens, AMOUNT_SCALE),
        total_tokens_sold: format_scaled(&sold_tokens, AMOUNT_SCALE),
        min_purchase: format_scaled(&base_units_to_decimal(snapshot.min_purchase), PRICE_SCALE),
        max_purchase: format_scaled(&base_units_to_decimal(snapshot.max_purchase), PRICE_SCALE),
        sale_active: snapshot.sale_active,
        sale_start_time: snapshot.sale_start_time,
        sale_end_time: snapshot.sale_end_time,
        current_tier,
        next_tier,
    }
}

fn base_unit_scale() -> BigDecimal {
    BigDecimal::from_str(BASE_UNIT_SCALE).expect("base unit scale is a valid decimal literal")
}

fn format_scaled(value: &BigDecimal, scale: i64) -> String {
    value
        .with_scale_round(scale, RoundingMode::HalfUp)
        .to_string()
}
