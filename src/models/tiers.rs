use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::Serialize;

/// A pricing bracket of the sale. Amounts are decimal token counts,
/// the price is a decimal currency amount per token.
///
/// Bracket semantics are half-open: a tier covers
/// `[start_amount, end_amount)` of cumulative tokens sold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tier {
    pub index: u32,
    pub start_amount: BigDecimal,
    pub end_amount: BigDecimal,
    pub price: BigDecimal,
}

impl Tier {
    /// The all-zero tier served when no bracket matches.
    pub fn zero() -> Self {
        Self {
            index: 0,
            start_amount: BigDecimal::from(0),
            end_amount: BigDecimal::from(0),
            price: BigDecimal::from(0),
        }
    }
}

/// Ordered, gapless list of tiers.
#[derive(Debug, Clone)]
pub struct TierSchedule {
    tiers: Vec<Tier>,
}

impl TierSchedule {
    pub fn new(tiers: Vec<Tier>) -> anyhow::Result<Self> {
        for (position, tier) in tiers.iter().enumerate() {
            anyhow::ensure!(
                tier.index as usize == position,
                "tier at position {} carries index {}",
                position,
                tier.index
            );
            anyhow::ensure!(
                tier.start_amount <= tier.end_amount,
                "tier {} has start_amount > end_amount",
                tier.index
            );
            if let Some(previous) = position.checked_sub(1).and_then(|i| tiers.get(i)) {
                anyhow::ensure!(
                    previous.end_amount == tier.start_amount,
                    "tier {} does not start where tier {} ends",
                    tier.index,
                    previous.index
                );
            }
        }
        Ok(Self { tiers })
    }

    /// The NWIS presale schedule: four equal brackets of 250k tokens
    /// with the price stepping up at each boundary.
    pub fn nwis_default() -> Self {
        let brackets = [
            ("0", "250000", "0.007125"),
            ("250000", "500000", "0.0095"),
            ("500000", "750000", "0.011875"),
            ("750000", "1000000", "0.01425"),
        ];
        let tiers = brackets
            .iter()
            .enumerate()
            .map(|(index, (start, end, price))| Tier {
                index: index as u32,
                start_amount: parse_constant(start),
                end_amount: parse_constant(end),
                price: parse_constant(price),
            })
            .collect();
        Self::new(tiers).expect("built-in NWIS schedule expected to be well-formed")
    }

    /// Locates the bracket containing `sold_tokens` (a decimal token count)
    /// and returns it together with the following bracket. Falls back to the
    /// all-zero tier when no bracket matches, and for the tier after the
    /// last one.
    pub fn resolve(&self, sold_tokens: &BigDecimal) -> (Tier, Tier) {
        let current = self
            .tiers
            .iter()
            .find(|tier| *sold_tokens >= tier.start_amount && *sold_tokens < tier.end_amount);
        match current {
            Some(tier) => {
                let next = self
                    .tiers
                    .get(tier.index as usize + 1)
                    .cloned()
                    .unwrap_or_else(Tier::zero);
                (tier.clone(), next)
            }
            None => (Tier::zero(), Tier::zero()),
        }
    }
}

fn parse_constant(literal: &str) -> BigDecimal {
    BigDecimal::from_str(literal).expect("schedule literal expected to be a decimal")
}
