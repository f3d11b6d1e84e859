pub mod sale;
pub mod tiers;
