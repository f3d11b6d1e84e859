pub mod aggregated;
pub mod configs;
pub mod metrics;
pub mod models;
pub mod routes;
pub mod rpc;

// Categories for logging
pub const SALE_API: &str = "sale_api";
pub const SALE_AGGREGATOR: &str = "sale_aggregator";
