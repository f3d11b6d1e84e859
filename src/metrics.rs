use actix_web::{get, HttpResponse};
use lazy_static::lazy_static;
use prometheus::{Encoder, Gauge, IntCounter, IntGauge, Opts};
use tracing::error;

lazy_static! {
    pub static ref SALE_FETCHES_TOTAL: IntCounter = try_create_int_counter(
        "nwis_sale_api_sale_fetches_total",
        "Number of sale info fetch attempts"
    )
    .unwrap();
    pub static ref SALE_FETCH_FALLBACKS_TOTAL: IntCounter = try_create_int_counter(
        "nwis_sale_api_sale_fetch_fallbacks_total",
        "Number of fetches answered with the fallback snapshot"
    )
    .unwrap();
    pub static ref SALE_PROGRESS_PERCENTAGE: Gauge = try_create_gauge(
        "nwis_sale_api_sale_progress_percentage",
        "Progress percentage of the latest successful snapshot"
    )
    .unwrap();
    pub static ref SALE_TOKENS_SOLD: Gauge = try_create_gauge(
        "nwis_sale_api_sale_tokens_sold",
        "Tokens sold according to the latest successful snapshot"
    )
    .unwrap();
    pub static ref SALE_FETCH_STATE: IntGauge = try_create_int_gauge(
        "nwis_sale_api_sale_fetch_state",
        "Fetch lifecycle state (0 idle, 1 loading, 2 ready, 3 degraded)"
    )
    .unwrap();
}

fn try_create_int_counter(name: &str, help: &str) -> prometheus::Result<IntCounter> {
    let opts = Opts::new(name, help);
    let counter = IntCounter::with_opts(opts)?;
    prometheus::register(Box::new(counter.clone()))?;
    Ok(counter)
}

fn try_create_int_gauge(name: &str, help: &str) -> prometheus::Result<IntGauge> {
    let opts = Opts::new(name, help);
    let gauge = IntGauge::with_opts(opts)?;
    prometheus::register(Box::new(gauge.clone()))?;
    Ok(gauge)
}

fn try_create_gauge(name: &str, help: &str) -> prometheus::Result<Gauge> {
    let opts = Opts::new(name, help);
    let gauge = Gauge::with_opts(opts)?;
    prometheus::register(Box::new(gauge.clone()))?;
    Ok(gauge)
}

#[get("/metrics")]
pub async fn get_metrics() -> HttpResponse {
    let mut buffer = Vec::<u8>::new();
    let encoder = prometheus::TextEncoder::new();
    if let Err(err) = encoder.encode(&prometheus::gather(), &mut buffer) {
        error!(target: crate::SALE_API, "Failed to encode metrics: {:?}", err);
        return HttpResponse::InternalServerError().finish();
    }
    match String::from_utf8(buffer) {
        Ok(body) => HttpResponse::Ok().body(body),
        Err(err) => {
            error!(target: crate::SALE_API, "Metrics are not valid UTF-8: {:?}", err);
            HttpResponse::InternalServerError().finish()
        }
    }
}
