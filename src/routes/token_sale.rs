use actix_web::{get, web, HttpResponse};
use bigdecimal::ToPrimitive;
use chrono::Utc;
use tracing::{debug, warn};

use crate::aggregated::display::{
    base_units_to_decimal, derive_display_snapshot, progress_percentage,
};
use crate::aggregated::sale_state::fetch_sale_snapshot;
use crate::metrics;
use crate::models::sale::SaleSnapshot;
use crate::routes::AppContext;
use crate::{SALE_AGGREGATOR, SALE_API};

/// One consistent snapshot of the sale, derived fresh per request.
///
/// Upstream failures are masked: the fallback snapshot goes out with a 200
/// so the front-end always has something to render. The failure itself is
/// logged and counted, never silent.
#[get("/api/token-sale")]
pub async fn token_sale(context: web::Data<AppContext>) -> HttpResponse {
    context.fetch_state.lock().await.begin();
    metrics::SALE_FETCHES_TOTAL.inc();

    let snapshot = match fetch_sale_snapshot(context.provider.as_ref()).await {
        Ok(snapshot) => {
            let mut state = context.fetch_state.lock().await;
            state.complete();
            metrics::SALE_FETCH_STATE.set(state.code());
            record_snapshot_metrics(&snapshot);
            snapshot
        }
        Err(err) => {
            warn!(
                target: SALE_AGGREGATOR,
                "Sale info fetch failed, serving the fallback snapshot: {:#}", err
            );
            metrics::SALE_FETCH_FALLBACKS_TOTAL.inc();
            let mut state = context.fetch_state.lock().await;
            state.degrade();
            metrics::SALE_FETCH_STATE.set(state.code());
            SaleSnapshot::fallback()
        }
    };

    if snapshot.sale_active && !snapshot.is_window_open(Utc::now().timestamp() as u64) {
        debug!(
            target: SALE_API,
            "Sale is flagged active but the sale window [{}, {}] is closed",
            snapshot.sale_start_time,
            snapshot.sale_end_time
        );
    }

    let display = derive_display_snapshot(&snapshot, &context.tiers);
    HttpResponse::Ok().json(display)
}

fn record_snapshot_metrics(snapshot: &SaleSnapshot) {
    let progress =
        progress_percentage(snapshot.total_tokens_sold, snapshot.total_tokens_for_sale);
    if let Some(value) = progress.to_f64() {
        metrics::SALE_PROGRESS_PERCENTAGE.set(value);
    }
    if let Some(value) = base_units_to_decimal(snapshot.total_tokens_sold).to_f64() {
        metrics::SALE_TOKENS_SOLD.set(value);
    }
}
