use std::path::PathBuf;
use std::sync::Arc;

use actix_web::http::Method;
use actix_web::{web, HttpResponse};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::aggregated::sale_state::FetchState;
use crate::models::tiers::TierSchedule;
use crate::rpc::SaleInfoProvider;

pub mod documents;
pub mod token_sale;

/// Everything the handlers need, passed explicitly instead of living in
/// module-level singletons.
pub struct AppContext {
    pub provider: Arc<dyn SaleInfoProvider>,
    pub tiers: TierSchedule,
    pub document_root: PathBuf,
    pub fetch_state: Mutex<FetchState>,
}

impl AppContext {
    pub fn new(
        provider: Arc<dyn SaleInfoProvider>,
        tiers: TierSchedule,
        document_root: PathBuf,
    ) -> Self {
        Self {
            provider,
            tiers,
            document_root,
            fetch_state: Mutex::new(FetchState::Idle),
        }
    }
}

/// Structured JSON error body for client-correctable conditions.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

pub(crate) fn bad_request(reason: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorBody {
        error: reason.to_string(),
    })
}

pub(crate) fn not_found(reason: &str) -> HttpResponse {
    HttpResponse::NotFound().json(ErrorBody {
        error: reason.to_string(),
    })
}

/// Generic 500. Details stay in the logs, never in the response.
pub(crate) fn internal_error() -> HttpResponse {
    HttpResponse::InternalServerError().json(ErrorBody {
        error: "internal error".to_string(),
    })
}

/// CORS preflight: 200 with no body. The permissive
/// `Access-Control-Allow-Origin` header is attached by middleware.
pub async fn preflight() -> HttpResponse {
    HttpResponse::Ok().finish()
}

/// Registers every route of the service. Shared between `main` and the
/// HTTP tests.
pub fn configure(config: &mut web::ServiceConfig) {
    config
        .service(token_sale::token_sale)
        .service(documents::serve_document)
        .service(crate::metrics::get_metrics)
        .route("/api/token-sale", web::method(Method::OPTIONS).to(preflight))
        .route("/api/pdf", web::method(Method::OPTIONS).to(preflight));
}
