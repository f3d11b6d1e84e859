use std::path::PathBuf;
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{middleware, test, web, App};
use async_trait::async_trait;

use nwis_sale_api::models::tiers::TierSchedule;
use nwis_sale_api::routes::{self, AppContext};
use nwis_sale_api::rpc::{SaleInfo, SaleInfoProvider};

const WEI: u128 = 1_000_000_000_000_000_000;

struct FixedSaleInfo(SaleInfo);

#[async_trait]
impl SaleInfoProvider for FixedSaleInfo {
    async fn get_sale_info(&self) -> anyhow::Result<SaleInfo> {
        Ok(self.0)
    }
}

struct UnreachableRpc;

#[async_trait]
impl SaleInfoProvider for UnreachableRpc {
    async fn get_sale_info(&self) -> anyhow::Result<SaleInfo> {
        anyhow::bail!("connection refused")
    }
}

fn live_sale_info() -> SaleInfo {
    SaleInfo {
        sale_active: true,
        token_price: 7_125_000_000_000_000,
        total_tokens_for_sale: 1_000_000 * WEI,
        total_tokens_sold: 250_000 * WEI,
        min_purchase: WEI / 100,
        max_purchase: 10 * WEI,
        sale_start_time: 1_700_000_000,
        sale_end_time: 1_731_536_000,
    }
}

fn context(provider: Arc<dyn SaleInfoProvider>, document_root: PathBuf) -> web::Data<AppContext> {
    web::Data::new(AppContext::new(
        provider,
        TierSchedule::nwis_default(),
        document_root,
    ))
}

fn document_root(test_name: &str) -> PathBuf {
    let root = std::env::temp_dir()
        .join("nwis-sale-api-tests")
        .join(format!("{}-{}", test_name, std::process::id()));
    std::fs::create_dir_all(&root).unwrap();
    root
}

macro_rules! init_app {
    ($context:expr) => {
        test::init_service(
            App::new()
                .wrap(
                    middleware::DefaultHeaders::new().add(("Access-Control-Allow-Origin", "*")),
                )
                .app_data($context)
                .configure(routes::configure),
        )
        .await
    };
}

#[actix_web::test]
async fn token_sale_returns_the_derived_snapshot() {
    let context = context(
        Arc::new(FixedSaleInfo(live_sale_info())),
        document_root("token-sale-live"),
    );
    let app = init_app!(context);

    let request = test::TestRequest::get().uri("/api/token-sale").to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("Access-Control-Allow-Origin")
            .unwrap(),
        "*"
    );

    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["saleActive"], true);
    assert_eq!(body["progressPercentage"], "25.00");
    assert_eq!(body["amountRaised"], "1781.25");
    assert_eq!(body["currentPrice"], "0.007125");
    assert_eq!(body["totalTokensForSale"], "1000000.00");
    assert_eq!(body["totalTokensSold"], "250000.00");
    assert_eq!(body["minPurchase"], "0.010000");
    assert_eq!(body["maxPurchase"], "10.000000");
    assert_eq!(body["saleStartTime"], 1_700_000_000);
    assert_eq!(body["saleEndTime"], 1_731_536_000);
}

#[actix_web::test]
async fn token_sale_masks_rpc_failures_with_the_fallback_snapshot() {
    let context = context(Arc::new(UnreachableRpc), document_root("token-sale-down"));
    let app = init_app!(context);

    let request = test::TestRequest::get().uri("/api/token-sale").to_request();
    let response = test::call_service(&app, request).await;
    // degrade-gracefully: never a 5xx for sale data
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["saleActive"], false);
    assert_eq!(body["progressPercentage"], "0.00");
    assert_eq!(body["amountRaised"], "0.00");
    assert_eq!(body["currentPrice"], "0.000000");
    assert_eq!(body["totalTokensForSale"], "0.00");
    assert_eq!(body["totalTokensSold"], "0.00");
    assert_eq!(body["saleStartTime"], 0);
    assert_eq!(body["saleEndTime"], 0);
}

#[actix_web::test]
async fn pdf_proxy_serves_files_under_the_document_root() {
    let root = document_root("pdf-served");
    let content = b"%PDF-1.4 test document";
    std::fs::write(root.join("whitepaper.pdf"), content).unwrap();

    let context = context(Arc::new(UnreachableRpc), root);
    let app = init_app!(context);

    let request = test::TestRequest::get()
        .uri("/api/pdf?file=whitepaper.pdf")
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("Content-Type").unwrap(),
        "application/pdf"
    );
    assert_eq!(response.headers().get("Accept-Ranges").unwrap(), "bytes");
    assert_eq!(
        response.headers().get("Cache-Control").unwrap(),
        "public, max-age=31536000, immutable"
    );

    let body = test::read_body(response).await;
    assert_eq!(body.as_ref(), content);
}

#[actix_web::test]
async fn pdf_proxy_rejects_path_traversal() {
    let context = context(Arc::new(UnreachableRpc), document_root("pdf-traversal"));
    let app = init_app!(context);

    let request = test::TestRequest::get()
        .uri("/api/pdf?file=../../etc/passwd")
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(response).await;
    assert!(body["error"].is_string());
}

#[actix_web::test]
async fn pdf_proxy_rejects_absolute_paths() {
    let context = context(Arc::new(UnreachableRpc), document_root("pdf-absolute"));
    let app = init_app!(context);

    let request = test::TestRequest::get()
        .uri("/api/pdf?file=/etc/passwd")
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn pdf_proxy_requires_the_file_parameter() {
    let context = context(Arc::new(UnreachableRpc), document_root("pdf-missing-param"));
    let app = init_app!(context);

    let request = test::TestRequest::get().uri("/api/pdf").to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn pdf_proxy_answers_404_for_absent_files() {
    let context = context(Arc::new(UnreachableRpc), document_root("pdf-absent"));
    let app = init_app!(context);

    let request = test::TestRequest::get()
        .uri("/api/pdf?file=ghost.pdf")
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body: serde_json::Value = test::read_body_json(response).await;
    assert!(body["error"].is_string());
}

#[actix_web::test]
async fn preflight_answers_200_with_permissive_cors() {
    let context = context(Arc::new(UnreachableRpc), document_root("preflight"));
    let app = init_app!(context);

    for uri in ["/api/token-sale", "/api/pdf"] {
        let request = test::TestRequest::with_uri(uri)
            .method(actix_web::http::Method::OPTIONS)
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK, "uri={uri}");
        assert_eq!(
            response
                .headers()
                .get("Access-Control-Allow-Origin")
                .unwrap(),
            "*"
        );
        let body = test::read_body(response).await;
        assert!(body.is_empty());
    }
}
