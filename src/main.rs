use std::sync::Arc;
use std::time::Duration;

use actix_web::{middleware, web, App, HttpServer};
use clap::Parser;
use tracing::info;

use nwis_sale_api::configs::{self, Opts};
use nwis_sale_api::models::tiers::TierSchedule;
use nwis_sale_api::routes::{self, AppContext};
use nwis_sale_api::rpc::EthRpcClient;
use nwis_sale_api::SALE_API;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // We use it to automatically search for root certificates to perform
    // HTTPS calls to the RPC node
    openssl_probe::init_ssl_cert_env_vars();

    dotenv::dotenv().ok();

    let opts: Opts = Opts::parse();

    configs::init_tracing(opts.debug)?;

    let provider = EthRpcClient::new(
        opts.rpc_url.clone(),
        opts.contract_address.clone(),
        Duration::from_secs(opts.rpc_timeout_secs),
    )?;
    let context = web::Data::new(AppContext::new(
        Arc::new(provider),
        TierSchedule::nwis_default(),
        opts.document_root.clone(),
    ));

    info!(
        target: SALE_API,
        "Starting NWIS sale API on http://0.0.0.0:{}", opts.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::DefaultHeaders::new().add(("Access-Control-Allow-Origin", "*")))
            .app_data(context.clone())
            .configure(routes::configure)
    })
    .bind(("0.0.0.0", opts.port))?
    .run()
    .await?;

    Ok(())
}
