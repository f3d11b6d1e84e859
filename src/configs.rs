use clap::Parser;
use tracing_subscriber::EnvFilter;

/// NWIS Sale API
/// Aggregates the state of the NWIS presale contract
/// and serves it to the token-sale front-end
#[derive(Parser, Debug)]
#[clap(
    version,
    author,
    about,
    disable_help_subcommand(true),
    propagate_version(true),
    next_line_help(true)
)]
pub struct Opts {
    /// URL of the JSON-RPC node used for the sale info view calls
    #[clap(long, env)]
    pub rpc_url: String,
    /// Address of the presale contract
    #[clap(long, env)]
    pub contract_address: String,
    /// Directory the document proxy is allowed to serve files from
    #[clap(long, env, default_value = "./public/docs")]
    pub document_root: std::path::PathBuf,
    /// Timeout for outbound RPC calls, in seconds
    #[clap(long, env, default_value_t = 10)]
    pub rpc_timeout_secs: u64,
    /// Port to bind the HTTP server to
    #[clap(long, short, env, default_value_t = 3030)]
    pub port: u16,
    /// Enables Sale API debug level of logs
    #[clap(long)]
    pub debug: bool,
}

pub fn init_tracing(debug: bool) -> anyhow::Result<()> {
    let mut env_filter = EnvFilter::new("sale_api=info,sale_aggregator=info");

    if debug {
        env_filter = env_filter
            .add_directive("sale_api=debug".parse()?)
            .add_directive("sale_aggregator=debug".parse()?);
    }

    if let Ok(rust_log) = std::env::var("RUST_LOG") {
        if !rust_log.is_empty() {
            for directive in rust_log.split(',').filter_map(|s| match s.parse() {
                Ok(directive) => Some(directive),
                Err(err) => {
                    eprintln!("Ignoring directive `{}`: {}", s, err);
                    None
                }
            }) {
                env_filter = env_filter.add_directive(directive);
            }
        }
    }

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    if std::env::var("ENABLE_JSON_LOGS").is_ok() {
        subscriber.json().init();
    } else {
        subscriber.compact().init();
    }

    Ok(())
}
