//! catalog-server binary entry point

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use catalog_server::db;
use catalog_server::http;
use catalog_server::ServerConfig;

/// HTTP catalog service
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// PostgreSQL connection string (falls back to DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,

    /// Enable debug logging (unless RUST_LOG is set)
    #[arg(long)]
    debug: bool,
}

fn init_tracing(debug: bool) -> Result<()> {
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(debug)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(args.debug)?;

    let database_url = match args.database_url {
        Some(url) => url,
        None => std::env::var("DATABASE_URL")
            .context("DATABASE_URL not set and --database-url not given")?,
    };

    let config = ServerConfig {
        host: args.host,
        port: args.port,
        database_url,
    };

    let pool = db::create_pool(&config.database_url)
        .await
        .context("failed to connect to database")?;
    db::ensure_schema(&pool)
        .await
        .context("failed to ensure schema")?;

    let bind_addr = config.bind_addr().context("invalid bind address")?;
    http::run_server(pool, bind_addr).await?;

    Ok(())
}
