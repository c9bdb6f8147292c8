//! ProfRate terminal client
//!
//! Usage: profrate-client [--base-url URL] [--token-file PATH]

use anyhow::{Context, Result};
use clap::Parser;
use profrate_backend::client::{
    api_client::DEFAULT_BASE_URL, token_file::DEFAULT_TOKEN_FILE, ApiClient, Shell, TokenFile,
};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "profrate-client", version, about = "Rate professors from the terminal")]
struct Args {
    /// API server base URL
    #[arg(long, env = "PROFRATE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Where the login token is kept between runs
    #[arg(long, env = "PROFRATE_TOKEN_FILE", default_value = DEFAULT_TOKEN_FILE)]
    token_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv::dotenv();
    init_tracing();

    let args = Args::parse();

    let api = ApiClient::new(&args.base_url).context("Failed to build HTTP client")?;
    let tokens = TokenFile::new(args.token_file);

    let stdin = io::stdin();
    let mut shell = Shell::new(api, tokens, stdin.lock(), io::stdout());
    shell.run().await.context("Client session failed")?;

    Ok(())
}

/// Quiet by default so logs don't interleave with the menus
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}
