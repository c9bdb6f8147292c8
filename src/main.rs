//! ProfRate - professor rating API server
//!
//! `profrate serve` (the default) runs the HTTP API; `profrate seed` loads
//! professors and module instances from a TOML file.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use profrate_backend::{config::Config, server, store::seed::SeedFile, Database};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "profrate", version, about = "Professor rating API server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (default)
    Serve(ServeArgs),
    /// Load professors and modules from a TOML file
    Seed {
        #[arg(long, default_value = "data/seed.toml")]
        file: PathBuf,

        #[arg(long, env = "DB_PATH")]
        db: Option<String>,

        #[arg(long, env = "PROFRATE_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
struct ServeArgs {
    /// Config file (TOML)
    #[arg(long, env = "PROFRATE_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind, e.g. 127.0.0.1:8000
    #[arg(long, env = "BIND_ADDR")]
    bind: Option<String>,

    /// SQLite database file
    #[arg(long, env = "DB_PATH")]
    db: Option<String>,
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => {
            let mut config = Config::load(path)?;
            // Env still overrides an explicit file
            config.apply_env_overrides();
            config
        }
        None => Config::from_env()?,
    };
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Some(Command::Seed { file, db, config }) => {
            let mut cfg = load_config(config.as_deref())?;
            if let Some(db) = db {
                cfg.db_path = db;
            }
            seed(&file, &cfg)
        }
        Some(Command::Serve(args)) => serve(args).await,
        None => serve(cli.serve).await,
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(db) = args.db {
        config.db_path = db;
    }

    info!("🚀 ProfRate API starting");
    server::run(&config).await
}

fn seed(file: &Path, config: &Config) -> Result<()> {
    let seed = SeedFile::load(file)?;
    let db = Database::open(&config.db_path)
        .with_context(|| format!("Failed to open database {}", config.db_path))?;

    let report = db.apply_seed(&seed)?;
    info!(
        professors = report.professors,
        modules = report.modules,
        assignments = report.assignments,
        "🌱 Seeded {} from {}",
        config.db_path,
        file.display()
    );
    Ok(())
}

/// Initialize tracing
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "profrate_backend=info,profrate=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // 1) Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // 2) Also try the crate root .env when run from elsewhere
    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}
