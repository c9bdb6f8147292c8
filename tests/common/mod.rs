//! Shared helpers: a seeded server on an ephemeral port

#![allow(dead_code)]

use profrate_backend::{config::Config, server, store::seed::SeedFile, Database};
use std::path::PathBuf;
use tokio::net::TcpListener;

pub fn seed_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("data")
        .join("seed.toml")
}

pub fn seeded_db() -> Database {
    let db = Database::in_memory().expect("in-memory database");
    let seed = SeedFile::load(seed_path()).expect("seed file");
    db.apply_seed(&seed).expect("apply seed");
    db
}

pub fn test_config() -> Config {
    Config {
        bcrypt_cost: 4,
        ..Config::default()
    }
}

/// Start the API over `db` and return its base URL
pub async fn spawn_server(db: Database) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let config = test_config();

    tokio::spawn(async move {
        if let Err(e) = server::serve(listener, db, &config).await {
            eprintln!("test server stopped: {:#}", e);
        }
    });

    format!("http://{}", addr)
}
