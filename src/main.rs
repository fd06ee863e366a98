use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;

use focusdeck::{
    server::{AppState, Server},
    store::DataStore,
};

#[derive(Debug, Parser)]
#[command(name = "focusdeck", about = "Personal productivity dashboard daemon")]
struct Args {
    /// Path to the JSON data file.
    #[arg(long, default_value = "data.json")]
    data_file: PathBuf,

    /// Address to bind the HTTP API to.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 4000)]
    port: u16,

    /// Seconds between reconciliation polls of the persisted session.
    #[arg(long, default_value_t = 5)]
    poll_interval: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    log::info!("focusdeck starting up...");

    let store = Arc::new(DataStore::open(args.data_file));
    let state = AppState::new(store, Duration::from_secs(args.poll_interval));
    let server = Server::start(state, &args.host, args.port).await?;

    tokio::signal::ctrl_c().await?;
    log::info!("Shutting down");
    server.shutdown();

    Ok(())
}
