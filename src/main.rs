use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use data_plotter::config::Config;
use data_plotter::{server, TabularStore};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = Config::parse();
    log::info!(
        "backend {:?} (base dir {}, prefix {})",
        config.backend,
        config.base_dir.display(),
        config.prefix
    );

    let backend = config.build_backend()?;
    let store = Arc::new(TabularStore::new(backend, config.data_types.clone()));

    server::run_server(store, config.bind_addr()).await
}
