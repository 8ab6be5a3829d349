use anyhow::Result;
use clap::Parser;
use std::time::Duration;
use tracing::info;

use daily_price_watch::cli::Cli;
use daily_price_watch::{logging, AppConfig, ProductManager, ProductScheduler};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config_dir)?;
    let _log_guard = logging::init(&config)?;

    info!("Starting Daily Price Watch...");
    info!("Watching {} products", config.products.len());

    let manager = ProductManager::from_config(&config)?;
    let mut scheduler = ProductScheduler::new(
        manager,
        config.trigger_time()?,
        Duration::from_secs(config.scheduler.tick_interval_secs),
    );

    if cli.once {
        let status = scheduler.run_now(chrono::Local::now()).await;
        info!("Single check finished: {:?}", status);
        return Ok(());
    }

    tokio::select! {
        _ = scheduler.run() => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("Shutting down...");
        }
    }

    Ok(())
}
