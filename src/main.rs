use std::fs;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod models;
mod scheduler;
mod services;
mod utils;

use api::metrics::MetricsClient;
use config::DashboardConfig;
use models::{ChartHandle, ChartRegistry, SystemCharts};
use scheduler::Scheduler;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env()
            .add_directive("pulseboard=debug".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap()))
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("📊 Starting Pulseboard v{}...", env!("CARGO_PKG_VERSION"));
    info!("   Polls a metrics backend and keeps its dashboard charts fresh");
    info!("");

    // Load configuration
    let config = match DashboardConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return;
        }
    };
    info!("Metrics backend: {}", config.base_url);
    info!(
        "Refresh intervals: system {}s, stocks {}s",
        config.system_interval.as_secs(),
        config.stock_interval.as_secs()
    );
    match &config.symbols {
        Some(list) => info!("Symbol list pinned by configuration: {:?}", list),
        None => info!("Symbol list will be fetched from the backend"),
    }

    // The output directory is the surface the charts live on; with no
    // directory there is nothing to draw to.
    if let Err(e) = fs::create_dir_all(&config.output_dir) {
        error!(
            "Failed to create chart output directory {}: {}",
            config.output_dir.display(),
            e
        );
        return;
    }
    info!("Rendering charts into {}", config.output_dir.display());

    let (width, height) = (config.chart_width, config.chart_height);
    let system = SystemCharts {
        cpu: ChartHandle::new(
            "CPU Usage %",
            "Usage (%)",
            config.output_dir.join("cpu.png"),
            width,
            height,
        ),
        memory: ChartHandle::new(
            "Memory Usage %",
            "Usage (%)",
            config.output_dir.join("memory.png"),
            width,
            height,
        ),
    };
    let combined = ChartHandle::new(
        "Current Stock Prices",
        "Price (USD)",
        config.output_dir.join("stocks.png"),
        width,
        height,
    );
    let registry = ChartRegistry::new(config.output_dir.clone(), width, height);

    let client = Arc::new(MetricsClient::new(config.base_url.clone()));
    let scheduler = Scheduler::new(
        client,
        config,
        Arc::new(Mutex::new(system)),
        Arc::new(Mutex::new(combined)),
        Arc::new(Mutex::new(registry)),
    );

    info!("Initialization complete; entering refresh loop");
    scheduler.run().await;
}
