//! Tick loops driving the refresh pipelines

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time;
use tracing::debug;

use crate::api::metrics::MetricsClient;
use crate::config::DashboardConfig;
use crate::models::{ChartHandle, ChartRegistry, SystemCharts};
use crate::services::refresh_service;
use crate::utils::InflightGate;

/// One refresh cycle, built fresh for every accepted tick
type RefreshFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Drives the metric families on their fixed periods.
///
/// Each family ticks independently. A tick whose family still has a
/// refresh in flight is skipped rather than queued, so a slow backend
/// cannot stack cycles behind itself.
pub struct Scheduler {
    client: Arc<MetricsClient>,
    config: DashboardConfig,
    gate: InflightGate,
    system: Arc<Mutex<SystemCharts>>,
    combined: Arc<Mutex<ChartHandle>>,
    registry: Arc<Mutex<ChartRegistry>>,
}

impl Scheduler {
    pub fn new(
        client: Arc<MetricsClient>,
        config: DashboardConfig,
        system: Arc<Mutex<SystemCharts>>,
        combined: Arc<Mutex<ChartHandle>>,
        registry: Arc<Mutex<ChartRegistry>>,
    ) -> Self {
        Self {
            client,
            config,
            gate: InflightGate::new(),
            system,
            combined,
            registry,
        }
    }

    /// Run every family loop until the process is stopped. The first tick
    /// of each loop fires immediately, which covers the initial render.
    pub async fn run(self) {
        let Scheduler {
            client,
            config,
            gate,
            system,
            combined,
            registry,
        } = self;

        let system_loop = {
            let client = Arc::clone(&client);
            let hours = config.system_window_hours;
            tokio::spawn(family_loop(
                "system",
                config.system_interval,
                gate.clone(),
                move || -> RefreshFuture {
                    Box::pin(refresh_service::run_system_cycle(
                        Arc::clone(&client),
                        Arc::clone(&system),
                        hours,
                    ))
                },
            ))
        };

        let snapshot_loop = {
            let client = Arc::clone(&client);
            tokio::spawn(family_loop(
                "snapshot",
                config.stock_interval,
                gate.clone(),
                move || -> RefreshFuture {
                    Box::pin(refresh_service::run_snapshot_cycle(
                        Arc::clone(&client),
                        Arc::clone(&combined),
                    ))
                },
            ))
        };

        let stocks_loop = {
            let symbols = config.symbols.clone();
            let window = config.stock_window_hours;
            tokio::spawn(family_loop(
                "stocks",
                config.stock_interval,
                gate.clone(),
                move || -> RefreshFuture {
                    Box::pin(refresh_service::run_stocks_cycle(
                        Arc::clone(&client),
                        Arc::clone(&registry),
                        symbols.clone(),
                        window,
                    ))
                },
            ))
        };

        let _ = tokio::join!(system_loop, snapshot_loop, stocks_loop);
    }
}

/// Tick loop for one metric family. Every tick tries to claim the family
/// key; a claimed tick spawns the refresh and the permit rides along until
/// the cycle finishes, however it finishes.
async fn family_loop<F>(key: &'static str, period: Duration, gate: InflightGate, mut build: F)
where
    F: FnMut() -> RefreshFuture + Send + 'static,
{
    let mut ticker = time::interval(period);
    loop {
        ticker.tick().await;
        match gate.try_begin(key) {
            Some(permit) => {
                let refresh = build();
                tokio::spawn(async move {
                    let _permit = permit;
                    refresh.await;
                });
            }
            None => debug!("{} refresh still in flight; skipping this tick", key),
        }
    }
}
