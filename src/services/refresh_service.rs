use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::metrics::MetricsClient;
use crate::models::{ChartHandle, ChartRegistry, SystemCharts};
use crate::services::{chart_service, transform_service};
use crate::utils::RefreshError;

/// Fetch the system history and push it through both fixed charts.
///
/// The fetch completes before any chart is touched, so a failed cycle
/// leaves the previous render on disk.
pub async fn refresh_system(
    client: &MetricsClient,
    charts: &Mutex<SystemCharts>,
    window_hours: u32,
) -> Result<(), RefreshError> {
    debug!("Fetching system metrics...");
    let samples = client.get_system_history(window_hours).await?;
    debug!("System metrics received: {} samples", samples.len());

    let series = transform_service::system_series(&samples);
    let mut charts = charts.lock().await;
    chart_service::update_series(
        &mut charts.cpu,
        series.labels.clone(),
        series.cpu,
        "CPU Usage %",
    )?;
    chart_service::update_series(&mut charts.memory, series.labels, series.memory, "Memory Usage %")?;
    Ok(())
}

/// Fetch the current quotes and rebuild the combined snapshot chart
pub async fn refresh_snapshot(
    client: &MetricsClient,
    combined: &Mutex<ChartHandle>,
) -> Result<(), RefreshError> {
    debug!("Fetching stock snapshot...");
    let quotes = client.get_stock_snapshot().await?;
    debug!("Stock snapshot received: {} symbols", quotes.len());

    let (labels, datasets) = transform_service::snapshot_datasets(&quotes, Utc::now());
    let mut combined = combined.lock().await;
    chart_service::update_datasets(&mut combined, labels, datasets)?;
    Ok(())
}

/// Refresh one symbol's price chart.
///
/// An empty history renders the "no data" card instead of a chart. A
/// handle that a concurrent reconciliation has disposed is a logged no-op;
/// the symbol is simply no longer on the dashboard.
pub async fn refresh_symbol(
    client: &MetricsClient,
    registry: &Mutex<ChartRegistry>,
    symbol: &str,
    window_hours: Option<u32>,
) -> Result<(), RefreshError> {
    let samples = client.get_stock_history(symbol, window_hours).await?;
    debug!("History for {} received: {} samples", symbol, samples.len());

    let mut registry = registry.lock().await;
    let Some(handle) = registry.get_mut(symbol) else {
        warn!("Chart for {} is gone; dropping its refresh", symbol);
        return Ok(());
    };

    if samples.is_empty() {
        chart_service::render_placeholder(handle, &format!("No data available for {}", symbol))?;
        return Err(RefreshError::EmptyHistory(symbol.to_string()));
    }

    let series = transform_service::price_series(&samples);
    chart_service::update_series(
        handle,
        series.labels,
        series.values,
        &format!("{} Stock Price", symbol),
    )?;
    Ok(())
}

/// One system-family cycle. Failures stop here: logged, swallowed, and the
/// previous charts stay up.
pub async fn run_system_cycle(
    client: Arc<MetricsClient>,
    charts: Arc<Mutex<SystemCharts>>,
    window_hours: u32,
) {
    if let Err(e) = refresh_system(&client, &charts, window_hours).await {
        warn!("System charts refresh failed: {}", e);
    }
}

/// One snapshot-family cycle; same boundary policy as the system family
pub async fn run_snapshot_cycle(client: Arc<MetricsClient>, combined: Arc<Mutex<ChartHandle>>) {
    if let Err(e) = refresh_snapshot(&client, &combined).await {
        warn!("Stock snapshot refresh failed: {}", e);
    }
}

/// One full stocks cycle: resolve the symbol list, reconcile the chart
/// registry against it, then refresh every symbol chart concurrently.
///
/// A configured `override_symbols` list pins the dashboard and skips the
/// symbol fetch entirely.
pub async fn run_stocks_cycle(
    client: Arc<MetricsClient>,
    registry: Arc<Mutex<ChartRegistry>>,
    override_symbols: Option<Vec<String>>,
    window_hours: Option<u32>,
) {
    let symbols = match override_symbols {
        Some(list) => list,
        None => match client.get_stock_symbols().await {
            Ok(list) => {
                debug!("Stock symbols received: {:?}", list);
                list
            }
            Err(e) => {
                warn!("Stock symbols fetch failed: {}", e);
                return;
            }
        },
    };

    let summary = {
        let mut registry = registry.lock().await;
        let summary = registry.reconcile(&symbols);
        if !summary.is_empty() {
            debug!("Symbol charts now: {:?}", registry.symbols());
        }
        summary
    };
    for symbol in &summary.added {
        info!("Tracking new symbol {}", symbol);
    }
    for symbol in &summary.removed {
        info!("Symbol {} no longer listed; chart removed", symbol);
    }

    let mut tasks = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let client = Arc::clone(&client);
        let registry = Arc::clone(&registry);
        tasks.push(tokio::spawn(async move {
            match refresh_symbol(&client, &registry, &symbol, window_hours).await {
                Ok(()) => {}
                Err(RefreshError::EmptyHistory(_)) => {
                    info!("No history for {} yet; placeholder rendered", symbol)
                }
                Err(e) => warn!("Chart refresh for {} failed: {}", symbol, e),
            }
        }));
    }
    for task in tasks {
        if let Err(e) = task.await {
            warn!("Symbol refresh task failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn spawn_backend(routes: Vec<(&'static str, u16, &'static str)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let routes = routes.clone();
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 4096];
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    let request = String::from_utf8_lossy(&buf[..n]).into_owned();
                    let path = request.split_whitespace().nth(1).unwrap_or("/");
                    let (status, body) = routes
                        .iter()
                        .find(|(route, _, _)| *route == path)
                        .map(|(_, status, body)| (*status, *body))
                        .unwrap_or((404, "{\"error\": \"not found\"}"));
                    let reason = if status < 400 { "OK" } else { "Error" };
                    let response = format!(
                        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        reason,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        format!("http://{}", addr)
    }

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "pulseboard-refresh-{}-{}",
            tag,
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn system_charts(dir: &PathBuf) -> SystemCharts {
        SystemCharts {
            cpu: ChartHandle::new("CPU Usage %", "Usage (%)", dir.join("cpu.png"), 400, 300),
            memory: ChartHandle::new(
                "Memory Usage %",
                "Usage (%)",
                dir.join("memory.png"),
                400,
                300,
            ),
        }
    }

    #[tokio::test]
    async fn system_refresh_updates_both_charts_from_one_fetch() {
        let base = spawn_backend(vec![(
            "/metrics/system/history/24",
            200,
            r#"[{"timestamp": "2026-08-22T10:30:00", "cpu_percent": 10.0, "memory_percent": 40.0},
                {"timestamp": "2026-08-22T10:31:00", "cpu_percent": 55.0, "memory_percent": 60.0}]"#,
        )])
        .await;
        let dir = temp_dir("system");
        let client = MetricsClient::new(base);
        let charts = Mutex::new(system_charts(&dir));

        refresh_system(&client, &charts, 24).await.unwrap();

        let charts = charts.lock().await;
        assert_eq!(charts.cpu.datasets()[0].points, [10.0, 55.0]);
        assert_eq!(charts.memory.datasets()[0].points, [40.0, 60.0]);
        assert_eq!(charts.cpu.labels(), charts.memory.labels());
        assert!(dir.join("cpu.png").exists());
        assert!(dir.join("memory.png").exists());
    }

    #[tokio::test]
    async fn failed_fetch_leaves_previous_chart_state() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let dir = temp_dir("unreachable");
        let client = MetricsClient::new(format!("http://{}", addr));
        let charts = Mutex::new(system_charts(&dir));
        charts.lock().await.cpu.set_series(
            vec!["10:00".into()],
            vec![33.0],
            "CPU Usage %",
        );
        let before = charts.lock().await.cpu.datasets().to_vec();

        let err = refresh_system(&client, &charts, 24).await.unwrap_err();
        assert!(matches!(err, RefreshError::Fetch(_)));
        assert_eq!(charts.lock().await.cpu.datasets(), before);
    }

    #[tokio::test]
    async fn snapshot_refresh_builds_one_dataset_per_symbol() {
        let base = spawn_backend(vec![(
            "/metrics/stocks/current",
            200,
            r#"{"TSLA": {"price": 240.1}, "AAPL": {"price": 182.3}}"#,
        )])
        .await;
        let dir = temp_dir("snapshot");
        let client = MetricsClient::new(base);
        let combined = Mutex::new(ChartHandle::new(
            "Current Stock Prices",
            "Price (USD)",
            dir.join("stocks.png"),
            400,
            300,
        ));

        refresh_snapshot(&client, &combined).await.unwrap();

        let combined = combined.lock().await;
        let labels: Vec<&str> = combined.datasets().iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, ["AAPL", "TSLA"]);
        assert!(combined.datasets().iter().all(|d| d.points.len() == 1));
        assert!(dir.join("stocks.png").exists());
    }

    #[tokio::test]
    async fn empty_symbol_history_renders_placeholder_and_no_datasets() {
        let base = spawn_backend(vec![("/metrics/stocks/history/NEWCO", 200, "[]")]).await;
        let dir = temp_dir("placeholder");
        let client = MetricsClient::new(base);
        let registry = Mutex::new(ChartRegistry::new(dir.clone(), 400, 300));
        registry.lock().await.reconcile(&["NEWCO".into()]);

        let err = refresh_symbol(&client, &registry, "NEWCO", None)
            .await
            .unwrap_err();
        assert!(matches!(err, RefreshError::EmptyHistory(_)));

        let mut registry = registry.lock().await;
        assert!(registry.get_mut("NEWCO").unwrap().datasets().is_empty());
        assert!(dir.join("NEWCO.png").exists());
    }

    #[tokio::test]
    async fn refresh_for_a_disposed_symbol_is_a_noop() {
        let base = spawn_backend(vec![(
            "/metrics/stocks/history/GONE",
            200,
            r#"[{"timestamp": 1755856200, "price": 10.0}]"#,
        )])
        .await;
        let dir = temp_dir("disposed");
        let client = MetricsClient::new(base);
        let registry = Mutex::new(ChartRegistry::new(dir.clone(), 400, 300));

        refresh_symbol(&client, &registry, "GONE", None).await.unwrap();
        assert!(!dir.join("GONE.png").exists());
    }

    #[tokio::test]
    async fn stocks_cycle_tracks_and_renders_every_listed_symbol() {
        let base = spawn_backend(vec![
            ("/metrics/stocks/symbols", 200, r#"["AAPL", "TSLA"]"#),
            (
                "/metrics/stocks/history/AAPL",
                200,
                r#"[{"timestamp": 1755856200, "price": 182.0}, {"timestamp": 1755856260, "price": 183.0}]"#,
            ),
            (
                "/metrics/stocks/history/TSLA",
                200,
                r#"[{"timestamp": 1755856200, "price": 240.0}, {"timestamp": 1755856260, "price": 241.0}, {"timestamp": 1755856320, "price": 239.5}]"#,
            ),
        ])
        .await;
        let dir = temp_dir("cycle");
        let client = Arc::new(MetricsClient::new(base));
        let registry = Arc::new(Mutex::new(ChartRegistry::new(dir.clone(), 400, 300)));

        run_stocks_cycle(Arc::clone(&client), Arc::clone(&registry), None, None).await;

        let mut registry = registry.lock().await;
        assert_eq!(registry.symbols(), ["AAPL", "TSLA"]);
        assert_eq!(registry.get_mut("AAPL").unwrap().datasets()[0].points.len(), 2);
        assert_eq!(registry.get_mut("TSLA").unwrap().datasets()[0].points.len(), 3);
        assert!(dir.join("AAPL.png").exists());
        assert!(dir.join("TSLA.png").exists());
    }

    #[tokio::test]
    async fn stocks_cycle_disposes_symbols_dropped_from_the_list() {
        let base = spawn_backend(vec![
            ("/metrics/stocks/symbols", 200, r#"["AAPL"]"#),
            (
                "/metrics/stocks/history/AAPL",
                200,
                r#"[{"timestamp": 1755856200, "price": 182.0}]"#,
            ),
        ])
        .await;
        let dir = temp_dir("dispose-cycle");
        let client = Arc::new(MetricsClient::new(base));
        let registry = Arc::new(Mutex::new(ChartRegistry::new(dir.clone(), 400, 300)));
        registry
            .lock()
            .await
            .reconcile(&["AAPL".into(), "TSLA".into()]);
        fs::write(dir.join("TSLA.png"), b"stale").unwrap();

        run_stocks_cycle(Arc::clone(&client), Arc::clone(&registry), None, None).await;

        let registry = registry.lock().await;
        assert_eq!(registry.symbols(), ["AAPL"]);
        assert!(!dir.join("TSLA.png").exists());
    }

    #[tokio::test]
    async fn configured_symbol_list_skips_the_symbols_fetch() {
        // No /metrics/stocks/symbols route; the cycle must not need it.
        let base = spawn_backend(vec![(
            "/metrics/stocks/history/AAPL",
            200,
            r#"[{"timestamp": 1755856200, "price": 182.0}]"#,
        )])
        .await;
        let dir = temp_dir("override");
        let client = Arc::new(MetricsClient::new(base));
        let registry = Arc::new(Mutex::new(ChartRegistry::new(dir.clone(), 400, 300)));

        run_stocks_cycle(
            Arc::clone(&client),
            Arc::clone(&registry),
            Some(vec!["AAPL".into()]),
            None,
        )
        .await;

        assert_eq!(registry.lock().await.symbols(), ["AAPL"]);
        assert!(dir.join("AAPL.png").exists());
    }

    #[tokio::test]
    async fn cycle_wrappers_swallow_backend_failures() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let dir = temp_dir("swallow");
        let client = Arc::new(MetricsClient::new(format!("http://{}", addr)));
        let charts = Arc::new(Mutex::new(system_charts(&dir)));
        let registry = Arc::new(Mutex::new(ChartRegistry::new(dir, 400, 300)));

        run_system_cycle(Arc::clone(&client), charts, 24).await;
        run_stocks_cycle(Arc::clone(&client), registry, None, None).await;
    }
}
