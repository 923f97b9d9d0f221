use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

use super::chart::ChartHandle;

/// Symbols added and removed by one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileSummary {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl ReconcileSummary {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Chart handles for the per-symbol price charts, keyed by symbol.
///
/// `reconcile` keeps the handle set equal to the latest symbol list: a new
/// symbol gets a handle (and a chart file on its next refresh), a vanished
/// symbol loses both.
pub struct ChartRegistry {
    out_dir: PathBuf,
    width: u32,
    height: u32,
    charts: HashMap<String, ChartHandle>,
}

impl ChartRegistry {
    pub fn new(out_dir: PathBuf, width: u32, height: u32) -> Self {
        Self {
            out_dir,
            width,
            height,
            charts: HashMap::new(),
        }
    }

    pub fn get_mut(&mut self, symbol: &str) -> Option<&mut ChartHandle> {
        self.charts.get_mut(symbol)
    }

    /// Known symbols, sorted for stable logging
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.charts.keys().cloned().collect();
        symbols.sort();
        symbols
    }

    /// Bring the handle set in line with `symbols`. Handles for vanished
    /// symbols are dropped and their chart files deleted.
    pub fn reconcile(&mut self, symbols: &[String]) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();

        for symbol in symbols {
            if !self.charts.contains_key(symbol) {
                let target = self.out_dir.join(format!("{}.png", symbol));
                let handle = ChartHandle::new(
                    format!("{} Stock Price", symbol),
                    "Price (USD)",
                    target,
                    self.width,
                    self.height,
                );
                self.charts.insert(symbol.clone(), handle);
                summary.added.push(symbol.clone());
            }
        }

        let stale: Vec<String> = self
            .charts
            .keys()
            .filter(|known| !symbols.iter().any(|s| s == *known))
            .cloned()
            .collect();
        for symbol in stale {
            if let Some(handle) = self.charts.remove(&symbol) {
                if handle.target().exists() {
                    if let Err(e) = fs::remove_file(handle.target()) {
                        warn!(
                            "Failed to remove chart file {}: {}",
                            handle.target().display(),
                            e
                        );
                    }
                }
                summary.removed.push(symbol);
            }
        }
        summary.removed.sort();

        summary
    }
}
