use chrono::{DateTime, Local, Utc};
use std::collections::BTreeMap;

use crate::api::metrics::{StockQuote, StockSample, SystemSample, Timestamp};
use crate::models::{Series, SystemSeries};

/// Render one sample timestamp the way the chart x axis shows it: local
/// wall-clock time, no date. Samples a day apart collide visually, which
/// is acceptable for a rolling dashboard window.
fn time_label(timestamp: &Timestamp) -> String {
    timestamp
        .as_utc()
        .with_timezone(&Local)
        .format("%H:%M:%S")
        .to_string()
}

/// Project the system history into the two fixed charts' columns. Both
/// charts share one label axis from the same samples.
pub fn system_series(samples: &[SystemSample]) -> SystemSeries {
    SystemSeries {
        labels: samples.iter().map(|s| time_label(&s.timestamp)).collect(),
        cpu: samples.iter().map(|s| s.cpu_percent).collect(),
        memory: samples.iter().map(|s| s.memory_percent).collect(),
    }
}

/// Project one symbol's price history into a chart series
pub fn price_series(samples: &[StockSample]) -> Series {
    Series {
        labels: samples.iter().map(|s| time_label(&s.timestamp)).collect(),
        values: samples.iter().map(|s| s.price).collect(),
    }
}

/// Build the combined snapshot chart's inputs: one single-point dataset per
/// instrument, all sharing the snapshot time as their only label
pub fn snapshot_datasets(
    quotes: &BTreeMap<String, StockQuote>,
    taken_at: DateTime<Utc>,
) -> (Vec<String>, Vec<(String, Vec<f64>)>) {
    let labels = vec![taken_at
        .with_timezone(&Local)
        .format("%H:%M:%S")
        .to_string()];
    let datasets = quotes
        .iter()
        .map(|(symbol, quote)| (symbol.clone(), vec![quote.price]))
        .collect();
    (labels, datasets)
}
