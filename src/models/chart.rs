//! Chart state models

use rand::Rng;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// RGB stroke color for one dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesColor(pub u8, pub u8, pub u8);

/// Stroke used for every single-series chart
pub const DEFAULT_SERIES_COLOR: SeriesColor = SeriesColor(75, 192, 192);

fn random_color() -> SeriesColor {
    let mut rng = rand::thread_rng();
    SeriesColor(rng.gen(), rng.gen(), rng.gen())
}

/// One ordered value sequence drawn on a chart
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub label: String,
    pub points: Vec<f64>,
    pub color: SeriesColor,
}

/// Mutable state of one rendered chart.
///
/// A handle owns the label axis and datasets currently on display plus the
/// image file they are drawn into. Colors are memoized per dataset label so
/// a dataset keeps its color across refreshes even though the dataset list
/// is rebuilt every cycle.
#[derive(Debug, Clone)]
pub struct ChartHandle {
    title: String,
    y_desc: String,
    target: PathBuf,
    width: u32,
    height: u32,
    labels: Vec<String>,
    datasets: Vec<Dataset>,
    colors: HashMap<String, SeriesColor>,
}

impl ChartHandle {
    pub fn new(
        title: impl Into<String>,
        y_desc: impl Into<String>,
        target: PathBuf,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            title: title.into(),
            y_desc: y_desc.into(),
            target,
            width,
            height,
            labels: Vec::new(),
            datasets: Vec::new(),
            colors: HashMap::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn y_desc(&self) -> &str {
        &self.y_desc
    }

    /// Image file this chart renders into
    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    /// Replace the single bound series. Labels and values must be the same
    /// length; the value at index i belongs to the label at index i.
    pub fn set_series(&mut self, labels: Vec<String>, values: Vec<f64>, label: &str) {
        let color = *self
            .colors
            .entry(label.to_string())
            .or_insert(DEFAULT_SERIES_COLOR);
        self.labels = labels;
        self.datasets = vec![Dataset {
            label: label.to_string(),
            points: values,
            color,
        }];
    }

    /// Replace the whole dataset list. New labels draw a random color on
    /// first sight and keep it afterwards.
    pub fn replace_datasets(&mut self, labels: Vec<String>, datasets: Vec<(String, Vec<f64>)>) {
        self.labels = labels;
        self.datasets = datasets
            .into_iter()
            .map(|(label, points)| {
                let color = *self.colors.entry(label.clone()).or_insert_with(random_color);
                Dataset {
                    label,
                    points,
                    color,
                }
            })
            .collect();
    }
}

/// The two fixed system charts, always updated together from one fetch
#[derive(Debug)]
pub struct SystemCharts {
    pub cpu: ChartHandle,
    pub memory: ChartHandle,
}
