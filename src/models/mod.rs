//! Data models for the dashboard's charts and series
//!
//! This module organizes the chart-side state: projected series, chart
//! handles bound to output images, and the per-symbol handle registry.

pub mod chart;
pub mod registry;
pub mod series;

// Re-export commonly used types for convenience
pub use chart::{ChartHandle, SeriesColor, SystemCharts};
pub use registry::ChartRegistry;
pub use series::{Series, SystemSeries};
