pub mod client;
pub mod models;

pub use client::MetricsClient;
pub use models::{ApiError, StockQuote, StockSample, SystemSample, Timestamp};
