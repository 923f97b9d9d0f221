use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

/// Sample timestamp as the backend emits it.
///
/// The backend is not consistent here: system samples carry ISO 8601
/// strings without an offset, older deployments returned epoch seconds,
/// and some proxies rewrite them into full RFC 3339. All three decode.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    /// RFC 3339 with an explicit offset
    Utc(DateTime<Utc>),
    /// ISO 8601 without an offset, taken as UTC
    Naive(NaiveDateTime),
    /// Seconds since the Unix epoch
    Epoch(f64),
}

impl Timestamp {
    /// Resolve to a UTC instant. Out-of-range epoch values fall back to
    /// the current time rather than failing the whole refresh.
    pub fn as_utc(&self) -> DateTime<Utc> {
        match self {
            Timestamp::Utc(dt) => *dt,
            Timestamp::Naive(naive) => DateTime::<Utc>::from_naive_utc_and_offset(*naive, Utc),
            Timestamp::Epoch(secs) => {
                DateTime::<Utc>::from_timestamp_millis((secs * 1000.0) as i64)
                    .unwrap_or_else(Utc::now)
            }
        }
    }
}

/// One observation from GET /metrics/system/history/{hours}
#[derive(Debug, Clone, Deserialize)]
pub struct SystemSample {
    pub timestamp: Timestamp,
    pub cpu_percent: f64,
    pub memory_percent: f64,
}

/// One observation from GET /metrics/stocks/history/{symbol}
#[derive(Debug, Clone, Deserialize)]
pub struct StockSample {
    pub timestamp: Timestamp,
    pub price: f64,
}

/// Per-symbol entry in the GET /metrics/stocks/current response
#[derive(Debug, Clone, Deserialize)]
pub struct StockQuote {
    pub price: f64,
}

/// Comprehensive error type for metrics backend operations
#[derive(Debug, Clone)]
pub enum ApiError {
    /// 404 Not Found
    NotFound(String),
    /// 5xx Server Error
    ServerError(i32, String),
    /// Other HTTP errors
    HttpError(i32, String),
    /// Network/request error
    RequestError(String),
    /// Deserialization error
    DeserializationError(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::ServerError(code, msg) => write!(f, "Server Error ({}): {}", code, msg),
            ApiError::HttpError(code, msg) => write!(f, "HTTP Error ({}): {}", code, msg),
            ApiError::RequestError(msg) => write!(f, "Request Error: {}", msg),
            ApiError::DeserializationError(msg) => write!(f, "Deserialization Error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}
