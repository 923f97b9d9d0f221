use reqwest::Client as HttpClient;
use std::collections::BTreeMap;
use super::models::{ApiError, StockQuote, StockSample, SystemSample};
use tracing::{debug, warn};

/// Metrics backend client for the dashboard's read-only JSON endpoints
pub struct MetricsClient {
    http_client: HttpClient,
    base_url: String,
}

impl MetricsClient {
    /// Create a client for the backend at `base_url`
    pub fn new(base_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Parse error response based on HTTP status code
    async fn handle_error_response(
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> ApiError {
        let status_code = status.as_u16();
        let body_text = response.text().await.unwrap_or_default();

        // Try to parse the backend's {"error": "..."} body
        let message = if let Ok(err_json) = serde_json::from_str::<serde_json::Value>(&body_text) {
            err_json
                .get("error")
                .and_then(|v| v.as_str())
                .unwrap_or(&body_text)
                .to_string()
        } else {
            body_text
        };

        match status_code {
            404 => ApiError::NotFound(message),
            500..=599 => {
                warn!("Server error {}: {}", status_code, message);
                ApiError::ServerError(status_code as i32, message)
            }
            _ => ApiError::HttpError(status_code as i32, message),
        }
    }

    /// GET /metrics/system/history/{hours}
    ///
    /// Retrieves the rolling CPU and memory history for the last `hours`.
    ///
    /// # Arguments
    /// * `hours` - History window in hours
    ///
    /// # Returns
    /// * `Ok(Vec<SystemSample>)` - Oldest-first samples inside the window
    /// * `Err(ApiError)` - Error with detailed error type
    pub async fn get_system_history(&self, hours: u32) -> Result<Vec<SystemSample>, ApiError> {
        let url = format!("{}/metrics/system/history/{}", self.base_url, hours);
        debug!("GET {}", url);

        let response = self.http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::RequestError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Self::handle_error_response(status, response).await);
        }

        response
            .json::<Vec<SystemSample>>()
            .await
            .map_err(|e| ApiError::DeserializationError(format!("Failed to parse response: {}", e)))
    }

    /// GET /metrics/stocks/current
    ///
    /// Retrieves the latest quote for every tracked instrument, keyed by
    /// symbol. The map is ordered so chart datasets come out in a stable
    /// order from one refresh to the next.
    pub async fn get_stock_snapshot(&self) -> Result<BTreeMap<String, StockQuote>, ApiError> {
        let url = format!("{}/metrics/stocks/current", self.base_url);
        debug!("GET {}", url);

        let response = self.http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::RequestError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Self::handle_error_response(status, response).await);
        }

        response
            .json::<BTreeMap<String, StockQuote>>()
            .await
            .map_err(|e| ApiError::DeserializationError(format!("Failed to parse response: {}", e)))
    }

    /// GET /metrics/stocks/symbols
    ///
    /// Retrieves the list of currently tracked stock symbols.
    pub async fn get_stock_symbols(&self) -> Result<Vec<String>, ApiError> {
        let url = format!("{}/metrics/stocks/symbols", self.base_url);
        debug!("GET {}", url);

        let response = self.http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::RequestError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Self::handle_error_response(status, response).await);
        }

        response
            .json::<Vec<String>>()
            .await
            .map_err(|e| ApiError::DeserializationError(format!("Failed to parse response: {}", e)))
    }

    /// GET /metrics/stocks/history/{symbol} or /{symbol}/{hours}
    ///
    /// Retrieves one symbol's price history, optionally limited to a window.
    pub async fn get_stock_history(
        &self,
        symbol: &str,
        hours: Option<u32>,
    ) -> Result<Vec<StockSample>, ApiError> {
        let url = match hours {
            Some(hours) => format!("{}/metrics/stocks/history/{}/{}", self.base_url, symbol, hours),
            None => format!("{}/metrics/stocks/history/{}", self.base_url, symbol),
        };
        debug!("GET {}", url);

        let response = self.http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::RequestError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Self::handle_error_response(status, response).await);
        }

        response
            .json::<Vec<StockSample>>()
            .await
            .map_err(|e| ApiError::DeserializationError(format!("Failed to parse response: {}", e)))
    }
}
