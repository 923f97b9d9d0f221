pub mod errors;
pub mod inflight;

pub use errors::RefreshError;
pub use inflight::InflightGate;
