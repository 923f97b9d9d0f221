use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Keyed in-flight guard: at most one running refresh per metric key.
///
/// `try_begin` hands out a permit while the key is free; dropping the
/// permit releases it. Clones share the same underlying set, so the
/// scheduler can hold one gate across every family loop.
#[derive(Clone, Default)]
pub struct InflightGate {
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl InflightGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key` for one refresh. Returns `None` while a previous claim
    /// on the same key is still alive.
    pub fn try_begin(&self, key: &str) -> Option<InflightPermit> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if in_flight.insert(key.to_string()) {
            Some(InflightPermit {
                key: key.to_string(),
                in_flight: Arc::clone(&self.in_flight),
            })
        } else {
            None
        }
    }

}

/// Live claim on one metric key, released on drop
pub struct InflightPermit {
    key: String,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl Drop for InflightPermit {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
