use axum::http::StatusCode;
use prometheus::{Encoder, IntCounter, Registry, TextEncoder};

/// Prometheus counters for the mutating endpoints, kept in a registry owned
/// by the server state so each router gets its own set.
pub struct ServiceMetrics {
    registry: Registry,
    pub counter_increments: IntCounter,
    pub counter_resets: IntCounter,
    pub info_updates: IntCounter,
    pub info_rejected: IntCounter,
}

impl ServiceMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("canarie".into()), None)?;
        let counter = |name: &str, help: &str| -> Result<IntCounter, prometheus::Error> {
            let c = IntCounter::new(name, help)?;
            registry.register(Box::new(c.clone()))?;
            Ok(c)
        };
        Ok(Self {
            counter_increments: counter("counter_increments_total", "Counter increments committed")?,
            counter_resets: counter("counter_resets_total", "Counter resets committed")?,
            info_updates: counter("info_updates_total", "Info records stored through /setinfo")?,
            info_rejected: counter("info_rejected_total", "Info payloads rejected as invalid")?,
            registry,
        })
    }

    /// Text exposition of every registered metric.
    pub fn encode(&self) -> (StatusCode, String) {
        let mut buffer = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buffer) {
            return (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics encode error: {e}"));
        }
        (StatusCode::OK, String::from_utf8(buffer).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_prefixed_counters() {
        let m = ServiceMetrics::new().unwrap();
        m.counter_increments.inc();
        m.counter_increments.inc();
        let (status, text) = m.encode();
        assert_eq!(status, StatusCode::OK);
        assert!(text.contains("canarie_counter_increments_total 2"));
        assert!(text.contains("canarie_info_rejected_total 0"));
    }

    #[test]
    fn instances_do_not_share_state() {
        let a = ServiceMetrics::new().unwrap();
        let b = ServiceMetrics::new().unwrap();
        a.info_updates.inc();
        assert_eq!(b.info_updates.get(), 0);
    }
}
