use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;
use tracing::debug;

const MAX_RECENT_ERRORS: usize = 20;

/// Rolling per-provider counters. Only ever appended to within process
/// lifetime; this is advisory telemetry, not a correctness-critical ledger.
#[derive(Debug, Default, Clone)]
pub struct PerformanceRecord {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub total_latency_secs: f64,
    pub recent_errors: VecDeque<String>,
}

impl PerformanceRecord {
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.successful_requests as f64 / self.total_requests as f64
        }
    }

    pub fn avg_latency_secs(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.total_latency_secs / self.total_requests as f64
        }
    }
}

/// Aggregated view of one provider's record, for callers and operators.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProviderStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub success_rate: f64,
    pub avg_latency_secs: f64,
    pub recent_errors: Vec<String>,
}

/// Thread-safe outcome counters, injected into the registry so tests can
/// supply a fresh instance per run.
#[derive(Debug, Default)]
pub struct PerformanceTracker {
    records: RwLock<HashMap<String, PerformanceRecord>>,
}

impl PerformanceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one generation attempt's outcome.
    pub fn record(&self, provider: &str, latency_secs: f64, success: bool, error: Option<&str>) {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        let record = records.entry(provider.to_string()).or_default();
        record.total_requests += 1;
        record.total_latency_secs += latency_secs;
        if success {
            record.successful_requests += 1;
        } else if let Some(message) = error {
            if record.recent_errors.len() == MAX_RECENT_ERRORS {
                record.recent_errors.pop_front();
            }
            record.recent_errors.push_back(message.to_string());
        }
        debug!(
            target: "teambonding::registry",
            provider,
            latency_secs,
            success,
            "recorded provider outcome"
        );
    }

    /// Per-provider statistics snapshot.
    pub fn stats(&self) -> HashMap<String, ProviderStats> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        records
            .iter()
            .map(|(name, record)| {
                (
                    name.clone(),
                    ProviderStats {
                        total_requests: record.total_requests,
                        successful_requests: record.successful_requests,
                        success_rate: record.success_rate(),
                        avg_latency_secs: record.avg_latency_secs(),
                        recent_errors: record.recent_errors.iter().cloned().collect(),
                    },
                )
            })
            .collect()
    }

    /// Provider with the best recent success rate among those within the
    /// latency bound. Ties break toward lower average latency.
    pub fn best_provider(&self, max_avg_latency_secs: f64) -> Option<String> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        records
            .iter()
            .filter(|(_, record)| {
                record.total_requests > 0 && record.avg_latency_secs() <= max_avg_latency_secs
            })
            .max_by(|(_, a), (_, b)| {
                a.success_rate()
                    .partial_cmp(&b.success_rate())
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(
                        b.avg_latency_secs()
                            .partial_cmp(&a.avg_latency_secs())
                            .unwrap_or(std::cmp::Ordering::Equal),
                    )
            })
            .map(|(name, _)| name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_stats() {
        let tracker = PerformanceTracker::new();
        tracker.record("openai", 1.5, true, None);
        tracker.record("openai", 2.5, false, Some("quota exceeded"));

        let stats = tracker.stats();
        let openai = &stats["openai"];
        assert_eq!(openai.total_requests, 2);
        assert_eq!(openai.successful_requests, 1);
        assert_eq!(openai.success_rate, 0.5);
        assert_eq!(openai.avg_latency_secs, 2.0);
        assert_eq!(openai.recent_errors, vec!["quota exceeded".to_string()]);
    }

    #[test]
    fn test_recent_errors_capped() {
        let tracker = PerformanceTracker::new();
        for i in 0..30 {
            tracker.record("openai", 1.0, false, Some(&format!("error {}", i)));
        }
        let stats = tracker.stats();
        let errors = &stats["openai"].recent_errors;
        assert_eq!(errors.len(), MAX_RECENT_ERRORS);
        assert_eq!(errors.first().unwrap(), "error 10");
        assert_eq!(errors.last().unwrap(), "error 29");
    }

    #[test]
    fn test_best_provider_prefers_success_rate() {
        let tracker = PerformanceTracker::new();
        tracker.record("openai", 1.0, true, None);
        tracker.record("openai", 1.0, false, Some("boom"));
        tracker.record("google", 3.0, true, None);

        assert_eq!(tracker.best_provider(20.0), Some("google".to_string()));
    }

    #[test]
    fn test_best_provider_respects_latency_bound() {
        let tracker = PerformanceTracker::new();
        tracker.record("openai", 25.0, true, None);
        assert_eq!(tracker.best_provider(20.0), None);
    }

    #[test]
    fn test_empty_tracker() {
        let tracker = PerformanceTracker::new();
        assert!(tracker.stats().is_empty());
        assert_eq!(tracker.best_provider(20.0), None);
    }
}
