use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, info, warn};

use super::adapter::ProviderAdapter;
use super::anthropic::AnthropicAdapter;
use super::gemini::GeminiAdapter;
use super::openai::OpenAiAdapter;
use super::performance::{PerformanceTracker, ProviderStats};
use crate::error::{PlanError, Result};

/// Average-latency bound (seconds) a provider must stay under to win
/// performance-based selection.
const ACCEPTABLE_AVG_LATENCY_SECS: f64 = 20.0;

/// Assignment granularity for deterministic A/B traffic splitting.
const AB_SPLIT_GRANULARITY: u64 = 100;

/// How the caller wants a provider picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderChoice {
    /// Policy-based: default provider, then performance, then anything up
    Auto,
    /// The named provider or nothing
    Explicit(String),
}

#[derive(Debug)]
struct ProviderEntry {
    adapter: Arc<dyn ProviderAdapter>,
    available: bool,
}

#[derive(Debug, Default)]
struct AbArm {
    requests: u64,
    successes: u64,
}

#[derive(Debug)]
struct AbTest {
    split: Vec<(String, f64)>,
    assignments: u64,
    results: HashMap<String, AbArm>,
}

/// Aggregated A/B test outcomes per arm.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AbArmStats {
    pub requests: u64,
    pub successes: u64,
    pub success_rate: f64,
}

/// Snapshot of one A/B test's configuration and outcomes.
#[derive(Debug, Clone, Serialize)]
pub struct AbTestResults {
    pub test_name: String,
    pub traffic_split: Vec<(String, f64)>,
    pub results: HashMap<String, AbArmStats>,
}

/// Holds every configured adapter plus rolling performance stats, and
/// exposes the selection policies.
///
/// The performance tracker is injected, never a module-level singleton, so
/// tests get a fresh instance per run.
#[derive(Debug)]
pub struct ProviderRegistry {
    adapters: RwLock<HashMap<String, ProviderEntry>>,
    default_provider: RwLock<Option<String>>,
    performance: PerformanceTracker,
    ab_tests: Mutex<HashMap<String, AbTest>>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new(PerformanceTracker::new())
    }
}

impl ProviderRegistry {
    pub fn new(performance: PerformanceTracker) -> Self {
        Self {
            adapters: RwLock::new(HashMap::new()),
            default_provider: RwLock::new(None),
            performance,
            ab_tests: Mutex::new(HashMap::new()),
        }
    }

    /// Build a registry from environment configuration.
    ///
    /// Registers an adapter for every vendor whose API key is present
    /// (`OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, `GOOGLE_AI_API_KEY`) and
    /// honors `DEFAULT_AI_PROVIDER` when it names a registered provider.
    /// An empty registry is not an error here; selection reports
    /// `NoProviderAvailable` and the service degrades to fallback plans.
    pub fn from_env() -> Self {
        let registry = Self::default();

        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                registry.register(Arc::new(OpenAiAdapter::new(key)));
            }
        }
        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            if !key.is_empty() {
                registry.register(Arc::new(AnthropicAdapter::new(key)));
            }
        }
        if let Ok(key) = std::env::var("GOOGLE_AI_API_KEY") {
            if !key.is_empty() {
                registry.register(Arc::new(GeminiAdapter::new(key)));
            }
        }

        if let Ok(name) = std::env::var("DEFAULT_AI_PROVIDER") {
            if registry.has_provider(&name) {
                registry.set_default_provider(&name);
            } else if !name.is_empty() {
                warn!(
                    target: "teambonding::registry",
                    provider = %name,
                    "DEFAULT_AI_PROVIDER names an unregistered provider, ignoring"
                );
            }
        }

        info!(
            target: "teambonding::registry",
            providers = ?registry.provider_names(),
            "provider registry assembled from environment"
        );
        registry
    }

    /// Register an adapter under its own name, marked available.
    pub fn register(&self, adapter: Arc<dyn ProviderAdapter>) {
        let name = adapter.name().to_string();
        let mut adapters = self.adapters.write().unwrap_or_else(|e| e.into_inner());
        adapters.insert(
            name,
            ProviderEntry {
                adapter,
                available: true,
            },
        );
    }

    pub fn has_provider(&self, name: &str) -> bool {
        let adapters = self.adapters.read().unwrap_or_else(|e| e.into_inner());
        adapters.contains_key(name)
    }

    /// Registered provider names, sorted for determinism.
    pub fn provider_names(&self) -> Vec<String> {
        let adapters = self.adapters.read().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<String> = adapters.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn set_default_provider(&self, name: &str) {
        let mut default = self
            .default_provider
            .write()
            .unwrap_or_else(|e| e.into_inner());
        *default = Some(name.to_string());
    }

    /// Mark a provider up or down for selection purposes.
    pub fn set_available(&self, name: &str, available: bool) {
        let mut adapters = self.adapters.write().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = adapters.get_mut(name) {
            entry.available = available;
        }
    }

    /// Select a provider per the requested policy.
    ///
    /// `Auto`: configured default if available, else the best performer
    /// within the latency bound, else any available provider. Never returns
    /// a provider marked unavailable; `NoProviderAvailable` when nothing
    /// qualifies.
    pub fn select(&self, choice: &ProviderChoice) -> Result<Arc<dyn ProviderAdapter>> {
        let adapters = self.adapters.read().unwrap_or_else(|e| e.into_inner());

        match choice {
            ProviderChoice::Explicit(name) => match adapters.get(name) {
                Some(entry) if entry.available => Ok(Arc::clone(&entry.adapter)),
                Some(_) => {
                    warn!(
                        target: "teambonding::registry",
                        provider = %name,
                        "explicitly requested provider is marked unavailable"
                    );
                    Err(PlanError::NoProviderAvailable)
                }
                None => {
                    warn!(
                        target: "teambonding::registry",
                        provider = %name,
                        "explicitly requested provider is not registered"
                    );
                    Err(PlanError::NoProviderAvailable)
                }
            },
            ProviderChoice::Auto => {
                let default = self
                    .default_provider
                    .read()
                    .unwrap_or_else(|e| e.into_inner())
                    .clone();
                if let Some(name) = default {
                    if let Some(entry) = adapters.get(&name) {
                        if entry.available {
                            return Ok(Arc::clone(&entry.adapter));
                        }
                    }
                }

                if let Some(name) = self.performance.best_provider(ACCEPTABLE_AVG_LATENCY_SECS) {
                    if let Some(entry) = adapters.get(&name) {
                        if entry.available {
                            debug!(
                                target: "teambonding::registry",
                                provider = %name,
                                "selected best-performing provider"
                            );
                            return Ok(Arc::clone(&entry.adapter));
                        }
                    }
                }

                let mut available: Vec<&String> = adapters
                    .iter()
                    .filter(|(_, entry)| entry.available)
                    .map(|(name, _)| name)
                    .collect();
                available.sort();
                available
                    .first()
                    .map(|name| Arc::clone(&adapters[*name].adapter))
                    .ok_or(PlanError::NoProviderAvailable)
            }
        }
    }

    /// Record one generation attempt's outcome against the rolling counters.
    pub fn record_outcome(
        &self,
        provider: &str,
        latency_secs: f64,
        success: bool,
        error: Option<&str>,
    ) {
        self.performance.record(provider, latency_secs, success, error);
    }

    /// Per-provider performance statistics snapshot.
    pub fn performance_stats(&self) -> HashMap<String, ProviderStats> {
        self.performance.stats()
    }

    /// Configure an A/B test over the given providers.
    ///
    /// A missing split means equal weights. Weights are normalized so a
    /// split that does not sum to 1 still behaves proportionally.
    pub fn setup_ab_test(
        &self,
        test_name: &str,
        providers: &[String],
        traffic_split: Option<HashMap<String, f64>>,
    ) -> Result<()> {
        if providers.is_empty() {
            return Err(PlanError::Config(format!(
                "A/B test '{}' needs at least one provider",
                test_name
            )));
        }

        let raw: Vec<(String, f64)> = match traffic_split {
            Some(split) => providers
                .iter()
                .map(|name| (name.clone(), split.get(name).copied().unwrap_or(0.0)))
                .collect(),
            None => {
                let weight = 1.0 / providers.len() as f64;
                providers.iter().map(|name| (name.clone(), weight)).collect()
            }
        };

        let total: f64 = raw.iter().map(|(_, weight)| weight).sum();
        if total <= 0.0 {
            return Err(PlanError::Config(format!(
                "A/B test '{}' traffic split must have positive total weight",
                test_name
            )));
        }
        let split = raw
            .into_iter()
            .map(|(name, weight)| (name, weight / total))
            .collect();

        let mut tests = self.ab_tests.lock().unwrap_or_else(|e| e.into_inner());
        tests.insert(
            test_name.to_string(),
            AbTest {
                split,
                assignments: 0,
                results: providers
                    .iter()
                    .map(|name| (name.clone(), AbArm::default()))
                    .collect(),
            },
        );
        Ok(())
    }

    /// Assign a provider for one invocation of the named test.
    ///
    /// Deterministic weighted rotation: an internal per-test counter walks
    /// the cumulative split, so the observed traffic matches the configured
    /// weights exactly over each rotation window. Safe under concurrent
    /// calls for the same test name.
    pub fn ab_test_assign(&self, test_name: &str) -> Option<String> {
        let mut tests = self.ab_tests.lock().unwrap_or_else(|e| e.into_inner());
        let test = tests.get_mut(test_name)?;

        let slot = test.assignments % AB_SPLIT_GRANULARITY;
        test.assignments += 1;
        let position = (slot as f64 + 0.5) / AB_SPLIT_GRANULARITY as f64;

        let mut cumulative = 0.0;
        for (name, weight) in &test.split {
            cumulative += weight;
            if position <= cumulative {
                return Some(name.clone());
            }
        }
        test.split.first().map(|(name, _)| name.clone())
    }

    /// Record the outcome of one A/B-assigned invocation.
    pub fn record_ab_test_result(&self, test_name: &str, provider: &str, success: bool) {
        let mut tests = self.ab_tests.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(test) = tests.get_mut(test_name) {
            let arm = test.results.entry(provider.to_string()).or_default();
            arm.requests += 1;
            if success {
                arm.successes += 1;
            }
        }
    }

    /// Aggregated outcomes for the named test.
    pub fn ab_test_results(&self, test_name: &str) -> Option<AbTestResults> {
        let tests = self.ab_tests.lock().unwrap_or_else(|e| e.into_inner());
        let test = tests.get(test_name)?;
        Some(AbTestResults {
            test_name: test_name.to_string(),
            traffic_split: test.split.clone(),
            results: test
                .results
                .iter()
                .map(|(name, arm)| {
                    let success_rate = if arm.requests == 0 {
                        0.0
                    } else {
                        arm.successes as f64 / arm.requests as f64
                    };
                    (
                        name.clone(),
                        AbArmStats {
                            requests: arm.requests,
                            successes: arm.successes,
                            success_rate,
                        },
                    )
                })
                .collect(),
        })
    }
}
