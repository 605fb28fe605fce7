//! Prometheus metrics collection for authorization observability

use super::decision::{Decision, DenyReason};
use crate::error::AuthzError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Authorization metrics snapshot
#[derive(Debug, Clone, Default)]
pub struct EngineMetrics {
    /// Total number of authorization decisions
    pub total_decisions: u64,

    /// Number of allowed decisions
    pub allowed_decisions: u64,

    /// Denies by reason
    pub denied_role_escalation: u64,
    pub denied_out_of_region: u64,
    pub denied_misconfigured: u64,

    /// Rejected credentials (unauthenticated or stale)
    pub authentication_failures: u64,

    /// Identity or resource store failures
    pub upstream_failures: u64,

    /// Latency percentiles
    pub latency_p50_ms: f64,
    pub latency_p90_ms: f64,
    pub latency_p99_ms: f64,

    /// Average latency
    pub avg_latency_ms: f64,
}

impl EngineMetrics {
    pub fn denied_decisions(&self) -> u64 {
        self.denied_role_escalation + self.denied_out_of_region + self.denied_misconfigured
    }
}

/// Metrics collector with Prometheus-compatible export
pub struct MetricsCollector {
    /// Metrics data
    metrics: Arc<RwLock<EngineMetrics>>,

    /// Latency samples for percentile calculation
    latency_samples: Arc<RwLock<Vec<f64>>>,

    /// Maximum samples to keep
    max_samples: usize,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            metrics: Arc::new(RwLock::new(EngineMetrics::default())),
            latency_samples: Arc::new(RwLock::new(Vec::with_capacity(10_000))),
            max_samples: 10_000,
        }
    }

    /// Record an authorization decision
    pub async fn record_decision(&self, decision: &Decision) {
        let mut metrics = self.metrics.write().await;
        metrics.total_decisions += 1;

        match decision {
            Decision::Allow => metrics.allowed_decisions += 1,
            Decision::Deny(DenyReason::RoleEscalation { .. }) => metrics.denied_role_escalation += 1,
            Decision::Deny(DenyReason::OutOfRegion { .. }) => metrics.denied_out_of_region += 1,
            Decision::Deny(DenyReason::Misconfigured { .. }) => metrics.denied_misconfigured += 1,
        }
    }

    /// Record a failure that happened before a decision could be made
    pub async fn record_failure(&self, error: &AuthzError) {
        let mut metrics = self.metrics.write().await;
        match error {
            AuthzError::Unauthenticated(_) | AuthzError::StaleCredential { .. } => {
                metrics.authentication_failures += 1
            }
            AuthzError::UpstreamUnavailable(_) => metrics.upstream_failures += 1,
            _ => {}
        }
    }

    /// Record request latency
    ///
    /// Only the sample buffer is touched; percentiles are computed when a
    /// snapshot is taken.
    pub async fn record_latency(&self, latency: Duration) {
        let latency_ms = latency.as_secs_f64() * 1000.0;

        let mut samples = self.latency_samples.write().await;
        samples.push(latency_ms);

        // Keep only recent samples
        if samples.len() > self.max_samples {
            samples.drain(0..1_000);
        }
    }

    /// Get current metrics snapshot
    ///
    /// Each lock is released before the next one is taken.
    pub async fn get_metrics(&self) -> EngineMetrics {
        let mut snapshot = self.metrics.read().await.clone();

        let mut sorted = self.latency_samples.read().await.clone();
        if sorted.is_empty() {
            return snapshot;
        }
        sorted.sort_by(|a, b| a.total_cmp(b));

        snapshot.avg_latency_ms = sorted.iter().sum::<f64>() / sorted.len() as f64;
        snapshot.latency_p50_ms = Self::percentile(&sorted, 0.50);
        snapshot.latency_p90_ms = Self::percentile(&sorted, 0.90);
        snapshot.latency_p99_ms = Self::percentile(&sorted, 0.99);
        snapshot
    }

    /// Export metrics in Prometheus format
    pub async fn export_prometheus(&self) -> String {
        let metrics = self.get_metrics().await;

        format!(
            r#"# HELP authz_decisions_total Total number of authorization decisions
# TYPE authz_decisions_total counter
authz_decisions_total {}

# HELP authz_allowed_total Number of allowed decisions
# TYPE authz_allowed_total counter
authz_allowed_total {}

# HELP authz_denied_total Number of denied decisions by reason
# TYPE authz_denied_total counter
authz_denied_total{{reason="role_escalation"}} {}
authz_denied_total{{reason="out_of_region"}} {}
authz_denied_total{{reason="misconfigured"}} {}

# HELP authz_authentication_failures_total Rejected credentials
# TYPE authz_authentication_failures_total counter
authz_authentication_failures_total {}

# HELP authz_upstream_failures_total Identity or resource store failures
# TYPE authz_upstream_failures_total counter
authz_upstream_failures_total {}

# HELP authz_latency_seconds Request latency percentiles
# TYPE authz_latency_seconds summary
authz_latency_seconds{{quantile="0.5"}} {}
authz_latency_seconds{{quantile="0.9"}} {}
authz_latency_seconds{{quantile="0.99"}} {}
"#,
            metrics.total_decisions,
            metrics.allowed_decisions,
            metrics.denied_role_escalation,
            metrics.denied_out_of_region,
            metrics.denied_misconfigured,
            metrics.authentication_failures,
            metrics.upstream_failures,
            metrics.latency_p50_ms / 1000.0,
            metrics.latency_p90_ms / 1000.0,
            metrics.latency_p99_ms / 1000.0,
        )
    }

    /// Calculate percentile from sorted data
    fn percentile(sorted: &[f64], p: f64) -> f64 {
        if sorted.is_empty() {
            return 0.0;
        }

        let idx = ((sorted.len() as f64) * p) as usize;
        let idx = idx.min(sorted.len() - 1);
        sorted[idx]
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
