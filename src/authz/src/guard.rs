//! Request-level access guard
//!
//! Wraps the pure [`DecisionEngine`] with identity resolution, metrics and
//! logging. One guard is shared by every request handler.

use crate::engine::{Decision, DecisionEngine, MetricsCollector};
use crate::error::{AuthzError, Result};
use crate::hierarchy::validate_assignment;
use crate::identity::{extract_bearer, IdentityResolver};
use crate::scope::ScopeFilter;
use crate::types::{Action, Actor, Target};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Authenticates callers and enforces decisions
#[derive(Clone)]
pub struct AccessGuard {
    identity: IdentityResolver,
    engine: DecisionEngine,
    metrics: Arc<MetricsCollector>,
}

impl AccessGuard {
    pub fn new(identity: IdentityResolver, engine: DecisionEngine, metrics: Arc<MetricsCollector>) -> Self {
        Self {
            identity,
            engine,
            metrics,
        }
    }

    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    pub fn metrics(&self) -> &Arc<MetricsCollector> {
        &self.metrics
    }

    /// Resolve the actor behind an `Authorization` header value
    pub async fn authenticate(&self, header: Option<&str>) -> Result<Actor> {
        let outcome = match extract_bearer(header) {
            Ok(credential) => self.identity.resolve(credential).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(actor) => {
                debug!(actor = %actor.id, role = %actor.role, "Authenticated");
                Ok(actor)
            }
            Err(e) => {
                self.record_failure(&e).await;
                Err(e)
            }
        }
    }

    /// Decide and enforce: a deny surfaces as the matching error
    pub async fn authorize(&self, actor: &Actor, action: Action, target: &Target) -> Result<()> {
        let start = Instant::now();

        if let Err(e) = validate_payload(action, target) {
            self.record_failure(&e).await;
            return Err(e);
        }

        let decision = self.engine.authorize(actor, action, target);
        self.metrics.record_decision(&decision).await;
        self.metrics.record_latency(start.elapsed()).await;

        match decision {
            Decision::Allow => {
                debug!(
                    actor = %actor.id,
                    role = %actor.role,
                    %action,
                    kind = %target.kind,
                    "Access allowed"
                );
            }
            Decision::Deny(reason) => {
                info!(
                    actor = %actor.id,
                    role = %actor.role,
                    %action,
                    kind = %target.kind,
                    region = %target.region,
                    reason = reason.code(),
                    "Access denied: {}",
                    reason
                );
            }
        }

        decision.into_result()
    }

    /// Scope filter for the actor's list queries
    pub fn scope(&self, actor: &Actor) -> ScopeFilter {
        let filter = self.engine.scope_filter(actor);
        if matches!(filter, ScopeFilter::Nothing) {
            info!(actor = %actor.id, role = %actor.role, "Actor has no region; scope is empty");
        }
        filter
    }

    async fn record_failure(&self, error: &AuthzError) {
        match error {
            AuthzError::UpstreamUnavailable(msg) => warn!("Upstream failure: {}", msg),
            other => info!(code = other.code(), "Request rejected: {}", other),
        }
        self.metrics.record_failure(error).await;
    }
}

/// Shape checks that precede the decision
///
/// A user being created, moved or re-roled must carry every region level its
/// (new) role requires.
fn validate_payload(action: Action, target: &Target) -> Result<()> {
    target.validate()?;

    if !target.is_user_management(action) || action == Action::Delete {
        return Ok(());
    }

    if let Some(role) = target.reassigned_role.or(target.role) {
        let region = target.relocation.as_ref().unwrap_or(&target.region);
        validate_assignment(role, region)?;
    }

    Ok(())
}
