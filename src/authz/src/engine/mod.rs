//! Authorization decision engine
//!
//! A pure, synchronous decision procedure over the role hierarchy table and
//! the region matcher. It never suspends, never performs I/O and never logs;
//! orchestration (identity lookup, metrics, tracing) lives in
//! [`crate::guard::AccessGuard`].
//!
//! # Rule order
//!
//! ```text
//! top-level role ───────────────────────────────► Allow
//! empty region (non-top-level) ─────────────────► Deny(Misconfigured)
//! user management, role not administrable ──────► Deny(RoleEscalation)
//! target region (or relocation) out of region ──► Deny(OutOfRegion)
//! otherwise ────────────────────────────────────► Allow
//! ```

pub mod decision;
pub mod metrics;

pub use decision::{Decision, DenyReason};
pub use metrics::{EngineMetrics, MetricsCollector};

use crate::hierarchy::RoleHierarchy;
use crate::region::{match_region, RegionDescriptor, RegionMatch};
use crate::scope::{scope_filter, ScopeFilter};
use crate::types::{Action, Actor, Role, Target};

use std::sync::Arc;

/// Decision engine sharing one immutable role hierarchy
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    hierarchy: Arc<RoleHierarchy>,
}

impl DecisionEngine {
    /// Create an engine over a shared hierarchy table
    pub fn new(hierarchy: Arc<RoleHierarchy>) -> Self {
        Self { hierarchy }
    }

    /// Engine over the canonical hierarchy
    pub fn standard() -> Self {
        Self::new(Arc::new(RoleHierarchy::standard()))
    }

    pub fn hierarchy(&self) -> &RoleHierarchy {
        &self.hierarchy
    }

    /// Decide whether `actor` may perform `action` on `target`
    ///
    /// The actor's region is always the reference side; the target's region
    /// (as supplied by the request) is the candidate.
    pub fn authorize(&self, actor: &Actor, action: Action, target: &Target) -> Decision {
        if actor.role.is_top_level() {
            return Decision::Allow;
        }

        if actor.region.is_empty() {
            return Decision::Deny(DenyReason::Misconfigured { role: actor.role });
        }

        if target.is_user_management(action) {
            // A user target without a role is treated as the broadest role
            let current = target.role.unwrap_or(Role::SuperAdmin);
            for role in std::iter::once(current).chain(target.reassigned_role) {
                if !self.hierarchy.can_administer(actor.role, role) {
                    return Decision::Deny(DenyReason::RoleEscalation {
                        actor: actor.role,
                        target: role,
                    });
                }
            }
        }

        let regions = std::iter::once(&target.region).chain(target.relocation.as_ref());
        for region in regions {
            if let Some(reason) = self.region_denial(actor, region) {
                return Decision::Deny(reason);
            }
        }

        Decision::Allow
    }

    /// Filter restricting bulk reads to the actor's region
    pub fn scope_filter(&self, actor: &Actor) -> ScopeFilter {
        scope_filter(actor)
    }

    fn region_denial(&self, actor: &Actor, region: &RegionDescriptor) -> Option<DenyReason> {
        match match_region(actor.role, &actor.region, region) {
            RegionMatch::Match => None,
            RegionMatch::Mismatch(level) => Some(DenyReason::OutOfRegion { level }),
            RegionMatch::Unassigned => Some(DenyReason::Misconfigured { role: actor.role }),
        }
    }
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::standard()
    }
}
