//! Authorization decision types

use crate::error::{AuthzError, Result};
use crate::region::RegionLevel;
use crate::types::Role;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a request was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum DenyReason {
    /// Actor may not administer the target (or reassigned) role
    RoleEscalation { actor: Role, target: Role },

    /// Target region differs from the actor's at `level`
    OutOfRegion { level: RegionLevel },

    /// Non-top-level actor has no assigned region
    Misconfigured { role: Role },
}

impl DenyReason {
    /// Machine-readable code, shared with [`AuthzError::code`]
    pub fn code(&self) -> &'static str {
        match self {
            DenyReason::RoleEscalation { .. } => "role_escalation",
            DenyReason::OutOfRegion { .. } => "out_of_region",
            DenyReason::Misconfigured { .. } => "misconfigured",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", AuthzError::from(*self))
    }
}

impl From<DenyReason> for AuthzError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::RoleEscalation { actor, target } => AuthzError::RoleEscalation { actor, target },
            DenyReason::OutOfRegion { level } => AuthzError::OutOfRegion { level },
            DenyReason::Misconfigured { role } => AuthzError::Misconfigured { role },
        }
    }
}

/// Result of an authorization check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Decision::Allow => None,
            Decision::Deny(reason) => Some(*reason),
        }
    }

    /// Enforce the decision: a deny becomes the matching [`AuthzError`]
    pub fn into_result(self) -> Result<()> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(reason.into()),
        }
    }
}
