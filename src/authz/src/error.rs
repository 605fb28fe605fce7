//! Error types for the authorization core

use crate::region::RegionLevel;
use crate::types::Role;
use thiserror::Error;

/// Authorization core errors
///
/// The first six variants form the authorization taxonomy. None of them is
/// retried internally; only [`AuthzError::UpstreamUnavailable`] may be retried
/// by a caller.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// Credential absent, malformed, expired, or pointing at a missing principal
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Credential issued before the principal's last credential change
    #[error("Stale credential for principal {principal}: please log in again")]
    StaleCredential { principal: String },

    /// Actor tried to create, edit or assign a role it may not administer
    #[error("Role escalation: {actor} may not administer {target}")]
    RoleEscalation { actor: Role, target: Role },

    /// Target region lies outside the actor's region
    #[error("Out of region: no access at {level} level")]
    OutOfRegion { level: RegionLevel },

    /// Non-top-level actor without any assigned region
    #[error("Misconfigured actor: {role} requires an assigned region")]
    Misconfigured { role: Role },

    /// Identity or resource lookup failed or timed out
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AuthzError {
    /// HTTP status the boundary layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated(_) | Self::StaleCredential { .. } => 401,
            Self::RoleEscalation { .. } | Self::OutOfRegion { .. } | Self::Misconfigured { .. } => 403,
            Self::UpstreamUnavailable(_) => 503,
            Self::InvalidInput(_) => 400,
            Self::Config(_) | Self::Internal(_) | Self::Io(_) => 500,
        }
    }

    /// Short machine-readable code used in error bodies and metrics labels
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "unauthenticated",
            Self::StaleCredential { .. } => "stale_credential",
            Self::RoleEscalation { .. } => "role_escalation",
            Self::OutOfRegion { .. } => "out_of_region",
            Self::Misconfigured { .. } => "misconfigured",
            Self::UpstreamUnavailable(_) => "upstream_unavailable",
            Self::InvalidInput(_) => "invalid_input",
            Self::Config(_) => "config_error",
            Self::Internal(_) => "internal_error",
            Self::Io(_) => "io_error",
        }
    }

    /// Whether a caller may re-run the check
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable(_))
    }
}

/// Result type for authorization operations
pub type Result<T> = std::result::Result<T, AuthzError>;
