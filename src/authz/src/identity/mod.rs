//! Actor identity resolution
//!
//! Turns a bearer credential into an [`Actor`](crate::types::Actor), reading
//! the principal's role and region fresh from the principal store on every
//! request. A credential issued before the principal's last credential
//! change is rejected as stale, so role or region edits take effect on the
//! next request.

mod jwt;
mod resolver;
mod store;

pub use jwt::JwtVerifier;
pub use resolver::IdentityResolver;
pub use store::{InMemoryPrincipalStore, PrincipalRecord, PrincipalStore};

use crate::error::{AuthzError, Result};
use crate::types::PrincipalId;
use serde::{Deserialize, Serialize};

/// Claims every verified credential carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialClaims {
    /// Principal the credential was issued to
    pub sub: PrincipalId,

    /// Issued-at, seconds since the epoch
    pub iat: i64,

    /// Expiry, seconds since the epoch
    pub exp: i64,
}

/// Black-box credential verification (signature, expiry, issuer)
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, credential: &str) -> Result<CredentialClaims>;
}

/// Extract the credential from an `Authorization` header value
///
/// Only the `Bearer <token>` form is accepted.
pub fn extract_bearer(header: Option<&str>) -> Result<&str> {
    let header = header
        .ok_or_else(|| AuthzError::Unauthenticated("Missing authorization header".to_string()))?;

    match header.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AuthzError::Unauthenticated(
            "Authorization header must use the Bearer scheme".to_string(),
        )),
    }
}
