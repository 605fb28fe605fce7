//! Credential to actor resolution

use super::{CredentialVerifier, PrincipalStore};
use crate::error::{AuthzError, Result};
use crate::types::Actor;
use crate::upstream::{bounded, DEFAULT_LOOKUP_TIMEOUT};
use std::sync::Arc;
use std::time::Duration;

/// Resolves credentials against a verifier and a principal store
#[derive(Clone)]
pub struct IdentityResolver {
    verifier: Arc<dyn CredentialVerifier>,
    store: Arc<dyn PrincipalStore>,
    timeout: Duration,
}

impl IdentityResolver {
    pub fn new(verifier: Arc<dyn CredentialVerifier>, store: Arc<dyn PrincipalStore>) -> Self {
        Self::with_timeout(verifier, store, DEFAULT_LOOKUP_TIMEOUT)
    }

    pub fn with_timeout(
        verifier: Arc<dyn CredentialVerifier>,
        store: Arc<dyn PrincipalStore>,
        timeout: Duration,
    ) -> Self {
        Self {
            verifier,
            store,
            timeout,
        }
    }

    /// Resolve a credential into the actor it currently speaks for
    ///
    /// Role and region always come from the store, never from the token.
    pub async fn resolve(&self, credential: &str) -> Result<Actor> {
        let claims = self.verifier.verify(credential)?;

        let record = bounded("principal", self.timeout, self.store.find_principal(&claims.sub))
            .await?
            .ok_or_else(|| {
                AuthzError::Unauthenticated(format!("Unknown principal '{}'", claims.sub))
            })?;

        if !record.active {
            return Err(AuthzError::Unauthenticated(format!(
                "Principal '{}' is deactivated",
                record.id
            )));
        }

        // Whole seconds on both sides: a token minted in the same second survives
        if let Some(changed_at) = record.credentials_changed_at {
            if claims.iat < changed_at.timestamp() {
                return Err(AuthzError::StaleCredential {
                    principal: record.id,
                });
            }
        }

        Ok(Actor::new(record.id, record.role, record.region))
    }
}
