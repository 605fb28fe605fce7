//! HS256 bearer tokens

use super::{CredentialClaims, CredentialVerifier};
use crate::error::{AuthzError, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wire claims, a superset of [`CredentialClaims`]
#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    sub: String,
    iat: i64,
    exp: i64,
    iss: String,
    jti: String,
}

/// Verifies (and, for tooling, issues) HS256 tokens bound to one issuer
#[derive(Clone)]
pub struct JwtVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
}

impl JwtVerifier {
    pub fn new(secret: &str, issuer: impl Into<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
        }
    }

    /// Issue a token for `principal` valid for `ttl` from now
    pub fn issue_token(&self, principal: &str, ttl: Duration) -> Result<String> {
        self.issue_token_at(principal, Utc::now(), ttl)
    }

    /// Issue a token with an explicit issued-at instant
    pub fn issue_token_at(
        &self,
        principal: &str,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String> {
        let claims = TokenClaims {
            sub: principal.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
            iss: self.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthzError::Internal(format!("Failed to sign token: {}", e)))
    }
}

impl CredentialVerifier for JwtVerifier {
    fn verify(&self, credential: &str) -> Result<CredentialClaims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        let data = decode::<TokenClaims>(credential, &self.decoding_key, &validation)
            .map_err(|e| AuthzError::Unauthenticated(format!("Invalid credential: {}", e)))?;

        Ok(CredentialClaims {
            sub: data.claims.sub,
            iat: data.claims.iat,
            exp: data.claims.exp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify() {
        let verifier = JwtVerifier::new("test_secret", "healthgrid");
        let token = verifier.issue_token("u1", Duration::hours(1)).unwrap();

        let claims = verifier.verify(&token).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_wrong_secret() {
        let issuer = JwtVerifier::new("secret1", "healthgrid");
        let verifier = JwtVerifier::new("secret2", "healthgrid");
        let token = issuer.issue_token("u1", Duration::hours(1)).unwrap();

        assert!(matches!(
            verifier.verify(&token),
            Err(AuthzError::Unauthenticated(_))
        ));
    }

    #[test]
    fn test_wrong_issuer() {
        let issuer = JwtVerifier::new("secret", "someone-else");
        let verifier = JwtVerifier::new("secret", "healthgrid");
        let token = issuer.issue_token("u1", Duration::hours(1)).unwrap();

        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_expired_token() {
        let verifier = JwtVerifier::new("secret", "healthgrid");
        let token = verifier
            .issue_token_at("u1", Utc::now() - Duration::hours(2), Duration::hours(1))
            .unwrap();

        assert!(matches!(
            verifier.verify(&token),
            Err(AuthzError::Unauthenticated(_))
        ));
    }

    #[test]
    fn test_malformed_token() {
        let verifier = JwtVerifier::new("secret", "healthgrid");
        assert!(verifier.verify("not-a-token").is_err());
    }
}
