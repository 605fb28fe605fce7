//! Service configuration
//!
//! Settings come from the environment. An optional JSON seed file provides
//! principals, hospital and department tags, and an alternative role
//! hierarchy for the demo server.

use crate::error::{AuthzError, Result};
use crate::hierarchy::{validate_assignment, HierarchyEntry, RoleHierarchy};
use crate::identity::{InMemoryPrincipalStore, PrincipalRecord};
use crate::region::{InMemoryRegionDirectory, RegionDescriptor};
use crate::upstream::DEFAULT_LOOKUP_TIMEOUT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Authorization service configuration
#[derive(Debug, Clone)]
pub struct AuthzConfig {
    /// HTTP port
    pub port: u16,

    /// HS256 signing secret
    pub jwt_secret: String,

    /// Expected token issuer
    pub jwt_issuer: String,

    /// Deadline for each principal or resource lookup
    pub lookup_timeout: Duration,

    /// Optional seed file
    pub seed_file: Option<PathBuf>,
}

impl Default for AuthzConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            jwt_secret: "dev-secret".to_string(),
            jwt_issuer: "healthgrid".to_string(),
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            seed_file: None,
        }
    }
}

impl AuthzConfig {
    /// Load configuration from environment variables
    ///
    /// `JWT_SECRET` is required; everything else falls back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(value) => value
                .parse()
                .map_err(|_| AuthzError::Config(format!("PORT must be a valid port, got '{}'", value)))?,
            None => defaults.port,
        };

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| AuthzError::Config("JWT_SECRET must be set".to_string()))?;

        let lookup_timeout = match lookup("LOOKUP_TIMEOUT_MS") {
            Some(value) => Duration::from_millis(value.parse().map_err(|_| {
                AuthzError::Config(format!(
                    "LOOKUP_TIMEOUT_MS must be a number of milliseconds, got '{}'",
                    value
                ))
            })?),
            None => defaults.lookup_timeout,
        };

        Ok(Self {
            port,
            jwt_secret,
            jwt_issuer: lookup("JWT_ISSUER").unwrap_or(defaults.jwt_issuer),
            lookup_timeout,
            seed_file: lookup("SEED_FILE").map(PathBuf::from),
        })
    }
}

/// Hospital entry in a seed file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalSeed {
    pub id: String,

    /// Stored location (state, district, sub-district)
    pub location: RegionDescriptor,
}

/// Department entry in a seed file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentSeed {
    pub id: String,
    pub hospital_id: String,
}

/// Seed data for the in-memory collaborators
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedData {
    #[serde(default)]
    pub principals: Vec<PrincipalRecord>,

    #[serde(default)]
    pub hospitals: Vec<HospitalSeed>,

    #[serde(default)]
    pub departments: Vec<DepartmentSeed>,

    /// Replaces the standard hierarchy when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hierarchy: Option<Vec<HierarchyEntry>>,
}

impl SeedData {
    /// Read and validate a seed file
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        Self::parse(&raw)
    }

    /// Parse and validate seed JSON
    pub fn parse(raw: &str) -> Result<Self> {
        let seed: SeedData = serde_json::from_str(raw)
            .map_err(|e| AuthzError::Config(format!("Invalid seed file: {}", e)))?;
        seed.validate()?;
        Ok(seed)
    }

    fn validate(&self) -> Result<()> {
        for principal in &self.principals {
            validate_assignment(principal.role, &principal.region).map_err(|e| {
                AuthzError::Config(format!("Principal '{}': {}", principal.id, e))
            })?;
        }

        for department in &self.departments {
            if !self.hospitals.iter().any(|h| h.id == department.hospital_id) {
                return Err(AuthzError::Config(format!(
                    "Department '{}' references unknown hospital '{}'",
                    department.id, department.hospital_id
                )));
            }
        }

        if let Some(entries) = &self.hierarchy {
            RoleHierarchy::from_entries(entries.clone())
                .map_err(|e| AuthzError::Config(format!("Hierarchy: {}", e)))?;
        }

        Ok(())
    }

    /// Hierarchy to serve: the seeded table, or the standard one
    pub fn role_hierarchy(&self) -> Result<RoleHierarchy> {
        match &self.hierarchy {
            Some(entries) => RoleHierarchy::from_entries(entries.clone()),
            None => Ok(RoleHierarchy::standard()),
        }
    }

    /// Load principals and resource tags into the in-memory collaborators
    pub async fn apply(&self, principals: &InMemoryPrincipalStore, directory: &InMemoryRegionDirectory) {
        for principal in &self.principals {
            principals.put(principal.clone()).await;
        }
        for hospital in &self.hospitals {
            directory.put_hospital(hospital.id.clone(), hospital.location.clone()).await;
        }
        for department in &self.departments {
            directory
                .put_department(department.id.clone(), department.hospital_id.clone())
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::PrincipalStore;
    use crate::region::RegionDirectory;
    use crate::types::Role;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    const SEED: &str = r#"{
        "principals": [
            {"id": "root", "role": "super-admin"},
            {"id": "district-a", "role": "district-admin", "region": {"state": "X", "district": "A"}}
        ],
        "hospitals": [
            {"id": "h1", "location": {"state": "X", "district": "A", "subDistrict": "S1"}}
        ],
        "departments": [
            {"id": "d1", "hospitalId": "h1"}
        ]
    }"#;

    #[test]
    fn test_from_lookup_defaults() {
        let config = AuthzConfig::from_lookup(env(&[("JWT_SECRET", "s3cret")])).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.jwt_issuer, "healthgrid");
        assert_eq!(config.lookup_timeout, DEFAULT_LOOKUP_TIMEOUT);
        assert!(config.seed_file.is_none());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = AuthzConfig::from_lookup(env(&[
            ("JWT_SECRET", "s3cret"),
            ("PORT", "9000"),
            ("JWT_ISSUER", "issuer"),
            ("LOOKUP_TIMEOUT_MS", "250"),
            ("SEED_FILE", "/tmp/seed.json"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.jwt_issuer, "issuer");
        assert_eq!(config.lookup_timeout, Duration::from_millis(250));
        assert_eq!(config.seed_file, Some(PathBuf::from("/tmp/seed.json")));
    }

    #[test]
    fn test_from_lookup_errors() {
        assert!(matches!(
            AuthzConfig::from_lookup(env(&[])),
            Err(AuthzError::Config(_))
        ));
        assert!(matches!(
            AuthzConfig::from_lookup(env(&[("JWT_SECRET", "s"), ("PORT", "http")])),
            Err(AuthzError::Config(_))
        ));
        assert!(matches!(
            AuthzConfig::from_lookup(env(&[("JWT_SECRET", "s"), ("LOOKUP_TIMEOUT_MS", "-1")])),
            Err(AuthzError::Config(_))
        ));
    }

    #[test]
    fn test_seed_rejects_incomplete_assignment() {
        let raw = r#"{"principals": [{"id": "h", "role": "hospital-admin", "region": {"state": "X"}}]}"#;
        assert!(matches!(SeedData::parse(raw), Err(AuthzError::Config(_))));
    }

    #[test]
    fn test_seed_rejects_dangling_department() {
        let raw = r#"{"departments": [{"id": "d1", "hospitalId": "nope"}]}"#;
        assert!(SeedData::parse(raw).is_err());
    }

    #[tokio::test]
    async fn test_load_and_apply_seed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SEED.as_bytes()).unwrap();

        let seed = SeedData::load(file.path()).await.unwrap();
        assert_eq!(seed.principals.len(), 2);
        assert_eq!(seed.role_hierarchy().unwrap().administrable_roles(Role::SuperAdmin).len(), 5);

        let principals = InMemoryPrincipalStore::new();
        let directory = InMemoryRegionDirectory::new();
        seed.apply(&principals, &directory).await;

        let found = principals.find_principal("district-a").await.unwrap().unwrap();
        assert_eq!(found.role, Role::DistrictAdmin);
        assert_eq!(directory.department_parent("d1").await.unwrap().as_deref(), Some("h1"));
    }

    #[tokio::test]
    async fn test_missing_seed_file_is_io_error() {
        let err = SeedData::load(Path::new("/definitely/not/here.json")).await.unwrap_err();
        assert!(matches!(err, AuthzError::Io(_)));
    }
}
