//! Region tag resolution for resources tagged through an ownership chain
//!
//! Hospitals store their location directly. A department's tag is its parent
//! hospital's tag narrowed by the department id. Tags are read, never
//! recomputed and written back.

use super::types::{RegionDescriptor, RegionLevel};
use crate::error::{AuthzError, Result};
use crate::upstream::{bounded, DEFAULT_LOOKUP_TIMEOUT};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Lookup collaborator backed by the resource store
#[async_trait]
pub trait RegionDirectory: Send + Sync {
    /// Stored location of a hospital (state, district, sub-district)
    async fn hospital_location(&self, hospital_id: &str) -> Result<Option<RegionDescriptor>>;

    /// Parent hospital of a department
    async fn department_parent(&self, department_id: &str) -> Result<Option<String>>;
}

/// In-memory region directory
pub struct InMemoryRegionDirectory {
    hospitals: Arc<RwLock<HashMap<String, RegionDescriptor>>>,
    departments: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryRegionDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self {
            hospitals: Arc::new(RwLock::new(HashMap::new())),
            departments: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a hospital at `location`
    pub async fn put_hospital(&self, hospital_id: impl Into<String>, location: RegionDescriptor) {
        let mut hospitals = self.hospitals.write().await;
        hospitals.insert(hospital_id.into(), location);
    }

    /// Register a department under `hospital_id`
    pub async fn put_department(&self, department_id: impl Into<String>, hospital_id: impl Into<String>) {
        let mut departments = self.departments.write().await;
        departments.insert(department_id.into(), hospital_id.into());
    }
}

impl Default for InMemoryRegionDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RegionDirectory for InMemoryRegionDirectory {
    async fn hospital_location(&self, hospital_id: &str) -> Result<Option<RegionDescriptor>> {
        let hospitals = self.hospitals.read().await;
        Ok(hospitals.get(hospital_id).cloned())
    }

    async fn department_parent(&self, department_id: &str) -> Result<Option<String>> {
        let departments = self.departments.read().await;
        Ok(departments.get(department_id).cloned())
    }
}

/// Resolves region tags through a [`RegionDirectory`] with bounded lookups
#[derive(Clone)]
pub struct RegionTagResolver {
    directory: Arc<dyn RegionDirectory>,
    timeout: Duration,
}

impl RegionTagResolver {
    pub fn new(directory: Arc<dyn RegionDirectory>) -> Self {
        Self::with_timeout(directory, DEFAULT_LOOKUP_TIMEOUT)
    }

    pub fn with_timeout(directory: Arc<dyn RegionDirectory>, timeout: Duration) -> Self {
        Self { directory, timeout }
    }

    /// Tag of a hospital: its stored location plus its own id
    pub async fn hospital_tag(&self, hospital_id: &str) -> Result<RegionDescriptor> {
        let location = bounded(
            "hospital",
            self.timeout,
            self.directory.hospital_location(hospital_id),
        )
        .await?
        .ok_or_else(|| AuthzError::InvalidInput(format!("Unknown hospital: '{}'", hospital_id)))?;

        // Location fields only; a stored hospital/department id never overrides the chain
        let mut tag = RegionDescriptor::new();
        for level in [RegionLevel::State, RegionLevel::District, RegionLevel::SubDistrict] {
            tag.set(level, location.get(level).map(str::to_string));
        }

        Ok(tag.with_hospital(hospital_id))
    }

    /// Tag of a department: the parent hospital's tag plus the department id
    pub async fn department_tag(&self, department_id: &str) -> Result<RegionDescriptor> {
        let hospital_id = bounded(
            "department",
            self.timeout,
            self.directory.department_parent(department_id),
        )
        .await?
        .ok_or_else(|| {
            AuthzError::InvalidInput(format!("Unknown department: '{}'", department_id))
        })?;

        Ok(self.hospital_tag(&hospital_id).await?.with_department(department_id))
    }
}
