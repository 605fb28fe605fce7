//! Principal store
//!
//! The store is the source of truth for a principal's role and region.
//! Nothing here is cached between requests.

use crate::error::Result;
use crate::region::RegionDescriptor;
use crate::types::{PrincipalId, Role};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Stored principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalRecord {
    pub id: PrincipalId,
    pub role: Role,

    #[serde(default)]
    pub region: RegionDescriptor,

    #[serde(default = "default_active")]
    pub active: bool,

    /// Last change to role, region or password; older credentials are stale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_changed_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl PrincipalRecord {
    /// Create an active principal with no recorded credential change
    pub fn new(id: impl Into<String>, role: Role, region: RegionDescriptor) -> Self {
        Self {
            id: id.into(),
            role,
            region,
            active: true,
            credentials_changed_at: None,
        }
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn changed_at(mut self, at: DateTime<Utc>) -> Self {
        self.credentials_changed_at = Some(at);
        self
    }
}

/// Principal lookup collaborator
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    async fn find_principal(&self, id: &str) -> Result<Option<PrincipalRecord>>;
}

/// In-memory principal store
pub struct InMemoryPrincipalStore {
    principals: Arc<RwLock<HashMap<PrincipalId, PrincipalRecord>>>,
}

impl InMemoryPrincipalStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            principals: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert or replace a principal
    pub async fn put(&self, record: PrincipalRecord) {
        let mut principals = self.principals.write().await;
        principals.insert(record.id.clone(), record);
    }

    /// Reassign role and region, invalidating earlier credentials
    ///
    /// Returns `false` when the principal does not exist.
    pub async fn reassign(&self, id: &str, role: Role, region: RegionDescriptor) -> bool {
        let mut principals = self.principals.write().await;
        match principals.get_mut(id) {
            Some(record) => {
                record.role = role;
                record.region = region;
                record.credentials_changed_at = Some(Utc::now());
                true
            }
            None => false,
        }
    }

    /// Deactivate a principal
    pub async fn deactivate(&self, id: &str) -> bool {
        let mut principals = self.principals.write().await;
        match principals.get_mut(id) {
            Some(record) => {
                record.active = false;
                true
            }
            None => false,
        }
    }
}

impl Default for InMemoryPrincipalStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PrincipalStore for InMemoryPrincipalStore {
    async fn find_principal(&self, id: &str) -> Result<Option<PrincipalRecord>> {
        let principals = self.principals.read().await;
        Ok(principals.get(id).cloned())
    }
}
