//! Core authorization types

use crate::error::{AuthzError, Result};
use crate::region::RegionDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique principal identifier
pub type PrincipalId = String;

/// Role of an actor or of a user resource
///
/// Declaration order is authority order: `SuperAdmin` has rank 0 and
/// `DepartmentUser` rank 4. Only the kebab-case spelling is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    SuperAdmin,
    StateAdmin,
    DistrictAdmin,
    HospitalAdmin,
    DepartmentUser,
}

impl Role {
    /// Every role, broadest authority first
    pub const ALL: [Role; 5] = [
        Role::SuperAdmin,
        Role::StateAdmin,
        Role::DistrictAdmin,
        Role::HospitalAdmin,
        Role::DepartmentUser,
    ];

    /// Rank of the role, lower means broader authority
    pub fn rank(self) -> u8 {
        match self {
            Role::SuperAdmin => 0,
            Role::StateAdmin => 1,
            Role::DistrictAdmin => 2,
            Role::HospitalAdmin => 3,
            Role::DepartmentUser => 4,
        }
    }

    /// Whether this is the unconditionally-authorized top-level role
    pub fn is_top_level(self) -> bool {
        self.rank() == 0
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => "super-admin",
            Role::StateAdmin => "state-admin",
            Role::DistrictAdmin => "district-admin",
            Role::HospitalAdmin => "hospital-admin",
            Role::DepartmentUser => "department-user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| AuthzError::InvalidInput(format!("Unknown role: '{}'", s)))
    }
}

/// Action being performed on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Read,
    List,
    Create,
    Update,
    Delete,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Read,
        Action::List,
        Action::Create,
        Action::Update,
        Action::Delete,
    ];

    /// Whether the action changes state
    pub fn is_write(self) -> bool {
        matches!(self, Action::Create | Action::Update | Action::Delete)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::List => "list",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of protected resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Hospital,
    Department,
    Report,
    User,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Hospital => "hospital",
            ResourceKind::Department => "department",
            ResourceKind::Report => "report",
            ResourceKind::User => "user",
        };
        f.write_str(name)
    }
}

/// Authenticated actor, built fresh for every request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Principal identifier
    pub id: PrincipalId,

    /// Assigned role
    pub role: Role,

    /// Assigned region (may be empty only for the top-level role)
    #[serde(default)]
    pub region: RegionDescriptor,
}

impl Actor {
    /// Create a new actor
    pub fn new(id: impl Into<String>, role: Role, region: RegionDescriptor) -> Self {
        Self {
            id: id.into(),
            role,
            region,
        }
    }

    /// Whether a non-top-level actor carries no region at all
    pub fn is_misconfigured(&self) -> bool {
        !self.role.is_top_level() && self.region.is_empty()
    }
}

/// Target of an authorization check
///
/// Either a concrete resource (with its region tag) or, for `create`, the
/// proposed region and role of the resource to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    /// Resource kind
    pub kind: ResourceKind,

    /// Current (or proposed, for create) region tag
    #[serde(default)]
    pub region: RegionDescriptor,

    /// Role carried by a user resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// New region tag proposed by an update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relocation: Option<RegionDescriptor>,

    /// New role proposed by an update of a user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reassigned_role: Option<Role>,
}

impl Target {
    /// Create a target of the given kind
    pub fn new(kind: ResourceKind, region: RegionDescriptor) -> Self {
        Self {
            kind,
            region,
            role: None,
            relocation: None,
            reassigned_role: None,
        }
    }

    pub fn hospital(region: RegionDescriptor) -> Self {
        Self::new(ResourceKind::Hospital, region)
    }

    pub fn department(region: RegionDescriptor) -> Self {
        Self::new(ResourceKind::Department, region)
    }

    pub fn report(region: RegionDescriptor) -> Self {
        Self::new(ResourceKind::Report, region)
    }

    /// A user resource carrying `role`
    pub fn user(region: RegionDescriptor, role: Role) -> Self {
        Self {
            role: Some(role),
            ..Self::new(ResourceKind::User, region)
        }
    }

    /// Propose moving the resource to another region
    pub fn relocated_to(mut self, region: RegionDescriptor) -> Self {
        self.relocation = Some(region);
        self
    }

    /// Propose assigning a different role to a user resource
    pub fn reassigning(mut self, role: Role) -> Self {
        self.reassigned_role = Some(role);
        self
    }

    /// Whether `action` on this target manages user accounts
    pub fn is_user_management(&self, action: Action) -> bool {
        self.kind == ResourceKind::User && action.is_write()
    }

    /// Reject shapes that cannot be authorized meaningfully
    pub fn validate(&self) -> Result<()> {
        if self.kind != ResourceKind::User && (self.role.is_some() || self.reassigned_role.is_some()) {
            return Err(AuthzError::InvalidInput(format!(
                "Only user targets carry a role, got a {} target with one",
                self.kind
            )));
        }

        if self.kind == ResourceKind::User && self.role.is_none() {
            return Err(AuthzError::InvalidInput(
                "User targets must carry a role".to_string(),
            ));
        }

        Ok(())
    }
}
