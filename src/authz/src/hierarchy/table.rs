//! Static role hierarchy table

use crate::error::{AuthzError, Result};
use crate::region::{RegionDescriptor, RegionLevel};
use crate::types::Role;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

static NO_ROLES: BTreeSet<Role> = BTreeSet::new();

/// One row of the hierarchy table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyEntry {
    /// Role this row describes
    pub role: Role,

    /// Roles an actor with `role` may create, edit, delete or assign
    #[serde(default)]
    pub administrable_roles: BTreeSet<Role>,
}

impl HierarchyEntry {
    pub fn new(role: Role, administrable_roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            role,
            administrable_roles: administrable_roles.into_iter().collect(),
        }
    }

    /// Validate the row on its own
    pub fn validate(&self) -> Result<()> {
        if self.role.is_top_level() {
            return Ok(());
        }

        // Strictly narrower roles only
        if let Some(bad) = self
            .administrable_roles
            .iter()
            .find(|target| target.rank() <= self.role.rank())
        {
            return Err(AuthzError::InvalidInput(format!(
                "Role '{}' cannot administer '{}' of equal or broader authority",
                self.role, bad
            )));
        }

        Ok(())
    }
}

/// Immutable role hierarchy, built once at startup and shared by reference
///
/// # Examples
///
/// ```
/// use healthgrid_authz::hierarchy::RoleHierarchy;
/// use healthgrid_authz::Role;
///
/// let hierarchy = RoleHierarchy::standard();
/// assert!(hierarchy.can_administer(Role::DistrictAdmin, Role::HospitalAdmin));
/// assert!(!hierarchy.can_administer(Role::HospitalAdmin, Role::DistrictAdmin));
/// ```
#[derive(Debug, Clone)]
pub struct RoleHierarchy {
    entries: HashMap<Role, BTreeSet<Role>>,
}

impl RoleHierarchy {
    /// The canonical five-role table
    pub fn standard() -> Self {
        let entries = Role::ALL
            .into_iter()
            .map(|role| {
                let administrable: Vec<Role> = if role.is_top_level() {
                    Role::ALL.to_vec()
                } else {
                    Role::ALL
                        .into_iter()
                        .filter(|target| target.rank() > role.rank())
                        .collect()
                };
                (role, administrable.into_iter().collect())
            })
            .collect();

        Self { entries }
    }

    /// Build a custom table
    ///
    /// Every role must appear exactly once and no non-top-level role may
    /// administer a role of equal or broader authority.
    pub fn from_entries(entries: Vec<HierarchyEntry>) -> Result<Self> {
        let mut table = HashMap::with_capacity(entries.len());

        for entry in entries {
            entry.validate()?;
            if table.insert(entry.role, entry.administrable_roles).is_some() {
                return Err(AuthzError::InvalidInput(format!(
                    "Role '{}' appears more than once in the hierarchy",
                    entry.role
                )));
            }
        }

        if let Some(missing) = Role::ALL.into_iter().find(|role| !table.contains_key(role)) {
            return Err(AuthzError::InvalidInput(format!(
                "Role '{}' is missing from the hierarchy",
                missing
            )));
        }

        Ok(Self { entries: table })
    }

    /// Roles an actor with `role` may administer
    pub fn administrable_roles(&self, role: Role) -> &BTreeSet<Role> {
        self.entries.get(&role).unwrap_or(&NO_ROLES)
    }

    /// Rank of `role`, lower means broader authority
    pub fn rank(&self, role: Role) -> u8 {
        role.rank()
    }

    /// Whether `actor_role` may create, edit, delete or assign `target_role`
    pub fn can_administer(&self, actor_role: Role, target_role: Role) -> bool {
        self.administrable_roles(actor_role).contains(&target_role)
    }

    /// Table rows, broadest role first
    pub fn entries(&self) -> Vec<HierarchyEntry> {
        Role::ALL
            .into_iter()
            .map(|role| HierarchyEntry {
                role,
                administrable_roles: self.administrable_roles(role).clone(),
            })
            .collect()
    }
}

impl Default for RoleHierarchy {
    fn default() -> Self {
        Self::standard()
    }
}

/// Region levels an account with `role` must carry
pub fn required_levels(role: Role) -> &'static [RegionLevel] {
    match role {
        Role::SuperAdmin => &[],
        Role::StateAdmin => &[RegionLevel::State],
        Role::DistrictAdmin => &[RegionLevel::State, RegionLevel::District],
        Role::HospitalAdmin => &[RegionLevel::State, RegionLevel::District, RegionLevel::Hospital],
        Role::DepartmentUser => &[
            RegionLevel::State,
            RegionLevel::District,
            RegionLevel::Hospital,
            RegionLevel::Department,
        ],
    }
}

/// Check that an account payload carries every level its role requires
///
/// This validates the shape of a create/update payload; it is not an
/// authorization decision.
pub fn validate_assignment(role: Role, region: &RegionDescriptor) -> Result<()> {
    let missing: Vec<&str> = required_levels(role)
        .iter()
        .filter(|level| region.get(**level).is_none())
        .map(|level| level.field_name())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AuthzError::InvalidInput(format!(
            "Role '{}' requires region fields: {}",
            role,
            missing.join(", ")
        )))
    }
}
