//! Level-by-level region matching
//!
//! Walks [`RegionLevel::ALL`] in order, comparing only the levels populated
//! on both descriptors. The first differing level short-circuits, so a
//! mismatch at level N can never be undone by anything at levels below N.

use super::types::{RegionDescriptor, RegionLevel};
use crate::types::Role;

/// Outcome of matching an actor region against a resource region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionMatch {
    /// Every commonly-populated level agrees (or the actor is top-level)
    Match,
    /// First commonly-populated level whose values differ
    Mismatch(RegionLevel),
    /// Non-top-level actor without any assigned region
    Unassigned,
}

impl RegionMatch {
    pub fn is_match(self) -> bool {
        matches!(self, RegionMatch::Match)
    }
}

/// First level populated on both sides with different values
///
/// Identifiers are compared exactly; no case folding is applied at any level.
pub fn first_mismatch(
    actor_region: &RegionDescriptor,
    resource_region: &RegionDescriptor,
) -> Option<RegionLevel> {
    RegionLevel::ALL.into_iter().find(|&level| {
        match (actor_region.get(level), resource_region.get(level)) {
            (Some(mine), Some(theirs)) => mine != theirs,
            _ => false,
        }
    })
}

/// Matches a resource region against an actor's assigned region
///
/// The actor's region is always the reference side.
pub fn match_region(
    role: Role,
    actor_region: &RegionDescriptor,
    resource_region: &RegionDescriptor,
) -> RegionMatch {
    if role.is_top_level() {
        return RegionMatch::Match;
    }

    if actor_region.is_empty() {
        return RegionMatch::Unassigned;
    }

    match first_mismatch(actor_region, resource_region) {
        Some(level) => RegionMatch::Mismatch(level),
        None => RegionMatch::Match,
    }
}

/// Boolean form of [`match_region`]
///
/// # Examples
///
/// ```
/// use healthgrid_authz::region::{matches, RegionDescriptor};
/// use healthgrid_authz::Role;
///
/// let actor = RegionDescriptor::new().with_state("X");
/// let report = RegionDescriptor::new().with_state("X").with_district("B");
/// assert!(matches(Role::StateAdmin, &actor, &report));
/// ```
pub fn matches(
    role: Role,
    actor_region: &RegionDescriptor,
    resource_region: &RegionDescriptor,
) -> bool {
    match_region(role, actor_region, resource_region).is_match()
}
