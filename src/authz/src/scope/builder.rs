//! Builds the scope filter for an actor

use super::types::{LevelConstraint, ScopeFilter};
use crate::types::Actor;

/// Filter that narrows list/search queries to what `actor` may see
///
/// Top-level actors are unrestricted, actors without a region see nothing,
/// and everyone else is constrained on each level populated in their region.
pub fn scope_filter(actor: &Actor) -> ScopeFilter {
    if actor.role.is_top_level() {
        return ScopeFilter::Unrestricted;
    }

    if actor.region.is_empty() {
        return ScopeFilter::Nothing;
    }

    let constraints = actor
        .region
        .populated_levels()
        .map(|(level, value)| LevelConstraint::new(level, value))
        .collect();

    ScopeFilter::Levels { constraints }
}
