//! Resource-scope query builder
//!
//! Turns an actor into a declarative filter for bulk reads (list reports,
//! list users, list departments) so storage only ever returns in-scope
//! records. For any actor and record, `scope_filter(actor).admits(tag)` agrees
//! with `region::matches(actor.role, &actor.region, tag)`.
//!
//! # Examples
//!
//! ```
//! use healthgrid_authz::scope::scope_filter;
//! use healthgrid_authz::region::RegionDescriptor;
//! use healthgrid_authz::{Actor, Role};
//!
//! let actor = Actor::new("u1", Role::DistrictAdmin,
//!     RegionDescriptor::new().with_state("X").with_district("A"));
//! let filter = scope_filter(&actor);
//!
//! assert!(filter.admits(&RegionDescriptor::new().with_state("X").with_district("A").with_hospital("h1")));
//! assert!(!filter.admits(&RegionDescriptor::new().with_state("X").with_district("B")));
//! ```

mod types;
mod builder;


pub use types::{LevelConstraint, ScopeFilter};
pub use builder::scope_filter;
