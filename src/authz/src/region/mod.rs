//! Region matching module
//!
//! Provides the five-level region descriptor, the monotonic level-by-level
//! matcher, and tag resolution for resources tagged through an ownership chain.
//!
//! # Examples
//!
//! ```
//! use healthgrid_authz::region::{matches, RegionDescriptor};
//! use healthgrid_authz::Role;
//!
//! let actor = RegionDescriptor::new().with_state("X").with_district("A");
//! let inside = RegionDescriptor::new().with_state("X").with_district("A").with_hospital("h1");
//! let outside = RegionDescriptor::new().with_state("X").with_district("B");
//!
//! assert!(matches(Role::DistrictAdmin, &actor, &inside));
//! assert!(!matches(Role::DistrictAdmin, &actor, &outside));
//! ```

mod types;
mod matcher;
mod directory;


pub use types::{RegionDescriptor, RegionLevel};
pub use matcher::{first_mismatch, match_region, matches, RegionMatch};
pub use directory::{InMemoryRegionDirectory, RegionDirectory, RegionTagResolver};
