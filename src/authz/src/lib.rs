//! # HealthGrid Authorization Core
//!
//! Role-hierarchy and region-scoped access control for the hospital
//! reporting platform.
//!
//! ## Features
//!
//! - **Fixed role ladder** from `super-admin` down to `department-user`
//! - **Region matching** over state, district, sub-district, hospital and department
//! - **Pure decision engine** that never performs I/O
//! - **Scope filters** that narrow list queries to exactly what the matcher admits
//! - **Fresh identity** resolved from the principal store on every request
//!
//! ## Example
//!
//! ```rust
//! use healthgrid_authz::{Action, Actor, DecisionEngine, RegionDescriptor, Role, Target};
//!
//! let engine = DecisionEngine::standard();
//! let actor = Actor::new(
//!     "district-a",
//!     Role::DistrictAdmin,
//!     RegionDescriptor::new().with_state("X").with_district("A"),
//! );
//!
//! let report = Target::report(
//!     RegionDescriptor::new().with_state("X").with_district("A").with_hospital("h1"),
//! );
//! assert!(engine.authorize(&actor, Action::Update, &report).is_allowed());
//!
//! let elsewhere = Target::report(RegionDescriptor::new().with_state("X").with_district("B"));
//! assert!(!engine.authorize(&actor, Action::Read, &elsewhere).is_allowed());
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod guard;
pub mod hierarchy;
pub mod http;
pub mod identity;
pub mod region;
pub mod scope;
pub mod types;

mod upstream;

// Re-export commonly used types
pub use config::{AuthzConfig, SeedData};
pub use engine::{Decision, DecisionEngine, DenyReason, MetricsCollector};
pub use error::{AuthzError, Result};
pub use guard::AccessGuard;
pub use hierarchy::RoleHierarchy;
pub use identity::{IdentityResolver, JwtVerifier};
pub use region::{RegionDescriptor, RegionLevel};
pub use scope::ScopeFilter;
pub use types::{Action, Actor, PrincipalId, ResourceKind, Role, Target};
pub use upstream::DEFAULT_LOOKUP_TIMEOUT;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
