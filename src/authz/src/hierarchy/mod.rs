//! Role hierarchy module
//!
//! A declarative table of the five roles and the roles each may administer.
//! The table is constructed once, wrapped in an `Arc`, and only ever read.
//!
//! | Rank | Role              | Administers                                   |
//! |------|-------------------|-----------------------------------------------|
//! | 0    | `super-admin`     | every role                                    |
//! | 1    | `state-admin`     | district-admin, hospital-admin, department-user |
//! | 2    | `district-admin`  | hospital-admin, department-user               |
//! | 3    | `hospital-admin`  | department-user                               |
//! | 4    | `department-user` | nothing                                       |

mod table;

pub use table::{required_levels, validate_assignment, HierarchyEntry, RoleHierarchy};
