//! Domain model for installable applications and their permissions.
//!
//! # Responsibility
//! - Define canonical records shared by storage, runtime and services.
//!
//! # Invariants
//! - Every application is identified by a stable `ApplicationId`.
//! - Session-scoped decisions never carry `PROMPT`.
//!
//! # See also
//! - `crate::repo::application_repo` for the persisted form.

pub mod application;
pub mod permission;
