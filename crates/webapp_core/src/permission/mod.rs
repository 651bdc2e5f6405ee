//! Extension API access control.
//!
//! # Responsibility
//! - Parse per-extension API -> permission tables.
//! - Resolve the layered session/persistent policy into runtime decisions.
//!
//! # Invariants
//! - Every unresolvable case answers `InvalidRuntimePerm`; access control
//!   never surfaces an error to the extension boundary.

pub mod resolver;
pub mod table;
