//! Application lifecycle services.
//!
//! # Responsibility
//! - Orchestrate store, manifest, package and host collaborators into the
//!   install/uninstall/launch use cases.
//! - Keep CLI and embedder layers decoupled from storage details.
//!
//! # See also
//! - `crate::bridge` for the extension-facing access-control adapter.

pub mod application_service;
pub mod error;
pub mod lifecycle;
pub mod observer;
