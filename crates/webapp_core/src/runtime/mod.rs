//! Running application state and the rendering host boundary.
//!
//! # Responsibility
//! - Track launched instances for the process.
//! - Hold SESSION permissions and extension permission tables per instance.
//!
//! # Invariants
//! - Registry state is only mutated from the coordination thread
//!   (`&mut` access through `ApplicationService`).

pub mod host;
pub mod registry;
pub mod running;
