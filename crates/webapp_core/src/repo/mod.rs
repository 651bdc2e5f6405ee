//! Durable application storage.
//!
//! # Responsibility
//! - Define the record-store contract used by the install orchestrator.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Store APIs return semantic errors (`Duplicate`, `NotFound`) in addition
//!   to DB transport errors.

pub mod application_repo;
