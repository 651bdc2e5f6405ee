//! Sandboxed web application runtime core.
//!
//! Installs, uninstalls and launches packaged web applications, tracks the
//! running ones, and answers extension API permission checks.

pub mod bridge;
pub mod config;
pub mod db;
pub mod event;
pub mod logging;
pub mod manifest;
pub mod model;
pub mod package;
pub mod permission;
pub mod repo;
pub mod runtime;
pub mod service;

pub use bridge::{AppExtensionBridge, ExtensionAccessDelegate};
pub use config::{ConfigError, RuntimeConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use manifest::{JsonManifestLoader, ManifestError, ManifestLoader, TrustLevel};
pub use model::application::{
    ApplicationId, ApplicationManifest, ApplicationRecord, EntryPoint, LaunchEntryPoint,
};
pub use model::permission::{
    PermissionScope, RuntimePermission, SessionPermission, StoredPermission,
};
pub use permission::resolver::PermissionReply;
pub use repo::application_repo::{
    ApplicationStore, RepoError, RepoResult, SqliteApplicationStore,
};
pub use runtime::host::{ContentLoader, HostEvent, HostProcessId};
pub use runtime::registry::ApplicationRegistry;
pub use runtime::running::{InstanceId, RunningApplication};
pub use service::application_service::{
    ApplicationService, InstallReport, LaunchTarget, ServiceCollaborators,
};
pub use service::error::{ServiceError, ServiceResult};
pub use service::lifecycle::{CompletionSignal, HandshakeOutcome};
pub use service::observer::{ApplicationObserver, ServiceNotification};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
