//! Install/uninstall/launch error taxonomy.

use crate::model::application::ApplicationId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Lifecycle operation failure.
///
/// Access control never produces one of these; it answers
/// `RuntimePermission::InvalidRuntimePerm` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    InvalidPackage(String),
    /// Informational: the package id is already stored; nothing changed.
    AlreadyInstalled { id: ApplicationId },
    ManifestInvalid(String),
    PermissionDataInvalid(String),
    /// Record could not be persisted; resources on disk may be orphaned.
    PersistFailed(String),
    StorageUnavailable(String),
    NotInstalled(ApplicationId),
    /// Record is gone but the resource directory could not be removed.
    ResourceCleanupFailed { id: ApplicationId, message: String },
    PlatformVeto(String),
}

impl ServiceError {
    /// Stable code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPackage(_) => "invalid_package",
            Self::AlreadyInstalled { .. } => "already_installed",
            Self::ManifestInvalid(_) => "manifest_invalid",
            Self::PermissionDataInvalid(_) => "permission_data_invalid",
            Self::PersistFailed(_) => "persist_failed",
            Self::StorageUnavailable(_) => "storage_unavailable",
            Self::NotInstalled(_) => "not_installed",
            Self::ResourceCleanupFailed { .. } => "resource_cleanup_failed",
            Self::PlatformVeto(_) => "platform_veto",
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPackage(message) => write!(f, "package is invalid: {message}"),
            Self::AlreadyInstalled { id } => write!(f, "application already installed: {id}"),
            Self::ManifestInvalid(message) => write!(f, "manifest is invalid: {message}"),
            Self::PermissionDataInvalid(message) => {
                write!(f, "application permission data is invalid: {message}")
            }
            Self::PersistFailed(message) => {
                write!(f, "application record could not be persisted: {message}")
            }
            Self::StorageUnavailable(message) => write!(f, "storage is unavailable: {message}"),
            Self::NotInstalled(id) => write!(f, "application is not installed: {id}"),
            Self::ResourceCleanupFailed { id, message } => write!(
                f,
                "application {id} uninstalled but resources remain: {message}"
            ),
            Self::PlatformVeto(message) => write!(f, "platform installer refused: {message}"),
        }
    }
}

impl Error for ServiceError {}
