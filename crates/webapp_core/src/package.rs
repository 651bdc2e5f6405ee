//! Package source and platform installer boundaries.
//!
//! Archive formats (XPK/WGT) and platform installer backends live outside
//! this crate; the orchestrator only sees these traits.

use crate::model::application::{ApplicationId, ApplicationRecord};
use std::path::Path;

/// One opened package archive.
pub trait Package {
    /// Identity derived from the archive's signed/declared key.
    fn id(&self) -> &ApplicationId;

    /// Extracts the package resources into `dest`, creating it.
    fn extract(&self, dest: &Path) -> Result<(), String>;
}

/// Opens package archives from disk.
pub trait PackageOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn Package>, String>;
}

/// Opener for builds without archive support; every archive is invalid.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedPackageOpener;

impl PackageOpener for UnsupportedPackageOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn Package>, String> {
        Err(format!(
            "packaged archives are not supported by this build: {}",
            path.display()
        ))
    }
}

/// Platform-specific install/uninstall steps.
///
/// Both hooks run before the durable store is mutated; an `Err` vetoes the
/// operation.
pub trait PlatformHooks {
    fn before_install(&self, record: &ApplicationRecord, data_path: &Path) -> Result<(), String>;
    fn before_uninstall(&self, id: &ApplicationId, data_path: &Path) -> Result<(), String>;
}

/// Platform without extra installer steps.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPlatformHooks;

impl PlatformHooks for NoPlatformHooks {
    fn before_install(&self, _record: &ApplicationRecord, _data_path: &Path) -> Result<(), String> {
        Ok(())
    }

    fn before_uninstall(&self, _id: &ApplicationId, _data_path: &Path) -> Result<(), String> {
        Ok(())
    }
}
