//! Application manifest loading and validation.
//!
//! # Responsibility
//! - Read `manifest.json` from a resource directory (or an in-memory value
//!   for ad hoc launches) and validate declaration-level invariants.
//!
//! # Invariants
//! - A valid manifest has a name, a dotted numeric version and at least one
//!   entry point.
//! - Document paths are relative and never escape the resource directory.
//! - Permission decision strings are carried raw; they are checked when the
//!   persistent scope is initialised.

use crate::model::application::ApplicationManifest;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Component, Path};

/// File name of the manifest inside a resource directory.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Decision assigned to permissions declared in list form.
pub const DEFAULT_DECLARED_DECISION: &str = "ALLOW";

static VERSION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+(\.\d+){0,3}$").expect("manifest version pattern is a valid regex")
});

/// How much the manifest source is trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustLevel {
    /// Supplied directly by the operator (command line, ad hoc URL).
    CommandLine,
    /// Coming from an installed package.
    Installed,
}

/// Manifest source collaborator.
pub trait ManifestLoader {
    fn load_from_dir(
        &self,
        dir: &Path,
        trust: TrustLevel,
    ) -> Result<ApplicationManifest, ManifestError>;

    fn load_from_value(
        &self,
        value: &Value,
        trust: TrustLevel,
    ) -> Result<ApplicationManifest, ManifestError>;
}

/// Default loader reading `manifest.json` with serde.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonManifestLoader;

impl ManifestLoader for JsonManifestLoader {
    fn load_from_dir(
        &self,
        dir: &Path,
        trust: TrustLevel,
    ) -> Result<ApplicationManifest, ManifestError> {
        let path = dir.join(MANIFEST_FILE_NAME);
        let text = std::fs::read_to_string(&path)
            .map_err(|err| ManifestError::Unreadable(format!("{}: {err}", path.display())))?;
        let value: Value =
            serde_json::from_str(&text).map_err(|err| ManifestError::Malformed(err.to_string()))?;
        self.load_from_value(&value, trust)
    }

    fn load_from_value(
        &self,
        value: &Value,
        trust: TrustLevel,
    ) -> Result<ApplicationManifest, ManifestError> {
        let raw = RawManifest::deserialize(value)
            .map_err(|err| ManifestError::Malformed(err.to_string()))?;
        let manifest = raw.into_manifest();
        validate_manifest(&manifest, trust)?;
        Ok(manifest)
    }
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    permissions: Option<DeclaredPermissions>,
    #[serde(default, alias = "main")]
    main_document: Option<String>,
    #[serde(default, alias = "launch_local_path")]
    launch_path: Option<String>,
    #[serde(default)]
    launch_web_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DeclaredPermissions {
    Names(Vec<String>),
    Decisions(BTreeMap<String, String>),
}

impl RawManifest {
    fn into_manifest(self) -> ApplicationManifest {
        let permissions = match self.permissions {
            None => BTreeMap::new(),
            Some(DeclaredPermissions::Decisions(map)) => map,
            Some(DeclaredPermissions::Names(names)) => names
                .into_iter()
                .map(|name| (name, DEFAULT_DECLARED_DECISION.to_string()))
                .collect(),
        };

        ApplicationManifest {
            name: self.name,
            version: self.version,
            permissions,
            main_document: self.main_document,
            launch_path: self.launch_path,
            launch_web_url: self.launch_web_url,
        }
    }
}

/// Validates declaration-level manifest invariants.
pub fn validate_manifest(
    manifest: &ApplicationManifest,
    trust: TrustLevel,
) -> Result<(), ManifestError> {
    if manifest.name.trim().is_empty() {
        return Err(ManifestError::EmptyName);
    }

    let version = manifest.version.trim();
    if version.is_empty() {
        return Err(ManifestError::EmptyVersion);
    }
    if !VERSION_PATTERN.is_match(version) {
        return Err(ManifestError::InvalidVersion(manifest.version.clone()));
    }

    for name in manifest.permissions.keys() {
        if name.trim().is_empty() || name.chars().any(char::is_whitespace) {
            return Err(ManifestError::InvalidPermissionName(name.clone()));
        }
    }

    let mut has_entry_point = false;
    for (field, value) in [
        ("main_document", &manifest.main_document),
        ("launch_path", &manifest.launch_path),
    ] {
        if let Some(raw) = value.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) {
            require_relative_document(raw, field)?;
            has_entry_point = true;
        }
    }

    if let Some(url) = manifest
        .launch_web_url
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
    {
        let remote = url.starts_with("http://") || url.starts_with("https://");
        if !remote && trust != TrustLevel::CommandLine {
            return Err(ManifestError::UntrustedLaunchUrl(url.to_string()));
        }
        has_entry_point = true;
    }

    if !has_entry_point {
        return Err(ManifestError::MissingEntryPoint);
    }
    Ok(())
}

fn require_relative_document(value: &str, field: &'static str) -> Result<(), ManifestError> {
    let escapes = Path::new(value)
        .components()
        .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(ManifestError::DocumentOutsideResources {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Manifest loading/validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    Unreadable(String),
    Malformed(String),
    EmptyName,
    EmptyVersion,
    InvalidVersion(String),
    InvalidPermissionName(String),
    MissingEntryPoint,
    DocumentOutsideResources { field: &'static str, value: String },
    UntrustedLaunchUrl(String),
}

impl Display for ManifestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreadable(message) => write!(f, "manifest cannot be read: {message}"),
            Self::Malformed(message) => write!(f, "manifest is malformed: {message}"),
            Self::EmptyName => write!(f, "manifest name must not be empty"),
            Self::EmptyVersion => write!(f, "manifest version must not be empty"),
            Self::InvalidVersion(value) => write!(
                f,
                "manifest version is invalid: {value} (expected dotted numbers)"
            ),
            Self::InvalidPermissionName(value) => {
                write!(f, "manifest permission name is invalid: `{value}`")
            }
            Self::MissingEntryPoint => write!(
                f,
                "manifest declares no entry point (main_document|launch_path|launch_web_url)"
            ),
            Self::DocumentOutsideResources { field, value } => {
                write!(f, "manifest {field} escapes the resource directory: {value}")
            }
            Self::UntrustedLaunchUrl(value) => {
                write!(f, "manifest launch_web_url is not allowed at this trust level: {value}")
            }
        }
    }
}

impl Error for ManifestError {}
