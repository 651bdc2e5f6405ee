//! Application record domain model.
//!
//! # Responsibility
//! - Define the durable description of one installable application.
//! - Derive stable application ids from package identity, paths or URLs.
//!
//! # Invariants
//! - `ApplicationId` is always 32 characters in `a..=p`.
//! - `persistent_permissions` only holds names declared by the manifest.
//!
//! # See also
//! - `crate::repo::application_repo` for the persisted form.

use crate::model::permission::StoredPermission;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const APPLICATION_ID_LEN: usize = 32;

static APPLICATION_ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-p]{32}$").expect("application id pattern is a valid regex")
});

/// Stable application identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApplicationId(String);

impl ApplicationId {
    /// Derives an id from arbitrary input (package key, path or URL).
    ///
    /// The first 16 bytes of the SHA-256 digest are hex encoded and every
    /// hex digit is shifted into `a..=p`.
    pub fn generate(input: &str) -> Self {
        let digest = Sha256::digest(input.as_bytes());
        let encoded = hex::encode(&digest[..APPLICATION_ID_LEN / 2]);
        let id = encoded
            .chars()
            .map(|c| {
                let nibble = c.to_digit(16).unwrap_or(0) as u8;
                char::from(b'a' + nibble)
            })
            .collect();
        Self(id)
    }

    /// Derives an id from a resource directory path.
    pub fn from_path(path: &Path) -> Self {
        Self::generate(&path.to_string_lossy())
    }

    /// Parses and validates an existing id.
    pub fn parse(value: &str) -> Result<Self, InvalidApplicationId> {
        let trimmed = value.trim();
        if !APPLICATION_ID_PATTERN.is_match(trimmed) {
            return Err(InvalidApplicationId(value.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ApplicationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ApplicationId {
    type Error = InvalidApplicationId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ApplicationId> for String {
    fn from(value: ApplicationId) -> Self {
        value.0
    }
}

/// Malformed application id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidApplicationId(pub String);

impl Display for InvalidApplicationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "application id is invalid: `{}` (expected 32 chars in a-p)",
            self.0
        )
    }
}

impl Error for InvalidApplicationId {}

/// Validated manifest data carried by an application record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationManifest {
    pub name: String,
    pub version: String,
    /// Declared permission name -> raw decision string (`ALLOW|DENY|PROMPT`).
    #[serde(default)]
    pub permissions: BTreeMap<String, String>,
    /// Background/main document, relative to the resource directory.
    #[serde(default)]
    pub main_document: Option<String>,
    /// Local launch page, relative to the resource directory.
    #[serde(default)]
    pub launch_path: Option<String>,
    /// Remote launch URL used by ad hoc launches.
    #[serde(default)]
    pub launch_web_url: Option<String>,
}

impl ApplicationManifest {
    pub fn has_main_document(&self) -> bool {
        self.main_document
            .as_deref()
            .is_some_and(|doc| !doc.trim().is_empty())
    }
}

/// Which entry point family a launch should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaunchEntryPoint {
    /// Main document first, then the local launch path.
    #[default]
    Default,
    /// Ad hoc mode loading `launch_web_url`.
    LaunchWebUrl,
}

/// Resolved entry point handed to the content loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryPoint {
    MainDocument(PathBuf),
    LaunchPath(PathBuf),
    WebUrl(String),
}

/// Durable record for one installed (or ad hoc) application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub manifest: ApplicationManifest,
    /// Installed resource directory. Empty for ad hoc URL launches.
    pub path: PathBuf,
    /// PERSISTENT permission scope.
    #[serde(default)]
    pub persistent_permissions: BTreeMap<String, StoredPermission>,
}

impl ApplicationRecord {
    pub fn new(id: ApplicationId, manifest: ApplicationManifest, path: PathBuf) -> Self {
        Self {
            id,
            manifest,
            path,
            persistent_permissions: BTreeMap::new(),
        }
    }

    pub fn has_main_document(&self) -> bool {
        self.manifest.has_main_document()
    }

    /// Looks up one persistent permission; `None` means UNSET.
    pub fn persistent_permission(&self, permission_name: &str) -> Option<StoredPermission> {
        self.persistent_permissions.get(permission_name).copied()
    }

    /// Resolves the entry point for the requested launch mode.
    pub fn entry_point(&self, kind: LaunchEntryPoint) -> Option<EntryPoint> {
        let non_empty = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|raw| !raw.is_empty())
                .map(str::to_string)
        };

        match kind {
            LaunchEntryPoint::LaunchWebUrl => {
                non_empty(&self.manifest.launch_web_url).map(EntryPoint::WebUrl)
            }
            LaunchEntryPoint::Default => {
                if let Some(doc) = non_empty(&self.manifest.main_document) {
                    return Some(EntryPoint::MainDocument(self.path.join(doc)));
                }
                if let Some(page) = non_empty(&self.manifest.launch_path) {
                    return Some(EntryPoint::LaunchPath(self.path.join(page)));
                }
                non_empty(&self.manifest.launch_web_url).map(EntryPoint::WebUrl)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ApplicationId, ApplicationManifest, ApplicationRecord, EntryPoint, LaunchEntryPoint,
    };
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn manifest() -> ApplicationManifest {
        ApplicationManifest {
            name: "Clock".to_string(),
            version: "1.0.0".to_string(),
            permissions: BTreeMap::new(),
            main_document: None,
            launch_path: Some("index.html".to_string()),
            launch_web_url: None,
        }
    }

    #[test]
    fn generated_ids_are_stable_and_well_formed() {
        let first = ApplicationId::generate("https://example.com/");
        let second = ApplicationId::generate("https://example.com/");
        assert_eq!(first, second);
        assert_eq!(first.as_str().len(), 32);
        assert!(first.as_str().chars().all(|c| ('a'..='p').contains(&c)));
        assert!(ApplicationId::parse(first.as_str()).is_ok());
    }

    #[test]
    fn different_inputs_yield_different_ids() {
        assert_ne!(
            ApplicationId::generate("pkg-a"),
            ApplicationId::generate("pkg-b")
        );
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!(ApplicationId::parse("short").is_err());
        assert!(ApplicationId::parse("zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz").is_err());
    }

    #[test]
    fn default_entry_point_prefers_main_document() {
        let mut manifest = manifest();
        manifest.main_document = Some("bg.html".to_string());
        let record = ApplicationRecord::new(
            ApplicationId::generate("clock"),
            manifest,
            PathBuf::from("/apps/clock"),
        );

        assert_eq!(
            record.entry_point(LaunchEntryPoint::Default),
            Some(EntryPoint::MainDocument(PathBuf::from("/apps/clock/bg.html")))
        );
        assert_eq!(record.entry_point(LaunchEntryPoint::LaunchWebUrl), None);
    }

    #[test]
    fn blank_main_document_does_not_count() {
        let mut manifest = manifest();
        manifest.main_document = Some("  ".to_string());
        assert!(!manifest.has_main_document());
    }
}
