//! Extension permission tables.
//!
//! An extension registers, once per running application, which permission
//! name guards each of its API entry points. The wire form is JSON:
//!
//! ```json
//! {"permissions": [{"permission_name": "contacts", "apis": ["find", "save"]}]}
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// API name -> permission name mapping for one (application, extension).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisteredPermissionTable {
    entries: BTreeMap<String, String>,
}

impl RegisteredPermissionTable {
    /// Parses and validates the JSON wire form.
    pub fn parse(raw: &str) -> Result<Self, PermissionTableError> {
        let doc: TableDocument = serde_json::from_str(raw)
            .map_err(|err| PermissionTableError::Malformed(err.to_string()))?;

        let mut entries = BTreeMap::<String, String>::new();
        for group in doc.permissions {
            let permission = group.permission_name.trim();
            if permission.is_empty() {
                return Err(PermissionTableError::EmptyPermissionName);
            }
            for api in group.apis {
                let api = api.trim();
                if api.is_empty() {
                    return Err(PermissionTableError::EmptyApiName(permission.to_string()));
                }
                match entries.get(api) {
                    Some(existing) if existing != permission => {
                        return Err(PermissionTableError::ConflictingApi {
                            api: api.to_string(),
                            first: existing.clone(),
                            second: permission.to_string(),
                        });
                    }
                    _ => {
                        entries.insert(api.to_string(), permission.to_string());
                    }
                }
            }
        }
        Ok(Self { entries })
    }

    /// Permission name guarding `api_name`, if registered.
    pub fn permission_for(&self, api_name: &str) -> Option<&str> {
        self.entries.get(api_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct TableDocument {
    permissions: Vec<TableGroup>,
}

#[derive(Debug, Deserialize)]
struct TableGroup {
    permission_name: String,
    #[serde(default)]
    apis: Vec<String>,
}

/// Permission table parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionTableError {
    Malformed(String),
    EmptyPermissionName,
    EmptyApiName(String),
    ConflictingApi {
        api: String,
        first: String,
        second: String,
    },
}

impl Display for PermissionTableError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(message) => write!(f, "permission table is malformed: {message}"),
            Self::EmptyPermissionName => write!(f, "permission table has an empty permission name"),
            Self::EmptyApiName(permission) => {
                write!(f, "permission `{permission}` lists an empty api name")
            }
            Self::ConflictingApi { api, first, second } => write!(
                f,
                "api `{api}` is mapped to both `{first}` and `{second}`"
            ),
        }
    }
}

impl Error for PermissionTableError {}
