//! One running application instance.
//!
//! # Invariants
//! - The session permission layer only stores `SessionPermission`.
//! - A permission table is replaced wholesale on re-registration.

use crate::model::application::{ApplicationId, ApplicationRecord, LaunchEntryPoint};
use crate::model::permission::{PermissionScope, SessionPermission, StoredPermission};
use crate::permission::table::RegisteredPermissionTable;
use crate::runtime::host::HostProcessId;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};

/// Registry-assigned handle for one launched instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(pub(crate) u64);

impl Display for InstanceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// In-memory state of a launched application.
#[derive(Debug, Clone)]
pub struct RunningApplication {
    instance: Option<InstanceId>,
    record: ApplicationRecord,
    entry_point: LaunchEntryPoint,
    host_process_id: Option<HostProcessId>,
    extensions: BTreeSet<String>,
    event_listeners: BTreeSet<String>,
    session_permissions: BTreeMap<String, SessionPermission>,
    permission_tables: BTreeMap<String, RegisteredPermissionTable>,
}

impl RunningApplication {
    pub fn new(record: ApplicationRecord, entry_point: LaunchEntryPoint) -> Self {
        Self {
            instance: None,
            record,
            entry_point,
            host_process_id: None,
            extensions: BTreeSet::new(),
            event_listeners: BTreeSet::new(),
            session_permissions: BTreeMap::new(),
            permission_tables: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &ApplicationId {
        &self.record.id
    }

    /// Set once the registry accepts the instance.
    pub fn instance(&self) -> Option<InstanceId> {
        self.instance
    }

    pub(crate) fn set_instance(&mut self, instance: InstanceId) {
        self.instance = Some(instance);
    }

    pub fn record(&self) -> &ApplicationRecord {
        &self.record
    }

    pub fn entry_point(&self) -> LaunchEntryPoint {
        self.entry_point
    }

    pub fn host_process_id(&self) -> Option<HostProcessId> {
        self.host_process_id
    }

    pub(crate) fn set_host_process_id(&mut self, host_process_id: HostProcessId) {
        self.host_process_id = Some(host_process_id);
    }

    /// Attaches an extension; returns `false` when already attached.
    pub fn attach_extension(&mut self, extension_name: &str) -> bool {
        self.extensions.insert(extension_name.to_string())
    }

    pub fn contains_extension(&self, extension_name: &str) -> bool {
        self.extensions.contains(extension_name)
    }

    pub fn register_event_listener(&mut self, event_name: &str) {
        self.event_listeners.insert(event_name.to_string());
    }

    pub fn has_event_listener(&self, event_name: &str) -> bool {
        self.event_listeners.contains(event_name)
    }

    /// Replaces the permission table of an attached extension.
    ///
    /// Returns `false` when the extension is not attached.
    pub fn register_permissions(
        &mut self,
        extension_name: &str,
        table: RegisteredPermissionTable,
    ) -> bool {
        if !self.contains_extension(extension_name) {
            return false;
        }
        self.permission_tables
            .insert(extension_name.to_string(), table);
        true
    }

    /// Permission name registered for `api_name` of `extension_name`.
    pub fn registered_permission_name(&self, extension_name: &str, api_name: &str) -> Option<&str> {
        self.permission_tables
            .get(extension_name)?
            .permission_for(api_name)
    }

    pub fn session_permission(&self, permission_name: &str) -> Option<SessionPermission> {
        self.session_permissions.get(permission_name).copied()
    }

    /// Reads one scope; `None` is UNSET.
    pub fn permission(
        &self,
        scope: PermissionScope,
        permission_name: &str,
    ) -> Option<StoredPermission> {
        match scope {
            PermissionScope::Session => self
                .session_permission(permission_name)
                .map(StoredPermission::from),
            PermissionScope::Persistent => self.record.persistent_permission(permission_name),
        }
    }

    pub fn set_session_permission(&mut self, permission_name: &str, value: SessionPermission) {
        self.session_permissions
            .insert(permission_name.to_string(), value);
    }

    pub(crate) fn set_persistent_permission(
        &mut self,
        permission_name: &str,
        value: StoredPermission,
    ) {
        self.record
            .persistent_permissions
            .insert(permission_name.to_string(), value);
    }
}
