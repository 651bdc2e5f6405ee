//! Extension-facing access-control adapter.
//!
//! Extensions only know their own name and the API being called; the
//! bridge resolves the calling application and forwards to the service.

use crate::model::permission::RuntimePermission;
use crate::permission::resolver::PermissionReply;
use crate::repo::application_repo::ApplicationStore;
use crate::service::application_service::ApplicationService;
use log::warn;

/// Permission checks as seen from an extension host.
pub trait ExtensionAccessDelegate {
    fn check_api_access_control(&self, extension_name: &str, api_name: &str) -> PermissionReply;

    /// Registers an extension's API-to-permission table for the active
    /// application.
    fn register_permissions(&mut self, extension_name: &str, perm_table: &str) -> bool;
}

/// Delegate that targets the active application (earliest launched one).
pub struct AppExtensionBridge<'a, S: ApplicationStore> {
    service: &'a mut ApplicationService<S>,
}

impl<'a, S: ApplicationStore> AppExtensionBridge<'a, S> {
    pub fn new(service: &'a mut ApplicationService<S>) -> Self {
        Self { service }
    }
}

impl<S: ApplicationStore> ExtensionAccessDelegate for AppExtensionBridge<'_, S> {
    fn check_api_access_control(&self, extension_name: &str, api_name: &str) -> PermissionReply {
        let Some(app_id) = self.service.registry().first().map(|app| app.id().clone()) else {
            warn!(
                "event=access_check module=bridge status=invalid extension={} api={} reason=no_active_application",
                extension_name, api_name
            );
            return PermissionReply::ready(RuntimePermission::InvalidRuntimePerm);
        };
        self.service
            .check_api_access_control(&app_id, extension_name, api_name)
    }

    fn register_permissions(&mut self, extension_name: &str, perm_table: &str) -> bool {
        let Some(app_id) = self.service.registry().first().map(|app| app.id().clone()) else {
            warn!(
                "event=permission_register module=bridge status=error extension={} reason=no_active_application",
                extension_name
            );
            return false;
        };
        self.service
            .register_permissions(&app_id, extension_name, perm_table)
    }
}
