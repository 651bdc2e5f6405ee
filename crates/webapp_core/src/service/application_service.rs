//! Application lifecycle orchestration.
//!
//! # Responsibility
//! - Install packages or directories into `<data_path>/applications/<id>`.
//! - Uninstall stored applications and remove their resources.
//! - Launch applications by id, path or URL and track them in the registry.
//! - Answer extension API access-control checks from the layered policy.
//!
//! # Invariants
//! - Install and uninstall never leave a stored record without a completed
//!   platform hook.
//! - Resource directories created by a failed install are removed unless the
//!   failure happened after the record was handed to the store.
//! - Access control never fails with an error; every invalid lookup answers
//!   `RuntimePermission::InvalidRuntimePerm` and logs the reason.
//! - Observers are notified after the state change they describe.

use crate::config::RuntimeConfig;
use crate::event::subscriptions::EventSubscriptions;
use crate::event::{DetachedEventSink, EventSink};
use crate::manifest::{JsonManifestLoader, ManifestLoader, TrustLevel};
use crate::model::application::{ApplicationId, ApplicationRecord, LaunchEntryPoint};
use crate::model::permission::{
    PermissionScope, RuntimePermission, SessionPermission, StoredPermission,
};
use crate::package::{NoPlatformHooks, PackageOpener, PlatformHooks, UnsupportedPackageOpener};
use crate::permission::resolver::{
    init_persistent_permissions, permission_channel, resolve, PermissionReply,
};
use crate::permission::table::RegisteredPermissionTable;
use crate::repo::application_repo::{ApplicationStore, RepoError};
use crate::runtime::host::{ContentLoader, DetachedContentLoader, HostEvent};
use crate::runtime::registry::ApplicationRegistry;
use crate::runtime::running::{InstanceId, RunningApplication};
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::lifecycle::{CompletionSignal, LifecycleCoordinator};
use crate::service::observer::{ApplicationObserver, ServiceNotification};
use log::{debug, error, info, warn};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Name given to applications launched straight from a URL.
pub const AD_HOC_APPLICATION_NAME: &str = "Web Application";
const AD_HOC_APPLICATION_VERSION: &str = "0";
const STAGING_PREFIX: &str = ".staging-";

/// Out-of-crate collaborators the service drives.
pub struct ServiceCollaborators {
    pub packages: Box<dyn PackageOpener>,
    pub manifests: Box<dyn ManifestLoader>,
    pub content: Box<dyn ContentLoader>,
    pub events: Box<dyn EventSink>,
    pub platform: Box<dyn PlatformHooks>,
}

impl ServiceCollaborators {
    /// Collaborators for tooling without a rendering host.
    ///
    /// Archives are rejected and launches fail; directory installs,
    /// uninstall and listing work.
    pub fn headless() -> Self {
        Self {
            packages: Box::new(UnsupportedPackageOpener),
            manifests: Box::new(JsonManifestLoader),
            content: Box::new(DetachedContentLoader),
            events: Box::new(DetachedEventSink),
            platform: Box::new(NoPlatformHooks),
        }
    }
}

impl Default for ServiceCollaborators {
    fn default() -> Self {
        Self::headless()
    }
}

/// What to launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchTarget {
    /// An installed application.
    Id(ApplicationId),
    /// An unpacked application directory, loaded with command-line trust.
    Path(PathBuf),
    /// A web URL wrapped in a synthesized record.
    Url(String),
}

/// Successful install result.
#[derive(Debug)]
pub struct InstallReport {
    pub id: ApplicationId,
    /// Whether the main document was launched for the install handshake.
    pub launched: bool,
    /// Resolves when the `onInstalled` handshake is over.
    pub completion: CompletionSignal,
}

/// Resource directory an install is working with.
struct StagedResources {
    id: ApplicationId,
    dir: PathBuf,
    /// `true` when this install created `dir` and must remove it on failure.
    owned: bool,
}

impl StagedResources {
    fn discard(&self) {
        if self.owned {
            remove_dir_best_effort(&self.dir);
        }
    }
}

/// Install/uninstall/launch orchestrator for one host process.
pub struct ApplicationService<S: ApplicationStore> {
    config: RuntimeConfig,
    store: S,
    packages: Box<dyn PackageOpener>,
    manifests: Box<dyn ManifestLoader>,
    content: Box<dyn ContentLoader>,
    events: Box<dyn EventSink>,
    platform: Box<dyn PlatformHooks>,
    registry: ApplicationRegistry,
    subscriptions: EventSubscriptions,
    lifecycle: LifecycleCoordinator,
    observers: Vec<Arc<dyn ApplicationObserver>>,
}

impl<S: ApplicationStore> ApplicationService<S> {
    pub fn new(config: RuntimeConfig, store: S, collaborators: ServiceCollaborators) -> Self {
        Self {
            config,
            store,
            packages: collaborators.packages,
            manifests: collaborators.manifests,
            content: collaborators.content,
            events: collaborators.events,
            platform: collaborators.platform,
            registry: ApplicationRegistry::new(),
            subscriptions: EventSubscriptions::new(),
            lifecycle: LifecycleCoordinator::new(),
            observers: Vec::new(),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn registry(&self) -> &ApplicationRegistry {
        &self.registry
    }

    /// Number of one-shot event subscriptions still waiting.
    pub fn pending_subscriptions(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn add_observer(&mut self, observer: Arc<dyn ApplicationObserver>) {
        self.observers.push(observer);
    }

    /// Detaches a previously added observer; `false` when it was not attached.
    pub fn remove_observer(&mut self, observer: &Arc<dyn ApplicationObserver>) -> bool {
        let before = self.observers.len();
        self.observers
            .retain(|candidate| !Arc::ptr_eq(candidate, observer));
        self.observers.len() != before
    }

    /// Installs a package archive or an unpacked application directory.
    ///
    /// Directories are installed in place; archives are extracted below
    /// `<data_path>/applications`. When the manifest names a main document
    /// the application is launched and `completion` tracks the `onInstalled`
    /// handshake; otherwise `completion` is already complete.
    ///
    /// # Errors
    /// - `AlreadyInstalled` when the derived id is stored; nothing changes.
    /// - `InvalidPackage`, `ManifestInvalid`, `PermissionDataInvalid` and
    ///   `PlatformVeto` after removing any directory this call created.
    /// - `PersistFailed` when the store rejects the record; extracted
    ///   resources are left on disk and their path is logged.
    pub fn install(&mut self, source: &Path) -> ServiceResult<InstallReport> {
        let started_at = Instant::now();
        info!(
            "event=app_install module=service status=start source={}",
            source.display()
        );

        let result = self.install_inner(source);
        let duration_ms = started_at.elapsed().as_millis();
        match &result {
            Ok(report) => info!(
                "event=app_install module=service status=ok app_id={} launched={} duration_ms={}",
                report.id, report.launched, duration_ms
            ),
            Err(ServiceError::AlreadyInstalled { id }) => info!(
                "event=app_install module=service status=skipped app_id={} reason=already_installed",
                id
            ),
            Err(err) => error!(
                "event=app_install module=service status=error error_code={} duration_ms={} error={}",
                err.code(),
                duration_ms,
                err
            ),
        }
        result
    }

    fn install_inner(&mut self, source: &Path) -> ServiceResult<InstallReport> {
        if !source.exists() {
            return Err(ServiceError::InvalidPackage(format!(
                "source does not exist: {}",
                source.display()
            )));
        }

        let applications_dir = self.config.applications_dir();
        fs::create_dir_all(&applications_dir).map_err(|err| {
            ServiceError::StorageUnavailable(format!(
                "cannot create {}: {err}",
                applications_dir.display()
            ))
        })?;

        let staged = if source.is_dir() {
            self.stage_directory(source)?
        } else {
            self.stage_package(source, &applications_dir)?
        };

        let record = match self.prepare_record(&staged) {
            Ok(record) => record,
            Err(err) => {
                staged.discard();
                return Err(err);
            }
        };

        if let Err(message) = self
            .platform
            .before_install(&record, &self.config.data_path)
        {
            staged.discard();
            return Err(ServiceError::PlatformVeto(message));
        }

        match self.store.add(&record) {
            Ok(()) => {}
            Err(RepoError::Duplicate(id)) => {
                // Another process stored the same id after our pre-check.
                warn!(
                    "event=app_install module=service status=conflict app_id={} path={}",
                    id,
                    staged.dir.display()
                );
                return Err(ServiceError::AlreadyInstalled { id });
            }
            Err(err) => {
                error!(
                    "event=app_install module=service status=error error_code=persist_failed app_id={} orphaned_path={}",
                    record.id,
                    staged.dir.display()
                );
                return Err(ServiceError::PersistFailed(err.to_string()));
            }
        }

        let id = record.id.clone();
        self.notify(&ServiceNotification::Installed(&id));

        if !record.has_main_document() {
            return Ok(InstallReport {
                id,
                launched: false,
                completion: CompletionSignal::completed(),
            });
        }

        match self.launch_record(record, LaunchEntryPoint::Default) {
            Some(instance) => Ok(InstallReport {
                id,
                launched: true,
                completion: self.lifecycle.arm(instance),
            }),
            None => {
                warn!(
                    "event=install_handshake module=service status=aborted app_id={} reason=launch_failed",
                    id
                );
                Ok(InstallReport {
                    id,
                    launched: false,
                    completion: CompletionSignal::aborted(),
                })
            }
        }
    }

    fn stage_directory(&self, source: &Path) -> ServiceResult<StagedResources> {
        let dir = source.canonicalize().map_err(|err| {
            ServiceError::InvalidPackage(format!("{}: {err}", source.display()))
        })?;
        let id = ApplicationId::from_path(&dir);
        self.ensure_not_installed(&id)?;
        Ok(StagedResources {
            id,
            dir,
            owned: false,
        })
    }

    fn stage_package(
        &self,
        source: &Path,
        applications_dir: &Path,
    ) -> ServiceResult<StagedResources> {
        let package = self
            .packages
            .open(source)
            .map_err(ServiceError::InvalidPackage)?;
        let id = package.id().clone();
        self.ensure_not_installed(&id)?;

        let staging = applications_dir.join(format!("{STAGING_PREFIX}{}", Uuid::new_v4()));
        if let Err(message) = package.extract(&staging) {
            remove_dir_best_effort(&staging);
            return Err(ServiceError::InvalidPackage(message));
        }

        let dest = applications_dir.join(id.as_str());
        if dest.exists() {
            // Leftover from an install whose record never landed.
            if let Err(err) = fs::remove_dir_all(&dest) {
                remove_dir_best_effort(&staging);
                return Err(ServiceError::StorageUnavailable(format!(
                    "cannot replace stale {}: {err}",
                    dest.display()
                )));
            }
        }
        if let Err(err) = fs::rename(&staging, &dest) {
            remove_dir_best_effort(&staging);
            return Err(ServiceError::StorageUnavailable(format!(
                "cannot move resources to {}: {err}",
                dest.display()
            )));
        }

        Ok(StagedResources {
            id,
            dir: dest,
            owned: true,
        })
    }

    fn prepare_record(&self, staged: &StagedResources) -> ServiceResult<ApplicationRecord> {
        let manifest = self
            .manifests
            .load_from_dir(&staged.dir, TrustLevel::Installed)
            .map_err(|err| ServiceError::ManifestInvalid(err.to_string()))?;
        let mut record = ApplicationRecord::new(staged.id.clone(), manifest, staged.dir.clone());
        record.persistent_permissions = init_persistent_permissions(&record.manifest)
            .map_err(|err| ServiceError::PermissionDataInvalid(err.to_string()))?;
        Ok(record)
    }

    fn ensure_not_installed(&self, id: &ApplicationId) -> ServiceResult<()> {
        match self.store.contains(id) {
            Ok(false) => Ok(()),
            Ok(true) => Err(ServiceError::AlreadyInstalled { id: id.clone() }),
            Err(err) => Err(ServiceError::StorageUnavailable(err.to_string())),
        }
    }

    /// Uninstalls a stored application.
    ///
    /// Runs the platform hook, removes the record, then removes
    /// `<data_path>/applications/<id>` when present. Running instances are
    /// left alone.
    ///
    /// # Errors
    /// - `NotInstalled` when the id is unknown; nothing changes.
    /// - `ResourceCleanupFailed` when the record is gone but the directory
    ///   could not be removed; observers are still notified.
    pub fn uninstall(&mut self, id: &ApplicationId) -> ServiceResult<()> {
        let started_at = Instant::now();
        let result = self.uninstall_inner(id);
        let duration_ms = started_at.elapsed().as_millis();
        match &result {
            Ok(()) => info!(
                "event=app_uninstall module=service status=ok app_id={} duration_ms={}",
                id, duration_ms
            ),
            Err(err) => error!(
                "event=app_uninstall module=service status=error app_id={} error_code={} error={}",
                id,
                err.code(),
                err
            ),
        }
        result
    }

    fn uninstall_inner(&mut self, id: &ApplicationId) -> ServiceResult<()> {
        match self.store.contains(id) {
            Ok(true) => {}
            Ok(false) => return Err(ServiceError::NotInstalled(id.clone())),
            Err(err) => return Err(ServiceError::StorageUnavailable(err.to_string())),
        }

        self.platform
            .before_uninstall(id, &self.config.data_path)
            .map_err(ServiceError::PlatformVeto)?;

        match self.store.remove(id) {
            Ok(true) => {}
            Ok(false) => return Err(ServiceError::NotInstalled(id.clone())),
            Err(err) => return Err(ServiceError::StorageUnavailable(err.to_string())),
        }

        let resources = self.config.applications_dir().join(id.as_str());
        let cleanup = if resources.exists() {
            fs::remove_dir_all(&resources).map_err(|err| ServiceError::ResourceCleanupFailed {
                id: id.clone(),
                message: format!("{}: {err}", resources.display()),
            })
        } else {
            Ok(())
        };

        self.notify(&ServiceNotification::Uninstalled(id));
        cleanup
    }

    /// Launches a target and returns the new running instance.
    ///
    /// Every failure is logged and yields `None`.
    pub fn launch(&mut self, target: LaunchTarget) -> Option<&RunningApplication> {
        let (record, kind) = match self.resolve_launch_target(&target) {
            Ok(resolved) => resolved,
            Err(message) => {
                error!(
                    "event=app_launch module=service status=error target={:?} error={}",
                    target, message
                );
                return None;
            }
        };
        let instance = self.launch_record(record, kind)?;
        self.registry.find_by_instance(instance)
    }

    fn resolve_launch_target(
        &self,
        target: &LaunchTarget,
    ) -> Result<(ApplicationRecord, LaunchEntryPoint), String> {
        match target {
            LaunchTarget::Id(id) => match self.store.get(id) {
                Ok(Some(record)) => Ok((record, LaunchEntryPoint::Default)),
                Ok(None) => Err(format!("application {id} is not installed")),
                Err(err) => Err(err.to_string()),
            },
            LaunchTarget::Path(path) => {
                if !path.is_dir() {
                    return Err(format!("not an application directory: {}", path.display()));
                }
                let dir = path
                    .canonicalize()
                    .map_err(|err| format!("{}: {err}", path.display()))?;
                let manifest = self
                    .manifests
                    .load_from_dir(&dir, TrustLevel::CommandLine)
                    .map_err(|err| err.to_string())?;
                let mut record = ApplicationRecord::new(ApplicationId::from_path(&dir), manifest, dir);
                record.persistent_permissions =
                    init_persistent_permissions(&record.manifest).map_err(|err| err.to_string())?;
                Ok((record, LaunchEntryPoint::Default))
            }
            LaunchTarget::Url(url) => {
                let url = url.trim();
                if url.is_empty() {
                    return Err("launch URL is empty".to_string());
                }
                let value = json!({
                    "name": AD_HOC_APPLICATION_NAME,
                    "version": AD_HOC_APPLICATION_VERSION,
                    "launch_web_url": url,
                });
                let manifest = self
                    .manifests
                    .load_from_value(&value, TrustLevel::CommandLine)
                    .map_err(|err| err.to_string())?;
                let record = ApplicationRecord::new(ApplicationId::generate(url), manifest, PathBuf::new());
                Ok((record, LaunchEntryPoint::LaunchWebUrl))
            }
        }
    }

    fn launch_record(
        &mut self,
        record: ApplicationRecord,
        kind: LaunchEntryPoint,
    ) -> Option<InstanceId> {
        let Some(entry_point) = record.entry_point(kind) else {
            error!(
                "event=app_launch module=service status=error app_id={} reason=no_entry_point",
                record.id
            );
            return None;
        };

        let instance = self
            .registry
            .register(RunningApplication::new(record.clone(), kind));
        let host_process_id = match self.content.load(&record, &entry_point) {
            Ok(host_process_id) => host_process_id,
            Err(message) => {
                error!(
                    "event=app_launch module=service status=error app_id={} error={}",
                    record.id, message
                );
                self.registry.discard(instance);
                return None;
            }
        };
        if let Some(app) = self.registry.find_by_instance_mut(instance) {
            app.set_host_process_id(host_process_id);
        }

        let app = self.registry.find_by_instance(instance)?;
        info!(
            "event=app_launch module=service status=ok app_id={} instance={} host_process_id={}",
            app.id(),
            instance,
            host_process_id
        );
        self.notify(&ServiceNotification::DidLaunch(app));
        Some(instance)
    }

    /// Feeds one host notification into the service.
    ///
    /// Events from processes hosting no registered application are ignored.
    pub fn handle_host_event(&mut self, event: HostEvent) {
        let host_process_id = event.host_process_id();
        let Some(instance) = self
            .registry
            .find_by_host_process_id(host_process_id)
            .and_then(RunningApplication::instance)
        else {
            warn!(
                "event=host_event module=service status=ignored kind={} host_process_id={} reason=unknown_process",
                event.kind(),
                host_process_id
            );
            return;
        };
        debug!(
            "event=host_event module=service status=ok kind={} instance={}",
            event.kind(),
            instance
        );

        match event {
            HostEvent::DidFinishLoad { .. } => {
                if let Some(app) = self.registry.find_by_instance(instance) {
                    self.lifecycle
                        .on_finished_load(app, self.events.as_ref(), &mut self.subscriptions);
                }
            }
            HostEvent::ListenerRegistered { event_name, .. } => {
                if let Some(app) = self.registry.find_by_instance_mut(instance) {
                    app.register_event_listener(&event_name);
                }
            }
            HostEvent::ExtensionLoaded { extension_name, .. } => {
                if let Some(app) = self.registry.find_by_instance_mut(instance) {
                    app.attach_extension(&extension_name);
                }
            }
            HostEvent::EventEmitted { event, .. } => {
                let Some(app_id) = self
                    .registry
                    .find_by_instance(instance)
                    .map(|app| app.id().clone())
                else {
                    return;
                };
                let fired = self.subscriptions.dispatch(&app_id, &event);
                debug!(
                    "event=app_event module=service status=ok app_id={} name={} fired={}",
                    app_id, event.name, fired
                );
            }
            HostEvent::SessionTerminated { .. } => self.terminate(instance),
        }
    }

    fn terminate(&mut self, instance: InstanceId) {
        if let Some(app) = self.registry.find_by_instance(instance) {
            self.notify(&ServiceNotification::WillDestroy(app));
        }
        if self.lifecycle.cancel(instance, &mut self.subscriptions) {
            warn!(
                "event=install_handshake module=service status=aborted instance={} reason=session_terminated",
                instance
            );
        }

        let app = self.registry.unregister(instance);
        if self.registry.find_by_id(app.id()).is_none() {
            let dropped = self.subscriptions.remove_application(app.id());
            if dropped > 0 {
                debug!(
                    "event=app_event module=service status=dropped app_id={} subscriptions={}",
                    app.id(),
                    dropped
                );
            }
        }
    }

    /// Decides whether `app_id` may call `api_name` of `extension_name`.
    ///
    /// The decision is delivered through the returned reply; lookups that
    /// fail answer `InvalidRuntimePerm`.
    pub fn check_api_access_control(
        &self,
        app_id: &ApplicationId,
        extension_name: &str,
        api_name: &str,
    ) -> PermissionReply {
        let (responder, reply) = permission_channel();
        let decision = self.evaluate_access(app_id, extension_name, api_name);
        debug!(
            "event=access_check module=service app_id={} extension={} api={} decision={}",
            app_id, extension_name, api_name, decision
        );
        responder.respond(decision);
        reply
    }

    fn evaluate_access(
        &self,
        app_id: &ApplicationId,
        extension_name: &str,
        api_name: &str,
    ) -> RuntimePermission {
        let Some(app) = self.registry.find_by_id(app_id) else {
            error!(
                "event=access_check module=service status=invalid app_id={} reason=not_running",
                app_id
            );
            return RuntimePermission::InvalidRuntimePerm;
        };
        if !app.contains_extension(extension_name) {
            error!(
                "event=access_check module=service status=invalid app_id={} extension={} reason=extension_not_loaded",
                app_id, extension_name
            );
            return RuntimePermission::InvalidRuntimePerm;
        }
        let Some(permission_name) = app.registered_permission_name(extension_name, api_name)
        else {
            error!(
                "event=access_check module=service status=invalid app_id={} extension={} api={} reason=api_not_registered",
                app_id, extension_name, api_name
            );
            return RuntimePermission::InvalidRuntimePerm;
        };

        resolve(
            app.session_permission(permission_name),
            app.permission(PermissionScope::Persistent, permission_name),
        )
    }

    /// Registers the API-to-permission table of a loaded extension.
    ///
    /// Re-registering replaces the previous table. Returns `false` when the
    /// application is not running, the extension is not loaded, or the
    /// table is malformed.
    pub fn register_permissions(
        &mut self,
        app_id: &ApplicationId,
        extension_name: &str,
        perm_table: &str,
    ) -> bool {
        let Some(app) = self.registry.find_by_id_mut(app_id) else {
            error!(
                "event=permission_register module=service status=error app_id={} reason=not_running",
                app_id
            );
            return false;
        };
        if !app.contains_extension(extension_name) {
            error!(
                "event=permission_register module=service status=error app_id={} extension={} reason=extension_not_loaded",
                app_id, extension_name
            );
            return false;
        }
        let table = match RegisteredPermissionTable::parse(perm_table) {
            Ok(table) => table,
            Err(err) => {
                error!(
                    "event=permission_register module=service status=error app_id={} extension={} error={}",
                    app_id, extension_name, err
                );
                return false;
            }
        };

        let apis = table.len();
        let registered = app.register_permissions(extension_name, table);
        if registered {
            info!(
                "event=permission_register module=service status=ok app_id={} extension={} apis={}",
                app_id, extension_name, apis
            );
        }
        registered
    }

    /// Sets a SESSION decision on the running application.
    ///
    /// Returns `false` when the application is not running.
    pub fn set_session_permission(
        &mut self,
        app_id: &ApplicationId,
        permission_name: &str,
        value: SessionPermission,
    ) -> bool {
        match self.registry.find_by_id_mut(app_id) {
            Some(app) => {
                app.set_session_permission(permission_name, value);
                true
            }
            None => false,
        }
    }

    /// Persists a PERSISTENT decision and applies it to running instances.
    ///
    /// # Errors
    /// - `NotInstalled` when no record is stored for `app_id`.
    /// - `PermissionDataInvalid` when the manifest does not declare
    ///   `permission_name`; nothing is written.
    pub fn set_persistent_permission(
        &mut self,
        app_id: &ApplicationId,
        permission_name: &str,
        value: StoredPermission,
    ) -> ServiceResult<()> {
        let record = match self.store.get(app_id) {
            Ok(Some(record)) => record,
            Ok(None) => return Err(ServiceError::NotInstalled(app_id.clone())),
            Err(err) => return Err(ServiceError::StorageUnavailable(err.to_string())),
        };
        if !record.manifest.permissions.contains_key(permission_name) {
            warn!(
                "event=permission_update module=service status=rejected app_id={} permission={} reason=undeclared",
                app_id, permission_name
            );
            return Err(ServiceError::PermissionDataInvalid(format!(
                "permission `{permission_name}` is not declared by {app_id}"
            )));
        }

        match self.store.update_permission(app_id, permission_name, value) {
            Ok(()) => {}
            Err(RepoError::NotFound(id)) => return Err(ServiceError::NotInstalled(id)),
            Err(err) => return Err(ServiceError::PersistFailed(err.to_string())),
        }
        for app in self.registry.instances_mut(app_id) {
            app.set_persistent_permission(permission_name, value);
        }
        info!(
            "event=permission_update module=service status=ok app_id={} permission={} value={}",
            app_id,
            permission_name,
            value.as_str()
        );
        Ok(())
    }

    /// Stored applications in install order.
    pub fn installed_applications(&self) -> ServiceResult<Vec<ApplicationRecord>> {
        self.store
            .list()
            .map_err(|err| ServiceError::StorageUnavailable(err.to_string()))
    }

    pub fn application(&self, id: &ApplicationId) -> ServiceResult<Option<ApplicationRecord>> {
        self.store
            .get(id)
            .map_err(|err| ServiceError::StorageUnavailable(err.to_string()))
    }

    fn notify(&self, notification: &ServiceNotification<'_>) {
        for observer in &self.observers {
            observer.notify(notification);
        }
    }
}

fn remove_dir_best_effort(dir: &Path) {
    if !dir.exists() {
        return;
    }
    if let Err(err) = fs::remove_dir_all(dir) {
        warn!(
            "event=resource_cleanup module=service status=error path={} error={}",
            dir.display(),
            err
        );
    }
}
