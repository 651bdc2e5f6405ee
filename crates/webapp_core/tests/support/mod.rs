#![allow(dead_code)]

//! Shared fakes for service-level integration tests.

use rusqlite::Connection;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use webapp_core::event::{Event, EventSink};
use webapp_core::package::{NoPlatformHooks, Package, PackageOpener, PlatformHooks};
use webapp_core::{
    ApplicationId, ApplicationObserver, ApplicationRecord, ApplicationService, ApplicationStore,
    ContentLoader, EntryPoint, HostProcessId, JsonManifestLoader, RepoError, RepoResult,
    RuntimeConfig, ServiceCollaborators, ServiceNotification, SqliteApplicationStore,
    StoredPermission,
};

/// Test archive format: a JSON file naming the key seed and its files.
#[derive(Deserialize)]
struct ArchiveDocument {
    key: String,
    files: BTreeMap<String, String>,
}

struct JsonArchive {
    id: ApplicationId,
    files: BTreeMap<String, String>,
}

impl Package for JsonArchive {
    fn id(&self) -> &ApplicationId {
        &self.id
    }

    fn extract(&self, dest: &Path) -> Result<(), String> {
        std::fs::create_dir_all(dest).map_err(|err| err.to_string())?;
        for (name, contents) in &self.files {
            std::fs::write(dest.join(name), contents).map_err(|err| err.to_string())?;
        }
        Ok(())
    }
}

pub struct JsonArchiveOpener;

impl PackageOpener for JsonArchiveOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn Package>, String> {
        let text = std::fs::read_to_string(path).map_err(|err| err.to_string())?;
        let doc: ArchiveDocument =
            serde_json::from_str(&text).map_err(|err| format!("not an archive: {err}"))?;
        Ok(Box::new(JsonArchive {
            id: ApplicationId::generate(&doc.key),
            files: doc.files,
        }))
    }
}

/// Writes a fake archive and returns its path together with the id it carries.
pub fn write_archive(dir: &Path, key: &str, manifest: serde_json::Value) -> (PathBuf, ApplicationId) {
    let path = dir.join(format!("{key}.xpk"));
    let doc = serde_json::json!({
        "key": key,
        "files": {
            "manifest.json": manifest.to_string(),
            "index.html": "<html></html>",
        },
    });
    std::fs::write(&path, doc.to_string()).unwrap();
    (path, ApplicationId::generate(key))
}

/// Writes an unpacked application directory.
pub fn write_app_dir(parent: &Path, name: &str, manifest: serde_json::Value) -> PathBuf {
    let dir = parent.join(name);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("manifest.json"), manifest.to_string()).unwrap();
    std::fs::write(dir.join("index.html"), "<html></html>").unwrap();
    dir
}

pub type LoadLog = Arc<Mutex<Vec<(ApplicationId, EntryPoint, HostProcessId)>>>;

pub struct RecordingContentLoader {
    next_pid: AtomicU32,
    loads: LoadLog,
    fail: bool,
}

impl ContentLoader for RecordingContentLoader {
    fn load(
        &self,
        record: &ApplicationRecord,
        entry_point: &EntryPoint,
    ) -> Result<HostProcessId, String> {
        if self.fail {
            return Err("renderer crashed".to_string());
        }
        let pid = HostProcessId(self.next_pid.fetch_add(1, Ordering::SeqCst));
        self.loads
            .lock()
            .unwrap()
            .push((record.id.clone(), entry_point.clone(), pid));
        Ok(pid)
    }
}

pub type SentLog = Arc<Mutex<Vec<(ApplicationId, Event)>>>;

pub struct RecordingEventSink {
    sent: SentLog,
}

impl EventSink for RecordingEventSink {
    fn send(&self, app_id: &ApplicationId, event: &Event) {
        self.sent
            .lock()
            .unwrap()
            .push((app_id.clone(), event.clone()));
    }
}

#[derive(Default)]
pub struct RecordingObserver {
    seen: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl ApplicationObserver for RecordingObserver {
    fn notify(&self, notification: &ServiceNotification<'_>) {
        let kind = match notification {
            ServiceNotification::Installed(_) => "installed",
            ServiceNotification::Uninstalled(_) => "uninstalled",
            ServiceNotification::DidLaunch(_) => "did_launch",
            ServiceNotification::WillDestroy(_) => "will_destroy",
        };
        self.seen
            .lock()
            .unwrap()
            .push(format!("{kind}:{}", notification.app_id()));
    }
}

pub struct VetoHooks;

impl PlatformHooks for VetoHooks {
    fn before_install(&self, record: &ApplicationRecord, _data_path: &Path) -> Result<(), String> {
        Err(format!("platform refused {}", record.id))
    }

    fn before_uninstall(&self, id: &ApplicationId, _data_path: &Path) -> Result<(), String> {
        Err(format!("platform refused {id}"))
    }
}

/// How `FailingStore::add` fails.
#[derive(Clone, Copy)]
pub enum AddFailure {
    /// The database rejects the write.
    Storage,
    /// Another writer stored the same id after the pre-check.
    Duplicate,
}

/// SQLite store whose `add` always fails; everything else is delegated.
pub struct FailingStore<'c> {
    inner: SqliteApplicationStore<'c>,
    mode: AddFailure,
}

impl<'c> FailingStore<'c> {
    pub fn new(conn: &'c Connection, mode: AddFailure) -> Self {
        Self {
            inner: SqliteApplicationStore::new(conn),
            mode,
        }
    }
}

impl ApplicationStore for FailingStore<'_> {
    fn contains(&self, id: &ApplicationId) -> RepoResult<bool> {
        self.inner.contains(id)
    }

    fn add(&self, record: &ApplicationRecord) -> RepoResult<()> {
        match self.mode {
            AddFailure::Storage => Err(RepoError::InvalidData("disk full".to_string())),
            AddFailure::Duplicate => Err(RepoError::Duplicate(record.id.clone())),
        }
    }

    fn remove(&self, id: &ApplicationId) -> RepoResult<bool> {
        self.inner.remove(id)
    }

    fn get(&self, id: &ApplicationId) -> RepoResult<Option<ApplicationRecord>> {
        self.inner.get(id)
    }

    fn list(&self) -> RepoResult<Vec<ApplicationRecord>> {
        self.inner.list()
    }

    fn update_permission(
        &self,
        id: &ApplicationId,
        permission_name: &str,
        value: StoredPermission,
    ) -> RepoResult<()> {
        self.inner.update_permission(id, permission_name, value)
    }
}

/// Temp data directory plus the shared logs the fakes write into.
pub struct Harness {
    pub root: TempDir,
    pub config: RuntimeConfig,
    pub loads: LoadLog,
    pub sent: SentLog,
    pub observer: Arc<RecordingObserver>,
}

impl Harness {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let config = RuntimeConfig::new(root.path().join("data"));
        Self {
            root,
            config,
            loads: LoadLog::default(),
            sent: SentLog::default(),
            observer: Arc::new(RecordingObserver::default()),
        }
    }

    /// Directory for test inputs, outside `data_path`.
    pub fn inputs(&self) -> PathBuf {
        let dir = self.root.path().join("inputs");
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    pub fn service<'c>(&self, conn: &'c Connection) -> ApplicationService<SqliteApplicationStore<'c>> {
        self.service_with(conn, Box::new(NoPlatformHooks), false)
    }

    pub fn service_with<'c>(
        &self,
        conn: &'c Connection,
        platform: Box<dyn PlatformHooks>,
        fail_loads: bool,
    ) -> ApplicationService<SqliteApplicationStore<'c>> {
        self.build(SqliteApplicationStore::new(conn), platform, fail_loads)
    }

    /// Service over an arbitrary store, with default hooks and loads.
    pub fn service_with_store<S: ApplicationStore>(&self, store: S) -> ApplicationService<S> {
        self.build(store, Box::new(NoPlatformHooks), false)
    }

    fn build<S: ApplicationStore>(
        &self,
        store: S,
        platform: Box<dyn PlatformHooks>,
        fail_loads: bool,
    ) -> ApplicationService<S> {
        let collaborators = ServiceCollaborators {
            packages: Box::new(JsonArchiveOpener),
            manifests: Box::new(JsonManifestLoader),
            content: Box::new(RecordingContentLoader {
                next_pid: AtomicU32::new(100),
                loads: Arc::clone(&self.loads),
                fail: fail_loads,
            }),
            events: Box::new(RecordingEventSink {
                sent: Arc::clone(&self.sent),
            }),
            platform,
        };
        let mut service = ApplicationService::new(self.config.clone(), store, collaborators);
        service.add_observer(self.observer.clone());
        service
    }

    pub fn sent_names(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, event)| event.name.clone())
            .collect()
    }

    pub fn installed_dir(&self, id: &ApplicationId) -> PathBuf {
        self.config.applications_dir().join(id.as_str())
    }

    /// Entries directly below `<data_path>/applications`.
    pub fn application_dir_entries(&self) -> Vec<String> {
        match std::fs::read_dir(self.config.applications_dir()) {
            Ok(entries) => {
                let mut names: Vec<String> = entries
                    .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
                    .collect();
                names.sort();
                names
            }
            Err(_) => Vec::new(),
        }
    }
}
