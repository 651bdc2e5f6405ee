//! Registry of running application instances.

use crate::model::application::ApplicationId;
use crate::runtime::host::HostProcessId;
use crate::runtime::running::{InstanceId, RunningApplication};
use log::info;
use tokio::sync::watch;

/// Ordered set of running instances for one host process.
///
/// Launch order is preserved; `first` is the earliest launched instance
/// still running. Multiple instances of one application id are allowed.
#[derive(Debug)]
pub struct ApplicationRegistry {
    applications: Vec<RunningApplication>,
    next_instance: u64,
    idle: watch::Sender<bool>,
}

impl Default for ApplicationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationRegistry {
    pub fn new() -> Self {
        let (idle, _) = watch::channel(false);
        Self {
            applications: Vec::new(),
            next_instance: 1,
            idle,
        }
    }

    /// Adds one instance and returns its handle.
    pub fn register(&mut self, mut application: RunningApplication) -> InstanceId {
        let instance = InstanceId(self.next_instance);
        self.next_instance += 1;
        application.set_instance(instance);
        info!(
            "event=app_register module=registry status=ok app_id={} instance={}",
            application.id(),
            instance
        );
        self.applications.push(application);
        self.idle.send_replace(false);
        instance
    }

    /// Removes one instance and hands it back.
    ///
    /// # Panics
    /// Panics when `instance` is not registered; that is an invariant
    /// violation in the caller, never a recoverable condition.
    pub fn unregister(&mut self, instance: InstanceId) -> RunningApplication {
        let Some(position) = self
            .applications
            .iter()
            .position(|app| app.instance() == Some(instance))
        else {
            panic!("unregister of unknown application instance {instance}");
        };

        let application = self.applications.remove(position);
        info!(
            "event=app_unregister module=registry status=ok app_id={} instance={} remaining={}",
            application.id(),
            instance,
            self.applications.len()
        );
        if self.applications.is_empty() {
            self.idle.send_replace(true);
        }
        application
    }

    /// Drops an instance that never finished launching.
    ///
    /// Unlike `unregister` this never publishes idle: a failed launch is
    /// not the end of the host's work.
    pub(crate) fn discard(&mut self, instance: InstanceId) -> Option<RunningApplication> {
        let position = self
            .applications
            .iter()
            .position(|app| app.instance() == Some(instance))?;
        let application = self.applications.remove(position);
        info!(
            "event=app_discard module=registry status=ok app_id={} instance={} remaining={}",
            application.id(),
            instance,
            self.applications.len()
        );
        Some(application)
    }

    pub fn find_by_id(&self, id: &ApplicationId) -> Option<&RunningApplication> {
        self.applications.iter().find(|app| app.id() == id)
    }

    pub fn find_by_id_mut(&mut self, id: &ApplicationId) -> Option<&mut RunningApplication> {
        self.applications.iter_mut().find(|app| app.id() == id)
    }

    pub fn find_by_host_process_id(&self, id: HostProcessId) -> Option<&RunningApplication> {
        self.applications
            .iter()
            .find(|app| app.host_process_id() == Some(id))
    }

    pub fn find_by_host_process_id_mut(
        &mut self,
        id: HostProcessId,
    ) -> Option<&mut RunningApplication> {
        self.applications
            .iter_mut()
            .find(|app| app.host_process_id() == Some(id))
    }

    pub fn find_by_instance(&self, instance: InstanceId) -> Option<&RunningApplication> {
        self.applications
            .iter()
            .find(|app| app.instance() == Some(instance))
    }

    pub(crate) fn find_by_instance_mut(
        &mut self,
        instance: InstanceId,
    ) -> Option<&mut RunningApplication> {
        self.applications
            .iter_mut()
            .find(|app| app.instance() == Some(instance))
    }

    /// Every running instance of one application id.
    pub(crate) fn instances_mut<'a>(
        &'a mut self,
        id: &'a ApplicationId,
    ) -> impl Iterator<Item = &'a mut RunningApplication> + 'a {
        self.applications.iter_mut().filter(move |app| app.id() == id)
    }

    /// Active application: the earliest launched one still running.
    pub fn first(&self) -> Option<&RunningApplication> {
        self.applications.first()
    }

    pub fn len(&self) -> usize {
        self.applications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applications.is_empty()
    }

    /// Running application ids in launch order.
    pub fn ids(&self) -> Vec<ApplicationId> {
        self.applications.iter().map(|app| app.id().clone()).collect()
    }

    /// Subscribes to the "no more work" signal.
    ///
    /// Turns `true` when the last instance is unregistered and back to
    /// `false` when a new instance registers.
    pub fn idle_signal(&self) -> watch::Receiver<bool> {
        self.idle.subscribe()
    }

    pub fn is_idle(&self) -> bool {
        *self.idle.borrow()
    }
}
