//! Outward lifecycle notifications.

use crate::model::application::ApplicationId;
use crate::runtime::running::RunningApplication;

/// Lifecycle notification delivered to observers.
#[derive(Debug, Clone, Copy)]
pub enum ServiceNotification<'a> {
    Installed(&'a ApplicationId),
    Uninstalled(&'a ApplicationId),
    DidLaunch(&'a RunningApplication),
    WillDestroy(&'a RunningApplication),
}

impl ServiceNotification<'_> {
    pub fn app_id(&self) -> &ApplicationId {
        match self {
            Self::Installed(id) | Self::Uninstalled(id) => id,
            Self::DidLaunch(app) | Self::WillDestroy(app) => app.id(),
        }
    }
}

/// Receives lifecycle notifications from `ApplicationService`.
pub trait ApplicationObserver {
    fn notify(&self, notification: &ServiceNotification<'_>);
}
