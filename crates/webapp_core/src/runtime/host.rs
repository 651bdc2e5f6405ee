//! Rendering host boundary.
//!
//! The host that actually displays content is an external collaborator.
//! The service asks it to load an entry point and the host reports back
//! through [`HostEvent`] values fed into `ApplicationService::handle_host_event`.

use crate::event::Event;
use crate::model::application::{ApplicationRecord, EntryPoint};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Identifier of the host-side process rendering one application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HostProcessId(pub u32);

impl Display for HostProcessId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Host-side content loading step.
pub trait ContentLoader {
    /// Starts loading `entry_point`; returns the process now hosting it.
    fn load(
        &self,
        record: &ApplicationRecord,
        entry_point: &EntryPoint,
    ) -> Result<HostProcessId, String>;
}

/// Notifications the host delivers about a loaded application.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// Initial document load completed.
    DidFinishLoad { host_process_id: HostProcessId },
    /// Application code added a listener for `event_name`.
    ListenerRegistered {
        host_process_id: HostProcessId,
        event_name: String,
    },
    /// An extension was loaded into the application.
    ExtensionLoaded {
        host_process_id: HostProcessId,
        extension_name: String,
    },
    /// Application code emitted an event (e.g. an acknowledgment).
    EventEmitted {
        host_process_id: HostProcessId,
        event: Event,
    },
    /// The host session ended.
    SessionTerminated { host_process_id: HostProcessId },
}

impl HostEvent {
    pub fn host_process_id(&self) -> HostProcessId {
        match self {
            Self::DidFinishLoad { host_process_id }
            | Self::ListenerRegistered {
                host_process_id, ..
            }
            | Self::ExtensionLoaded {
                host_process_id, ..
            }
            | Self::EventEmitted {
                host_process_id, ..
            }
            | Self::SessionTerminated { host_process_id } => *host_process_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::DidFinishLoad { .. } => "did_finish_load",
            Self::ListenerRegistered { .. } => "listener_registered",
            Self::ExtensionLoaded { .. } => "extension_loaded",
            Self::EventEmitted { .. } => "event_emitted",
            Self::SessionTerminated { .. } => "session_terminated",
        }
    }
}

/// Loader used when no rendering host is attached (headless tooling).
///
/// Every load fails, so launches yield no application.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedContentLoader;

impl ContentLoader for DetachedContentLoader {
    fn load(
        &self,
        record: &ApplicationRecord,
        _entry_point: &EntryPoint,
    ) -> Result<HostProcessId, String> {
        warn!(
            "event=content_load module=host status=skipped app_id={} reason=no_host",
            record.id
        );
        Err("no rendering host attached".to_string())
    }
}
