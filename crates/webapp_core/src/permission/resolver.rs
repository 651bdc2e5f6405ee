//! Permission resolution and decision delivery.
//!
//! # Responsibility
//! - Reduce (session value, persistent value) to a `RuntimePermission`.
//! - Build the persistent scope from manifest declarations.
//! - Deliver decisions through a single-fulfilment reply channel.
//!
//! # Invariants
//! - `resolve` is a pure function of its two inputs.
//! - A responder answers at most once; a dropped responder reads as
//!   `InvalidRuntimePerm` on the receiving side.

use crate::model::application::ApplicationManifest;
use crate::model::permission::{
    PermissionValueError, RuntimePermission, SessionPermission, StoredPermission,
};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use tokio::sync::oneshot;

/// Resolves the layered policy once the permission name is known.
///
/// Session scope wins when set. The persistent scope answers `*_FOREVER`;
/// UNSET and `PROMPT` both resolve to `InvalidRuntimePerm` because no
/// interactive prompt exists yet.
pub fn resolve(
    session: Option<SessionPermission>,
    persistent: Option<StoredPermission>,
) -> RuntimePermission {
    match session {
        Some(SessionPermission::Allow) => return RuntimePermission::AllowSession,
        Some(SessionPermission::Deny) => return RuntimePermission::DenySession,
        None => {}
    }

    match persistent {
        None | Some(StoredPermission::Prompt) => RuntimePermission::InvalidRuntimePerm,
        Some(StoredPermission::Allow) => RuntimePermission::AllowForever,
        Some(StoredPermission::Deny) => RuntimePermission::DenyForever,
    }
}

/// Builds the PERSISTENT scope from manifest-declared permissions.
pub fn init_persistent_permissions(
    manifest: &ApplicationManifest,
) -> Result<BTreeMap<String, StoredPermission>, PermissionDataError> {
    manifest
        .permissions
        .iter()
        .map(|(name, raw)| {
            StoredPermission::parse(raw.trim())
                .map(|value| (name.clone(), value))
                .map_err(|source| PermissionDataError {
                    permission_name: name.clone(),
                    source,
                })
        })
        .collect()
}

/// Invalid manifest permission data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionDataError {
    pub permission_name: String,
    pub source: PermissionValueError,
}

impl Display for PermissionDataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "permission `{}`: {}", self.permission_name, self.source)
    }
}

impl Error for PermissionDataError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Creates a connected responder/reply pair.
pub fn permission_channel() -> (PermissionResponder, PermissionReply) {
    let (tx, rx) = oneshot::channel();
    (PermissionResponder { tx }, PermissionReply { rx, taken: None })
}

/// Sending half; consumed by `respond`.
#[derive(Debug)]
pub struct PermissionResponder {
    tx: oneshot::Sender<RuntimePermission>,
}

impl PermissionResponder {
    pub fn respond(self, decision: RuntimePermission) {
        // Receiver may already be gone; the caller stopped caring.
        let _ = self.tx.send(decision);
    }
}

/// Receiving half of an access-control decision.
#[derive(Debug)]
pub struct PermissionReply {
    rx: oneshot::Receiver<RuntimePermission>,
    taken: Option<RuntimePermission>,
}

impl PermissionReply {
    /// Reply that is already fulfilled.
    pub fn ready(decision: RuntimePermission) -> Self {
        let (responder, reply) = permission_channel();
        responder.respond(decision);
        reply
    }

    /// Returns the decision if it has been delivered.
    ///
    /// A responder dropped without answering yields `InvalidRuntimePerm`.
    pub fn try_take(&mut self) -> Option<RuntimePermission> {
        if self.taken.is_some() {
            return self.taken;
        }
        self.taken = match self.rx.try_recv() {
            Ok(decision) => Some(decision),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(RuntimePermission::InvalidRuntimePerm),
        };
        self.taken
    }

    /// Awaits the decision.
    pub async fn wait(self) -> RuntimePermission {
        if let Some(decision) = self.taken {
            return decision;
        }
        self.rx
            .await
            .unwrap_or(RuntimePermission::InvalidRuntimePerm)
    }

    /// Blocks the current thread until the decision arrives.
    ///
    /// Must not be called from inside an async runtime.
    pub fn blocking_wait(self) -> RuntimePermission {
        if let Some(decision) = self.taken {
            return decision;
        }
        self.rx
            .blocking_recv()
            .unwrap_or(RuntimePermission::InvalidRuntimePerm)
    }
}
