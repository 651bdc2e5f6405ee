//! Post-install lifecycle handshake.
//!
//! # Responsibility
//! - After an installed application's main document finished loading,
//!   deliver `onInstalled` and wait for the matching acknowledgment.
//! - Report completion through a `CompletionSignal` the installer holds.
//!
//! # Invariants
//! - Each armed instance completes at most once.
//! - Only an acknowledgment from the same application whose inner event name
//!   is `onInstalled` completes the wait.
//! - There is no timeout; callers that need one wrap `CompletionSignal::wait`.
//! - Ending an instance's session aborts its handshake, even when another
//!   instance of the same application keeps running.

use crate::event::subscriptions::{EventSubscriptions, SubscriptionId};
use crate::event::{Event, EventSink, ON_INSTALLED, ON_JAVASCRIPT_EVENT_ACK};
use crate::runtime::running::{InstanceId, RunningApplication};
use log::{info, warn};
use std::collections::BTreeMap;
use tokio::sync::oneshot;

/// Result of an install handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeOutcome {
    /// The application acknowledged (or registered no listener).
    Completed,
    /// The handshake was abandoned: launch failed or the session ended first.
    Aborted,
}

/// Creates a connected trigger/signal pair.
pub(crate) fn completion_pair() -> (CompletionTrigger, CompletionSignal) {
    let (tx, rx) = oneshot::channel();
    (
        CompletionTrigger { tx },
        CompletionSignal {
            rx,
            outcome: None,
        },
    )
}

/// Firing half, owned by the coordinator or a subscription.
#[derive(Debug)]
pub(crate) struct CompletionTrigger {
    tx: oneshot::Sender<()>,
}

impl CompletionTrigger {
    pub(crate) fn complete(self) {
        let _ = self.tx.send(());
    }
}

/// Install-completion signal; resolves once the handshake is over.
#[derive(Debug)]
pub struct CompletionSignal {
    rx: oneshot::Receiver<()>,
    outcome: Option<HandshakeOutcome>,
}

impl CompletionSignal {
    /// Signal that is already completed.
    pub fn completed() -> Self {
        let (trigger, signal) = completion_pair();
        trigger.complete();
        signal
    }

    /// Signal that is already aborted.
    pub fn aborted() -> Self {
        let (_, signal) = completion_pair();
        signal
    }

    /// Polls without blocking.
    pub fn try_outcome(&mut self) -> Option<HandshakeOutcome> {
        if self.outcome.is_none() {
            self.outcome = match self.rx.try_recv() {
                Ok(()) => Some(HandshakeOutcome::Completed),
                Err(oneshot::error::TryRecvError::Empty) => None,
                Err(oneshot::error::TryRecvError::Closed) => Some(HandshakeOutcome::Aborted),
            };
        }
        self.outcome
    }

    pub fn is_complete(&mut self) -> bool {
        self.try_outcome() == Some(HandshakeOutcome::Completed)
    }

    /// Awaits the outcome; the host loop keeps running meanwhile.
    pub async fn wait(self) -> HandshakeOutcome {
        if let Some(outcome) = self.outcome {
            return outcome;
        }
        match self.rx.await {
            Ok(()) => HandshakeOutcome::Completed,
            Err(_) => HandshakeOutcome::Aborted,
        }
    }
}

/// Tracks instances waiting for their first load after install.
#[derive(Debug, Default)]
pub struct LifecycleCoordinator {
    pending: BTreeMap<InstanceId, CompletionTrigger>,
    /// Instances whose `onInstalled` was sent and whose ack is awaited.
    awaiting_ack: BTreeMap<InstanceId, SubscriptionId>,
}

impl LifecycleCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the handshake for one freshly launched instance.
    pub(crate) fn arm(&mut self, instance: InstanceId) -> CompletionSignal {
        let (trigger, signal) = completion_pair();
        self.pending.insert(instance, trigger);
        signal
    }

    pub fn is_armed(&self, instance: InstanceId) -> bool {
        self.pending.contains_key(&instance)
    }

    /// Abandons the handshake of an instance (its session ended).
    ///
    /// Returns `true` when a handshake was still open.
    pub(crate) fn cancel(
        &mut self,
        instance: InstanceId,
        subscriptions: &mut EventSubscriptions,
    ) -> bool {
        let armed = self.pending.remove(&instance).is_some();
        let awaiting = self
            .awaiting_ack
            .remove(&instance)
            .is_some_and(|subscription| subscriptions.unsubscribe(subscription));
        armed || awaiting
    }

    /// Drives the handshake once `app` finished its initial load.
    pub(crate) fn on_finished_load(
        &mut self,
        app: &RunningApplication,
        events: &dyn EventSink,
        subscriptions: &mut EventSubscriptions,
    ) {
        let Some(instance) = app.instance() else {
            return;
        };
        let Some(trigger) = self.pending.remove(&instance) else {
            return;
        };

        if !app.has_event_listener(ON_INSTALLED) {
            info!(
                "event=install_handshake module=lifecycle status=ok app_id={} listener=none",
                app.id()
            );
            trigger.complete();
            return;
        }

        let event = Event::new(ON_INSTALLED, Vec::new());
        events.send(app.id(), &event);

        let app_id = app.id().clone();
        let awaited = event.name.clone();
        let subscription = subscriptions.subscribe_once(
            app.id().clone(),
            ON_JAVASCRIPT_EVENT_ACK,
            move |ack| ack.acknowledged_event() == Some(awaited.as_str()),
            move |_| {
                info!(
                    "event=install_handshake module=lifecycle status=ok app_id={} listener=acknowledged",
                    app_id
                );
                trigger.complete();
            },
        );
        self.awaiting_ack.insert(instance, subscription);
        info!(
            "event=install_handshake module=lifecycle status=waiting app_id={}",
            app.id()
        );
    }
}

impl Drop for LifecycleCoordinator {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            warn!(
                "event=install_handshake module=lifecycle status=aborted pending={}",
                self.pending.len()
            );
        }
    }
}
