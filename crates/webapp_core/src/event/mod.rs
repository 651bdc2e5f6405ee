//! Application events exchanged with application code.
//!
//! # Responsibility
//! - Define the event envelope and well-known event names.
//! - Define the sink delivering runtime events to an application.
//! - Own one-shot subscriptions on application-originated events.

pub mod subscriptions;

use crate::model::application::ApplicationId;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sent to an application after it was installed.
pub const ON_INSTALLED: &str = "app.runtime.onInstalled";
/// Sent by an application once it handled a runtime event.
///
/// `args[0]` carries the name of the handled event.
pub const ON_JAVASCRIPT_EVENT_ACK: &str = "app.runtime.onJavaScriptEventAck";

/// Named event with positional JSON arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl Event {
    pub fn new(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Acknowledgment for a previously delivered event.
    pub fn ack(acknowledged_event: &str) -> Self {
        Self::new(
            ON_JAVASCRIPT_EVENT_ACK,
            vec![Value::String(acknowledged_event.to_string())],
        )
    }

    /// Name of the event an acknowledgment refers to.
    pub fn acknowledged_event(&self) -> Option<&str> {
        if self.name != ON_JAVASCRIPT_EVENT_ACK {
            return None;
        }
        self.args.first().and_then(Value::as_str)
    }
}

/// Delivers runtime events to application code.
pub trait EventSink {
    fn send(&self, app_id: &ApplicationId, event: &Event);
}

/// Sink used when no host is attached; events are logged and dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedEventSink;

impl EventSink for DetachedEventSink {
    fn send(&self, app_id: &ApplicationId, event: &Event) {
        debug!(
            "event=event_send module=event status=dropped app_id={} name={}",
            app_id, event.name
        );
    }
}
