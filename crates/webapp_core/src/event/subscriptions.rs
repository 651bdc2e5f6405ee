//! One-shot event subscriptions keyed by (application id, event name).
//!
//! # Invariants
//! - A subscription fires at most once and is removed before its action runs.
//! - Events are only offered to subscriptions of the emitting application.

use crate::event::Event;
use crate::model::application::ApplicationId;
use std::collections::BTreeMap;

type Predicate = Box<dyn Fn(&Event) -> bool + Send>;
type Action = Box<dyn FnOnce(&Event) + Send>;

/// Handle identifying one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    predicate: Predicate,
    action: Action,
}

/// Table of pending one-shot subscriptions.
#[derive(Default)]
pub struct EventSubscriptions {
    entries: BTreeMap<(ApplicationId, String), Vec<Subscription>>,
    next_id: u64,
}

impl std::fmt::Debug for EventSubscriptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSubscriptions")
            .field("pending", &self.len())
            .finish()
    }
}

impl EventSubscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `action` to the first `event_name` from `app_id` accepted
    /// by `predicate`.
    pub fn subscribe_once(
        &mut self,
        app_id: ApplicationId,
        event_name: &str,
        predicate: impl Fn(&Event) -> bool + Send + 'static,
        action: impl FnOnce(&Event) + Send + 'static,
    ) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.entries
            .entry((app_id, event_name.to_string()))
            .or_default()
            .push(Subscription {
                id,
                predicate: Box::new(predicate),
                action: Box::new(action),
            });
        id
    }

    /// Offers `event` emitted by `app_id`; returns how many subscriptions fired.
    pub fn dispatch(&mut self, app_id: &ApplicationId, event: &Event) -> usize {
        let key = (app_id.clone(), event.name.clone());
        let Some(pending) = self.entries.remove(&key) else {
            return 0;
        };

        let (matched, kept): (Vec<Subscription>, Vec<Subscription>) =
            pending.into_iter().partition(|sub| (sub.predicate)(event));
        if !kept.is_empty() {
            self.entries.insert(key, kept);
        }

        let fired = matched.len();
        for subscription in matched {
            (subscription.action)(event);
        }
        fired
    }

    /// Drops one subscription without firing it.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let mut removed = false;
        self.entries.retain(|_, subs| {
            let before = subs.len();
            subs.retain(|sub| sub.id != id);
            removed |= subs.len() != before;
            !subs.is_empty()
        });
        removed
    }

    /// Drops every subscription of one application without firing them.
    pub fn remove_application(&mut self, app_id: &ApplicationId) -> usize {
        let mut removed = 0;
        self.entries.retain(|(owner, _), subs| {
            if owner == app_id {
                removed += subs.len();
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
