//! Widget event dispatch
//!
//! Every observable state transition of a widget (show/hide, toggle, timer
//! start/expiry, ...) is announced through a [`WidgetEvent`]. Events bubble
//! and are cancelable; a listener may call [`WidgetEvent::prevent_default`]
//! and the dispatching widget decides what cancellation means for it.
//!
//! Listeners are snapshotted before delivery, so a listener may add or remove
//! listeners (or drive the element again) without deadlocking.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde_json::Value;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle returned by [`EventDispatcher::add_listener`]
    pub struct ListenerId;
}

/// Listener name that receives every event
pub const ANY_EVENT: &str = "*";

/// Listener callback
pub type EventListener = Arc<dyn Fn(&WidgetEvent) + Send + Sync>;

/// A notification emitted by a widget
#[derive(Debug)]
pub struct WidgetEvent {
    /// Event name (e.g. `started`, `toggle`)
    pub name: String,
    /// Payload
    pub detail: Value,
    /// Tag of the emitting widget
    pub source: &'static str,
    pub bubbles: bool,
    pub cancelable: bool,
    default_prevented: AtomicBool,
}

impl WidgetEvent {
    /// Create a bubbling, cancelable event
    pub fn new(source: &'static str, name: impl Into<String>, detail: Value) -> Self {
        Self {
            name: name.into(),
            detail,
            source,
            bubbles: true,
            cancelable: true,
            default_prevented: AtomicBool::new(false),
        }
    }

    /// Ask the emitting widget to skip its default action
    pub fn prevent_default(&self) {
        if self.cancelable {
            self.default_prevented.store(true, Ordering::Release);
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.load(Ordering::Acquire)
    }
}

struct ListenerEntry {
    name: String,
    callback: EventListener,
}

/// Per-element listener registry
#[derive(Default)]
pub struct EventDispatcher {
    listeners: SlotMap<ListenerId, ListenerEntry>,
    by_name: FxHashMap<String, Vec<ListenerId>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for `name` ([`ANY_EVENT`] for all events)
    pub fn add_listener<F>(&mut self, name: impl Into<String>, callback: F) -> ListenerId
    where
        F: Fn(&WidgetEvent) + Send + Sync + 'static,
    {
        let name = name.into();
        let id = self.listeners.insert(ListenerEntry {
            name: name.clone(),
            callback: Arc::new(callback),
        });
        self.by_name.entry(name).or_default().push(id);
        id
    }

    /// Remove a listener; returns false if it was already gone
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let Some(entry) = self.listeners.remove(id) else {
            return false;
        };
        if let Some(ids) = self.by_name.get_mut(&entry.name) {
            ids.retain(|other| *other != id);
            if ids.is_empty() {
                self.by_name.remove(&entry.name);
            }
        }
        true
    }

    /// Listeners interested in `name`, in registration order, wildcards last
    pub fn listeners_for(&self, name: &str) -> Vec<EventListener> {
        let named = self.by_name.get(name).into_iter().flatten();
        let wildcard = self.by_name.get(ANY_EVENT).into_iter().flatten();
        named
            .chain(wildcard)
            .filter_map(|id| self.listeners.get(*id))
            .map(|entry| entry.callback.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
        self.by_name.clear();
    }
}

/// Deliver an event to a snapshot of listeners
///
/// Returns `true` unless a listener prevented the default action.
pub fn deliver(event: &WidgetEvent, listeners: &[EventListener]) -> bool {
    tracing::trace!("<{}> dispatch {} {}", event.source, event.name, event.detail);
    for listener in listeners {
        listener(event);
    }
    !event.default_prevented()
}
