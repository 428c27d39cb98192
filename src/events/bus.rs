//! Typed, priority-ordered event bus
//!
//! Listeners are stored per event type in the order event types were first
//! subscribed to. Within a type, listeners run in non-increasing priority order
//! and ties keep registration order. Every listener is tagged with an owner id
//! so a module's whole footprint can be removed in one call.

use crate::core::error_handling::{run_guarded, BoxedError};
use std::any::{Any, TypeId};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Result returned by event listeners
pub type ListenerResult = Result<(), BoxedError>;

type ErasedCallback = Rc<dyn Fn(&mut dyn Any) -> ListenerResult>;

/// Handle identifying a single subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Per-subscription options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    /// Higher runs earlier
    pub priority: i32,
    /// Name used in diagnostics
    pub debug_name: Option<String>,
    /// Keep the listener when its owner's listeners are bulk-removed
    pub survive_unload: bool,
}

impl ListenerOptions {
    pub fn with_priority(priority: i32) -> Self {
        Self {
            priority,
            ..Self::default()
        }
    }

    pub fn named(mut self, debug_name: impl Into<String>) -> Self {
        self.debug_name = Some(debug_name.into());
        self
    }

    pub fn surviving_unload(mut self) -> Self {
        self.survive_unload = true;
        self
    }
}

/// Outcome of one publish
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Listeners that completed successfully
    pub delivered: usize,
    /// Listeners that returned an error or panicked
    pub failed: usize,
}

/// Read-only view of a listener, for diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerInfo {
    pub id: ListenerId,
    pub event_type: &'static str,
    pub owner: String,
    pub priority: i32,
    pub debug_name: Option<String>,
    pub survive_unload: bool,
}

struct Listener {
    id: ListenerId,
    owner: String,
    options: ListenerOptions,
    callback: ErasedCallback,
}

impl Listener {
    fn display_name(&self) -> String {
        match &self.options.debug_name {
            Some(name) => name.clone(),
            None => format!("listener #{}", self.id.0),
        }
    }
}

struct EventSlot {
    type_id: TypeId,
    type_name: &'static str,
    listeners: Vec<Rc<Listener>>,
}

/// Synchronous publish/subscribe keyed by event type
///
/// No internal borrow is held while a listener runs, so listeners may
/// subscribe, unsubscribe or publish on the same bus.
pub struct EventBus {
    slots: RefCell<Vec<EventSlot>>,
    next_id: Cell<u64>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.borrow();
        f.debug_struct("EventBus")
            .field(
                "event_types",
                &slots
                    .iter()
                    .map(|slot| (slot.type_name, slot.listeners.len()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            slots: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    /// Subscribe `callback` to events of type `E` on behalf of `owner`
    pub fn subscribe<E, F>(&self, owner: &str, options: ListenerOptions, callback: F) -> ListenerId
    where
        E: Any,
        F: Fn(&mut E) -> ListenerResult + 'static,
    {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        let erased: ErasedCallback = Rc::new(move |event: &mut dyn Any| {
            match event.downcast_mut::<E>() {
                Some(event) => callback(event),
                None => Ok(()),
            }
        });
        let listener = Rc::new(Listener {
            id,
            owner: owner.to_string(),
            options,
            callback: erased,
        });

        let type_id = TypeId::of::<E>();
        let mut slots = self.slots.borrow_mut();
        let index = match slots.iter().position(|slot| slot.type_id == type_id) {
            Some(index) => index,
            None => {
                slots.push(EventSlot {
                    type_id,
                    type_name: std::any::type_name::<E>(),
                    listeners: Vec::new(),
                });
                slots.len() - 1
            }
        };

        let listeners = &mut slots[index].listeners;
        let position = listeners
            .iter()
            .position(|existing| existing.options.priority < listener.options.priority)
            .unwrap_or(listeners.len());

        log::trace!(
            "Subscribed {} of '{}' to {} at priority {}",
            listener.display_name(),
            owner,
            std::any::type_name::<E>(),
            listener.options.priority
        );
        listeners.insert(position, listener);
        id
    }

    /// Deliver `event` to every listener of its type, highest priority first
    ///
    /// Listeners added during dispatch are not invoked by this publish; those
    /// removed during dispatch are skipped. A failing listener is logged and
    /// counted but does not stop the others.
    pub fn publish<E: Any>(&self, event: &mut E) -> DispatchSummary {
        let type_id = TypeId::of::<E>();
        let snapshot: Vec<Rc<Listener>> = {
            let slots = self.slots.borrow();
            match slots.iter().find(|slot| slot.type_id == type_id) {
                Some(slot) => slot.listeners.clone(),
                None => return DispatchSummary::default(),
            }
        };

        let mut summary = DispatchSummary::default();
        for listener in snapshot {
            if !self.is_subscribed(type_id, listener.id) {
                continue;
            }

            let callback = listener.callback.clone();
            match run_guarded(|| callback(&mut *event as &mut dyn Any)) {
                Ok(()) => summary.delivered += 1,
                Err(cause) => {
                    summary.failed += 1;
                    log::error!(
                        "Event listener {} of '{}' failed handling {}: {}",
                        listener.display_name(),
                        listener.owner,
                        std::any::type_name::<E>(),
                        cause
                    );
                }
            }
        }
        summary
    }

    /// Remove a single subscription to `E`
    pub fn unsubscribe<E: Any>(&self, id: ListenerId) -> bool {
        let type_id = TypeId::of::<E>();
        let mut slots = self.slots.borrow_mut();
        match slots.iter_mut().find(|slot| slot.type_id == type_id) {
            Some(slot) => {
                let before = slot.listeners.len();
                slot.listeners.retain(|listener| listener.id != id);
                slot.listeners.len() != before
            }
            None => false,
        }
    }

    /// Remove every listener owned by `owner`, except those marked to survive
    ///
    /// Event types are visited newest first. Returns the number removed.
    pub fn unsubscribe_all_for_owner(&self, owner: &str) -> usize {
        let mut removed = 0;
        let mut slots = self.slots.borrow_mut();
        for slot in slots.iter_mut().rev() {
            let before = slot.listeners.len();
            slot.listeners.retain(|listener| {
                listener.owner != owner || listener.options.survive_unload
            });
            let count = before - slot.listeners.len();
            if count > 0 {
                log::debug!(
                    "Removed {} {} listener(s) owned by '{}'",
                    count,
                    slot.type_name,
                    owner
                );
            }
            removed += count;
        }
        removed
    }

    /// Number of listeners subscribed to `E`
    pub fn listener_count<E: Any>(&self) -> usize {
        let type_id = TypeId::of::<E>();
        self.slots
            .borrow()
            .iter()
            .find(|slot| slot.type_id == type_id)
            .map_or(0, |slot| slot.listeners.len())
    }

    /// Number of listeners owned by `owner` across all event types
    pub fn owner_listener_count(&self, owner: &str) -> usize {
        self.slots
            .borrow()
            .iter()
            .map(|slot| {
                slot.listeners
                    .iter()
                    .filter(|listener| listener.owner == owner)
                    .count()
            })
            .sum()
    }

    /// Every listener in dispatch order, grouped by event type registration order
    pub fn listeners(&self) -> Vec<ListenerInfo> {
        self.slots
            .borrow()
            .iter()
            .flat_map(|slot| {
                slot.listeners.iter().map(move |listener| ListenerInfo {
                    id: listener.id,
                    event_type: slot.type_name,
                    owner: listener.owner.clone(),
                    priority: listener.options.priority,
                    debug_name: listener.options.debug_name.clone(),
                    survive_unload: listener.options.survive_unload,
                })
            })
            .collect()
    }

    fn is_subscribed(&self, type_id: TypeId, id: ListenerId) -> bool {
        self.slots
            .borrow()
            .iter()
            .find(|slot| slot.type_id == type_id)
            .is_some_and(|slot| slot.listeners.iter().any(|listener| listener.id == id))
    }
}
