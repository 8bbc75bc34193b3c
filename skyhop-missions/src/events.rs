//! Observer list for mission progress and completion notifications.
//!
//! Delivery is synchronous and in-process. Each subscriber holds a
//! [`Subscription`] guard; dropping the guard removes the listener, so a screen
//! that goes away stops receiving events without any explicit bookkeeping.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::progress::Mission;

/// Notification emitted by the progress reporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissionEvent {
    /// `current_progress` changed.
    Progress(Mission),
    /// The mission crossed from incomplete to complete.
    Completed(Mission),
}

impl MissionEvent {
    #[must_use]
    pub const fn mission(&self) -> &Mission {
        match self {
            Self::Progress(mission) | Self::Completed(mission) => mission,
        }
    }
}

/// Identifies one listener on an [`EventBus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Rc<RefCell<dyn FnMut(&MissionEvent)>>;

#[derive(Default)]
struct Slots {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

/// Multicast channel for [`MissionEvent`]s.
#[derive(Clone, Default)]
pub struct EventBus {
    slots: Rc<RefCell<Slots>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.len())
            .finish()
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It stays registered until the returned guard is dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&MissionEvent) + 'static,
    {
        let mut slots = self.slots.borrow_mut();
        let id = SubscriptionId(slots.next_id);
        slots.next_id += 1;
        let listener: Listener = Rc::new(RefCell::new(listener));
        slots.listeners.push((id, listener));
        Subscription {
            id,
            slots: Rc::downgrade(&self.slots),
        }
    }

    /// Remove a listener by id. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut slots = self.slots.borrow_mut();
        let before = slots.listeners.len();
        slots.listeners.retain(|(slot, _)| *slot != id);
        slots.listeners.len() != before
    }

    /// Deliver `event` to every listener registered at the time of the call.
    ///
    /// Listeners may subscribe or unsubscribe while being notified. A listener that
    /// re-enters `emit` is not invoked recursively.
    pub fn emit(&self, event: &MissionEvent) {
        let snapshot: Vec<(SubscriptionId, Listener)> = self.slots.borrow().listeners.clone();
        for (id, listener) in snapshot {
            if !self.is_subscribed(id) {
                continue;
            }
            if let Ok(mut callback) = listener.try_borrow_mut() {
                (&mut *callback)(event);
            } else {
                log::debug!("skipping re-entrant delivery to listener {id:?}");
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.borrow().listeners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.slots
            .borrow()
            .listeners
            .iter()
            .any(|(slot, _)| *slot == id)
    }
}

/// Keeps a listener registered for as long as it lives.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    slots: Weak<RefCell<Slots>>,
}

impl Subscription {
    #[must_use]
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Keep the listener registered for the lifetime of the bus.
    pub fn detach(self) -> SubscriptionId {
        let id = self.id;
        std::mem::forget(self);
        id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(slots) = self.slots.upgrade() {
            slots
                .borrow_mut()
                .listeners
                .retain(|(slot, _)| *slot != self.id);
        }
    }
}
