//! # CallbackHandler: an ordered list of callbacks for one payload type
//!
//! [`CallbackHandler`] fans a payload out to every registered callback, in
//! registration order, on the calling thread.
//!
//! ## What it guarantees
//! - `add_callback` returns a [`CallbackId`] that stays valid for the handler's lifetime.
//! - `remove_callback` empties the slot in place; ids issued before or after stay valid.
//! - `on_event` works on a snapshot: callbacks may add or remove callbacks while running,
//!   and the change only affects the next `on_event`.
//!
//! ## What it does **not** guarantee
//! - No duplicate detection (closures have no identity; the same closure can be added twice).
//! - No panic isolation: a panicking callback aborts the rest of the pass.
//!
//! ## Diagram
//! ```text
//!    on_event(&A)
//!        │   lock ─► snapshot live slots (Arc clones) ─► unlock
//!        ├────────────────► slot 0 ─► callback(&A)
//!        ├────────────────► slot 1 ─► (removed, skipped)
//!        └────────────────► slot N ─► callback(&A)
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::events::Event;
use crate::handlers::EventHandler;

/// Shared callback taking the payload by reference.
pub type Callback<A> = Arc<dyn Fn(&A) + Send + Sync>;

/// Identifier of a callback inside one [`CallbackHandler`].
///
/// Unique within its handler only; ids of different handlers (or different
/// dispatcher buckets) may be equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackId(usize);

impl CallbackId {
    /// Slot index behind this id.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "callback-{}", self.0)
    }
}

/// Ordered callback list for payload type `A`.
///
/// `A` is a single value or a tuple for multi-argument payloads.
pub struct CallbackHandler<A: 'static> {
    slots: Mutex<Vec<Option<Callback<A>>>>,
}

impl<A: 'static> CallbackHandler<A> {
    /// Creates an empty handler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(Vec::new()),
        }
    }

    /// Appends `callback` and returns its id.
    pub fn add_callback<F>(&self, callback: F) -> CallbackId
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        let mut slots = self.slots.lock();
        slots.push(Some(Arc::new(callback)));
        CallbackId(slots.len() - 1)
    }

    /// Removes the callback behind `id`.
    ///
    /// Unknown or already removed ids are ignored.
    pub fn remove_callback(&self, id: CallbackId) {
        if let Some(slot) = self.slots.lock().get_mut(id.0) {
            *slot = None;
        }
    }

    /// Invokes every live callback with `args`, in registration order.
    pub fn on_event(&self, args: &A) {
        let snapshot: Vec<Callback<A>> = {
            let slots = self.slots.lock();
            slots.iter().flatten().cloned().collect()
        };
        for callback in snapshot {
            callback(args);
        }
    }

    /// Number of live (not removed) callbacks.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.slots.lock().iter().filter(|s| s.is_some()).count()
    }

    /// True if no live callback remains.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callback_count() == 0
    }
}

impl<A: 'static> Default for CallbackHandler<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: 'static> fmt::Debug for CallbackHandler<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackHandler")
            .field("payload", &std::any::type_name::<A>())
            .field("callbacks", &self.callback_count())
            .finish()
    }
}

/// A callback list over an [`Event`] is itself an object handler, so it can be
/// registered in a [`Registry`](crate::Registry).
impl<E: Event> EventHandler for CallbackHandler<E> {
    type Event = E;

    fn handle_event(&self, event: &E) {
        self.on_event(event);
    }

    fn name(&self) -> &'static str {
        "CallbackHandler"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_ids_are_sequential_slots() {
        let h = CallbackHandler::<i32>::new();
        let a = h.add_callback(|_| {});
        let b = h.add_callback(|_| {});
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(h.callback_count(), 2);
    }

    #[test]
    fn test_callbacks_run_in_registration_order() {
        let h = CallbackHandler::<u8>::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let log = Arc::clone(&log);
            h.add_callback(move |_| log.lock().push(tag));
        }
        h.on_event(&0);
        assert_eq!(*log.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_remove_keeps_other_ids_valid() {
        let h = CallbackHandler::<i32>::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let h1 = Arc::clone(&hits);
        let first = h.add_callback(move |_| {
            h1.fetch_add(1, Ordering::SeqCst);
        });
        let h2 = Arc::clone(&hits);
        let second = h.add_callback(move |_| {
            h2.fetch_add(10, Ordering::SeqCst);
        });

        h.remove_callback(first);
        let h3 = Arc::clone(&hits);
        let third = h.add_callback(move |_| {
            h3.fetch_add(100, Ordering::SeqCst);
        });
        assert_eq!(third.index(), 2);

        h.on_event(&0);
        assert_eq!(hits.load(Ordering::SeqCst), 110);
        assert_eq!(h.callback_count(), 2);

        h.remove_callback(second);
        h.remove_callback(third);
        assert!(h.is_empty());
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let h = CallbackHandler::<i32>::new();
        h.remove_callback(CallbackId(42));
        let id = h.add_callback(|_| {});
        h.remove_callback(id);
        h.remove_callback(id);
        assert_eq!(h.callback_count(), 0);
    }

    #[test]
    fn test_reentrant_add_affects_next_pass_only() {
        let h = Arc::new(CallbackHandler::<()>::new());
        let hits = Arc::new(AtomicUsize::new(0));

        let weak = Arc::downgrade(&h);
        let counter = Arc::clone(&hits);
        h.add_callback(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            if let Some(h) = weak.upgrade() {
                let inner = Arc::clone(&counter);
                h.add_callback(move |_| {
                    inner.fetch_add(1, Ordering::SeqCst);
                });
            }
        });

        h.on_event(&());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(h.callback_count(), 2);

        h.on_event(&());
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_reentrant_remove_does_not_break_pass() {
        let h = Arc::new(CallbackHandler::<()>::new());
        let hits = Arc::new(AtomicUsize::new(0));

        let weak = Arc::downgrade(&h);
        h.add_callback(move |_| {
            if let Some(h) = weak.upgrade() {
                h.remove_callback(CallbackId(1));
            }
        });
        let counter = Arc::clone(&hits);
        h.add_callback(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        h.on_event(&());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        h.on_event(&());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_tuple_payload() {
        let h = CallbackHandler::<(String, f32)>::new();
        let seen = Arc::new(Mutex::new(None));
        let out = Arc::clone(&seen);
        h.add_callback(move |(label, value): &(String, f32)| {
            *out.lock() = Some(format!("{label}={value}"));
        });
        h.on_event(&("speed".to_string(), 1.5));
        assert_eq!(seen.lock().as_deref(), Some("speed=1.5"));
    }
}
