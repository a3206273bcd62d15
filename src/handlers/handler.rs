//! # Object handlers and their type-erased view.
//!
//! Provides [`EventHandler`], the extension point for reacting to one event type,
//! and [`ErasedHandler`], the form registries store behind `Weak` references.
//!
//! ## Architecture
//! ```text
//! Arc<H: EventHandler> ──downgrade──► Weak<dyn ErasedHandler> (inside Registry)
//!                                              │
//!                         emit(&dyn AnyEvent) ─┘
//!                                              ▼
//!                         ErasedHandler::on_event(&dyn AnyEvent)
//!                              ├─ downcast_ref::<H::Event>() ok ─► H::handle_event(&H::Event)
//!                              └─ mismatch ─► Err(DispatchError::TypeMismatch)
//! ```
//!
//! ## Rules
//! - A handler is bound to exactly one event type (`H::Event`).
//! - Ownership stays with application code; registries only hold weak references.
//! - The downcast is checked: a mismatching event is rejected, never reinterpreted.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use eventlayer::{Event, EventHandler, EventKind};
//!
//! struct Saved;
//! impl Event for Saved {
//!     const KIND: EventKind = EventKind::from_bit(0);
//!     fn sender_id(&self) -> &str { "editor" }
//! }
//!
//! #[derive(Default)]
//! struct SaveCounter(AtomicUsize);
//!
//! impl EventHandler for SaveCounter {
//!     type Event = Saved;
//!
//!     fn handle_event(&self, _event: &Saved) {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!     }
//!
//!     fn name(&self) -> &'static str { "save-counter" }
//! }
//! ```

use crate::error::DispatchError;
use crate::events::{AnyEvent, Event, EventKind};

/// Reacts to events of one type.
///
/// ### Implementation requirements
/// - Runs synchronously on the thread that emitted the event; keep it short.
/// - Must not mutate the event (it is shared by every handler of the pass).
/// - A panic propagates to the emitter and aborts the rest of that pass.
pub trait EventHandler: Send + Sync + 'static {
    /// The event type this handler is bound to.
    type Event: Event;

    /// Handles a single event.
    fn handle_event(&self, event: &Self::Event);

    /// Returns the handler name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Type-erased handler, as stored by a [`Registry`](crate::Registry).
///
/// Blanket-implemented for every [`EventHandler`]; implement `EventHandler` instead
/// of this trait.
pub trait ErasedHandler: Send + Sync {
    /// Kind of the events this handler accepts (its registry bucket).
    fn handled_kind(&self) -> EventKind;

    /// Handler name for logs.
    fn handler_name(&self) -> &'static str;

    /// Delivers an event after a checked downcast.
    ///
    /// ### Errors
    /// [`DispatchError::TypeMismatch`] if the concrete event is not the handler's event type.
    fn on_event(&self, event: &dyn AnyEvent) -> Result<(), DispatchError>;
}

impl<H: EventHandler> ErasedHandler for H {
    #[inline]
    fn handled_kind(&self) -> EventKind {
        <H::Event as Event>::KIND
    }

    #[inline]
    fn handler_name(&self) -> &'static str {
        self.name()
    }

    fn on_event(&self, event: &dyn AnyEvent) -> Result<(), DispatchError> {
        match event.downcast_ref::<H::Event>() {
            Some(ev) => {
                self.handle_event(ev);
                Ok(())
            }
            None => Err(DispatchError::TypeMismatch {
                handler: self.name(),
                expected: std::any::type_name::<H::Event>(),
                actual: event.event_name().to_string(),
                kind: event.kind(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PING: EventKind = EventKind::from_bit(0);

    struct Ping;
    impl Event for Ping {
        const KIND: EventKind = PING;
        fn sender_id(&self) -> &str {
            "test"
        }
    }

    // Shares Ping's kind on purpose to exercise the checked downcast.
    struct Impostor;
    impl Event for Impostor {
        const KIND: EventKind = PING;
        fn name(&self) -> &str {
            "impostor"
        }
        fn sender_id(&self) -> &str {
            "test"
        }
    }

    #[derive(Default)]
    struct PingCounter(AtomicUsize);

    impl EventHandler for PingCounter {
        type Event = Ping;
        fn handle_event(&self, _event: &Ping) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
        fn name(&self) -> &'static str {
            "ping-counter"
        }
    }

    #[test]
    fn test_handled_kind_matches_event() {
        let h = PingCounter::default();
        assert_eq!(h.handled_kind(), PING);
        assert_eq!(h.handler_name(), "ping-counter");
    }

    #[test]
    fn test_erased_dispatch_forwards() {
        let h = PingCounter::default();
        h.on_event(&Ping).unwrap();
        h.on_event(&Ping).unwrap();
        assert_eq!(h.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_mismatched_event_is_rejected() {
        let h = PingCounter::default();
        let err = h.on_event(&Impostor).unwrap_err();
        assert_eq!(err.as_label(), "dispatch_type_mismatch");
        assert!(err.as_message().contains("impostor"));
        assert_eq!(h.0.load(Ordering::SeqCst), 0);
    }
}
