//! # Emitter - filtered producer handle onto a registry.
//!
//! An [`Emitter`] is what a producer keeps instead of the registry itself: it holds a
//! `Weak<Registry>`, so producers never keep a registry alive, and applies an allow-list
//! before forwarding.
//!
//! ```text
//! emit(&event)
//!   ├─ mask rejects kind ──────► warn!, dropped (false)
//!   ├─ predicate rejects ──────► warn!, dropped (false)
//!   ├─ registry dropped ───────► silent no-op   (false)
//!   └─ registry.emit_dyn(&event) ─────────────► true
//! ```

use std::sync::{Arc, Weak};

use crate::core::Registry;
use crate::events::{AnyEvent, EventMask};

/// Extra filter evaluated after the mask.
pub type EventFilter = Arc<dyn Fn(&dyn AnyEvent) -> bool + Send + Sync>;

/// Producer-side handle that filters events before they reach a [`Registry`].
#[derive(Clone)]
pub struct Emitter {
    registry: Weak<Registry>,
    allowed: EventMask,
    filter: Option<EventFilter>,
}

impl Emitter {
    /// Creates an emitter that lets every kind through.
    pub fn new(registry: &Arc<Registry>) -> Self {
        Self {
            registry: Arc::downgrade(registry),
            allowed: EventMask::ALL,
            filter: None,
        }
    }

    /// Restricts the emitter to the kinds in `mask`.
    #[must_use]
    pub fn with_allowed(mut self, mask: EventMask) -> Self {
        self.allowed = mask;
        self
    }

    /// Adds a predicate that must also accept the event.
    #[must_use]
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&dyn AnyEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Kinds this emitter forwards.
    #[inline]
    pub fn allowed_events(&self) -> EventMask {
        self.allowed
    }

    /// True if `event` passes both the mask and the predicate.
    pub fn is_allowed(&self, event: &dyn AnyEvent) -> bool {
        self.allowed.contains(event.kind()) && self.filter.as_ref().map_or(true, |f| f(event))
    }

    /// Forwards `event` to the registry.
    ///
    /// Returns `false` if the event was rejected or the registry is gone.
    pub fn emit(&self, event: &dyn AnyEvent) -> bool {
        if !self.is_allowed(event) {
            tracing::warn!(kind = ?event.kind(), name = event.event_name(), "event not allowed, dropped");
            return false;
        }
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        registry.emit_dyn(event);
        true
    }

    /// True while the target registry is alive.
    pub fn is_connected(&self) -> bool {
        self.registry.strong_count() > 0
    }
}

impl std::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("allowed", &self.allowed)
            .field("filtered", &self.filter.is_some())
            .field("connected", &self.is_connected())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Event, EventKind};
    use crate::handlers::CallbackHandler;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const GENERAL: EventKind = EventKind::from_bit(0);
    const SPECIFIC: EventKind = EventKind::from_bit(1);

    struct GeneralEvent;
    impl Event for GeneralEvent {
        const KIND: EventKind = GENERAL;
        fn sender_id(&self) -> &str {
            "producer"
        }
    }

    struct SpecificEvent(u32);
    impl Event for SpecificEvent {
        const KIND: EventKind = SPECIFIC;
        fn sender_id(&self) -> &str {
            "producer"
        }
    }

    fn counting<E: Event>(hits: &Arc<AtomicUsize>) -> Arc<CallbackHandler<E>> {
        let handler = Arc::new(CallbackHandler::<E>::new());
        let hits = Arc::clone(hits);
        handler.add_callback(move |_| {
            hits.fetch_add(1, Ordering::SeqCst);
        });
        handler
    }

    #[test]
    fn test_default_emitter_forwards_everything() {
        let registry = Arc::new(Registry::new());
        let hits = Arc::new(AtomicUsize::new(0));
        let general = counting::<GeneralEvent>(&hits);
        let specific = counting::<SpecificEvent>(&hits);
        registry.add_handler(&general);
        registry.add_handler(&specific);

        let emitter = Emitter::new(&registry);
        assert!(emitter.emit(&GeneralEvent));
        assert!(emitter.emit(&SpecificEvent(1)));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_mask_rejects_kind() {
        let registry = Arc::new(Registry::new());
        let hits = Arc::new(AtomicUsize::new(0));
        let general = counting::<GeneralEvent>(&hits);
        registry.add_handler(&general);

        let emitter = Emitter::new(&registry).with_allowed(EventMask::of(SPECIFIC));
        assert!(!emitter.emit(&GeneralEvent));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_filter_rejects_event() {
        let registry = Arc::new(Registry::new());
        let hits = Arc::new(AtomicUsize::new(0));
        let specific = counting::<SpecificEvent>(&hits);
        registry.add_handler(&specific);

        let emitter = Emitter::new(&registry).with_filter(|ev| {
            ev.downcast_ref::<SpecificEvent>().is_some_and(|s| s.0 % 2 == 0)
        });
        assert!(!emitter.emit(&SpecificEvent(3)));
        assert!(emitter.emit(&SpecificEvent(4)));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dropped_registry_is_noop() {
        let registry = Arc::new(Registry::new());
        let emitter = Emitter::new(&registry);
        assert!(emitter.is_connected());

        drop(registry);
        assert!(!emitter.is_connected());
        assert!(!emitter.emit(&GeneralEvent));
    }
}
