//! # EventLayer: a private registry with an outward relay.
//!
//! A layer encapsulates one subsystem. Local producers call [`EventLayer::trigger_event`];
//! events coming from siblings arrive through [`EventLayer::on_external_event`]. The layer
//! never knows who relays its events: the owner installs a [`LayerCallback`], usually
//! through [`LayerManager::register_layer`](crate::LayerManager::register_layer).
//!
//! ## Event flow
//! ```text
//! trigger_event(&ev)
//!   ├─ !is_allowed_event(&ev) ──► warn!, dropped (no local, no external delivery)
//!   ├─► registry.emit_dyn(&ev)                         (local handlers)
//!   └─► callback(&ev, layer name)  if installed        (outward relay)
//!
//! on_external_event(&ev)
//!   └─► registry.emit_dyn(&ev)                         (terminal, never relayed)
//! ```
//!
//! ## Lifecycle
//! ```text
//! running ──stop()──► stop-requested ──run() observes should_stop()──► terminated
//! ```
//! The stop flag is a [`CancellationToken`], so `stop` and `should_stop` are safe from any
//! thread and async run loops can await [`EventLayer::stop_token`].
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use eventlayer::{CallbackHandler, Event, EventKind, EventLayer, EventMask};
//!
//! const SPECIFIC: EventKind = EventKind::from_bit(1);
//!
//! struct Specific;
//! impl Event for Specific {
//!     const KIND: EventKind = SPECIFIC;
//!     fn sender_id(&self) -> &str { "ui" }
//! }
//!
//! let layer = EventLayer::builder("ui")
//!     .allowed_events(EventMask::of(SPECIFIC))
//!     .build();
//!
//! let handler = Arc::new(CallbackHandler::<Specific>::new());
//! handler.add_callback(|_| println!("specific event"));
//! layer.add_event_handler(&handler);
//!
//! assert!(layer.trigger_event(&Specific));
//! ```

use std::sync::Arc;

use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;

use crate::config::RegistryConfig;
use crate::core::{EventFilter, Registry};
use crate::events::{AnyEvent, Event, EventMask};
use crate::handlers::EventHandler;

/// Outward relay installed on a layer: receives `(event, sender layer name)`.
pub type LayerCallback = Arc<dyn Fn(&dyn AnyEvent, &str) + Send + Sync>;

/// Installed relay plus the address of the manager that installed it (if any).
struct Relay {
    callback: LayerCallback,
    owner: Option<usize>,
}

/// A unit of encapsulation owning a private [`Registry`].
///
/// Concrete layers embed an `EventLayer` and implement [`Layer`] on top of it.
pub struct EventLayer {
    name: Arc<str>,
    registry: Registry,
    allowed: RwLock<EventMask>,
    filter: Option<EventFilter>,
    relay: RwLock<Option<Relay>>,
    stop: CancellationToken,
}

impl EventLayer {
    /// Creates a layer that allows every event kind.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        LayerBuilder::new(name).build()
    }

    /// Starts a [`LayerBuilder`].
    pub fn builder(name: impl Into<Arc<str>>) -> LayerBuilder {
        LayerBuilder::new(name)
    }

    /// Layer name, used as the sender id when relaying.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Delivers a locally produced event.
    ///
    /// Returns `false` if the event was rejected by the allow-list.
    pub fn trigger_event<E: Event>(&self, event: &E) -> bool {
        self.trigger_dyn(event)
    }

    /// Type-erased form of [`trigger_event`](Self::trigger_event).
    pub fn trigger_dyn(&self, event: &dyn AnyEvent) -> bool {
        if !self.is_allowed_event(event) {
            tracing::warn!(
                layer = %self.name,
                kind = ?event.kind(),
                name = event.event_name(),
                "event not allowed in layer, dropped"
            );
            return false;
        }

        self.registry.emit_dyn(event);

        let callback = self.relay.read().as_ref().map(|r| Arc::clone(&r.callback));
        if let Some(callback) = callback {
            callback(event, &self.name);
        }
        true
    }

    /// Delivers an event relayed from outside the layer.
    ///
    /// The allow-list does not apply and the event is never relayed again.
    pub fn on_external_event(&self, event: &dyn AnyEvent) {
        tracing::trace!(layer = %self.name, sender = event.event_sender(), "external event");
        self.registry.emit_dyn(event);
    }

    /// Subscribes `handler` to the layer's private registry.
    pub fn add_event_handler<H: EventHandler>(&self, handler: &Arc<H>) {
        self.registry.add_handler(handler);
    }

    /// Unsubscribes `handler` from the layer's private registry.
    pub fn remove_event_handler<H: EventHandler>(&self, handler: &Arc<H>) {
        self.registry.remove_handler(handler);
    }

    /// True if `handler` is subscribed in this layer.
    pub fn handler_exists<H: EventHandler>(&self, handler: &Arc<H>) -> bool {
        self.registry.handler_exists(handler)
    }

    /// Number of registrations in the private registry.
    pub fn handler_count(&self) -> usize {
        self.registry.handler_count()
    }

    /// Replaces the allow-list.
    pub fn set_allowed_events(&self, mask: EventMask) {
        *self.allowed.write() = mask;
        tracing::debug!(layer = %self.name, ?mask, "allowed events changed");
    }

    /// Current allow-list.
    pub fn allowed_events(&self) -> EventMask {
        *self.allowed.read()
    }

    /// True if `event` may be triggered in this layer.
    pub fn is_allowed_event(&self, event: &dyn AnyEvent) -> bool {
        self.allowed_events().contains(event.kind())
            && self.filter.as_ref().map_or(true, |f| f(event))
    }

    /// Installs the outward relay, replacing any previous one.
    pub fn set_layer_manager_callback<F>(&self, callback: F)
    where
        F: Fn(&dyn AnyEvent, &str) + Send + Sync + 'static,
    {
        self.install_relay(None, Arc::new(callback));
    }

    /// Removes the outward relay.
    pub fn clear_layer_manager_callback(&self) {
        *self.relay.write() = None;
    }

    /// True if an outward relay is installed.
    pub fn has_layer_manager_callback(&self) -> bool {
        self.relay.read().is_some()
    }

    pub(crate) fn install_relay(&self, owner: Option<usize>, callback: LayerCallback) {
        *self.relay.write() = Some(Relay { callback, owner });
    }

    /// Clears the relay only if `owner` installed it. Returns true if cleared.
    pub(crate) fn clear_relay_owned_by(&self, owner: usize) -> bool {
        let mut relay = self.relay.write();
        if relay.as_ref().is_some_and(|r| r.owner == Some(owner)) {
            *relay = None;
            return true;
        }
        false
    }

    /// Requests the run loop to return. Idempotent.
    pub fn stop(&self) {
        if !self.stop.is_cancelled() {
            tracing::debug!(layer = %self.name, "stop requested");
        }
        self.stop.cancel();
    }

    /// True once [`stop`](Self::stop) has been called.
    #[inline]
    pub fn should_stop(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// Child token cancelled by [`stop`](Self::stop), for async run loops.
    pub fn stop_token(&self) -> CancellationToken {
        self.stop.child_token()
    }
}

impl std::fmt::Debug for EventLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLayer")
            .field("name", &self.name)
            .field("allowed", &self.allowed_events())
            .field("handlers", &self.handler_count())
            .field("relay", &self.has_layer_manager_callback())
            .field("stopped", &self.should_stop())
            .finish()
    }
}

/// A concrete layer: an [`EventLayer`] plus a run loop.
///
/// ### Implementation requirements
/// - `run` must return once `self.layer().should_stop()` is true.
/// - `run` executes on whatever thread drives it, usually a [`LayerWorker`](crate::LayerWorker).
pub trait Layer: Send + Sync + 'static {
    /// The embedded event layer.
    fn layer(&self) -> &EventLayer;

    /// Main loop of the layer.
    fn run(&self);

    /// Entry point for events relayed from sibling layers.
    fn on_external_event(&self, event: &dyn AnyEvent) {
        self.layer().on_external_event(event);
    }
}

/// Builder for an [`EventLayer`].
pub struct LayerBuilder {
    name: Arc<str>,
    registry_config: RegistryConfig,
    allowed: EventMask,
    filter: Option<EventFilter>,
}

impl LayerBuilder {
    /// Creates a builder for a layer called `name`.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            registry_config: RegistryConfig::default(),
            allowed: EventMask::ALL,
            filter: None,
        }
    }

    /// Sets the configuration of the private registry.
    pub fn registry_config(mut self, config: RegistryConfig) -> Self {
        self.registry_config = config;
        self
    }

    /// Sets the initial allow-list (default: every kind).
    pub fn allowed_events(mut self, mask: EventMask) -> Self {
        self.allowed = mask;
        self
    }

    /// Adds a predicate checked after the allow-list on every trigger.
    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&dyn AnyEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Builds the layer.
    pub fn build(self) -> EventLayer {
        EventLayer {
            name: self.name,
            registry: Registry::with_config(self.registry_config),
            allowed: RwLock::new(self.allowed),
            filter: self.filter,
            relay: RwLock::new(None),
            stop: CancellationToken::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use crate::handlers::CallbackHandler;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const GENERAL: EventKind = EventKind::from_bit(0);
    const SPECIFIC: EventKind = EventKind::from_bit(1);

    struct GeneralEvent;
    impl Event for GeneralEvent {
        const KIND: EventKind = GENERAL;
        fn sender_id(&self) -> &str {
            "layer_1"
        }
    }

    struct SpecificEvent(u32);
    impl Event for SpecificEvent {
        const KIND: EventKind = SPECIFIC;
        fn name(&self) -> &str {
            "specific"
        }
        fn sender_id(&self) -> &str {
            "layer_1"
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

    fn relay_log(layer: &EventLayer) -> Arc<Mutex<Vec<(String, String)>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let out = Arc::clone(&log);
        layer.set_layer_manager_callback(move |ev, sender| {
            out.lock().push((ev.event_name().to_string(), sender.to_string()));
        });
        log
    }

    #[test]
    fn test_disallowed_event_is_dropped_everywhere() {
        let layer = EventLayer::builder("layer_1")
            .allowed_events(EventMask::of(SPECIFIC))
            .build();
        let local = Arc::new(AtomicUsize::new(0));
        let general = counting::<GeneralEvent>(&local);
        let specific = counting::<SpecificEvent>(&local);
        layer.add_event_handler(&general);
        layer.add_event_handler(&specific);
        let relayed = relay_log(&layer);

        assert!(!layer.trigger_event(&GeneralEvent));
        assert_eq!(local.load(Ordering::SeqCst), 0);
        assert!(relayed.lock().is_empty());

        assert!(layer.trigger_event(&SpecificEvent(1)));
        assert_eq!(local.load(Ordering::SeqCst), 1);
        assert_eq!(
            *relayed.lock(),
            vec![("specific".to_string(), "layer_1".to_string())]
        );
    }

    #[test]
    fn test_allow_list_can_change() {
        let layer = EventLayer::new("l");
        assert_eq!(layer.allowed_events(), EventMask::ALL);
        assert!(layer.is_allowed_event(&GeneralEvent));

        layer.set_allowed_events(EventMask::NONE);
        assert!(!layer.is_allowed_event(&GeneralEvent));
        assert!(!layer.trigger_event(&GeneralEvent));
    }

    #[test]
    fn test_filter_applies_after_mask() {
        let layer = EventLayer::builder("l")
            .filter(|ev| ev.downcast_ref::<SpecificEvent>().map_or(true, |s| s.0 > 10))
            .build();
        assert!(layer.is_allowed_event(&GeneralEvent));
        assert!(!layer.is_allowed_event(&SpecificEvent(3)));
        assert!(layer.is_allowed_event(&SpecificEvent(30)));
    }

    #[test]
    fn test_external_event_is_terminal() {
        let layer = EventLayer::builder("l")
            .allowed_events(EventMask::NONE)
            .build();
        let local = Arc::new(AtomicUsize::new(0));
        let general = counting::<GeneralEvent>(&local);
        layer.add_event_handler(&general);
        let relayed = relay_log(&layer);

        layer.on_external_event(&GeneralEvent);
        assert_eq!(local.load(Ordering::SeqCst), 1);
        assert!(relayed.lock().is_empty());
    }

    #[test]
    fn test_handler_proxy() {
        let layer = EventLayer::new("l");
        let hits = Arc::new(AtomicUsize::new(0));
        let handler = counting::<GeneralEvent>(&hits);

        layer.add_event_handler(&handler);
        assert!(layer.handler_exists(&handler));
        assert_eq!(layer.handler_count(), 1);

        layer.remove_event_handler(&handler);
        assert!(!layer.handler_exists(&handler));
        assert_eq!(layer.handler_count(), 0);
        assert!(layer.trigger_event(&GeneralEvent));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_cleared_callback_stops_relay() {
        let layer = EventLayer::new("l");
        let relayed = relay_log(&layer);
        assert!(layer.has_layer_manager_callback());

        layer.clear_layer_manager_callback();
        layer.trigger_event(&GeneralEvent);
        assert!(relayed.lock().is_empty());
    }

    #[test]
    fn test_stop_is_visible_across_threads() {
        let layer = Arc::new(EventLayer::new("worker"));
        let observer = Arc::clone(&layer);
        let handle = std::thread::spawn(move || {
            while !observer.should_stop() {
                std::thread::sleep(Duration::from_millis(1));
            }
        });

        assert!(!layer.should_stop());
        layer.stop();
        layer.stop();
        handle.join().unwrap();
        assert!(layer.should_stop());
    }

    #[tokio::test]
    async fn test_stop_token_wakes_async_loop() {
        let layer = Arc::new(EventLayer::new("async"));
        let token = layer.stop_token();
        let task = tokio::spawn(async move { token.cancelled().await });

        layer.stop();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("stop token was not cancelled")
            .unwrap();
    }
}
