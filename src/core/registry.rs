//! # Handler registry - event kind to weakly referenced handlers.
//!
//! Registry maps each [`EventKind`] to a bucket of `Weak<dyn ErasedHandler>` and fans
//! emitted events out to the live ones:
//! - `add_handler` → append a weak ref (duplicate check unless disabled)
//! - `remove_handler` → drop the handler and any expired refs, erase empty bucket
//! - `emit` → upgrade live refs, prune expired ones in the same pass, invoke in order
//!
//! ## Architecture
//! ```text
//! emit(&event)
//!   └─► write lock
//!         └─► buckets.get_mut(kind)        (absent ─► return, nothing created)
//!               └─► retain pass:
//!                     ├─ upgrade ok ─► keep, push Arc into snapshot
//!                     └─ expired   ─► drop in place
//!   └─► unlock
//!   └─► for handler in snapshot: handler.on_event(&event)   (registration order)
//! ```
//!
//! ## Rules
//! - The registry never extends a handler's lifetime (weak refs only).
//! - Lookups never insert: a failed lookup leaves the map untouched.
//! - Expired refs are pruned lazily, by the next emit or removal that walks the bucket.
//! - The lock is never held while a handler runs, so handlers may re-enter the registry.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::config::RegistryConfig;
use crate::events::{AnyEvent, Event, EventKind};
use crate::handlers::{ErasedHandler, EventHandler};

type Bucket = Vec<Weak<dyn ErasedHandler>>;

/// Registry of weakly referenced handlers, keyed by event kind.
///
/// All operations take `&self`; the bucket map sits behind a single `RwLock`.
pub struct Registry {
    config: RegistryConfig,
    buckets: RwLock<HashMap<EventKind, Bucket>>,
}

impl Registry {
    /// Creates a registry with [`RegistryConfig::default`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Creates a registry with the given configuration.
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            buckets: RwLock::new(HashMap::new()),
        }
    }

    /// Configuration this registry was built with.
    #[inline]
    pub fn config(&self) -> RegistryConfig {
        self.config
    }

    /// Subscribes `handler` to its event kind.
    pub fn add_handler<H: EventHandler>(&self, handler: &Arc<H>) {
        let erased: Arc<dyn ErasedHandler> = handler.clone();
        self.add_erased(&erased);
    }

    /// Subscribes an already type-erased handler.
    ///
    /// Handlers of [`EventKind::NONE`] are ignored: that kind is never dispatched.
    pub fn add_erased(&self, handler: &Arc<dyn ErasedHandler>) {
        let kind = handler.handled_kind();
        if kind.is_none() {
            tracing::debug!(handler = handler.handler_name(), "handler of empty kind ignored");
            return;
        }
        let weak = Arc::downgrade(handler);
        let mut buckets = self.buckets.write();

        if !self.config.allow_duplicate_registration {
            let present = buckets
                .get(&kind)
                .is_some_and(|bucket| bucket.iter().any(|w| Weak::ptr_eq(w, &weak)));
            if present {
                tracing::debug!(handler = handler.handler_name(), ?kind, "duplicate registration ignored");
                return;
            }
        }

        buckets.entry(kind).or_default().push(weak);
        tracing::debug!(handler = handler.handler_name(), ?kind, "handler added");
    }

    /// Unsubscribes `handler`. Unknown handlers are ignored.
    pub fn remove_handler<H: EventHandler>(&self, handler: &Arc<H>) {
        let erased: Arc<dyn ErasedHandler> = handler.clone();
        self.remove_erased(&erased);
    }

    /// Unsubscribes an already type-erased handler.
    ///
    /// Expired refs met on the way are dropped too.
    pub fn remove_erased(&self, handler: &Arc<dyn ErasedHandler>) {
        let kind = handler.handled_kind();
        let target = Arc::downgrade(handler);
        let mut buckets = self.buckets.write();

        let Some(bucket) = buckets.get_mut(&kind) else {
            return;
        };
        let mut found = false;
        bucket.retain(|w| {
            if Weak::ptr_eq(w, &target) {
                found = true;
                return false;
            }
            w.strong_count() > 0
        });

        if bucket.is_empty() && self.config.prune_empty_buckets {
            buckets.remove(&kind);
        }
        if found {
            tracing::debug!(handler = handler.handler_name(), ?kind, "handler removed");
        }
    }

    /// Emits a concrete event.
    ///
    /// Returns the number of handlers that received it.
    pub fn emit<E: Event>(&self, event: &E) -> usize {
        self.emit_dyn(event)
    }

    /// Emits a type-erased event to every live handler of its kind.
    ///
    /// Returns the number of handlers that received it.
    /// Handlers run on the calling thread, in registration order.
    /// Events of [`EventKind::NONE`] reach nobody.
    pub fn emit_dyn(&self, event: &dyn AnyEvent) -> usize {
        let kind = event.kind();
        if kind.is_none() {
            return 0;
        }
        let live = self.live_handlers(kind);
        tracing::trace!(?kind, name = event.event_name(), handlers = live.len(), "emit");

        let mut delivered = 0;
        for handler in live {
            match handler.on_event(event) {
                Ok(()) => delivered += 1,
                Err(err) => {
                    tracing::warn!(label = err.as_label(), "{}", err.as_message());
                }
            }
        }
        delivered
    }

    /// True if `handler` is currently registered for its event kind.
    #[must_use]
    pub fn handler_exists<H: EventHandler>(&self, handler: &Arc<H>) -> bool {
        let erased: Arc<dyn ErasedHandler> = handler.clone();
        self.erased_exists(&erased)
    }

    /// True if the type-erased `handler` is currently registered.
    #[must_use]
    pub fn erased_exists(&self, handler: &Arc<dyn ErasedHandler>) -> bool {
        let target = Arc::downgrade(handler);
        self.buckets
            .read()
            .get(&handler.handled_kind())
            .is_some_and(|bucket| bucket.iter().any(|w| Weak::ptr_eq(w, &target)))
    }

    /// Total number of registrations across all kinds.
    ///
    /// Expired refs count until a traversal prunes them.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.buckets.read().values().map(Vec::len).sum()
    }

    /// Number of registrations for `kind`.
    #[must_use]
    pub fn handler_count_for(&self, kind: EventKind) -> usize {
        self.buckets.read().get(&kind).map_or(0, Vec::len)
    }

    /// Number of buckets currently in the map.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.read().len()
    }

    /// Drops every registration.
    pub fn clear(&self) {
        self.buckets.write().clear();
    }

    /// Upgrades the live refs of `kind`, pruning expired ones in the same pass.
    fn live_handlers(&self, kind: EventKind) -> Vec<Arc<dyn ErasedHandler>> {
        let mut buckets = self.buckets.write();
        let Some(bucket) = buckets.get_mut(&kind) else {
            return Vec::new();
        };

        let mut live = Vec::with_capacity(bucket.len());
        bucket.retain(|w| match w.upgrade() {
            Some(h) => {
                live.push(h);
                true
            }
            None => false,
        });

        if bucket.is_empty() && self.config.prune_empty_buckets {
            buckets.remove(&kind);
        }
        live
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("buckets", &self.bucket_count())
            .field("handlers", &self.handler_count())
            .finish()
    }
}
