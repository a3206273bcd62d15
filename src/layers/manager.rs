//! # LayerManager: N-to-N relay between sibling layers.
//!
//! The manager keeps weak references to layers. When one layer triggers an event,
//! the callback installed by [`LayerManager::register_layer`] hands it to
//! [`LayerManager::on_event`], which forwards it to every other live layer.
//!
//! ## Architecture
//! ```text
//! layer A.trigger_event(&ev)
//!   └─► callback (holds Weak<LayerManager>) ─► on_event(&ev, "A")
//!         lock ─► retain pass over Weak<dyn Layer>:
//!                  ├─ expired          ─► pruned
//!                  ├─ name == sender   ─► kept, skipped
//!                  └─ live sibling     ─► kept, snapshot
//!         unlock
//!         for sibling in snapshot: sibling.on_external_event(&ev)   (terminal, no re-relay)
//! ```
//!
//! ## Rules
//! - Neither side owns the other: layers hold a `Weak` manager, the manager holds `Weak` layers.
//! - The sender is matched by name; two layers with the same name never see each other's events.
//! - A layer holds one relay. Registering it with a second manager moves the relay there, and
//!   `remove_layer` only clears a relay this manager installed.
//! - A panicking sibling does not stop delivery to the others. The first panic is resumed
//!   on the caller once every sibling has been visited.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::events::AnyEvent;
use crate::layers::Layer;

/// Relays events between registered layers.
pub struct LayerManager {
    layers: Mutex<Vec<Weak<dyn Layer>>>,
}

impl LayerManager {
    /// Creates an empty manager.
    ///
    /// Returned in an `Arc` because registered layers keep a weak handle to it.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            layers: Mutex::new(Vec::new()),
        })
    }

    /// Registers `layer` and installs its outward relay.
    ///
    /// Registering the same layer twice is a no-op.
    pub fn register_layer<L: Layer>(self: &Arc<Self>, layer: &Arc<L>) {
        let erased: Arc<dyn Layer> = layer.clone();
        let weak = Arc::downgrade(&erased);
        {
            let mut layers = self.layers.lock();
            if layers.iter().any(|w| Weak::ptr_eq(w, &weak)) {
                tracing::debug!(layer = layer.layer().name(), "layer already registered");
                return;
            }
            layers.push(weak);
        }

        let manager = Arc::downgrade(self);
        layer.layer().install_relay(
            Some(self.id()),
            Arc::new(move |event: &dyn AnyEvent, sender: &str| {
                if let Some(manager) = manager.upgrade() {
                    manager.on_event(event, sender);
                }
            }),
        );
        tracing::debug!(layer = layer.layer().name(), "layer registered");
    }

    /// Unregisters `layer` and removes its outward relay. Unknown layers are ignored.
    ///
    /// The relay is left alone if another manager installed it after this one.
    pub fn remove_layer<L: Layer>(&self, layer: &Arc<L>) {
        let erased: Arc<dyn Layer> = layer.clone();
        let target = Arc::downgrade(&erased);

        let removed = {
            let mut layers = self.layers.lock();
            let before = layers.len();
            let mut found = false;
            layers.retain(|w| {
                if Weak::ptr_eq(w, &target) {
                    found = true;
                    return false;
                }
                w.strong_count() > 0
            });
            let pruned = before - layers.len() - usize::from(found);
            tracing::trace!(pruned, "layer list compacted");
            found
        };

        if removed {
            let cleared = layer.layer().clear_relay_owned_by(self.id());
            tracing::debug!(
                layer = layer.layer().name(),
                relay_cleared = cleared,
                "layer removed"
            );
        }
    }

    /// Forwards `event` to every live layer not named `sender`.
    ///
    /// Returns the number of layers the event was delivered to.
    ///
    /// ### Panics
    /// Resumes the first panic raised by a sibling, after all siblings were visited.
    pub fn on_event(&self, event: &dyn AnyEvent, sender: &str) -> usize {
        let siblings = self.siblings_of(sender);
        tracing::trace!(sender, kind = ?event.kind(), siblings = siblings.len(), "relay");

        let mut first_panic = None;
        let mut delivered = 0;
        for layer in siblings {
            match panic::catch_unwind(AssertUnwindSafe(|| layer.on_external_event(event))) {
                Ok(()) => delivered += 1,
                Err(payload) => {
                    tracing::warn!(
                        layer = layer.layer().name(),
                        sender,
                        "layer panicked on external event"
                    );
                    first_panic.get_or_insert(payload);
                }
            }
        }

        if let Some(payload) = first_panic {
            panic::resume_unwind(payload);
        }
        delivered
    }

    /// Number of registered layers, expired ones included until the next pass prunes them.
    pub fn layer_count(&self) -> usize {
        self.layers.lock().len()
    }

    /// Address of this manager, used to tag the relays it installs.
    fn id(&self) -> usize {
        self as *const Self as usize
    }

    /// Snapshots live layers other than `sender`, pruning expired refs in the same pass.
    fn siblings_of(&self, sender: &str) -> Vec<Arc<dyn Layer>> {
        let mut layers = self.layers.lock();
        let mut live = Vec::with_capacity(layers.len());
        layers.retain(|w| match w.upgrade() {
            Some(layer) => {
                if layer.layer().name() != sender {
                    live.push(layer);
                }
                true
            }
            None => false,
        });
        live
    }
}

impl std::fmt::Debug for LayerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerManager")
            .field("layers", &self.layer_count())
            .finish()
    }
}
