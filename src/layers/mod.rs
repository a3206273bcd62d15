//! # Layers: encapsulated registries and the relay between them.
//!
//! - [`EventLayer`] owns a private registry, an allow-list and a stop flag;
//! - [`Layer`] is what a concrete subsystem implements on top of it (`run` loop);
//! - [`LayerManager`] relays events triggered in one layer to all of its siblings;
//! - [`LayerWorker`] runs a layer's loop on a dedicated thread.
//!
//! ```text
//!            ┌──────────── LayerManager (Weak<dyn Layer> list) ───────────┐
//!            │                                                            │
//!   trigger_event ─► [Layer A: Registry] ─callback─► on_event(ev, "A") ───┤
//!                                                                         ├─► [Layer B].on_external_event
//!                                                                         └─► [Layer C].on_external_event
//! ```

mod layer;
mod manager;
mod worker;

pub use layer::{EventLayer, Layer, LayerBuilder, LayerCallback};
pub use manager::LayerManager;
pub use worker::LayerWorker;
