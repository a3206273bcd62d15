//! # eventlayer
//!
//! **eventlayer** is a synchronous, in-process event dispatch library for Rust.
//!
//! Producers hand events to a registry, a dispatcher or a layer; every matching
//! handler runs on the calling thread before the call returns. Registries only keep
//! weak references to handlers, so subscribing never extends a handler's lifetime.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  ┌──────────────┐  ┌──────────────┐         ┌──────────────────────────────┐
//!  │ Arc<Handler> │  │ Arc<Handler> │         │ add_callback::<A>(closure)   │
//!  │ (app owned)  │  │ (app owned)  │         │ (closure owned by dispatcher)│
//!  └──────┬───────┘  └──────┬───────┘         └──────────────┬───────────────┘
//!         │ Weak            │ Weak                           ▼
//!         ▼                 ▼                 ┌──────────────────────────────┐
//! ┌────────────────────────────────────┐      │ Dispatcher                   │
//! │ Registry                           │      │  TypeId(A) ─► CallbackHandler│
//! │  EventKind ─► [Weak<dyn Handler>]  │      └──────────────────────────────┘
//! └──────▲──────────────────▲──────────┘
//!        │ emit             │ emit
//!  ┌─────┴──────┐   ┌───────┴──────────────────────────────────────────────┐
//!  │  Emitter   │   │ EventLayer "A" (private Registry, allow-list, stop)  │
//!  │ (filtered) │   │   trigger_event ─► local handlers                    │
//!  └────────────┘   │                 └► callback(ev, "A")                 │
//!                   └───────────────────────────┬──────────────────────────┘
//!                                               ▼
//!                          ┌─────────────────────────────────────────┐
//!                          │ LayerManager (Weak<dyn Layer> list)     │
//!                          │  on_event(ev, "A") ─► every layer != "A"│
//!                          └───────┬───────────────────────┬─────────┘
//!                                  ▼                       ▼
//!                       layer B.on_external_event  layer C.on_external_event
//!                          (terminal, no relay)       (terminal, no relay)
//! ```
//!
//! ### Emit pass
//! ```text
//! registry.emit(&ev)
//!   ├─► lock, look up ev.kind()          (absent ─► return 0, nothing created)
//!   ├─► upgrade live refs, drop expired ones, snapshot
//!   ├─► unlock
//!   └─► for handler in snapshot (registration order):
//!         ├─ checked downcast ok ─► handler.handle_event(&ev)
//!         └─ mismatch            ─► warn!(DispatchError::TypeMismatch), skip
//! ```
//!
//! ## Features
//! | Area              | Description                                                    | Key types / traits                          |
//! |-------------------|----------------------------------------------------------------|---------------------------------------------|
//! | **Events**        | Compile-time kinds, masks and the object-safe event view.      | [`Event`], [`AnyEvent`], [`EventKind`]      |
//! | **Handlers**      | Object handlers and ordered callback lists.                    | [`EventHandler`], [`CallbackHandler`]       |
//! | **Registry**      | Kind-keyed fan-out to weakly referenced handlers.              | [`Registry`], [`Emitter`]                   |
//! | **Dispatcher**    | Payload-type keyed fan-out to owned callbacks.                 | [`Dispatcher`]                              |
//! | **Layers**        | Encapsulated registries relayed between siblings.              | [`EventLayer`], [`Layer`], [`LayerManager`] |
//! | **Workers**       | Run a layer's loop on its own thread.                          | [`LayerWorker`]                             |
//! | **Errors**        | Typed errors for delivery and the worker runtime.              | [`DispatchError`], [`RuntimeError`]         |
//! | **Configuration** | Registry settings.                                             | [`RegistryConfig`]                          |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in `LogHandler` _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use eventlayer::{CallbackHandler, Event, EventKind, EventLayer, Layer, LayerManager};
//!
//! const RESIZED: EventKind = EventKind::from_bit(0);
//!
//! struct Resized { layer: String }
//! impl Event for Resized {
//!     const KIND: EventKind = RESIZED;
//!     fn sender_id(&self) -> &str { &self.layer }
//! }
//!
//! struct Ui(EventLayer);
//! impl Layer for Ui {
//!     fn layer(&self) -> &EventLayer { &self.0 }
//!     fn run(&self) {
//!         while !self.0.should_stop() { /* poll input */ }
//!     }
//! }
//!
//! let manager = LayerManager::new();
//! let ui = Arc::new(Ui(EventLayer::new("ui")));
//! let render = Arc::new(Ui(EventLayer::new("render")));
//! manager.register_layer(&ui);
//! manager.register_layer(&render);
//!
//! // Subscribe the render layer to resize events.
//! let seen = Arc::new(AtomicUsize::new(0));
//! let handler = Arc::new(CallbackHandler::<Resized>::new());
//! let counter = Arc::clone(&seen);
//! handler.add_callback(move |_| { counter.fetch_add(1, Ordering::SeqCst); });
//! render.layer().add_event_handler(&handler);
//!
//! // Triggered in "ui", relayed to "render".
//! ui.layer().trigger_event(&Resized { layer: "ui".into() });
//! assert_eq!(seen.load(Ordering::SeqCst), 1);
//! ```
mod config;
mod core;
mod error;
mod events;
mod handlers;
mod layers;

// ---- Public re-exports ----

pub use config::RegistryConfig;
pub use crate::core::{Dispatcher, Emitter, EventFilter, Registry};
pub use error::{DispatchError, RuntimeError};
pub use events::{AnyEvent, Event, EventKind, EventMask};
pub use handlers::{Callback, CallbackHandler, CallbackId, ErasedHandler, EventHandler};
pub use layers::{EventLayer, Layer, LayerBuilder, LayerCallback, LayerManager, LayerWorker};

// Optional: expose a simple built-in logging handler (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use handlers::LogHandler;
