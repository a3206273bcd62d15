//! # Event handlers.
//!
//! This module provides the two handler variants a registry can hold and the
//! type-erased view that makes them storable side by side.
//!
//! ## Architecture
//! ```text
//! Handler variants:
//!   EventHandler (object)        CallbackHandler<E> (callback list)
//!          │                               │  (also an EventHandler when E: Event)
//!          └──────────────┬────────────────┘
//!                         ▼
//!                 dyn ErasedHandler ──► Registry bucket (Weak refs, per EventKind)
//!
//!   CallbackHandler<A> (any payload A) ──► Dispatcher bucket (owned, per payload type)
//! ```
//!
//! ## Handler types
//! - **Object handlers** - implement [`EventHandler`] for one event type
//! - **Callback handlers** - [`CallbackHandler`] keeps an ordered list of closures
//!
//! ## Implementing custom handlers
//! ```no_run
//! use eventlayer::{Event, EventHandler, EventKind};
//!
//! struct Closed { window: String }
//! impl Event for Closed {
//!     const KIND: EventKind = EventKind::from_bit(2);
//!     fn sender_id(&self) -> &str { &self.window }
//! }
//!
//! struct Audit;
//!
//! impl EventHandler for Audit {
//!     type Event = Closed;
//!     fn handle_event(&self, event: &Closed) {
//!         tracing::info!(window = %event.window, "closed");
//!     }
//! }
//! ```

mod callback;
mod handler;
#[cfg(feature = "logging")]
mod log;

pub use callback::{Callback, CallbackHandler, CallbackId};
pub use handler::{ErasedHandler, EventHandler};
#[cfg(feature = "logging")]
pub use log::LogHandler;
