//! Event data model.
//!
//! This module groups the event **vocabulary** shared by every dispatch structure in
//! the crate: the compile-time kind tag, kind masks, and the two event traits.
//!
//! ## Contents
//! - [`EventKind`], [`EventMask`] classification and filtering
//! - [`Event`] per-struct trait (kind + name + sender)
//! - [`AnyEvent`] object-safe view used on the type-erased paths
//!
//! ## Quick reference
//! - **Producers**: application code, [`EventLayer::trigger_event`](crate::EventLayer::trigger_event).
//! - **Consumers**: [`Registry`](crate::Registry), [`Emitter`](crate::Emitter),
//!   [`EventLayer`](crate::EventLayer), [`LayerManager`](crate::LayerManager).

mod event;

pub use event::{AnyEvent, Event, EventKind, EventMask};
