//! Dispatch core: registries and producers.
//!
//! - [`registry`]: event kind → weakly referenced object handlers;
//! - [`dispatcher`]: payload type → owned callback lists, bucket erased when empty;
//! - [`emitter`]: filtered, non-owning producer handle onto a registry.

mod dispatcher;
mod emitter;
mod registry;

pub use dispatcher::Dispatcher;
pub use emitter::{Emitter, EventFilter};
pub use registry::Registry;
