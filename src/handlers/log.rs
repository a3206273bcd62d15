//! # LogHandler: simple event recorder
//!
//! A minimal handler that records every event of one type through `tracing`.
//! Use it for tests, demos, or as a template for real handlers.
//!
//! ## Example output (with a `tracing-subscriber` fmt layer)
//! ```text
//! INFO eventlayer::handlers::log: event handled handler="ui-log" kind=EventKind(bit 1) name="resize" sender="ui"
//! ```

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::events::Event;
use crate::handlers::EventHandler;

/// Event recorder for one event type.
pub struct LogHandler<E> {
    label: &'static str,
    seen: AtomicU64,
    _event: PhantomData<fn(&E)>,
}

impl<E: Event> LogHandler<E> {
    /// Construct a new [`LogHandler`] reporting under `label`.
    #[must_use]
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            seen: AtomicU64::new(0),
            _event: PhantomData,
        }
    }

    /// Number of events recorded so far.
    #[must_use]
    pub fn seen(&self) -> u64 {
        self.seen.load(Ordering::Relaxed)
    }
}

impl<E: Event> EventHandler for LogHandler<E> {
    type Event = E;

    fn handle_event(&self, e: &E) {
        let n = self.seen.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(
            handler = self.label,
            kind = ?E::KIND,
            name = e.name(),
            sender = e.sender_id(),
            seen = n,
            "event handled"
        );
    }

    fn name(&self) -> &'static str {
        self.label
    }
}
