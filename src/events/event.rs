//! # Event vocabulary: kinds, masks, and the event traits.
//!
//! Every event struct implements [`Event`], which ties it to a compile-time
//! [`EventKind`]. The kind is the registry key; nothing in the dispatch path
//! depends on run-time type information.
//!
//! - [`EventKind`] a single bit identifying one event struct
//! - [`EventMask`] a set of kinds, used by layer and emitter filters
//! - [`Event`] implemented per event struct (kind + name + sender)
//! - [`AnyEvent`] object-safe view of any [`Event`], blanket-implemented
//!
//! ## Example
//! ```rust
//! use eventlayer::{AnyEvent, Event, EventKind, EventMask};
//!
//! const SAVED: EventKind = EventKind::from_bit(0);
//! const LOADED: EventKind = EventKind::from_bit(1);
//!
//! struct Saved { by: String }
//!
//! impl Event for Saved {
//!     const KIND: EventKind = SAVED;
//!     fn name(&self) -> &str { "saved" }
//!     fn sender_id(&self) -> &str { &self.by }
//! }
//!
//! let ev = Saved { by: "editor".into() };
//! let erased: &dyn AnyEvent = &ev;
//! assert_eq!(erased.kind(), SAVED);
//! assert_eq!(erased.event_sender(), "editor");
//! assert!(erased.downcast_ref::<Saved>().is_some());
//! assert!(!EventMask::of(LOADED).contains(erased.kind()));
//! ```

use std::any::Any;
use std::fmt;
use std::ops::BitOr;

/// Compile-time tag of one event struct.
///
/// A kind is a single bit of a `u64`, so up to 64 kinds can coexist and
/// any subset of them fits in an [`EventMask`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKind(u64);

impl EventKind {
    /// The empty kind. Never matches a mask and is never dispatched to anyone.
    pub const NONE: EventKind = EventKind(0);

    /// Creates the kind for bit `bit`.
    ///
    /// ### Panics
    /// Panics if `bit >= 64`; in a `const` item this is a compile error.
    #[inline]
    pub const fn from_bit(bit: u32) -> Self {
        assert!(bit < 64, "event kind bit must be below 64");
        EventKind(1 << bit)
    }

    /// Raw bit pattern.
    #[inline]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// True for [`EventKind::NONE`].
    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            f.write_str("EventKind(none)")
        } else {
            write!(f, "EventKind(bit {})", self.0.trailing_zeros())
        }
    }
}

/// Set of [`EventKind`]s.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EventMask(u64);

impl EventMask {
    /// Contains every kind.
    pub const ALL: EventMask = EventMask(u64::MAX);
    /// Contains no kind.
    pub const NONE: EventMask = EventMask(0);

    /// Mask holding exactly `kind`.
    #[inline]
    pub const fn of(kind: EventKind) -> Self {
        EventMask(kind.0)
    }

    /// Returns this mask with `kind` added.
    #[inline]
    pub const fn with(self, kind: EventKind) -> Self {
        EventMask(self.0 | kind.0)
    }

    /// Returns this mask with `kind` removed.
    #[inline]
    pub const fn without(self, kind: EventKind) -> Self {
        EventMask(self.0 & !kind.0)
    }

    /// True if `kind` is in the set. [`EventKind::NONE`] is never contained.
    #[inline]
    pub const fn contains(self, kind: EventKind) -> bool {
        kind.0 != 0 && self.0 & kind.0 == kind.0
    }

    /// True if the set is empty.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Raw bit pattern.
    #[inline]
    pub const fn bits(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EventMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventMask({:#x})", self.0)
    }
}

impl From<EventKind> for EventMask {
    fn from(kind: EventKind) -> Self {
        EventMask::of(kind)
    }
}

impl BitOr for EventKind {
    type Output = EventMask;

    fn bitor(self, rhs: EventKind) -> EventMask {
        EventMask(self.0 | rhs.0)
    }
}

impl BitOr<EventKind> for EventMask {
    type Output = EventMask;

    fn bitor(self, rhs: EventKind) -> EventMask {
        self.with(rhs)
    }
}

impl BitOr for EventMask {
    type Output = EventMask;

    fn bitor(self, rhs: EventMask) -> EventMask {
        EventMask(self.0 | rhs.0)
    }
}

/// An immutable value describing something that happened.
///
/// Implemented once per event struct. Events are handed to handlers by shared
/// reference and are never stored by a registry.
pub trait Event: Send + Sync + 'static {
    /// Registry key for this event struct.
    const KIND: EventKind;

    /// Human-readable event name.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Identifier of the originator (layer name, component id, ...).
    fn sender_id(&self) -> &str;
}

/// Object-safe view of an [`Event`].
///
/// Blanket-implemented for every `E: Event`; this is what flows through
/// registries, layers and the layer manager.
pub trait AnyEvent: Send + Sync {
    /// Kind of the concrete event.
    fn kind(&self) -> EventKind;

    /// See [`Event::name`].
    fn event_name(&self) -> &str;

    /// See [`Event::sender_id`].
    fn event_sender(&self) -> &str;

    /// Access to the concrete value for checked downcasts.
    fn as_any(&self) -> &dyn Any;
}

impl<E: Event> AnyEvent for E {
    #[inline]
    fn kind(&self) -> EventKind {
        E::KIND
    }

    #[inline]
    fn event_name(&self) -> &str {
        self.name()
    }

    #[inline]
    fn event_sender(&self) -> &str {
        self.sender_id()
    }

    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl dyn AnyEvent + '_ {
    /// Returns the concrete event if it is an `E`.
    #[inline]
    pub fn downcast_ref<E: Event>(&self) -> Option<&E> {
        self.as_any().downcast_ref::<E>()
    }

    /// True if the concrete event is an `E`.
    #[inline]
    pub fn is<E: Event>(&self) -> bool {
        self.as_any().is::<E>()
    }
}

impl fmt::Debug for dyn AnyEvent + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyEvent")
            .field("kind", &self.kind())
            .field("name", &self.event_name())
            .field("sender", &self.event_sender())
            .finish()
    }
}
