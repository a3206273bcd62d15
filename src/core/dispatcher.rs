//! # Dispatcher - payload type to owned callback list.
//!
//! [`Dispatcher`] is the callback-owning sibling of [`Registry`](crate::Registry): it keys
//! buckets by the payload type `A` and owns one [`CallbackHandler<A>`] per bucket.
//!
//! ## Architecture
//! ```text
//! add_callback::<A>(f) ──► buckets[TypeId(CallbackHandler<A>)] (created on demand) ──► push f
//! dispatch::<A>(args)  ──► read lock ─► clone Arc<CallbackHandler<A>> ─► unlock
//!                                        └─► handler.on_event(&args)  (snapshot, in order)
//! remove_callback::<A>(id) ─► empty slot ─► live count == 0 ─► erase bucket
//! ```
//!
//! ## Rules
//! - Ids are unique **per bucket**, not across the dispatcher.
//! - The payload type is the identity: `A = i32` and `A = &'static i32` are different
//!   buckets, and a dispatch must spell the type exactly as the registration did.
//! - Dispatching to a payload type nobody registered for is valid; it is reported at
//!   `debug` level and creates nothing.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicI32, Ordering};
//! use eventlayer::Dispatcher;
//!
//! let dispatcher = Dispatcher::new();
//! let sum = Arc::new(AtomicI32::new(0));
//!
//! for _ in 0..2 {
//!     let sum = Arc::clone(&sum);
//!     dispatcher.add_callback::<i32, _>(move |v| { sum.fetch_add(*v, Ordering::SeqCst); });
//! }
//!
//! dispatcher.dispatch(5_i32);
//! assert_eq!(sum.load(Ordering::SeqCst), 10);
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::handlers::{CallbackHandler, CallbackId};

type ErasedBucket = Arc<dyn Any + Send + Sync>;

/// Callback dispatcher keyed by payload type.
pub struct Dispatcher {
    buckets: RwLock<HashMap<TypeId, ErasedBucket>>,
}

impl Dispatcher {
    /// Creates an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buckets: RwLock::new(HashMap::new()),
        }
    }

    /// Registers `callback` for payload type `A`, creating the bucket if needed.
    ///
    /// Returns an id unique within the `A` bucket.
    pub fn add_callback<A, F>(&self, callback: F) -> CallbackId
    where
        A: 'static,
        F: Fn(&A) + Send + Sync + 'static,
    {
        let mut buckets = self.buckets.write();
        let handler = match buckets.get(&key::<A>()).and_then(downcast::<A>) {
            Some(handler) => handler,
            None => {
                let handler = Arc::new(CallbackHandler::<A>::new());
                buckets.insert(key::<A>(), Arc::clone(&handler) as ErasedBucket);
                tracing::debug!(payload = std::any::type_name::<A>(), "bucket created");
                handler
            }
        };
        handler.add_callback(callback)
    }

    /// Removes callback `id` from the `A` bucket.
    ///
    /// Erases the bucket once its last live callback is gone. Unknown ids and
    /// missing buckets are ignored.
    pub fn remove_callback<A: 'static>(&self, id: CallbackId) {
        let mut buckets = self.buckets.write();
        let Some(handler) = buckets.get(&key::<A>()).and_then(|b| downcast::<A>(b)) else {
            return;
        };

        handler.remove_callback(id);
        if handler.is_empty() {
            buckets.remove(&key::<A>());
            tracing::debug!(payload = std::any::type_name::<A>(), "bucket erased");
        }
    }

    /// Drops the whole `A` bucket, whatever it still holds.
    pub fn clear_handler_callbacks<A: 'static>(&self) {
        self.buckets.write().remove(&key::<A>());
    }

    /// Invokes every callback registered for `A`.
    pub fn dispatch<A: 'static>(&self, args: A) {
        self.dispatch_ref(&args);
    }

    /// Invokes every callback registered for `A` with a borrowed payload.
    pub fn dispatch_ref<A: 'static>(&self, args: &A) {
        let Some(handler) = self.handler::<A>() else {
            tracing::debug!(payload = std::any::type_name::<A>(), "no handler for payload type");
            return;
        };
        handler.on_event(args);
    }

    /// Number of buckets (distinct payload types with at least one callback).
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.buckets.read().len()
    }

    /// Number of live callbacks registered for `A`.
    #[must_use]
    pub fn callback_count<A: 'static>(&self) -> usize {
        self.handler::<A>().map_or(0, |h| h.callback_count())
    }

    /// True if a bucket exists for `A`.
    #[must_use]
    pub fn has_handler<A: 'static>(&self) -> bool {
        self.buckets.read().contains_key(&key::<A>())
    }

    fn handler<A: 'static>(&self) -> Option<Arc<CallbackHandler<A>>> {
        self.buckets
            .read()
            .get(&key::<A>())
            .and_then(|b| downcast::<A>(b))
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("buckets", &self.handler_count())
            .finish()
    }
}

#[inline]
fn key<A: 'static>() -> TypeId {
    TypeId::of::<CallbackHandler<A>>()
}

#[inline]
fn downcast<A: 'static>(bucket: &ErasedBucket) -> Option<Arc<CallbackHandler<A>>> {
    Arc::clone(bucket).downcast::<CallbackHandler<A>>().ok()
}
