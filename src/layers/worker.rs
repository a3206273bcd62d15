//! # LayerWorker: drives `Layer::run` on a dedicated thread.
//!
//! ```text
//! spawn(layer) ─► thread "layer-<name>" ─► layer.run()  (loops until should_stop())
//! stop()       ─► layer.layer().stop()
//! join()       ─► Ok(()) | Err(RuntimeError::WorkerPanicked)
//! ```
//!
//! Dropping a worker without joining detaches the thread; the layer keeps running
//! until something else calls `stop`.

use std::any::Any;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::error::RuntimeError;
use crate::layers::Layer;

/// Handle to a layer running on its own OS thread.
pub struct LayerWorker {
    layer: Arc<dyn Layer>,
    handle: JoinHandle<()>,
}

impl LayerWorker {
    /// Starts `layer.run()` on a new thread named after the layer.
    ///
    /// ### Errors
    /// [`RuntimeError::WorkerSpawn`] if the OS refuses to create the thread.
    pub fn spawn<L: Layer>(layer: Arc<L>) -> Result<Self, RuntimeError> {
        let layer: Arc<dyn Layer> = layer;
        let name = layer.layer().name().to_string();
        let runner = Arc::clone(&layer);

        let handle = thread::Builder::new()
            .name(format!("layer-{name}"))
            .spawn(move || {
                tracing::debug!(layer = runner.layer().name(), "run started");
                runner.run();
                tracing::debug!(layer = runner.layer().name(), "run finished");
            })
            .map_err(|source| RuntimeError::WorkerSpawn {
                layer: name,
                source,
            })?;

        Ok(Self { layer, handle })
    }

    /// Name of the layer being driven.
    pub fn name(&self) -> &str {
        self.layer.layer().name()
    }

    /// Requests the run loop to return.
    pub fn stop(&self) {
        self.layer.layer().stop();
    }

    /// True once `run` has returned (or panicked).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for `run` to return.
    ///
    /// ### Errors
    /// [`RuntimeError::WorkerPanicked`] if `run` panicked.
    pub fn join(self) -> Result<(), RuntimeError> {
        let layer = self.name().to_string();
        self.handle.join().map_err(|payload| {
            let err = RuntimeError::WorkerPanicked {
                layer,
                reason: panic_reason(payload.as_ref()),
            };
            tracing::warn!(label = err.as_label(), "{}", err.as_message());
            err
        })
    }

    /// [`stop`](Self::stop) followed by [`join`](Self::join).
    pub fn stop_and_join(self) -> Result<(), RuntimeError> {
        self.stop();
        self.join()
    }
}

impl std::fmt::Debug for LayerWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerWorker")
            .field("layer", &self.name())
            .field("finished", &self.is_finished())
            .finish()
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Event, EventKind};
    use crate::handlers::CallbackHandler;
    use crate::layers::EventLayer;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Tick;
    impl Event for Tick {
        const KIND: EventKind = EventKind::from_bit(4);
        fn sender_id(&self) -> &str {
            "ticker"
        }
    }

    struct Ticker {
        inner: EventLayer,
    }

    impl Layer for Ticker {
        fn layer(&self) -> &EventLayer {
            &self.inner
        }

        fn run(&self) {
            while !self.inner.should_stop() {
                self.inner.trigger_event(&Tick);
                thread::sleep(Duration::from_millis(1));
            }
        }
    }

    struct Crashing(EventLayer);

    impl Layer for Crashing {
        fn layer(&self) -> &EventLayer {
            &self.0
        }

        fn run(&self) {
            panic!("run loop failed");
        }
    }

    #[test]
    fn test_worker_runs_until_stopped() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(CallbackHandler::<Tick>::new());
        let counter = Arc::clone(&ticks);
        handler.add_callback(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let layer = Arc::new(Ticker {
            inner: EventLayer::new("ticker"),
        });
        layer.layer().add_event_handler(&handler);

        let worker = LayerWorker::spawn(Arc::clone(&layer)).unwrap();
        assert_eq!(worker.name(), "ticker");
        while ticks.load(Ordering::SeqCst) < 3 {
            thread::sleep(Duration::from_millis(1));
        }

        worker.stop_and_join().unwrap();
        assert!(layer.layer().should_stop());
    }

    #[test]
    fn test_panicking_run_is_reported() {
        let layer = Arc::new(Crashing(EventLayer::new("crashing")));
        let worker = LayerWorker::spawn(layer).unwrap();

        let err = worker.join().unwrap_err();
        assert_eq!(err.as_label(), "runtime_worker_panicked");
        assert!(err.as_message().contains("run loop failed"));
        assert!(err.as_message().contains("layer=crashing"));
    }

    #[test]
    fn test_panic_reason_formats() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let fixed: Box<dyn Any + Send> = Box::new("fixed");
        let other: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_reason(owned.as_ref()), "owned");
        assert_eq!(panic_reason(fixed.as_ref()), "fixed");
        assert_eq!(panic_reason(other.as_ref()), "unknown panic");
    }
}
