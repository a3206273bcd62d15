//! Error types used by the event system.
//!
//! This module defines two error enums:
//!
//! - [`DispatchError`] raised when a type-erased handler is handed an event it cannot accept.
//! - [`RuntimeError`] raised by the layer worker runtime (thread spawn and join).
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging.
//!
//! Not-found conditions (dispatching to an empty bucket, removing an unknown id or handler)
//! are **not** errors: every such operation is a silent no-op.

use thiserror::Error;

use crate::events::EventKind;

/// # Errors produced while delivering an event to a type-erased handler.
///
/// The registry only routes an event to handlers registered under the event's kind,
/// so this error surfaces when two event structs share a kind, or when
/// [`ErasedHandler::on_event`](crate::ErasedHandler::on_event) is called directly
/// with the wrong event.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The concrete event type does not match the handler's event type.
    #[error("handler '{handler}' expects {expected}, received '{actual}' ({kind:?})")]
    TypeMismatch {
        /// Name of the handler that rejected the event.
        handler: &'static str,
        /// Type name of the event the handler accepts.
        expected: &'static str,
        /// Name of the event that was delivered.
        actual: String,
        /// Kind carried by the delivered event.
        kind: EventKind,
    },
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use eventlayer::{DispatchError, EventKind};
    ///
    /// let err = DispatchError::TypeMismatch {
    ///     handler: "audit",
    ///     expected: "Saved",
    ///     actual: "Loaded".into(),
    ///     kind: EventKind::from_bit(0),
    /// };
    /// assert_eq!(err.as_label(), "dispatch_type_mismatch");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::TypeMismatch { .. } => "dispatch_type_mismatch",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DispatchError::TypeMismatch {
                handler,
                expected,
                actual,
                ..
            } => format!("type mismatch: handler={handler} expected={expected} actual={actual}"),
        }
    }
}

/// # Errors produced by the layer worker runtime.
///
/// These represent failures around the dedicated thread that runs
/// [`Layer::run`](crate::Layer::run), never failures of event delivery itself.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The OS refused to spawn the worker thread.
    #[error("failed to spawn worker for layer '{layer}': {source}")]
    WorkerSpawn {
        /// Name of the layer.
        layer: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// `Layer::run` panicked on its worker thread.
    #[error("worker for layer '{layer}' panicked: {reason}")]
    WorkerPanicked {
        /// Name of the layer.
        layer: String,
        /// Panic payload rendered as text.
        reason: String,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use eventlayer::RuntimeError;
    ///
    /// let err = RuntimeError::WorkerPanicked { layer: "ui".into(), reason: "boom".into() };
    /// assert_eq!(err.as_label(), "runtime_worker_panicked");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::WorkerSpawn { .. } => "runtime_worker_spawn",
            RuntimeError::WorkerPanicked { .. } => "runtime_worker_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::WorkerSpawn { layer, source } => {
                format!("spawn failed: layer={layer} err={source}")
            }
            RuntimeError::WorkerPanicked { layer, reason } => {
                format!("worker panicked: layer={layer} reason={reason}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_error_message_names_both_types() {
        let err = DispatchError::TypeMismatch {
            handler: "h",
            expected: "A",
            actual: "B".into(),
            kind: EventKind::from_bit(3),
        };
        let msg = err.as_message();
        assert!(msg.contains("expected=A"));
        assert!(msg.contains("actual=B"));
        assert!(err.to_string().contains("'h'"));
    }

    #[test]
    fn test_runtime_error_labels() {
        let spawn = RuntimeError::WorkerSpawn {
            layer: "io".into(),
            source: std::io::Error::other("no threads"),
        };
        assert_eq!(spawn.as_label(), "runtime_worker_spawn");
        assert!(spawn.as_message().contains("layer=io"));

        let panicked = RuntimeError::WorkerPanicked {
            layer: "io".into(),
            reason: "boom".into(),
        };
        assert_eq!(panicked.to_string(), "worker for layer 'io' panicked: boom");
    }
}
