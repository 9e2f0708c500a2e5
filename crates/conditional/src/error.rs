//! Failure type for panicked task callbacks.

use std::any::Any;

/// The scheduler's single error kind: a user predicate or action panicked
/// while its task was being updated.
///
/// The failure is node-local and never fatal. The scheduler catches it,
/// removes the failing task without promoting its successor, logs this
/// value, and keeps ticking every other task.
#[derive(Debug, Clone, thiserror::Error)]
#[error("task callback panicked: {message}")]
pub struct TaskFailure {
    message: String,
}

impl TaskFailure {
    /// Normalizes a caught panic payload into a displayable failure.
    ///
    /// Panic payloads are almost always `&str` or `String`; anything else is
    /// reported opaquely.
    pub(crate) fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self { message }
    }

    /// The panic message, as recovered from the payload.
    pub fn message(&self) -> &str {
        &self.message
    }
}
