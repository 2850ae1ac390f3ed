//! Asynchronous fault reporting.
//!
//! Recoverable problems (protocol misuse, receive failures) are reported as
//! [`Fault`] values to one-shot listeners instead of being returned to the
//! caller. Listeners form a stack: each fault is handed to the most recently
//! registered listener, which is consumed. Earlier listeners stay queued.

use serde::Serialize;
use thiserror::Error;

/// A recoverable fault queued for error listeners
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail")]
pub enum Fault {
    /// A component with this name already exists in the session
    #[error("Duplicate component name : {0}")]
    DuplicateName(String),

    /// `source_from` named a component that was never created
    #[error("Component not found : {0}")]
    ComponentNotFound(String),

    /// A source was created while another chain still had a dangling output
    #[error("Source component should not have an input : {0}")]
    SourceHasInput(String),

    /// A sink was created with nothing to connect it to
    #[error("Sink component must have an input : {0}")]
    SinkWithoutInput(String),

    /// A processor was created with nothing to connect it to
    #[error("Data processing component must have an input : {0}")]
    ProcessorWithoutInput(String),

    /// A receive was requested while the receive pipe is closed
    #[error("Radio Not Running")]
    RadioNotRunning,

    /// Reading the receive pipe failed; carries the error code
    #[error("Rx Message Error : {0}")]
    RxMessage(String),
}

/// One-shot fault callback
pub type ErrorListener = Box<dyn FnOnce(Fault) + Send>;

/// Stack of pending one-shot error listeners
#[derive(Default)]
pub struct ErrorListeners {
    pending: Vec<ErrorListener>,
}

impl ErrorListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a listener for the next fault
    pub fn register(&mut self, listener: ErrorListener) {
        self.pending.push(listener);
    }

    /// Deliver a fault to the most recently registered listener.
    ///
    /// Returns `false` when no listener was waiting; the fault is logged and
    /// dropped in that case.
    pub fn emit(&mut self, fault: Fault) -> bool {
        match self.pending.pop() {
            Some(listener) => {
                tracing::debug!("Delivering fault: {}", fault);
                listener(fault);
                true
            }
            None => {
                tracing::warn!("Fault with no listener: {}", fault);
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl std::fmt::Debug for ErrorListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorListeners")
            .field("pending", &self.pending.len())
            .finish()
    }
}
