//! Error handling for radio-bridge
//!
//! This module defines the error type returned by operations that cannot be
//! recovered locally (command/transmit writes, configuration, scripts) and a
//! Result alias for use throughout the crate.
//!
//! Recoverable protocol faults (duplicate names, unwired components, receive
//! failures) are not errors in this sense; they are queued as
//! [`Fault`](crate::session::Fault) values instead.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for radio-bridge operations
#[derive(Error, Debug)]
pub enum BridgeError {
    /// IO errors not tied to a particular pipe
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Opening or writing one of the backend pipes failed
    #[error("Pipe error on {path:?}: {source}")]
    Pipe {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Errors related to configuration loading/saving/validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// A script line could not be parsed
    #[error("Script error on line {line}: {message}")]
    Script { line: usize, message: String },

    /// Errors related to the backend process
    #[error("Backend error: {0}")]
    Backend(String),

    /// Errors related to channel communication
    #[error("Channel error: {0}")]
    Channel(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<BridgeError>,
    },
}

impl BridgeError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        BridgeError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Wrap an IO error with the pipe path it happened on
    pub fn pipe(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BridgeError::Pipe {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for radio-bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| BridgeError::Io(e).with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| BridgeError::Io(e).with_context(f()))
    }
}
