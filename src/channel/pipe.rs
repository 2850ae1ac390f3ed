//! Lazily opened pipe handles.
//!
//! A [`Pipe`] binds one configured path to at most one open file. The handle
//! moves through `Absent -> Open -> Closed`, may be reopened on demand, and
//! closing it any number of times is harmless.

use crate::config::PipePaths;
use crate::error::{BridgeError, Result};
use crate::types::Readiness;
use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

/// How a pipe is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeMode {
    /// Write-only, appending, created if missing
    Append,
    /// Read-only with `O_NONBLOCK`
    NonBlockingRead,
}

/// Lifecycle of a pipe handle
#[derive(Debug, Default)]
pub enum PipeHandle {
    /// Never opened
    #[default]
    Absent,
    Open(File),
    /// Opened once, now released
    Closed,
}

/// A path plus its (optional) open handle
#[derive(Debug)]
pub struct Pipe {
    path: PathBuf,
    mode: PipeMode,
    handle: PipeHandle,
}

impl Pipe {
    pub fn new(path: impl Into<PathBuf>, mode: PipeMode) -> Self {
        Self {
            path: path.into(),
            mode,
            handle: PipeHandle::Absent,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn handle(&self) -> &PipeHandle {
        &self.handle
    }

    pub fn is_open(&self) -> bool {
        matches!(self.handle, PipeHandle::Open(_))
    }

    /// Open the pipe if it is not already open and return the file
    pub fn ensure_open(&mut self) -> Result<&mut File> {
        if !self.is_open() {
            let file = open_path(&self.path, self.mode)?;
            tracing::debug!("Opened {:?} ({:?})", self.path, self.mode);
            self.handle = PipeHandle::Open(file);
        }
        match &mut self.handle {
            PipeHandle::Open(file) => Ok(file),
            _ => Err(BridgeError::Channel(format!(
                "pipe {:?} did not stay open",
                self.path
            ))),
        }
    }

    /// Release the handle. Returns whether a file was actually closed.
    pub fn close(&mut self) -> bool {
        if self.is_open() {
            self.handle = PipeHandle::Closed;
            tracing::debug!("Closed {:?}", self.path);
            true
        } else {
            false
        }
    }

    /// Hand the open file over to another owner, leaving this handle closed
    pub fn take_file(&mut self) -> Option<File> {
        match std::mem::replace(&mut self.handle, PipeHandle::Closed) {
            PipeHandle::Open(file) => Some(file),
            other => {
                self.handle = other;
                None
            }
        }
    }
}

/// Open `path` according to `mode`, mapping failures to [`BridgeError::Pipe`]
pub fn open_path(path: &Path, mode: PipeMode) -> Result<File> {
    let mut options = OpenOptions::new();
    match mode {
        PipeMode::Append => options.append(true).create(true),
        PipeMode::NonBlockingRead => options.read(true).custom_flags(libc::O_NONBLOCK),
    };
    options.open(path).map_err(|e| BridgeError::pipe(path, e))
}

/// Check that the backend pipes exist, in command, transmit, receive order
pub fn probe_readiness(paths: &PipePaths) -> Readiness {
    if !paths.command.exists() {
        Readiness::NoCommandPipe
    } else if !paths.transmit.exists() {
        Readiness::NoTransmitPipe
    } else if !paths.receive.exists() {
        Readiness::NoReceivePipe
    } else {
        Readiness::Ready
    }
}
