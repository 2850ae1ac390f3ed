//! Transmit channel: outbound payload lines.
//!
//! Messages are only written while the transmit pipe is open. Sending while
//! it is closed drops the message without raising anything.

use super::pipe::{Pipe, PipeMode};
use crate::error::{BridgeError, Result};
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug)]
pub struct TransmitChannel {
    pipe: Pipe,
}

impl TransmitChannel {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            pipe: Pipe::new(path, PipeMode::Append),
        }
    }

    pub fn is_open(&self) -> bool {
        self.pipe.is_open()
    }

    /// Open the pipe unless it already is
    pub fn open(&mut self) -> Result<()> {
        self.pipe.ensure_open().map(|_| ())
    }

    pub fn close(&mut self) -> bool {
        self.pipe.close()
    }

    /// Append `text` and a newline. Returns `false` if the pipe is closed.
    pub fn send(&mut self, text: &str) -> Result<bool> {
        if !self.pipe.is_open() {
            tracing::debug!("Transmit pipe closed, dropping message");
            return Ok(false);
        }

        let path = self.pipe.path().to_path_buf();
        let line = format!("{}\n", text);
        let file = self.pipe.ensure_open()?;
        file.write_all(line.as_bytes()).map_err(|e| {
            tracing::error!("Transmit write failed on {:?}: {}", path, e);
            BridgeError::pipe(&path, e)
        })?;
        Ok(true)
    }
}
