//! Command channel: appends one directive per line to the command pipe.

use super::pipe::{Pipe, PipeMode};
use crate::error::{BridgeError, Result};
use crate::graph::{Directive, DirectiveSink};
use std::io::Write;
use std::path::PathBuf;

/// Append-only writer for control directives
#[derive(Debug)]
pub struct CommandChannel {
    pipe: Pipe,
}

impl CommandChannel {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            pipe: Pipe::new(path, PipeMode::Append),
        }
    }

    pub fn is_open(&self) -> bool {
        self.pipe.is_open()
    }

    /// Write `directive` followed by a newline, opening the pipe on first use
    pub fn send(&mut self, directive: &Directive) -> Result<()> {
        let line = format!("{}\n", directive);
        let path = self.pipe.path().to_path_buf();
        let file = self.pipe.ensure_open()?;

        file.write_all(line.as_bytes()).map_err(|e| {
            tracing::error!("Command write failed on {:?}: {}", path, e);
            BridgeError::pipe(&path, e)
        })?;
        tracing::debug!("-> {}", directive);
        Ok(())
    }

    pub fn close(&mut self) -> bool {
        self.pipe.close()
    }
}

impl DirectiveSink for CommandChannel {
    fn send(&mut self, directive: Directive) -> Result<()> {
        CommandChannel::send(self, &directive)
    }
}
