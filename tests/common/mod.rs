//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod fifo;

use radio_bridge::config::BridgeConfig;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

/// Create a test timeout duration
pub fn test_timeout() -> Duration {
    Duration::from_secs(5)
}

/// A temporary directory holding the three bridge pipes
pub struct PipeDir {
    pub dir: TempDir,
    pub config: BridgeConfig,
}

impl PipeDir {
    /// Empty directory; pipes are created by whoever opens them first
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = BridgeConfig::with_pipe_dir(dir.path());
        config.backend.launch = false;
        Self { dir, config }
    }

    /// Directory with a real FIFO at the receive path
    pub fn with_receive_fifo() -> Self {
        let pipes = Self::new();
        fifo::make_fifo(&pipes.config.pipes.receive);
        pipes
    }

    /// Lines written to the command pipe so far
    pub fn command_lines(&self) -> Vec<String> {
        read_lines(&self.config.pipes.command)
    }

    /// Lines written to the transmit pipe so far
    pub fn transmit_lines(&self) -> Vec<String> {
        read_lines(&self.config.pipes.transmit)
    }
}

/// Read a plain file as lines, empty if it does not exist
pub fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}
