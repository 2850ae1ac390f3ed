//! Configuration module for radio-bridge
//!
//! This module handles bridge configuration including:
//! - The three backend pipe paths
//! - Receive framer sizing and retry timing
//! - Signal constants folded into component directives
//! - How (and whether) the backend process is launched
//!
//! # Config Location
//!
//! [`BridgeConfig::load_or_default`] looks for `config.toml` in the
//! platform config directory under `radio-bridge`:
//! - **Linux**: `~/.config/radio-bridge/config.toml`
//! - **macOS**: `~/Library/Application Support/radio-bridge/config.toml`
//!
//! # Example
//!
//! ```toml
//! [pipes]
//! command = "/tmp/gr-control/command.pipe"
//!
//! [framer]
//! capacity = 1024
//! threshold = 768
//! retry_delay_ms = 1000
//!
//! [signal]
//! sample_rate = 400000
//! message_bit_rate = 1200
//!
//! [backend]
//! launch = false
//! ```

use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application identifier for the config directory
pub const APP_ID: &str = "radio-bridge";

/// Config filename inside the config directory
pub const CONFIG_FILE: &str = "config.toml";

/// Default command pipe path
pub const DEFAULT_COMMAND_PIPE: &str = "/tmp/gr-control/command.pipe";

/// Default transmit message pipe path
pub const DEFAULT_TX_PIPE: &str = "/tmp/gr-control/txmessage.pipe";

/// Default receive message pipe path
pub const DEFAULT_RX_PIPE: &str = "/tmp/gr-control/rxmessage.pipe";

/// Default receive buffer capacity in bytes
pub const DEFAULT_RX_CAPACITY: usize = 1024;

/// Default fill level at which buffered lines are drained before reading again
pub const DEFAULT_RX_THRESHOLD: usize = 768;

/// Default delay before a receive request is retried
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Default backend sample rate in samples per second
pub const DEFAULT_SAMPLE_RATE: u32 = 400_000;

/// Default message bit rate in bits per second
pub const DEFAULT_MESSAGE_BIT_RATE: u32 = 1200;

/// Default backend launcher program
pub const DEFAULT_LAUNCH_PROGRAM: &str = "lxterminal";

/// Default backend start script
pub const DEFAULT_LAUNCH_SCRIPT: &str = "/usr/lib/scratch2/scratch_extensions/start_gnu_radio.sh";

/// Get the platform config directory for radio-bridge
pub fn config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID))
}

/// Get the path to the default config file
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join(CONFIG_FILE))
}

// ==================== Bridge Config ====================

/// Complete bridge configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Backend pipe locations
    #[serde(default)]
    pub pipes: PipePaths,

    /// Receive framer sizing and timing
    #[serde(default)]
    pub framer: FramerConfig,

    /// Signal constants used when creating components
    #[serde(default)]
    pub signal: SignalConfig,

    /// Backend process launcher
    #[serde(default)]
    pub backend: BackendConfig,
}

impl BridgeConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration with all three pipes placed in `dir`
    pub fn with_pipe_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            pipes: PipePaths::in_dir(dir),
            ..Default::default()
        }
    }

    /// Load a configuration file from disk and validate it
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            BridgeError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            BridgeError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load from the platform config location, falling back to defaults
    pub fn load_or_default() -> Self {
        let Some(path) = default_config_path().filter(|p| p.exists()) else {
            return Self::default();
        };

        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save the configuration as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                BridgeError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| BridgeError::Serialization(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            BridgeError::Config(format!("Failed to write config file {:?}: {}", path, e))
        })
    }

    /// Check the invariants the session relies on
    pub fn validate(&self) -> Result<()> {
        self.pipes.validate()?;
        self.framer.validate()?;
        self.signal.validate()
    }
}

// ==================== Pipe Paths ====================

/// Filesystem locations of the three backend pipes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipePaths {
    /// Directive pipe (append)
    pub command: PathBuf,
    /// Outbound payload pipe (append)
    pub transmit: PathBuf,
    /// Inbound payload pipe (non-blocking read)
    pub receive: PathBuf,
}

impl Default for PipePaths {
    fn default() -> Self {
        Self {
            command: PathBuf::from(DEFAULT_COMMAND_PIPE),
            transmit: PathBuf::from(DEFAULT_TX_PIPE),
            receive: PathBuf::from(DEFAULT_RX_PIPE),
        }
    }
}

impl PipePaths {
    /// Standard pipe file names placed under `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            command: dir.join("command.pipe"),
            transmit: dir.join("txmessage.pipe"),
            receive: dir.join("rxmessage.pipe"),
        }
    }

    fn validate(&self) -> Result<()> {
        for (label, path) in [
            ("command", &self.command),
            ("transmit", &self.transmit),
            ("receive", &self.receive),
        ] {
            if path.as_os_str().is_empty() {
                return Err(BridgeError::Config(format!("{} pipe path is empty", label)));
            }
        }
        Ok(())
    }
}

// ==================== Framer Config ====================

/// Receive buffer sizing and retry timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FramerConfig {
    /// Receive buffer capacity in bytes
    pub capacity: usize,
    /// Fill level at which a buffered line is drained without reading first
    pub threshold: usize,
    /// Delay before a pending receive is retried, in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for FramerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_RX_CAPACITY,
            threshold: DEFAULT_RX_THRESHOLD,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

impl FramerConfig {
    /// Retry delay as a Duration
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(BridgeError::Config(
                "framer capacity must be non-zero".to_string(),
            ));
        }
        if self.threshold >= self.capacity {
            return Err(BridgeError::Config(format!(
                "framer threshold {} must be below capacity {}",
                self.threshold, self.capacity
            )));
        }
        Ok(())
    }
}

// ==================== Signal Config ====================

/// Process-wide signal constants folded into CREATE directives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Backend sample rate in samples per second
    pub sample_rate: u32,
    /// Payload message bit rate in bits per second
    pub message_bit_rate: u32,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            message_bit_rate: DEFAULT_MESSAGE_BIT_RATE,
        }
    }
}

impl SignalConfig {
    /// Symbol rate used by the OOK modulator, demodulator and bit sampler
    pub fn symbol_rate(&self) -> f64 {
        2.0 * f64::from(self.message_bit_rate)
    }

    /// Byte rate handed to the message source
    pub fn byte_rate(&self) -> f64 {
        f64::from(self.message_bit_rate) / 8.0
    }

    fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(BridgeError::Config("sample rate must be non-zero".to_string()));
        }
        if self.message_bit_rate == 0 {
            return Err(BridgeError::Config(
                "message bit rate must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

// ==================== Backend Config ====================

/// How the backend process is started
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Spawn the backend when the bridge starts
    pub launch: bool,
    /// Program to execute
    pub program: String,
    /// Arguments passed to the program
    pub args: Vec<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            launch: true,
            program: DEFAULT_LAUNCH_PROGRAM.to_string(),
            args: vec!["-e".to_string(), DEFAULT_LAUNCH_SCRIPT.to_string()],
        }
    }
}

// ==================== Tests ====================
