//! # radio-bridge: pipe-driven control bridge for a radio backend
//!
//! Drives an external signal-processing backend through three named pipes:
//! a command pipe for control directives, a transmit pipe for outbound
//! payload lines and a receive pipe for inbound payload lines.
//!
//! ## Architecture
//!
//! - **Session**: single-threaded owner of all bridge state ([`session`])
//! - **Graph builder**: turns "create component" calls into `CREATE` and
//!   `CONNECT` directives along a single wiring cursor ([`graph`])
//! - **Channels**: lazily opened pipes and the non-blocking receive framer
//!   ([`channel`])
//! - **Backend**: worker thread plus crossbeam-channel handle ([`backend`])
//! - **Script**: line-oriented text front end ([`script`])
//!
//! ## Configuration
//!
//! Settings are read from `config.toml` in the platform config directory
//! under `radio-bridge` (see [`config`]).
//!
//! ## Example
//!
//! ```no_run
//! use radio_bridge::{BridgeBackend, BridgeConfig, Component};
//!
//! let (backend, handle) = BridgeBackend::new(BridgeConfig::default());
//! std::thread::spawn(move || backend.run());
//!
//! handle.reset();
//! handle.create("rx", Component::RadioSource { frequency_mhz: 433.92, gain: 40.0 });
//! handle.create("inbox", Component::MessageSink);
//! handle.start();
//! handle.receive_message();
//! ```

pub mod backend;
pub mod channel;
pub mod config;
pub mod error;
pub mod graph;
pub mod script;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use backend::{BridgeBackend, BridgeCommand, BridgeHandle, BridgeMessage};
pub use config::BridgeConfig;
pub use error::{BridgeError, Result};
pub use graph::{Component, Directive, GraphBuilder};
pub use session::{Fault, Session};
pub use types::{ComponentKind, DisplayType, Readiness};
