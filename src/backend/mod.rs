//! Bridge worker thread and its UI-side handle
//!
//! The [`Session`](crate::session::Session) is single-threaded, so it lives
//! on a dedicated worker thread. Front ends talk to it through crossbeam
//! channels:
//!
//! - [`BridgeCommand`] - Requests sent to the worker (create, start, receive, ...)
//! - [`BridgeMessage`] - Replies and asynchronous events from the worker
//! - [`BridgeHandle`] - Front-end side: send commands, read messages
//! - [`BridgeBackend`] - Owns the worker end; `run()` blocks until shutdown
//!
//! # Example
//!
//! ```no_run
//! use radio_bridge::backend::{BridgeBackend, BridgeMessage};
//! use radio_bridge::config::BridgeConfig;
//! use std::time::Duration;
//!
//! let (backend, handle) = BridgeBackend::new(BridgeConfig::default());
//! std::thread::spawn(move || backend.run());
//!
//! handle.watch_errors();
//! handle.start();
//! handle.receive_message();
//!
//! while let Some(msg) = handle.recv_timeout(Duration::from_secs(5)) {
//!     if let BridgeMessage::Received { message } = msg {
//!         println!("{}", message);
//!         break;
//!     }
//! }
//! handle.shutdown();
//! ```

mod launcher;
mod worker;

pub use launcher::BackendProcess;
pub use worker::BridgeWorker;

use crate::config::BridgeConfig;
use crate::graph::Component;
use crate::session::Fault;
use crate::types::Readiness;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use serde::Serialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

/// Capacity of the command queue
pub const COMMAND_QUEUE_SIZE: usize = 256;

/// Capacity of the message queue
pub const MESSAGE_QUEUE_SIZE: usize = 1024;

/// Request sent from a front end to the worker
#[derive(Debug, Clone)]
pub enum BridgeCommand {
    /// Stop if running, clear components, send RESET
    Reset,
    /// Send START and open the requested message pipes
    Start,
    /// Send STOP and close the message pipes
    Stop,
    /// Create and wire a component
    Create { name: String, component: Component },
    /// Continue the chain from an existing component
    SourceFrom(String),
    /// Queue an outbound payload line
    SendMessage(String),
    /// Ask for the next inbound message (answered with `Received`)
    ReceiveMessage,
    /// Register a one-shot listener for the next fault (answered with `Fault`)
    WatchErrors,
    /// Answered with `Running`
    QueryRunning,
    /// Answered with `Status`
    QueryStatus,
    /// Shut the worker down
    Shutdown,
}

impl BridgeCommand {
    /// Short name used in logs and failure reports
    pub fn label(&self) -> &'static str {
        match self {
            BridgeCommand::Reset => "reset",
            BridgeCommand::Start => "start",
            BridgeCommand::Stop => "stop",
            BridgeCommand::Create { .. } => "create",
            BridgeCommand::SourceFrom(_) => "from",
            BridgeCommand::SendMessage(_) => "send",
            BridgeCommand::ReceiveMessage => "receive",
            BridgeCommand::WatchErrors => "errors",
            BridgeCommand::QueryRunning => "running",
            BridgeCommand::QueryStatus => "status",
            BridgeCommand::Shutdown => "quit",
        }
    }
}

/// Event sent from the worker to the front end
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeMessage {
    /// Answer to a receive request; empty when nothing could be received
    Received { message: String },
    /// A fault delivered to a registered listener
    Fault { fault: Fault, message: String },
    /// Whether the backend is running
    Running { running: bool },
    /// Readiness of the backend pipes
    Status {
        readiness: Readiness,
        code: u8,
        message: String,
    },
    /// A command failed with an I/O or backend error
    CommandFailed { command: String, error: String },
    /// The worker is exiting
    Shutdown,
}

impl BridgeMessage {
    pub fn fault(fault: Fault) -> Self {
        BridgeMessage::Fault {
            message: fault.to_string(),
            fault,
        }
    }

    pub fn status(readiness: Readiness) -> Self {
        BridgeMessage::Status {
            readiness,
            code: readiness.status_code(),
            message: readiness.message().to_string(),
        }
    }
}

/// Front-end handle to a running bridge worker
pub struct BridgeHandle {
    /// Receiver for worker messages
    pub receiver: Receiver<BridgeMessage>,
    /// Sender for commands to the worker
    pub command_sender: Sender<BridgeCommand>,
}

impl BridgeHandle {
    /// Try to receive a message without blocking
    pub fn try_recv(&self) -> Option<BridgeMessage> {
        self.receiver.try_recv().ok()
    }

    /// Wait up to `timeout` for the next message
    pub fn recv_timeout(&self, timeout: Duration) -> Option<BridgeMessage> {
        match self.receiver.recv_timeout(timeout) {
            Ok(msg) => Some(msg),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Receive all pending messages
    pub fn drain(&self) -> Vec<BridgeMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.receiver.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Send a command to the worker
    pub fn send_command(&self, cmd: BridgeCommand) -> bool {
        self.command_sender.send(cmd).is_ok()
    }

    pub fn reset(&self) {
        let _ = self.command_sender.send(BridgeCommand::Reset);
    }

    pub fn start(&self) {
        let _ = self.command_sender.send(BridgeCommand::Start);
    }

    pub fn stop(&self) {
        let _ = self.command_sender.send(BridgeCommand::Stop);
    }

    /// Create and wire a component
    pub fn create(&self, name: impl Into<String>, component: Component) {
        let _ = self.command_sender.send(BridgeCommand::Create {
            name: name.into(),
            component,
        });
    }

    pub fn source_from(&self, producer: impl Into<String>) {
        let _ = self
            .command_sender
            .send(BridgeCommand::SourceFrom(producer.into()));
    }

    pub fn send_message(&self, text: impl Into<String>) {
        let _ = self
            .command_sender
            .send(BridgeCommand::SendMessage(text.into()));
    }

    pub fn receive_message(&self) {
        let _ = self.command_sender.send(BridgeCommand::ReceiveMessage);
    }

    pub fn watch_errors(&self) {
        let _ = self.command_sender.send(BridgeCommand::WatchErrors);
    }

    /// Request shutdown
    pub fn shutdown(&self) {
        let _ = self.command_sender.send(BridgeCommand::Shutdown);
    }
}

/// Worker end of the bridge, run on its own thread
pub struct BridgeBackend {
    config: BridgeConfig,
    command_receiver: Receiver<BridgeCommand>,
    message_sender: Sender<BridgeMessage>,
    running: Arc<AtomicBool>,
}

impl BridgeBackend {
    /// Create the worker end and its handle
    pub fn new(config: BridgeConfig) -> (Self, BridgeHandle) {
        let (cmd_tx, cmd_rx) = bounded(COMMAND_QUEUE_SIZE);
        let (msg_tx, msg_rx) = bounded(MESSAGE_QUEUE_SIZE);

        let backend = Self {
            config,
            command_receiver: cmd_rx,
            message_sender: msg_tx,
            running: Arc::new(AtomicBool::new(true)),
        };

        let handle = BridgeHandle {
            receiver: msg_rx,
            command_sender: cmd_tx,
        };

        (backend, handle)
    }

    /// Launch the backend process if configured, then run the worker loop
    pub fn run(self) {
        let process = if self.config.backend.launch {
            match BackendProcess::spawn(&self.config.backend) {
                Ok(process) => Some(process),
                Err(e) => {
                    tracing::error!("{}", e);
                    let _ = self.message_sender.send(BridgeMessage::CommandFailed {
                        command: "launch".to_string(),
                        error: e.to_string(),
                    });
                    None
                }
            }
        } else {
            None
        };

        let mut worker = BridgeWorker::new(
            self.config,
            self.command_receiver,
            self.message_sender,
            self.running,
        )
        .with_process(process);
        worker.run();
    }

    /// Get a handle to stop the worker
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }
}
