//! Session controller
//!
//! A [`Session`] owns every piece of mutable bridge state: the three pipe
//! channels, the component registry and wiring cursor, the receive buffer,
//! the running/sticky flags, the error listeners and the retry timers.
//!
//! It is driven from a single thread. Time is passed in explicitly, so the
//! caller decides when pending receive retries fire:
//!
//! ```no_run
//! use radio_bridge::config::BridgeConfig;
//! use radio_bridge::session::Session;
//! use std::time::Instant;
//!
//! let mut session = Session::new(BridgeConfig::default());
//! session.receive_message(Instant::now(), Box::new(|msg: String| println!("got {msg:?}")));
//! // later, from the event loop:
//! session.poll_timers(Instant::now());
//! ```
//!
//! # Epochs
//!
//! Every stop and reset advances the session epoch and resolves all pending
//! receive requests with an empty message. A retry scheduled in an older
//! epoch never touches the new session state.

mod faults;
mod scheduler;

pub use faults::{ErrorListener, ErrorListeners, Fault};
pub use scheduler::{Continuation, RetryQueue};

use crate::channel::{probe_readiness, ByteSource, CommandChannel, FramerStep, ReceiveFramer, TransmitChannel};
use crate::config::BridgeConfig;
use crate::error::Result;
use crate::graph::{Component, Directive, GraphBuilder, ParamContext};
use crate::types::{ComponentKind, Readiness, SessionFlags};
use std::time::Instant;

/// All client-side state of one bridge session
#[derive(Debug)]
pub struct Session {
    config: BridgeConfig,
    command: CommandChannel,
    transmit: TransmitChannel,
    framer: ReceiveFramer,
    graph: GraphBuilder,
    listeners: ErrorListeners,
    retries: RetryQueue,
    flags: SessionFlags,
    epoch: u64,
}

impl Session {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            command: CommandChannel::new(&config.pipes.command),
            transmit: TransmitChannel::new(&config.pipes.transmit),
            framer: ReceiveFramer::new(&config.framer),
            graph: GraphBuilder::new(),
            listeners: ErrorListeners::new(),
            retries: RetryQueue::new(),
            flags: SessionFlags::default(),
            epoch: 0,
            config,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn flags(&self) -> SessionFlags {
        self.flags
    }

    pub fn is_running(&self) -> bool {
        self.flags.running
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn graph(&self) -> &GraphBuilder {
        &self.graph
    }

    pub fn framer(&self) -> &ReceiveFramer {
        &self.framer
    }

    pub fn is_transmit_open(&self) -> bool {
        self.transmit.is_open()
    }

    /// Number of receive requests waiting for a retry
    pub fn pending_receives(&self) -> usize {
        self.retries.len()
    }

    // ==================== Lifecycle ====================

    /// Stop if running, forget all components and flags, then send `RESET`
    pub fn reset(&mut self) -> Result<()> {
        if self.flags.running {
            self.stop()?;
        }
        self.flags.tx_enabled = false;
        self.flags.rx_enabled = false;
        self.graph.clear();
        self.advance_epoch();

        self.command.send(&Directive::Reset)?;
        tracing::info!("Session reset");
        Ok(())
    }

    /// Send `START` and open whichever message pipes have been requested
    pub fn start(&mut self) -> Result<()> {
        self.command.send(&Directive::Start)?;

        if self.flags.tx_enabled && !self.transmit.is_open() {
            self.transmit.open()?;
        }
        if self.flags.rx_enabled && !self.framer.is_open() {
            self.framer.open(&self.config.pipes.receive)?;
        }
        self.flags.running = true;
        tracing::info!("Session started (epoch {})", self.epoch);
        Ok(())
    }

    /// Send `STOP`, close the message pipes and cancel pending receives.
    ///
    /// Bytes already sitting in the receive FIFO are not flushed and will be
    /// read after the next start.
    pub fn stop(&mut self) -> Result<()> {
        self.command.send(&Directive::Stop)?;

        self.flags.running = false;
        self.transmit.close();
        self.framer.close();
        self.advance_epoch();
        tracing::info!("Session stopped");
        Ok(())
    }

    /// Close every pipe and resolve pending receives. Sends nothing.
    pub fn shutdown(&mut self) {
        self.flags.running = false;
        self.command.close();
        self.transmit.close();
        self.framer.close();
        self.advance_epoch();
        tracing::info!("Session shut down");
    }

    fn advance_epoch(&mut self) {
        self.epoch += 1;
        let cancelled = self.retries.cancel_all();
        if !cancelled.is_empty() {
            tracing::debug!(
                "Cancelled {} pending receive(s) entering epoch {}",
                cancelled.len(),
                self.epoch
            );
        }
        for continuation in cancelled {
            continuation(String::new());
        }
    }

    /// Probe the backend pipes on disk
    pub fn status(&self) -> Readiness {
        probe_readiness(&self.config.pipes)
    }

    // ==================== Graph ====================

    /// Create a component and wire it into the current chain.
    ///
    /// Protocol misuse is reported to the error listeners; only command or
    /// pipe I/O failures are returned as errors.
    pub fn create(&mut self, name: &str, component: &Component) -> Result<()> {
        if let Err(fault) = self.graph.register(name) {
            self.emit(fault);
            return Ok(());
        }

        let kind = component.kind();
        match kind {
            ComponentKind::MessageSource => self.flags.tx_enabled = true,
            ComponentKind::MessageSink => self.flags.rx_enabled = true,
            _ => {}
        }

        let ctx = ParamContext {
            signal: &self.config.signal,
            pipes: &self.config.pipes,
        };
        let wiring = self.graph.build(name, component, ctx, &mut self.command)?;
        if let Some(fault) = wiring {
            self.emit(fault);
        }

        match kind {
            ComponentKind::MessageSource if !self.transmit.is_open() => self.transmit.open()?,
            ComponentKind::MessageSink => self.framer.open(&self.config.pipes.receive)?,
            _ => {}
        }
        tracing::debug!("Created {} {} (cursor: {:?})", kind, name, self.graph.cursor());
        Ok(())
    }

    /// Continue the chain from an existing component
    pub fn source_from(&mut self, producer: &str) {
        if let Err(fault) = self.graph.source_from(producer) {
            self.emit(fault);
        }
    }

    // ==================== Messages ====================

    /// Send a payload line if the transmit pipe is open. Returns whether it was written.
    pub fn send_message(&mut self, text: &str) -> Result<bool> {
        self.transmit.send(text)
    }

    /// Request the next received message.
    ///
    /// `continuation` runs exactly once: with the message, or with an empty
    /// string if the pipe is closed, the read fails, or the request is
    /// cancelled by stop/reset.
    pub fn receive_message(&mut self, now: Instant, continuation: Continuation) {
        match self.framer.poll() {
            FramerStep::Delivered(message) => continuation(message),
            FramerStep::Retry => {
                let due = now + self.config.framer.retry_delay();
                self.retries.schedule(due, self.epoch, continuation);
            }
            FramerStep::Closed => {
                self.emit(Fault::RadioNotRunning);
                continuation(String::new());
            }
            FramerStep::Fault(code) => {
                self.emit(Fault::RxMessage(code));
                continuation(String::new());
            }
        }
    }

    /// Re-run every receive request whose retry deadline has passed.
    ///
    /// Returns the number of requests that were retried.
    pub fn poll_timers(&mut self, now: Instant) -> usize {
        let due = self.retries.take_due(now, self.epoch);
        let count = due.len();
        for continuation in due {
            self.receive_message(now, continuation);
        }
        count
    }

    /// Deadline of the earliest pending retry
    pub fn next_wakeup(&self) -> Option<Instant> {
        self.retries.next_deadline()
    }

    // ==================== Faults ====================

    /// Register a one-shot listener for the next fault
    pub fn on_error(&mut self, listener: ErrorListener) {
        self.listeners.register(listener);
    }

    fn emit(&mut self, fault: Fault) {
        self.listeners.emit(fault);
    }

    /// Replace the receive source with an in-memory one
    pub fn attach_receive_source(&mut self, source: Box<dyn ByteSource>) {
        self.framer.attach(source);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.retries
            .cancel_all()
            .into_iter()
            .for_each(|continuation| continuation(String::new()));
    }
}
