//! Bridge worker loop
//!
//! Owns the [`Session`] and serves [`BridgeCommand`]s. Between commands the
//! worker sleeps in `recv_timeout`, waking no later than the next receive
//! retry deadline so pending receives fire on time.

use super::{BackendProcess, BridgeCommand, BridgeMessage};
use crate::config::BridgeConfig;
use crate::error::Result;
use crate::session::{Fault, Session};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Longest sleep between checks of the running flag
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Worker that owns the session
pub struct BridgeWorker {
    session: Session,
    command_rx: Receiver<BridgeCommand>,
    message_tx: Sender<BridgeMessage>,
    running: Arc<AtomicBool>,
    process: Option<BackendProcess>,
}

impl BridgeWorker {
    pub fn new(
        config: BridgeConfig,
        command_rx: Receiver<BridgeCommand>,
        message_tx: Sender<BridgeMessage>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            session: Session::new(config),
            command_rx,
            message_tx,
            running,
            process: None,
        }
    }

    /// Take ownership of a launched backend so it is terminated on exit
    pub fn with_process(mut self, process: Option<BackendProcess>) -> Self {
        self.process = process;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run the main worker loop
    pub fn run(&mut self) {
        tracing::info!("Bridge worker started");

        while self.running.load(Ordering::SeqCst) {
            let timeout = self.next_timeout(Instant::now());
            match self.command_rx.recv_timeout(timeout) {
                Ok(cmd) => self.handle_command(cmd),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    self.running.store(false, Ordering::SeqCst);
                }
            }
            self.session.poll_timers(Instant::now());
        }

        // Cleanup
        self.session.shutdown();
        if let Some(mut process) = self.process.take() {
            if let Err(e) = process.terminate() {
                tracing::warn!("{}", e);
            }
        }

        let _ = self.message_tx.send(BridgeMessage::Shutdown);
        tracing::info!("Bridge worker stopped");
    }

    fn next_timeout(&self, now: Instant) -> Duration {
        match self.session.next_wakeup() {
            Some(deadline) => deadline.saturating_duration_since(now).min(IDLE_POLL_INTERVAL),
            None => IDLE_POLL_INTERVAL,
        }
    }

    /// Process every queued command without waiting
    pub fn process_commands(&mut self) {
        while let Ok(cmd) = self.command_rx.try_recv() {
            self.handle_command(cmd);
        }
    }

    /// Handle a single command
    fn handle_command(&mut self, cmd: BridgeCommand) {
        let label = cmd.label();
        tracing::debug!("Command: {}", label);

        if let Err(e) = self.execute(cmd) {
            tracing::error!("Command '{}' failed: {}", label, e);
            self.send_message(BridgeMessage::CommandFailed {
                command: label.to_string(),
                error: e.to_string(),
            });
        }
    }

    fn execute(&mut self, cmd: BridgeCommand) -> Result<()> {
        match cmd {
            BridgeCommand::Reset => self.session.reset()?,
            BridgeCommand::Start => self.session.start()?,
            BridgeCommand::Stop => self.session.stop()?,
            BridgeCommand::Create { name, component } => {
                self.session.create(&name, &component)?;
            }
            BridgeCommand::SourceFrom(producer) => self.session.source_from(&producer),
            BridgeCommand::SendMessage(text) => {
                self.session.send_message(&text)?;
            }
            BridgeCommand::ReceiveMessage => {
                let tx = self.message_tx.clone();
                self.session.receive_message(
                    Instant::now(),
                    Box::new(move |message: String| {
                        let _ = tx.send(BridgeMessage::Received { message });
                    }),
                );
            }
            BridgeCommand::WatchErrors => {
                let tx = self.message_tx.clone();
                self.session.on_error(Box::new(move |fault: Fault| {
                    let _ = tx.send(BridgeMessage::fault(fault));
                }));
            }
            BridgeCommand::QueryRunning => {
                let running = self.session.is_running();
                self.send_message(BridgeMessage::Running { running });
            }
            BridgeCommand::QueryStatus => {
                let readiness = self.session.status();
                self.send_message(BridgeMessage::status(readiness));
            }
            BridgeCommand::Shutdown => {
                tracing::info!("Shutdown requested");
                self.running.store(false, Ordering::SeqCst);
            }
        }
        Ok(())
    }

    fn send_message(&self, msg: BridgeMessage) {
        if self.message_tx.send(msg).is_err() {
            tracing::debug!("Front end gone, message dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Component;
    use crate::session::Fault;
    use crate::types::Readiness;
    use crossbeam_channel::bounded;
    use tempfile::{tempdir, TempDir};

    fn create_test_worker() -> (
        TempDir,
        BridgeWorker,
        Receiver<BridgeMessage>,
        Sender<BridgeCommand>,
    ) {
        let dir = tempdir().unwrap();
        let (cmd_tx, cmd_rx) = bounded(16);
        let (msg_tx, msg_rx) = bounded(16);
        let running = Arc::new(AtomicBool::new(true));
        let config = BridgeConfig::with_pipe_dir(dir.path());

        let worker = BridgeWorker::new(config, cmd_rx, msg_tx, running);
        (dir, worker, msg_rx, cmd_tx)
    }

    #[test]
    fn test_worker_creation() {
        let (_dir, worker, _, _) = create_test_worker();
        assert!(!worker.session().is_running());
        assert_eq!(worker.next_timeout(Instant::now()), IDLE_POLL_INTERVAL);
    }

    #[test]
    fn test_queries() {
        let (_dir, mut worker, msg_rx, cmd_tx) = create_test_worker();
        cmd_tx.send(BridgeCommand::QueryRunning).unwrap();
        cmd_tx.send(BridgeCommand::QueryStatus).unwrap();
        worker.process_commands();

        assert_eq!(
            msg_rx.try_recv().unwrap(),
            BridgeMessage::Running { running: false }
        );
        assert_eq!(
            msg_rx.try_recv().unwrap(),
            BridgeMessage::status(Readiness::NoCommandPipe)
        );
    }

    #[test]
    fn test_watch_errors_forwards_fault() {
        let (_dir, mut worker, msg_rx, cmd_tx) = create_test_worker();
        cmd_tx.send(BridgeCommand::WatchErrors).unwrap();
        cmd_tx.send(BridgeCommand::ReceiveMessage).unwrap();
        worker.process_commands();

        assert_eq!(
            msg_rx.try_recv().unwrap(),
            BridgeMessage::fault(Fault::RadioNotRunning)
        );
        assert_eq!(
            msg_rx.try_recv().unwrap(),
            BridgeMessage::Received {
                message: String::new()
            }
        );
    }

    #[test]
    fn test_start_runs_session() {
        let (_dir, mut worker, _, cmd_tx) = create_test_worker();
        cmd_tx
            .send(BridgeCommand::Create {
                name: "msg".into(),
                component: Component::MessageSource,
            })
            .unwrap();
        cmd_tx.send(BridgeCommand::Start).unwrap();
        worker.process_commands();

        assert!(worker.session().is_running());
        assert!(worker.session().is_transmit_open());
    }

    #[test]
    fn test_command_failure_is_reported() {
        let dir = tempdir().unwrap();
        let (cmd_tx, cmd_rx) = bounded(4);
        let (msg_tx, msg_rx) = bounded(4);
        let config = BridgeConfig::with_pipe_dir(dir.path().join("missing"));
        let mut worker =
            BridgeWorker::new(config, cmd_rx, msg_tx, Arc::new(AtomicBool::new(true)));

        cmd_tx.send(BridgeCommand::Start).unwrap();
        worker.process_commands();

        match msg_rx.try_recv().unwrap() {
            BridgeMessage::CommandFailed { command, error } => {
                assert_eq!(command, "start");
                assert!(error.contains("command.pipe"));
            }
            other => panic!("unexpected message {:?}", other),
        }
        assert!(!worker.session().is_running());
    }

    #[test]
    fn test_shutdown_command() {
        let (_dir, mut worker, msg_rx, cmd_tx) = create_test_worker();
        cmd_tx.send(BridgeCommand::Shutdown).unwrap();
        worker.run();

        assert!(!worker.running.load(Ordering::SeqCst));
        assert_eq!(msg_rx.try_recv().unwrap(), BridgeMessage::Shutdown);
    }
}
