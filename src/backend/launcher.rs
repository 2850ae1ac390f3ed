//! Backend process launcher
//!
//! Spawns the configured start command for the radio backend and asks it to
//! exit with `SIGHUP` when the bridge shuts down.

use crate::config::BackendConfig;
use crate::error::{BridgeError, Result, ResultExt};
use std::process::{Child, Command};

/// Handle to a spawned backend process
#[derive(Debug)]
pub struct BackendProcess {
    child: Option<Child>,
}

impl BackendProcess {
    /// Spawn `config.program` with `config.args`
    pub fn spawn(config: &BackendConfig) -> Result<Self> {
        let child = Command::new(&config.program)
            .args(&config.args)
            .spawn()
            .map_err(|e| {
                BridgeError::Backend(format!("Failed to spawn '{}': {}", config.program, e))
            })?;

        tracing::info!("Launched backend '{}' (pid {})", config.program, child.id());
        Ok(Self { child: Some(child) })
    }

    /// Process id while the child is still owned
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }

    pub fn is_terminated(&self) -> bool {
        self.child.is_none()
    }

    /// Send `SIGHUP` and reap the child. Does nothing the second time.
    pub fn terminate(&mut self) -> Result<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        let pid = child.id() as libc::pid_t;
        // SAFETY: kill has no memory-safety preconditions; pid came from our own child.
        if unsafe { libc::kill(pid, libc::SIGHUP) } != 0 {
            let err = std::io::Error::last_os_error();
            if err.raw_os_error() != Some(libc::ESRCH) {
                tracing::warn!("Failed to signal backend pid {}: {}", pid, err);
            }
        }

        let status = child
            .wait()
            .with_context(|| format!("Failed to reap backend pid {}", pid))?;
        tracing::info!("Backend exited: {}", status);
        Ok(())
    }
}

impl Drop for BackendProcess {
    fn drop(&mut self) {
        if let Err(e) = self.terminate() {
            tracing::warn!("{}", e);
        }
    }
}
