//! Waiting on and signalling child process groups

use crate::error::{ShellError, ShellResult};
use nix::errno::Errno;
use nix::sys::signal::{killpg, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

/// What a stop-reporting wait observed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitOutcome {
    Exited(i32),
    Signaled(Signal),
    Stopped(Signal),
    /// The child no longer exists (already reaped elsewhere)
    Vanished,
}

impl WaitOutcome {
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped(_))
    }

    pub fn is_terminated(&self) -> bool {
        !self.is_stopped()
    }

    /// Shell-style status code: exit code, or 128 + signal number.
    pub fn code(&self) -> i32 {
        match self {
            Self::Exited(code) => *code,
            Self::Signaled(sig) | Self::Stopped(sig) => 128 + *sig as i32,
            Self::Vanished => 0,
        }
    }
}

/// Block until `pid` exits, is killed, or stops.
///
/// Interrupted waits are retried; there is no other way to cancel.
pub fn wait_for_change(pid: Pid) -> ShellResult<WaitOutcome> {
    loop {
        match waitpid(pid, Some(WaitPidFlag::WUNTRACED)) {
            Ok(WaitStatus::Exited(_, code)) => {
                tracing::debug!(%pid, code, "child exited");
                return Ok(WaitOutcome::Exited(code));
            }
            Ok(WaitStatus::Signaled(_, signal, _)) => {
                tracing::debug!(%pid, ?signal, "child killed");
                return Ok(WaitOutcome::Signaled(signal));
            }
            Ok(WaitStatus::Stopped(_, signal)) => {
                tracing::debug!(%pid, ?signal, "child stopped");
                return Ok(WaitOutcome::Stopped(signal));
            }
            Ok(other) => {
                tracing::trace!(%pid, ?other, "ignoring wait status");
            }
            Err(Errno::EINTR) => {}
            Err(Errno::ECHILD) => {
                tracing::debug!(%pid, "child already gone");
                return Ok(WaitOutcome::Vanished);
            }
            Err(source) => return Err(ShellError::Wait { pid, source }),
        }
    }
}

/// Send the continue signal to every process in the group.
pub fn continue_group(pgid: Pid) -> ShellResult<()> {
    tracing::debug!(%pgid, "sending SIGCONT");
    killpg(pgid, Signal::SIGCONT).map_err(|source| ShellError::Signal { pgid, source })
}
