//! Controlling-terminal ownership
//!
//! Only one process group may read from the terminal at a time. The shell
//! hands the terminal to a job's group for the duration of a blocking
//! foreground wait and takes it back afterwards; [`ForegroundGuard`] ties the
//! two together so the shell gets the terminal back on every path.

use crate::error::{ShellError, ShellResult};
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use nix::unistd::{getpgrp, tcsetpgrp, Pid};
use std::io::{self, IsTerminal};

/// Signals raised when a background group touches the terminal.
pub const TERMINAL_SIGNALS: [Signal; 2] = [Signal::SIGTTIN, Signal::SIGTTOU];

pub trait TerminalControl {
    /// Make `pgid` the terminal's foreground process group.
    fn give_to(&self, pgid: Pid) -> ShellResult<()>;

    /// Make the shell's own group the foreground process group again.
    fn reclaim(&self) -> ShellResult<()>;
}

/// The terminal attached to the shell's standard input.
#[derive(Debug)]
pub struct Tty {
    shell_pgid: Pid,
}

impl Tty {
    pub fn new() -> Self {
        Self {
            shell_pgid: getpgrp(),
        }
    }
}

impl Default for Tty {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalControl for Tty {
    fn give_to(&self, pgid: Pid) -> ShellResult<()> {
        tracing::debug!(%pgid, "giving terminal to job");
        tcsetpgrp(io::stdin(), pgid)
            .map_err(|source| ShellError::TerminalControl { pgid, source })
    }

    fn reclaim(&self) -> ShellResult<()> {
        let pgid = self.shell_pgid;
        tracing::debug!(%pgid, "reclaiming terminal");
        tcsetpgrp(io::stdin(), pgid)
            .map_err(|source| ShellError::TerminalControl { pgid, source })
    }
}

/// Stand-in when standard input is not a terminal: there is nothing to hand over.
#[derive(Debug, Default)]
pub struct Detached;

impl TerminalControl for Detached {
    fn give_to(&self, _pgid: Pid) -> ShellResult<()> {
        Ok(())
    }

    fn reclaim(&self) -> ShellResult<()> {
        Ok(())
    }
}

/// Terminal control for the current process.
pub fn for_stdin() -> Box<dyn TerminalControl> {
    if io::stdin().is_terminal() {
        Box::new(Tty::new())
    } else {
        Box::new(Detached)
    }
}

/// Terminal handed to a job; dropping or releasing it hands it back.
pub struct ForegroundGuard<'a> {
    terminal: &'a dyn TerminalControl,
    released: bool,
}

impl<'a> ForegroundGuard<'a> {
    /// Give the terminal to `pgid`. If that fails the shell still tries to
    /// take the terminal back before the error is returned.
    pub fn acquire(terminal: &'a dyn TerminalControl, pgid: Pid) -> ShellResult<Self> {
        if let Err(err) = terminal.give_to(pgid) {
            if let Err(reclaim_err) = terminal.reclaim() {
                tracing::warn!(error = %reclaim_err, "failed to reclaim terminal");
            }
            return Err(err);
        }
        Ok(Self {
            terminal,
            released: false,
        })
    }

    /// Take the terminal back, reporting failure.
    pub fn release(mut self) -> ShellResult<()> {
        self.released = true;
        self.terminal.reclaim()
    }
}

impl Drop for ForegroundGuard<'_> {
    fn drop(&mut self) {
        if !self.released {
            if let Err(err) = self.terminal.reclaim() {
                tracing::warn!(error = %err, "failed to reclaim terminal");
            }
        }
    }
}

/// Ignore the terminal-arbitration signals in the shell itself, so that
/// reclaiming the terminal from a background position does not stop it.
pub fn ignore_terminal_signals() -> nix::Result<()> {
    let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::all());
    for signal in TERMINAL_SIGNALS {
        // SAFETY: installs SIG_IGN, no handler code runs.
        #[allow(unsafe_code)]
        unsafe {
            sigaction(signal, &ignore)?;
        }
    }
    Ok(())
}

/// Restore the terminal-arbitration signals to their defaults and unblock
/// them. Runs in the forked child between `fork` and `exec`, so it only
/// makes async-signal-safe calls.
pub fn reset_terminal_signals() -> io::Result<()> {
    let default = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::all());
    let mut unblock = SigSet::empty();
    for signal in TERMINAL_SIGNALS {
        // SAFETY: installs SIG_DFL, no handler code runs.
        #[allow(unsafe_code)]
        unsafe {
            sigaction(signal, &default)?;
        }
        unblock.add(signal);
    }
    unblock.thread_unblock()?;
    Ok(())
}
