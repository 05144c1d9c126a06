//! Error types for swish

use crate::jobs::JobStatus;
use nix::errno::Errno;
use nix::unistd::Pid;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for swish operations
pub type ShellResult<T> = Result<T, ShellError>;

/// Error types for shell operations
///
/// Everything except [`ShellError::Parse`] and [`ShellError::Exit`] abandons
/// the current command only; the shell keeps reading lines.
#[derive(Error, Debug)]
pub enum ShellError {
    /// Job index does not name an entry of the job table
    #[error("job index {index} out of range ({len} jobs)")]
    IndexOutOfRange { index: i64, len: usize },

    /// Job exists but is in the wrong state for the operation
    #[error("job {index} is {actual}, expected {expected}")]
    WrongStatus {
        index: usize,
        expected: JobStatus,
        actual: JobStatus,
    },

    /// Redirection target could not be opened, or has no operand
    #[error("redirection to '{}' failed: {source}", path.display())]
    Redirection {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Process creation or exec failed
    #[error("{program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// Terminal ownership could not be transferred or reclaimed
    #[error("terminal control for process group {pgid} failed: {source}")]
    TerminalControl { pgid: Pid, source: Errno },

    /// Stop-reporting wait failed for a reason other than interruption
    #[error("wait for process {pid} failed: {source}")]
    Wait { pid: Pid, source: Errno },

    /// Continue signal could not be delivered
    #[error("cannot signal process group {pgid}: {source}")]
    Signal { pgid: Pid, source: Errno },

    /// Missing or malformed command argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Input line could not be tokenized
    #[error("Parse error: {0}")]
    Parse(String),

    /// IO error writing built-in output
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Exit requested (not really an error)
    #[error("Exit with code {0}")]
    Exit(i32),
}

impl ShellError {
    /// Whether the shell must stop after reporting this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::Exit(_))
    }

    /// Process exit status for a fatal error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Exit(code) => *code,
            _ => 1,
        }
    }
}
