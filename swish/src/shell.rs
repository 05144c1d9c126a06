//! Shell state

use crate::eval::ExecContext;
use crate::error::ShellResult;
use crate::jobs::JobTable;
use crate::terminal::{self, TerminalControl};

/// Everything one shell session owns: its jobs and its hold on the terminal.
///
/// The shell is single-threaded; the job table and the terminal are only
/// touched from the thread running [`Shell::execute`].
pub struct Shell {
    pub jobs: JobTable,
    pub(crate) terminal: Box<dyn TerminalControl>,
    pub last_exit_code: i32,
}

impl Shell {
    /// Shell attached to the current process's standard input.
    pub fn new() -> Self {
        Self::with_terminal(terminal::for_stdin())
    }

    pub fn with_terminal(terminal: Box<dyn TerminalControl>) -> Self {
        Self {
            jobs: JobTable::new(),
            terminal,
            last_exit_code: 0,
        }
    }

    /// Execute one input line, writing built-in output to stdout.
    pub fn execute(&mut self, input: &str) -> ShellResult<i32> {
        let mut ctx = ExecContext::default();
        self.execute_with(input, &mut ctx)
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}
