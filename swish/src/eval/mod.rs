//! Evaluator: routes a line to a built-in or to the launcher

use crate::builtins;
use crate::command::Command;
use crate::error::ShellResult;
use crate::lexer;
use crate::shell::Shell;
use std::io::Write;

mod builtins_shell;
mod job_control;

pub enum Output {
    Stdout,
    Buffer(Vec<u8>),
}

impl Output {
    pub fn write(&mut self, data: &[u8]) -> std::io::Result<()> {
        match self {
            Output::Stdout => {
                let mut stdout = std::io::stdout();
                stdout.write_all(data)?;
                stdout.flush()
            }
            Output::Buffer(buf) => {
                buf.extend_from_slice(data);
                Ok(())
            }
        }
    }

    pub fn writeln(&mut self, s: &str) -> std::io::Result<()> {
        self.write(s.as_bytes())?;
        self.write(b"\n")
    }
}

pub struct ExecContext {
    pub stdout: Output,
}

impl Default for ExecContext {
    fn default() -> Self {
        Self {
            stdout: Output::Stdout,
        }
    }
}

impl ExecContext {
    /// Context that collects built-in output instead of printing it.
    pub fn captured() -> Self {
        Self {
            stdout: Output::Buffer(Vec::new()),
        }
    }

    /// Captured output so far; empty when writing to stdout.
    pub fn output(&self) -> String {
        match &self.stdout {
            Output::Buffer(buf) => String::from_utf8_lossy(buf).into_owned(),
            Output::Stdout => String::new(),
        }
    }
}

impl Shell {
    /// Execute one input line.
    ///
    /// Built-ins write to `ctx.stdout`; external programs inherit the shell's
    /// own standard streams unless redirected.
    pub fn execute_with(&mut self, input: &str, ctx: &mut ExecContext) -> ShellResult<i32> {
        let tokens = lexer::tokenize(input)?;
        let Some(first) = tokens.first() else {
            return Ok(0);
        };

        let code = if let Some(spec) = builtins::lookup(first) {
            self.execute_builtin(spec, &tokens[1..], ctx)?
        } else {
            let command = Command::parse(tokens)?;
            self.launch(&command)?
        };

        self.last_exit_code = code;
        Ok(code)
    }
}
