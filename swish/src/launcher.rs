//! Redirecting launcher: turns a [`Command`] into a running child in its own
//! process group.

use crate::command::{Command, Redirect, RedirectKind};
use crate::error::{ShellError, ShellResult};
use crate::terminal::reset_terminal_signals;
use nix::unistd::Pid;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::process::CommandExt;
use std::process::{Command as ProcessCommand, Stdio};

/// Permission bits for files created by `>` and `>>`.
const OUTPUT_FILE_MODE: u32 = 0o600;

/// Start `command` and return the child's pid, which is also its process
/// group id.
///
/// Redirection targets are opened before the child is created, so a bad path
/// fails the command without starting anything. `spawn` only returns once the
/// child has exec'd the program, which means the new process group exists by
/// the time the caller hands it the terminal.
pub fn spawn(command: &Command) -> ShellResult<Pid> {
    let argv = command.argv();
    let Some((program, args)) = argv.split_first() else {
        return Err(ShellError::Spawn {
            program: String::new(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "empty command"),
        });
    };

    let mut child = ProcessCommand::new(program);
    child.args(args).process_group(0);

    if let Some(redirect) = &command.input {
        child.stdin(Stdio::from(open_redirect(redirect)?));
    }
    if let Some(redirect) = &command.output {
        child.stdout(Stdio::from(open_redirect(redirect)?));
    }

    // SAFETY: the hook only calls sigaction and pthread_sigmask.
    #[allow(unsafe_code)]
    unsafe {
        child.pre_exec(reset_terminal_signals);
    }

    // Anything the shell printed must land before the child's output.
    io::stdout().flush()?;

    let child = child.spawn().map_err(|source| ShellError::Spawn {
        program: (*program).to_string(),
        source,
    })?;
    let pid = i32::try_from(child.id()).map_err(|_| ShellError::Spawn {
        program: (*program).to_string(),
        source: io::Error::new(io::ErrorKind::Other, "pid out of range"),
    })?;
    let pid = Pid::from_raw(pid);
    tracing::debug!(%pid, program, background = command.background, "spawned child");
    Ok(pid)
}

fn open_redirect(redirect: &Redirect) -> ShellResult<File> {
    let mut options = OpenOptions::new();
    match redirect.kind {
        RedirectKind::Input => {
            options.read(true);
        }
        RedirectKind::Truncate => {
            options
                .write(true)
                .create(true)
                .truncate(true)
                .mode(OUTPUT_FILE_MODE);
        }
        RedirectKind::Append => {
            options.append(true).create(true).mode(OUTPUT_FILE_MODE);
        }
    }
    options
        .open(&redirect.path)
        .map_err(|source| ShellError::Redirection {
            path: redirect.path.clone(),
            source,
        })
}
