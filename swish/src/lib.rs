//! swish - Interactive shell with POSIX job control
//!
//! This crate provides:
//! - A job table addressed by position (`jobs`, `fg`, `bg`, `wait-for`, `wait-all`)
//! - A launcher that places every child in its own process group with
//!   `<`, `>` and `>>` redirection
//! - Terminal ownership handoff between the shell and its foreground job
//! - A small set of built-ins dispatched through a lookup table

pub mod builtins;
pub mod command;
pub mod error;
pub mod eval;
pub mod jobs;
pub mod launcher;
pub mod lexer;
pub mod process;
pub mod shell;
pub mod terminal;

pub use error::{ShellError, ShellResult};
pub use eval::{ExecContext, Output};
pub use jobs::{Job, JobStatus, JobTable};
pub use shell::Shell;
