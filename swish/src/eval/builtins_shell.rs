use super::ExecContext;
use crate::builtins::{self, Builtin, BuiltinSpec};
use crate::error::{ShellError, ShellResult};
use crate::shell::Shell;
use std::path::PathBuf;

impl Shell {
    pub(crate) fn execute_builtin(
        &mut self,
        spec: &BuiltinSpec,
        args: &[String],
        ctx: &mut ExecContext,
    ) -> ShellResult<i32> {
        if builtins::wants_help(args) {
            ctx.stdout.write(builtins::format_help(spec).as_bytes())?;
            return Ok(0);
        }

        match spec.builtin {
            Builtin::Pwd => self.cmd_pwd(ctx),
            Builtin::Cd => self.cmd_cd(args),
            Builtin::Exit => Err(ShellError::Exit(0)),
            Builtin::Jobs => self.cmd_jobs(ctx),
            Builtin::Fg => {
                let index = self.parse_job_index(spec, args)?;
                self.resume_job(index, true)
            }
            Builtin::Bg => {
                let index = self.parse_job_index(spec, args)?;
                self.resume_job(index, false)
            }
            Builtin::WaitFor => {
                let index = self.parse_job_index(spec, args)?;
                self.await_background_job(index)
            }
            Builtin::WaitAll => self.await_all_background_jobs(),
            Builtin::Help => self.cmd_help(args, ctx),
        }
    }

    /// First argument as a job index. Negative numbers are well-formed but
    /// can never name a job.
    fn parse_job_index(&self, spec: &BuiltinSpec, args: &[String]) -> ShellResult<usize> {
        let raw = args.first().ok_or_else(|| {
            ShellError::InvalidArgument(format!(
                "{}: missing job index (usage: {})",
                spec.name, spec.usage
            ))
        })?;
        let index: i64 = raw.parse().map_err(|_| {
            ShellError::InvalidArgument(format!("{}: invalid job index '{}'", spec.name, raw))
        })?;
        usize::try_from(index).map_err(|_| ShellError::IndexOutOfRange {
            index,
            len: self.jobs.len(),
        })
    }

    fn cmd_pwd(&self, ctx: &mut ExecContext) -> ShellResult<i32> {
        let cwd = std::env::current_dir()?;
        ctx.stdout.writeln(&cwd.display().to_string())?;
        Ok(0)
    }

    fn cmd_cd(&self, args: &[String]) -> ShellResult<i32> {
        let target = match args.first() {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir()
                .ok_or_else(|| ShellError::InvalidArgument("cd: HOME not set".to_string()))?,
        };
        std::env::set_current_dir(&target).map_err(|e| {
            ShellError::InvalidArgument(format!("cd: {}: {}", target.display(), e))
        })?;
        tracing::debug!(dir = %target.display(), "changed directory");
        Ok(0)
    }

    fn cmd_jobs(&self, ctx: &mut ExecContext) -> ShellResult<i32> {
        for (index, name, status) in self.jobs.list() {
            ctx.stdout.writeln(&format!("{index}: {name} ({status})"))?;
        }
        Ok(0)
    }

    fn cmd_help(&self, args: &[String], ctx: &mut ExecContext) -> ShellResult<i32> {
        if let Some(name) = args.first() {
            let spec = builtins::lookup(name)
                .ok_or_else(|| ShellError::InvalidArgument(format!("help: no help for '{name}'")))?;
            ctx.stdout.write(builtins::format_help(spec).as_bytes())?;
        } else {
            ctx.stdout.write(builtins::format_help_list().as_bytes())?;
        }
        Ok(0)
    }
}
