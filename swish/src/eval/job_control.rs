//! Foreground/background orchestration
//!
//! The shell blocks in exactly three places: the wait after a foreground
//! launch, the wait inside `fg`, and the waits of `wait-for`/`wait-all`.
//! Every foreground wait runs inside a [`ForegroundGuard`], so the shell owns
//! the terminal again afterwards whatever happened.

use crate::command::Command;
use crate::error::{ShellError, ShellResult};
use crate::jobs::JobStatus;
use crate::launcher;
use crate::process::{self, WaitOutcome};
use crate::shell::Shell;
use crate::terminal::ForegroundGuard;
use nix::unistd::Pid;

impl Shell {
    /// Start an external command, in the background if it ended with `&`.
    pub fn launch(&mut self, command: &Command) -> ShellResult<i32> {
        let pid = launcher::spawn(command)?;

        if command.background {
            self.jobs.add(pid, command.name(), JobStatus::Background);
            return Ok(0);
        }

        self.run_in_foreground(pid, command.name())
    }

    fn run_in_foreground(&mut self, pid: Pid, name: &str) -> ShellResult<i32> {
        let guard = match ForegroundGuard::acquire(self.terminal.as_ref(), pid) {
            Ok(guard) => guard,
            Err(err) => {
                // The child is running in its own group regardless; keep it
                // reachable instead of leaking it.
                self.jobs.add(pid, name, JobStatus::Background);
                return Err(err);
            }
        };

        let outcome = process::wait_for_change(pid);
        let reclaimed = guard.release();
        let outcome = outcome?;

        if outcome.is_stopped() {
            let index = self.jobs.add(pid, name, JobStatus::Stopped);
            eprintln!("\n{}: {} ({})", index, name, JobStatus::Stopped);
        }
        reclaimed?;
        Ok(outcome.code())
    }

    /// Continue the job at `index`, either owning the terminal and waiting
    /// for it, or detached.
    pub fn resume_job(&mut self, index: usize, to_foreground: bool) -> ShellResult<i32> {
        let pid = self.jobs.get(index)?.pid;

        if !to_foreground {
            process::continue_group(pid)?;
            self.jobs.get_mut(index)?.status = JobStatus::Background;
            return Ok(0);
        }

        let guard = ForegroundGuard::acquire(self.terminal.as_ref(), pid)?;
        let outcome = process::continue_group(pid).and_then(|()| process::wait_for_change(pid));
        let reclaimed = guard.release();
        let outcome = outcome?;

        self.settle(index, outcome)?;
        reclaimed?;
        Ok(outcome.code())
    }

    /// Wait for one background job to exit or stop.
    pub fn await_background_job(&mut self, index: usize) -> ShellResult<i32> {
        let job = self.jobs.get(index)?;
        if job.status == JobStatus::Stopped {
            return Err(ShellError::WrongStatus {
                index,
                expected: JobStatus::Background,
                actual: job.status,
            });
        }

        let outcome = process::wait_for_change(job.pid)?;
        self.settle(index, outcome)?;
        Ok(outcome.code())
    }

    /// Wait for every background job to exit or stop.
    ///
    /// Two phases, because removing by position mid-scan would shift the
    /// entries not yet visited: first wait on each background job in order,
    /// flipping the ones that stopped to `Stopped`; then drop every entry still
    /// marked `Background`, which are exactly the ones that terminated.
    pub fn await_all_background_jobs(&mut self) -> ShellResult<i32> {
        for index in 0..self.jobs.len() {
            let job = self.jobs.get(index)?;
            if job.status != JobStatus::Background {
                continue;
            }
            if process::wait_for_change(job.pid)?.is_stopped() {
                self.jobs.get_mut(index)?.status = JobStatus::Stopped;
            }
        }

        let finished = self.jobs.remove_by_status(JobStatus::Background);
        tracing::debug!(finished, remaining = self.jobs.len(), "wait-all done");
        Ok(0)
    }

    /// Record what a wait observed for the job at `index`.
    fn settle(&mut self, index: usize, outcome: WaitOutcome) -> ShellResult<()> {
        if outcome.is_terminated() {
            self.jobs.remove(index)?;
        } else {
            self.jobs.get_mut(index)?.status = JobStatus::Stopped;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ShellError;
    use crate::eval::ExecContext;
    use crate::jobs::JobStatus;
    use crate::process::wait_for_change;
    use crate::shell::Shell;
    use crate::terminal::testing::{Event, RecordingTerminal};
    use nix::sys::signal::{killpg, Signal};
    use std::path::PathBuf;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    fn shell() -> (Shell, RecordingTerminal) {
        let term = RecordingTerminal::default();
        (Shell::with_terminal(Box::new(term.clone())), term)
    }

    fn jobs_output(shell: &mut Shell) -> String {
        let mut ctx = ExecContext::captured();
        shell.execute_with("jobs", &mut ctx).unwrap();
        ctx.output()
    }

    /// A script that stops itself, then exits 0 once continued.
    fn stopper() -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stopper.sh");
        std::fs::write(&path, "kill -STOP $$\nexit 0\n").unwrap();
        (dir, path)
    }

    /// Kill and reap whatever is left in the table.
    fn cleanup(shell: &mut Shell) {
        for (index, _, _) in shell.jobs.list().collect::<Vec<_>>() {
            let pid = shell.jobs.get(index).unwrap().pid;
            let _ = killpg(pid, Signal::SIGKILL);
            let _ = wait_for_change(pid);
        }
    }

    #[test]
    fn background_launch_returns_immediately() {
        let (mut sh, term) = shell();
        let start = Instant::now();
        assert_eq!(sh.execute("sleep 1 &").unwrap(), 0);
        assert!(start.elapsed() < Duration::from_millis(800));
        assert_eq!(jobs_output(&mut sh), "0: sleep (background)\n");
        assert!(term.events().is_empty());

        sh.execute("wait-for 0").unwrap();
        assert!(start.elapsed() >= Duration::from_millis(900));
        assert!(sh.jobs.is_empty());
    }

    #[test]
    fn foreground_exit_records_nothing_and_reclaims() {
        let (mut sh, term) = shell();
        assert_eq!(sh.execute("sh -c exit").unwrap(), 0);
        assert!(sh.jobs.is_empty());

        let events = term.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Event::GiveTo(_)));
        assert_eq!(events[1], Event::Reclaim);
    }

    #[test]
    fn foreground_exit_code_is_reported() {
        let (mut sh, _) = shell();
        assert_eq!(sh.execute("false").unwrap(), 1);
        assert_eq!(sh.last_exit_code, 1);
    }

    #[test]
    fn foreground_stop_is_recorded_and_terminal_reclaimed() {
        let (_dir, script) = stopper();
        let (mut sh, term) = shell();

        sh.execute(&format!("sh {}", script.display())).unwrap();
        assert_eq!(jobs_output(&mut sh), "0: sh (stopped)\n");

        let job = sh.jobs.get(0).unwrap().clone();
        assert_eq!(term.events(), vec![Event::GiveTo(job.pid), Event::Reclaim]);

        // Continued in the foreground, the script runs to completion.
        assert_eq!(sh.execute("fg 0").unwrap(), 0);
        assert!(sh.jobs.is_empty());
        assert_eq!(
            term.events(),
            vec![
                Event::GiveTo(job.pid),
                Event::Reclaim,
                Event::GiveTo(job.pid),
                Event::Reclaim,
            ]
        );
    }

    #[test]
    fn bg_continues_without_touching_terminal() {
        let (_dir, script) = stopper();
        let (mut sh, term) = shell();

        sh.execute(&format!("sh {}", script.display())).unwrap();
        let before = term.events().len();

        sh.execute("bg 0").unwrap();
        assert_eq!(sh.jobs.get(0).unwrap().status, JobStatus::Background);
        assert_eq!(term.events().len(), before);

        sh.execute("wait-for 0").unwrap();
        assert!(sh.jobs.is_empty());
    }

    #[test]
    fn wait_for_stopped_job_is_wrong_status() {
        let (_dir, script) = stopper();
        let (mut sh, _) = shell();

        sh.execute(&format!("sh {}", script.display())).unwrap();
        let err = sh.execute("wait-for 0").unwrap_err();
        assert!(matches!(
            err,
            ShellError::WrongStatus {
                index: 0,
                expected: JobStatus::Background,
                actual: JobStatus::Stopped,
            }
        ));
        assert_eq!(jobs_output(&mut sh), "0: sh (stopped)\n");
        cleanup(&mut sh);
    }

    #[test]
    fn wait_for_marks_a_job_that_stops() {
        let (_dir, script) = stopper();
        let (mut sh, _) = shell();

        sh.execute(&format!("sh {} &", script.display())).unwrap();
        sh.execute("wait-for 0").unwrap();
        assert_eq!(sh.jobs.get(0).unwrap().status, JobStatus::Stopped);
        cleanup(&mut sh);
    }

    #[test]
    fn wait_all_keeps_stopped_and_drops_finished() {
        let (_dir, script) = stopper();
        let (mut sh, _) = shell();

        sh.execute("sleep 0 &").unwrap();
        sh.execute(&format!("sh {} &", script.display())).unwrap();
        sh.execute("true &").unwrap();
        assert_eq!(sh.jobs.len(), 3);

        sh.execute("wait-all").unwrap();
        assert_eq!(jobs_output(&mut sh), "0: sh (stopped)\n");
        cleanup(&mut sh);
    }

    #[test]
    fn wait_all_skips_stopped_entries() {
        let (_dir, script) = stopper();
        let (mut sh, _) = shell();

        sh.execute(&format!("sh {}", script.display())).unwrap();
        sh.execute("true &").unwrap();

        // Would block forever if it waited on the already-stopped job.
        sh.execute("wait-all").unwrap();
        assert_eq!(jobs_output(&mut sh), "0: sh (stopped)\n");
        cleanup(&mut sh);
    }

    #[test]
    fn out_of_range_leaves_table_unchanged() {
        let (_dir, script) = stopper();
        let (mut sh, term) = shell();

        sh.execute(&format!("sh {}", script.display())).unwrap();
        let events = term.events();

        for line in ["fg 1", "bg 5", "wait-for 1"] {
            let err = sh.execute(line).unwrap_err();
            assert!(
                matches!(err, ShellError::IndexOutOfRange { len: 1, .. }),
                "{line}: {err}"
            );
        }
        assert_eq!(jobs_output(&mut sh), "0: sh (stopped)\n");
        assert_eq!(term.events(), events);
        cleanup(&mut sh);
    }

    #[test]
    fn failed_handoff_keeps_child_as_background_job() {
        let (mut sh, term) = shell();
        term.fail_give.set(true);

        let err = sh.execute("sleep 0").unwrap_err();
        assert!(matches!(err, ShellError::TerminalControl { .. }));
        assert_eq!(term.events().last(), Some(&Event::Reclaim));
        assert_eq!(jobs_output(&mut sh), "0: sleep (background)\n");

        sh.execute("wait-for 0").unwrap();
        assert!(sh.jobs.is_empty());
    }

    #[test]
    fn failed_fg_handoff_reclaims_and_keeps_job() {
        let (_dir, script) = stopper();
        let (mut sh, term) = shell();

        sh.execute(&format!("sh {}", script.display())).unwrap();
        term.fail_give.set(true);

        let err = sh.execute("fg 0").unwrap_err();
        assert!(matches!(err, ShellError::TerminalControl { .. }));
        assert_eq!(term.events().last(), Some(&Event::Reclaim));
        assert_eq!(sh.jobs.get(0).unwrap().status, JobStatus::Stopped);
        cleanup(&mut sh);
    }

    #[test]
    fn failed_continue_in_fg_still_reclaims() {
        let (mut sh, term) = shell();

        // A group that no longer exists: the continue signal fails with ESRCH.
        let child = std::process::Command::new("true").spawn().unwrap();
        let pid = nix::unistd::Pid::from_raw(child.id() as i32);
        wait_for_change(pid).unwrap();
        sh.jobs.add(pid, "true", JobStatus::Stopped);

        let err = sh.execute("fg 0").unwrap_err();
        assert!(matches!(err, ShellError::Signal { .. }));
        assert_eq!(term.events(), vec![Event::GiveTo(pid), Event::Reclaim]);
        assert_eq!(sh.jobs.get(0).unwrap().status, JobStatus::Stopped);
    }

    #[test]
    fn redirection_through_the_shell() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let (mut sh, _) = shell();

        sh.execute(&format!("echo hi > {}", out.display())).unwrap();
        sh.execute(&format!("echo bye >> {}", out.display())).unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "hi\nbye\n");
    }

    #[test]
    fn spawn_failure_records_nothing() {
        let (mut sh, term) = shell();
        let err = sh.execute("swish-no-such-program-xyz &").unwrap_err();
        assert!(matches!(err, ShellError::Spawn { .. }));
        assert!(sh.jobs.is_empty());
        assert!(term.events().is_empty());
    }
}
