//! Job table
//!
//! Jobs are addressed by their current position in the table. Positions are
//! not stable identities: removing entry `i` shifts every later entry down by
//! one, so `fg 2` always means "the third job listed right now".

use crate::error::{ShellError, ShellResult};
use nix::unistd::Pid;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobStatus {
    /// Running detached from the terminal
    Background,
    /// Suspended; resumable with `fg` or `bg`
    Stopped,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tracked child process. Its pid is also its process-group id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Job {
    pub pid: Pid,
    name: String,
    pub status: JobStatus,
}

impl Job {
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Default)]
pub struct JobTable {
    jobs: Vec<Job>,
}

impl JobTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a job and return its index.
    pub fn add(&mut self, pid: Pid, name: impl Into<String>, status: JobStatus) -> usize {
        let name = name.into();
        tracing::debug!(%pid, %name, %status, index = self.jobs.len(), "job added");
        self.jobs.push(Job { pid, name, status });
        self.jobs.len() - 1
    }

    pub fn get(&self, index: usize) -> ShellResult<&Job> {
        let len = self.jobs.len();
        self.jobs.get(index).ok_or_else(|| out_of_range(index, len))
    }

    pub fn get_mut(&mut self, index: usize) -> ShellResult<&mut Job> {
        let len = self.jobs.len();
        self.jobs.get_mut(index).ok_or_else(|| out_of_range(index, len))
    }

    /// Remove the job at `index`, shifting later jobs left.
    pub fn remove(&mut self, index: usize) -> ShellResult<Job> {
        if index >= self.jobs.len() {
            return Err(out_of_range(index, self.jobs.len()));
        }
        let job = self.jobs.remove(index);
        tracing::debug!(pid = %job.pid, name = %job.name, index, "job removed");
        Ok(job)
    }

    /// Remove every job whose status is `status`, keeping the order of the rest.
    ///
    /// Only meant for the second phase of a scan that already set statuses;
    /// it does not look at the processes themselves.
    pub fn remove_by_status(&mut self, status: JobStatus) -> usize {
        let before = self.jobs.len();
        self.jobs.retain(|job| job.status != status);
        before - self.jobs.len()
    }

    /// `(index, name, status)` for every job, in table order.
    pub fn list(&self) -> impl Iterator<Item = (usize, &str, JobStatus)> + Clone + '_ {
        self.jobs
            .iter()
            .enumerate()
            .map(|(index, job)| (index, job.name(), job.status))
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

fn out_of_range(index: usize, len: usize) -> ShellError {
    ShellError::IndexOutOfRange {
        index: i64::try_from(index).unwrap_or(i64::MAX),
        len,
    }
}
