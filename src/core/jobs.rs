// src/core/jobs.rs

use crate::core::errors::ShellError;
use crate::models::{JobId, JobRecord};
use crate::system::executor::{self, ChildState};
use nix::sys::signal::Signal;
use nix::unistd::Pid;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::time::SystemTime;

// --- Job ID Allocator ---

/// Hands out job ids as `max(used) + 1`, bounded by `limit`.
///
/// Gaps below the highest live id are never refilled, so a fresh id is always
/// greater than every id still in use.
#[derive(Debug, Clone)]
pub struct JobIdAllocator {
    in_use: BTreeSet<JobId>,
    limit: usize,
}

impl JobIdAllocator {
    pub fn new(limit: usize) -> Self {
        Self {
            in_use: BTreeSet::new(),
            limit,
        }
    }

    pub fn next_free(&self) -> Result<JobId, ShellError> {
        let next = self.in_use.last().map_or(1, |highest| highest + 1);
        if next > self.limit {
            return Err(ShellError::JobLimit(self.limit));
        }
        Ok(next)
    }

    pub fn reserve(&mut self) -> Result<JobId, ShellError> {
        let id = self.next_free()?;
        self.in_use.insert(id);
        Ok(id)
    }

    pub fn mark_used(&mut self, id: JobId) {
        self.in_use.insert(id);
    }

    pub fn release(&mut self, id: JobId) {
        self.in_use.remove(&id);
    }

    pub fn is_used(&self, id: JobId) -> bool {
        self.in_use.contains(&id)
    }
}

// --- Job Table ---

/// Background and stopped jobs, keyed by job id.
///
/// The table owns the id allocator. Ids of foreground jobs stay reserved here
/// while the job sits in the foreground slot.
#[derive(Debug, Clone)]
pub struct JobTable {
    jobs: BTreeMap<JobId, JobRecord>,
    /// Stopped job ids, most recently stopped last.
    stopped_order: VecDeque<JobId>,
    ids: JobIdAllocator,
}

impl JobTable {
    pub fn new(max_jobs: usize) -> Self {
        Self {
            jobs: BTreeMap::new(),
            stopped_order: VecDeque::new(),
            ids: JobIdAllocator::new(max_jobs),
        }
    }

    /// Reserves a fresh id for a job that is about to be launched.
    pub fn reserve_id(&mut self) -> Result<JobId, ShellError> {
        self.ids.reserve()
    }

    /// Frees an id that no record in the table uses.
    pub fn release_id(&mut self, id: JobId) {
        if !self.jobs.contains_key(&id) {
            self.ids.release(id);
        }
    }

    pub fn is_id_used(&self, id: JobId) -> bool {
        self.ids.is_used(id)
    }

    /// Builds and stores a record for a single process. A missing `job_id`
    /// allocates a fresh one; a missing `display_text` shows `text`.
    pub fn add_job(
        &mut self,
        pid: Pid,
        text: &str,
        stopped: bool,
        job_id: Option<JobId>,
        display_text: Option<&str>,
    ) -> Result<JobId, ShellError> {
        let job_id = match job_id {
            Some(id) => id,
            None => self.ids.next_free()?,
        };
        let record = JobRecord::new(job_id, pid, text)
            .with_display_text(display_text.unwrap_or_default())
            .with_stopped(stopped);
        self.insert(record);
        Ok(job_id)
    }

    /// Stores `record` under its own id, replacing any record with that id.
    pub fn insert(&mut self, record: JobRecord) {
        let id = record.job_id;
        log::debug!("Job table: inserting [{}] pid {} ({})", id, record.pid, record.display_text);
        self.ids.mark_used(id);
        self.stopped_order.retain(|&stopped| stopped != id);
        if record.stopped {
            self.stopped_order.push_back(id);
        }
        self.jobs.insert(id, record);
    }

    /// Non-blocking sweep: drops jobs whose processes have all exited and
    /// records stops and continues observed along the way.
    pub fn remove_finished(&mut self) {
        let mut finished = Vec::new();
        let mut stopped = Vec::new();
        let mut continued = Vec::new();

        for (id, record) in self.jobs.iter_mut() {
            let mut alive = false;
            let mut remaining_followers = Vec::with_capacity(record.followers.len());
            for pid in record.pids().collect::<Vec<_>>() {
                let state = match executor::poll(pid) {
                    Ok(state) => state,
                    Err(e) => {
                        log::warn!("waitpid({}) failed during sweep: {}", pid, e);
                        ChildState::Running
                    }
                };
                match state {
                    ChildState::Exited => continue,
                    ChildState::Stopped => stopped.push(*id),
                    ChildState::Continued => continued.push(*id),
                    ChildState::Running => {}
                }
                alive = true;
                if pid != record.pid {
                    remaining_followers.push(pid);
                }
            }
            record.followers = remaining_followers;
            if !alive {
                finished.push(*id);
            }
        }

        for id in continued {
            self.set_stopped(id, false);
        }
        for id in stopped {
            self.set_stopped(id, true);
        }
        for id in finished {
            log::debug!("Job table: [{}] finished", id);
            self.remove_by_id(id);
        }
    }

    fn set_stopped(&mut self, id: JobId, stopped: bool) {
        let Some(record) = self.jobs.get_mut(&id) else {
            return;
        };
        if record.stopped == stopped {
            return;
        }
        record.stopped = stopped;
        self.stopped_order.retain(|&other| other != id);
        if stopped {
            record.insertion_time = SystemTime::now();
            self.stopped_order.push_back(id);
        }
    }

    /// Removes a record without signaling it and frees its id.
    pub fn remove_by_id(&mut self, id: JobId) -> Option<JobRecord> {
        let record = self.detach(id)?;
        self.ids.release(id);
        Some(record)
    }

    /// Removes a record but keeps its id reserved, for a job moving to the
    /// foreground slot.
    pub fn detach(&mut self, id: JobId) -> Option<JobRecord> {
        self.stopped_order.retain(|&other| other != id);
        self.jobs.remove(&id)
    }

    /// SIGKILLs every tracked job without waiting, then empties the table.
    pub fn kill_all(&mut self) {
        for record in self.jobs.values() {
            let pids: Vec<Pid> = record.pids().collect();
            if let Err(e) = executor::signal_job(&pids, Signal::SIGKILL) {
                log::debug!("SIGKILL to job [{}] failed: {}", record.job_id, e);
            }
        }
        for id in self.jobs.keys() {
            self.ids.release(*id);
        }
        self.jobs.clear();
        self.stopped_order.clear();
    }

    pub fn get(&self, id: JobId) -> Option<&JobRecord> {
        self.jobs.get(&id)
    }

    /// The job with the highest id.
    pub fn last_job(&self) -> Option<&JobRecord> {
        self.jobs.values().next_back()
    }

    /// The most recently stopped job that is still stopped.
    pub fn last_stopped_job(&self) -> Option<&JobRecord> {
        self.stopped_order
            .iter()
            .rev()
            .filter_map(|id| self.jobs.get(id))
            .find(|record| record.stopped)
    }

    pub fn find_by_pid(&self, pid: Pid) -> Option<&JobRecord> {
        self.jobs.values().find(|record| record.contains_pid(pid))
    }

    /// Records in ascending job id order.
    pub fn iter(&self) -> impl Iterator<Item = &JobRecord> {
        self.jobs.values()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
