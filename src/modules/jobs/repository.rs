use super::model::{Job, NewJob, Rendition};
use crate::common::error::{JobError, JobResult};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use uuid::Uuid;

/// Shared store of job records.
///
/// Every mutation is an atomic read-modify-write of a single record, so the
/// registry is safe to share between request handlers and supervisors running
/// on any number of threads.
pub trait JobRegistry: Send + Sync {
    fn create(&self, meta: NewJob) -> JobResult<Job>;

    fn get(&self, id: Uuid) -> JobResult<Job>;

    /// Snapshot of every record in insertion order.
    fn list(&self) -> Vec<Job>;

    /// Check-and-set `uploaded -> processing`; exactly one concurrent caller wins.
    fn transition_to_processing(&self, id: Uuid) -> JobResult<Job>;

    fn record_progress(&self, id: Uuid, progress: u8, message: &str) -> JobResult<Job>;

    fn complete(&self, id: Uuid, output_folder: PathBuf, renditions: Vec<Rendition>) -> JobResult<Job>;

    fn fail(&self, id: Uuid, error: &JobError) -> JobResult<Job>;

    /// Removes the record. Artifacts on disk are the caller's concern.
    fn delete(&self, id: Uuid) -> JobResult<Job>;
}

#[derive(Default)]
struct Inner {
    jobs: HashMap<Uuid, Job>,
    order: Vec<Uuid>,
    // ids ever handed out, including deleted ones
    issued: HashSet<Uuid>,
}

#[derive(Default)]
pub struct InMemoryJobRegistry {
    inner: RwLock<Inner>,
}

impl InMemoryJobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn mutate<F>(&self, id: Uuid, f: F) -> JobResult<Job>
    where
        F: FnOnce(&mut Job) -> JobResult<()>,
    {
        let mut inner = self.inner.write();
        let job = inner.jobs.get_mut(&id).ok_or(JobError::NotFound(id))?;
        f(job)?;
        Ok(job.clone())
    }
}

impl JobRegistry for InMemoryJobRegistry {
    fn create(&self, meta: NewJob) -> JobResult<Job> {
        let mut inner = self.inner.write();
        if !inner.issued.insert(meta.id) {
            return Err(JobError::conflict(format!("job id {} already issued", meta.id)));
        }

        let job = Job::new(meta);
        inner.order.push(job.id);
        inner.jobs.insert(job.id, job.clone());
        Ok(job)
    }

    fn get(&self, id: Uuid) -> JobResult<Job> {
        self.inner
            .read()
            .jobs
            .get(&id)
            .cloned()
            .ok_or(JobError::NotFound(id))
    }

    fn list(&self) -> Vec<Job> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .filter_map(|id| inner.jobs.get(id).cloned())
            .collect()
    }

    fn transition_to_processing(&self, id: Uuid) -> JobResult<Job> {
        self.mutate(id, Job::start)
    }

    fn record_progress(&self, id: Uuid, progress: u8, message: &str) -> JobResult<Job> {
        self.mutate(id, |job| job.update_progress(progress, message))
    }

    fn complete(&self, id: Uuid, output_folder: PathBuf, renditions: Vec<Rendition>) -> JobResult<Job> {
        self.mutate(id, |job| job.complete(output_folder, renditions))
    }

    fn fail(&self, id: Uuid, error: &JobError) -> JobResult<Job> {
        self.mutate(id, |job| job.fail(error))
    }

    fn delete(&self, id: Uuid) -> JobResult<Job> {
        let mut inner = self.inner.write();
        let job = inner.jobs.remove(&id).ok_or(JobError::NotFound(id))?;
        inner.order.retain(|existing| *existing != id);
        Ok(job)
    }
}
