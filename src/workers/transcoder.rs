use crate::common::error::JobError;
use crate::infrastructure::engine::{EngineRun, TranscodeEngine};
use crate::modules::jobs::collector;
use crate::modules::jobs::model::Job;
use crate::modules::jobs::repository::JobRegistry;
use crate::workers::progress::{advance, infer_activity};
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Upper bound on retained engine stderr; older output is dropped first.
const MAX_STDERR_BYTES: usize = 64 * 1024;

/// Directory the engine writes renditions into: `<source dir>/<source stem>/`.
pub fn output_dir_for(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "output".into());
    source
        .parent()
        .map(|parent| parent.join(&stem))
        .unwrap_or_else(|| PathBuf::from(stem))
}

async fn collect_stderr(mut lines: BoxStream<'static, String>) -> String {
    let mut buffer = String::new();
    while let Some(line) = lines.next().await {
        warn!("engine stderr: {}", line);
        buffer.push_str(&line);
        buffer.push('\n');

        if buffer.len() > MAX_STDERR_BYTES {
            let mut cut = buffer.len() - MAX_STDERR_BYTES;
            while !buffer.is_char_boundary(cut) {
                cut += 1;
            }
            buffer.drain(..cut);
        }
    }
    buffer
}

/// Drives one engine process per job and mirrors what it does into the registry.
///
/// The supervisor never raises: every failure during a run ends up as the
/// job's terminal `failed` state.
#[derive(Clone)]
pub struct TranscodeSupervisor {
    registry: Arc<dyn JobRegistry>,
    engine: Arc<dyn TranscodeEngine>,
}

impl TranscodeSupervisor {
    pub fn new(registry: Arc<dyn JobRegistry>, engine: Arc<dyn TranscodeEngine>) -> Self {
        Self { registry, engine }
    }

    /// Runs `job` in the background. The job must already be `processing`;
    /// the registry's check-and-set guarantees a single run per job.
    ///
    /// The handle resolves to the terminal record, or `None` if the record
    /// was deleted mid-run.
    pub fn spawn(&self, job: Job) -> JoinHandle<Option<Job>> {
        let supervisor = self.clone();
        tokio::spawn(async move { supervisor.run(job).await })
    }

    pub async fn run(&self, job: Job) -> Option<Job> {
        let id = job.id;

        let program = match self.engine.locate() {
            Ok(program) => program,
            Err(e) => return self.fail(id, e),
        };

        let EngineRun {
            stdout,
            stderr,
            exit,
        } = match self.engine.launch(&program, &job.source_path) {
            Ok(run) => run,
            Err(e) => return self.fail(id, e),
        };

        let stderr_task = tokio::spawn(collect_stderr(stderr));
        self.follow_progress(id, job.progress, stdout).await;

        let exit = exit.await;
        let stderr = match stderr_task.await {
            Ok(text) => text,
            Err(e) => {
                error!(job_id = %id, "stderr reader crashed: {}", e);
                String::new()
            }
        };

        match exit {
            Ok(0) => self.complete(&job).await,
            Ok(code) => self.fail(id, JobError::EngineExecution { code, stderr }),
            Err(e) => self.fail(
                id,
                JobError::EngineExecution {
                    code: -1,
                    stderr: format!("lost track of engine process: {}\n{}", e, stderr),
                },
            ),
        }
    }

    async fn follow_progress(&self, id: Uuid, initial: u8, mut stdout: BoxStream<'static, String>) {
        let mut progress = initial;
        let mut tracking = true;

        // Drain to the end even once tracking stops so the engine never
        // blocks on a full pipe.
        while let Some(line) = stdout.next().await {
            debug!(job_id = %id, "engine: {}", line);
            if !tracking {
                continue;
            }
            let Some(activity) = infer_activity(&line) else {
                continue;
            };

            progress = advance(progress, &activity);
            if let Err(e) = self.registry.record_progress(id, progress, &activity.message()) {
                warn!(job_id = %id, "Stopped tracking progress: {}", e);
                tracking = false;
            }
        }
    }

    async fn complete(&self, job: &Job) -> Option<Job> {
        let dir = output_dir_for(&job.source_path);
        let renditions = collector::collect(&dir).await;
        if renditions.is_empty() {
            warn!(
                job_id = %job.id,
                "Engine succeeded but produced no renditions in {}",
                dir.display()
            );
        }

        match self.registry.complete(job.id, dir, renditions) {
            Ok(done) => {
                info!(
                    job_id = %done.id,
                    "✅ Job completed with {} rendition(s)",
                    done.renditions.len()
                );
                Some(done)
            }
            Err(e) => {
                warn!(job_id = %job.id, "Could not record completion: {}", e);
                None
            }
        }
    }

    fn fail(&self, id: Uuid, err: JobError) -> Option<Job> {
        error!(job_id = %id, kind = err.kind(), "❌ Job failed: {}", err);
        match self.registry.fail(id, &err) {
            Ok(job) => Some(job),
            Err(e) => {
                warn!(job_id = %id, "Could not record failure: {}", e);
                None
            }
        }
    }
}
