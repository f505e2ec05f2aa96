use super::dto::{JobResponse, JobSummary, StartResponse, SubmitResponse};
use super::model::{JobStatus, NewJob};
use crate::common::error::{JobError, JobResult};
use crate::common::upload::stream_to_disk;
use crate::state::AppState;
use axum::extract::multipart::Field;
use std::path::PathBuf;
use tracing::{info, warn};
use uuid::Uuid;

/// A rendition resolved for download.
#[derive(Debug, Clone)]
pub struct DownloadTarget {
    pub path: PathBuf,
    pub filename: String,
}

pub struct JobService;

impl JobService {
    fn job_dir(state: &AppState, id: Uuid) -> PathBuf {
        state.config.upload_dir.join(id.to_string())
    }

    pub async fn submit(state: &AppState, field: Field<'_>) -> JobResult<SubmitResponse> {
        let id = Uuid::new_v4();
        let dir = Self::job_dir(state, id);
        tokio::fs::create_dir_all(&dir).await?;

        let stored = match stream_to_disk(field, &dir).await {
            Ok(stored) => stored,
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_dir_all(&dir).await {
                    warn!("Failed to clean up {}: {}", dir.display(), cleanup);
                }
                return Err(e);
            }
        };

        let job = state.registry.create(NewJob {
            id,
            source_path: stored.path,
            source_name: stored.file_name,
            source_size: stored.size,
        })?;

        info!(job_id = %job.id, "📦 Job submitted: {} ({} bytes)", job.source_name, job.source_size);

        Ok(SubmitResponse {
            job_id: job.id,
            filename: job.source_name,
            filesize: job.source_size,
        })
    }

    /// Moves the job to `processing` and hands it to the supervisor. Returns
    /// as soon as the run is scheduled.
    pub fn start(state: &AppState, id: Uuid) -> JobResult<StartResponse> {
        let job = state.registry.transition_to_processing(id)?;
        info!(job_id = %id, "▶️ Starting transcode of {}", job.source_path.display());

        // Runs detached; the registry carries its outcome.
        drop(state.supervisor.spawn(job));

        Ok(StartResponse {
            job_id: id,
            status: JobStatus::Processing,
        })
    }

    pub fn query(state: &AppState, id: Uuid) -> JobResult<JobResponse> {
        state.registry.get(id).map(JobResponse::from)
    }

    pub fn list(state: &AppState) -> Vec<JobSummary> {
        state.registry.list().into_iter().map(JobSummary::from).collect()
    }

    pub async fn resolve_download(
        state: &AppState,
        id: Uuid,
        quality: Option<&str>,
    ) -> JobResult<DownloadTarget> {
        let job = state.registry.get(id)?;
        if job.status != JobStatus::Completed {
            return Err(JobError::conflict(format!(
                "job {} is {}, downloads require a completed job",
                id, job.status
            )));
        }

        let folder = job
            .output_folder
            .ok_or_else(|| JobError::artifact_missing("job has no output folder"))?;

        let rendition = match quality {
            Some(label) => job
                .renditions
                .iter()
                .find(|r| r.quality_label.eq_ignore_ascii_case(label))
                .ok_or_else(|| JobError::artifact_missing(format!("no {} rendition", label)))?,
            None => job
                .renditions
                .first()
                .ok_or_else(|| JobError::artifact_missing("no renditions were produced"))?,
        };

        let path = folder.join(&rendition.filename);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(JobError::artifact_missing(format!(
                "{} is no longer on disk",
                rendition.filename
            )));
        }

        Ok(DownloadTarget {
            path,
            filename: rendition.filename.clone(),
        })
    }

    /// Deletes the record, then every artifact in the job's working directory.
    /// A running engine is not stopped.
    pub async fn delete(state: &AppState, id: Uuid) -> JobResult<()> {
        let job = state.registry.delete(id)?;
        if job.status == JobStatus::Processing {
            warn!(job_id = %id, "Deleted while processing; engine keeps running");
        }

        let dir = Self::job_dir(state, id);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => info!(job_id = %id, "🗑️ Removed {}", dir.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(job_id = %id, "Failed to remove {}: {}", dir.display(), e),
        }

        Ok(())
    }
}
