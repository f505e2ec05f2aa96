use super::model::{Job, JobStatus, Rendition};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub job_id: Uuid,
    pub filename: String,
    pub filesize: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub id: Uuid,
    pub status: JobStatus,
    pub filename: String,
    pub filesize: u64,
    pub progress: u8,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub uploaded_at: OffsetDateTime,
}

impl From<Job> for JobSummary {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            status: job.status,
            filename: job.source_name,
            filesize: job.source_size,
            progress: job.progress,
            message: job.message,
            uploaded_at: job.uploaded_at,
        }
    }
}

/// Full job snapshot.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub id: Uuid,
    pub status: JobStatus,
    pub filename: String,
    pub filesize: u64,
    pub progress: u8,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub uploaded_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub started_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub completed_at: Option<OffsetDateTime>,
    /// Name of the rendition folder, relative to the job's working directory.
    pub output_folder: Option<String>,
    pub renditions: Vec<Rendition>,
    pub error: Option<String>,
    pub error_kind: Option<String>,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        let output_folder = job
            .output_folder
            .as_ref()
            .and_then(|dir| dir.file_name())
            .map(|name| name.to_string_lossy().into_owned());

        Self {
            id: job.id,
            status: job.status,
            filename: job.source_name,
            filesize: job.source_size,
            progress: job.progress,
            message: job.message,
            uploaded_at: job.uploaded_at,
            started_at: job.started_at,
            completed_at: job.completed_at,
            output_folder,
            renditions: job.renditions,
            error: job.error,
            error_kind: job.error_kind,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DownloadQuery {
    /// Quality label such as `720p`; defaults to the best available rendition.
    pub quality: Option<String>,
}
