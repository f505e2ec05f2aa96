use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

use crate::common::response::ApiError;

pub type JobResult<T> = Result<T, JobError>;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("Job {0} not found")]
    NotFound(Uuid),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Engine unavailable: {0}")]
    Configuration(String),

    #[error("Engine failed to launch: {0}")]
    EngineLaunch(String),

    #[error("Engine exited with code {code}: {stderr}")]
    EngineExecution { code: i32, stderr: String },

    #[error("Resolution probe failed: {0}")]
    Probe(String),

    #[error("Artifact missing: {0}")]
    ArtifactMissing(String),

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl JobError {
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn artifact_missing(msg: impl Into<String>) -> Self {
        Self::ArtifactMissing(msg.into())
    }

    /// Stable machine-readable name, recorded on failed jobs.
    pub fn kind(&self) -> &'static str {
        match self {
            JobError::NotFound(_) => "not_found",
            JobError::Conflict(_) => "conflict",
            JobError::Configuration(_) => "configuration_error",
            JobError::EngineLaunch(_) => "engine_launch_failure",
            JobError::EngineExecution { .. } => "engine_execution_failure",
            JobError::Probe(_) => "probe_failure",
            JobError::ArtifactMissing(_) => "artifact_missing",
            JobError::InvalidUpload(_) => "invalid_upload",
            JobError::Io(_) => "io_error",
        }
    }

    /// Text stored in a failed job's `error` field.
    pub fn diagnostic(&self) -> String {
        match self {
            JobError::EngineExecution { code, stderr } => {
                let stderr = stderr.trim();
                if stderr.is_empty() {
                    format!("Engine exited with code {} and no diagnostic output", code)
                } else {
                    stderr.to_string()
                }
            }
            other => other.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            JobError::NotFound(_) | JobError::ArtifactMissing(_) => StatusCode::NOT_FOUND,
            JobError::Conflict(_) => StatusCode::CONFLICT,
            JobError::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JobError> for ApiError {
    fn from(err: JobError) -> Self {
        ApiError {
            status: err.status_code(),
            message: err.to_string(),
            kind: Some(err.kind()),
        }
    }
}
