use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::{JobError, JobResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Uploaded,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Uploaded => "uploaded",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Rendition {
    pub filename: String,
    pub quality_label: String,
}

/// Metadata captured at submission time.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub id: Uuid,
    pub source_path: PathBuf,
    pub source_name: String,
    pub source_size: u64,
}

#[derive(Debug, Clone)]
pub struct Job {
    pub id: Uuid,
    pub status: JobStatus,
    pub progress: u8,
    pub message: String,
    pub source_path: PathBuf,
    pub source_name: String,
    pub source_size: u64,
    pub uploaded_at: OffsetDateTime,
    pub started_at: Option<OffsetDateTime>,
    pub completed_at: Option<OffsetDateTime>,
    pub output_folder: Option<PathBuf>,
    pub renditions: Vec<Rendition>,
    pub error: Option<String>,
    pub error_kind: Option<String>,
}

impl Job {
    pub fn new(meta: NewJob) -> Self {
        Self {
            id: meta.id,
            status: JobStatus::Uploaded,
            progress: 0,
            message: "uploaded".to_string(),
            source_path: meta.source_path,
            source_name: meta.source_name,
            source_size: meta.source_size,
            uploaded_at: OffsetDateTime::now_utc(),
            started_at: None,
            completed_at: None,
            output_folder: None,
            renditions: Vec::new(),
            error: None,
            error_kind: None,
        }
    }

    pub fn start(&mut self) -> JobResult<()> {
        if self.status != JobStatus::Uploaded {
            return Err(JobError::conflict(format!(
                "job {} is {}, only uploaded jobs can be started",
                self.id, self.status
            )));
        }
        self.status = JobStatus::Processing;
        self.progress = 10;
        self.message = "starting".to_string();
        self.started_at = Some(OffsetDateTime::now_utc());
        Ok(())
    }

    /// Progress never moves backwards within a run.
    pub fn update_progress(&mut self, progress: u8, message: &str) -> JobResult<()> {
        self.ensure_processing()?;
        self.progress = self.progress.max(progress.min(100));
        self.message = message.to_string();
        Ok(())
    }

    pub fn complete(&mut self, output_folder: PathBuf, renditions: Vec<Rendition>) -> JobResult<()> {
        self.ensure_processing()?;
        self.status = JobStatus::Completed;
        self.progress = 100;
        self.message = "done".to_string();
        self.completed_at = Some(OffsetDateTime::now_utc());
        self.output_folder = Some(output_folder);
        self.renditions = renditions;
        Ok(())
    }

    pub fn fail(&mut self, error: &JobError) -> JobResult<()> {
        self.ensure_processing()?;
        self.status = JobStatus::Failed;
        self.progress = 0;
        self.message = "failed".to_string();
        self.completed_at = Some(OffsetDateTime::now_utc());
        self.error = Some(error.diagnostic());
        self.error_kind = Some(error.kind().to_string());
        Ok(())
    }

    fn ensure_processing(&self) -> JobResult<()> {
        if self.status != JobStatus::Processing {
            return Err(JobError::conflict(format!(
                "job {} is {}, not processing",
                self.id, self.status
            )));
        }
        Ok(())
    }
}
