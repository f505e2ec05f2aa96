use crate::common::error::{JobError, JobResult};
use axum::extract::multipart::Field;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{error, info};

const WRITE_BUFFER_SIZE: usize = 1024 * 1024;

/// A source file that landed on disk.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub path: PathBuf,
    pub file_name: String,
    pub size: u64,
}

pub struct DiskUploader {
    path: PathBuf,
    writer: BufWriter<File>,
    written: u64,
}

impl DiskUploader {
    pub async fn new(path: PathBuf) -> JobResult<Self> {
        let file = File::create(&path).await?;

        Ok(Self {
            path,
            writer: BufWriter::with_capacity(WRITE_BUFFER_SIZE, file),
            written: 0,
        })
    }

    pub async fn write_chunk(&mut self, chunk: &[u8]) -> JobResult<()> {
        self.writer.write_all(chunk).await?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    pub async fn finish(mut self) -> JobResult<u64> {
        self.writer.flush().await?;
        Ok(self.written)
    }

    pub async fn abort(self) -> JobResult<()> {
        drop(self.writer);
        tokio::fs::remove_file(&self.path).await?;
        Ok(())
    }
}

/// Strips any directory components a client may have sent along with the name.
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let name = raw.rsplit(['/', '\\']).next()?.trim();
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}

pub fn has_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .is_some_and(|ext| !ext.is_empty())
}

pub async fn stream_to_disk(mut field: Field<'_>, dir: &Path) -> JobResult<StoredUpload> {
    let content_type = field.content_type().unwrap_or("application/octet-stream").to_string();

    if !content_type.starts_with("video/") {
        return Err(JobError::InvalidUpload(format!(
            "unsupported content type {}: only video/* allowed",
            content_type
        )));
    }

    let file_name = field
        .file_name()
        .and_then(sanitize_file_name)
        .ok_or_else(|| JobError::InvalidUpload("missing file name".to_string()))?;

    // Renditions land in a sibling folder named after the stem, which would
    // collide with an extensionless source.
    if !has_extension(&file_name) {
        return Err(JobError::InvalidUpload(format!(
            "file name {} has no extension",
            file_name
        )));
    }

    let path = dir.join(&file_name);
    let mut uploader = DiskUploader::new(path.clone()).await?;

    loop {
        let chunk = match field.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(e) => {
                error!("Upload stream error: {}", e);
                uploader.abort().await?;
                return Err(JobError::InvalidUpload("upload stream interrupted".to_string()));
            }
        };

        if let Err(e) = uploader.write_chunk(&chunk).await {
            error!("Failed writing upload to {}: {}", path.display(), e);
            uploader.abort().await?;
            return Err(e);
        }
    }

    let size = uploader.finish().await?;
    if size == 0 {
        tokio::fs::remove_file(&path).await?;
        return Err(JobError::InvalidUpload("empty payload".to_string()));
    }

    info!("Stored upload {} ({} bytes)", path.display(), size);

    Ok(StoredUpload {
        path,
        file_name,
        size,
    })
}
