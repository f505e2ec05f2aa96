use super::Prober;
use crate::common::error::{JobError, JobResult};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct FfprobeProber {
    program: String,
}

impl FfprobeProber {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

/// Parses the first line of `stream=height` output. Zero is rejected.
pub fn parse_height_output(output: &str) -> JobResult<u32> {
    let line = output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| JobError::Probe("probe returned no height".to_string()))?;

    match line.parse::<u32>() {
        Ok(0) => Err(JobError::Probe("probe reported a height of 0".to_string())),
        Ok(height) => Ok(height),
        Err(_) => Err(JobError::Probe(format!("unparseable height {:?}", line))),
    }
}

#[async_trait]
impl Prober for FfprobeProber {
    async fn probe_height(&self, path: &Path) -> JobResult<u32> {
        let output = Command::new(&self.program)
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=height",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .output()
            .await
            .map_err(|e| JobError::Probe(format!("failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            return Err(JobError::Probe(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!("{} output for {}: {:?}", self.program, path.display(), stdout);
        parse_height_output(&stdout)
    }
}
