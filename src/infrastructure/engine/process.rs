use super::{EngineRun, TranscodeEngine};
use crate::common::error::{JobError, JobResult};
use futures_util::future::ready;
use futures_util::{FutureExt, StreamExt};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio_stream::wrappers::SplitStream;
use tracing::info;

/// Runs the engine as an OS child process.
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    program: String,
}

impl ProcessEngine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

fn line_stream<R>(reader: R) -> futures_util::stream::BoxStream<'static, String>
where
    R: AsyncRead + Send + Unpin + 'static,
{
    // Engine output is not guaranteed to be UTF-8.
    SplitStream::new(BufReader::new(reader).split(b'\n'))
        .filter_map(|segment| {
            ready(segment.ok().map(|bytes| {
                String::from_utf8_lossy(&bytes)
                    .trim_end_matches('\r')
                    .to_string()
            }))
        })
        .boxed()
}

impl TranscodeEngine for ProcessEngine {
    fn locate(&self) -> JobResult<PathBuf> {
        which::which(&self.program)
            .map_err(|e| JobError::Configuration(format!("{}: {}", self.program, e)))
    }

    fn launch(&self, program: &Path, source: &Path) -> JobResult<EngineRun> {
        let mut child = Command::new(program)
            .arg(source)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // only reached if the run is dropped before the exit is awaited
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                JobError::EngineLaunch(format!("failed to spawn {}: {}", program.display(), e))
            })?;

        info!(
            "🎥 Engine {} started (pid {:?}) for {}",
            program.display(),
            child.id(),
            source.display()
        );

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| JobError::EngineLaunch("engine stdout was not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| JobError::EngineLaunch("engine stderr was not captured".to_string()))?;

        let exit = async move {
            let status = child.wait().await?;
            // Killed by a signal: no code, report as a generic failure.
            Ok::<i32, JobError>(status.code().unwrap_or(-1))
        }
        .boxed();

        Ok(EngineRun {
            stdout: line_stream(stdout),
            stderr: line_stream(stderr),
            exit,
        })
    }
}
