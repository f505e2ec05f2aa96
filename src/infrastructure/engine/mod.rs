pub mod process;

use crate::common::error::JobResult;
use futures_util::future::BoxFuture;
use futures_util::stream::BoxStream;
use std::path::{Path, PathBuf};

pub use process::ProcessEngine;

/// A running engine invocation.
///
/// Both streams yield lines as the process produces them. `exit` resolves to
/// the process exit code once the process has terminated.
pub struct EngineRun {
    pub stdout: BoxStream<'static, String>,
    pub stderr: BoxStream<'static, String>,
    pub exit: BoxFuture<'static, JobResult<i32>>,
}

/// The external transcoding engine: invoked with a single source path, writes
/// renditions into `<source dir>/<stem>/` and exits 0 on success.
pub trait TranscodeEngine: Send + Sync {
    /// Resolves the executable before anything is spawned.
    fn locate(&self) -> JobResult<PathBuf>;

    fn launch(&self, program: &Path, source: &Path) -> JobResult<EngineRun>;
}
