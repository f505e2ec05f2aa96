pub mod ffprobe;

use crate::common::error::JobResult;
use async_trait::async_trait;
use std::path::Path;

pub use ffprobe::FfprobeProber;

/// Reports a media file's vertical resolution in pixels.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe_height(&self, path: &Path) -> JobResult<u32>;
}
