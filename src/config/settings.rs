use crate::config::env::{self, EnvKey};
use std::path::PathBuf;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 4 * 1024 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    /// Root under which every job gets its own working directory.
    pub upload_dir: PathBuf,
    /// Engine executable, either a bare name looked up on PATH or a path.
    pub engine_bin: String,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            server_host: env::get_or(EnvKey::ServerHost, "0.0.0.0"),
            server_port: env::get_parsed(EnvKey::ServerPort, 3000),
            upload_dir: PathBuf::from(env::get_or(EnvKey::UploadDir, "uploads")),
            engine_bin: env::get_or(EnvKey::EngineBin, "ladder-engine"),
            max_upload_bytes: env::get_parsed(EnvKey::MaxUploadBytes, DEFAULT_MAX_UPLOAD_BYTES),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Tool locations for the engine binary.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub ffmpeg_bin: String,
    pub ffprobe_bin: String,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            ffmpeg_bin: env::get_or(EnvKey::FfmpegBin, "ffmpeg"),
            ffprobe_bin: env::get_or(EnvKey::FfprobeBin, "ffprobe"),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
