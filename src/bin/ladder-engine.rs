//! Rendition ladder engine.
//!
//! `ladder-engine <video_path>` probes the source height, copies the original
//! into `<source dir>/<stem>/` and encodes every standard rung below it with
//! ffmpeg. Status lines on stdout are what the server's supervisor follows.

use anyhow::{Context, Result, bail};
use ladder_backend::common::error::JobError;
use ladder_backend::config::settings::EngineConfig;
use ladder_backend::infrastructure::probe::{FfprobeProber, Prober};
use ladder_backend::modules::jobs::collector::rendition_file_name;
use ladder_backend::modules::jobs::ladder;
use ladder_backend::workers::transcoder::output_dir_for;
use std::path::Path;
use std::process::{ExitCode, Stdio};
use std::time::Instant;
use tokio::process::Command;

const EXIT_RENDITION_FAILED: u8 = 1;
const EXIT_PROBE_FAILED: u8 = 2;

/// Encodes one rung. A spawn failure counts as a failed rung so the rest of
/// the ladder still runs.
async fn encode(config: &EngineConfig, source: &Path, output: &Path, height: u32) -> bool {
    let status = Command::new(&config.ffmpeg_bin)
        .args(["-hide_banner", "-loglevel", "error", "-y", "-i"])
        .arg(source)
        .arg("-vf")
        .arg(format!("scale=-2:{}", height))
        .args(["-c:a", "copy"])
        .arg(output)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::inherit())
        .status()
        .await;

    match status {
        Ok(status) => status.success(),
        Err(e) => {
            eprintln!("failed to run {}: {}", config.ffmpeg_bin, e);
            false
        }
    }
}

/// Returns whether every rendition succeeded.
async fn run(source: &Path, config: &EngineConfig) -> Result<bool> {
    let started = Instant::now();

    if !tokio::fs::try_exists(source).await.unwrap_or(false) {
        bail!("File does not exist: {}", source.display());
    }

    let prober = FfprobeProber::new(config.ffprobe_bin.clone());
    let height = prober.probe_height(source).await?;
    println!("Input video resolution: {}p", height);

    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .context("source path has no file name")?;
    let out_dir = output_dir_for(source);
    tokio::fs::create_dir_all(&out_dir)
        .await
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let original = out_dir.join(rendition_file_name(&stem, height));
    tokio::fs::copy(source, &original)
        .await
        .with_context(|| format!("failed to copy original to {}", original.display()))?;
    println!("Original copied as: {}", original.display());

    let rungs = ladder::resolve(height);
    if rungs.is_empty() {
        println!("No subordinate qualities to process for {}p video.", height);
        return Ok(true);
    }

    let labels: Vec<String> = rungs.iter().map(|rung| rung.label()).collect();
    println!("Processing subordinate qualities: {}", labels.join(" "));

    let mut all_succeeded = true;
    for rung in &rungs {
        let label = rung.label();
        let output = out_dir.join(rendition_file_name(&stem, rung.height));

        println!("Processing {}...", label);
        if encode(config, source, &output, rung.height).await {
            println!("✓ {} completed", label);
        } else {
            println!("✗ {} failed", label);
            eprintln!("ffmpeg could not produce {}", output.display());
            all_succeeded = false;
        }
    }

    println!();
    println!("Processing complete. Files saved in folder: {}", out_dir.display());
    println!("Total processing time: {:.2} seconds", started.elapsed().as_secs_f64());

    Ok(all_succeeded)
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        let program = args.first().map(String::as_str).unwrap_or("ladder-engine");
        eprintln!("Usage: {} <video_path>", program);
        eprintln!("Example: {} video.mp4", program);
        return ExitCode::from(EXIT_RENDITION_FAILED);
    }

    let config = EngineConfig::new();
    match run(Path::new(&args[1]), &config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_RENDITION_FAILED),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            match e.downcast_ref::<JobError>() {
                Some(JobError::Probe(_)) => ExitCode::from(EXIT_PROBE_FAILED),
                _ => ExitCode::from(EXIT_RENDITION_FAILED),
            }
        }
    }
}
