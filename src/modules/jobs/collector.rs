//! Enumerates the rendition files an engine run left behind.

use super::ladder::quality_label;
use super::model::Rendition;
use std::cmp::Ordering;
use std::path::Path;
use tracing::warn;

pub const RENDITION_EXTENSION: &str = "mp4";
pub const UNKNOWN_QUALITY: &str = "unknown";

/// `"<stem> <height>.mp4"`, the name the engine gives each rendition.
pub fn rendition_file_name(stem: &str, height: u32) -> String {
    format!("{} {}.{}", stem, height, RENDITION_EXTENSION)
}

/// Extracts the trailing height from `"<stem> <height>.mp4"`.
pub fn parse_height(filename: &str) -> Option<u32> {
    let stem = Path::new(filename).file_stem()?.to_str()?;
    let token = stem.rsplit(' ').next()?;
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

fn has_rendition_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(RENDITION_EXTENSION))
}

/// Lists renditions in `dir`, highest quality first.
///
/// A missing or empty directory is not an error: it yields an empty list.
pub async fn collect(dir: &Path) -> Vec<Rendition> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Output directory {} unreadable: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut found: Vec<(Option<u32>, String)> = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed reading {}: {}", dir.display(), e);
                break;
            }
        };

        let path = entry.path();
        let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
        if !is_file || !has_rendition_extension(&path) {
            continue;
        }

        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            found.push((parse_height(name), name.to_string()));
        }
    }

    found.sort_by(|(a, a_name), (b, b_name)| match (a, b) {
        (Some(a), Some(b)) => b.cmp(a).then_with(|| a_name.cmp(b_name)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a_name.cmp(b_name),
    });

    found
        .into_iter()
        .map(|(height, filename)| Rendition {
            quality_label: height
                .map(quality_label)
                .unwrap_or_else(|| UNKNOWN_QUALITY.to_string()),
            filename,
        })
        .collect()
}
