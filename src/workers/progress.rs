//! Progress inference from the engine's human-readable status lines.
//!
//! Best effort only: recognized lines nudge progress forward in bounded,
//! monotonic steps. Nothing here touches the process or the registry.

pub const STARTED_STEP: u8 = 10;
pub const STARTED_CAP: u8 = 85;
pub const FINISHED_STEP: u8 = 5;
pub const FINISHED_CAP: u8 = 90;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activity {
    Probed(u32),
    Started(String),
    Finished(String),
    RenditionFailed(String),
    Finalizing,
}

impl Activity {
    pub fn message(&self) -> String {
        match self {
            Activity::Probed(height) => format!("detected {}p source", height),
            Activity::Started(label) => format!("encoding {}", label),
            Activity::Finished(label) => format!("finished {}", label),
            Activity::RenditionFailed(label) => format!("{} failed", label),
            Activity::Finalizing => "finalizing".to_string(),
        }
    }
}

/// `"720p"` when the token looks like a quality label.
fn quality_token(token: &str) -> Option<String> {
    let digits = token.strip_suffix('p')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(token.to_string())
}

pub fn infer_activity(line: &str) -> Option<Activity> {
    let line = line.trim();

    if let Some(rest) = line.strip_prefix("Input video resolution:") {
        let digits = rest.trim().strip_suffix('p')?;
        return digits.parse().ok().map(Activity::Probed);
    }
    if line.starts_with("Processing complete") {
        return Some(Activity::Finalizing);
    }
    if let Some(rest) = line.strip_prefix("Processing ") {
        let token = rest.trim_end_matches('.');
        return quality_token(token).map(Activity::Started);
    }
    if let Some(rest) = line.strip_prefix('✓') {
        let token = rest.trim().strip_suffix("completed")?.trim();
        return quality_token(token).map(Activity::Finished);
    }
    if let Some(rest) = line.strip_prefix('✗') {
        let token = rest.trim().strip_suffix("failed")?.trim();
        return quality_token(token).map(Activity::RenditionFailed);
    }
    None
}

/// Next progress value; never below `current`.
pub fn advance(current: u8, activity: &Activity) -> u8 {
    let next = match activity {
        Activity::Started(_) => current.saturating_add(STARTED_STEP).min(STARTED_CAP),
        Activity::Finished(_) => current.saturating_add(FINISHED_STEP).min(FINISHED_CAP),
        _ => current,
    };
    next.max(current)
}
