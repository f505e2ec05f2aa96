//! Quality ladder: which standard renditions sit below a source's resolution.

/// Standard rendition heights, highest first.
pub const STANDARD_HEIGHTS: [u32; 8] = [2160, 1440, 1080, 720, 480, 360, 240, 144];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rung {
    pub height: u32,
}

impl Rung {
    pub fn label(&self) -> String {
        quality_label(self.height)
    }
}

pub fn quality_label(height: u32) -> String {
    format!("{}p", height)
}

/// Returns the standard rungs strictly below `input_height`, in descending
/// order. Never upscales; an input at or below 144 yields no rungs.
///
/// Heights come from the probe, which rejects zero, so every caller passes a
/// positive value.
pub fn resolve(input_height: u32) -> Vec<Rung> {
    STANDARD_HEIGHTS
        .iter()
        .copied()
        .filter(|&height| height < input_height)
        .map(|height| Rung { height })
        .collect()
}
