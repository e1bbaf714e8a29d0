//! Unified theme and color constants for the race scene and UI panels.
//!
//! All palette decisions live here so the scene, legend and info panel
//! stay visually consistent.

use egui::Color32;

/// Background colors for different layers
pub mod bg {
    use super::*;

    /// Scene area background - darkest layer
    pub const SCENE: Color32 = Color32::from_rgb(10, 12, 18);

    /// Panel backgrounds - slightly lighter than the scene
    pub const PANEL: Color32 = Color32::from_rgb(20, 22, 28);

    /// Card/elevated surface backgrounds
    pub const SURFACE: Color32 = Color32::from_rgb(28, 30, 38);
}

/// Text colors at different emphasis levels
pub mod text {
    use super::*;

    pub const PRIMARY: Color32 = Color32::from_rgb(240, 240, 245);
    pub const SECONDARY: Color32 = Color32::from_rgb(180, 180, 190);
    pub const MUTED: Color32 = Color32::from_rgb(120, 125, 135);
}

/// Colors for the commit race itself
pub mod race {
    use super::*;

    /// Trunk commits keep one fixed distinguishing hue (gold)
    pub const MAIN_BRANCH: Color32 = Color32::from_rgb(255, 215, 0);

    /// Small feature commits (skyblue end of the ramp)
    pub const FEATURE_COLD: Color32 = Color32::from_rgb(135, 206, 235);

    /// Huge feature commits (tomato end of the ramp)
    pub const FEATURE_HOT: Color32 = Color32::from_rgb(255, 99, 71);

    /// Merge commit fill
    pub const MERGE: Color32 = Color32::WHITE;

    /// Merge commit rim / hover accent
    pub const MERGE_RIM: Color32 = Color32::from_rgb(0, 255, 255);

    /// Merge path edges
    pub const MERGE_EDGE: Color32 = Color32::from_rgb(0, 255, 0);

    /// Plain history edges
    pub const HISTORY_EDGE: Color32 = Color32::from_rgb(85, 85, 85);

    /// Hover/selection highlight
    pub const HIGHLIGHT: Color32 = Color32::from_rgb(255, 255, 0);

    /// Added lines in the info panel
    pub const ADDITIONS: Color32 = Color32::from_rgb(34, 197, 94);

    /// Deleted lines in the info panel
    pub const DELETIONS: Color32 = Color32::from_rgb(239, 68, 68);
}

/// Linear interpolation between two colors by `t` in [0, 1].
pub fn lerp_color(a: Color32, b: Color32, t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| -> u8 { (x as f32 + (y as f32 - x as f32) * t).round() as u8 };
    Color32::from_rgb(
        mix(a.r(), b.r()),
        mix(a.g(), b.g()),
        mix(a.b(), b.b()),
    )
}

/// Color for a commit node: trunk history keeps the fixed gold hue, every
/// other commit slides cold to hot by its relative change weight.
pub fn commit_color(is_main_branch: bool, color_weight: f32) -> Color32 {
    if is_main_branch {
        race::MAIN_BRANCH
    } else {
        lerp_color(race::FEATURE_COLD, race::FEATURE_HOT, color_weight)
    }
}
