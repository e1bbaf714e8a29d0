//! Persistent settings for the race visualizer.

use crate::graph::layout::LayoutConfig;
use crate::graph::types::Vec3;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, warn};

/// All persistable UI settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Data selection
    pub repo_url: String,
    pub max_branches: usize,
    pub commits_per_branch: usize,

    // Playback
    pub reveal_interval_ms: u64,

    // Layout geometry
    pub lane_width: f32,
    pub timeline_gap: f32,
    pub height_scale: f32,
    pub baseline_offset: f32,

    // Camera follow
    pub camera_height: f32,
    pub camera_distance: f32,
    pub damping: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            repo_url: "https://github.com/microsoft/vscode".to_string(),
            max_branches: 10,
            commits_per_branch: 30,

            reveal_interval_ms: 50,

            lane_width: 5.0,
            timeline_gap: 5.0,
            height_scale: 0.05,
            baseline_offset: -4.0,

            camera_height: 20.0,
            camera_distance: 40.0,
            damping: 0.05,
        }
    }
}

impl Settings {
    /// Geometry and camera tuning in the form the pipeline consumes.
    pub fn layout_config(&self) -> LayoutConfig {
        LayoutConfig {
            lane_width: self.lane_width,
            timeline_gap: self.timeline_gap,
            height_scale: self.height_scale,
            baseline_offset: self.baseline_offset,
            camera_offset: Vec3::new(0.0, self.camera_height, self.camera_distance),
            damping: self.damping,
        }
    }

    /// Get the path to the settings file
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("commit-race");
            p.push("settings.json");
            p
        })
    }

    /// Load settings from disk, returning defaults if the file doesn't
    /// exist or is invalid
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            warn!("could not determine config directory, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => {
                    debug!(?path, "loaded settings");
                    settings
                }
                Err(e) => {
                    warn!(error = %e, "failed to parse settings file, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                // File doesn't exist yet, that's fine
                Self::default()
            }
        }
    }

    /// Save settings to disk
    pub fn save(&self) {
        let Some(path) = Self::config_path() else {
            warn!("could not determine config directory, settings not saved");
            return;
        };

        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(error = %e, "failed to create config directory");
                return;
            }
        }

        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    warn!(error = %e, "failed to write settings file");
                } else {
                    debug!(?path, "saved settings");
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to serialize settings");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn round_trips_through_json() {
        let mut settings = Settings::default();
        settings.repo_url = "https://github.com/rust-lang/rust".into();
        settings.reveal_interval_ms = 120;

        let json = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn layout_config_mirrors_geometry_fields() {
        let settings = Settings::default();
        let config = settings.layout_config();
        assert_eq!(config.lane_width, settings.lane_width);
        assert_eq!(config.camera_offset.y, settings.camera_height);
        assert_eq!(config.camera_offset.z, settings.camera_distance);
    }
}
