use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::detection::domain::detector_config::DetectorConfig;
use crate::overlay::domain::overlay_strategy::{OverlayStyle, DEFAULT_LINE_WIDTH};
use crate::overlay::domain::render_mode::RenderMode;
use crate::overlay::infrastructure::overlay_renderer::RenderOptions;
use crate::shared::color::Color;
use crate::shared::constants::{SETTINGS_DIR_NAME, SETTINGS_FILE_NAME};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// User-facing overlay configuration.
///
/// Missing fields take their defaults, so partial files are fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    pub render_mode: RenderMode,
    pub detector: DetectorConfig,
    pub landmark_color: Color,
    pub draw_lines: bool,
    pub show_boxes: bool,
    pub show_landmarks: bool,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::default(),
            detector: DetectorConfig::default(),
            landmark_color: Color::YELLOW,
            draw_lines: true,
            show_boxes: true,
            show_landmarks: true,
        }
    }
}

impl OverlaySettings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(SETTINGS_DIR_NAME).join(SETTINGS_FILE_NAME))
    }

    /// Loads from the user config directory, falling back to defaults when
    /// the file is absent or unreadable.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        Self::load_from(&path).unwrap_or_else(|e| {
            log::warn!("{e}; using default settings");
            Self::default()
        })
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(io_err)
    }

    /// Whether the next detection should compute landmarks.
    pub fn wants_landmarks(&self) -> bool {
        self.show_landmarks || self.render_mode.needs_landmarks()
    }

    /// With both overlays off, a frame without a face clears the surface.
    pub fn clears_when_no_face(&self) -> bool {
        !self.show_boxes && !self.show_landmarks
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            mode: self.render_mode,
            show_boxes: self.show_boxes,
            style: OverlayStyle {
                landmark_color: self.landmark_color,
                draw_lines: self.draw_lines,
                show_landmarks: self.show_landmarks,
                line_width: DEFAULT_LINE_WIDTH,
            },
        }
    }
}

/// Shared, writable view of the settings.
///
/// The loop takes one snapshot per cycle, so a change applies from the
/// next cycle on and never mid-render.
#[derive(Clone, Default)]
pub struct SettingsHandle {
    inner: Arc<RwLock<OverlaySettings>>,
}

impl SettingsHandle {
    pub fn new(settings: OverlaySettings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    pub fn snapshot(&self) -> OverlaySettings {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn update(&self, change: impl FnOnce(&mut OverlaySettings)) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        change(&mut guard);
    }

    /// Selects a mode by name; unknown names select the default mesh.
    pub fn set_render_mode(&self, name: &str) {
        let mode = RenderMode::from_name(name);
        self.update(|s| s.render_mode = mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = OverlaySettings::default();
        assert_eq!(s.render_mode, RenderMode::DefaultMesh);
        assert_eq!(s.landmark_color, Color::YELLOW);
        assert!(s.draw_lines && s.show_boxes && s.show_landmarks);
        assert_eq!(s.detector, DetectorConfig::default());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let s: OverlaySettings =
            serde_json::from_str(r##"{"render_mode": "glasses", "landmark_color": "#0f0"}"##)
                .unwrap();
        assert_eq!(s.render_mode, RenderMode::Glasses);
        assert_eq!(s.landmark_color, Color::rgb(0, 255, 0));
        assert!(s.show_boxes);
    }

    #[test]
    fn test_unknown_mode_in_file_falls_back() {
        let s: OverlaySettings = serde_json::from_str(r#"{"render_mode": "top-hat"}"#).unwrap();
        assert_eq!(s.render_mode, RenderMode::DefaultMesh);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = OverlaySettings {
            render_mode: RenderMode::RedEye,
            detector: DetectorConfig::Mtcnn { min_face_size: 40 },
            show_landmarks: false,
            ..OverlaySettings::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(OverlaySettings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_load_errors_are_typed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert!(matches!(
            OverlaySettings::load_from(&path),
            Err(SettingsError::Io { .. })
        ));
        std::fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(
            OverlaySettings::load_from(&path),
            Err(SettingsError::Parse { .. })
        ));
    }

    #[test]
    fn test_landmarks_requested_for_non_default_modes() {
        let mut s = OverlaySettings {
            show_landmarks: false,
            ..OverlaySettings::default()
        };
        assert!(!s.wants_landmarks());
        s.render_mode = RenderMode::Moustache;
        assert!(s.wants_landmarks());
    }

    #[test]
    fn test_clears_only_when_both_overlays_off() {
        let mut s = OverlaySettings::default();
        assert!(!s.clears_when_no_face());
        s.show_boxes = false;
        assert!(!s.clears_when_no_face());
        s.show_landmarks = false;
        assert!(s.clears_when_no_face());
    }

    #[test]
    fn test_handle_updates_are_visible_to_snapshots() {
        let handle = SettingsHandle::default();
        let clone = handle.clone();
        clone.set_render_mode("dotted_eyes");
        clone.update(|s| s.draw_lines = false);
        let snap = handle.snapshot();
        assert_eq!(snap.render_mode, RenderMode::DottedEyes);
        assert!(!snap.draw_lines);
    }

    #[test]
    fn test_render_options_carry_style() {
        let s = OverlaySettings {
            landmark_color: Color::RED,
            draw_lines: false,
            ..OverlaySettings::default()
        };
        let options = s.render_options();
        assert_eq!(options.style.landmark_color, Color::RED);
        assert!(!options.style.draw_lines);
        assert!(options.show_boxes);
    }
}
