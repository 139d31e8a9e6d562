use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::filter::{INTENSITY_MAX, INTENSITY_MIN};
use crate::media::video::VIDEO_EXTENSIONS;

/// Bundled clip, relative to the working directory or the executable.
pub const BUNDLED_MEDIA: &str = "assets/media/sample.mp4";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    pub version: u32,
    pub media_path: Option<PathBuf>,
    pub looping: bool,
    pub initial_intensity: f32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            version: 1,
            media_path: None,
            looping: true,
            initial_intensity: 8.0,
        }
    }
}

impl PlayerSettings {
    /// Read `<config_dir>/pixelview/settings.json`, falling back to defaults.
    pub fn load() -> Self {
        let Some(config_dir) = dirs::config_dir() else {
            return Self::default();
        };
        Self::load_from(&config_dir.join("pixelview").join("settings.json"))
    }

    pub fn load_from(path: &Path) -> Self {
        let settings = match std::fs::read_to_string(path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                log::warn!("Ignoring invalid settings at {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        };
        settings.sanitized()
    }

    fn sanitized(mut self) -> Self {
        self.initial_intensity = if self.initial_intensity.is_finite() {
            self.initial_intensity.clamp(INTENSITY_MIN, INTENSITY_MAX)
        } else {
            Self::default().initial_intensity
        };
        self
    }

    /// The configured file if it exists, else the bundled clip if present.
    pub fn resolve_media_path(&self) -> Option<PathBuf> {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        self.resolve_media_in(Path::new("."), exe_dir.as_deref())
    }

    fn resolve_media_in(&self, cwd: &Path, exe_dir: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = &self.media_path {
            if !has_video_extension(path) {
                log::warn!("{} does not look like a video file", path.display());
            }
            if path.is_file() {
                return Some(path.clone());
            }
            log::warn!("Configured media {} not found", path.display());
        }
        std::iter::once(cwd)
            .chain(exe_dir)
            .map(|dir| dir.join(BUNDLED_MEDIA))
            .find(|p| p.is_file())
    }
}

fn has_video_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| VIDEO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = PlayerSettings::load_from(&dir.path().join("settings.json"));
        assert_eq!(s, PlayerSettings::default());
    }

    #[test]
    fn invalid_json_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(PlayerSettings::load_from(&path), PlayerSettings::default());
    }

    #[test]
    fn partial_file_fills_defaults_and_clamps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"looping": false, "initial_intensity": 500}"#).unwrap();
        let s = PlayerSettings::load_from(&path);
        assert!(!s.looping);
        assert_eq!(s.initial_intensity, 100.0);
        assert_eq!(s.version, 1);
        assert!(s.media_path.is_none());
    }

    #[test]
    fn video_extensions_are_case_insensitive() {
        assert!(has_video_extension(Path::new("clip.MP4")));
        assert!(has_video_extension(Path::new("/a/b/clip.webm")));
        assert!(!has_video_extension(Path::new("notes.txt")));
        assert!(!has_video_extension(Path::new("noext")));
    }

    #[test]
    fn configured_media_wins_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let clip = dir.path().join("clip.mp4");
        std::fs::write(&clip, b"").unwrap();
        let s = PlayerSettings {
            media_path: Some(clip.clone()),
            ..PlayerSettings::default()
        };
        assert_eq!(s.resolve_media_in(dir.path(), None), Some(clip));
    }

    #[test]
    fn falls_back_to_bundled_media() {
        let cwd = tempfile::tempdir().unwrap();
        let exe = tempfile::tempdir().unwrap();
        let bundled = exe.path().join(BUNDLED_MEDIA);
        std::fs::create_dir_all(bundled.parent().unwrap()).unwrap();
        std::fs::write(&bundled, b"").unwrap();

        let s = PlayerSettings {
            media_path: Some(cwd.path().join("missing.mp4")),
            ..PlayerSettings::default()
        };
        assert_eq!(s.resolve_media_in(cwd.path(), Some(exe.path())), Some(bundled));
        assert_eq!(s.resolve_media_in(cwd.path(), None), None);
    }
}
