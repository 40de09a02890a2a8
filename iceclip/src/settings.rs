//! Persisted user settings.
//!
//! The engine only reads these at connect time; the control loop writes them
//! back every time one changes.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const DEFAULT_STREAM_URL: &str = "https://audio.ury.org.uk/live-high";
pub const DEFAULT_WINDOW_MINUTES: u32 = 2;
pub const DEFAULT_OUTPUT_FOLDER: &str = "saved_clips";
pub const DEFAULT_FILE_PREFIX: &str = "audio";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub stream_url: String,
    pub window_minutes: u32,
    pub output_folder: PathBuf,
    pub file_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            stream_url: DEFAULT_STREAM_URL.to_string(),
            window_minutes: DEFAULT_WINDOW_MINUTES,
            output_folder: PathBuf::from(DEFAULT_OUTPUT_FOLDER),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
        }
    }
}

impl Settings {
    /// `<config dir>/iceclip/settings.json`, or `./settings.json` when the
    /// platform has no config directory.
    pub fn default_path() -> PathBuf {
        dirs_next::config_dir()
            .map(|dir| dir.join("iceclip"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("settings.json")
    }

    /// Load settings from disk, or write and return defaults if missing.
    pub fn load_or_create(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if !path.exists() {
            let settings = Settings::default();
            settings.save(path)?;
            log::info!("created default settings at {}", path.display());
            return Ok(settings);
        }

        let contents = fs::read_to_string(path)?;
        let mut settings: Settings = serde_json::from_str(&contents)?;
        if settings.window_minutes == 0 {
            log::warn!(
                "ignoring invalid buffer size 0 in {}; using {}",
                path.display(),
                DEFAULT_WINDOW_MINUTES
            );
            settings.window_minutes = DEFAULT_WINDOW_MINUTES;
        }
        Ok(settings)
    }

    /// Save settings to disk.
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Apply command-line overrides. Returns `true` if anything changed.
    pub fn apply_overrides(
        &mut self,
        url: Option<String>,
        window_minutes: Option<u32>,
        output_folder: Option<PathBuf>,
        file_prefix: Option<String>,
    ) -> bool {
        let before = self.clone();
        if let Some(url) = url {
            self.stream_url = url;
        }
        if let Some(minutes) = window_minutes {
            self.window_minutes = minutes;
        }
        if let Some(folder) = output_folder {
            self.output_folder = folder;
        }
        if let Some(prefix) = file_prefix {
            self.file_prefix = prefix;
        }
        *self != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("iceclip_settings_test_{}_{}", name, std::process::id()))
            .join("settings.json")
    }

    #[test]
    fn missing_file_creates_defaults() {
        let path = temp_path("create");
        fs::remove_dir_all(path.parent().unwrap()).ok();

        let settings = Settings::load_or_create(&path).unwrap();

        assert_eq!(settings, Settings::default());
        assert!(path.exists());
        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn round_trip() {
        let path = temp_path("round_trip");
        let settings = Settings {
            stream_url: "http://radio.example/live".into(),
            window_minutes: 5,
            output_folder: PathBuf::from("/tmp/clips"),
            file_prefix: "show".into(),
        };

        settings.save(&path).unwrap();
        assert_eq!(Settings::load_or_create(&path).unwrap(), settings);
        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let path = temp_path("partial");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{ "filePrefix": "morning", "windowMinutes": 0 }"#).unwrap();

        let settings = Settings::load_or_create(&path).unwrap();

        assert_eq!(settings.file_prefix, "morning");
        assert_eq!(settings.window_minutes, DEFAULT_WINDOW_MINUTES);
        assert_eq!(settings.stream_url, DEFAULT_STREAM_URL);
        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn overrides_report_changes() {
        let mut settings = Settings::default();
        assert!(!settings.apply_overrides(None, Some(DEFAULT_WINDOW_MINUTES), None, None));
        assert!(settings.apply_overrides(None, Some(10), None, Some("late".into())));
        assert_eq!(settings.window_minutes, 10);
        assert_eq!(settings.file_prefix, "late");
    }
}
