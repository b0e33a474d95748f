//! User settings stored as settings.json in the app data directory

use crate::constants::DEFAULT_SERVER_URL;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Window geometry
    pub window_x: Option<f32>,
    pub window_y: Option<f32>,
    pub window_w: Option<f32>,
    pub window_h: Option<f32>,

    // Backend
    pub server_url: Option<String>,
}

impl Settings {
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join("settings.json");
        match std::fs::read_to_string(&path) {
            Ok(s) => match serde_json::from_str(&s) {
                Ok(settings) => {
                    debug!(path = %path.display(), "Settings loaded");
                    settings
                }
                Err(e) => {
                    warn!(error = %e, "Failed to parse settings, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                debug!("No settings file found, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, data_dir: &Path) {
        let path = data_dir.join("settings.json");
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    warn!(error = %e, "Failed to save settings");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize settings"),
        }
    }

    pub fn server_url_or_default(&self) -> String {
        self.server_url
            .clone()
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("activity-roster-test-{}", name));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = scratch_dir("missing");
        let _ = std::fs::remove_file(dir.join("settings.json"));
        let settings = Settings::load(&dir);
        assert_eq!(settings.server_url_or_default(), DEFAULT_SERVER_URL);
        assert!(settings.window_w.is_none());
    }

    #[test]
    fn corrupt_file_yields_defaults() {
        let dir = scratch_dir("corrupt");
        std::fs::write(dir.join("settings.json"), "{not json").unwrap();
        let settings = Settings::load(&dir);
        assert!(settings.server_url.is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = scratch_dir("roundtrip");
        let settings = Settings {
            window_x: Some(10.0),
            window_y: Some(20.0),
            window_w: Some(900.0),
            window_h: Some(650.0),
            server_url: Some("http://example.org:9000".into()),
        };
        settings.save(&dir);
        let loaded = Settings::load(&dir);
        assert_eq!(loaded.window_w, Some(900.0));
        assert_eq!(loaded.server_url_or_default(), "http://example.org:9000");
    }
}
