use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

/// Host settings that outlive a single run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Start puzzles with colorblind labels shown
    pub colorblind: bool,
}

impl Settings {
    fn save_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("palette-ident")
            .join("settings.json")
    }

    /// Load settings, falling back to defaults when the file is missing or
    /// unreadable
    pub fn load() -> Self {
        match fs::read_to_string(Self::save_path()) {
            Ok(json) => Self::from_json(&json),
            Err(_) => Self::default(),
        }
    }

    fn from_json(json: &str) -> Self {
        serde_json::from_str(json).unwrap_or_else(|err| {
            tracing::warn!("ignoring malformed settings: {}", err);
            Self::default()
        })
    }

    /// Save settings to file
    pub fn save(&self) -> io::Result<()> {
        let path = Self::save_path();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
    }
}
