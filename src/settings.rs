use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSettings {
    pub api_key: String,
    pub model: String,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-1.5-flash".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserSettings {
    extraction: ExtractionSettings,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            extraction: ExtractionSettings::default(),
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn extraction(&self) -> ExtractionSettings {
        self.data.read().unwrap().extraction.clone()
    }

    pub fn update_extraction(&self, settings: ExtractionSettings) -> Result<()> {
        {
            let mut guard = self.data.write().unwrap();
            guard.extraction = settings;
            self.persist(&guard)?;
        }
        Ok(())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
