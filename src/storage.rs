use crate::constants::{CONFIG_DIR_NAME, PREFERENCES_FILE};
use crate::models::{Preferences, Theme};
use anyhow::Result;
use std::fs;
use std::path::PathBuf;

/// Durable store for the theme preference
pub struct Storage {
    config_dir: PathBuf,
}

impl Storage {
    pub fn new() -> Self {
        let config_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR_NAME);
        Storage { config_dir }
    }

    /// Storage rooted at an explicit directory
    pub fn at(config_dir: impl Into<PathBuf>) -> Self {
        Storage {
            config_dir: config_dir.into(),
        }
    }

    fn preferences_path(&self) -> PathBuf {
        self.config_dir.join(PREFERENCES_FILE)
    }

    /// Load the saved theme, `Light` when nothing usable is stored
    pub fn load_theme(&self) -> Theme {
        match self.load_preferences() {
            Ok(prefs) => prefs.theme,
            Err(e) => {
                tracing::warn!("Failed to load preferences, using default theme: {}", e);
                Theme::default()
            }
        }
    }

    fn load_preferences(&self) -> Result<Preferences> {
        let path = self.preferences_path();
        if !path.exists() {
            return Ok(Preferences::default());
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_yaml::from_str::<Preferences>(&content)?)
    }

    /// Persist the theme
    pub fn save_theme(&self, theme: Theme) -> Result<()> {
        self.ensure_dir()?;
        let content = serde_yaml::to_string(&Preferences { theme })?;
        fs::write(self.preferences_path(), content)?;
        Ok(())
    }

    /// Ensure config directory exists
    fn ensure_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}
