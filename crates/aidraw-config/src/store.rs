use std::{
    path::{Path, PathBuf},
    sync::RwLock,
};

use crate::Settings;

/// Where [`Settings`] live between runs
pub trait ConfigStore: Send + Sync {
    /// Read settings, defaults when nothing was saved yet
    ///
    /// # Errors
    ///
    /// Returns an error if stored settings exist but cannot be read
    fn load(&self) -> anyhow::Result<Settings>;

    /// Persist settings, replacing what was there
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be written
    fn save(&self, settings: &Settings) -> anyhow::Result<()>;
}

/// JSON file store
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.najie/ai-draw/config.json`, `None` without a home directory
    pub fn default_path() -> Option<PathBuf> {
        std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .filter(|home| !home.is_empty())
            .map(|home| PathBuf::from(home).join(".najie").join("ai-draw").join("config.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> anyhow::Result<Settings> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no config file, using defaults");
            return Ok(Settings::default());
        }

        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", self.path.display()))?;

        serde_json::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("failed to parse config file {}: {e}", self.path.display()))
    }

    fn save(&self, settings: &Settings) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)
                .map_err(|e| anyhow::anyhow!("failed to create config directory {}: {e}", dir.display()))?;
        }

        let json = serde_json::to_string_pretty(settings)?;
        std::fs::write(&self.path, json)
            .map_err(|e| anyhow::anyhow!("failed to write config file {}: {e}", self.path.display()))?;

        tracing::debug!(path = %self.path.display(), "config saved");
        Ok(())
    }
}

/// Process-local store, for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    settings: RwLock<Settings>,
}

impl MemoryConfigStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> anyhow::Result<Settings> {
        self.settings
            .read()
            .map(|s| s.clone())
            .map_err(|_| anyhow::anyhow!("config store lock poisoned"))
    }

    fn save(&self, settings: &Settings) -> anyhow::Result<()> {
        let mut guard = self
            .settings
            .write()
            .map_err(|_| anyhow::anyhow!("config store lock poisoned"))?;
        *guard = settings.clone();
        Ok(())
    }
}
