use crate::error::{GtmError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

/// Contents of `.gtm/config.yaml`. Every field has a default, so a missing
/// file or a partial file are both valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,
}

fn default_port() -> u16 {
    3141
}

fn default_db_path() -> PathBuf {
    PathBuf::from(paths::STATE_DB_FILE)
}

fn default_tick_interval_secs() -> u64 {
    10
}

fn default_mailbox_capacity() -> usize {
    64
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            db_path: default_db_path(),
            tick_interval_secs: default_tick_interval_secs(),
            mailbox_capacity: default_mailbox_capacity(),
        }
    }
}

impl ServerConfig {
    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Load `.gtm/config.yaml` under `root`, or defaults if it does not exist.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: ServerConfig = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Derived values
    // -----------------------------------------------------------------------

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }

    pub fn db_path(&self, root: &Path) -> PathBuf {
        paths::resolve_db_path(root, &self.db_path)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.tick_interval_secs == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "tick_interval_secs must be greater than zero".into(),
            });
        } else if self.tick_interval_secs > 3600 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "tick_interval_secs = {} is unusually long for a live dashboard",
                    self.tick_interval_secs
                ),
            });
        }

        if self.mailbox_capacity == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "mailbox_capacity must be greater than zero".into(),
            });
        }

        if self.db_path.as_os_str().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "db_path must not be empty".into(),
            });
        }

        warnings
    }

    /// Fail on the first `Error`-level warning.
    pub fn ensure_valid(&self) -> Result<()> {
        match self
            .validate()
            .into_iter()
            .find(|w| w.level == WarnLevel::Error)
        {
            Some(w) => Err(GtmError::Config(w.message)),
            None => Ok(()),
        }
    }
}
