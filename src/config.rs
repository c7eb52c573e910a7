//! Runtime configuration.
//!
//! Read from `~/.taskbuddy/rc`, one `key=value` per line:
//!
//! ```text
//! data.backend=csv
//! data.location=./tasks.csv
//! data.readonly=false
//! debug.mode=dev
//! ```
//!
//! Relative `data.location` paths resolve against the rc file's directory.

use log::warn;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_DIR_NAME: &str = ".taskbuddy";
pub const MODE_ENV_VAR: &str = "TASKBUDDY_MODE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine home directory")]
    NoHome,
    #[error("Failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid value '{value}' for {key} (line {line})")]
    InvalidValue { key: String, value: String, line: usize },
    #[error("Invalid debug mode '{0}'. Expected dev, test or prod.")]
    InvalidMode(String),
}

/// Debug mode controls log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebugMode {
    Dev,
    Test,
    #[default]
    Prod,
}

impl DebugMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DebugMode::Dev => "dev",
            DebugMode::Test => "test",
            DebugMode::Prod => "prod",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" => Some(DebugMode::Dev),
            "test" => Some(DebugMode::Test),
            "prod" => Some(DebugMode::Prod),
            _ => None,
        }
    }
}

impl fmt::Display for DebugMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Registered backend name (`csv` or `sqlite` by default)
    pub backend: String,
    /// Explicit data file; `None` means the backend's default under the config dir
    pub data_location: Option<PathBuf>,
    pub read_only: bool,
    pub debug_mode: DebugMode,
    /// Directory holding the rc file and default data files
    pub config_dir: PathBuf,
}

impl Config {
    /// Defaults rooted at `config_dir`
    pub fn with_dir(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend: "csv".to_string(),
            data_location: None,
            read_only: false,
            debug_mode: DebugMode::default(),
            config_dir: config_dir.into(),
        }
    }

    /// `~/.taskbuddy`, honouring `HOME` before the platform lookup
    pub fn default_dir() -> Result<PathBuf, ConfigError> {
        let home = std::env::var_os("HOME")
            .filter(|h| !h.is_empty())
            .map(PathBuf::from)
            .or_else(dirs::home_dir)
            .ok_or(ConfigError::NoHome)?;
        Ok(home.join(CONFIG_DIR_NAME))
    }

    pub fn rc_path(&self) -> PathBuf {
        self.config_dir.join("rc")
    }

    /// Load the rc file from the default directory, then settle the debug mode
    /// from `mode_flag` or, failing that, `TASKBUDDY_MODE`
    pub fn load(mode_flag: Option<DebugMode>) -> Result<Self, ConfigError> {
        let mut config = Self::load_from_dir(Self::default_dir()?)?;
        let env_mode = std::env::var(MODE_ENV_VAR).ok();
        config.apply_mode(mode_flag, env_mode.as_deref())?;
        Ok(config)
    }

    /// The flag wins outright; the env value is only consulted without one
    pub fn apply_mode(&mut self, mode_flag: Option<DebugMode>, env_mode: Option<&str>) -> Result<(), ConfigError> {
        if let Some(mode) = mode_flag {
            self.debug_mode = mode;
        } else if let Some(value) = env_mode {
            self.debug_mode =
                DebugMode::from_str(value).ok_or_else(|| ConfigError::InvalidMode(value.to_string()))?;
        }
        Ok(())
    }

    /// Load `<dir>/rc` if it exists; a missing file yields defaults
    pub fn load_from_dir(config_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::with_dir(config_dir);
        let rc_path = config.rc_path();
        if !rc_path.exists() {
            return Ok(config);
        }

        let content = std::fs::read_to_string(&rc_path).map_err(|source| ConfigError::Read {
            path: rc_path.clone(),
            source,
        })?;
        config.apply_rc(&content)?;
        Ok(config)
    }

    /// Apply `key=value` lines on top of the current settings
    pub fn apply_rc(&mut self, content: &str) -> Result<(), ConfigError> {
        for (index, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                warn!("Ignoring malformed config line {}: '{}'", index + 1, line);
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            let invalid = || ConfigError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
                line: index + 1,
            };

            match key {
                "data.backend" => {
                    if value.is_empty() {
                        return Err(invalid());
                    }
                    self.backend = value.to_ascii_lowercase();
                }
                "data.location" => {
                    if value.is_empty() {
                        return Err(invalid());
                    }
                    self.data_location = Some(self.resolve_relative(Path::new(value)));
                }
                "data.readonly" => {
                    self.read_only = match value.to_ascii_lowercase().as_str() {
                        "true" | "yes" | "1" => true,
                        "false" | "no" | "0" => false,
                        _ => return Err(invalid()),
                    };
                }
                "debug.mode" => {
                    self.debug_mode = DebugMode::from_str(value).ok_or_else(invalid)?;
                }
                other => warn!("Unknown config key '{}' on line {}", other, index + 1),
            }
        }
        Ok(())
    }

    fn resolve_relative(&self, path: &Path) -> PathBuf {
        if path.is_relative() {
            self.config_dir.join(path)
        } else {
            path.to_path_buf()
        }
    }

    /// Data file for the selected backend
    pub fn data_path(&self) -> PathBuf {
        if let Some(path) = &self.data_location {
            return path.clone();
        }
        let file_name = match self.backend.as_str() {
            "sqlite" => "tasks.db",
            _ => "tasks.csv",
        };
        self.config_dir.join(file_name)
    }

    /// Command-line overrides win over the rc file
    pub fn with_overrides(
        mut self,
        backend: Option<&str>,
        data: Option<&Path>,
        mode: Option<DebugMode>,
    ) -> Self {
        if let Some(backend) = backend {
            self.backend = backend.trim().to_ascii_lowercase();
        }
        if let Some(data) = data {
            self.data_location = Some(data.to_path_buf());
        }
        if let Some(mode) = mode {
            self.debug_mode = mode;
        }
        self
    }
}
