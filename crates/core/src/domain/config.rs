//! Configuration management for vstlog
//!
//! This module provides:
//! - Configuration structs for input, analysis and plotting settings
//! - TOML serialization with per-field defaults
//! - A config manager resolving `~/.config/vstlog/config.toml`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, instrument};

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Log path the plugin logger writes to by default
#[cfg(windows)]
pub const DEFAULT_LOG_PATH: &str = "C:/temp/amneziagaze_realtime_log.txt";
#[cfg(not(windows))]
pub const DEFAULT_LOG_PATH: &str = "/tmp/amneziagaze_realtime_log.txt";

/// Errors that can occur during configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Where to look for the log when none is given on the command line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub default_log_path: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            default_log_path: PathBuf::from(DEFAULT_LOG_PATH),
        }
    }
}

/// Analyzer tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Number of worst clipping events listed
    pub worst_clipping_events: usize,

    /// Number of most changed parameters listed
    pub top_parameters: usize,

    /// Bypass values above this count as bypassed
    pub bypass_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            worst_clipping_events: 5,
            top_parameters: 10,
            bypass_threshold: 0.5,
        }
    }
}

/// Plot output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Directory the images are written to
    pub output_dir: PathBuf,

    /// Number of distinct parameters drawn in the parameter chart
    pub max_parameter_series: usize,

    /// Width of every image in pixels
    pub width: u32,

    /// Height of the parameter and clipping charts in pixels
    pub height: u32,

    /// Height of one component panel in the audio level chart
    pub panel_height: u32,

    /// TrueType font used for labels (None = search system fonts)
    pub font_path: Option<PathBuf>,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("vst_analysis_plots"),
            max_parameter_series: 5,
            width: 1800,
            height: 900,
            panel_height: 450,
            font_path: None,
        }
    }
}

/// Complete vstlog configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub input: InputConfig,
    pub analysis: AnalysisConfig,
    pub plots: PlotConfig,
}

impl AnalyzerConfig {
    /// Load configuration from TOML file
    #[instrument(skip(path))]
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration");

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Render as pretty TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values the analyzers and renderer cannot work with
    pub fn validate(&self) -> Result<()> {
        if !self.analysis.bypass_threshold.is_finite() {
            return Err(ConfigError::Invalid(
                "analysis.bypass_threshold must be a finite number".to_string(),
            ));
        }

        let plots = &self.plots;
        if plots.width == 0 || plots.height == 0 || plots.panel_height == 0 {
            return Err(ConfigError::Invalid(
                "plot dimensions must be greater than zero".to_string(),
            ));
        }

        if plots.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "plots.output_dir must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration manager for the per-user config file
///
/// Manages the configuration file at `~/.config/vstlog/config.toml`.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a manager for `config.toml` inside `config_dir`
    pub fn new(config_dir: PathBuf) -> Self {
        Self {
            config_path: config_dir.join("config.toml"),
        }
    }

    /// Get the default config directory path
    ///
    /// Returns `~/.config/vstlog` on Linux, the platform equivalent elsewhere
    pub fn default_config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("vstlog"))
            .ok_or_else(|| ConfigError::Invalid("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load configuration from file
    ///
    /// If the config file doesn't exist, returns defaults.
    /// If the config file is corrupt, logs an error and returns defaults.
    #[instrument(skip(self))]
    pub fn load(&self) -> AnalyzerConfig {
        if !self.config_path.exists() {
            debug!(
                path = %self.config_path.display(),
                "Config file not found, using defaults"
            );
            return AnalyzerConfig::default();
        }

        match AnalyzerConfig::load_from_file(&self.config_path) {
            Ok(config) => config,
            Err(e) => {
                error!(
                    path = %self.config_path.display(),
                    error = %e,
                    "Failed to load config, using defaults"
                );
                AnalyzerConfig::default()
            }
        }
    }

    /// Check if config file exists
    pub fn exists(&self) -> bool {
        self.config_path.exists()
    }
}
