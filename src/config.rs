use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::diagnostics::{AnalyzerConfig, SeverityWeights};
use crate::timeline::{TimeScale, DEFAULT_EXPONENT};
use crate::{clog_debug, clog_error, Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub exponent: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            exponent: DEFAULT_EXPONENT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub tick_interval_ms: u64,
    pub speed: f64,
    pub looping: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            speed: 1.0,
            looping: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    pub bottleneck_threshold: usize,
    /// Window for collapsing repeated messages, in seconds.
    pub duplicate_window_secs: f64,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            bottleneck_threshold: 3,
            duplicate_window_secs: 2.0,
        }
    }
}

impl DiagnosticsConfig {
    pub fn duplicate_window(&self) -> chrono::Duration {
        chrono::Duration::milliseconds((self.duplicate_window_secs.max(0.0) * 1_000.0) as i64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub timeline: TimelineConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    #[serde(default)]
    pub weights: SeverityWeights,
}

impl Config {
    pub fn cato_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".cato"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::cato_dir()?.join("cato.toml"))
    }

    /// Load `~/.cato/cato.toml`, falling back to defaults when absent.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        clog_debug!("Config::load path={}", path.display());
        if !path.exists() {
            clog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config = Self::from_toml_str(&fs::read_to_string(path)?).map_err(|e| {
            clog_error!("Config::load {} rejected: {}", path.display(), e);
            e
        })?;
        clog_debug!(
            "Config loaded: exponent={}, tick_interval_ms={}, speed={}, bottleneck_threshold={}",
            config.timeline.exponent,
            config.playback.tick_interval_ms,
            config.playback.speed,
            config.diagnostics.bottleneck_threshold
        );
        Ok(config)
    }

    /// Parse and validate.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        clog_debug!("Config::save path={}", path.display());
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                clog_debug!("Creating config directory: {}", parent.display());
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        clog_debug!("Config saved to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        TimeScale::new(self.timeline.exponent)?;
        if self.playback.tick_interval_ms == 0 {
            return Err(Error::Validation(
                "playback.tick_interval_ms must be greater than 0".to_string(),
            ));
        }
        if !(self.playback.speed.is_finite() && self.playback.speed > 0.0) {
            return Err(Error::Validation(format!(
                "playback.speed must be finite and positive, got {}",
                self.playback.speed
            )));
        }
        if self.diagnostics.bottleneck_threshold == 0 {
            return Err(Error::Validation(
                "diagnostics.bottleneck_threshold must be at least 1".to_string(),
            ));
        }
        if !(self.diagnostics.duplicate_window_secs.is_finite()
            && self.diagnostics.duplicate_window_secs >= 0.0)
        {
            return Err(Error::Validation(format!(
                "diagnostics.duplicate_window_secs must be finite and non-negative, got {}",
                self.diagnostics.duplicate_window_secs
            )));
        }
        Ok(())
    }

    /// Scale for the configured exponent, default scale if it is unusable.
    pub fn time_scale(&self) -> TimeScale {
        TimeScale::new(self.timeline.exponent).unwrap_or_default()
    }

    pub fn analyzer(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            bottleneck_threshold: self.diagnostics.bottleneck_threshold.max(1),
        }
    }
}
