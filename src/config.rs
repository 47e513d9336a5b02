//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every section and every field has a default, so an empty file (or no file
//! at all) yields a working configuration.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{DualpadError, Result};
use crate::indicator::protocol::Brightness;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub profile: ProfileConfig,
    #[serde(default)]
    pub macros: MacroConfig,
    #[serde(default)]
    pub indicator: IndicatorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Controller device configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DeviceConfig {
    /// HID device path; empty means enumerate for a USB Sony controller
    #[serde(default)]
    pub path: String,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

/// Profile switch gesture configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ProfileConfig {
    #[serde(default = "default_hold_threshold_ms")]
    pub hold_threshold_ms: u64,

    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
}

/// Macro timing configuration
#[derive(Debug, Deserialize, Clone)]
pub struct MacroConfig {
    #[serde(default = "default_mute_pulse_ms")]
    pub mute_pulse_ms: u64,

    #[serde(default = "default_turbo_half_period_ms")]
    pub turbo_half_period_ms: u64,

    /// Added to the canonical right stick Y (0-65535 scale)
    #[serde(default = "default_anti_recoil_strength")]
    pub anti_recoil_strength: u16,

    /// Both raw trigger axes must exceed this (0-255)
    #[serde(default = "default_anti_recoil_trigger_threshold")]
    pub anti_recoil_trigger_threshold: u8,
}

/// Lightbar indicator configuration
#[derive(Debug, Deserialize, Clone)]
pub struct IndicatorConfig {
    #[serde(default = "default_attach_max_attempts")]
    pub attach_max_attempts: u32,

    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,

    #[serde(default)]
    pub brightness: Brightness,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily rolling log files; empty logs to stderr
    #[serde(default)]
    pub log_dir: String,
}

/// Canonical state output configuration
#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    /// "-" for stdout, empty to disable, otherwise a file path
    #[serde(default = "default_state_log")]
    pub state_log: String,
}

// Default value functions
fn default_poll_interval_ms() -> u64 { 1 }

fn default_hold_threshold_ms() -> u64 { 2000 }
fn default_cooldown_ms() -> u64 { 5000 }

fn default_mute_pulse_ms() -> u64 { 480 }
fn default_turbo_half_period_ms() -> u64 { 40 }
fn default_anti_recoil_strength() -> u16 { 4000 }
fn default_anti_recoil_trigger_threshold() -> u8 { 200 }

fn default_attach_max_attempts() -> u32 { 10 }
fn default_retry_interval_ms() -> u64 { 20 }

fn default_log_level() -> String { "info".to_string() }
fn default_state_log() -> String { "-".to_string() }

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            hold_threshold_ms: default_hold_threshold_ms(),
            cooldown_ms: default_cooldown_ms(),
        }
    }
}

impl Default for MacroConfig {
    fn default() -> Self {
        Self {
            mute_pulse_ms: default_mute_pulse_ms(),
            turbo_half_period_ms: default_turbo_half_period_ms(),
            anti_recoil_strength: default_anti_recoil_strength(),
            anti_recoil_trigger_threshold: default_anti_recoil_trigger_threshold(),
        }
    }
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            attach_max_attempts: default_attach_max_attempts(),
            retry_interval_ms: default_retry_interval_ms(),
            brightness: Brightness::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: String::new(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            state_log: default_state_log(),
        }
    }
}

impl ProfileConfig {
    pub fn hold_threshold(&self) -> Duration {
        Duration::from_millis(self.hold_threshold_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

impl MacroConfig {
    pub fn mute_pulse(&self) -> Duration {
        Duration::from_millis(self.mute_pulse_ms)
    }

    pub fn turbo_half_period(&self) -> Duration {
        Duration::from_millis(self.turbo_half_period_ms)
    }
}

impl IndicatorConfig {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dualpad_host::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.device.poll_interval_ms == 0 || self.device.poll_interval_ms > 100 {
            return Err(invalid("poll_interval_ms must be between 1 and 100"));
        }

        // Gesture and macro timings
        for (name, value) in [
            ("hold_threshold_ms", self.profile.hold_threshold_ms),
            ("cooldown_ms", self.profile.cooldown_ms),
            ("mute_pulse_ms", self.macros.mute_pulse_ms),
            ("turbo_half_period_ms", self.macros.turbo_half_period_ms),
        ] {
            if value == 0 || value > 10000 {
                return Err(invalid(format!("{} must be between 1 and 10000", name)));
            }
        }

        if self.macros.anti_recoil_trigger_threshold == u8::MAX {
            return Err(invalid("anti_recoil_trigger_threshold must be below 255"));
        }

        if self.indicator.attach_max_attempts == 0 || self.indicator.attach_max_attempts > 100 {
            return Err(invalid("attach_max_attempts must be between 1 and 100"));
        }

        if self.indicator.retry_interval_ms > 1000 {
            return Err(invalid("retry_interval_ms must be at most 1000"));
        }

        if !["trace", "debug", "info", "warn", "error"].contains(&self.logging.level.as_str()) {
            return Err(invalid(
                "log level must be one of: trace, debug, info, warn, error",
            ));
        }

        Ok(())
    }
}

fn invalid(msg: impl std::fmt::Display) -> DualpadError {
    DualpadError::Config(toml::de::Error::custom(msg))
}
