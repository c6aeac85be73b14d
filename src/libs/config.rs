//! Configuration management for kaslmon.
//!
//! The activity monitor itself never touches the filesystem. Its thresholds
//! are persisted here, in milliseconds, and handed to
//! [`ActivityMonitor::set_parameters`](crate::libs::activity::ActivityMonitor::set_parameters)
//! by the commands.
//!
//! ## Storage
//!
//! The configuration is a JSON file in the platform data directory:
//! - **Windows**: `%LOCALAPPDATA%\lacodda\kaslmon\config.json`
//! - **macOS**: `~/Library/Application Support/lacodda/kaslmon/config.json`
//! - **Linux**: `~/.local/share/lacodda/kaslmon/config.json`
//!
//! ```rust,no_run
//! use kaslmon::libs::config::Config;
//!
//! let config = Config::read()?;
//! let activity = config.activity.unwrap_or_default();
//! println!("idle after {} ms", activity.idle_threshold);
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::data_storage::DataStorage;
use crate::libs::activity::ActivityParameters;
use crate::libs::messages::Message;
use crate::{msg_bail_anyhow, msg_error_anyhow, msg_print};
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Input};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};

/// Configuration file name inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Activity monitor settings.
///
/// All durations are milliseconds.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ActivityConfig {
    /// Longest gap between two input events that still belong to one burst.
    ///
    /// A longer gap restarts the burst, so scattered single events (a bumped
    /// mouse, a stray key) never add up to activity.
    pub noise_threshold: u64,

    /// How long a burst must last before the user counts as active.
    ///
    /// Zero makes the first event confirm activity immediately.
    pub activity_threshold: u64,

    /// Silence after which an active user counts as idle.
    pub idle_threshold: u64,

    /// Minimum pointer travel in pixels for a mouse move to count.
    pub sensitivity: u32,

    /// How often the watcher queries the monitor state.
    pub poll_interval: u64,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        let params = ActivityParameters::default();
        ActivityConfig {
            noise_threshold: params.noise,
            activity_threshold: params.activity,
            idle_threshold: params.idle,
            sensitivity: params.sensitivity,
            poll_interval: 500,
        }
    }
}

impl ActivityConfig {
    /// Thresholds in the form the activity monitor accepts.
    pub fn parameters(&self) -> ActivityParameters {
        ActivityParameters {
            noise: self.noise_threshold,
            activity: self.activity_threshold,
            idle: self.idle_threshold,
            sensitivity: self.sensitivity,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval == 0 {
            msg_bail_anyhow!(Message::ConfigInvalidPollInterval);
        }
        Ok(())
    }
}

/// Root configuration object.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    /// Activity monitor settings, omitted when never configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<ActivityConfig>,
}

impl Config {
    /// Reads the configuration, falling back to defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn read() -> Result<Config> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        if !config_file_path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(config_file_path)?;
        let config: Config = serde_json::from_str(&config_str).map_err(|e| msg_error_anyhow!(Message::ConfigParseError(e.to_string())))?;
        Ok(config)
    }

    /// Writes the configuration as pretty-printed JSON.
    pub fn save(&self) -> Result<()> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        let config_file = File::create(config_file_path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Removes the configuration file. Returns `false` if there was none.
    pub fn delete() -> Result<bool> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        if !config_file_path.exists() {
            return Ok(false);
        }
        fs::remove_file(config_file_path)?;
        Ok(true)
    }

    /// The activity settings in effect: configured values or defaults.
    pub fn activity_or_default(&self) -> ActivityConfig {
        self.activity.clone().unwrap_or_default()
    }

    /// Runs the interactive setup, prefilled with the current values.
    pub fn init() -> Result<Self> {
        // A broken file should not block reconfiguration.
        let mut config = Self::read().unwrap_or_default();
        let default = config.activity_or_default();

        msg_print!(Message::ConfigModuleActivity);
        let activity = ActivityConfig {
            noise_threshold: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptNoiseThreshold.to_string())
                .default(default.noise_threshold)
                .interact_text()?,
            activity_threshold: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptActivityThreshold.to_string())
                .default(default.activity_threshold)
                .interact_text()?,
            idle_threshold: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptIdleThreshold.to_string())
                .default(default.idle_threshold)
                .interact_text()?,
            sensitivity: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptSensitivity.to_string())
                .default(default.sensitivity)
                .interact_text()?,
            poll_interval: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptPollInterval.to_string())
                .default(default.poll_interval)
                .interact_text()?,
        };
        activity.validate()?;

        config.activity = Some(activity);
        Ok(config)
    }
}
