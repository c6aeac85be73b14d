//! Display implementation for kaslmon messages.
//!
//! All message text lives in this one match so wording stays consistent
//! between the console and the log output.

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = match self {
            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigDeleted => "Configuration removed, defaults will be used".to_string(),
            Message::ConfigNotFound => "No configuration file found".to_string(),
            Message::ConfigModuleActivity => "Activity monitor settings".to_string(),
            Message::ConfigParseError(error) => format!("Failed to parse configuration: {}", error),
            Message::ConfigInvalidPollInterval => "Poll interval must be greater than zero".to_string(),
            Message::ConfigShowHeader(path) => format!("Activity monitor settings ({})", path),
            Message::ConfigDefaultsInUse => "Activity monitor is not configured, showing defaults".to_string(),

            // === PROMPTS ===
            Message::PromptNoiseThreshold => "Longest gap between events of one burst (ms)".to_string(),
            Message::PromptActivityThreshold => "Burst length before the user counts as active (ms)".to_string(),
            Message::PromptIdleThreshold => "Silence before an active user counts as idle (ms)".to_string(),
            Message::PromptSensitivity => "Minimum mouse travel to count as activity (px)".to_string(),
            Message::PromptPollInterval => "State polling interval (ms)".to_string(),

            // === WATCHER MESSAGES ===
            Message::WatcherStarted => "Watching activity, press Ctrl-C to stop".to_string(),
            Message::WatcherNoInputSource => "No input source available, state will stay idle".to_string(),
            Message::WatcherReceivedCtrlC => "Received Ctrl-C".to_string(),
            Message::WatcherCtrlCListenFailed(error) => format!("Failed to listen for Ctrl-C: {}", error),
            Message::WatcherDurationElapsed(secs) => format!("Watch duration of {}s elapsed", secs),
            Message::WatcherStopping => "Stopping activity watcher".to_string(),
            Message::WatcherSummary(events) => format!("Processed {} input event(s)", events),

            // === ACTIVITY MESSAGES ===
            Message::ActivityStateChanged(from, to) => format!("Activity: {} -> {}", from, to),
            Message::ActivityEvents(count) => format!("{} input event(s) since last change", count),
            Message::ClockShifted(secs) => format!("System clock moved by {}s, timestamps adjusted", secs),
        };
        write!(f, "{}", text)
    }
}
