#[derive(Debug, Clone)]
pub enum Message {
    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigDeleted,
    ConfigNotFound,
    ConfigModuleActivity,
    ConfigParseError(String),  // error
    ConfigInvalidPollInterval, // poll interval of zero
    ConfigShowHeader(String),  // config file path
    ConfigDefaultsInUse,

    // === PROMPTS ===
    PromptNoiseThreshold,
    PromptActivityThreshold,
    PromptIdleThreshold,
    PromptSensitivity,
    PromptPollInterval,

    // === WATCHER MESSAGES ===
    WatcherStarted,
    WatcherNoInputSource,
    WatcherReceivedCtrlC,
    WatcherCtrlCListenFailed(String), // error
    WatcherDurationElapsed(u64),      // seconds
    WatcherStopping,
    WatcherSummary(u64), // events seen

    // === ACTIVITY MESSAGES ===
    ActivityStateChanged(String, String), // from, to
    ActivityEvents(u64),
    ClockShifted(i64), // seconds
}
