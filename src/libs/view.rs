use super::config::ActivityConfig;
use prettytable::{row, Table};

pub struct View {}

impl View {
    /// Prints the activity settings as a two-column table.
    pub fn activity_config(config: &ActivityConfig) {
        let mut table = Table::new();

        table.add_row(row!["SETTING", "VALUE"]);
        table.add_row(row!["Noise threshold", format!("{} ms", config.noise_threshold)]);
        table.add_row(row!["Activity threshold", format!("{} ms", config.activity_threshold)]);
        table.add_row(row!["Idle threshold", format!("{} ms", config.idle_threshold)]);
        table.add_row(row!["Sensitivity", format!("{} px", config.sensitivity)]);
        table.add_row(row!["Poll interval", format!("{} ms", config.poll_interval)]);
        table.printstd();
    }
}
