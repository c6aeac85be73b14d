//! Shows the activity settings in effect.

use crate::libs::config::{Config, CONFIG_FILE_NAME};
use crate::libs::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::libs::view::View;
use crate::{msg_info, msg_print};
use anyhow::Result;

pub fn cmd() -> Result<()> {
    let config = Config::read()?;
    let path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;

    if config.activity.is_none() {
        msg_info!(Message::ConfigDefaultsInUse);
    }
    msg_print!(Message::ConfigShowHeader(path.display().to_string()), true);
    View::activity_config(&config.activity_or_default());
    Ok(())
}
