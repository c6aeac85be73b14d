//! Runs the activity monitor in the foreground and prints state changes.

use crate::libs::activity::ActivityMonitor;
use crate::libs::clock::{Clock, SystemClock};
use crate::libs::config::Config;
use crate::libs::listener::ActivityCounter;
use crate::libs::messages::Message;
use crate::libs::rdev_input::RdevFactory;
use crate::libs::watcher::Watcher;
use crate::{msg_error, msg_info, msg_print, msg_warning};
use anyhow::Result;
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(short, long)]
    duration: Option<u64>,

    /// Do not hook keyboard and mouse input
    #[arg(long)]
    no_input: bool,
}

pub async fn cmd(args: WatchArgs) -> Result<()> {
    let activity = Config::read()?.activity_or_default();
    activity.validate()?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let monitor = if args.no_input {
        ActivityMonitor::detached(Arc::clone(&clock))
    } else {
        ActivityMonitor::new(&RdevFactory, Arc::clone(&clock))
    };
    if !monitor.has_input_source() {
        msg_warning!(Message::WatcherNoInputSource);
    }
    monitor.set_parameters(activity.parameters());

    let counter = Arc::new(ActivityCounter::new());
    let mut watcher = Watcher::new(Arc::clone(&monitor), counter, clock);
    msg_info!(Message::WatcherStarted);

    let deadline = async move {
        match args.duration {
            Some(secs) => {
                time::sleep(Duration::from_secs(secs)).await;
                secs
            }
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        _ = watcher.run(Duration::from_millis(activity.poll_interval)) => {}
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => msg_info!(Message::WatcherReceivedCtrlC),
            Err(e) => msg_error!(Message::WatcherCtrlCListenFailed(e.to_string())),
        },
        secs = deadline => msg_info!(Message::WatcherDurationElapsed(secs)),
    }

    msg_info!(Message::WatcherStopping);
    monitor.terminate();
    msg_print!(Message::WatcherSummary(watcher.total_events()));
    Ok(())
}
