//! # Kaslmon - Key Activity Sensing for kasl break reminders
//!
//! Classifies keyboard and mouse input into a coarse, debounced activity
//! state that a break reminder can poll to decide whether the user is working.
//!
//! ## Features
//!
//! - **Activity Classification**: Suspended, idle, noise and active states with hysteresis
//! - **Input Hooks**: Keyboard, pointer, button and wheel events through `rdev`
//! - **Degraded Mode**: Runs without any input source when none is available
//! - **Clock Correction**: Timestamps follow wall-clock adjustments
//! - **Configuration**: Thresholds persisted as JSON, set up interactively
//!
//! ## Usage
//!
//! ```rust,no_run
//! use kaslmon::commands::Cli;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Cli::menu().await
//! }
//! ```

pub mod commands;
pub mod libs;
