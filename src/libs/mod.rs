//! Core library modules for kaslmon.
//!
//! - **Classification**: [`activity`] state machine, [`clock`] sources, [`listener`]s
//! - **Input**: [`input`] capability traits and the [`rdev_input`] platform source
//! - **Application**: [`config`], [`data_storage`], [`messages`], [`view`], [`watcher`]

pub mod activity;
pub mod clock;
pub mod config;
pub mod data_storage;
pub mod input;
pub mod listener;
pub mod messages;
pub mod rdev_input;
pub mod view;
pub mod watcher;
