//! User-facing messages and the `msg_*` output macros.
//!
//! Every line kaslmon prints is a [`Message`] variant rendered through its
//! `Display` implementation. The macros in [`macros`] decide whether it goes
//! to the console or to the tracing subscriber.

pub mod display;
pub mod macros;
pub mod types;

pub use types::Message;
