//! Collection of listen history over a trailing window.

pub mod collector;
pub mod log;

pub use collector::{collect_window, CollectOptions, CollectedWindow, HistoryError, StopReason};
pub use log::ListenLog;
