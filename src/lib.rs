pub mod api;
pub mod config;
pub mod cursor;
pub mod history;
pub mod logging;
pub mod models;
pub mod ranking;
pub mod report;
pub mod source;
