//! `diffcast` library crate.
//!
//! The binary (`diffcast`) is a thin wrapper around this library so that:
//!
//! - the cleaning and forecast logic is testable without spawning processes
//! - the CLI report and the TUI share one pipeline
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod io;
pub mod logs;
pub mod math;
pub mod plot;
pub mod report;
pub mod tui;
