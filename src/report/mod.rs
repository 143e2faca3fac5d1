//! Reporting utilities: formatted terminal output for the batch commands.

pub mod format;

pub use format::*;
