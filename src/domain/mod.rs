//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw and cleaned rows (`RawRow`, `Observation`) and the ordered `Series`
//! - forecast outputs (`FittedModel`, `FittedPoint`, `Projection`)
//! - run configuration and the saved forecast schema

pub mod types;

pub use types::*;
