//! Forecast & projection engine.
//!
//! Responsibilities:
//!
//! - fit the linear difficulty trend and evaluate it over the observed dates
//! - compute the two what-if projections from the latest observation
//!
//! Every function here is pure over `(Series, inputs)`.

pub mod projection;
pub mod trend;

pub use projection::*;
pub use trend::*;
