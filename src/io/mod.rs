//! Input/output helpers.
//!
//! - CSV ingest + cleaning (`ingest`)
//! - cleaned series export to CSV (`export`)
//! - forecast JSON read/write (`forecast`)

pub mod export;
pub mod forecast;
pub mod ingest;

pub use export::*;
pub use forecast::*;
pub use ingest::*;
