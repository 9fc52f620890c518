//! vstlog core library
//!
//! Parsing and analysis of the real-time event log written by the
//! AMNEZIAGAZE audio plugin:
//! - typed log records and the CSV loader
//! - clipping, parameter, audio level and effect state analyzers
//! - text and JSON report rendering
//! - analyzer configuration
//! - plot data preparation and the `Visualizer` seam

pub mod domain;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
