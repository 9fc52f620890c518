//! vstlog infrastructure
//!
//! Host-dependent implementations of the core seams. Currently the PNG chart
//! renderer built on `plotters`.

pub mod plot;

pub use plot::PlottersVisualizer;
