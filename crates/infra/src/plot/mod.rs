//! Chart rendering using plotters
//!
//! Draws with the bitmap backend and a TrueType font discovered on the host:
//! - `parameter_changes.png`: parameter values over time
//! - `clipping_events.png`: clipping values per component
//! - `audio_levels.png`: input and output amplitude, one panel per component

pub mod fonts;
pub mod plotters_backend;

pub use plotters_backend::*;
