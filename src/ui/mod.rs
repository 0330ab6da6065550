//! Rendering layer: filter/side panels, top bar, and the chart grid.
//! Consumes the pipeline's plain data structures; no analytics of its own.

pub mod charts;
pub mod panels;
