//! Character-grid conversion engine for glyphgrid.
//!
//! Plans the grid, classifies cells as edges or luminance glyphs, quantizes
//! their color and writes rows to an output sink.

pub mod color_map;
pub mod dimensions;
pub mod edge;
pub mod luminance;
pub mod renderer;
