//! Configuration, types, and shared structures for glyphgrid.
//!
//! This crate holds the types every stage of the pipeline agrees on: the
//! render configuration, the palette, the raster produced by the resampler,
//! the orientation mapper and the collaborator traits.

pub mod color;
pub mod config;
pub mod error;
pub mod numeric;
pub mod orientation;
pub mod palette;
pub mod raster;
pub mod source;
pub mod traits;

pub use color::{ColorSample, LuminanceWeights, Rgb};
pub use config::RenderConfig;
pub use error::CoreError;
pub use orientation::{Orientation, Transform};
pub use palette::Palette;
pub use raster::Raster;
pub use source::SourceHeader;
