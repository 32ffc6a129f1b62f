//! Image sources for glyphgrid: decoding and streaming box-filter resampling.

pub mod decode;
pub mod resample;
