//! Output sinks for glyphgrid.
//!
//! A terminal sink that writes glyphs and escapes verbatim, and markup sinks
//! that wrap the grid in an HTML or XHTML document.

pub mod markup;
pub mod terminal;
