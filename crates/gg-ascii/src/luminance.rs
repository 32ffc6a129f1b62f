use gg_core::numeric::round_half_up;

/// Palette level for a cell.
///
/// `levels` is the highest palette index. The luminance position is
/// `round(levels × y)`, forced to 0 when `blank` is set (edges-only mode).
/// Without `invert` the scale is reversed so dark pixels get dense glyphs.
/// Alpha then pulls the level toward 0, the transparent end.
///
/// # Example
/// ```
/// use gg_ascii::luminance::palette_index;
/// assert_eq!(palette_index(3, 0.0, 1.0, false, false), 3);
/// assert_eq!(palette_index(3, 1.0, 1.0, false, false), 0);
/// assert_eq!(palette_index(3, 1.0, 1.0, true, false), 3);
/// assert_eq!(palette_index(3, 0.0, 0.0, false, false), 0);
/// ```
#[inline(always)]
#[must_use]
pub fn palette_index(levels: usize, y: f32, a: f32, invert: bool, blank: bool) -> usize {
    let top = levels as i32;
    let pos = if blank {
        0
    } else {
        round_half_up(levels as f32 * y)
    };
    let level = if invert { pos } else { top - pos };
    round_half_up(level as f32 * a).clamp(0, top) as usize
}
