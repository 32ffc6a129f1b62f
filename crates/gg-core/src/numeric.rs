/// Half-up rounding used by every quantization step: `(x + 0.5)` truncated.
///
/// Differs from [`f32::round`] for negative inputs, which never occur on the
/// values this crate rounds (all of them are scaled `[0, 1]` samples or sizes).
///
/// # Example
/// ```
/// use gg_core::numeric::round_half_up;
/// assert_eq!(round_half_up(2.5), 3);
/// assert_eq!(round_half_up(2.49), 2);
/// assert_eq!(round_half_up(0.0), 0);
/// ```
#[inline(always)]
#[must_use]
pub fn round_half_up(x: f32) -> i32 {
    (0.5 + x) as i32
}

/// [`round_half_up`] clamped into `u8`, for 0..=255 color channels.
///
/// # Example
/// ```
/// use gg_core::numeric::round_u8;
/// assert_eq!(round_u8(255.0 * 1.0), 255);
/// assert_eq!(round_u8(300.0), 255);
/// ```
#[inline(always)]
#[must_use]
pub fn round_u8(x: f32) -> u8 {
    round_half_up(x).clamp(0, 255) as u8
}
