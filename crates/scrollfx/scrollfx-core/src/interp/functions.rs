//! Easing curve helpers.
//!
//! Every curve maps progress `p` in [0, 1] to eased progress with
//! `f(0) == 0` and `f(1) == 1`, and is non-decreasing on that range.

use std::f64::consts::PI;

/// Linear interpolation of scalars.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[inline]
pub fn linear(p: f64) -> f64 {
    p
}

/// The classic "swing" ease-in/out: half a cosine period.
#[inline]
pub fn swing(p: f64) -> f64 {
    0.5 - (p * PI).cos() / 2.0
}

#[inline]
pub fn ease_in_quad(p: f64) -> f64 {
    p * p
}

#[inline]
pub fn ease_out_quad(p: f64) -> f64 {
    p * (2.0 - p)
}

#[inline]
pub fn ease_in_out_quad(p: f64) -> f64 {
    if p < 0.5 {
        2.0 * p * p
    } else {
        -1.0 + (4.0 - 2.0 * p) * p
    }
}

#[inline]
pub fn ease_in_out_cubic(p: f64) -> f64 {
    if p < 0.5 {
        4.0 * p * p * p
    } else {
        let u = -2.0 * p + 2.0;
        1.0 - (u * u * u) / 2.0
    }
}
