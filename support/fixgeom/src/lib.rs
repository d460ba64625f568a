//! Fixed-point geometry for software rasterization.
//!
//! Scalars are raw `i32` values interpreted as S15.16 fixed-point numbers,
//! i.e., `FRAC_BITS` fractional bits. Points are carried as
//! `cgmath::Point2<i32>` so that the usual `cgmath` vocabulary applies to
//! them without a dedicated scalar type.
pub extern crate cgmath;

use cgmath::Point2;

mod boxes;
mod xform;

pub use self::boxes::*;
pub use self::xform::*;

/// The number of fractional bits of a fixed-point scalar.
pub const FRAC_BITS: u32 = 16;

/// `1.0` in fixed point.
pub const ONE: i32 = 1 << FRAC_BITS;

/// `0.5` in fixed point.
pub const HALF: i32 = ONE >> 1;

/// Convert an integer to fixed point. Saturates on overflow.
#[inline]
pub fn from_int(x: i32) -> i32 {
    x.saturating_mul(ONE)
}

/// Convert an `f32` to fixed point, rounding to nearest. Saturates on
/// overflow; NaN maps to zero.
#[inline]
pub fn from_f32(x: f32) -> i32 {
    from_f64(x as f64)
}

/// Convert an `f64` to fixed point, rounding to nearest. Saturates on
/// overflow; NaN maps to zero.
#[inline]
pub fn from_f64(x: f64) -> i32 {
    let x = (x * ONE as f64).round();
    if x.is_nan() {
        0
    } else if x >= i32::max_value() as f64 {
        i32::max_value()
    } else if x <= i32::min_value() as f64 {
        i32::min_value()
    } else {
        x as i32
    }
}

#[inline]
pub fn to_f64(x: i32) -> f64 {
    x as f64 / ONE as f64
}

#[inline]
pub fn to_f32(x: i32) -> f32 {
    to_f64(x) as f32
}

/// The integral part of a fixed-point value (rounded toward negative
/// infinity).
#[inline]
pub fn floor(x: i32) -> i32 {
    x >> FRAC_BITS
}

/// Round up to the nearest integer.
#[inline]
pub fn ceil(x: i32) -> i32 {
    ((x as i64 + (ONE as i64 - 1)) >> FRAC_BITS) as i32
}

/// Multiply two fixed-point values.
#[inline]
pub fn mul(x: i32, y: i32) -> i32 {
    clamp_i64((x as i64 * y as i64) >> FRAC_BITS)
}

/// Divide two fixed-point values. Returns `None` if `y` is zero.
#[inline]
pub fn div(x: i32, y: i32) -> Option<i32> {
    if y == 0 {
        None
    } else {
        Some(clamp_i64(((x as i64) << FRAC_BITS) / y as i64))
    }
}

/// Narrow an `i64` to `i32`, saturating.
#[inline]
pub fn clamp_i64(x: i64) -> i32 {
    if x > i32::max_value() as i64 {
        i32::max_value()
    } else if x < i32::min_value() as i64 {
        i32::min_value()
    } else {
        x as i32
    }
}

/// Construct a fixed-point point from floating-point coordinates.
#[inline]
pub fn point_from_f32(x: f32, y: f32) -> Point2<i32> {
    Point2::new(from_f32(x), from_f32(y))
}

/// The prelude.
pub mod prelude {
    #[doc(no_inline)]
    pub use crate::{PixelBox, Transform6};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        assert_eq!(from_int(3), 3 << 16);
        assert_eq!(from_f32(1.5), 0x18000);
        assert_eq!(from_f32(-0.5), -0x8000);
        assert_eq!(from_f64(1.0e12), i32::max_value());
        assert_eq!(from_f64(std::f64::NAN), 0);
        assert_eq!(to_f64(0x28000), 2.5);
    }

    #[test]
    fn rounding() {
        assert_eq!(floor(0x18000), 1);
        assert_eq!(floor(-0x8000), -1);
        assert_eq!(ceil(0x18000), 2);
        assert_eq!(ceil(0x10000), 1);
        assert_eq!(ceil(-0x8000), 0);
    }

    #[test]
    fn arithmetic() {
        assert_eq!(mul(from_int(3), HALF), 0x18000);
        assert_eq!(div(from_int(3), from_int(2)), Some(0x18000));
        assert_eq!(div(ONE, 0), None);
        assert_eq!(mul(i32::max_value(), from_int(4)), i32::max_value());
    }
}
