use cgmath::{prelude::*, Matrix3, Point2, Vector2, Vector3};

use super::{clamp_i64, from_f64, to_f64, FRAC_BITS, ONE};

/// A 2D affine transformation with fixed-point coefficients.
///
/// Maps `(x, y)` to `(m00·x + m01·y + m02, m10·x + m11·y + m12)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transform6 {
    pub m00: i32,
    pub m01: i32,
    pub m10: i32,
    pub m11: i32,
    pub m02: i32,
    pub m12: i32,
}

impl Default for Transform6 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform6 {
    #[inline]
    pub const fn new(m00: i32, m01: i32, m10: i32, m11: i32, m02: i32, m12: i32) -> Self {
        Self {
            m00,
            m01,
            m10,
            m11,
            m02,
            m12,
        }
    }

    #[inline]
    pub const fn identity() -> Self {
        Self::new(ONE, 0, 0, ONE, 0, 0)
    }

    #[inline]
    pub const fn translation(tx: i32, ty: i32) -> Self {
        Self::new(ONE, 0, 0, ONE, tx, ty)
    }

    #[inline]
    pub const fn scale(sx: i32, sy: i32) -> Self {
        Self::new(sx, 0, 0, sy, 0, 0)
    }

    /// Construct a rotation by `theta` radians.
    pub fn rotation(theta: f64) -> Self {
        let (s, c) = theta.sin_cos();
        Self::new(from_f64(c), from_f64(-s), from_f64(s), from_f64(c), 0, 0)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Return `true` if the linear part is a (possibly negative) scaling
    /// that keeps axis-aligned boxes axis-aligned.
    pub fn is_axis_aligned(&self) -> bool {
        self.m01 == 0 && self.m10 == 0
    }

    /// Compose two transformations. The resulting transformation applies
    /// `inner` first, then `self`.
    pub fn concat(&self, inner: &Self) -> Self {
        let a = self;
        let b = inner;
        let dot = |x0: i32, y0: i32, x1: i32, y1: i32| {
            (x0 as i64 * x1 as i64 + y0 as i64 * y1 as i64) >> FRAC_BITS
        };
        Self::new(
            clamp_i64(dot(a.m00, a.m01, b.m00, b.m10)),
            clamp_i64(dot(a.m00, a.m01, b.m01, b.m11)),
            clamp_i64(dot(a.m10, a.m11, b.m00, b.m10)),
            clamp_i64(dot(a.m10, a.m11, b.m01, b.m11)),
            clamp_i64(dot(a.m00, a.m01, b.m02, b.m12) + a.m02 as i64),
            clamp_i64(dot(a.m10, a.m11, b.m02, b.m12) + a.m12 as i64),
        )
    }

    /// Compute the inverse transformation. The inversion is done in
    /// floating point and requantized.
    ///
    /// Returns `None` if the transformation is singular.
    pub fn inverse(&self) -> Option<Self> {
        let m: Matrix3<f64> = (*self).into();
        let inv = m.invert()?;
        if [inv.x.x, inv.y.x, inv.x.y, inv.y.y, inv.z.x, inv.z.y]
            .iter()
            .any(|x| !x.is_finite())
        {
            return None;
        }
        Some(Self::from_matrix3(&inv))
    }

    pub fn determinant(&self) -> f64 {
        to_f64(self.m00) * to_f64(self.m11) - to_f64(self.m01) * to_f64(self.m10)
    }

    /// Construct a `Transform6` from the first two rows of a homogeneous
    /// transformation matrix.
    pub fn from_matrix3(m: &Matrix3<f64>) -> Self {
        Self::new(
            from_f64(m.x.x),
            from_f64(m.y.x),
            from_f64(m.x.y),
            from_f64(m.y.y),
            from_f64(m.z.x),
            from_f64(m.z.y),
        )
    }

    /// Apply the transformation to a point. Saturates on overflow.
    #[inline]
    pub fn transform_point(&self, p: Point2<i32>) -> Point2<i32> {
        let (x, y) = (p.x as i64, p.y as i64);
        Point2::new(
            clamp_i64(((self.m00 as i64 * x + self.m01 as i64 * y) >> FRAC_BITS) + self.m02 as i64),
            clamp_i64(((self.m10 as i64 * x + self.m11 as i64 * y) >> FRAC_BITS) + self.m12 as i64),
        )
    }

    /// Apply the linear part of the transformation to a vector.
    #[inline]
    pub fn transform_vector(&self, v: Vector2<i32>) -> Vector2<i32> {
        let (x, y) = (v.x as i64, v.y as i64);
        Vector2::new(
            clamp_i64((self.m00 as i64 * x + self.m01 as i64 * y) >> FRAC_BITS),
            clamp_i64((self.m10 as i64 * x + self.m11 as i64 * y) >> FRAC_BITS),
        )
    }

    /// Apply the linear part of the transformation to a floating-point
    /// vector.
    #[inline]
    pub fn transform_vector_f64(&self, v: Vector2<f64>) -> Vector2<f64> {
        Vector2::new(
            to_f64(self.m00) * v.x + to_f64(self.m01) * v.y,
            to_f64(self.m10) * v.x + to_f64(self.m11) * v.y,
        )
    }
}

impl From<Transform6> for Matrix3<f64> {
    fn from(t: Transform6) -> Self {
        Matrix3::from_cols(
            Vector3::new(to_f64(t.m00), to_f64(t.m10), 0.0),
            Vector3::new(to_f64(t.m01), to_f64(t.m11), 0.0),
            Vector3::new(to_f64(t.m02), to_f64(t.m12), 1.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::from_int;
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;

    #[test]
    fn concat_order() {
        let t = Transform6::translation(from_int(10), 0);
        let s = Transform6::scale(from_int(2), from_int(2));
        let p = Point2::new(from_int(1), from_int(1));

        // scale first, then translate
        assert_eq!(
            t.concat(&s).transform_point(p),
            Point2::new(from_int(12), from_int(2))
        );
        // translate first, then scale
        assert_eq!(
            s.concat(&t).transform_point(p),
            Point2::new(from_int(22), from_int(2))
        );
    }

    #[test]
    fn singular() {
        assert_eq!(Transform6::scale(0, ONE).inverse(), None);
    }

    #[test]
    fn inverse_of_translation() {
        let t = Transform6::translation(from_int(5), -from_int(7));
        assert_eq!(
            t.inverse(),
            Some(Transform6::translation(-from_int(5), from_int(7)))
        );
    }

    #[quickcheck]
    fn inverse_round_trip(scale: u8, angle: u8, tx: i8, ty: i8, px: i8, py: i8) -> TestResult {
        if scale == 0 {
            return TestResult::discard();
        }
        let xform = Transform6::translation(from_int(tx.into()), from_int(ty.into()))
            .concat(&Transform6::rotation(angle as f64 * 0.1))
            .concat(&Transform6::scale(
                from_int(scale.into()) / 16 + ONE,
                from_int(scale.into()) / 16 + ONE,
            ));
        let inv = xform.inverse().unwrap();

        let p = Point2::new(from_int(px.into()) / 3, from_int(py.into()) / 3);
        let q = inv.transform_point(xform.transform_point(p));

        // Requantization error stays within a fraction of a pixel
        let tol = ONE / 4;
        if (p.x - q.x).abs() > tol || (p.y - q.y).abs() > tol {
            TestResult::error(format!("{:?} → {:?}", p, q))
        } else {
            TestResult::passed()
        }
    }
}
