use cgmath::Point2;
use fixgeom::{to_f64, Transform6};
use std::sync::Arc;

use super::{GradientColorMap, PaintSpace};

/// A linear gradient running from `p0` (fraction 0) to `p1` (fraction 1) in
/// paint space.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    p0: Point2<i32>,
    p1: Point2<i32>,
    map: Arc<GradientColorMap>,
    space: PaintSpace,
    /// `fraction(px, py) = mx·px + my·py + b` in S15.16, for the pixel
    /// whose top-left corner is `(px, py)`. `None` if degenerate.
    coefs: Option<[i64; 3]>,
}

impl LinearGradient {
    pub fn new(
        p0: Point2<i32>,
        p1: Point2<i32>,
        map: Arc<GradientColorMap>,
        paint_xform: Transform6,
    ) -> Self {
        let mut this = Self {
            p0,
            p1,
            map,
            space: PaintSpace::new(paint_xform),
            coefs: None,
        };
        this.compute_coefs();
        this
    }

    pub fn color_map(&self) -> &Arc<GradientColorMap> {
        &self.map
    }

    pub fn space(&self) -> &PaintSpace {
        &self.space
    }

    pub fn is_degenerate(&self) -> bool {
        self.coefs.is_none()
    }

    pub fn set_drawing_transform(&mut self, drawing: &Transform6) {
        self.space.update(drawing);
        self.compute_coefs();
    }

    fn compute_coefs(&mut self) {
        self.coefs = None;

        let vx = to_f64(self.p1.x) - to_f64(self.p0.x);
        let vy = to_f64(self.p1.y) - to_f64(self.p0.y);
        let len_sq = vx * vx + vy * vy;
        if len_sq == 0.0 {
            return;
        }
        let inv = match self.space.inverse() {
            Some(inv) => inv,
            None => return,
        };
        let (a, b, c, d) = (to_f64(inv.m00), to_f64(inv.m01), to_f64(inv.m10), to_f64(inv.m11));
        let (e, f) = (to_f64(inv.m02), to_f64(inv.m12));

        // Project the paint-space position onto the gradient vector
        let mx = (vx * a + vy * c) / len_sq;
        let my = (vx * b + vy * d) / len_sq;
        let b0 = (vx * (e - to_f64(self.p0.x)) + vy * (f - to_f64(self.p0.y))) / len_sq;
        // Sample at pixel centers
        let b0 = b0 + 0.5 * (mx + my);

        let q = |x: f64| (x * 65536.0).round() as i64;
        self.coefs = Some([q(mx), q(my), q(b0)]);
    }

    pub fn paint_row(&self, x: i32, y: i32, dst: &mut [u32]) {
        let [mx, my, b] = match self.coefs {
            Some(c) => c,
            None => return,
        };
        let mut frac = x as i64 * mx + y as i64 * my + b;
        for p in dst.iter_mut() {
            *p = self.map.lookup(frac);
            frac += mx;
        }
    }
}
