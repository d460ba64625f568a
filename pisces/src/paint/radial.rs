use cgmath::{prelude::*, Point2, Vector2};
use fixgeom::{to_f64, Transform6};
use std::sync::Arc;

use super::{GradientColorMap, PaintSpace};

/// The focus is kept strictly inside the circle so that every ray from it
/// intersects the circle exactly once.
const MAX_FOCUS_RATIO: f64 = 0.97;

/// A radial gradient. The fraction is `0` at the focus and `1` on the circle
/// centered at `center` with the given radius, and varies linearly along
/// each ray from the focus.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    center: Point2<i32>,
    focus: Point2<i32>,
    radius: i32,
    map: Arc<GradientColorMap>,
    space: PaintSpace,
    setup: Option<Setup>,
}

/// Per-transform values in floating point.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Setup {
    /// Device space to paint space; `[m00, m01, m10, m11, m02, m12]`
    inv: [f64; 6],
    focus: Vector2<f64>,
    /// `focus - center`
    offset: Vector2<f64>,
    /// `radius² - |offset|²`, always positive
    denom: f64,
}

impl RadialGradient {
    pub fn new(
        center: Point2<i32>,
        focus: Point2<i32>,
        radius: i32,
        map: Arc<GradientColorMap>,
        paint_xform: Transform6,
    ) -> Self {
        let mut this = Self {
            center,
            focus,
            radius,
            map,
            space: PaintSpace::new(paint_xform),
            setup: None,
        };
        this.compute_setup();
        this
    }

    pub fn color_map(&self) -> &Arc<GradientColorMap> {
        &self.map
    }

    pub fn space(&self) -> &PaintSpace {
        &self.space
    }

    pub fn is_degenerate(&self) -> bool {
        self.setup.is_none()
    }

    pub fn set_drawing_transform(&mut self, drawing: &Transform6) {
        self.space.update(drawing);
        self.compute_setup();
    }

    fn compute_setup(&mut self) {
        self.setup = None;

        let r = to_f64(self.radius);
        if r <= 0.0 {
            return;
        }
        let inv = match self.space.inverse() {
            Some(inv) => inv,
            None => return,
        };

        let center = Vector2::new(to_f64(self.center.x), to_f64(self.center.y));
        let mut offset = Vector2::new(to_f64(self.focus.x), to_f64(self.focus.y)) - center;
        let dist = offset.magnitude();
        if dist > r * MAX_FOCUS_RATIO {
            offset *= r * MAX_FOCUS_RATIO / dist;
        }

        self.setup = Some(Setup {
            inv: [
                to_f64(inv.m00),
                to_f64(inv.m01),
                to_f64(inv.m10),
                to_f64(inv.m11),
                to_f64(inv.m02),
                to_f64(inv.m12),
            ],
            focus: center + offset,
            offset,
            denom: r * r - offset.magnitude2(),
        });
    }

    pub fn paint_row(&self, x: i32, y: i32, dst: &mut [u32]) {
        let s = match &self.setup {
            Some(s) => s,
            None => return,
        };
        let [a00, a01, a10, a11, a02, a12] = s.inv;

        // Paint-space position of the first pixel center, relative to the
        // focus
        let (px, py) = (x as f64 + 0.5, y as f64 + 0.5);
        let d = Vector2::new(a00 * px + a01 * py + a02, a10 * px + a11 * py + a12) - s.focus;
        let step = Vector2::new(a00, a10);

        // The positive root `t` of `|offset + t·d| = radius` gives the
        // fraction `1 / t = U + sqrt(V)`, where
        //
        //     U = (offset·d) / denom
        //     V = ((offset·d)² + |d|²·denom) / denom²
        //
        // `U` is linear and `V` quadratic in the pixel index, so both are
        // stepped by forward differences.
        let denom_sq = s.denom * s.denom;
        let ed = s.offset.dot(d);
        let es = s.offset.dot(step);
        let ds = d.dot(step);
        let ss = step.magnitude2();

        let mut u = ed / s.denom;
        let du = es / s.denom;
        let mut v = (ed * ed + d.magnitude2() * s.denom) / denom_sq;
        let mut dv = (2.0 * ed * es + es * es + s.denom * (2.0 * ds + ss)) / denom_sq;
        let ddv = 2.0 * (es * es + s.denom * ss) / denom_sq;

        for p in dst.iter_mut() {
            let g = u + v.max(0.0).sqrt();
            *p = self.map.lookup((g * 65536.0) as i64);
            u += du;
            v += dv;
            dv += ddv;
        }
    }
}
