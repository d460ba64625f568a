//! Adaptive curve subdivision.
use cgmath::Point2;

use crate::sink::{CurveStage, LineSink, LineStage};

/// Segments whose end points are farther apart than this (16 pixels,
/// squared, in S31.32) are always subdivided.
const MAX_CHORD_LENGTH_SQ: i64 = 16 * 16 * 65536 * 65536;

/// Segments whose end points and control points are closer than this
/// (half a pixel, squared, in S31.32) are never subdivided.
const MIN_CHORD_LENGTH_SQ: i64 = 65536 * 65536 / (2 * 2);

/// Guards against runaway recursion on pathological input (e.g., control
/// points at the extremes of the coordinate space).
const MAX_DEPTH: u32 = 32;

/// The default flatness for filling: half a pixel.
pub const DEFAULT_FILL_FLATNESS: i32 = 1 << 15;

/// The default flatness for stroking: one pixel.
pub const DEFAULT_STROKE_FLATNESS: i32 = 1 << 16;

/// Converts quadratic and cubic segments into line segments.
///
/// A line-join marker is emitted ahead of every incoming segment and `close`.
/// Line segments produced by subdividing a single curve are not separated by
/// line-join markers.
#[derive(Debug, Clone)]
pub struct Flattener {
    flatness: i32,
    /// `flatness²` in S15.16
    flatness_sq: i64,
    start: Point2<i32>,
    cur: Point2<i32>,
}

impl Default for Flattener {
    fn default() -> Self {
        Self::new(DEFAULT_FILL_FLATNESS)
    }
}

impl Flattener {
    /// Construct a `Flattener`. `flatness` is the maximum deviation of an
    /// output line segment from the input curve, in S15.16 format.
    pub fn new(flatness: i32) -> Self {
        let mut this = Self {
            flatness: 0,
            flatness_sq: 0,
            start: Point2::new(0, 0),
            cur: Point2::new(0, 0),
        };
        this.set_flatness(flatness);
        this
    }

    pub fn flatness(&self) -> i32 {
        self.flatness
    }

    pub fn set_flatness(&mut self, flatness: i32) {
        self.flatness = flatness;
        self.flatness_sq = (flatness as i64 * flatness as i64) >> 16;
    }

    fn quad_flat_enough(&self, p0: Point2<i32>, p1: Point2<i32>, p2: Point2<i32>) -> bool {
        let (dx, dy) = (p2.x as i64 - p0.x as i64, p2.y as i64 - p0.y as i64);
        let denom2 = dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy));
        if denom2 > MAX_CHORD_LENGTH_SQ {
            return false;
        }
        if denom2 < MIN_CHORD_LENGTH_SQ && bbox_diag_sq(&[p0, p1, p2]) < MIN_CHORD_LENGTH_SQ {
            return true;
        }

        let df2 = (denom2 as i128 * self.flatness_sq as i128) >> 16;
        deviation_sq(p0, dx, dy, p1) < df2
    }

    fn cubic_flat_enough(
        &self,
        p0: Point2<i32>,
        p1: Point2<i32>,
        p2: Point2<i32>,
        p3: Point2<i32>,
    ) -> bool {
        let (dx, dy) = (p3.x as i64 - p0.x as i64, p3.y as i64 - p0.y as i64);
        let denom2 = dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy));
        if denom2 > MAX_CHORD_LENGTH_SQ {
            return false;
        }
        if denom2 < MIN_CHORD_LENGTH_SQ
            && bbox_diag_sq(&[p0, p1, p2, p3]) < MIN_CHORD_LENGTH_SQ
        {
            return true;
        }

        // Compare `cross²` against `(chord·flatness)²` to avoid a square root
        let df2 = (denom2 as i128 * self.flatness_sq as i128) >> 16;
        deviation_sq(p0, dx, dy, p1) <= df2 && deviation_sq(p0, dx, dy, p2) < df2
    }

    fn quad_helper<S: LineSink + ?Sized>(
        &mut self,
        out: &mut S,
        p1: Point2<i32>,
        p2: Point2<i32>,
        depth: u32,
    ) {
        let p0 = self.cur;
        if depth >= MAX_DEPTH || self.quad_flat_enough(p0, p1, p2) {
            out.line_to(p1);
            out.line_to(p2);
        } else {
            let (x01, y01) = (p0.x as i64 + p1.x as i64, p0.y as i64 + p1.y as i64);
            let (x12, y12) = (p1.x as i64 + p2.x as i64, p1.y as i64 + p2.y as i64);
            let (x012, y012) = (x01 + x12, y01 + y12);

            self.quad_helper(
                out,
                Point2::new((x01 >> 1) as i32, (y01 >> 1) as i32),
                Point2::new((x012 >> 2) as i32, (y012 >> 2) as i32),
                depth + 1,
            );
            self.quad_helper(
                out,
                Point2::new((x12 >> 1) as i32, (y12 >> 1) as i32),
                p2,
                depth + 1,
            );
        }
        self.cur = p2;
    }

    fn cubic_helper<S: LineSink + ?Sized>(
        &mut self,
        out: &mut S,
        p1: Point2<i32>,
        p2: Point2<i32>,
        p3: Point2<i32>,
        depth: u32,
    ) {
        let p0 = self.cur;
        if depth >= MAX_DEPTH || self.cubic_flat_enough(p0, p1, p2, p3) {
            out.line_to(p1);
            out.line_to(p2);
            out.line_to(p3);
        } else {
            let sum = |a: Point2<i32>, b: Point2<i32>| {
                (a.x as i64 + b.x as i64, a.y as i64 + b.y as i64)
            };
            let (x01, y01) = sum(p0, p1);
            let (x12, y12) = sum(p1, p2);
            let (x23, y23) = sum(p2, p3);
            let (x012, y012) = (x01 + x12, y01 + y12);
            let (x123, y123) = (x12 + x23, y12 + y23);
            let (x0123, y0123) = (x012 + x123, y012 + y123);

            self.cubic_helper(
                out,
                Point2::new((x01 >> 1) as i32, (y01 >> 1) as i32),
                Point2::new((x012 >> 2) as i32, (y012 >> 2) as i32),
                Point2::new((x0123 >> 3) as i32, (y0123 >> 3) as i32),
                depth + 1,
            );
            self.cubic_helper(
                out,
                Point2::new((x123 >> 2) as i32, (y123 >> 2) as i32),
                Point2::new((x23 >> 1) as i32, (y23 >> 1) as i32),
                p3,
                depth + 1,
            );
        }
        self.cur = p3;
    }
}

/// The squared diagonal of the bounding box of `points`, in S31.32.
fn bbox_diag_sq(points: &[Point2<i32>]) -> i64 {
    let (mut min_x, mut min_y) = (i32::max_value(), i32::max_value());
    let (mut max_x, mut max_y) = (i32::min_value(), i32::min_value());
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    let dx = max_x as i64 - min_x as i64;
    let dy = max_y as i64 - min_y as i64;
    dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
}

/// Compute `(chord × (p - p0))²` in S31.32, where `chord = (dx, dy)`.
/// Divided by `|chord|²`, this is the squared distance of `p` from the
/// chord.
#[inline]
fn deviation_sq(p0: Point2<i32>, dx: i64, dy: i64, p: Point2<i32>) -> i128 {
    let px = p.x as i64 - p0.x as i64;
    let py = p.y as i64 - p0.y as i64;
    let num = (dx as i128 * py as i128 - dy as i128 * px as i128) >> 16;
    num * num
}

impl<S: LineSink + ?Sized> LineStage<S> for Flattener {
    fn move_to(&mut self, out: &mut S, p: Point2<i32>) {
        out.move_to(p);
        self.start = p;
        self.cur = p;
    }

    fn line_join(&mut self, out: &mut S) {
        out.line_join();
    }

    fn line_to(&mut self, out: &mut S, p: Point2<i32>) {
        out.line_join();
        out.line_to(p);
        self.cur = p;
    }

    fn close(&mut self, out: &mut S) {
        out.line_join();
        out.close();
        self.cur = self.start;
    }

    fn end(&mut self, out: &mut S) {
        out.end();
    }
}

impl<S: LineSink + ?Sized> CurveStage<S> for Flattener {
    fn quad_to(&mut self, out: &mut S, p1: Point2<i32>, p2: Point2<i32>) {
        out.line_join();
        self.quad_helper(out, p1, p2, 0);
    }

    fn cubic_to(&mut self, out: &mut S, p1: Point2<i32>, p2: Point2<i32>, p3: Point2<i32>) {
        out.line_join();
        self.cubic_helper(out, p1, p2, p3, 0);
    }
}
