//! Stroke outline generation.
//!
//! [`Stroker`] turns device-space line paths into a set of positively
//! oriented polygons whose union (under the nonzero winding rule) is the
//! stroke. The pen is a user-space circle mapped through the linear part of
//! the stroke transformation, so strokes under a non-uniform scale have the
//! expected shape.
use cgmath::{prelude::*, Matrix2, Point2, Vector2};
use fixgeom::{from_f64, to_f64, Transform6, ONE};
use log::debug;
use std::f64::consts::PI;

use crate::sink::{LineSink, LineStage};

/// The maximum distance between the ideal round pen and its polygonal
/// approximation, in pixels.
const PEN_TOLERANCE: f64 = 0.25;

/// The shape of open subpath ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapStyle {
    Butt,
    Round,
    Square,
}

/// The shape of user-specified corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinStyle {
    Miter,
    Round,
    Bevel,
}

/// Stroke parameters. Lengths are S15.16 in user space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrokeParams {
    pub width: i32,
    pub cap: CapStyle,
    pub join: JoinStyle,
    /// The maximum ratio of the miter length to the line width, beyond which
    /// a miter join becomes a bevel join
    pub miter_limit: i32,
    /// Alternating "on" and "off" lengths. Dashing is disabled if empty.
    pub dash: Vec<i32>,
    pub dash_phase: i32,
}

impl Default for StrokeParams {
    fn default() -> Self {
        Self {
            width: ONE,
            cap: CapStyle::Butt,
            join: JoinStyle::Miter,
            miter_limit: 10 * ONE,
            dash: Vec::new(),
            dash_phase: 0,
        }
    }
}

/// The linear part of the stroke transformation and the pen derived from it.
#[derive(Debug, Clone)]
struct Pen {
    m: Matrix2<f64>,
    inv: Matrix2<f64>,
    radius: f64,
    /// The vertices of the pen polygon relative to its center
    outline: Vec<Vector2<f64>>,
}

impl Pen {
    fn new(width: i32, xform: &Transform6) -> Option<Self> {
        let m = Matrix2::new(
            to_f64(xform.m00),
            to_f64(xform.m10),
            to_f64(xform.m01),
            to_f64(xform.m11),
        );
        let inv = m.invert()?;
        let radius = to_f64(width).abs() * 0.5;

        // An upper bound of the device-space radius
        let dev_radius = radius * (m.x.magnitude2() + m.y.magnitude2()).sqrt();
        let count = if dev_radius <= PEN_TOLERANCE {
            8
        } else {
            let n = PI / (1.0 - PEN_TOLERANCE / dev_radius).acos();
            (n.ceil() as usize).max(8).min(256)
        };
        let outline = (0..count)
            .map(|i| {
                let theta = i as f64 * (2.0 * PI / count as f64);
                m * Vector2::new(theta.cos(), theta.sin()) * radius
            })
            .collect();

        Some(Self {
            m,
            inv,
            radius,
            outline,
        })
    }

    /// Compute the offsets for a device-space direction: the pen's half
    /// width perpendicular to it, and the pen's half length along it.
    /// Returns `None` for a zero vector.
    fn offsets(&self, dir: Vector2<f64>) -> Option<Seg> {
        let user = self.inv * dir;
        let len = user.magnitude();
        if len <= 0.0 || !len.is_finite() {
            return None;
        }
        let user = user / len;
        Some(Seg {
            dir,
            user,
            normal: self.m * Vector2::new(-user.y, user.x) * self.radius,
            along: self.m * user * self.radius,
        })
    }
}

/// The geometry of a segment as seen by joins and caps.
#[derive(Debug, Clone, Copy)]
struct Seg {
    /// The device-space direction
    dir: Vector2<f64>,
    /// The user-space unit direction
    user: Vector2<f64>,
    /// Half the pen, perpendicular to the segment
    normal: Vector2<f64>,
    /// Half the pen, along the segment
    along: Vector2<f64>,
}

/// The state of the subpath being stroked.
#[derive(Debug, Clone, Copy)]
struct Subpath {
    start: Point2<f64>,
    cur: Point2<f64>,
    /// The first segment and whether its start vertex is a user corner
    first: Option<(Seg, bool)>,
    last: Option<Seg>,
    /// Set if anything but `move_to` was received
    drawn: bool,
}

/// A [`LineStage`] that replaces each subpath with its stroke outline.
#[derive(Debug, Clone)]
pub struct Stroker {
    cap: CapStyle,
    join: JoinStyle,
    miter_limit: f64,
    /// `None` if the transformation is singular
    pen: Option<Pen>,
    subpath: Option<Subpath>,
    /// A `line_join` was received since the last segment
    corner: bool,
    poly: Vec<Point2<f64>>,
}

impl Stroker {
    /// Construct a `Stroker`. `xform` is the transformation from user space
    /// to device space that the incoming path was subjected to.
    pub fn new(params: &StrokeParams, xform: &Transform6) -> Self {
        let pen = Pen::new(params.width, xform);
        if pen.is_none() {
            debug!("Stroker: singular transformation {:?}; strokes are empty", xform);
        }
        Self {
            cap: params.cap,
            join: params.join,
            miter_limit: to_f64(params.miter_limit).max(1.0),
            pen,
            subpath: None,
            corner: false,
            poly: Vec::with_capacity(16),
        }
    }

    /// Emit the polygon in `self.poly` with a positive orientation.
    fn flush_polygon<S: LineSink + ?Sized>(&mut self, out: &mut S) {
        let pts = &self.poly;
        if pts.len() < 3 {
            self.poly.clear();
            return;
        }
        let area: f64 = (0..pts.len())
            .map(|i| {
                let (a, b) = (pts[i], pts[(i + 1) % pts.len()]);
                a.x * b.y - b.x * a.y
            })
            .sum();
        if area != 0.0 {
            let to_fixed = |p: &Point2<f64>| Point2::new(from_f64(p.x), from_f64(p.y));
            let mut emit = |p: &Point2<f64>, first: bool| {
                if first {
                    out.move_to(to_fixed(p));
                } else {
                    out.line_to(to_fixed(p));
                }
            };
            if area > 0.0 {
                for (i, p) in pts.iter().enumerate() {
                    emit(p, i == 0);
                }
            } else {
                for (i, p) in pts.iter().rev().enumerate() {
                    emit(p, i == 0);
                }
            }
            out.close();
        }
        self.poly.clear();
    }

    fn pen_at<S: LineSink + ?Sized>(&mut self, out: &mut S, center: Point2<f64>) {
        if let Some(pen) = &self.pen {
            self.poly.extend(pen.outline.iter().map(|&o| center + o));
        }
        self.flush_polygon(out);
    }

    fn segment<S: LineSink + ?Sized>(&mut self, out: &mut S, p0: Point2<f64>, p1: Point2<f64>, seg: &Seg) {
        let n = seg.normal;
        self.poly.extend_from_slice(&[p0 + n, p1 + n, p1 - n, p0 - n]);
        self.flush_polygon(out);
    }

    /// Join the segments `a` and `b` meeting at `v`.
    fn join<S: LineSink + ?Sized>(&mut self, out: &mut S, v: Point2<f64>, a: &Seg, b: &Seg, corner: bool) {
        let style = if corner { self.join } else { JoinStyle::Round };

        let cross = a.dir.perp_dot(b.dir);
        if cross == 0.0 && a.dir.dot(b.dir) > 0.0 {
            // Collinear continuation
            return;
        }
        if style == JoinStyle::Round {
            self.pen_at(out, v);
            return;
        }

        // The outer side is the one the path turns away from
        let side = if a.normal.dot(b.dir) < 0.0 { 1.0 } else { -1.0 };
        let (oa, ob) = (v + a.normal * side, v + b.normal * side);

        if style == JoinStyle::Miter && cross != 0.0 {
            // The miter ratio is `1 / cos(φ / 2)` for the turning angle `φ`
            let cos_phi = a.user.dot(b.user).max(-1.0).min(1.0);
            let cos_half = ((1.0 + cos_phi) * 0.5).sqrt();
            if cos_half * self.miter_limit >= 1.0 {
                let t = (ob - oa).perp_dot(b.dir) / cross;
                let tip = oa + a.dir * t;
                self.poly.extend_from_slice(&[v, oa, tip, ob]);
                self.flush_polygon(out);
                return;
            }
        }

        self.poly.extend_from_slice(&[v, oa, ob]);
        self.flush_polygon(out);
    }

    /// Draw a cap at `p`. `seg.along` points outward.
    fn cap<S: LineSink + ?Sized>(&mut self, out: &mut S, p: Point2<f64>, seg: &Seg) {
        match self.cap {
            CapStyle::Butt => {}
            CapStyle::Round => self.pen_at(out, p),
            CapStyle::Square => {
                let (n, e) = (seg.normal, seg.along);
                self.poly.extend_from_slice(&[p + n, p + n + e, p - n + e, p - n]);
                self.flush_polygon(out);
            }
        }
    }

    /// Draw the mark of a subpath without extent.
    fn dot<S: LineSink + ?Sized>(&mut self, out: &mut S, p: Point2<f64>) {
        let pen = match &self.pen {
            Some(pen) => pen,
            None => return,
        };
        match self.cap {
            CapStyle::Butt => {}
            CapStyle::Round => self.pen_at(out, p),
            CapStyle::Square => {
                let (m, r) = (pen.m, pen.radius);
                self.poly.extend(
                    [(-r, -r), (r, -r), (r, r), (-r, r)]
                        .iter()
                        .map(|&(x, y)| p + m * Vector2::new(x, y)),
                );
                self.flush_polygon(out);
            }
        }
    }

    fn line_to_f64<S: LineSink + ?Sized>(&mut self, out: &mut S, p: Point2<f64>) {
        let mut sp = match self.subpath {
            Some(sp) => sp,
            None => return,
        };
        sp.drawn = true;

        let seg = self.pen.as_ref().and_then(|pen| pen.offsets(p - sp.cur));
        if let Some(seg) = seg {
            let corner = std::mem::replace(&mut self.corner, false);
            match sp.last {
                Some(last) => self.join(out, sp.cur, &last, &seg, corner),
                None => sp.first = Some((seg, corner)),
            }
            self.segment(out, sp.cur, p, &seg);
            sp.last = Some(seg);
            sp.cur = p;
        }
        self.subpath = Some(sp);
    }

    /// Finish the current subpath with caps.
    fn finish_open<S: LineSink + ?Sized>(&mut self, out: &mut S) {
        let sp = match self.subpath.take() {
            Some(sp) => sp,
            None => return,
        };
        match (sp.first, sp.last) {
            (Some((first, _)), Some(last)) => {
                let mut reversed = first;
                reversed.along = -first.along;
                reversed.normal = -first.normal;
                self.cap(out, sp.start, &reversed);
                self.cap(out, sp.cur, &last);
            }
            _ if sp.drawn => self.dot(out, sp.start),
            _ => {}
        }
    }
}

fn to_point(p: Point2<i32>) -> Point2<f64> {
    Point2::new(to_f64(p.x), to_f64(p.y))
}

impl<S: LineSink + ?Sized> LineStage<S> for Stroker {
    fn move_to(&mut self, out: &mut S, p: Point2<i32>) {
        self.finish_open(out);
        let p = to_point(p);
        self.subpath = Some(Subpath {
            start: p,
            cur: p,
            first: None,
            last: None,
            drawn: false,
        });
        self.corner = false;
    }

    fn line_join(&mut self, _out: &mut S) {
        self.corner = true;
    }

    fn line_to(&mut self, out: &mut S, p: Point2<i32>) {
        self.line_to_f64(out, to_point(p));
    }

    fn close(&mut self, out: &mut S) {
        let start = match self.subpath {
            Some(sp) => sp.start,
            None => return,
        };
        self.line_to_f64(out, start);

        let sp = match self.subpath.take() {
            Some(sp) => sp,
            None => return,
        };
        match (sp.first, sp.last) {
            (Some((first, corner)), Some(last)) => self.join(out, sp.start, &last, &first, corner),
            _ => self.dot(out, sp.start),
        }

        // Subsequent segments start a new subpath at the same point
        self.subpath = Some(Subpath {
            start: sp.start,
            cur: sp.start,
            first: None,
            last: None,
            drawn: false,
        });
        self.corner = false;
    }

    fn end(&mut self, out: &mut S) {
        self.finish_open(out);
        self.corner = false;
        out.end();
    }
}
