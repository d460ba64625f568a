//! Outlines of the shapes drawn by the façade's convenience methods.
//!
//! Coordinates are S15.16 in user space. Curves are computed in floating
//! point and quantized once.
use cgmath::{Point2, Vector2};
use fixgeom::{from_f64, to_f64};
use std::f64::consts::PI;

use crate::sink::PathSink;

/// The distance of the control points of a cubic Bézier quarter circle from
/// its end points, relative to the radius.
pub const CIRCLE_KAPPA: f64 = 0.552_284_749_830_793_4;

/// `(1 - CIRCLE_KAPPA) / 2`: the position of the control points of a
/// rounded corner relative to the corner, in units of the arc diameter.
const CORNER_ACV: f64 = 0.223_857_625_084_603_33;

/// How an arc is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArcType {
    /// Not closed. A fill still closes it with a straight line.
    Open,
    /// Closed by a straight line between the end points.
    Chord,
    /// Closed by straight lines to the center.
    Pie,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Seg {
    Line(Point2<f64>),
    Cubic(Point2<f64>, Point2<f64>, Point2<f64>),
}

impl Seg {
    fn end(&self) -> Point2<f64> {
        match *self {
            Seg::Line(p) | Seg::Cubic(_, _, p) => p,
        }
    }
}

/// A single subpath.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    start: Point2<f64>,
    segs: Vec<Seg>,
    closed: bool,
}

impl Outline {
    fn new(start: Point2<f64>) -> Self {
        Self {
            start,
            segs: Vec::new(),
            closed: true,
        }
    }

    fn line_to(&mut self, p: Point2<f64>) {
        self.segs.push(Seg::Line(p));
    }

    fn cubic_to(&mut self, p1: Point2<f64>, p2: Point2<f64>, p3: Point2<f64>) {
        self.segs.push(Seg::Cubic(p1, p2, p3));
    }

    /// Traverse the outline in the opposite direction.
    pub fn reversed(&self) -> Self {
        let last = self.segs.last().map_or(self.start, Seg::end);
        let mut out = Self {
            start: last,
            segs: Vec::with_capacity(self.segs.len()),
            closed: self.closed,
        };
        for (i, seg) in self.segs.iter().enumerate().rev() {
            let from = if i == 0 { self.start } else { self.segs[i - 1].end() };
            out.segs.push(match *seg {
                Seg::Line(_) => Seg::Line(from),
                Seg::Cubic(c1, c2, _) => Seg::Cubic(c2, c1, from),
            });
        }
        out
    }

    /// Send the outline to `out`. Does not call `end`.
    pub fn emit(&self, out: &mut (impl PathSink + ?Sized)) {
        let q = |p: Point2<f64>| Point2::new(from_f64(p.x), from_f64(p.y));
        out.move_to(q(self.start));
        for seg in &self.segs {
            match *seg {
                Seg::Line(p) => out.line_to(q(p)),
                Seg::Cubic(p1, p2, p3) => out.cubic_to(q(p1), q(p2), q(p3)),
            }
        }
        if self.closed {
            out.close();
        }
    }
}

fn point(x: f64, y: f64) -> Point2<f64> {
    Point2::new(x, y)
}

/// `[x, y, w, h]` in floating point.
fn rect_f64(x: i32, y: i32, w: i32, h: i32) -> [f64; 4] {
    [to_f64(x), to_f64(y), to_f64(w), to_f64(h)]
}

/// A rectangle, traversed clockwise on screen (y pointing down).
pub fn rect(x: i32, y: i32, w: i32, h: i32) -> Outline {
    let [x, y, w, h] = rect_f64(x, y, w, h);
    let mut o = Outline::new(point(x, y));
    o.line_to(point(x + w, y));
    o.line_to(point(x + w, y + h));
    o.line_to(point(x, y + h));
    o
}

/// An ellipse inscribed in a rectangle, traversed clockwise on screen.
pub fn oval(x: i32, y: i32, w: i32, h: i32) -> Outline {
    let [x, y, w, h] = rect_f64(x, y, w, h);
    let (rx, ry) = (w * 0.5, h * 0.5);
    let (cx, cy) = (x + rx, y + ry);
    let (kx, ky) = (rx * CIRCLE_KAPPA, ry * CIRCLE_KAPPA);

    let mut o = Outline::new(point(cx + rx, cy));
    o.cubic_to(point(cx + rx, cy + ky), point(cx + kx, cy + ry), point(cx, cy + ry));
    o.cubic_to(point(cx - kx, cy + ry), point(cx - rx, cy + ky), point(cx - rx, cy));
    o.cubic_to(point(cx - rx, cy - ky), point(cx - kx, cy - ry), point(cx, cy - ry));
    o.cubic_to(point(cx + kx, cy - ry), point(cx + rx, cy - ky), point(cx + rx, cy));
    o
}

/// A rectangle with elliptical corners of the given diameters, traversed
/// clockwise on screen. The diameters are clamped to the rectangle size.
pub fn round_rect(x: i32, y: i32, w: i32, h: i32, arc_w: i32, arc_h: i32) -> Outline {
    let [x, y, w, h] = rect_f64(x, y, w, h);
    let aw = to_f64(arc_w).max(0.0).min(w);
    let ah = to_f64(arc_h).max(0.0).min(h);
    let (cw, ch) = (aw * CORNER_ACV, ah * CORNER_ACV);
    let (x1, y1) = (x + w, y + h);

    let mut o = Outline::new(point(x + aw * 0.5, y));
    o.line_to(point(x1 - aw * 0.5, y));
    o.cubic_to(point(x1 - cw, y), point(x1, y + ch), point(x1, y + ah * 0.5));
    o.line_to(point(x1, y1 - ah * 0.5));
    o.cubic_to(point(x1, y1 - ch), point(x1 - cw, y1), point(x1 - aw * 0.5, y1));
    o.line_to(point(x + aw * 0.5, y1));
    o.cubic_to(point(x + cw, y1), point(x, y1 - ch), point(x, y1 - ah * 0.5));
    o.line_to(point(x, y + ah * 0.5));
    o.cubic_to(point(x, y + ch), point(x + cw, y), point(x + aw * 0.5, y));
    o
}

/// An elliptical arc. Angles are in degrees (S15.16), measured
/// counterclockwise on screen from the positive x axis; the sweep is
/// clamped to one full turn.
pub fn arc(x: i32, y: i32, w: i32, h: i32, start: i32, extent: i32, ty: ArcType) -> Outline {
    let [x, y, w, h] = rect_f64(x, y, w, h);
    let (rx, ry) = (w * 0.5, h * 0.5);
    let center = point(x + rx, y + ry);

    let theta0 = to_f64(start).to_radians();
    let sweep = to_f64(extent).max(-360.0).min(360.0).to_radians();

    let at = |t: f64| center + Vector2::new(rx * t.cos(), -ry * t.sin());
    let tangent = |t: f64| Vector2::new(-rx * t.sin(), -ry * t.cos());

    let count = ((sweep.abs() / (PI * 0.5)).ceil() as usize).max(1);
    let step = sweep / count as f64;
    let k = 4.0 / 3.0 * (step * 0.25).tan();

    let mut o = Outline::new(at(theta0));
    for i in 0..count {
        let (t0, t1) = (theta0 + step * i as f64, theta0 + step * (i + 1) as f64);
        o.cubic_to(at(t0) + tangent(t0) * k, at(t1) - tangent(t1) * k, at(t1));
    }

    match ty {
        ArcType::Open => o.closed = false,
        ArcType::Chord => {}
        ArcType::Pie => o.line_to(center),
    }
    o
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::Cmd;
    use fixgeom::from_int;

    fn pt(x: i32, y: i32) -> Point2<i32> {
        Point2::new(from_int(x), from_int(y))
    }

    fn cmds(o: &Outline) -> Vec<Cmd> {
        let mut out = Vec::new();
        o.emit(&mut out);
        out
    }

    #[test]
    fn rect_and_reverse() {
        let r = rect(from_int(1), from_int(2), from_int(3), from_int(4));
        assert_eq!(
            cmds(&r),
            vec![
                Cmd::MoveTo(pt(1, 2)),
                Cmd::LineTo(pt(4, 2)),
                Cmd::LineTo(pt(4, 6)),
                Cmd::LineTo(pt(1, 6)),
                Cmd::Close,
            ]
        );
        assert_eq!(
            cmds(&r.reversed()),
            vec![
                Cmd::MoveTo(pt(1, 6)),
                Cmd::LineTo(pt(4, 6)),
                Cmd::LineTo(pt(4, 2)),
                Cmd::LineTo(pt(1, 2)),
                Cmd::Close,
            ]
        );
    }

    #[test]
    fn oval_passes_through_extremes() {
        let o = cmds(&oval(0, 0, from_int(10), from_int(6)));
        assert_eq!(o[0], Cmd::MoveTo(pt(10, 3)));
        let ends: Vec<_> = o
            .iter()
            .filter_map(|c| match c {
                Cmd::CubicTo(_, _, p) => Some(*p),
                _ => None,
            })
            .collect();
        assert_eq!(ends, vec![pt(5, 6), pt(0, 3), pt(5, 0), pt(10, 3)]);
    }

    #[test]
    fn reversed_cubics_swap_control_points() {
        let o = oval(0, 0, from_int(2), from_int(2));
        let r = o.reversed();
        assert_eq!(r.start, o.start);
        match (o.segs[3], r.segs[0]) {
            (Seg::Cubic(a1, a2, _), Seg::Cubic(b1, b2, b3)) => {
                assert_eq!((a1, a2), (b2, b1));
                assert_eq!(b3, o.segs[2].end());
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn round_rect_clamps_arcs() {
        let r = round_rect(0, 0, from_int(10), from_int(4), from_int(100), from_int(2));
        let c = cmds(&r);
        // The horizontal edges collapse to points at the middle
        assert_eq!(c[0], Cmd::MoveTo(pt(5, 0)));
        assert_eq!(c[1], Cmd::LineTo(pt(5, 0)));
    }

    #[test]
    fn arc_types() {
        let (w, h) = (from_int(10), from_int(10));
        let open = cmds(&arc(0, 0, w, h, 0, from_int(90), ArcType::Open));
        assert_eq!(open[0], Cmd::MoveTo(pt(10, 5)));
        assert_eq!(open.len(), 2);
        match open[1] {
            // Counterclockwise on screen: up
            Cmd::CubicTo(_, _, p) => assert_eq!(p, pt(5, 0)),
            ref c => panic!("{:?}", c),
        }

        let pie = cmds(&arc(0, 0, w, h, 0, from_int(180), ArcType::Pie));
        assert_eq!(pie.len(), 5);
        assert_eq!(pie[3], Cmd::LineTo(pt(5, 5)));
        assert_eq!(pie[4], Cmd::Close);

        let chord = cmds(&arc(0, 0, w, h, 0, -from_int(720), ArcType::Chord));
        // Clamped to one turn
        assert_eq!(chord.len(), 6);
    }
}
