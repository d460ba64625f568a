//! Dash pattern application.
use cgmath::{prelude::*, Matrix2, Point2, Vector2};
use fixgeom::{to_f64, Transform6};

use crate::sink::{LineSink, LineStage};

/// A [`LineStage`] that keeps only the "on" intervals of a dash pattern.
///
/// Input is in device space; lengths are measured in user space through the
/// inverse of the stroke transformation. Each subpath restarts the pattern
/// at the phase. Each "on" interval is emitted as an open subpath.
#[derive(Debug, Clone)]
pub struct Dasher {
    /// User-space lengths; even indices are "on"
    pattern: Vec<f64>,
    /// The pattern position at the start of each subpath
    start_index: usize,
    start_remaining: f64,
    /// Device space to user space, linear part
    inv: Matrix2<f64>,

    // Subpath state
    start: Point2<i32>,
    cur: Point2<i32>,
    index: usize,
    remaining: f64,
    /// The current "on" interval has been started in the output
    drawing: bool,
    /// A `line_join` is pending for the next segment
    corner: bool,
}

impl Dasher {
    /// Construct a `Dasher`. Returns `None` if the pattern doesn't produce
    /// dashes: it's empty, has a negative length, or sums to zero.
    pub fn new(pattern: &[i32], phase: i32, xform: &Transform6) -> Option<Self> {
        if pattern.is_empty() || pattern.iter().any(|&x| x < 0) {
            return None;
        }
        let mut pattern: Vec<f64> = pattern.iter().map(|&x| to_f64(x)).collect();
        if pattern.len() % 2 == 1 {
            // The odd-length pattern `[a, b, c]` means `[a, b, c, a, b, c]`
            let copy = pattern.clone();
            pattern.extend(copy);
        }
        let total: f64 = pattern.iter().sum();
        if total <= 0.0 {
            return None;
        }

        let m = Matrix2::new(
            to_f64(xform.m00),
            to_f64(xform.m10),
            to_f64(xform.m01),
            to_f64(xform.m11),
        );
        let inv = m.invert()?;

        // Skip the phase
        let mut phase = to_f64(phase).rem_euclid(total);
        let mut index = 0;
        while phase >= pattern[index] {
            phase -= pattern[index];
            index = (index + 1) % pattern.len();
        }
        let start_remaining = pattern[index] - phase;

        Some(Self {
            pattern,
            start_index: index,
            start_remaining,
            inv,
            start: Point2::new(0, 0),
            cur: Point2::new(0, 0),
            index,
            remaining: start_remaining,
            drawing: false,
            corner: false,
        })
    }

    #[inline]
    fn is_on(&self) -> bool {
        self.index % 2 == 0
    }

    fn segment<S: LineSink + ?Sized>(&mut self, out: &mut S, p: Point2<i32>) {
        let p0 = self.cur;
        let delta = Vector2::new((p.x as i64 - p0.x as i64) as f64, (p.y as i64 - p0.y as i64) as f64);
        let len = (self.inv * delta).magnitude() / 65536.0;
        let corner = std::mem::replace(&mut self.corner, false);
        if len <= 0.0 {
            return;
        }

        let lerp = |t: f64| {
            Point2::new(
                (p0.x as f64 + delta.x * t).round() as i32,
                (p0.y as f64 + delta.y * t).round() as i32,
            )
        };

        let mut pos = 0.0;
        loop {
            let end = pos + self.remaining;
            let piece_end = if end >= len { p } else { lerp(end / len) };

            if self.is_on() {
                if self.drawing {
                    if corner && pos == 0.0 {
                        out.line_join();
                    }
                } else {
                    out.move_to(if pos == 0.0 { p0 } else { lerp(pos / len) });
                    self.drawing = true;
                    out.line_join();
                }
                out.line_to(piece_end);
            }

            if end > len {
                self.remaining = end - len;
                break;
            }

            // The interval ends inside this segment
            self.index = (self.index + 1) % self.pattern.len();
            self.remaining = self.pattern[self.index];
            self.drawing = false;
            pos = end;
            if end == len {
                break;
            }
        }
        self.cur = p;
    }

    fn restart(&mut self, p: Point2<i32>) {
        self.start = p;
        self.cur = p;
        self.index = self.start_index;
        self.remaining = self.start_remaining;
        self.drawing = false;
        self.corner = false;
    }
}

impl<S: LineSink + ?Sized> LineStage<S> for Dasher {
    fn move_to(&mut self, _out: &mut S, p: Point2<i32>) {
        self.restart(p);
    }

    fn line_join(&mut self, _out: &mut S) {
        self.corner = true;
    }

    fn line_to(&mut self, out: &mut S, p: Point2<i32>) {
        self.segment(out, p);
    }

    fn close(&mut self, out: &mut S) {
        let start = self.start;
        self.segment(out, start);
        self.restart(start);
    }

    fn end(&mut self, out: &mut S) {
        self.restart(Point2::new(0, 0));
        out.end();
    }
}
