//! A compact in-memory path recorder.
use cgmath::Point2;

use crate::sink::{LineSink, PathSink};

/// Segment types in the command stream.
mod op {
    /// Followed by an absolute point.
    pub const MOVE_TO: u8 = 0;
    pub const LINE_JOIN: u8 = 1;
    /// Followed by an absolute point.
    pub const ABS_LINE_TO: u8 = 2;
    /// Followed by a packed delta.
    pub const REL_LINE_TO_SHORT: u8 = 3;
    /// Followed by two absolute points.
    pub const ABS_QUAD_TO: u8 = 4;
    /// Followed by two packed deltas, both relative to the current point.
    pub const REL_QUAD_TO_SHORT: u8 = 5;
    /// Followed by three absolute points.
    pub const CUBIC_TO: u8 = 6;
    pub const CLOSE: u8 = 7;
    pub const END: u8 = 8;
}

/// Records path commands and replays them to another sink.
///
/// Line and quadratic segments whose coordinate deltas all fit in `i16`
/// are stored as packed deltas from the current point, taking one word per
/// point instead of two. Cubic segments are always stored in full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStore {
    types: Vec<u8>,
    coords: Vec<i32>,

    cur: Point2<i32>,
    start: Point2<i32>,
}

#[inline]
fn short_delta(x: i32, y: i32) -> Option<i32> {
    use std::convert::TryFrom;
    let dx = i16::try_from(x).ok()?;
    let dy = i16::try_from(y).ok()?;
    Some(((dx as i32) << 16) | (dy as u16 as i32))
}

/// Apply a packed delta to `cur`.
#[inline]
fn offset(cur: Point2<i32>, packed: i32) -> Point2<i32> {
    Point2::new(cur.x + (packed >> 16), cur.y + (packed as i16 as i32))
}

impl Default for PathStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PathStore {
    pub fn new() -> Self {
        Self {
            types: Vec::new(),
            coords: Vec::new(),
            cur: Point2::new(0, 0),
            start: Point2::new(0, 0),
        }
    }

    /// Remove all recorded commands, keeping the allocations.
    pub fn clear(&mut self) {
        self.types.clear();
        self.coords.clear();
        self.cur = Point2::new(0, 0);
        self.start = Point2::new(0, 0);
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// The number of recorded commands.
    pub fn num_segments(&self) -> usize {
        self.types.len()
    }

    fn push_point(&mut self, p: Point2<i32>) {
        self.coords.push(p.x);
        self.coords.push(p.y);
    }

    /// Get a flag indicating whether the last recorded command is `end`.
    pub fn is_terminated(&self) -> bool {
        self.types.last() == Some(&op::END)
    }

    /// Replay the recorded commands to `out`.
    pub fn produce<S: PathSink + ?Sized>(&self, out: &mut S) {
        let mut coords = self.coords.iter().cloned();
        let mut word = || coords.next().unwrap_or(0);

        let mut cur = Point2::new(0, 0);
        let mut start = Point2::new(0, 0);

        for &ty in self.types.iter() {
            match ty {
                op::MOVE_TO => {
                    let p = Point2::new(word(), word());
                    out.move_to(p);
                    cur = p;
                    start = p;
                }
                op::LINE_JOIN => out.line_join(),
                op::ABS_LINE_TO => {
                    let p = Point2::new(word(), word());
                    out.line_to(p);
                    cur = p;
                }
                op::REL_LINE_TO_SHORT => {
                    let p = offset(cur, word());
                    out.line_to(p);
                    cur = p;
                }
                op::ABS_QUAD_TO => {
                    let p1 = Point2::new(word(), word());
                    let p2 = Point2::new(word(), word());
                    out.quad_to(p1, p2);
                    cur = p2;
                }
                op::REL_QUAD_TO_SHORT => {
                    let p1 = offset(cur, word());
                    let p2 = offset(cur, word());
                    out.quad_to(p1, p2);
                    cur = p2;
                }
                op::CUBIC_TO => {
                    let p1 = Point2::new(word(), word());
                    let p2 = Point2::new(word(), word());
                    let p3 = Point2::new(word(), word());
                    out.cubic_to(p1, p2, p3);
                    cur = p3;
                }
                op::CLOSE => {
                    out.close();
                    cur = start;
                }
                op::END => {
                    out.end();
                    cur = Point2::new(0, 0);
                }
                _ => unreachable!(),
            }
        }
    }
}

impl LineSink for PathStore {
    fn move_to(&mut self, p: Point2<i32>) {
        self.types.push(op::MOVE_TO);
        self.push_point(p);
        self.cur = p;
        self.start = p;
    }

    fn line_join(&mut self) {
        self.types.push(op::LINE_JOIN);
    }

    fn line_to(&mut self, p: Point2<i32>) {
        let d = short_delta(
            p.x.wrapping_sub(self.cur.x),
            p.y.wrapping_sub(self.cur.y),
        );
        if let Some(d) = d.filter(|_| no_overflow(self.cur, p)) {
            self.types.push(op::REL_LINE_TO_SHORT);
            self.coords.push(d);
        } else {
            self.types.push(op::ABS_LINE_TO);
            self.push_point(p);
        }
        self.cur = p;
    }

    fn close(&mut self) {
        self.types.push(op::CLOSE);
        self.cur = self.start;
    }

    fn end(&mut self) {
        self.types.push(op::END);
        self.cur = Point2::new(0, 0);
    }
}

impl PathSink for PathStore {
    fn quad_to(&mut self, p1: Point2<i32>, p2: Point2<i32>) {
        let cur = self.cur;
        let d1 = short_delta(p1.x.wrapping_sub(cur.x), p1.y.wrapping_sub(cur.y))
            .filter(|_| no_overflow(cur, p1));
        let d2 = short_delta(p2.x.wrapping_sub(cur.x), p2.y.wrapping_sub(cur.y))
            .filter(|_| no_overflow(cur, p2));
        if let (Some(d1), Some(d2)) = (d1, d2) {
            self.types.push(op::REL_QUAD_TO_SHORT);
            self.coords.push(d1);
            self.coords.push(d2);
        } else {
            self.types.push(op::ABS_QUAD_TO);
            self.push_point(p1);
            self.push_point(p2);
        }
        self.cur = p2;
    }

    fn cubic_to(&mut self, p1: Point2<i32>, p2: Point2<i32>, p3: Point2<i32>) {
        self.types.push(op::CUBIC_TO);
        self.push_point(p1);
        self.push_point(p2);
        self.push_point(p3);
        self.cur = p3;
    }
}

/// Check that `p - cur` doesn't wrap around, so that the packed delta
/// reconstructs `p` exactly.
#[inline]
fn no_overflow(cur: Point2<i32>, p: Point2<i32>) -> bool {
    p.x.checked_sub(cur.x).is_some() && p.y.checked_sub(cur.y).is_some()
}
