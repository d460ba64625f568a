use cgmath::Point2;
use fixgeom::Transform6;

use crate::sink::{CurveStage, LineStage, PathSink};

/// Applies an affine transformation to every incoming point.
///
/// Chains of transformers are collapsed by [`Transformer::then`] when a
/// pipeline is built rather than by nesting stages.
#[derive(Debug, Clone, Default)]
pub struct Transformer {
    xform: Transform6,
}

impl Transformer {
    pub fn new(xform: Transform6) -> Self {
        Self { xform }
    }

    pub fn transform(&self) -> &Transform6 {
        &self.xform
    }

    pub fn set_transform(&mut self, xform: Transform6) {
        self.xform = xform;
    }

    /// Construct a `Transformer` equivalent to `inner` followed by `self`.
    pub fn then(&self, inner: &Transform6) -> Self {
        Self::new(self.xform.concat(inner))
    }

    #[inline]
    fn apply(&self, p: Point2<i32>) -> Point2<i32> {
        self.xform.transform_point(p)
    }
}

impl<S: PathSink + ?Sized> LineStage<S> for Transformer {
    fn move_to(&mut self, out: &mut S, p: Point2<i32>) {
        out.move_to(self.apply(p));
    }

    fn line_join(&mut self, out: &mut S) {
        out.line_join();
    }

    fn line_to(&mut self, out: &mut S, p: Point2<i32>) {
        out.line_to(self.apply(p));
    }

    fn close(&mut self, out: &mut S) {
        out.close();
    }

    fn end(&mut self, out: &mut S) {
        out.end();
    }
}

impl<S: PathSink + ?Sized> CurveStage<S> for Transformer {
    fn quad_to(&mut self, out: &mut S, p1: Point2<i32>, p2: Point2<i32>) {
        out.quad_to(self.apply(p1), self.apply(p2));
    }

    fn cubic_to(&mut self, out: &mut S, p1: Point2<i32>, p2: Point2<i32>, p3: Point2<i32>) {
        out.cubic_to(self.apply(p1), self.apply(p2), self.apply(p3));
    }
}
