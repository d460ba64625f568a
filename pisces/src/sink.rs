//! The path sink interface and the plumbing that connects pipeline stages.
//!
//! Coordinates are S15.16 fixed-point values (see [`fixgeom`]).
use cgmath::Point2;

/// Consumes straight-line path commands.
pub trait LineSink {
    /// Start a new subpath at `p`.
    fn move_to(&mut self, p: Point2<i32>);

    /// Mark the vertex that the following segment starts from as a
    /// user-specified corner. Vertices produced inside a flattened curve are
    /// not preceded by this marker.
    fn line_join(&mut self);

    fn line_to(&mut self, p: Point2<i32>);

    /// Close the current subpath, returning to its start point.
    fn close(&mut self);

    /// Finish the path.
    fn end(&mut self);
}

/// Consumes path commands including curves.
pub trait PathSink: LineSink {
    fn quad_to(&mut self, p1: Point2<i32>, p2: Point2<i32>);
    fn cubic_to(&mut self, p1: Point2<i32>, p2: Point2<i32>, p3: Point2<i32>);
}

impl<T: LineSink + ?Sized> LineSink for &mut T {
    #[inline]
    fn move_to(&mut self, p: Point2<i32>) {
        (**self).move_to(p)
    }
    #[inline]
    fn line_join(&mut self) {
        (**self).line_join()
    }
    #[inline]
    fn line_to(&mut self, p: Point2<i32>) {
        (**self).line_to(p)
    }
    #[inline]
    fn close(&mut self) {
        (**self).close()
    }
    #[inline]
    fn end(&mut self) {
        (**self).end()
    }
}

impl<T: PathSink + ?Sized> PathSink for &mut T {
    #[inline]
    fn quad_to(&mut self, p1: Point2<i32>, p2: Point2<i32>) {
        (**self).quad_to(p1, p2)
    }
    #[inline]
    fn cubic_to(&mut self, p1: Point2<i32>, p2: Point2<i32>, p3: Point2<i32>) {
        (**self).cubic_to(p1, p2, p3)
    }
}

/// A pipeline stage that consumes line commands and writes its output to a
/// sink `S` supplied with every call.
///
/// Stages own only their state, not their downstream sink. This lets an
/// owner keep a stage around across calls (e.g., a flattener remembering the
/// current point) while lending the downstream sink only for the duration of
/// a call. Use [`Pipe`] to bind a stage to a sink.
pub trait LineStage<S: ?Sized> {
    fn move_to(&mut self, out: &mut S, p: Point2<i32>);
    fn line_join(&mut self, out: &mut S);
    fn line_to(&mut self, out: &mut S, p: Point2<i32>);
    fn close(&mut self, out: &mut S);
    fn end(&mut self, out: &mut S);
}

/// A [`LineStage`] that also consumes curves.
pub trait CurveStage<S: ?Sized>: LineStage<S> {
    fn quad_to(&mut self, out: &mut S, p1: Point2<i32>, p2: Point2<i32>);
    fn cubic_to(&mut self, out: &mut S, p1: Point2<i32>, p2: Point2<i32>, p3: Point2<i32>);
}

/// Binds a stage to the sink receiving its output.
pub struct Pipe<'a, T: ?Sized, S: ?Sized> {
    stage: &'a mut T,
    sink: &'a mut S,
}

impl<'a, T: ?Sized, S: ?Sized> Pipe<'a, T, S> {
    #[inline]
    pub fn new(stage: &'a mut T, sink: &'a mut S) -> Self {
        Self { stage, sink }
    }
}

impl<T: LineStage<S> + ?Sized, S: ?Sized> LineSink for Pipe<'_, T, S> {
    #[inline]
    fn move_to(&mut self, p: Point2<i32>) {
        self.stage.move_to(self.sink, p)
    }
    #[inline]
    fn line_join(&mut self) {
        self.stage.line_join(self.sink)
    }
    #[inline]
    fn line_to(&mut self, p: Point2<i32>) {
        self.stage.line_to(self.sink, p)
    }
    #[inline]
    fn close(&mut self) {
        self.stage.close(self.sink)
    }
    #[inline]
    fn end(&mut self) {
        self.stage.end(self.sink)
    }
}

impl<T: CurveStage<S> + ?Sized, S: ?Sized> PathSink for Pipe<'_, T, S> {
    #[inline]
    fn quad_to(&mut self, p1: Point2<i32>, p2: Point2<i32>) {
        self.stage.quad_to(self.sink, p1, p2)
    }
    #[inline]
    fn cubic_to(&mut self, p1: Point2<i32>, p2: Point2<i32>, p3: Point2<i32>) {
        self.stage.cubic_to(self.sink, p1, p2, p3)
    }
}

/// A recorded path command. Used by tests and debugging aids to capture the
/// output of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmd {
    MoveTo(Point2<i32>),
    LineJoin,
    LineTo(Point2<i32>),
    QuadTo(Point2<i32>, Point2<i32>),
    CubicTo(Point2<i32>, Point2<i32>, Point2<i32>),
    Close,
    End,
}

impl LineSink for Vec<Cmd> {
    fn move_to(&mut self, p: Point2<i32>) {
        self.push(Cmd::MoveTo(p));
    }
    fn line_join(&mut self) {
        self.push(Cmd::LineJoin);
    }
    fn line_to(&mut self, p: Point2<i32>) {
        self.push(Cmd::LineTo(p));
    }
    fn close(&mut self) {
        self.push(Cmd::Close);
    }
    fn end(&mut self) {
        self.push(Cmd::End);
    }
}

impl PathSink for Vec<Cmd> {
    fn quad_to(&mut self, p1: Point2<i32>, p2: Point2<i32>) {
        self.push(Cmd::QuadTo(p1, p2));
    }
    fn cubic_to(&mut self, p1: Point2<i32>, p2: Point2<i32>, p3: Point2<i32>) {
        self.push(Cmd::CubicTo(p1, p2, p3));
    }
}
