//! Scanline conversion of line paths into coverage.
//!
//! Each pixel is divided into `2^lg_x × 2^lg_y` sub-pixels. A sub-pixel is
//! covered if its center is inside the path according to the winding rule.
//! The coverage of a pixel is the number of covered sub-pixels; it is turned
//! into alpha through an alpha map and composited onto the surface.
use arrayvec::ArrayVec;
use cgmath::Point2;
use fixgeom::PixelBox;
use log::{debug, trace};

use crate::{
    blit::{alpha_map, ClearRect, CoverageRow, FillRect, RunRow, Source},
    cache::RenderCache,
    paint::{argb, Paint},
    sink::LineSink,
    surface::Surface,
};

/// The largest supported base-2 logarithm of the sub-pixel grid size along
/// each axis. Coverage values must fit in `u8`.
pub const MAX_LG_SUBPIXEL: u32 = 3;

/// Determines which regions of a self-intersecting path are inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindingRule {
    /// A point is inside if a ray from it crosses the path an odd number of
    /// times.
    EvenOdd,
    /// A point is inside if the signed crossing count is nonzero.
    NonZero,
}

impl Default for WindingRule {
    fn default() -> Self {
        WindingRule::NonZero
    }
}

impl WindingRule {
    #[inline]
    fn is_inside(self, winding: i32) -> bool {
        match self {
            WindingRule::EvenOdd => winding & 1 != 0,
            WindingRule::NonZero => winding != 0,
        }
    }
}

/// A non-horizontal edge, clipped to the sample rows of the clip rectangle.
///
/// All quantities are in sub-pixel units; `x` is S15.16 (in `i64`).
#[derive(Debug, Clone, Copy)]
struct Edge {
    /// The first sample row crossed by the edge
    row0: i32,
    /// One past the last sample row crossed by the edge
    row1: i32,
    /// `floor` of the crossing position on the current row
    x: i64,
    /// The fractional part of the crossing position, in units of `1 / dy`
    err: i64,
    /// The per-row step of `x`, split into quotient and remainder
    step: i64,
    step_err: i64,
    dy: i64,
    /// `1` for a downward edge, `-1` for an upward one
    dir: i32,
}

impl Edge {
    /// The first sample column at or right of the crossing.
    #[inline]
    fn column(&self) -> i64 {
        (self.x + 0x7fff + (self.err > 0) as i64) >> 16
    }

    #[inline]
    fn advance(&mut self) {
        self.x += self.step;
        self.err += self.step_err;
        if self.err >= self.dy {
            self.err -= self.dy;
            self.x += 1;
        }
    }
}

/// The state of the subpath being received.
#[derive(Debug, Clone, Copy)]
struct Subpath {
    start: Point2<i32>,
    cur: Point2<i32>,
}

/// Converts line paths into coverage and composites it onto a [`Surface`].
///
/// Paths are received through [`LineSink`] in device space. Each path is
/// rendered when [`LineSink::end`] is called. Open subpaths are closed
/// implicitly.
#[derive(Debug)]
pub struct Renderer<'a> {
    surface: Surface<'a>,
    lg_subpixel: [u32; 2],
    winding: WindingRule,
    /// The clip rectangle, always inside the surface bounds
    clip: PixelBox,
    paint: Paint,
    cache: Option<RenderCache>,
    /// The pixels touched by the last rendered path
    bbox: Option<PixelBox>,

    edges: Vec<Edge>,
    subpath: Option<Subpath>,
    /// The vertices of the path so far, as long as it may be a rectangle
    rect_probe: Option<ArrayVec<[Point2<i32>; 5]>>,

    // Scratch buffers
    active: Vec<Edge>,
    coverage: Vec<u8>,
    paint_row: Vec<u32>,
    /// `(max_coverage, source_alpha, table)`
    alpha_map: Option<(u32, u8, Vec<u16>)>,
}

impl<'a> Renderer<'a> {
    pub fn new(surface: Surface<'a>) -> Self {
        let clip = surface.bounds();
        Self {
            surface,
            lg_subpixel: [MAX_LG_SUBPIXEL; 2],
            winding: WindingRule::NonZero,
            clip,
            paint: Paint::default(),
            cache: None,
            bbox: None,
            edges: Vec::new(),
            subpath: None,
            rect_probe: Some(ArrayVec::new()),
            active: Vec::new(),
            coverage: Vec::new(),
            paint_row: Vec::new(),
            alpha_map: None,
        }
    }

    pub fn surface(&self) -> &Surface<'a> {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface<'a> {
        &mut self.surface
    }

    pub fn into_surface(self) -> Surface<'a> {
        self.surface
    }

    /// Set the base-2 logarithm of the sub-pixel grid size. Values are
    /// clamped to [`MAX_LG_SUBPIXEL`]. `[0, 0]` disables antialiasing.
    pub fn set_subpixel(&mut self, lg_x: u32, lg_y: u32) {
        self.lg_subpixel = [lg_x.min(MAX_LG_SUBPIXEL), lg_y.min(MAX_LG_SUBPIXEL)];
    }

    pub fn subpixel(&self) -> [u32; 2] {
        self.lg_subpixel
    }

    /// The coverage value of a fully covered pixel.
    pub fn max_coverage(&self) -> u32 {
        1 << (self.lg_subpixel[0] + self.lg_subpixel[1])
    }

    pub fn set_winding_rule(&mut self, winding: WindingRule) {
        self.winding = winding;
    }

    pub fn winding_rule(&self) -> WindingRule {
        self.winding
    }

    /// Restrict rendering to `clip`. The rectangle is intersected with the
    /// surface bounds. `None` resets it to the whole surface.
    pub fn set_clip(&mut self, clip: Option<PixelBox>) {
        let bounds = self.surface.bounds();
        self.clip = clip
            .and_then(|c| c.intersection(&bounds))
            .unwrap_or_else(|| match clip {
                Some(_) => PixelBox::zero(),
                None => bounds,
            });
    }

    pub fn clip(&self) -> PixelBox {
        self.clip
    }

    pub fn set_paint(&mut self, paint: Paint) {
        self.paint = paint;
    }

    pub fn paint(&self) -> &Paint {
        &self.paint
    }

    pub fn paint_mut(&mut self) -> &mut Paint {
        &mut self.paint
    }

    /// Direct the coverage of subsequent paths into `cache` instead of the
    /// surface. The cache is overwritten by every path.
    pub fn set_cache(&mut self, cache: Option<RenderCache>) {
        self.cache = cache;
    }

    pub fn take_cache(&mut self) -> Option<RenderCache> {
        self.cache.take()
    }

    /// The pixels touched by the last rendered path.
    pub fn bounding_box(&self) -> Option<PixelBox> {
        self.bbox
    }

    /// Overwrite a rectangle of the clip region with `color`, ignoring the
    /// current paint.
    pub fn clear_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: rgb::RGBA8) {
        let rect = PixelBox::with_size(x, y, width.max(0), height.max(0));
        if let Some(r) = rect.intersection(&self.clip) {
            self.surface.apply(ClearRect {
                x: r.min.x,
                y: r.min.y,
                width: r.width(),
                height: r.height(),
                argb: argb(color),
            });
        }
    }

    /// Composite the coverage recorded in `cache` with the current paint.
    pub fn render_from_cache(&mut self, cache: &RenderCache) {
        if !cache.is_valid() || self.paint.is_degenerate() {
            return;
        }
        let Self {
            surface,
            paint,
            paint_row,
            alpha_map: map_cache,
            ..
        } = self;

        let (alpha, source_is_color) = match paint.solid_color() {
            Some(c) => (c.a, true),
            None => (255, false),
        };
        let color = paint.solid_color().map(argb).unwrap_or(0);
        let map = cached_alpha_map(map_cache, cache.max_coverage(), alpha);

        for (y, min_x, runs) in cache.rows() {
            let source = if source_is_color {
                Source::Color(color)
            } else {
                let len: usize = runs.chunks_exact(2).map(|r| r[1] as usize).sum();
                paint_row.resize(len, 0);
                paint.paint_row(min_x, y, paint_row);
                Source::Paint(paint_row)
            };
            surface.apply(RunRow {
                x: min_x,
                y,
                runs,
                alpha_map: map,
                source,
            });
        }
        self.bbox = cache.bounding_box();
    }

    fn add_edge(&mut self, p0: Point2<i32>, p1: Point2<i32>) {
        let [lg_x, lg_y] = self.lg_subpixel;
        let (xa, ya) = ((p0.x as i64) << lg_x, (p0.y as i64) << lg_y);
        let (xb, yb) = ((p1.x as i64) << lg_x, (p1.y as i64) << lg_y);
        let (dir, xa, ya, xb, yb) = if ya <= yb {
            (1, xa, ya, xb, yb)
        } else {
            (-1, xb, yb, xa, ya)
        };

        // Rows whose sample centers `r + 0.5` lie in `[ya, yb)`
        let clip_row0 = self.clip.min.y << lg_y;
        let clip_row1 = self.clip.max.y << lg_y;
        let row0 = (((ya + 0x7fff) >> 16) as i32).max(clip_row0);
        let row1 = (((yb + 0x7fff) >> 16) as i32).min(clip_row1);
        if row0 >= row1 {
            return;
        }

        let dy = yb - ya;
        let dx = xb - xa;

        // The crossing on `row0`
        let num = ((((row0 as i64) << 16) + 0x8000 - ya) as i128) * dx as i128;
        let x = xa + num.div_euclid(dy as i128) as i64;
        let err = num.rem_euclid(dy as i128) as i64;

        let step_num = (dx as i128) << 16;
        self.edges.push(Edge {
            row0,
            row1,
            x,
            err,
            step: step_num.div_euclid(dy as i128) as i64,
            step_err: step_num.rem_euclid(dy as i128) as i64,
            dy,
            dir,
        });
    }

    fn close_subpath(&mut self) {
        if let Some(sp) = self.subpath.take() {
            if sp.cur != sp.start {
                self.add_edge(sp.cur, sp.start);
            }
        }
    }

    fn probe_push(&mut self, p: Point2<i32>) {
        if let Some(probe) = &mut self.rect_probe {
            if probe.try_push(p).is_err() {
                self.rect_probe = None;
            }
        }
    }

    /// Return the path as `[x0, y0, x1, y1]` if it's an axis-aligned
    /// rectangle.
    fn probed_rect(&self) -> Option<[i32; 4]> {
        let probe = self.rect_probe.as_ref()?;
        let mut pts = &probe[..];
        if pts.len() == 5 && pts[4] == pts[0] {
            pts = &pts[..4];
        }
        if pts.len() != 4 {
            return None;
        }
        // Edges must alternate between horizontal and vertical
        let aligned = |a: Point2<i32>, b: Point2<i32>, horz: bool| {
            if horz {
                a.y == b.y
            } else {
                a.x == b.x
            }
        };
        let horz_first = pts[0].y == pts[1].y;
        let ok = (0..4).all(|i| aligned(pts[i], pts[(i + 1) % 4], (i % 2 == 0) == horz_first));
        if !ok {
            return None;
        }
        let (x0, x1) = (pts[0].x.min(pts[2].x), pts[0].x.max(pts[2].x));
        let (y0, y1) = (pts[0].y.min(pts[2].y), pts[0].y.max(pts[2].y));
        Some([x0, y0, x1, y1])
    }

    fn reset_path(&mut self) {
        self.edges.clear();
        self.subpath = None;
        self.rect_probe = Some(ArrayVec::new());
    }

    /// Fill an axis-aligned rectangle given in device space directly.
    fn fill_rect(&mut self, rect: [i32; 4]) {
        let [lg_x, lg_y] = self.lg_subpixel;
        let cell = |v: i32, lg: u32| (((v as i64) << lg) + 0x7fff) >> 16;
        let clamp = |v: i64, lo: i32, hi: i32, lg: u32| {
            v.max((lo as i64) << lg).min((hi as i64) << lg) as i32
        };
        let clip = self.clip;
        let cells = [
            clamp(cell(rect[0], lg_x), clip.min.x, clip.max.x, lg_x),
            clamp(cell(rect[1], lg_y), clip.min.y, clip.max.y, lg_y),
            clamp(cell(rect[2], lg_x), clip.min.x, clip.max.x, lg_x),
            clamp(cell(rect[3], lg_y), clip.min.y, clip.max.y, lg_y),
        ];
        trace!("fill_rect: cells {:?}", cells);

        if cells[0] >= cells[2] || cells[1] >= cells[3] {
            self.bbox = None;
            return;
        }
        self.bbox = Some(PixelBox::new(
            Point2::new(cells[0] >> lg_x, cells[1] >> lg_y),
            Point2::new(((cells[2] - 1) >> lg_x) + 1, ((cells[3] - 1) >> lg_y) + 1),
        ));

        let color = match self.paint.solid_color() {
            Some(c) => c,
            None => return,
        };
        let max_coverage = self.max_coverage();
        let map = cached_alpha_map(&mut self.alpha_map, max_coverage, color.a);
        self.surface.apply(FillRect {
            cells,
            lg_subpixel: self.lg_subpixel,
            alpha_map: map,
            argb: argb(color),
        });
    }

    /// Scan-convert the accumulated edges.
    fn rasterize(&mut self) {
        let [lg_x, lg_y] = self.lg_subpixel;
        let max_coverage = self.max_coverage();
        let winding = self.winding;
        let clip = self.clip;

        let Self {
            surface,
            paint,
            cache,
            bbox,
            edges,
            active,
            coverage,
            paint_row,
            alpha_map: map_cache,
            ..
        } = self;

        *bbox = None;
        if let Some(cache) = cache.as_mut() {
            cache.begin(max_coverage);
        }

        let drawable = cache.is_some() || !paint.is_degenerate();
        if edges.is_empty() || clip.is_empty() || !drawable {
            if let Some(cache) = cache.as_mut() {
                cache.finish(None);
            }
            return;
        }

        edges.sort_by_key(|e| e.row0);
        let first_row = edges[0].row0;
        let last_row = edges.iter().map(|e| e.row1).max().unwrap_or(first_row);
        trace!(
            "rasterize: {} edges, sample rows {}..{}",
            edges.len(),
            first_row,
            last_row
        );

        let (alpha, color) = match paint.solid_color() {
            Some(c) => (c.a, Some(argb(c))),
            None => (255, None),
        };
        let map = cached_alpha_map(map_cache, max_coverage, alpha);

        let col_min = (clip.min.x as i64) << lg_x;
        let col_max = (clip.max.x as i64) << lg_x;
        coverage.clear();
        coverage.resize(clip.width() as usize, 0);

        active.clear();
        let mut next_edge = 0;

        let py0 = first_row >> lg_y;
        let py1 = (last_row - 1) >> lg_y;
        for py in py0..=py1 {
            // The touched pixel range of this row, relative to `clip.min.x`
            let mut touched: Option<(usize, usize)> = None;

            for row in (py << lg_y)..((py + 1) << lg_y) {
                while next_edge < edges.len() && edges[next_edge].row0 <= row {
                    active.push(edges[next_edge]);
                    next_edge += 1;
                }
                active.retain(|e| e.row1 > row);
                if active.is_empty() {
                    continue;
                }

                // Insertion sort; the order changes little between rows
                for i in 1..active.len() {
                    let mut j = i;
                    while j > 0 && active[j - 1].x > active[j].x {
                        active.swap(j - 1, j);
                        j -= 1;
                    }
                }

                let mut wind = 0;
                for i in 0..active.len() {
                    wind += active[i].dir;
                    if !winding.is_inside(wind) || i + 1 >= active.len() {
                        continue;
                    }
                    let c0 = active[i].column().max(col_min);
                    let c1 = active[i + 1].column().min(col_max);
                    if c0 >= c1 {
                        continue;
                    }
                    let span = ((c0 - col_min) as usize, (c1 - col_min) as usize);
                    accumulate(coverage, span, lg_x);

                    let (p0, p1) = (span.0 >> lg_x, (span.1 - 1) >> lg_x);
                    touched = Some(match touched {
                        Some((a, b)) => (a.min(p0), b.max(p1)),
                        None => (p0, p1),
                    });
                }

                for e in active.iter_mut() {
                    e.advance();
                }
            }

            let (t0, t1) = match touched {
                Some(t) => t,
                None => continue,
            };
            let x = clip.min.x + t0 as i32;
            let row = &mut coverage[t0..=t1];

            let row_box = PixelBox::with_size(x, py, row.len() as i32, 1);
            *bbox = Some(match *bbox {
                Some(b) => b.union(&row_box),
                None => row_box,
            });

            if let Some(cache) = cache.as_mut() {
                cache.push_row(py, x, row);
            } else {
                let source = match color {
                    Some(c) => Source::Color(c),
                    None => {
                        paint_row.resize(row.len(), 0);
                        paint.paint_row(x, py, paint_row);
                        Source::Paint(paint_row)
                    }
                };
                surface.apply(CoverageRow {
                    x,
                    y: py,
                    coverage: row,
                    alpha_map: map,
                    source,
                });
            }

            for c in row.iter_mut() {
                *c = 0;
            }
        }

        if let Some(cache) = cache.as_mut() {
            cache.finish(*bbox);
        }
    }
}

/// Add the sub-pixel span `[c0, c1)` to per-pixel coverage.
fn accumulate(coverage: &mut [u8], (c0, c1): (usize, usize), lg_x: u32) {
    let full = 1 << lg_x;
    let (p0, p1) = (c0 >> lg_x, (c1 - 1) >> lg_x);
    if p0 == p1 {
        coverage[p0] += (c1 - c0) as u8;
        return;
    }
    coverage[p0] += (((p0 + 1) << lg_x) - c0) as u8;
    for c in &mut coverage[p0 + 1..p1] {
        *c += full as u8;
    }
    coverage[p1] += (c1 - (p1 << lg_x)) as u8;
}

fn cached_alpha_map(
    cache: &mut Option<(u32, u8, Vec<u16>)>,
    max_coverage: u32,
    alpha: u8,
) -> &[u16] {
    let stale = match cache {
        Some((m, a, _)) => *m != max_coverage || *a != alpha,
        None => true,
    };
    if stale {
        *cache = Some((max_coverage, alpha, alpha_map(max_coverage, alpha)));
    }
    match cache {
        Some((_, _, table)) => &table[..],
        None => &[],
    }
}

impl LineSink for Renderer<'_> {
    fn move_to(&mut self, p: Point2<i32>) {
        self.close_subpath();
        if self.edges.is_empty() && self.rect_probe.as_ref().map_or(false, |p| p.is_empty()) {
            self.probe_push(p);
        } else {
            // More than one subpath
            self.rect_probe = None;
        }
        self.subpath = Some(Subpath { start: p, cur: p });
    }

    fn line_join(&mut self) {}

    fn line_to(&mut self, p: Point2<i32>) {
        let sp = match &mut self.subpath {
            Some(sp) => sp,
            None => {
                debug!("line_to without a current point; ignored");
                return;
            }
        };
        let cur = sp.cur;
        sp.cur = p;
        self.add_edge(cur, p);
        self.probe_push(p);
    }

    fn close(&mut self) {
        if let Some(sp) = self.subpath {
            if sp.cur != sp.start {
                self.add_edge(sp.cur, sp.start);
                self.probe_push(sp.start);
            }
            self.subpath = Some(Subpath {
                start: sp.start,
                cur: sp.start,
            });
        }
    }

    fn end(&mut self) {
        self.close_subpath();

        let rect = if self.cache.is_none() && self.paint.solid_color().is_some() {
            self.probed_rect()
        } else {
            None
        };

        match rect {
            Some(rect) => self.fill_rect(rect),
            None => self.rasterize(),
        }
        self.reset_path();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::PixelData;
    use fixgeom::from_int;
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;
    use rgb::RGBA8;

    fn pt(x: i32, y: i32) -> Point2<i32> {
        Point2::new(from_int(x), from_int(y))
    }

    fn polygon(r: &mut Renderer<'_>, pts: &[Point2<i32>]) {
        r.move_to(pts[0]);
        for &p in &pts[1..] {
            r.line_join();
            r.line_to(p);
        }
        r.close();
    }

    fn render(
        pixels: &mut [u32],
        size: u32,
        lg: u32,
        f: impl FnOnce(&mut Renderer<'_>),
    ) -> Option<PixelBox> {
        let surface = Surface::new(PixelData::Argb8888(pixels), size, size).unwrap();
        let mut r = Renderer::new(surface);
        r.set_subpixel(lg, lg);
        r.set_paint(Paint::Solid(RGBA8::new(255, 0, 0, 255)));
        f(&mut r);
        r.bounding_box()
    }

    #[test]
    fn aliased_square() {
        let mut px = vec![0u32; 400];
        let bbox = render(&mut px, 20, 0, |r| {
            polygon(r, &[pt(5, 5), pt(15, 5), pt(15, 15), pt(5, 15)]);
            r.end();
        });
        assert_eq!(bbox, Some(PixelBox::with_size(5, 5, 10, 10)));
        for y in 0..20 {
            for x in 0..20 {
                let inside = (5..15).contains(&x) && (5..15).contains(&y);
                let expected = if inside { 0xffff0000 } else { 0 };
                assert_eq!(px[y * 20 + x], expected, "({}, {})", x, y);
            }
        }
    }

    #[test]
    fn half_covered_pixel() {
        let mut px = vec![0u32; 16];
        render(&mut px, 4, 3, |r| {
            // Covers the left half of pixel (1, 1)
            polygon(
                r,
                &[
                    pt(1, 1),
                    Point2::new(from_int(1) + 0x8000, from_int(1)),
                    Point2::new(from_int(1) + 0x8000, from_int(2)),
                    pt(1, 2),
                ],
            );
            // A triangle prevents the rectangle fast path
            r.move_to(pt(3, 3));
            r.line_to(pt(3, 3));
            r.end();
        });
        let a = px[5] >> 24;
        assert!(a >= 126 && a <= 130, "{:08x}", px[5]);
        assert_eq!(px[4], 0);
        assert_eq!(px[6], 0);
    }

    #[test]
    fn winding_rules() {
        // Two overlapping squares with the same orientation
        let shape = |r: &mut Renderer<'_>| {
            polygon(r, &[pt(0, 0), pt(6, 0), pt(6, 6), pt(0, 6)]);
            polygon(r, &[pt(2, 2), pt(8, 2), pt(8, 8), pt(2, 8)]);
            r.end();
        };

        let mut nonzero = vec![0u32; 100];
        render(&mut nonzero, 10, 0, shape);
        assert_eq!(nonzero[3 * 10 + 3], 0xffff0000);

        let mut evenodd = vec![0u32; 100];
        render(&mut evenodd, 10, 0, |r| {
            r.set_winding_rule(WindingRule::EvenOdd);
            shape(r)
        });
        assert_eq!(evenodd[3 * 10 + 3], 0);
        assert_eq!(evenodd[1 * 10 + 1], 0xffff0000);
        assert_eq!(evenodd[7 * 10 + 7], 0xffff0000);
    }

    #[test]
    fn clip_rect() {
        let mut px = vec![0u32; 100];
        let bbox = render(&mut px, 10, 2, |r| {
            r.set_clip(Some(PixelBox::with_size(2, 3, 4, 2)));
            polygon(r, &[pt(0, 0), pt(10, 0), pt(9, 10), pt(0, 10)]);
            r.end();
        });
        assert_eq!(bbox, Some(PixelBox::with_size(2, 3, 4, 2)));
        for y in 0..10 {
            for x in 0..10 {
                let inside = (2..6).contains(&x) && (3..5).contains(&y);
                assert_eq!(px[y * 10 + x] != 0, inside, "({}, {})", x, y);
            }
        }
    }

    #[test]
    fn open_subpath_is_closed() {
        let mut closed = vec![0u32; 100];
        render(&mut closed, 10, 2, |r| {
            polygon(r, &[pt(1, 1), pt(9, 2), pt(4, 9)]);
            r.end();
        });
        let mut open = vec![0u32; 100];
        render(&mut open, 10, 2, |r| {
            r.move_to(pt(1, 1));
            r.line_to(pt(9, 2));
            r.line_to(pt(4, 9));
            r.end();
        });
        assert_eq!(closed, open);
    }

    #[test]
    fn cache_replay_matches_direct_rendering() {
        let shape = |r: &mut Renderer<'_>| {
            polygon(r, &[pt(1, 1), pt(9, 2), pt(4, 9)]);
            polygon(r, &[pt(3, 3), pt(5, 3), pt(5, 5)]);
            r.end();
        };

        let mut direct = vec![0u32; 100];
        render(&mut direct, 10, 3, shape);

        let mut replayed = vec![0u32; 100];
        render(&mut replayed, 10, 3, |r| {
            r.set_cache(Some(RenderCache::new()));
            shape(r);
            let cache = r.take_cache().unwrap();
            assert!(cache.is_valid());
            r.render_from_cache(&cache);
        });
        assert_eq!(direct, replayed);
    }

    #[test]
    fn recording_does_not_touch_surface() {
        let mut px = vec![0u32; 100];
        render(&mut px, 10, 1, |r| {
            r.set_cache(Some(RenderCache::new()));
            polygon(r, &[pt(1, 1), pt(9, 1), pt(9, 9), pt(1, 9)]);
            r.end();
            assert_eq!(
                r.take_cache().unwrap().bounding_box(),
                Some(PixelBox::with_size(1, 1, 8, 8))
            );
        });
        assert!(px.iter().all(|&p| p == 0));
    }

    #[test]
    fn clear_rect_respects_clip() {
        let mut px = vec![0u32; 16];
        render(&mut px, 4, 3, |r| {
            r.set_clip(Some(PixelBox::with_size(1, 0, 2, 4)));
            r.clear_rect(0, 0, 4, 1, RGBA8::new(0, 0, 255, 255));
        });
        assert_eq!(&px[0..4], &[0, 0xff0000ff, 0xff0000ff, 0]);
    }

    /// The rectangle fast path must produce the same pixels as the general
    /// scan converter.
    #[quickcheck]
    fn rect_fast_path_matches_scan_conversion(
        x: u16,
        y: u16,
        w: u16,
        h: u16,
        lg: u8,
    ) -> TestResult {
        let lg = (lg % 4) as u32;
        // Sizes in 1/16 pixels, inside a 12×12 surface with margins
        let (x, y) = ((x % 160) as i32 - 16, (y % 160) as i32 - 16);
        let (w, h) = ((w % 96) as i32, (h % 96) as i32);
        let q = |v: i32| v << 12;
        let corners = [
            Point2::new(q(x), q(y)),
            Point2::new(q(x + w), q(y)),
            Point2::new(q(x + w), q(y + h)),
            Point2::new(q(x), q(y + h)),
        ];

        let mut fast = vec![0u32; 144];
        render(&mut fast, 12, lg, |r| {
            polygon(r, &corners);
            r.end();
        });

        // An extra degenerate subpath disables the fast path
        let mut slow = vec![0u32; 144];
        render(&mut slow, 12, lg, |r| {
            polygon(r, &corners);
            r.move_to(corners[0]);
            r.end();
        });

        if fast == slow {
            TestResult::passed()
        } else {
            TestResult::error(format!("{:x?}\n{:x?}", fast, slow))
        }
    }
}
