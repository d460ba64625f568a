//! The stateful rendering façade.
use bitflags::bitflags;
use cgmath::Point2;
use fixgeom::{from_f32, from_int, PixelBox, Transform6};
use log::{debug, trace};
use rgb::RGBA8;
use std::sync::Arc;

use crate::{
    cache::RenderCache,
    config::Config,
    dash::Dasher,
    flatten::Flattener,
    paint::{
        CycleMethod, GradientColorMap, GradientStop, LinearGradient, Paint, RadialGradient,
        Texture,
    },
    pathstore::PathStore,
    rast::{Renderer, WindingRule},
    shapes::{self, ArcType, Outline},
    sink::{LineSink, PathSink, Pipe},
    stroke::{JoinStyle, StrokeParams, Stroker},
    surface::Surface,
    xformer::Transformer,
    Result,
};

/// Shapes larger than this (in pixels) are not drawn.
const MAX_SHAPE_SIZE: i32 = 16384 << 16;

/// √2 in S15.16, the miter ratio of a right-angle corner.
const SQRT_TWO: i32 = 92682;

/// Command codes of [`PiscesRenderer::set_path_data`].
pub mod path_cmd {
    pub const MOVE_TO: u8 = 0;
    pub const LINE_TO: u8 = 1;
    pub const QUAD_TO: u8 = 2;
    pub const CUBIC_TO: u8 = 3;
    pub const CLOSE: u8 = 4;
}

bitflags! {
    /// The sink chains that need to be rebuilt before use.
    struct ChainFlags: u8 {
        const FILL = 1;
        const STROKE = 1 << 1;
        const TEXT = 1 << 2;
    }
}

/// Selects the chain receiving the path commands sent to a
/// [`PiscesRenderer`] directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathMode {
    Fill,
    Stroke,
}

impl Default for PathMode {
    fn default() -> Self {
        PathMode::Fill
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chain {
    Fill,
    Stroke,
    Text,
}

/// A 2D renderer drawing onto a borrowed [`Surface`].
///
/// Path commands are accepted between [`begin_rendering`] and
/// [`end_rendering`], in user space, and routed through the chain selected
/// by [`set_path_mode`]:
///
///  - Fill: transformer → flattener → scan converter
///  - Stroke: transformer → flattener → dasher (optional) → stroker → scan
///    converter
///
/// A third chain (text) renders [`PathStore`]s. The shape methods
/// (`fill_rect`, `draw_oval`, ...) open and close their own bracket.
///
/// [`begin_rendering`]: PiscesRenderer::begin_rendering
/// [`end_rendering`]: PiscesRenderer::end_rendering
/// [`set_path_mode`]: PiscesRenderer::set_path_mode
#[derive(Debug)]
pub struct PiscesRenderer<'a> {
    config: Config,
    rdr: Renderer<'a>,

    transform: Transform6,
    stroke: StrokeParams,
    winding: WindingRule,
    antialiasing: bool,
    /// The user clip; `None` means the whole surface
    clip: Option<PixelBox>,
    color: RGBA8,
    gradient_map: Option<Arc<GradientColorMap>>,

    mode: PathMode,
    rendering: bool,
    /// A fill subpath was started and not closed
    subpath_open: bool,

    dirty: ChainFlags,
    fill_xform: Transformer,
    fill_flattener: Flattener,
    stroke_xform: Transformer,
    stroke_flattener: Flattener,
    dasher: Option<Dasher>,
    stroker: Stroker,
    text_xform: Transformer,
    text_flattener: Flattener,
    /// The extra transformation the text chain was built with
    text_extra: Option<Transform6>,
}

impl<'a> PiscesRenderer<'a> {
    pub fn new(surface: Surface<'a>) -> Self {
        Self::with_config(surface, Config::default())
    }

    pub fn with_config(surface: Surface<'a>, config: Config) -> Self {
        let stroke = StrokeParams::default();
        let mut this = Self {
            config,
            rdr: Renderer::new(surface),
            transform: Transform6::identity(),
            winding: WindingRule::NonZero,
            antialiasing: config.antialiasing(),
            clip: None,
            color: RGBA8::new(0, 0, 0, 255),
            gradient_map: None,
            mode: PathMode::Fill,
            rendering: false,
            subpath_open: false,
            dirty: ChainFlags::all(),
            fill_xform: Transformer::default(),
            fill_flattener: Flattener::new(config.fill_flatness()),
            stroke_xform: Transformer::default(),
            stroke_flattener: Flattener::new(config.stroke_flatness()),
            dasher: None,
            stroker: Stroker::new(&stroke, &Transform6::identity()),
            stroke,
            text_xform: Transformer::default(),
            text_flattener: Flattener::new(config.fill_flatness()),
            text_extra: None,
        };
        this.apply_antialiasing();
        this
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn surface(&self) -> &Surface<'a> {
        self.rdr.surface()
    }

    pub fn into_surface(self) -> Surface<'a> {
        self.rdr.into_surface()
    }

    // ----------------------------------------------------------------------
    // State

    /// Set the transformation from user space to device space.
    pub fn set_transform(&mut self, xform: Transform6) {
        self.transform = xform;
        self.dirty = ChainFlags::all();
        self.rdr.paint_mut().set_drawing_transform(&xform);
    }

    pub fn transform(&self) -> &Transform6 {
        &self.transform
    }

    pub fn set_stroke(&mut self, params: StrokeParams) {
        self.stroke = params;
        self.dirty |= ChainFlags::STROKE;
    }

    pub fn stroke(&self) -> &StrokeParams {
        &self.stroke
    }

    pub fn set_winding_rule(&mut self, winding: WindingRule) {
        self.winding = winding;
    }

    pub fn winding_rule(&self) -> WindingRule {
        self.winding
    }

    pub fn set_path_mode(&mut self, mode: PathMode) {
        debug_assert!(!self.rendering, "path mode changed while rendering");
        self.mode = mode;
    }

    pub fn set_antialiasing(&mut self, value: bool) {
        if self.antialiasing != value {
            self.antialiasing = value;
            self.dirty = ChainFlags::all();
            self.apply_antialiasing();
        }
    }

    pub fn antialiasing(&self) -> bool {
        self.antialiasing
    }

    fn apply_antialiasing(&mut self) {
        let [lg_x, lg_y] = if self.antialiasing {
            self.config.subpixel()
        } else {
            [0, 0]
        };
        self.rdr.set_subpixel(lg_x, lg_y);
    }

    /// Restrict drawing to a rectangle of pixels.
    pub fn set_clip(&mut self, x: i32, y: i32, width: i32, height: i32) {
        let clip = PixelBox::with_size(x, y, width.max(0), height.max(0));
        self.clip = Some(clip);
        self.rdr.set_clip(self.clip);
    }

    pub fn reset_clip(&mut self) {
        self.clip = None;
        self.rdr.set_clip(None);
    }

    pub fn clip(&self) -> PixelBox {
        self.rdr.clip()
    }

    /// The pixels touched by the last rendered primitive, intersected with
    /// the clip.
    pub fn bounding_box(&self) -> Option<PixelBox> {
        self.rdr.bounding_box()
    }

    // ----------------------------------------------------------------------
    // Paint

    pub fn set_color(&mut self, color: RGBA8) {
        self.color = color;
        self.gradient_map = None;
        self.rdr.set_paint(Paint::Solid(color));
    }

    pub fn paint(&self) -> &Paint {
        self.rdr.paint()
    }

    fn color_map(
        &mut self,
        stops: &[GradientStop],
        cycle: CycleMethod,
    ) -> Result<Arc<GradientColorMap>> {
        if let Some(map) = &self.gradient_map {
            if map.matches(stops, cycle) {
                return Ok(Arc::clone(map));
            }
        }
        debug!("Building a color map for {} stops ({:?})", stops.len(), cycle);
        let map = Arc::new(GradientColorMap::new(stops, cycle)?);
        self.gradient_map = Some(Arc::clone(&map));
        Ok(map)
    }

    fn set_paint(&mut self, mut paint: Paint) {
        paint.set_drawing_transform(&self.transform);
        if paint.is_degenerate() {
            debug!("Degenerate paint; drawing will have no effect");
        }
        self.rdr.set_paint(paint);
    }

    /// Paint with a linear gradient from `p0` to `p1`. Points are in paint
    /// space, which `paint_xform` maps to user space.
    pub fn set_linear_gradient(
        &mut self,
        p0: Point2<i32>,
        p1: Point2<i32>,
        stops: &[GradientStop],
        cycle: CycleMethod,
        paint_xform: Transform6,
    ) -> Result<()> {
        let map = self.color_map(stops, cycle)?;
        self.set_paint(Paint::Linear(LinearGradient::new(p0, p1, map, paint_xform)));
        Ok(())
    }

    /// Paint with a radial gradient. The focus is moved inside the circle if
    /// necessary.
    pub fn set_radial_gradient(
        &mut self,
        center: Point2<i32>,
        focus: Point2<i32>,
        radius: i32,
        stops: &[GradientStop],
        cycle: CycleMethod,
        paint_xform: Transform6,
    ) -> Result<()> {
        let map = self.color_map(stops, cycle)?;
        self.set_paint(Paint::Radial(RadialGradient::new(
            center,
            focus,
            radius,
            map,
            paint_xform,
        )));
        Ok(())
    }

    /// Paint with an image of `0xAARRGGBB` texels.
    pub fn set_texture(
        &mut self,
        data: &[u32],
        width: u32,
        height: u32,
        stride: usize,
        repeat: bool,
        paint_xform: Transform6,
    ) -> Result<()> {
        let texture = Texture::new(data, width, height, stride, repeat, paint_xform)?;
        self.gradient_map = None;
        self.set_paint(Paint::Texture(texture));
        Ok(())
    }

    /// Set the rendering quality of the current texture paint (S15.16 in
    /// `[0, 1]`).
    pub fn set_texture_quality(&mut self, quality: i32) {
        if let Paint::Texture(t) = self.rdr.paint_mut() {
            t.set_quality(quality);
        }
    }

    // ----------------------------------------------------------------------
    // Chains

    fn stroke_transform(&self) -> Transform6 {
        let [bx, by] = self.config.stroke_bias();
        Transform6::translation(bx, by).concat(&self.transform)
    }

    fn validate(&mut self, chain: Chain) {
        match chain {
            Chain::Fill if self.dirty.contains(ChainFlags::FILL) => {
                debug!("Rebuilding the fill chain");
                self.fill_xform = Transformer::new(self.transform);
                self.fill_flattener = Flattener::new(self.config.fill_flatness());
                self.dirty.remove(ChainFlags::FILL);
            }
            Chain::Stroke if self.dirty.contains(ChainFlags::STROKE) => {
                debug!("Rebuilding the stroke chain");
                let xform = self.stroke_transform();
                self.stroke_xform = Transformer::new(xform);
                self.stroke_flattener = Flattener::new(self.config.stroke_flatness());
                self.dasher = Dasher::new(&self.stroke.dash, self.stroke.dash_phase, &xform);
                self.stroker = Stroker::new(&self.stroke, &xform);
                self.dirty.remove(ChainFlags::STROKE);
            }
            Chain::Text if self.dirty.contains(ChainFlags::TEXT) => {
                debug!("Rebuilding the text chain");
                let base = Transformer::new(self.transform);
                self.text_xform = match &self.text_extra {
                    Some(extra) => base.then(extra),
                    None => base,
                };
                self.text_flattener = Flattener::new(self.config.fill_flatness());
                self.dirty.remove(ChainFlags::TEXT);
            }
            _ => {}
        }
    }

    /// Call `f` with the head of a chain.
    fn with_chain<R>(&mut self, chain: Chain, f: impl FnOnce(&mut dyn PathSink) -> R) -> R {
        self.validate(chain);
        match chain {
            Chain::Fill => {
                let mut flat = Pipe::new(&mut self.fill_flattener, &mut self.rdr);
                f(&mut Pipe::new(&mut self.fill_xform, &mut flat))
            }
            Chain::Text => {
                let mut flat = Pipe::new(&mut self.text_flattener, &mut self.rdr);
                f(&mut Pipe::new(&mut self.text_xform, &mut flat))
            }
            Chain::Stroke => {
                let mut stroker = Pipe::new(&mut self.stroker, &mut self.rdr);
                match &mut self.dasher {
                    Some(dasher) => {
                        let mut dash = Pipe::new(dasher, &mut stroker);
                        let mut flat = Pipe::new(&mut self.stroke_flattener, &mut dash);
                        f(&mut Pipe::new(&mut self.stroke_xform, &mut flat))
                    }
                    None => {
                        let mut flat = Pipe::new(&mut self.stroke_flattener, &mut stroker);
                        f(&mut Pipe::new(&mut self.stroke_xform, &mut flat))
                    }
                }
            }
        }
    }

    fn active_chain(&self) -> Chain {
        match self.mode {
            PathMode::Fill => Chain::Fill,
            PathMode::Stroke => Chain::Stroke,
        }
    }

    // ----------------------------------------------------------------------
    // Rendering bracket

    /// Start receiving a path, clipped to the clip rectangle. `winding` is
    /// used for filling; strokes always use the nonzero rule.
    pub fn begin_rendering(&mut self, winding: WindingRule) {
        self.begin_rendering_with(None, self.mode, winding);
    }

    /// Start receiving a path, clipped to the intersection of the clip
    /// rectangle and the given region.
    pub fn begin_rendering_region(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        winding: WindingRule,
    ) {
        let region = PixelBox::with_size(x, y, width.max(0), height.max(0));
        self.begin_rendering_with(Some(region), self.mode, winding);
    }

    fn begin_rendering_with(
        &mut self,
        region: Option<PixelBox>,
        mode: PathMode,
        winding: WindingRule,
    ) {
        debug_assert!(!self.rendering, "begin_rendering called twice");
        self.rendering = true;
        self.subpath_open = false;

        let clip = match (region, self.clip) {
            (Some(r), Some(c)) => Some(r.intersection(&c).unwrap_or_else(PixelBox::zero)),
            (Some(r), None) => Some(r),
            (None, c) => c,
        };
        self.rdr.set_clip(clip);
        self.rdr.set_winding_rule(match mode {
            PathMode::Fill => winding,
            PathMode::Stroke => WindingRule::NonZero,
        });
    }

    /// Render the path received since [`PiscesRenderer::begin_rendering`].
    pub fn end_rendering(&mut self) {
        if !self.check_rendering() {
            return;
        }
        let chain = self.active_chain();
        self.finish_path(chain);
    }

    fn finish_path(&mut self, chain: Chain) {
        if chain != Chain::Stroke && self.subpath_open {
            self.with_chain(chain, |s| s.close());
        }
        self.with_chain(chain, |s| s.end());
        self.subpath_open = false;
        self.rendering = false;
        self.rdr.set_clip(self.clip);
        trace!("end_rendering: bbox = {:?}", self.rdr.bounding_box());
    }

    fn check_rendering(&self) -> bool {
        debug_assert!(self.rendering, "path command outside begin_rendering/end_rendering");
        self.rendering
    }

    // ----------------------------------------------------------------------
    // Path commands

    pub fn move_to(&mut self, p: Point2<i32>) {
        if !self.check_rendering() {
            return;
        }
        let chain = self.active_chain();
        let auto_close = chain == Chain::Fill && self.subpath_open;
        self.with_chain(chain, |s| {
            if auto_close {
                s.close();
            }
            s.move_to(p)
        });
        self.subpath_open = true;
    }

    pub fn line_to(&mut self, p: Point2<i32>) {
        if self.check_rendering() {
            let chain = self.active_chain();
            self.with_chain(chain, |s| s.line_to(p));
        }
    }

    pub fn quad_to(&mut self, p1: Point2<i32>, p2: Point2<i32>) {
        if self.check_rendering() {
            let chain = self.active_chain();
            self.with_chain(chain, |s| s.quad_to(p1, p2));
        }
    }

    pub fn cubic_to(&mut self, p1: Point2<i32>, p2: Point2<i32>, p3: Point2<i32>) {
        if self.check_rendering() {
            let chain = self.active_chain();
            self.with_chain(chain, |s| s.cubic_to(p1, p2, p3));
        }
    }

    pub fn close(&mut self) {
        if self.check_rendering() {
            let chain = self.active_chain();
            self.with_chain(chain, |s| s.close());
            self.subpath_open = false;
        }
    }

    /// Send a path given as command codes (see [`path_cmd`]) and `f32`
    /// user-space coordinates to the active chain. A command whose
    /// coordinates are missing ends the path data.
    pub fn set_path_data(&mut self, commands: &[u8], coords: &[f32]) {
        if !self.check_rendering() {
            return;
        }
        let mut coords = coords
            .chunks_exact(2)
            .map(|c| Point2::new(from_f32(c[0]), from_f32(c[1])));
        for &cmd in commands {
            let arity = match cmd {
                path_cmd::MOVE_TO | path_cmd::LINE_TO => 1,
                path_cmd::QUAD_TO => 2,
                path_cmd::CUBIC_TO => 3,
                path_cmd::CLOSE => 0,
                _ => {
                    debug!("set_path_data: unknown command {}; ignored", cmd);
                    continue;
                }
            };
            let mut pts = [Point2::new(0, 0); 3];
            for p in pts.iter_mut().take(arity) {
                match coords.next() {
                    Some(c) => *p = c,
                    None => {
                        debug!("set_path_data: coordinates exhausted");
                        return;
                    }
                }
            }
            match cmd {
                path_cmd::MOVE_TO => self.move_to(pts[0]),
                path_cmd::LINE_TO => self.line_to(pts[0]),
                path_cmd::QUAD_TO => self.quad_to(pts[0], pts[1]),
                path_cmd::CUBIC_TO => self.cubic_to(pts[0], pts[1], pts[2]),
                _ => self.close(),
            }
        }
    }

    /// Fill a path given as command codes and coordinates (see
    /// [`PiscesRenderer::set_path_data`]) with the specified winding rule.
    ///
    /// If `cache` is valid, it's replayed and the path data is not examined.
    /// If it's invalid, the path is recorded into it and then replayed. The
    /// caller is responsible for invalidating the cache when the path, the
    /// transformation, the winding rule, or the clip changes.
    pub fn render_path(
        &mut self,
        commands: &[u8],
        coords: &[f32],
        winding: WindingRule,
        cache: Option<&mut RenderCache>,
    ) {
        let saved_mode = std::mem::replace(&mut self.mode, PathMode::Fill);

        match cache {
            Some(cache) if cache.is_valid() => {
                debug!("render_path: replaying {} bytes of coverage", cache.encoded_len());
                self.rdr.render_from_cache(cache);
            }
            Some(cache) => {
                self.rdr.set_cache(Some(std::mem::replace(cache, RenderCache::new())));
                self.begin_rendering(winding);
                self.set_path_data(commands, coords);
                self.end_rendering();
                if let Some(recorded) = self.rdr.take_cache() {
                    *cache = recorded;
                }
                debug!("render_path: recorded {} bytes of coverage", cache.encoded_len());
                self.rdr.render_from_cache(cache);
            }
            None => {
                self.begin_rendering(winding);
                self.set_path_data(commands, coords);
                self.end_rendering();
            }
        }

        self.mode = saved_mode;
    }

    /// Fill a recorded path (e.g., a glyph outline) through the text chain.
    /// `extra` is applied before the current transformation.
    pub fn fill_path_store(&mut self, path: &PathStore, extra: Option<&Transform6>) {
        if self.text_extra.as_ref() != extra {
            self.text_extra = extra.cloned();
            self.dirty |= ChainFlags::TEXT;
        }
        self.begin_rendering_with(None, PathMode::Fill, self.winding);
        self.with_chain(Chain::Text, |s| {
            path.produce(s);
            if !path.is_terminated() {
                s.end();
            }
        });
        self.rendering = false;
        self.rdr.set_clip(self.clip);
    }

    // ----------------------------------------------------------------------
    // Shapes

    /// Draw `outlines` as a single path through `chain`.
    fn draw_outlines(&mut self, chain: Chain, outlines: &[Outline]) {
        let mode = match chain {
            Chain::Stroke => PathMode::Stroke,
            _ => PathMode::Fill,
        };
        self.begin_rendering_with(None, mode, self.winding);
        self.with_chain(chain, |s| {
            for o in outlines {
                o.emit(s);
            }
        });
        self.finish_path(chain);
    }

    fn check_size(&self, what: &str, w: i32, h: i32) -> bool {
        if w <= 0 || h <= 0 {
            return false;
        }
        if w > MAX_SHAPE_SIZE || h > MAX_SHAPE_SIZE {
            debug!("{}: size {}x{} is too large; ignored", what, w, h);
            return false;
        }
        true
    }

    /// The stroke outlines can be computed by offsetting shapes in user
    /// space instead of running the stroker.
    fn can_offset_stroke(&self) -> bool {
        self.stroke.join == JoinStyle::Miter
            && self.stroke.miter_limit >= SQRT_TWO
            && self.stroke.dash.is_empty()
            && self.stroke.width > 0
            && self.config.stroke_bias() == [0, 0]
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32) {
        if self.check_size("fill_rect", w, h) {
            self.draw_outlines(Chain::Fill, &[shapes::rect(x, y, w, h)]);
        }
    }

    pub fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32) {
        if !self.check_size("draw_rect", w, h) {
            return;
        }
        let lw = self.stroke.width;
        if self.can_offset_stroke() && w > lw && h > lw {
            let hw = lw / 2;
            let outer = shapes::rect(x - hw, y - hw, w + lw, h + lw);
            let inner = shapes::rect(x + hw, y + hw, w - lw, h - lw).reversed();
            trace!("draw_rect: nested rectangles");
            self.draw_with_fill_rule(&[outer, inner]);
        } else {
            self.draw_outlines(Chain::Stroke, &[shapes::rect(x, y, w, h)]);
        }
    }

    pub fn fill_oval(&mut self, x: i32, y: i32, w: i32, h: i32) {
        if self.check_size("fill_oval", w, h) {
            self.draw_outlines(Chain::Fill, &[shapes::oval(x, y, w, h)]);
        }
    }

    pub fn draw_oval(&mut self, x: i32, y: i32, w: i32, h: i32) {
        if !self.check_size("draw_oval", w, h) {
            return;
        }
        let lw = self.stroke.width;
        let circle = w == h
            && self.stroke.dash.is_empty()
            && lw > 0
            && self.config.stroke_bias() == [0, 0];
        if circle {
            let hw = lw / 2;
            let outer = shapes::oval(x - hw, y - hw, w + lw, h + lw);
            if w > lw {
                let inner = shapes::oval(x + hw, y + hw, w - lw, h - lw).reversed();
                self.draw_with_fill_rule(&[outer, inner]);
            } else {
                self.draw_with_fill_rule(&[outer]);
            }
        } else {
            self.draw_outlines(Chain::Stroke, &[shapes::oval(x, y, w, h)]);
        }
    }

    pub fn fill_round_rect(&mut self, x: i32, y: i32, w: i32, h: i32, arc_w: i32, arc_h: i32) {
        if self.check_size("fill_round_rect", w, h) {
            self.draw_outlines(Chain::Fill, &[shapes::round_rect(x, y, w, h, arc_w, arc_h)]);
        }
    }

    pub fn draw_round_rect(&mut self, x: i32, y: i32, w: i32, h: i32, arc_w: i32, arc_h: i32) {
        if !self.check_size("draw_round_rect", w, h) {
            return;
        }
        let lw = self.stroke.width;
        // Without arcs the corners are joins
        let fast = arc_w == arc_h
            && arc_w <= w.min(h)
            && (arc_w > 0 || self.can_offset_stroke())
            && self.stroke.dash.is_empty()
            && lw > 0
            && w > lw
            && h > lw
            && self.config.stroke_bias() == [0, 0];
        if fast {
            let hw = lw / 2;
            let outer = shapes::round_rect(x - hw, y - hw, w + lw, h + lw, arc_w + lw, arc_h + lw);
            let inner_arc = (arc_w - lw).max(0);
            let inner =
                shapes::round_rect(x + hw, y + hw, w - lw, h - lw, inner_arc, inner_arc).reversed();
            self.draw_with_fill_rule(&[outer, inner]);
        } else {
            self.draw_outlines(Chain::Stroke, &[shapes::round_rect(x, y, w, h, arc_w, arc_h)]);
        }
    }

    /// Fill an arc of the ellipse inscribed in the given rectangle. Angles
    /// are in degrees (S15.16).
    #[allow(clippy::too_many_arguments)]
    pub fn fill_arc(&mut self, x: i32, y: i32, w: i32, h: i32, start: i32, extent: i32, ty: ArcType) {
        if self.check_size("fill_arc", w, h) && extent != 0 {
            self.draw_outlines(Chain::Fill, &[shapes::arc(x, y, w, h, start, extent, ty)]);
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw_arc(&mut self, x: i32, y: i32, w: i32, h: i32, start: i32, extent: i32, ty: ArcType) {
        if self.check_size("draw_arc", w, h) && extent != 0 {
            self.draw_outlines(Chain::Stroke, &[shapes::arc(x, y, w, h, start, extent, ty)]);
        }
    }

    pub fn draw_line(&mut self, p0: Point2<i32>, p1: Point2<i32>) {
        self.begin_rendering_with(None, PathMode::Stroke, WindingRule::NonZero);
        self.with_chain(Chain::Stroke, |s| {
            s.move_to(p0);
            s.line_to(p1);
        });
        self.finish_path(Chain::Stroke);
    }

    /// Fill nested outlines with the nonzero rule through the fill chain.
    fn draw_with_fill_rule(&mut self, outlines: &[Outline]) {
        let saved = self.winding;
        self.winding = WindingRule::NonZero;
        self.draw_outlines(Chain::Fill, outlines);
        self.winding = saved;
    }

    /// Overwrite a rectangle of device pixels with the current color,
    /// without blending. The clip rectangle applies.
    pub fn clear_rect(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.rdr.clear_rect(x, y, width, height, self.color);
    }
}

impl LineSink for PiscesRenderer<'_> {
    fn move_to(&mut self, p: Point2<i32>) {
        PiscesRenderer::move_to(self, p)
    }

    fn line_join(&mut self) {}

    fn line_to(&mut self, p: Point2<i32>) {
        PiscesRenderer::line_to(self, p)
    }

    fn close(&mut self) {
        PiscesRenderer::close(self)
    }

    fn end(&mut self) {
        self.end_rendering()
    }
}

impl PathSink for PiscesRenderer<'_> {
    fn quad_to(&mut self, p1: Point2<i32>, p2: Point2<i32>) {
        PiscesRenderer::quad_to(self, p1, p2)
    }

    fn cubic_to(&mut self, p1: Point2<i32>, p2: Point2<i32>, p3: Point2<i32>) {
        PiscesRenderer::cubic_to(self, p1, p2, p3)
    }
}

/// Convert integer pixel coordinates to a point.
pub fn pt(x: i32, y: i32) -> Point2<i32> {
    Point2::new(from_int(x), from_int(y))
}
