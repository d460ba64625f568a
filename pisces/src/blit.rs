//! Source-over compositing of coverage into destination pixels.
//!
//! Coverage is converted to an alpha value in `0..=MAX_ALPHA` through an
//! alpha map (see [`alpha_map`]). Alpha `0` leaves a pixel untouched and
//! `MAX_ALPHA` stores the source exactly; other values blend.
use itertools::izip;
use lazy_static::lazy_static;

use crate::surface::{Layout, SurfaceOp};

/// The alpha value representing full opacity.
pub const MAX_ALPHA: u32 = 256;
const HALF_ALPHA: u32 = MAX_ALPHA >> 1;
const ALPHA_SHIFT: u32 = 8;

lazy_static! {
    static ref CONVERT_8_TO_5: [u8; 256] = {
        let mut t = [0; 256];
        for (i, x) in t.iter_mut().enumerate() {
            *x = ((i * 31 + 127) / 255) as u8;
        }
        t
    };
    static ref CONVERT_8_TO_6: [u8; 256] = {
        let mut t = [0; 256];
        for (i, x) in t.iter_mut().enumerate() {
            *x = ((i * 63 + 127) / 255) as u8;
        }
        t
    };
}

/// Build a table mapping a coverage value in `0..=max_coverage` to an alpha
/// value in `0..=MAX_ALPHA`, scaled by a source alpha in `0..=255`.
pub fn alpha_map(max_coverage: u32, source_alpha: u8) -> Vec<u16> {
    let max_coverage = max_coverage.max(1) as u64;
    let denom = max_coverage * 255;
    (0..=max_coverage)
        .map(|c| ((c * source_alpha as u64 * MAX_ALPHA as u64 + denom / 2) / denom) as u16)
        .collect()
}

/// Combine an alpha value with a non-premultiplied paint alpha.
#[inline]
fn modulate(aval: u32, paint_alpha: u32) -> u32 {
    (aval * paint_alpha + 127) / 255
}

/// Luminance of an RGB triple.
#[inline]
pub fn gray(r: u32, g: u32, b: u32) -> u32 {
    // The weights sum to slightly more than `1 << 16`
    ((19961 * r + 38666 * g + 7209 * b) >> 16).min(255)
}

#[inline]
fn lerp8(d: u32, s: u32, aval: u32) -> u32 {
    (((d << ALPHA_SHIFT) as i32 + (s as i32 - d as i32) * aval as i32 + HALF_ALPHA as i32)
        >> ALPHA_SHIFT) as u32
}

/// A pixel format. Implementors are zero-sized markers; blending loops are
/// instantiated for each of them.
pub trait Format {
    type Elem: Copy;

    /// A source color prepared for repeated blending.
    type Src: Copy;

    fn prepare(argb: u32) -> Self::Src;

    /// The element written when the source is stored without blending.
    fn store(src: &Self::Src) -> Self::Elem;

    /// Blend `src` over `dst` with an alpha value in `1..MAX_ALPHA`.
    fn blend(dst: &mut Self::Elem, src: &Self::Src, aval: u32);

    /// Convert an element to `0xAARRGGBB`.
    fn to_argb(e: Self::Elem) -> u32;
}

pub enum Rgb888 {}
pub enum Argb8888 {}
pub enum Rgb565 {}
pub enum Gray8 {}

impl Format for Rgb888 {
    type Elem = u32;
    type Src = u32;

    #[inline]
    fn prepare(argb: u32) -> u32 {
        argb | 0xff000000
    }

    #[inline]
    fn store(src: &u32) -> u32 {
        *src
    }

    #[inline]
    fn blend(dst: &mut u32, src: &u32, aval: u32) {
        let d = *dst;
        let r = lerp8((d >> 16) & 0xff, (src >> 16) & 0xff, aval);
        let g = lerp8((d >> 8) & 0xff, (src >> 8) & 0xff, aval);
        let b = lerp8(d & 0xff, src & 0xff, aval);
        *dst = 0xff000000 | (r << 16) | (g << 8) | b;
    }

    #[inline]
    fn to_argb(e: u32) -> u32 {
        e | 0xff000000
    }
}

impl Format for Argb8888 {
    type Elem = u32;
    type Src = u32;

    #[inline]
    fn prepare(argb: u32) -> u32 {
        argb
    }

    #[inline]
    fn store(src: &u32) -> u32 {
        *src
    }

    #[inline]
    fn blend(dst: &mut u32, src: &u32, aval: u32) {
        let d = *dst;
        let da = ((d >> 24) & 0xff) as i64;
        let aval = aval as i64;

        let denom = 256 * da + aval * (255 - da);
        if denom == 0 {
            // Both alphas are zero
            *dst = 0;
            return;
        }

        let recip = (1i64 << 24) / denom;
        let fa = (256 - aval) * da * recip;
        let fb = 255 * aval * recip;
        let channel = |shift: u32| {
            let dc = ((d >> shift) & 0xff) as i64;
            let sc = ((src >> shift) & 0xff) as i64;
            (((fa * dc + fb * sc) >> 24) as u32).min(255)
        };
        let oa = (denom >> 8) as u32;
        *dst = (oa << 24) | (channel(16) << 16) | (channel(8) << 8) | channel(0);
    }

    #[inline]
    fn to_argb(e: u32) -> u32 {
        e
    }
}

impl Format for Rgb565 {
    type Elem = u16;
    /// `[r5, g6, b5]`
    type Src = [u32; 3];

    #[inline]
    fn prepare(argb: u32) -> [u32; 3] {
        [
            CONVERT_8_TO_5[((argb >> 16) & 0xff) as usize] as u32,
            CONVERT_8_TO_6[((argb >> 8) & 0xff) as usize] as u32,
            CONVERT_8_TO_5[(argb & 0xff) as usize] as u32,
        ]
    }

    #[inline]
    fn store(src: &[u32; 3]) -> u16 {
        ((src[0] << 11) | (src[1] << 5) | src[2]) as u16
    }

    #[inline]
    fn blend(dst: &mut u16, src: &[u32; 3], aval: u32) {
        let d = *dst as u32;
        let r = lerp8((d >> 11) & 0x1f, src[0], aval);
        let g = lerp8((d >> 5) & 0x3f, src[1], aval);
        let b = lerp8(d & 0x1f, src[2], aval);
        *dst = ((r << 11) | (g << 5) | b) as u16;
    }

    #[inline]
    fn to_argb(e: u16) -> u32 {
        let e = e as u32;
        let r = (e >> 11) & 0x1f;
        let g = (e >> 5) & 0x3f;
        let b = e & 0x1f;
        0xff000000 | ((r * 255 + 15) / 31) << 16 | ((g * 255 + 31) / 63) << 8 | (b * 255 + 15) / 31
    }
}

impl Format for Gray8 {
    type Elem = u8;
    type Src = u32;

    #[inline]
    fn prepare(argb: u32) -> u32 {
        gray((argb >> 16) & 0xff, (argb >> 8) & 0xff, argb & 0xff)
    }

    #[inline]
    fn store(src: &u32) -> u8 {
        *src as u8
    }

    #[inline]
    fn blend(dst: &mut u8, src: &u32, aval: u32) {
        *dst = lerp8(*dst as u32, *src, aval) as u8;
    }

    #[inline]
    fn to_argb(e: u8) -> u32 {
        let e = e as u32;
        0xff000000 | (e << 16) | (e << 8) | e
    }
}

/// The color source of a composite operation.
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    /// A flat `0xAARRGGBB` color. Its alpha must be baked into the alpha map.
    Color(u32),
    /// Per-pixel `0xAARRGGBB` colors, one per pixel of the row, combined
    /// with coverage before blending.
    Paint(&'a [u32]),
}

#[inline]
fn composite_pixel<F: Format>(dst: &mut F::Elem, src: &F::Src, aval: u32) {
    match aval {
        0 => {}
        MAX_ALPHA..=std::u32::MAX => *dst = F::store(src),
        _ => F::blend(dst, src, aval),
    }
}

/// Composites one row of explicit per-pixel coverage.
///
/// The row starts at `(x, y)`; pixels outside the surface are skipped.
pub(crate) struct CoverageRow<'a> {
    pub x: i32,
    pub y: i32,
    pub coverage: &'a [u8],
    pub alpha_map: &'a [u16],
    pub source: Source<'a>,
}

impl SurfaceOp for CoverageRow<'_> {
    type Output = ();

    fn run<F: Format>(self, data: &mut [F::Elem], layout: &Layout, size: [u32; 2]) {
        let (x, skip, len) = match clip_row(self.x, self.y, self.coverage.len(), size) {
            Some(r) => r,
            None => return,
        };
        let coverage = &self.coverage[skip..][..len];
        let base = layout.index(x, self.y);
        let pixels = (0..len).map(|i| base + i * layout.pixel_stride);

        match self.source {
            Source::Color(argb) => {
                let src = F::prepare(argb);
                for (i, &c) in pixels.zip(coverage.iter()) {
                    let aval = self.alpha_map[c as usize] as u32;
                    composite_pixel::<F>(&mut data[i], &src, aval);
                }
            }
            Source::Paint(paint) => {
                let paint = &paint[skip..][..len];
                for (i, &c, &argb) in izip!(pixels, coverage.iter(), paint.iter()) {
                    let aval = modulate(self.alpha_map[c as usize] as u32, argb >> 24);
                    composite_pixel::<F>(&mut data[i], &F::prepare(argb), aval);
                }
            }
        }
    }
}

/// Composites one row of run-length-encoded coverage, given as
/// `(coverage, run length)` byte pairs.
pub(crate) struct RunRow<'a> {
    pub x: i32,
    pub y: i32,
    pub runs: &'a [u8],
    pub alpha_map: &'a [u16],
    pub source: Source<'a>,
}

impl SurfaceOp for RunRow<'_> {
    type Output = ();

    fn run<F: Format>(self, data: &mut [F::Elem], layout: &Layout, size: [u32; 2]) {
        if self.y < 0 || self.y >= size[1] as i32 {
            return;
        }
        let width = size[0] as i32;
        let color_src = match self.source {
            Source::Color(argb) => Some(F::prepare(argb)),
            Source::Paint(_) => None,
        };

        let mut x = self.x;
        for run in self.runs.chunks_exact(2) {
            let (c, len) = (run[0], run[1] as i32);
            let aval = self.alpha_map[c as usize] as u32;
            let (x0, x1) = (x.max(0), (x + len).min(width));
            if aval != 0 && x0 < x1 {
                let base = layout.index(x0, self.y);
                let pixels = (0..(x1 - x0) as usize).map(|i| base + i * layout.pixel_stride);
                match (&color_src, self.source) {
                    (Some(src), _) => {
                        for i in pixels {
                            composite_pixel::<F>(&mut data[i], src, aval);
                        }
                    }
                    (None, Source::Paint(paint)) => {
                        let paint = &paint[(x0 - self.x) as usize..][..(x1 - x0) as usize];
                        for (i, &argb) in pixels.zip(paint.iter()) {
                            let aval = modulate(aval, argb >> 24);
                            composite_pixel::<F>(&mut data[i], &F::prepare(argb), aval);
                        }
                    }
                    (None, Source::Color(_)) => unreachable!(),
                }
            }
            x += len;
        }
    }
}

/// Fills an axis-aligned rectangle given in sub-pixel cells with a flat
/// color. Interior pixels receive full coverage; the fractional edge strips
/// and corners receive the coverage of the cells they contain.
pub(crate) struct FillRect<'a> {
    /// `[x0, y0, x1, y1]`, exclusive upper bounds, in sub-pixel cells.
    pub cells: [i32; 4],
    pub lg_subpixel: [u32; 2],
    pub alpha_map: &'a [u16],
    pub argb: u32,
}

impl SurfaceOp for FillRect<'_> {
    type Output = ();

    fn run<F: Format>(self, data: &mut [F::Elem], layout: &Layout, size: [u32; 2]) {
        let [x0, y0, x1, y1] = self.cells;
        let [lg_x, lg_y] = self.lg_subpixel;
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        let src = F::prepare(self.argb);

        let px0 = (x0 >> lg_x).max(0);
        let px1 = ((x1 - 1) >> lg_x).min(size[0] as i32 - 1);
        let py0 = (y0 >> lg_y).max(0);
        let py1 = ((y1 - 1) >> lg_y).min(size[1] as i32 - 1);

        // The number of cells of `[lo, hi)` inside pixel `p`
        let cells_in = |p: i32, lo: i32, hi: i32, lg: u32| {
            (hi.min((p + 1) << lg) - lo.max(p << lg)) as u32
        };

        for py in py0..=py1 {
            let ny = cells_in(py, y0, y1, lg_y);
            let full_row = ny == 1 << lg_y;
            let row = layout.index(0, py);

            for px in px0..=px1 {
                let nx = if px > px0 && px < px1 && full_row {
                    // Interior; skip the computation
                    1 << lg_x
                } else {
                    cells_in(px, x0, x1, lg_x)
                };
                let aval = self.alpha_map[(nx * ny) as usize] as u32;
                let i = row + px as usize * layout.pixel_stride;
                composite_pixel::<F>(&mut data[i], &src, aval);
            }
        }
    }
}

/// Overwrites a rectangle of pixels with a color, without blending.
pub(crate) struct ClearRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub argb: u32,
}

impl SurfaceOp for ClearRect {
    type Output = ();

    fn run<F: Format>(self, data: &mut [F::Elem], layout: &Layout, size: [u32; 2]) {
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = self.x.saturating_add(self.width).min(size[0] as i32);
        let y1 = self.y.saturating_add(self.height).min(size[1] as i32);
        let value = F::store(&F::prepare(self.argb));
        for y in y0..y1 {
            let base = layout.index(x0.max(0), y);
            for i in 0..(x1 - x0).max(0) as usize {
                data[base + i * layout.pixel_stride] = value;
            }
        }
    }
}

/// Clip a row of `len` pixels starting at `(x, y)` to a surface of the given
/// size. Returns the first visible x, the number of skipped leading pixels,
/// and the number of visible pixels.
fn clip_row(x: i32, y: i32, len: usize, size: [u32; 2]) -> Option<(i32, usize, usize)> {
    if y < 0 || y >= size[1] as i32 {
        return None;
    }
    let x0 = x.max(0);
    let x1 = (x as i64 + len as i64).min(size[0] as i64) as i32;
    if x0 >= x1 {
        return None;
    }
    Some((x0, (x0 - x) as usize, (x1 - x0) as usize))
}
