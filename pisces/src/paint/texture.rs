use fixgeom::Transform6;
use std::sync::Arc;

use super::PaintSpace;
use crate::{Error, Result};

/// An image paint.
///
/// Texel `(i, j)` occupies the square `[i, i + 1) × [j, j + 1)` of the paint
/// space. Outside the image, the texture either repeats or is transparent.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    width: u32,
    height: u32,
    /// The image in `0xAARRGGBB` surrounded by a one-texel border, stored
    /// with a stride of `width + 2`. The border duplicates the opposite edge
    /// when repeating and the same edge otherwise, so that bilinear samples
    /// never need a bounds check.
    texels: Arc<[u32]>,
    repeat: bool,
    interpolate: bool,
    space: PaintSpace,
    /// Device space to texture space in S15.16; `[m00, m01, m10, m11, m02,
    /// m12]`. `None` if degenerate.
    inv: Option<[i64; 6]>,
}

impl Texture {
    /// Construct a `Texture` from `height` rows of `width` `0xAARRGGBB`
    /// texels, `stride` elements apart.
    pub fn new(
        data: &[u32],
        width: u32,
        height: u32,
        stride: usize,
        repeat: bool,
        paint_xform: Transform6,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyTexture);
        }
        let (w, h) = (width as usize, height as usize);
        if stride < w {
            return Err(Error::TextureStrideTooSmall(stride, w));
        }
        let required = stride * (h - 1) + w;
        if data.len() < required {
            return Err(Error::TextureBufferTooSmall(required, data.len()));
        }

        let pw = w + 2;
        let mut texels = vec![0u32; pw * (h + 2)];

        // Map a padded coordinate to a source coordinate
        let source = |i: usize, n: usize| -> usize {
            if i == 0 {
                if repeat {
                    n - 1
                } else {
                    0
                }
            } else if i == n + 1 {
                if repeat {
                    0
                } else {
                    n - 1
                }
            } else {
                i - 1
            }
        };

        for (py, row) in texels.chunks_exact_mut(pw).enumerate() {
            let src_row = &data[source(py, h) * stride..][..w];
            for (px, texel) in row.iter_mut().enumerate() {
                *texel = src_row[source(px, w)];
            }
        }

        let mut this = Self {
            width,
            height,
            texels: texels.into(),
            repeat,
            interpolate: false,
            space: PaintSpace::new(paint_xform),
            inv: None,
        };
        this.compute_inverse();
        Ok(this)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_repeating(&self) -> bool {
        self.repeat
    }

    pub fn is_interpolated(&self) -> bool {
        self.interpolate
    }

    /// Set the rendering quality in `[0, 1]` (S15.16). Bilinear filtering
    /// is used above one half; nearest neighbor otherwise.
    pub fn set_quality(&mut self, quality: i32) {
        self.interpolate = quality > 0x8000;
    }

    pub fn space(&self) -> &PaintSpace {
        &self.space
    }

    pub fn is_degenerate(&self) -> bool {
        self.inv.is_none()
    }

    pub fn set_drawing_transform(&mut self, drawing: &Transform6) {
        self.space.update(drawing);
        self.compute_inverse();
    }

    fn compute_inverse(&mut self) {
        self.inv = self.space.inverse().map(|m| {
            [
                m.m00 as i64,
                m.m01 as i64,
                m.m10 as i64,
                m.m11 as i64,
                m.m02 as i64,
                m.m12 as i64,
            ]
        });
    }

    #[inline]
    fn texel(&self, x: i64, y: i64) -> u32 {
        // `x` and `y` are in `[-1, size]`
        self.texels[(y + 1) as usize * (self.width as usize + 2) + (x + 1) as usize]
    }

    /// Fold a texture-space coordinate into the image, or return `None` if
    /// it's outside a non-repeating texture.
    #[inline]
    fn wrap(&self, t: i64, size: u32) -> Option<i64> {
        let size = (size as i64) << 16;
        if self.repeat {
            Some(t.rem_euclid(size))
        } else if t < 0 || t >= size {
            None
        } else {
            Some(t)
        }
    }

    fn sample(&self, tx: i64, ty: i64) -> u32 {
        let (tx, ty) = match (self.wrap(tx, self.width), self.wrap(ty, self.height)) {
            (Some(x), Some(y)) => (x, y),
            _ => return 0,
        };

        if !self.interpolate {
            return self.texel(tx >> 16, ty >> 16);
        }

        // Texel centers are at half-integer coordinates
        let (tx, ty) = (tx - 0x8000, ty - 0x8000);
        let (ix, iy) = (tx >> 16, ty >> 16);
        let (fx, fy) = ((tx & 0xffff) as i32, (ty & 0xffff) as i32);

        let top = lerp_argb(self.texel(ix, iy), self.texel(ix + 1, iy), fx);
        let bottom = lerp_argb(self.texel(ix, iy + 1), self.texel(ix + 1, iy + 1), fx);
        lerp_argb(top, bottom, fy)
    }

    pub fn paint_row(&self, x: i32, y: i32, dst: &mut [u32]) {
        let [m00, m01, m10, m11, m02, m12] = match self.inv {
            Some(m) => m,
            None => return,
        };
        let (x, y) = (x as i64, y as i64);

        // The center of the first pixel
        let mut tx = m00 * x + m01 * y + m02 + (m00 >> 1) + (m01 >> 1);
        let mut ty = m10 * x + m11 * y + m12 + (m10 >> 1) + (m11 >> 1);

        for p in dst.iter_mut() {
            *p = self.sample(tx, ty);
            tx += m00;
            ty += m10;
        }
    }
}

#[inline]
fn lerp(a: i32, b: i32, f: i32) -> u32 {
    (((a << 16) + (b - a) * f + 0x8000) >> 16) as u32
}

/// Interpolate each channel of two `0xAARRGGBB` colors. `f` is S15.16 in
/// `[0, 1)`.
fn lerp_argb(a: u32, b: u32, f: i32) -> u32 {
    let mut out = 0;
    for &shift in &[0, 8, 16, 24] {
        let ca = ((a >> shift) & 0xff) as i32;
        let cb = ((b >> shift) & 0xff) as i32;
        out |= lerp(ca, cb, f) << shift;
    }
    out
}
