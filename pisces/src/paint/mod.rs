//! Paint sources.
//!
//! A non-solid paint maps destination pixels back into its own coordinate
//! space through the inverse of a compound transformation: the drawing
//! transformation in effect, applied after the paint's own transformation.
//! Pixels are evaluated at their centers.
use fixgeom::Transform6;
use rgb::RGBA8;

mod colormap;
mod linear;
mod radial;
mod texture;

pub use self::{colormap::*, linear::*, radial::*, texture::*};

/// Pack a color as `0xAARRGGBB`.
#[inline]
pub fn argb(c: RGBA8) -> u32 {
    ((c.a as u32) << 24) | ((c.r as u32) << 16) | ((c.g as u32) << 8) | c.b as u32
}

/// The transformations associated with a paint.
#[derive(Debug, Clone, PartialEq)]
pub struct PaintSpace {
    /// Paint space to user space
    paint_xform: Transform6,
    /// Paint space to device space
    compound: Transform6,
    /// Device space to paint space. `None` if `compound` is singular.
    inverse: Option<Transform6>,
}

impl PaintSpace {
    pub fn new(paint_xform: Transform6) -> Self {
        let mut this = Self {
            paint_xform,
            compound: paint_xform,
            inverse: None,
        };
        this.update(&Transform6::identity());
        this
    }

    /// Recompute the compound transformation and its inverse for a new
    /// drawing transformation.
    pub fn update(&mut self, drawing: &Transform6) {
        self.compound = drawing.concat(&self.paint_xform);
        self.inverse = self.compound.inverse();
    }

    pub fn paint_transform(&self) -> &Transform6 {
        &self.paint_xform
    }

    pub fn compound(&self) -> &Transform6 {
        &self.compound
    }

    pub fn inverse(&self) -> Option<&Transform6> {
        self.inverse.as_ref()
    }
}

/// The color source used to fill covered pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(RGBA8),
    Linear(LinearGradient),
    Radial(RadialGradient),
    Texture(Texture),
}

impl Default for Paint {
    fn default() -> Self {
        Paint::Solid(RGBA8::new(0, 0, 0, 255))
    }
}

impl Paint {
    /// The flat color of a solid paint.
    pub fn solid_color(&self) -> Option<RGBA8> {
        match self {
            Paint::Solid(c) => Some(*c),
            _ => None,
        }
    }

    /// Return `true` if the paint can't produce colors (e.g., a gradient
    /// with a zero-length vector or a singular transformation). Drawing with
    /// such a paint is a no-op.
    pub fn is_degenerate(&self) -> bool {
        match self {
            Paint::Solid(_) => false,
            Paint::Linear(p) => p.is_degenerate(),
            Paint::Radial(p) => p.is_degenerate(),
            Paint::Texture(p) => p.is_degenerate(),
        }
    }

    /// Update the paint for a new drawing transformation.
    pub fn set_drawing_transform(&mut self, drawing: &Transform6) {
        match self {
            Paint::Solid(_) => {}
            Paint::Linear(p) => p.set_drawing_transform(drawing),
            Paint::Radial(p) => p.set_drawing_transform(drawing),
            Paint::Texture(p) => p.set_drawing_transform(drawing),
        }
    }

    /// Fill `dst[i]` with the color of pixel `(x + i, y)`.
    pub fn paint_row(&self, x: i32, y: i32, dst: &mut [u32]) {
        match self {
            Paint::Solid(c) => {
                let c = argb(*c);
                for p in dst.iter_mut() {
                    *p = c;
                }
            }
            Paint::Linear(p) => p.paint_row(x, y, dst),
            Paint::Radial(p) => p.paint_row(x, y, dst),
            Paint::Texture(p) => p.paint_row(x, y, dst),
        }
    }

    /// Fill the colors of the touched pixels of `height` rows starting at
    /// `(x, y)`.
    ///
    /// Row `j` covers the pixels `x + min_touched[j] ..= x + max_touched[j]`
    /// (no pixels if `max_touched[j] < min_touched[j]`), clipped to `width`.
    /// The color of pixel `(x + i, y + j)` is written to
    /// `dst[j * dst_stride + i]`.
    #[allow(clippy::too_many_arguments)]
    pub fn paint(
        &self,
        x: i32,
        y: i32,
        width: usize,
        height: usize,
        min_touched: &[i32],
        max_touched: &[i32],
        dst: &mut [u32],
        dst_stride: usize,
    ) {
        for (j, (&min_x, &max_x)) in min_touched.iter().zip(max_touched.iter()).enumerate().take(height) {
            let min_x = min_x.max(0);
            let end = (max_x as i64 + 1).min(width as i64);
            if end <= min_x as i64 {
                continue;
            }
            let row = &mut dst[j * dst_stride..];
            self.paint_row(x + min_x, y + j as i32, &mut row[min_x as usize..end as usize]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paint_respects_touched_ranges() {
        let paint = Paint::Solid(RGBA8::new(1, 2, 3, 4));
        let mut dst = vec![0u32; 8];
        paint.paint(0, 0, 4, 2, &[1, 3], &[2, 10], &mut dst, 4);
        assert_eq!(
            dst,
            vec![0, 0x04010203, 0x04010203, 0, 0, 0, 0, 0x04010203]
        );
    }

    #[test]
    fn compound_transform_tracks_drawing_transform() {
        use fixgeom::from_int;
        let mut space = PaintSpace::new(Transform6::scale(from_int(2), from_int(2)));
        space.update(&Transform6::translation(from_int(10), 0));
        assert_eq!(
            *space.compound(),
            Transform6::new(from_int(2), 0, 0, from_int(2), from_int(10), 0)
        );
        assert_eq!(
            space.inverse().cloned(),
            Some(Transform6::new(0x8000, 0, 0, 0x8000, -from_int(5), 0))
        );
    }
}
