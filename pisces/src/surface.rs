//! Destination pixel buffers.
use checked::Checked;
use fixgeom::PixelBox;

use crate::{
    blit::{Argb8888, Format, Gray8, Rgb565, Rgb888},
    Error, Result,
};

/// The largest width or height of a surface. Pixel coordinates must be
/// representable in S15.16.
pub const MAX_SURFACE_SIZE: u32 = 1 << 15;

/// Specifies a pixel format of [`Surface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// `0xffRRGGBB` packed in `u32`. The alpha channel is always written as
    /// `0xff` and ignored when reading.
    Rgb888,
    /// `0xAARRGGBB` packed in `u32`, non-premultiplied.
    Argb8888,
    /// `RRRRRGGGGGGBBBBB` packed in `u16`.
    Rgb565,
    /// 8-bit luminance.
    Gray8,
}

/// Borrowed pixel storage, tagged by format.
#[derive(Debug)]
pub enum PixelData<'a> {
    Rgb888(&'a mut [u32]),
    Argb8888(&'a mut [u32]),
    Rgb565(&'a mut [u16]),
    Gray8(&'a mut [u8]),
}

impl PixelData<'_> {
    pub fn format(&self) -> PixelFormat {
        match self {
            PixelData::Rgb888(_) => PixelFormat::Rgb888,
            PixelData::Argb8888(_) => PixelFormat::Argb8888,
            PixelData::Rgb565(_) => PixelFormat::Rgb565,
            PixelData::Gray8(_) => PixelFormat::Gray8,
        }
    }

    fn len(&self) -> usize {
        match self {
            PixelData::Rgb888(d) | PixelData::Argb8888(d) => d.len(),
            PixelData::Rgb565(d) => d.len(),
            PixelData::Gray8(d) => d.len(),
        }
    }
}

/// Element offsets describing where pixels live in a buffer. All values are
/// in elements, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub offset: usize,
    pub scanline_stride: usize,
    pub pixel_stride: usize,
}

impl Layout {
    /// The index of the pixel at `(x, y)`. The coordinates must be
    /// non-negative and inside the surface.
    #[inline]
    pub fn index(&self, x: i32, y: i32) -> usize {
        debug_assert!(x >= 0 && y >= 0);
        self.offset + y as usize * self.scanline_stride + x as usize * self.pixel_stride
    }
}

/// A rectangular pixel store rendered into.
#[derive(Debug)]
pub struct Surface<'a> {
    data: PixelData<'a>,
    width: u32,
    height: u32,
    layout: Layout,
}

/// An operation on a surface's pixels, instantiated for the surface's pixel
/// format.
pub(crate) trait SurfaceOp {
    type Output;

    fn run<F: Format>(self, data: &mut [F::Elem], layout: &Layout, size: [u32; 2]) -> Self::Output;
}

impl<'a> Surface<'a> {
    /// Construct a `Surface` with a tightly packed layout.
    pub fn new(data: PixelData<'a>, width: u32, height: u32) -> Result<Self> {
        Self::with_layout(
            data,
            width,
            height,
            Layout {
                offset: 0,
                scanline_stride: width as usize,
                pixel_stride: 1,
            },
        )
    }

    /// Construct a `Surface` with an explicit layout.
    ///
    /// Fails if the dimensions are too large or if the buffer is too small
    /// to contain every pixel addressed by `layout`.
    pub fn with_layout(data: PixelData<'a>, width: u32, height: u32, layout: Layout) -> Result<Self> {
        if width > MAX_SURFACE_SIZE || height > MAX_SURFACE_SIZE {
            return Err(Error::SurfaceTooLarge(width, height));
        }

        if width > 0 && height > 0 {
            let last = Checked::from(layout.offset)
                + Checked::from(height as usize - 1) * layout.scanline_stride
                + Checked::from(width as usize - 1) * layout.pixel_stride;
            let required: usize = (*(last + 1)).ok_or(Error::LayoutOverflow)?;
            if data.len() < required {
                return Err(Error::BufferTooSmall(required, data.len()));
            }
        }

        Ok(Self {
            data,
            width,
            height,
            layout,
        })
    }

    pub fn format(&self) -> PixelFormat {
        self.data.format()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// The rectangle covering the whole surface.
    pub fn bounds(&self) -> PixelBox {
        PixelBox::with_size(0, 0, self.width as i32, self.height as i32)
    }

    pub fn data(&self) -> &PixelData<'a> {
        &self.data
    }

    pub fn into_data(self) -> PixelData<'a> {
        self.data
    }

    /// Read the pixel at `(x, y)` as `0xAARRGGBB`. Returns `None` if the
    /// point is outside the surface.
    pub fn get_argb(&self, x: i32, y: i32) -> Option<u32> {
        if !self.bounds().contains_point(cgmath::Point2::new(x, y)) {
            return None;
        }
        let i = self.layout.index(x, y);
        Some(match &self.data {
            PixelData::Rgb888(d) => Rgb888::to_argb(d[i]),
            PixelData::Argb8888(d) => Argb8888::to_argb(d[i]),
            PixelData::Rgb565(d) => Rgb565::to_argb(d[i]),
            PixelData::Gray8(d) => Gray8::to_argb(d[i]),
        })
    }

    /// Run `op` specialized for the pixel format.
    pub(crate) fn apply<O: SurfaceOp>(&mut self, op: O) -> O::Output {
        let size = [self.width, self.height];
        let layout = &self.layout;
        match &mut self.data {
            PixelData::Rgb888(d) => op.run::<Rgb888>(d, layout, size),
            PixelData::Argb8888(d) => op.run::<Argb8888>(d, layout, size),
            PixelData::Rgb565(d) => op.run::<Rgb565>(d, layout, size),
            PixelData::Gray8(d) => op.run::<Gray8>(d, layout, size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_small_buffers() {
        let mut buf = vec![0u32; 99];
        assert_eq!(
            Surface::new(PixelData::Argb8888(&mut buf), 10, 10).unwrap_err(),
            Error::BufferTooSmall(100, 99)
        );
    }

    #[test]
    fn strided_layout() {
        // Two interleaved 4x4 images; the surface addresses the second one
        let mut buf = vec![0u8; 4 * 4 * 2];
        let layout = Layout {
            offset: 1,
            scanline_stride: 8,
            pixel_stride: 2,
        };
        assert!(Surface::with_layout(PixelData::Gray8(&mut buf), 4, 4, layout).is_ok());

        let mut buf = vec![0u8; 4 * 4 * 2 - 1];
        assert_eq!(
            Surface::with_layout(PixelData::Gray8(&mut buf), 4, 4, layout).unwrap_err(),
            Error::BufferTooSmall(32, 31)
        );
    }

    #[test]
    fn rejects_huge_surfaces() {
        let mut buf = vec![0u16; 1];
        assert!(Surface::new(PixelData::Rgb565(&mut buf), 1 << 20, 0).is_err());
    }

    #[test]
    fn empty_surface() {
        let mut buf: Vec<u32> = Vec::new();
        let surface = Surface::new(PixelData::Rgb888(&mut buf), 0, 0).unwrap();
        assert_eq!(surface.get_argb(0, 0), None);
    }
}
