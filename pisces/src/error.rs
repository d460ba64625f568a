use quick_error::quick_error;

quick_error! {
    /// Errors reported when constructing surfaces and paints.
    ///
    /// Rendering operations themselves never fail; degenerate input simply
    /// draws nothing.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Error {
        /// A surface dimension exceeds [`MAX_SURFACE_SIZE`](crate::MAX_SURFACE_SIZE).
        SurfaceTooLarge(width: u32, height: u32) {
            display("surface size {}x{} is too large", width, height)
        }
        /// The layout addresses pixels beyond `usize::MAX`.
        LayoutOverflow {
            display("surface layout overflows the address space")
        }
        /// The pixel buffer is shorter than the layout requires.
        BufferTooSmall(required: usize, actual: usize) {
            display("pixel buffer has {} elements, but {} are required", actual, required)
        }
        /// A gradient was given no color stops.
        EmptyGradient {
            display("gradient has no color stops")
        }
        /// A texture has a zero width or height.
        EmptyTexture {
            display("texture is empty")
        }
        /// The texture rows overlap.
        TextureStrideTooSmall(stride: usize, width: usize) {
            display("texture stride {} is smaller than the width {}", stride, width)
        }
        /// The texel buffer is shorter than the dimensions require.
        TextureBufferTooSmall(required: usize, actual: usize) {
            display("texel buffer has {} elements, but {} are required", actual, required)
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
