use cgmath::Point2;

/// An axis-aligned rectangle of whole pixels.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct PixelBox {
    /// The minimum coordinate (inclusive).
    pub min: Point2<i32>,

    /// The maximum coordinate (exclusive).
    pub max: Point2<i32>,
}

impl PixelBox {
    #[inline]
    pub fn new(min: Point2<i32>, max: Point2<i32>) -> Self {
        Self { min, max }
    }

    /// Construct a `PixelBox` from an origin and a size. Saturates on
    /// overflow.
    #[inline]
    pub fn with_size(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(
            Point2::new(x, y),
            Point2::new(x.saturating_add(width), y.saturating_add(height)),
        )
    }

    #[inline]
    pub fn zero() -> Self {
        Self::new(Point2::new(0, 0), Point2::new(0, 0))
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.max.x.saturating_sub(self.min.x)
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.max.y.saturating_sub(self.min.y)
    }

    /// Return `true` if the box contains no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.max.x <= self.min.x || self.max.y <= self.min.y
    }

    #[inline]
    pub fn contains_point(&self, p: Point2<i32>) -> bool {
        p.x >= self.min.x && p.y >= self.min.y && p.x < self.max.x && p.y < self.max.y
    }

    /// Compute the intersection. Returns `None` if it is empty.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let s = Self::new(
            Point2::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            Point2::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        );
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    }

    /// Compute the smallest box containing both boxes. Empty boxes are
    /// ignored.
    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            *other
        } else if other.is_empty() {
            *self
        } else {
            Self::new(
                Point2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
                Point2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
            )
        }
    }
}

#[cfg(feature = "quickcheck")]
impl quickcheck::Arbitrary for PixelBox {
    fn arbitrary<G: quickcheck::Gen>(g: &mut G) -> Self {
        let x = i32::from(<i16>::arbitrary(g));
        let y = i32::from(<i16>::arbitrary(g));
        let w = i32::from(<u8>::arbitrary(g));
        let h = i32::from(<u8>::arbitrary(g));
        Self::with_size(x, y, w, h)
    }
}
