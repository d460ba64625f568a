//! Run-length-encoded coverage caches.
use fixgeom::PixelBox;

/// The coverage produced by rendering a path, recorded for replay.
///
/// A cache is either invalid (empty) or holds every coverage row of the
/// path it was recorded from. Its validity is managed by its owner: the
/// recorded rows depend on the path geometry, transform, stroke parameters,
/// winding rule, and clip, so the owner must call [`RenderCache::invalidate`]
/// whenever any of them changes. Color and paint are applied on replay and
/// may change freely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderCache {
    valid: bool,
    bbox: Option<PixelBox>,
    max_coverage: u32,
    rows: Vec<CacheRow>,
    /// `(coverage, run length)` pairs of all rows
    rle: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CacheRow {
    y: i32,
    min_x: i32,
    offset: usize,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Discard the recorded rows.
    pub fn invalidate(&mut self) {
        self.valid = false;
        self.bbox = None;
        self.rows.clear();
        self.rle.clear();
    }

    /// The pixel rectangle touched by the recorded path. `None` if the cache
    /// is invalid or the path touched nothing.
    pub fn bounding_box(&self) -> Option<PixelBox> {
        self.bbox.filter(|_| self.valid)
    }

    /// The coverage value representing a fully covered pixel.
    pub(crate) fn max_coverage(&self) -> u32 {
        self.max_coverage
    }

    /// The number of bytes of encoded coverage.
    pub fn encoded_len(&self) -> usize {
        self.rle.len()
    }

    pub(crate) fn begin(&mut self, max_coverage: u32) {
        self.invalidate();
        self.max_coverage = max_coverage;
    }

    /// Append a row of coverage values starting at pixel `(min_x, y)`.
    /// Runs longer than 255 pixels are split.
    pub(crate) fn push_row(&mut self, y: i32, min_x: i32, coverage: &[u8]) {
        debug_assert!(!self.valid);
        self.rows.push(CacheRow {
            y,
            min_x,
            offset: self.rle.len(),
        });

        let mut it = coverage.iter().cloned();
        let mut value = match it.next() {
            Some(x) => x,
            None => return,
        };
        let mut run = 1u8;
        for x in it {
            if x == value && run < 255 {
                run += 1;
            } else {
                self.rle.push(value);
                self.rle.push(run);
                value = x;
                run = 1;
            }
        }
        self.rle.push(value);
        self.rle.push(run);
    }

    pub(crate) fn finish(&mut self, bbox: Option<PixelBox>) {
        self.bbox = bbox;
        self.valid = true;
    }

    /// Iterate over the recorded rows as `(y, min_x, runs)`.
    pub(crate) fn rows(&self) -> impl Iterator<Item = (i32, i32, &[u8])> + '_ {
        let ends = self
            .rows
            .iter()
            .skip(1)
            .map(|r| r.offset)
            .chain(std::iter::once(self.rle.len()));
        self.rows
            .iter()
            .zip(ends)
            .map(move |(row, end)| (row.y, row.min_x, &self.rle[row.offset..end]))
    }
}
