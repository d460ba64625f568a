use itertools::izip;
use rgb::RGBA8;

use crate::{Error, Result};

/// The number of entries in a color ramp.
pub const RAMP_SIZE: usize = 256;

/// Half the width of the box filter applied to each ramp entry, in S15.16.
/// Each entry averages `2 * FILTER_RADIUS + 1` samples.
const FILTER_RADIUS: i32 = 256;

/// How gradient fractions outside `[0, 1]` are folded back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleMethod {
    /// Clamp to the nearest end.
    Clamp,
    /// Wrap around.
    Repeat,
    /// Mirror every other period.
    Reflect,
}

impl Default for CycleMethod {
    fn default() -> Self {
        CycleMethod::Clamp
    }
}

impl CycleMethod {
    /// Fold an S15.16 fraction into `[0, 1]`.
    #[inline]
    pub fn pad(self, frac: i64) -> i32 {
        match self {
            CycleMethod::Clamp => frac.max(0).min(0x10000) as i32,
            CycleMethod::Repeat => (frac & 0xffff) as i32,
            CycleMethod::Reflect => {
                let x = (frac.wrapping_abs() & 0x1ffff) as i32;
                if x > 0x10000 {
                    0x20000 - x
                } else {
                    x
                }
            }
        }
    }
}

/// A color stop of a gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GradientStop {
    /// The position along the gradient in S15.16, nominally in `[0, 1]`.
    pub fraction: i32,
    pub color: RGBA8,
}

impl GradientStop {
    pub fn new(fraction: i32, color: RGBA8) -> Self {
        Self { fraction, color }
    }
}

/// A precomputed gradient color ramp.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientColorMap {
    stops: Vec<GradientStop>,
    cycle: CycleMethod,
    /// `0xAARRGGBB`; entry `i` represents the fraction `i / 255`.
    ramp: Box<[u32; RAMP_SIZE]>,
}

impl GradientColorMap {
    /// Construct a `GradientColorMap`.
    ///
    /// Fractions are clamped to `[0, 1]` and made non-decreasing. Stops are
    /// added at `0` and `1` if missing, duplicating the first and last
    /// colors.
    pub fn new(stops: &[GradientStop], cycle: CycleMethod) -> Result<Self> {
        if stops.is_empty() {
            return Err(Error::EmptyGradient);
        }

        let mut normalized = Vec::with_capacity(stops.len() + 2);
        let mut last = 0;
        for stop in stops {
            let fraction = stop.fraction.max(last).min(0x10000);
            normalized.push(GradientStop::new(fraction, stop.color));
            last = fraction;
        }
        if normalized[0].fraction > 0 {
            let first = GradientStop::new(0, normalized[0].color);
            normalized.insert(0, first);
        }
        if let Some(&last) = normalized.last().filter(|s| s.fraction < 0x10000) {
            normalized.push(GradientStop::new(0x10000, last.color));
        }

        let mut ramp = Box::new([0; RAMP_SIZE]);
        for (i, entry) in ramp.iter_mut().enumerate() {
            *entry = ramp_entry(&normalized, i);
        }

        Ok(Self {
            stops: stops.to_vec(),
            cycle,
            ramp,
        })
    }

    /// Return `true` if `self` was built from the given inputs.
    pub fn matches(&self, stops: &[GradientStop], cycle: CycleMethod) -> bool {
        self.cycle == cycle && self.stops[..] == *stops
    }

    pub fn cycle(&self) -> CycleMethod {
        self.cycle
    }

    /// Look up the color for an S15.16 fraction.
    #[inline]
    pub fn lookup(&self, frac: i64) -> u32 {
        let x = self.cycle.pad(frac) as u32;
        let index = ((x * 255 + 0x8000) >> 16).min(255);
        self.ramp[index as usize]
    }

    pub fn ramp(&self) -> &[u32; RAMP_SIZE] {
        &self.ramp
    }
}

fn pack(c: [u32; 4]) -> u32 {
    (c[3] << 24) | (c[0] << 16) | (c[1] << 8) | c[2]
}

fn channels(c: RGBA8) -> [u32; 4] {
    [c.r as u32, c.g as u32, c.b as u32, c.a as u32]
}

/// Interpolate within the segment `[stops[k], stops[k + 1]]`.
fn interp(stops: &[GradientStop], k: usize, frac: i32) -> [u32; 4] {
    let (s0, s1) = (stops[k], stops[k + 1]);
    let span = (s1.fraction - s0.fraction) as i64;
    let (c0, c1) = (channels(s0.color), channels(s1.color));
    if span <= 0 {
        return c1;
    }
    let t = (((frac - s0.fraction) as i64) << 16) / span;
    let mut out = [0; 4];
    for (o, &a, &b) in izip!(out.iter_mut(), c0.iter(), c1.iter()) {
        *o = ((((a as i64) << 16) + (b as i64 - a as i64) * t + 0x8000) >> 16) as u32;
    }
    out
}

/// Find the segment containing `frac`. Zero-width segments are skipped.
fn segment_of(stops: &[GradientStop], frac: i32) -> usize {
    let n = stops.len();
    (0..n - 1)
        .find(|&k| frac < stops[k + 1].fraction)
        .unwrap_or(n.saturating_sub(2))
}

fn ramp_entry(stops: &[GradientStop], i: usize) -> u32 {
    if stops.len() == 1 {
        return pack(channels(stops[0].color));
    }

    let center = (i as i32 * 0x10000) / 255;
    let lo = (center - FILTER_RADIUS).max(0);
    let hi = (center + FILTER_RADIUS).min(0x10000);

    // If the filter window lies inside one segment, the average equals the
    // value at the center
    if let Some(k) = (0..stops.len() - 1)
        .find(|&k| stops[k].fraction <= lo && hi <= stops[k + 1].fraction)
    {
        return pack(interp(stops, k, center));
    }

    let mut sum = [0u64; 4];
    for frac in lo..=hi {
        let c = interp(stops, segment_of(stops, frac), frac);
        for (s, &c) in sum.iter_mut().zip(c.iter()) {
            *s += c as u64;
        }
    }
    let n = (hi - lo + 1) as u64;
    let avg = |s: u64| ((s + n / 2) / n) as u32;
    pack([avg(sum[0]), avg(sum[1]), avg(sum[2]), avg(sum[3])])
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: RGBA8 = RGBA8 {
        r: 255,
        g: 0,
        b: 0,
        a: 255,
    };
    const BLUE: RGBA8 = RGBA8 {
        r: 0,
        g: 0,
        b: 255,
        a: 255,
    };

    fn red_to_blue(cycle: CycleMethod) -> GradientColorMap {
        GradientColorMap::new(
            &[GradientStop::new(0, RED), GradientStop::new(0x10000, BLUE)],
            cycle,
        )
        .unwrap()
    }

    #[test]
    fn boundaries() {
        let map = red_to_blue(CycleMethod::Clamp);
        assert_eq!(map.lookup(0), 0xffff0000);
        assert_eq!(map.lookup(-0x5000), 0xffff0000);
        assert_eq!(map.lookup(0x10000), 0xff0000ff);
        assert_eq!(map.lookup(0x30000), 0xff0000ff);

        let mid = map.lookup(0x8000);
        assert_ne!(mid, 0xffff0000);
        assert_ne!(mid, 0xff0000ff);
        assert!((mid >> 16) & 0xff > 0 && mid & 0xff > 0, "{:08x}", mid);
    }

    #[test]
    fn cycle_methods() {
        let clamp = red_to_blue(CycleMethod::Clamp);
        assert_eq!(clamp.lookup(0x18000), 0xff0000ff);

        let repeat = red_to_blue(CycleMethod::Repeat);
        assert_eq!(repeat.lookup(0x18000), repeat.lookup(0x8000));
        assert_eq!(repeat.lookup(-0x8000), repeat.lookup(0x8000));

        let reflect = red_to_blue(CycleMethod::Reflect);
        assert_eq!(reflect.lookup(0x18000), reflect.lookup(0x8000));
        assert_eq!(reflect.lookup(0x1c000), reflect.lookup(0x4000));
        assert_eq!(reflect.lookup(-0x4000), reflect.lookup(0x4000));
    }

    #[test]
    fn pad() {
        assert_eq!(CycleMethod::Clamp.pad(-1), 0);
        assert_eq!(CycleMethod::Clamp.pad(0x12345), 0x10000);
        assert_eq!(CycleMethod::Repeat.pad(0x12345), 0x2345);
        assert_eq!(CycleMethod::Repeat.pad(-0x4000), 0xc000);
        assert_eq!(CycleMethod::Reflect.pad(0x10000), 0x10000);
        assert_eq!(CycleMethod::Reflect.pad(0x14000), 0xc000);
        assert_eq!(CycleMethod::Reflect.pad(0x24000), 0x4000);
    }

    #[test]
    fn missing_end_stops_are_added() {
        let map = GradientColorMap::new(
            &[
                GradientStop::new(0x4000, RED),
                GradientStop::new(0xc000, BLUE),
            ],
            CycleMethod::Clamp,
        )
        .unwrap();
        assert_eq!(map.lookup(0), 0xffff0000);
        assert_eq!(map.lookup(0x3000), 0xffff0000);
        assert_eq!(map.lookup(0xd000), 0xff0000ff);
        assert_eq!(map.lookup(0x10000), 0xff0000ff);
    }

    #[test]
    fn hard_stop_is_filtered() {
        let map = GradientColorMap::new(
            &[
                GradientStop::new(0, RED),
                GradientStop::new(0x8000, RED),
                GradientStop::new(0x8000, BLUE),
                GradientStop::new(0x10000, BLUE),
            ],
            CycleMethod::Clamp,
        )
        .unwrap();
        // Entries far from the discontinuity are exact
        assert_eq!(map.ramp()[100], 0xffff0000);
        assert_eq!(map.ramp()[160], 0xff0000ff);
        // The entry straddling it is a mix
        let mixed = map.ramp()[128];
        assert_ne!(mixed, 0xffff0000);
        assert_ne!(mixed, 0xff0000ff);
    }

    #[test]
    fn single_stop() {
        let map = GradientColorMap::new(&[GradientStop::new(0x8000, RED)], CycleMethod::Repeat)
            .unwrap();
        assert!(map.ramp().iter().all(|&c| c == 0xffff0000));
    }

    #[test]
    fn empty() {
        assert_eq!(
            GradientColorMap::new(&[], CycleMethod::Clamp).unwrap_err(),
            Error::EmptyGradient
        );
    }

    #[test]
    fn matches() {
        let stops = [GradientStop::new(0, RED), GradientStop::new(0x10000, BLUE)];
        let map = GradientColorMap::new(&stops, CycleMethod::Clamp).unwrap();
        assert!(map.matches(&stops, CycleMethod::Clamp));
        assert!(!map.matches(&stops, CycleMethod::Repeat));
        assert!(!map.matches(&stops[..1], CycleMethod::Clamp));
    }
}
