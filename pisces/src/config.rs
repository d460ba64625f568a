use log::warn;
use std::env;

use crate::{
    flatten::{DEFAULT_FILL_FLATNESS, DEFAULT_STROKE_FLATNESS},
    rast::MAX_LG_SUBPIXEL,
};

/// Rendering options fixed at [`PiscesRenderer`](crate::PiscesRenderer)
/// construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    lg_subpixel: [u32; 2],
    fill_flatness: i32,
    stroke_flatness: i32,
    stroke_bias: [i32; 2],
    antialiasing: bool,
}

impl Config {
    /// Construct a `Config` with the default values: 8×8 supersampling,
    /// fill flatness ½ px, stroke flatness 1 px, no stroke bias, and
    /// antialiasing enabled.
    pub fn new() -> Self {
        Self {
            lg_subpixel: [MAX_LG_SUBPIXEL; 2],
            fill_flatness: DEFAULT_FILL_FLATNESS,
            stroke_flatness: DEFAULT_STROKE_FLATNESS,
            stroke_bias: [0, 0],
            antialiasing: true,
        }
    }

    /// Construct a `Config` from the default values and the environment
    /// variables `PISCES_STROKE_XBIAS`, `PISCES_STROKE_YBIAS`, and
    /// `PISCES_FILL_FLATNESS` (S15.16 integers).
    pub fn from_env() -> Self {
        let mut this = Self::new();
        if let Some(x) = env_fixed("PISCES_STROKE_XBIAS") {
            this.stroke_bias[0] = x;
        }
        if let Some(x) = env_fixed("PISCES_STROKE_YBIAS") {
            this.stroke_bias[1] = x;
        }
        if let Some(x) = env_fixed("PISCES_FILL_FLATNESS") {
            this = this.with_fill_flatness(x);
        }
        this
    }

    /// Set the base-2 logarithm of the supersampling factor along each axis.
    /// Clamped to `0..=3`.
    pub fn with_subpixel(self, lg_x: u32, lg_y: u32) -> Self {
        Self {
            lg_subpixel: [lg_x.min(MAX_LG_SUBPIXEL), lg_y.min(MAX_LG_SUBPIXEL)],
            ..self
        }
    }

    /// Set the curve flatness for fills and text, in pixels (S15.16).
    pub fn with_fill_flatness(self, value: i32) -> Self {
        Self {
            fill_flatness: value.max(1),
            ..self
        }
    }

    /// Set the curve flatness for strokes, in pixels (S15.16).
    pub fn with_stroke_flatness(self, value: i32) -> Self {
        Self {
            stroke_flatness: value.max(1),
            ..self
        }
    }

    /// Set the device-space offset added to stroked paths (S15.16).
    pub fn with_stroke_bias(self, x: i32, y: i32) -> Self {
        Self {
            stroke_bias: [x, y],
            ..self
        }
    }

    /// Set whether antialiasing is enabled initially.
    pub fn with_antialiasing(self, value: bool) -> Self {
        Self {
            antialiasing: value,
            ..self
        }
    }

    pub fn subpixel(&self) -> [u32; 2] {
        self.lg_subpixel
    }

    pub fn fill_flatness(&self) -> i32 {
        self.fill_flatness
    }

    pub fn stroke_flatness(&self) -> i32 {
        self.stroke_flatness
    }

    pub fn stroke_bias(&self) -> [i32; 2] {
        self.stroke_bias
    }

    pub fn antialiasing(&self) -> bool {
        self.antialiasing
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn env_fixed(name: &str) -> Option<i32> {
    let value = env::var(name).ok()?;
    match value.trim().parse() {
        Ok(x) => Some(x),
        Err(e) => {
            warn!("Ignoring {}={:?}: {}", name, value, e);
            None
        }
    }
}
