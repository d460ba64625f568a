//! A software anti-aliased 2D rasterizer.
//!
//! Geometry is represented in S15.16 fixed point (see [`fixgeom`]). A path
//! flows through a chain of [`sink`] stages before reaching the scan
//! converter ([`Renderer`]), which computes per-pixel coverage on a
//! supersampled grid and composites it with a [`Paint`] onto a [`Surface`].
//!
//! [`PiscesRenderer`] bundles these stages behind a stateful interface.
//!
//! # Examples
//!
//! ```
//! use pisces::{fixgeom::from_int, PiscesRenderer, PixelData, Surface};
//! use rgb::RGBA8;
//!
//! let mut pixels = vec![0u32; 20 * 20];
//! let surface = Surface::new(PixelData::Argb8888(&mut pixels), 20, 20).unwrap();
//! let mut r = PiscesRenderer::new(surface);
//! r.set_antialiasing(false);
//! r.set_color(RGBA8::new(255, 0, 0, 255));
//! r.fill_rect(0, 0, from_int(10), from_int(10));
//! drop(r);
//!
//! assert_eq!(pixels[0], 0xffff0000);
//! assert_eq!(pixels[10], 0);
//! ```
pub mod blit;
pub mod cache;
mod config;
mod dash;
mod error;
pub mod flatten;
pub mod paint;
mod pathstore;
pub mod rast;
mod renderer;
pub mod shapes;
pub mod sink;
mod stroke;
mod surface;
mod xformer;

pub use fixgeom;

pub use self::{
    cache::RenderCache,
    config::Config,
    dash::Dasher,
    error::{Error, Result},
    flatten::Flattener,
    paint::{
        CycleMethod, GradientColorMap, GradientStop, LinearGradient, Paint, RadialGradient,
        Texture,
    },
    pathstore::PathStore,
    rast::{Renderer, WindingRule},
    renderer::{path_cmd, pt, PathMode, PiscesRenderer},
    shapes::ArcType,
    sink::{Cmd, CurveStage, LineSink, LineStage, PathSink, Pipe},
    stroke::{CapStyle, JoinStyle, StrokeParams, Stroker},
    surface::{Layout, PixelData, PixelFormat, Surface, MAX_SURFACE_SIZE},
    xformer::Transformer,
};
