use std::{
    fs::File,
    io::{prelude::*, BufWriter},
    path::PathBuf,
};
use structopt::StructOpt;

use pisces::{
    fixgeom::{from_f64, from_int, Transform6},
    pt, ArcType, CapStyle, Config, CycleMethod, GradientStop, JoinStyle, PiscesRenderer,
    PixelData, StrokeParams, Surface,
};
use rgb::RGBA8;

/// Renders a test picture and writes it as a binary PPM file.
#[derive(Debug, StructOpt)]
struct Opt {
    /// The output file.
    #[structopt(short = "o", default_value = "pisces_demo.ppm")]
    out_path: PathBuf,

    /// The width and height of the image.
    #[structopt(short = "s", default_value = "256")]
    size: u32,

    /// Disable antialiasing.
    #[structopt(long = "aliased")]
    aliased: bool,
}

fn main() {
    env_logger::init();
    let opt = Opt::from_args();
    let size = opt.size;

    let mut pixels = vec![0xffffffffu32; (size * size) as usize];
    {
        let surface = Surface::new(PixelData::Argb8888(&mut pixels), size, size)
            .expect("could not create a surface");
        let config = Config::from_env().with_antialiasing(!opt.aliased);
        let mut r = PiscesRenderer::with_config(surface, config);

        // Work in a 256×256 user space
        let scale = from_f64(size as f64 / 256.0);
        r.set_transform(Transform6::scale(scale, scale));

        let stops = [
            GradientStop::new(0, RGBA8::new(40, 90, 200, 255)),
            GradientStop::new(from_int(1), RGBA8::new(240, 240, 255, 255)),
        ];
        r.set_linear_gradient(pt(0, 0), pt(0, 256), &stops, CycleMethod::Clamp, Transform6::identity())
            .expect("could not create a gradient");
        r.fill_rect(0, 0, from_int(256), from_int(256));

        r.set_radial_gradient(
            pt(96, 96),
            pt(80, 80),
            from_int(64),
            &[
                GradientStop::new(0, RGBA8::new(255, 220, 120, 255)),
                GradientStop::new(from_int(1), RGBA8::new(200, 60, 20, 255)),
            ],
            CycleMethod::Clamp,
            Transform6::identity(),
        )
        .expect("could not create a gradient");
        r.fill_oval(from_int(32), from_int(32), from_int(128), from_int(128));

        r.set_color(RGBA8::new(20, 20, 40, 200));
        r.set_stroke(StrokeParams {
            width: from_int(6),
            cap: CapStyle::Round,
            join: JoinStyle::Round,
            ..StrokeParams::default()
        });
        r.draw_arc(
            from_int(120),
            from_int(120),
            from_int(112),
            from_int(112),
            from_int(30),
            from_int(240),
            ArcType::Open,
        );

        r.set_stroke(StrokeParams {
            width: from_int(3),
            dash: vec![from_int(8), from_int(4)],
            ..StrokeParams::default()
        });
        r.draw_round_rect(
            from_int(16),
            from_int(176),
            from_int(96),
            from_int(64),
            from_int(24),
            from_int(24),
        );
        r.draw_line(pt(16, 16), pt(240, 16));
    }

    let file = File::create(&opt.out_path).expect("could not create the output file");
    let mut out = BufWriter::new(file);
    write!(out, "P6\n{} {}\n255\n", size, size).expect("write failed");
    for p in pixels {
        out.write_all(&[(p >> 16) as u8, (p >> 8) as u8, p as u8])
            .expect("write failed");
    }
    out.flush().expect("write failed");
}
