use fixgeom::{from_int, Transform6};
use rgb::RGBA8;

use pisces::{
    pt, ArcType, Config, CycleMethod, GradientStop, JoinStyle, LineSink, PathMode, PathStore,
    PiscesRenderer, PixelData, RenderCache, StrokeParams, Surface, WindingRule,
};

const RED: RGBA8 = RGBA8 {
    r: 255,
    g: 0,
    b: 0,
    a: 255,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Render onto a transparent ARGB surface of `size`×`size` pixels with
/// antialiasing disabled and the color set to opaque red.
fn render_aliased(size: u32, f: impl FnOnce(&mut PiscesRenderer<'_>)) -> Vec<u32> {
    render(size, |r| {
        r.set_antialiasing(false);
        r.set_color(RED);
        f(r);
    })
}

fn render(size: u32, f: impl FnOnce(&mut PiscesRenderer<'_>)) -> Vec<u32> {
    init_logger();
    let mut pixels = vec![0u32; (size * size) as usize];
    {
        let surface = Surface::new(PixelData::Argb8888(&mut pixels), size, size).unwrap();
        let mut r = PiscesRenderer::new(surface);
        f(&mut r);
    }
    pixels
}

/// Format the pixels as an ASCII-art mask for readable assertion failures.
fn mask(pixels: &[u32], size: u32) -> String {
    pixels
        .chunks(size as usize)
        .map(|row| {
            row.iter()
                .map(|&p| if p != 0 { '#' } else { '.' })
                .chain(std::iter::once('\n'))
                .collect::<String>()
        })
        .collect()
}

fn mask_of(size: u32, f: impl Fn(u32, u32) -> bool) -> String {
    let pixels: Vec<u32> = (0..size * size)
        .map(|i| f(i % size, i / size) as u32)
        .collect();
    mask(&pixels, size)
}

#[test]
fn solid_square() {
    let pixels = render_aliased(20, |r| {
        r.begin_rendering(WindingRule::NonZero);
        r.move_to(pt(0, 0));
        r.line_to(pt(10, 0));
        r.line_to(pt(10, 10));
        r.line_to(pt(0, 10));
        r.close();
        r.end_rendering();
    });
    for y in 0..20 {
        for x in 0..20 {
            let expected = if x < 10 && y < 10 { 0xffff0000 } else { 0 };
            assert_eq!(pixels[(y * 20 + x) as usize], expected, "({}, {})", x, y);
        }
    }
}

#[test]
fn rect_shortcut_matches_general_path() {
    // `fill_rect` takes the axis-aligned rectangle shortcut; the same
    // rectangle with a redundant vertex doesn't.
    let (x0, y0) = (from_int(2) + 0x3000, from_int(3) + 0x9000);
    let (x1, y1) = (from_int(13) + 0x5800, from_int(9) + 0x2000);
    let fast = render(16, |r| {
        r.set_color(RED);
        r.fill_rect(x0, y0, x1 - x0, y1 - y0);
    });
    let general = render(16, |r| {
        r.set_color(RED);
        r.begin_rendering(WindingRule::NonZero);
        r.move_to(cgmath::Point2::new(x0, y0));
        r.line_to(cgmath::Point2::new((x0 + x1) / 2, y0));
        r.line_to(cgmath::Point2::new(x1, y0));
        r.line_to(cgmath::Point2::new(x1, y1));
        r.line_to(cgmath::Point2::new(x0, y1));
        r.close();
        r.end_rendering();
    });
    assert_eq!(fast, general);
}

const TRIANGLE_CMDS: [u8; 4] = [0, 1, 1, 4];
const TRIANGLE_COORDS: [f32; 6] = [1.5, 1.0, 14.25, 4.5, 5.0, 13.75];

#[test]
fn cached_coverage_matches_direct_rendering() {
    let direct = render(16, |r| {
        r.set_color(RED);
        r.render_path(&TRIANGLE_CMDS, &TRIANGLE_COORDS, WindingRule::NonZero, None);
    });

    let mut cache = RenderCache::new();
    let recorded = render(16, |r| {
        r.set_color(RED);
        r.render_path(&TRIANGLE_CMDS, &TRIANGLE_COORDS, WindingRule::NonZero, Some(&mut cache));
    });
    assert!(cache.is_valid());
    assert_eq!(direct, recorded);

    // A valid cache is replayed without looking at the path
    let replayed = render(16, |r| {
        r.set_color(RED);
        r.render_path(&[], &[], WindingRule::NonZero, Some(&mut cache));
    });
    assert_eq!(direct, replayed);

    cache.invalidate();
    assert!(!cache.is_valid());
}

#[test]
fn winding_rules() {
    // Two overlapping squares traversed in the same direction
    let cmds = [0, 1, 1, 1, 4, 0, 1, 1, 1, 4];
    let coords = [
        0.0, 0.0, 6.0, 0.0, 6.0, 6.0, 0.0, 6.0, //
        3.0, 3.0, 9.0, 3.0, 9.0, 9.0, 3.0, 9.0,
    ];
    let in_a = |x: u32, y: u32| x < 6 && y < 6;
    let in_b = |x: u32, y: u32| (3..9).contains(&x) && (3..9).contains(&y);

    let nonzero = render_aliased(10, |r| {
        r.render_path(&cmds, &coords, WindingRule::NonZero, None);
    });
    assert_eq!(mask(&nonzero, 10), mask_of(10, |x, y| in_a(x, y) || in_b(x, y)));

    let even_odd = render_aliased(10, |r| {
        r.render_path(&cmds, &coords, WindingRule::EvenOdd, None);
    });
    assert_eq!(mask(&even_odd, 10), mask_of(10, |x, y| in_a(x, y) != in_b(x, y)));
}

#[test]
fn stroked_line() {
    let pixels = render_aliased(16, |r| {
        r.set_stroke(StrokeParams {
            width: from_int(2),
            ..StrokeParams::default()
        });
        r.draw_line(pt(2, 5), pt(12, 5));
    });
    assert_eq!(
        mask(&pixels, 16),
        mask_of(16, |x, y| (2..12).contains(&x) && (4..6).contains(&y))
    );
}

#[test]
fn dashed_line() {
    let pixels = render_aliased(12, |r| {
        r.set_stroke(StrokeParams {
            width: from_int(2),
            dash: vec![from_int(2), from_int(2)],
            ..StrokeParams::default()
        });
        r.draw_line(pt(0, 5), pt(10, 5));
    });
    assert_eq!(
        mask(&pixels, 12),
        mask_of(12, |x, y| x < 10 && x % 4 < 2 && (4..6).contains(&y))
    );
}

#[test]
fn rect_outline() {
    let expected = mask_of(12, |x, y| {
        let outer = (1..11).contains(&x) && (1..11).contains(&y);
        let inner = (3..9).contains(&x) && (3..9).contains(&y);
        outer && !inner
    });
    let stroke = StrokeParams {
        width: from_int(2),
        ..StrokeParams::default()
    };

    // Offset rectangles
    let nested = render_aliased(12, |r| {
        r.set_stroke(stroke.clone());
        r.draw_rect(from_int(2), from_int(2), from_int(8), from_int(8));
    });
    assert_eq!(mask(&nested, 12), expected);

    // The stroker
    let stroked = render_aliased(12, |r| {
        r.set_stroke(stroke.clone());
        r.set_path_mode(PathMode::Stroke);
        r.begin_rendering(WindingRule::NonZero);
        r.move_to(pt(2, 2));
        r.line_to(pt(10, 2));
        r.line_to(pt(10, 10));
        r.line_to(pt(2, 10));
        r.close();
        r.end_rendering();
    });
    assert_eq!(mask(&stroked, 12), expected);
}

#[test]
fn clip_and_region() {
    let pixels = render_aliased(10, |r| {
        r.set_clip(2, 2, 6, 6);
        r.begin_rendering_region(0, 0, 5, 10, WindingRule::EvenOdd);
        r.set_path_data(&[0, 1, 1, 1, 4], &[0.0, 0.0, 10.0, 0.0, 10.0, 10.0, 0.0, 10.0]);
        r.end_rendering();

        // The region is dropped after `end_rendering`
        assert_eq!(r.clip(), fixgeom::PixelBox::with_size(2, 2, 6, 6));
    });
    assert_eq!(
        mask(&pixels, 10),
        mask_of(10, |x, y| (2..5).contains(&x) && (2..8).contains(&y))
    );
}

#[test]
fn linear_gradient_fill() {
    let stops = [
        GradientStop::new(0, RGBA8::new(0, 0, 0, 255)),
        GradientStop::new(from_int(1), RGBA8::new(255, 255, 255, 255)),
    ];
    let pixels = render(16, |r| {
        r.set_linear_gradient(pt(0, 0), pt(16, 0), &stops, CycleMethod::Clamp, Transform6::identity())
            .unwrap();
        r.fill_rect(0, 0, from_int(16), from_int(1));
    });
    let row = &pixels[..16];
    assert!(row.iter().all(|&p| p >> 24 == 0xff));
    let reds: Vec<u32> = row.iter().map(|&p| (p >> 16) & 0xff).collect();
    assert!(reds.windows(2).all(|w| w[0] <= w[1]), "{:?}", reds);
    assert!(reds[0] < 16 && reds[15] > 239, "{:?}", reds);
    assert!(pixels[16..].iter().all(|&p| p == 0));
}

#[test]
fn bounding_box_of_last_primitive() {
    render_aliased(16, |r| {
        r.fill_oval(from_int(4), from_int(5), from_int(6), from_int(4));
        let bbox = r.bounding_box().unwrap();
        assert_eq!(bbox, fixgeom::PixelBox::with_size(4, 5, 6, 4));
    });
}

/// The stroke of a rectangle through the general stroker.
fn stroke_rect(r: &mut PiscesRenderer<'_>, x0: i32, y0: i32, x1: i32, y1: i32) {
    r.set_path_mode(PathMode::Stroke);
    r.begin_rendering(WindingRule::NonZero);
    r.move_to(pt(x0, y0));
    r.line_to(pt(x1, y0));
    r.line_to(pt(x1, y1));
    r.line_to(pt(x0, y1));
    r.close();
    r.end_rendering();
    r.set_path_mode(PathMode::Fill);
}

#[test]
fn rect_outline_respects_miter_limit() {
    // A right angle needs a miter limit of at least √2
    let stroke = StrokeParams {
        width: from_int(4),
        miter_limit: from_int(1),
        ..StrokeParams::default()
    };
    let draw_rect = render_aliased(16, |r| {
        r.set_stroke(stroke.clone());
        r.draw_rect(from_int(4), from_int(4), from_int(8), from_int(8));
    });
    let stroked = render_aliased(16, |r| {
        r.set_stroke(stroke.clone());
        stroke_rect(r, 4, 4, 12, 12);
    });
    assert_eq!(mask(&draw_rect, 16), mask(&stroked, 16));

    // Beveled corners
    assert_eq!(draw_rect[2 * 16 + 2], 0);
    assert_eq!(draw_rect[13 * 16 + 13], 0);
    assert_eq!(draw_rect[2 * 16 + 8], 0xffff0000);

    // The miter limit is only just enough
    let mitered = render_aliased(16, |r| {
        r.set_stroke(StrokeParams {
            miter_limit: 92682,
            ..stroke.clone()
        });
        r.draw_rect(from_int(4), from_int(4), from_int(8), from_int(8));
    });
    assert_eq!(mitered[2 * 16 + 2], 0xffff0000);
    assert_eq!(mitered[13 * 16 + 13], 0xffff0000);
}

#[test]
fn round_rect_outline_without_arcs_uses_joins() {
    let pixels = render_aliased(16, |r| {
        r.set_stroke(StrokeParams {
            width: from_int(4),
            join: JoinStyle::Bevel,
            ..StrokeParams::default()
        });
        r.draw_round_rect(from_int(4), from_int(4), from_int(8), from_int(8), 0, 0);
    });
    assert_eq!(pixels[13 * 16 + 13], 0);
    assert_eq!(pixels[13 * 16 + 2], 0);
    assert_eq!(pixels[2 * 16 + 8], 0xffff0000);
    assert_eq!(pixels[8 * 16 + 13], 0xffff0000);
    assert_eq!(pixels[8 * 16 + 8], 0);
}

/// Check the pixels whose centers are clearly inside or outside the band
/// `r0..r1` around `(cx, cy)`.
fn assert_ring(pixels: &[u32], size: u32, (cx, cy): (f64, f64), (r0, r1): (f64, f64)) {
    for y in 0..size {
        for x in 0..size {
            let (dx, dy) = (x as f64 + 0.5 - cx, y as f64 + 0.5 - cy);
            let d = (dx * dx + dy * dy).sqrt();
            let p = pixels[(y * size + x) as usize];
            if d > r0 + 0.6 && d < r1 - 0.6 {
                assert_ne!(p, 0, "({}, {}) should be painted", x, y);
            } else if d < r0 - 0.6 || d > r1 + 0.6 {
                assert_eq!(p, 0, "({}, {}) should be clear", x, y);
            }
        }
    }
}

#[test]
fn circle_outline() {
    let pixels = render_aliased(20, |r| {
        r.set_stroke(StrokeParams {
            width: from_int(2),
            ..StrokeParams::default()
        });
        r.draw_oval(from_int(4), from_int(4), from_int(12), from_int(12));
    });
    assert_ring(&pixels, 20, (10.0, 10.0), (5.0, 7.0));
}

#[test]
fn round_rect_outline() {
    let pixels = render_aliased(20, |r| {
        r.set_stroke(StrokeParams {
            width: from_int(2),
            ..StrokeParams::default()
        });
        r.draw_round_rect(
            from_int(2),
            from_int(2),
            from_int(16),
            from_int(16),
            from_int(6),
            from_int(6),
        );
    });

    // Straight sides
    assert_ne!(pixels[2 * 20 + 10], 0);
    assert_ne!(pixels[10 * 20 + 17], 0);
    assert_eq!(pixels[10], 0);
    assert_eq!(pixels[4 * 20 + 10], 0);
    assert_eq!(pixels[10 * 20 + 10], 0);

    // Rounded corners
    assert_ne!(pixels[2 * 20 + 2], 0);
    assert_eq!(pixels[20 + 1], 0);
    assert_eq!(pixels[18 * 20 + 18], 0);
}

#[test]
fn arcs() {
    // The upper right quadrant
    let pie = render_aliased(16, |r| {
        r.fill_arc(0, 0, from_int(16), from_int(16), 0, from_int(90), ArcType::Pie);
    });
    assert_ne!(pie[4 * 16 + 12], 0);
    assert_ne!(pie[16 + 9], 0);
    assert_eq!(pie[4 * 16 + 4], 0);
    assert_eq!(pie[12 * 16 + 12], 0);
    assert_eq!(pie[12 * 16 + 4], 0);
    assert_eq!(pie[15], 0);

    // The upper half of the circle
    let open = render_aliased(16, |r| {
        r.set_stroke(StrokeParams {
            width: from_int(2),
            ..StrokeParams::default()
        });
        r.draw_arc(0, 0, from_int(16), from_int(16), 0, from_int(180), ArcType::Open);
    });
    assert_ne!(open[8], 0);
    assert_ne!(open[2 * 16 + 2], 0);
    assert_eq!(open[15 * 16 + 8], 0);
    assert_eq!(open[13 * 16 + 2], 0);
    assert_eq!(open[8 * 16 + 8], 0);
}

#[test]
fn radial_gradient_fill() {
    let stops = [
        GradientStop::new(0, RGBA8::new(0, 0, 0, 255)),
        GradientStop::new(from_int(1), RGBA8::new(255, 255, 255, 255)),
    ];
    let pixels = render(16, |r| {
        r.set_radial_gradient(
            pt(8, 8),
            pt(8, 8),
            from_int(8),
            &stops,
            CycleMethod::Clamp,
            Transform6::identity(),
        )
        .unwrap();
        r.fill_rect(0, 0, from_int(16), from_int(16));
    });
    let red = |x: usize, y: usize| (pixels[y * 16 + x] >> 16) & 0xff;
    assert!(pixels.iter().all(|&p| p >> 24 == 0xff));
    assert!(red(8, 8) < 40, "{}", red(8, 8));
    assert!(red(0, 0) > 239, "{}", red(0, 0));
    let row: Vec<u32> = (8..16).map(|x| red(x, 8)).collect();
    assert!(row.windows(2).all(|w| w[0] <= w[1]), "{:?}", row);
}

const CHECKER: [u32; 4] = [0xffff0000, 0xff00ff00, 0xff0000ff, 0xffffffff];

#[test]
fn texture_fill() {
    let pixels = render_aliased(12, |r| {
        r.set_texture(
            &CHECKER,
            2,
            2,
            2,
            false,
            Transform6::scale(from_int(4), from_int(4)),
        )
        .unwrap();
        r.fill_rect(0, 0, from_int(8), from_int(8));
    });
    assert_eq!(pixels[12 + 1], 0xffff0000);
    assert_eq!(pixels[12 + 5], 0xff00ff00);
    assert_eq!(pixels[5 * 12 + 1], 0xff0000ff);
    assert_eq!(pixels[6 * 12 + 6], 0xffffffff);
    assert_eq!(pixels[9 * 12 + 9], 0);
    assert_eq!(pixels[12 + 9], 0);
}

#[test]
fn paint_rows_in_every_format() {
    // A repeating single-texel texture paints the same pixels as a flat
    // color, including partially covered ones
    fn draw(surface: Surface<'_>, textured: bool) {
        let mut r = PiscesRenderer::new(surface);
        if textured {
            r.set_texture(&[0xff40a0c0], 1, 1, 1, true, Transform6::identity())
                .unwrap();
        } else {
            r.set_color(RGBA8::new(0x40, 0xa0, 0xc0, 0xff));
        }
        r.render_path(&TRIANGLE_CMDS, &TRIANGLE_COORDS, WindingRule::NonZero, None);
    }
    init_logger();

    let rgb565 = |textured: bool| {
        let mut px = vec![0x1234u16; 16 * 16];
        draw(Surface::new(PixelData::Rgb565(&mut px), 16, 16).unwrap(), textured);
        px
    };
    let textured = rgb565(true);
    assert_eq!(textured, rgb565(false));
    assert_eq!(textured[15 * 16 + 15], 0x1234);
    assert!(textured.iter().any(|&p| p != 0x1234));

    let gray8 = |textured: bool| {
        let mut px = vec![0x55u8; 16 * 16];
        draw(Surface::new(PixelData::Gray8(&mut px), 16, 16).unwrap(), textured);
        px
    };
    let textured = gray8(true);
    assert_eq!(textured, gray8(false));
    assert_eq!(textured[15 * 16 + 15], 0x55);
    assert!(textured.iter().any(|&p| p != 0x55 && p != textured[4 * 16 + 6]));
}

#[test]
fn cached_coverage_with_gradient_paint() {
    let stops = [
        GradientStop::new(0, RGBA8::new(255, 0, 0, 255)),
        GradientStop::new(from_int(1), RGBA8::new(0, 0, 255, 128)),
    ];
    let draw = |cache: Option<&mut RenderCache>| {
        render(16, |r| {
            r.set_linear_gradient(pt(0, 0), pt(16, 16), &stops, CycleMethod::Reflect, Transform6::identity())
                .unwrap();
            r.render_path(&TRIANGLE_CMDS, &TRIANGLE_COORDS, WindingRule::NonZero, cache);
        })
    };

    let direct = draw(None);
    let mut cache = RenderCache::new();
    let recorded = draw(Some(&mut cache));
    let replayed = draw(Some(&mut cache));
    assert_eq!(direct, recorded);
    assert_eq!(direct, replayed);
    assert!(direct.iter().any(|&p| p != 0));
}

#[test]
fn path_store_through_text_chain() {
    let mut glyph = PathStore::new();
    glyph.move_to(pt(0, 0));
    glyph.line_to(pt(4, 0));
    glyph.line_to(pt(4, 4));
    glyph.line_to(pt(0, 4));
    glyph.close();

    // The extra transformation applies first
    let pixels = render_aliased(12, |r| {
        r.set_transform(Transform6::translation(from_int(2), from_int(2)));
        r.fill_path_store(&glyph, Some(&Transform6::scale(from_int(2), from_int(2))));
    });
    assert_eq!(
        mask(&pixels, 12),
        mask_of(12, |x, y| (2..10).contains(&x) && (2..10).contains(&y))
    );

    // Without it, and with a terminated store
    glyph.end();
    let pixels = render_aliased(12, |r| {
        r.fill_path_store(&glyph, Some(&Transform6::scale(from_int(2), from_int(2))));
        r.fill_path_store(&glyph, None);
    });
    assert_eq!(
        mask(&pixels, 12),
        mask_of(12, |x, y| x < 8 && y < 8)
    );
}

#[test]
fn bounding_boxes_converge_with_flatness() {
    let bbox_at = |flatness: i32| {
        init_logger();
        let mut px = vec![0u32; 32 * 32];
        let surface = Surface::new(PixelData::Argb8888(&mut px), 32, 32).unwrap();
        let mut r =
            PiscesRenderer::with_config(surface, Config::new().with_fill_flatness(flatness));
        r.set_color(RED);
        r.begin_rendering(WindingRule::NonZero);
        r.move_to(pt(2, 28));
        r.quad_to(cgmath::Point2::new(from_int(9), -from_int(9)), pt(20, 26));
        r.cubic_to(
            cgmath::Point2::new(from_int(34), from_int(22)),
            cgmath::Point2::new(from_int(26), from_int(31)),
            cgmath::Point2::new(from_int(15) + 0x4000, from_int(30)),
        );
        r.close();
        r.end_rendering();
        r.bounding_box().unwrap()
    };

    let loose = bbox_at(0x8000);
    let tight = bbox_at(0x400);
    for (a, b) in [
        (loose.min.x, tight.min.x),
        (loose.min.y, tight.min.y),
        (loose.max.x, tight.max.x),
        (loose.max.y, tight.max.y),
    ]
    .iter()
    {
        assert!((a - b).abs() <= 1, "{:?} vs. {:?}", loose, tight);
    }
}
