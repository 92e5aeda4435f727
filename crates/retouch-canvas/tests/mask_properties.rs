//! Integration test: draw, extract, and composite through the public API.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use retouch_canvas::{
    BrushConfig, Dimensions, DisplayPoint, ImageSource, MaskClass, MaskImage, MaskSurface,
    PointerEvent, Rect, RgbaImage, StrokeLayer, apply_mask, apply_mask_to_image, codec,
};

fn tap_layer(display: Dimensions, at: DisplayPoint, brush: f64) -> StrokeLayer {
    let mut layer = StrokeLayer::new(BrushConfig::default().with_brush_size(brush)).unwrap();
    layer.resize(display);
    layer.apply(PointerEvent::Down { x: at.x, y: at.y });
    layer.apply(PointerEvent::Up);
    layer
}

fn photo(width: u32, height: u32) -> RgbaImage {
    #[allow(clippy::cast_possible_truncation)]
    RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 90, 255])
    })
}

#[test]
fn mask_matches_natural_size_regardless_of_display_size() {
    let natural = Dimensions::new(1000, 1000);
    for display in [Dimensions::new(250, 250), Dimensions::new(1000, 1000)] {
        let layer = tap_layer(display, DisplayPoint::new(100.0, 100.0), 20.0);
        let png = layer.mask_png(natural).unwrap().expect("something was drawn");
        let decoded = codec::decode_rgba(&png).unwrap();
        assert_eq!(decoded.dimensions(), (1000, 1000), "display {display}");
    }
}

#[test]
fn every_brush_size_leaves_a_foreground_footprint() {
    let display = Dimensions::new(200, 200);
    let natural = Dimensions::new(600, 600);
    let mut previous = 0;
    for brush in [5.0, 10.0, 20.0, 35.0, 50.0] {
        let layer = tap_layer(display, DisplayPoint::new(100.0, 100.0), brush);
        let mask = layer.rasterize_to(natural).unwrap().unwrap();
        let area = mask.foreground_count();
        assert_eq!(mask.class_at(300, 300), Some(MaskClass::Foreground));
        assert!(area > previous, "brush {brush}: {area} <= {previous}");
        previous = area;
    }
}

#[test]
fn clearing_removes_content_and_mask() {
    let mut layer = tap_layer(Dimensions::new(100, 100), DisplayPoint::new(50.0, 50.0), 10.0);
    assert!(layer.has_content());
    layer.apply(PointerEvent::Clear);
    assert!(!layer.has_content());
    assert!(layer.rasterize_to(Dimensions::new(100, 100)).unwrap().is_none());
}

#[test]
fn strokes_drawn_before_and_after_resize_land_together() {
    let natural = Dimensions::new(1000, 1000);

    // Tap at (100, 100) on a 250px surface, then the layout grows to 500px.
    let before = tap_layer(Dimensions::new(250, 250), DisplayPoint::new(100.0, 100.0), 10.0);
    let mut before = before;
    before.apply(PointerEvent::Resize {
        width: 500,
        height: 500,
    });

    // The same spot on the 500px surface is (200, 200).
    let after = tap_layer(Dimensions::new(500, 500), DisplayPoint::new(200.0, 200.0), 10.0);

    let a = before.rasterize_to(natural).unwrap().unwrap();
    let b = after.rasterize_to(natural).unwrap().unwrap();
    assert_eq!(a.class_at(400, 400), Some(MaskClass::Foreground));
    assert_eq!(b.class_at(400, 400), Some(MaskClass::Foreground));
    assert_eq!(a.class_at(100, 100), Some(MaskClass::Background));
    assert_eq!(b.class_at(200, 200), Some(MaskClass::Background));
}

#[test]
fn viewport_resize_keeps_strokes_on_the_image() {
    let mut surface = MaskSurface::new(BrushConfig::default()).unwrap();
    surface.set_image(Dimensions::new(1000, 1000));
    let container = Rect::new(0.0, 0.0, 800.0, 800.0);

    surface.sync_geometry(Rect::new(0.0, 0.0, 250.0, 250.0), container);
    surface.pointer_down(125.0, 125.0);
    surface.pointer_up();

    // Window grows; the image is now 500px and offset.
    surface.sync_geometry(Rect::new(100.0, 50.0, 500.0, 500.0), container);
    surface.pointer_down(100.0 + 50.0, 50.0 + 50.0);
    surface.pointer_up();

    let mask = surface.extract_mask().unwrap().unwrap();
    assert_eq!(mask.class_at(500, 500), Some(MaskClass::Foreground));
    assert_eq!(mask.class_at(100, 100), Some(MaskClass::Foreground));
    assert_eq!(mask.class_at(900, 100), Some(MaskClass::Background));
}

#[test]
fn painted_mask_cuts_out_the_painted_area() {
    let original = photo(400, 400);
    let layer = {
        let mut layer = StrokeLayer::new(BrushConfig::default().with_brush_size(20.0)).unwrap();
        layer.resize(Dimensions::new(100, 100));
        layer.begin_stroke(DisplayPoint::new(20.0, 50.0));
        layer.extend_stroke(DisplayPoint::new(80.0, 50.0));
        layer.end_stroke();
        layer
    };
    let mask = layer.rasterize_to(Dimensions::new(400, 400)).unwrap().unwrap();
    let cutout = apply_mask(&original, &mask);

    let kept = cutout.as_image().get_pixel(200, 200).0;
    assert_eq!(kept[3], 255);
    assert_eq!(&kept[..3], &original.get_pixel(200, 200).0[..3]);

    let dropped = cutout.as_image().get_pixel(200, 20).0;
    assert_eq!(dropped[3], 0);
    assert_eq!(&dropped[..3], &original.get_pixel(200, 20).0[..3]);
}

#[test]
fn all_black_and_all_white_masks() {
    let original = photo(64, 48);
    let original_png = codec::encode_png(&original).unwrap();

    for (value, alpha) in [(0u8, 0u8), (255, 255)] {
        let mask = MaskImage::from_image(RgbaImage::from_pixel(
            64,
            48,
            image::Rgba([value, value, value, 255]),
        ));
        let mask_png = mask.to_png().unwrap();
        let url = apply_mask_to_image(
            ImageSource::Bytes(&original_png),
            ImageSource::Bytes(&mask_png),
        )
        .unwrap();
        let result = ImageSource::DataUrl(&url).decode().unwrap();
        for (src, out) in original.pixels().zip(result.pixels()) {
            assert_eq!(&out.0[..3], &src.0[..3]);
            assert_eq!(out.0[3], alpha);
        }
    }
}
