use image::{Rgba, RgbaImage};

use stipple_mask::{
    compositor::{compose, StencilCompositor},
    error::Error,
    generator::{Policy, PointGenerator},
    geometry::{Point, Size},
    mask::MaskAccumulator,
    scheduler::BatchScheduler,
};

// Fixed seed for deterministic tests
const TEST_SEED: u64 = 42;

fn create_source(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 7 % 256) as u8, (y * 13 % 256) as u8, 90, ((x + y) * 5 % 256) as u8])
    })
}

fn create_mask(size: Size, total: usize) -> MaskAccumulator {
    let mut generator = PointGenerator::new(Policy::GridJitter, total, size, TEST_SEED);
    let mut scheduler = BatchScheduler::new(total, 64);
    let mut mask = MaskAccumulator::new(size, 2.0);

    while scheduler.advance(&mut generator, &mut mask).is_some() {}
    mask.mark_ready();

    mask
}

#[test]
fn test_transparent_mask_hides_everything() {
    let source = create_source(32, 24);
    let mask = RgbaImage::from_pixel(32, 24, Rgba([0, 0, 0, 0]));

    let composite = compose(&source, &mask).unwrap();

    assert!(composite.pixels().all(|p| p[3] == 0));
}

#[test]
fn test_opaque_mask_keeps_source_alpha() {
    let source = create_source(32, 24);
    let mask = RgbaImage::from_pixel(32, 24, Rgba([255, 255, 255, 255]));

    let composite = compose(&source, &mask).unwrap();

    for (out, input) in composite.pixels().zip(source.pixels()) {
        assert_eq!(out, input);
    }
}

#[test]
fn test_alpha_is_the_minimum() {
    let source = RgbaImage::from_pixel(2, 1, Rgba([10, 20, 30, 100]));
    let mut mask = RgbaImage::new(2, 1);
    mask.put_pixel(0, 0, Rgba([0, 0, 0, 200]));
    mask.put_pixel(1, 0, Rgba([0, 0, 0, 50]));

    let composite = compose(&source, &mask).unwrap();

    assert_eq!(composite.get_pixel(0, 0), &Rgba([10, 20, 30, 100]));
    assert_eq!(composite.get_pixel(1, 0), &Rgba([10, 20, 30, 50]));
}

#[test]
fn test_compose_is_idempotent() {
    let size = Size::uniform(64);
    let source = create_source(64, 64);
    let mask = create_mask(size, 256);

    let first = compose(&source, mask.buffer()).unwrap();
    let second = compose(&source, mask.buffer()).unwrap();

    assert_eq!(first.as_raw(), second.as_raw());
}

#[test]
fn test_stippled_composite_follows_mask() {
    let size = Size::uniform(64);
    let source = RgbaImage::from_pixel(64, 64, Rgba([200, 100, 50, 255]));
    let mask = create_mask(size, 256);

    let composite = compose(&source, mask.buffer()).unwrap();
    let visible = composite.pixels().filter(|p| p[3] > 0).count();

    assert!(visible > 0 && visible < 64 * 64);

    for (out, gate) in composite.pixels().zip(mask.buffer().pixels()) {
        assert_eq!(out[3], gate[3]);
        assert_eq!(&out.0[..3], &[200, 100, 50]);
    }
}

#[test]
fn test_size_mismatch_is_an_error() {
    let source = create_source(10, 10);
    let mask = RgbaImage::new(10, 11);

    match compose(&source, &mask) {
        Err(Error::SizeMismatch { source_size, mask_size }) => {
            assert_eq!(source_size, (10, 10));
            assert_eq!(mask_size, (10, 11));
        }
        other => panic!("expected size mismatch, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_compositor_counts_refreshes() {
    let source = create_source(8, 8);
    let mask = RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255]));
    let mut compositor = StencilCompositor::new();

    assert!(compositor.composite().is_none());

    compositor.refresh(&source, &mask).unwrap();
    assert_eq!(compositor.compositions(), 1);
    assert!(compositor.composite().is_some());

    compositor.invalidate();
    assert!(compositor.composite().is_none());
    assert_eq!(compositor.compositions(), 1);
}

#[test]
fn test_mask_paints_and_resets() {
    let mut mask = MaskAccumulator::new(Size::uniform(20), 2.0);

    assert!(mask.buffer().pixels().all(|p| p[3] == 0));
    assert_eq!(mask.radius(), 1);

    mask.paint(Point::new(10.0, 10.0));
    mask.paint(Point::new(10.0, 10.0));

    assert_eq!(mask.buffer().get_pixel(10, 10), &Rgba([255, 255, 255, 255]));
    assert_eq!(mask.buffer().get_pixel(11, 10)[3], 255);
    assert_eq!(mask.buffer().get_pixel(0, 0)[3], 0);

    mask.mark_ready();
    mask.reset();

    assert!(!mask.is_ready());
    assert!(mask.buffer().pixels().all(|p| p[3] == 0));
}

#[test]
fn test_mask_dots_at_the_edge_are_clipped() {
    let mut mask = MaskAccumulator::new(Size::uniform(4), 4.0);

    mask.paint(Point::new(4.0, 4.0));
    mask.paint(Point::new(0.0, 0.0));

    assert_eq!(mask.buffer().get_pixel(3, 3)[3], 255);
    assert_eq!(mask.buffer().get_pixel(0, 0)[3], 255);
}
