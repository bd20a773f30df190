use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_circle_mut;

use crate::generator::{Dot, DOT_COLOR};
use crate::geometry::{Point, Size};
use crate::scheduler::DotSink;

pub const DEFAULT_DOT_SIZE: f32 = 2.0;

const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Stencil raster that collects opaque dots. Starts fully transparent.
pub struct MaskAccumulator {
    buffer: RgbaImage,
    radius: i32,
    ready: bool,
}

impl MaskAccumulator {
    pub fn new(size: Size, dot_size: f32) -> Self {
        Self {
            buffer: RgbaImage::from_pixel(size.width, size.height, CLEAR),
            radius: (dot_size / 2.0).max(0.0) as i32,
            ready: false,
        }
    }

    pub fn paint(&mut self, point: Point) {
        draw_filled_circle_mut(&mut self.buffer, point.pixel(), self.radius, DOT_COLOR);
    }

    pub fn reset(&mut self) {
        self.buffer.pixels_mut().for_each(|pixel| *pixel = CLEAR);
        self.ready = false;
    }

    pub fn mark_ready(&mut self) {
        self.ready = true;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    pub fn buffer(&self) -> &RgbaImage {
        &self.buffer
    }
}

impl DotSink for MaskAccumulator {
    fn paint(&mut self, dot: &Dot) {
        MaskAccumulator::paint(self, dot.point);
    }
}
