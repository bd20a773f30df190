use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, Blend};
use log::info;

use crate::generator::{Dot, Palette, Policy, PointGenerator};
use crate::geometry::Size;
use crate::render::{Surface, View};
use crate::scheduler::{BatchScheduler, DotSink, Progress, Tick};

pub const DEFAULT_DOTS_PER_FRAME: usize = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct ArtConfig {
    pub total_dots: usize,
    pub dots_per_frame: usize,
    pub size: Size,
    pub dot_size: f32,
    pub policy: Policy,
    pub palette: Palette,
    pub background: u8,
    pub seed: u64,
}

impl Default for ArtConfig {
    fn default() -> Self {
        Self {
            total_dots: 1_000_000,
            dots_per_frame: DEFAULT_DOTS_PER_FRAME,
            size: Size::new(1920, 1080),
            dot_size: 1.0,
            policy: Policy::beach(),
            palette: Palette::Position,
            background: 10,
            seed: 0,
        }
    }
}

struct ArtCanvas {
    image: Blend<RgbaImage>,
    radius: i32,
}

impl ArtCanvas {
    fn new(size: Size, dot_size: f32, background: u8) -> Self {
        Self {
            image: Blend(RgbaImage::from_pixel(size.width, size.height, backdrop(background))),
            radius: (dot_size / 2.0).max(0.0) as i32,
        }
    }

    fn clear(&mut self, background: u8) {
        let color = backdrop(background);

        self.image.0.pixels_mut().for_each(|pixel| *pixel = color);
    }
}

fn backdrop(level: u8) -> Rgba<u8> {
    Rgba([level, level, level, 255])
}

impl DotSink for ArtCanvas {
    fn paint(&mut self, dot: &Dot) {
        draw_filled_circle_mut(&mut self.image, dot.point.pixel(), self.radius, dot.color);
    }
}

/// Generative dot art: generator output is blended straight onto a canvas,
/// one batch per frame.
pub struct DotArt {
    config: ArtConfig,
    policy: Policy,
    palette: Palette,
    run: u64,
    frame: u64,
    generator: PointGenerator,
    scheduler: BatchScheduler,
    canvas: ArtCanvas,
}

impl DotArt {
    pub fn new(config: ArtConfig) -> Self {
        let policy = config.policy.clone();
        let palette = config.palette;

        Self {
            generator: Self::generator(&config, &policy, palette, 0),
            scheduler: BatchScheduler::new(config.total_dots, config.dots_per_frame),
            canvas: ArtCanvas::new(config.size, config.dot_size, config.background),
            policy,
            palette,
            run: 0,
            frame: 0,
            config,
        }
    }

    fn generator(config: &ArtConfig, policy: &Policy, palette: Palette, run: u64) -> PointGenerator {
        PointGenerator::new(
            policy.clone(),
            config.total_dots,
            config.size,
            config.seed.wrapping_add(run),
        )
        .with_palette(palette)
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    pub fn progress(&self) -> Progress {
        self.scheduler.progress()
    }

    pub fn done(&self) -> bool {
        self.scheduler.done()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas.image.0
    }

    /// Draws one frame's worth of dots. `None` once the piece is finished.
    pub fn frame(&mut self) -> Option<Tick> {
        self.generator.set_frame(self.frame);

        let tick = self.scheduler.advance(&mut self.generator, &mut self.canvas)?;

        self.frame += 1;
        Some(tick)
    }

    pub fn finish(&mut self) -> Progress {
        while self.frame().is_some() {}

        self.progress()
    }

    /// Clears the canvas and restarts the current pattern.
    pub fn reset(&mut self) {
        self.run += 1;
        self.frame = 0;
        self.canvas.clear(self.config.background);
        self.generator = Self::generator(&self.config, &self.policy, self.palette, self.run);
        self.scheduler.reset();
    }

    /// Switches to the next pattern and palette and starts over.
    pub fn next_pattern(&mut self) {
        self.policy = self.policy.next_pattern();
        self.palette = self.palette.next();
        self.reset();

        info!("Pattern: {}, palette: {:?}", self.policy.name(), self.palette);
    }
}

impl Surface for DotArt {
    fn size(&self) -> Size {
        self.config.size
    }

    fn view(&self, _view: View) -> Option<&RgbaImage> {
        Some(self.canvas())
    }
}
