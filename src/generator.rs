use std::f32::consts::TAU;
use std::str::FromStr;

use image::Rgba;
use log::{debug, warn};
use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rand_xorshift::XorShiftRng;
use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Size};

pub type Color = Rgba<u8>;

/// Colour of every dot stamped into a stencil mask.
pub const DOT_COLOR: Color = Rgba([255, 255, 255, 255]);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dot {
    pub point: Point,
    pub color: Color,
}

fn default_turns() -> f32 {
    1000.0
}

fn default_amplitude() -> f32 {
    0.25
}

fn default_frequency() -> f32 {
    100.0
}

fn default_count() -> u32 {
    10
}

fn default_spread() -> f32 {
    100.0
}

fn default_weight() -> u32 {
    1
}

/// How points are distributed over the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Policy {
    /// One point per cell of a `floor(sqrt(n))` square grid, jittered by a quarter cell.
    GridJitter,
    Spiral {
        #[serde(default = "default_turns")]
        turns: f32,
    },
    /// `amplitude` is a fraction of the canvas height.
    Wave {
        #[serde(default = "default_amplitude")]
        amplitude: f32,
        #[serde(default = "default_frequency")]
        frequency: f32,
    },
    Gradient,
    Clusters {
        #[serde(default = "default_count")]
        count: u32,
        #[serde(default = "default_spread")]
        spread: f32,
    },
    Uniform,
    /// Every point picks a weighted patch, each with its own geometry and colours.
    Mixed { patches: Vec<WeightedPatch> },
}

impl Policy {
    pub fn spiral() -> Self {
        Policy::Spiral { turns: default_turns() }
    }

    pub fn wave() -> Self {
        Policy::Wave {
            amplitude: default_amplitude(),
            frequency: default_frequency(),
        }
    }

    pub fn clusters() -> Self {
        Policy::Clusters {
            count: default_count(),
            spread: default_spread(),
        }
    }

    /// The beach scene: all patches, equally likely.
    pub fn beach() -> Self {
        Policy::Mixed {
            patches: Patch::ALL
                .iter()
                .map(|&patch| WeightedPatch { patch, weight: 1 })
                .collect(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Policy::GridJitter => "grid-jitter",
            Policy::Spiral { .. } => "spiral",
            Policy::Wave { .. } => "wave",
            Policy::Gradient => "gradient",
            Policy::Clusters { .. } => "clusters",
            Policy::Uniform => "uniform",
            Policy::Mixed { .. } => "mixed",
        }
    }

    /// Next pattern in the dot-art rotation: spiral, wave, gradient, clusters, beach.
    pub fn next_pattern(&self) -> Self {
        match self {
            Policy::Spiral { .. } => Policy::wave(),
            Policy::Wave { .. } => Policy::Gradient,
            Policy::Gradient => Policy::clusters(),
            Policy::Clusters { .. } => Policy::beach(),
            _ => Policy::spiral(),
        }
    }
}

impl Default for Policy {
    fn default() -> Self {
        Policy::GridJitter
    }
}

impl FromStr for Policy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "grid" | "grid-jitter" => Ok(Policy::GridJitter),
            "spiral" => Ok(Policy::spiral()),
            "wave" => Ok(Policy::wave()),
            "gradient" => Ok(Policy::Gradient),
            "clusters" => Ok(Policy::clusters()),
            "uniform" | "random" => Ok(Policy::Uniform),
            "beach" | "mixed" => Ok(Policy::beach()),
            _ => Err(format!("unknown policy: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedPatch {
    pub patch: Patch,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Patch {
    Sand,
    Water,
    Surf,
    Board,
    SmallBoard,
    Waves,
    BlockyWaves,
}

/// Where a patch put a point, plus the geometry its colour rule depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub point: Point,
    /// Set when the point lies on the rising half of a surf crest.
    pub crest: bool,
}

impl Placement {
    fn at(point: Point) -> Self {
        Self { point, crest: false }
    }
}

fn random<R: Rng + ?Sized>(rng: &mut R, max: f32) -> f32 {
    rng.gen::<f32>() * max
}

fn channel<R: Rng + ?Sized>(rng: &mut R, base: f32, spread: f32) -> u8 {
    (base + random(rng, spread)).clamp(0.0, 255.0) as u8
}

fn either<R: Rng + ?Sized>(rng: &mut R, first: Color, second: Color, threshold: f32) -> Color {
    if random(rng, 2.0) > threshold {
        first
    } else {
        second
    }
}

/// Uniform sample inside the triangle `abc`, reflecting draws that land past the diagonal.
pub fn triangle_point<R: Rng + ?Sized>(a: Point, b: Point, c: Point, rng: &mut R) -> Point {
    let mut u = rng.gen::<f32>();
    let mut v = rng.gen::<f32>();

    if u + v > 1.0 {
        u = 1.0 - u;
        v = 1.0 - v;
    }

    Point::new(
        a.x + u * (b.x - a.x) + v * (c.x - a.x),
        a.y + u * (b.y - a.y) + v * (c.y - a.y),
    )
}

fn ellipse_point<R: Rng + ?Sized>(center: Point, rx: f32, ry: f32, rotation: f32, rng: &mut R) -> Point {
    let theta = random(rng, TAU);
    let r = rng.gen::<f32>().sqrt();
    let dx = r * rx * theta.cos();
    let dy = r * ry * theta.sin();

    Point::new(
        center.x + dx * rotation.cos() - dy * rotation.sin(),
        center.y + dx * rotation.sin() + dy * rotation.cos(),
    )
}

impl Patch {
    pub const ALL: [Patch; 7] = [
        Patch::Sand,
        Patch::Water,
        Patch::Surf,
        Patch::Board,
        Patch::SmallBoard,
        Patch::Waves,
        Patch::BlockyWaves,
    ];

    /// Corners of the water triangle: bottom left, bottom right, top right.
    pub fn water_triangle(size: &Size) -> (Point, Point, Point) {
        let (width, height) = (size.width as f32, size.height as f32);

        (
            Point::new(0.0, height),
            Point::new(width, height),
            Point::new(width, 0.0),
        )
    }

    pub fn place<R: Rng + ?Sized>(&self, size: &Size, rng: &mut R) -> Placement {
        let (width, height) = (size.width as f32, size.height as f32);

        match self {
            Patch::Sand => {
                let x = random(rng, width);
                let density = 1.0 - x / width;

                Placement::at(Point::new(x, random(rng, height) * density))
            }
            Patch::Water => {
                let (a, b, c) = Patch::water_triangle(size);

                Placement::at(triangle_point(a, b, c, rng))
            }
            Patch::Board => Placement::at(ellipse_point(
                Point::new(width / 1.9, height / 2.2),
                width / 10.0,
                height / 20.0,
                120f32.to_radians(),
                rng,
            )),
            Patch::SmallBoard => Placement::at(ellipse_point(
                Point::new(width / 2.02, height / 1.8),
                width / 40.0,
                height / 120.0,
                120f32.to_radians(),
                rng,
            )),
            Patch::Waves => {
                let t = rng.gen::<f32>();
                let base = Point::lerp(
                    Point::new(width / 2.0, height / 2.0),
                    Point::new(-width / 10.0, -height / 10.0),
                    t,
                );
                let offset = 1000.0 * t * ((1.0 - t) * TAU * 20.0).sin();

                Placement::at(Point::new(
                    base.x + 2.0 * offset,
                    base.y - 0.5 * width / height * offset,
                ))
            }
            Patch::BlockyWaves => {
                let t = rng.gen::<f32>();
                let base = Point::lerp(
                    Point::new(width / 2.0, height / 2.0),
                    Point::new(-width / 10.0, -height / 10.0),
                    t,
                );
                let phase = (1.0 - t) * TAU * 30.0;
                let step = if phase.sin() >= 0.0 {
                    -random(rng, 20.0)
                } else {
                    random(rng, 20.0)
                };
                let offset = random(rng, 50.0) + 200.0 * t * step * 0.3;

                Placement::at(Point::new(
                    base.x + 2.0 * offset,
                    base.y - 0.5 * width / height * offset,
                ))
            }
            Patch::Surf => {
                let t = rng.gen::<f32>();
                let base = Point::lerp(Point::new(0.0, height), Point::new(width, 0.0), t);
                let crest = ((1.0 - t) * TAU * 20.0).sin() >= 0.0;
                let step = if crest {
                    -random(rng, 0.5)
                } else {
                    random(rng, 2.0)
                };
                let offset = 30.0 * t * step * random(rng, 2.0) + random(rng, 10.0);

                Placement {
                    point: Point::new(
                        base.x - 2.0 * offset,
                        base.y - 0.5 * width / height * offset,
                    ),
                    crest,
                }
            }
        }
    }

    pub fn paint<R: Rng + ?Sized>(&self, placement: &Placement, rng: &mut R) -> Color {
        match self {
            Patch::Sand => Rgba([
                channel(rng, 135.0, 40.0),
                channel(rng, 206.0, 30.0),
                channel(rng, 235.0, 20.0),
                255,
            ]),
            Patch::Water => Rgba([
                255,
                channel(rng, 150.0, 20.0),
                channel(rng, 20.0, 30.0),
                255,
            ]),
            Patch::Board => either(rng, Rgba([255, 130, 255, 255]), Rgba([255, 255, 0, 255]), 0.3),
            Patch::SmallBoard => either(rng, Rgba([255, 200, 0, 255]), Rgba([250, 0, 0, 255]), 1.2),
            Patch::Waves => Rgba([255, 255, 255, channel(rng, 200.0, 55.0)]),
            Patch::BlockyWaves => either(rng, Rgba([255, 0, 255, 255]), Rgba([255, 0, 0, 255]), 1.0),
            Patch::Surf if placement.crest => Rgba([255, 180, 100, channel(rng, 100.0, 55.0)]),
            Patch::Surf => Rgba([255, 255, 255, 255]),
        }
    }
}

/// Colour schemes for the single-pattern policies of the dot-art renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Palette {
    Position,
    Gradient,
    Warm,
    Cool,
    Rainbow,
}

fn remap(value: f32, from_low: f32, from_high: f32, to_low: f32, to_high: f32) -> u8 {
    let ratio = (value - from_low) / (from_high - from_low);

    (to_low + ratio * (to_high - to_low)).clamp(0.0, 255.0) as u8
}

fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> (u8, u8, u8) {
    let chroma = value * saturation;
    let sector = (hue / 60.0) % 6.0;
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());

    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = value - chroma;
    let to_u8 = |c: f32| ((c + m) * 255.0).round().clamp(0.0, 255.0) as u8;

    (to_u8(r), to_u8(g), to_u8(b))
}

impl Palette {
    pub const ALL: [Palette; 5] = [
        Palette::Position,
        Palette::Gradient,
        Palette::Warm,
        Palette::Cool,
        Palette::Rainbow,
    ];

    pub fn next(&self) -> Self {
        let index = Palette::ALL.iter().position(|p| p == self).unwrap_or(0);

        Palette::ALL[(index + 1) % Palette::ALL.len()]
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Palette::ALL[rng.gen_range(0..Palette::ALL.len())]
    }

    pub fn paint<R: Rng + ?Sized>(&self, point: &Point, size: &Size, frame: u64, rng: &mut R) -> Color {
        let (width, height) = (size.width as f32, size.height as f32);

        match self {
            Palette::Position => Rgba([
                remap(point.x, 0.0, width, 50.0, 255.0),
                remap(point.y, 0.0, height, 50.0, 255.0),
                200,
                250,
            ]),
            Palette::Gradient => Rgba([
                remap(point.x, 0.0, width, 0.0, 255.0),
                remap(point.y, 0.0, height, 0.0, 255.0),
                remap(point.distance(&size.center()), 0.0, width / 2.0, 255.0, 0.0),
                250,
            ]),
            Palette::Warm => Rgba([
                channel(rng, 200.0, 55.0),
                channel(rng, 100.0, 50.0),
                channel(rng, 0.0, 50.0),
                250,
            ]),
            Palette::Cool => Rgba([
                channel(rng, 0.0, 50.0),
                channel(rng, 100.0, 50.0),
                channel(rng, 200.0, 55.0),
                250,
            ]),
            Palette::Rainbow => {
                let hue = (point.x + point.y + frame as f32) % 360.0;
                let (r, g, b) = hsv_to_rgb(hue, 1.0, 1.0);

                Rgba([r, g, b, 128])
            }
        }
    }
}

impl FromStr for Palette {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "position" => Ok(Palette::Position),
            "gradient" => Ok(Palette::Gradient),
            "warm" => Ok(Palette::Warm),
            "cool" => Ok(Palette::Cool),
            "rainbow" => Ok(Palette::Rainbow),
            _ => Err(format!("unknown palette: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub cols: usize,
    pub rows: usize,
    pub spacing_x: f32,
    pub spacing_y: f32,
}

impl GridLayout {
    pub fn new(total: usize, size: &Size) -> Self {
        let mut cols = (total as f64).sqrt().floor() as usize;

        // float sqrt can land one above for large non-squares
        while cols > 0 && cols * cols > total {
            cols -= 1;
        }

        let cols = cols.max(1);

        Self {
            cols,
            rows: cols,
            spacing_x: size.width as f32 / cols as f32,
            spacing_y: size.height as f32 / cols as f32,
        }
    }

    pub fn cell(&self, index: usize) -> (usize, usize) {
        (index % self.cols, index / self.cols)
    }

    pub fn center(&self, col: usize, row: usize) -> Point {
        Point::new(
            col as f32 * self.spacing_x + self.spacing_x / 2.0,
            row as f32 * self.spacing_y + self.spacing_y / 2.0,
        )
    }
}

pub struct PointGenerator {
    policy: Policy,
    palette: Option<Palette>,
    total: usize,
    size: Size,
    grid: GridLayout,
    patches: Vec<Patch>,
    weights: Option<WeightedIndex<u32>>,
    frame: u64,
    rng: XorShiftRng,
}

impl PointGenerator {
    pub fn new(policy: Policy, total: usize, size: Size, seed: u64) -> Self {
        let (patches, weights) = match &policy {
            Policy::Mixed { patches } if !patches.is_empty() => {
                let weights = match WeightedIndex::new(patches.iter().map(|p| p.weight)) {
                    Ok(index) => Some(index),
                    Err(e) => {
                        warn!("Ignoring patch weights ({}), picking patches uniformly", e);
                        None
                    }
                };

                (patches.iter().map(|p| p.patch).collect(), weights)
            }
            Policy::Mixed { .. } => {
                warn!("Mixed policy without patches, using every patch");
                (Patch::ALL.to_vec(), None)
            }
            _ => (Vec::new(), None),
        };

        debug!("Generator: {} points, policy {}", total, policy.name());

        Self {
            grid: GridLayout::new(total, &size),
            policy,
            palette: None,
            total,
            size,
            patches,
            weights,
            frame: 0,
            rng: XorShiftRng::seed_from_u64(seed),
        }
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = Some(palette);
        self
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn palette(&self) -> Option<Palette> {
        self.palette
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn grid(&self) -> &GridLayout {
        &self.grid
    }

    pub fn set_frame(&mut self, frame: u64) {
        self.frame = frame;
    }

    pub fn generate(&mut self, index: usize) -> Dot {
        let t = index as f32 / self.total.max(1) as f32;
        let size = self.size;
        let (width, height) = (size.width as f32, size.height as f32);
        let rng = &mut self.rng;

        let (point, patch_color) = match &self.policy {
            Policy::GridJitter => {
                let (col, row) = self.grid.cell(index);
                let center = self.grid.center(col, row);
                let jitter_x = (rng.gen::<f32>() * 2.0 - 1.0) * self.grid.spacing_x / 4.0;
                let jitter_y = (rng.gen::<f32>() * 2.0 - 1.0) * self.grid.spacing_y / 4.0;

                (Point::new(center.x + jitter_x, center.y + jitter_y), None)
            }
            Policy::Spiral { turns } => {
                let angle = t * turns;
                let radius = t * size.min_side() / 2.0;
                let center = size.center();

                (
                    Point::new(center.x + angle.cos() * radius, center.y + angle.sin() * radius),
                    None,
                )
            }
            Policy::Wave { amplitude, frequency } => (
                Point::new(t * width, height / 2.0 + (t * frequency).sin() * amplitude * height),
                None,
            ),
            Policy::Gradient => {
                let x = random(rng, width);
                let density = 1.0 - x / width;

                (Point::new(x, random(rng, height) * density), None)
            }
            Policy::Clusters { count, spread } => {
                let cluster = (t * *count as f32).floor();
                let center_x = cluster.sin() * width / 2.0 + width / 2.0;
                let center_y = cluster.cos() * height / 2.0 + height / 2.0;
                let dx: f32 = rng.sample(StandardNormal);
                let dy: f32 = rng.sample(StandardNormal);

                (Point::new(center_x + dx * spread, center_y + dy * spread), None)
            }
            Policy::Uniform => (Point::new(random(rng, width), random(rng, height)), None),
            Policy::Mixed { .. } => {
                let patch = match &self.weights {
                    Some(weights) => self.patches[weights.sample(rng)],
                    None => self.patches[rng.gen_range(0..self.patches.len())],
                };
                let placement = patch.place(&size, rng);

                (placement.point, Some(patch.paint(&placement, rng)))
            }
        };

        let point = point.clamp_to(&size);
        let color = match (patch_color, self.palette) {
            (Some(color), _) => color,
            (None, Some(palette)) => palette.paint(&point, &size, self.frame, rng),
            (None, None) => DOT_COLOR,
        };

        Dot { point, color }
    }
}
