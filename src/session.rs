use image::imageops::{self, FilterType};
use image::RgbaImage;
use log::{error, info, warn};

use crate::compositor::StencilCompositor;
use crate::error::Result;
use crate::generator::{Policy, PointGenerator};
use crate::geometry::Size;
use crate::mask::{MaskAccumulator, DEFAULT_DOT_SIZE};
use crate::render::{RenderCommand, Surface, View};
use crate::scheduler::{BatchScheduler, Progress, RunState, Tick, DEFAULT_CHUNK_SIZE};
use crate::source::{SourceLoader, SourceOutcome, SourceQueue};

pub const DEFAULT_TOTAL_DOTS: usize = 1_000_000;
pub const DEFAULT_CANVAS_SIZE: u32 = 3000;

/// Fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct StippleConfig {
    pub total_dots: usize,
    pub size: Size,
    pub dot_size: f32,
    pub chunk_size: usize,
    pub policy: Policy,
    pub seed: u64,
}

impl Default for StippleConfig {
    fn default() -> Self {
        Self {
            total_dots: DEFAULT_TOTAL_DOTS,
            size: Size::uniform(DEFAULT_CANVAS_SIZE),
            dot_size: DEFAULT_DOT_SIZE,
            chunk_size: DEFAULT_CHUNK_SIZE,
            policy: Policy::GridJitter,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    Unloaded,
    Loaded,
    /// Every candidate failed and there is nothing to show.
    Failed { attempts: usize },
}

/// One stipple run: mask generation, the source slot and their composite.
pub struct Session {
    config: StippleConfig,
    run: u64,
    generator: PointGenerator,
    scheduler: BatchScheduler,
    mask: MaskAccumulator,
    source: Option<RgbaImage>,
    source_state: SourceState,
    compositor: StencilCompositor,
}

impl Session {
    pub fn new(config: StippleConfig) -> Self {
        Self {
            generator: Self::generator(&config, 0),
            scheduler: BatchScheduler::new(config.total_dots, config.chunk_size),
            mask: MaskAccumulator::new(config.size, config.dot_size),
            source: None,
            source_state: SourceState::Unloaded,
            compositor: StencilCompositor::new(),
            run: 0,
            config,
        }
    }

    fn generator(config: &StippleConfig, run: u64) -> PointGenerator {
        PointGenerator::new(
            config.policy.clone(),
            config.total_dots,
            config.size,
            config.seed.wrapping_add(run),
        )
    }

    pub fn config(&self) -> &StippleConfig {
        &self.config
    }

    pub fn progress(&self) -> Progress {
        self.scheduler.progress()
    }

    pub fn state(&self) -> RunState {
        self.scheduler.state()
    }

    pub fn source_state(&self) -> SourceState {
        self.source_state
    }

    pub fn mask(&self) -> &MaskAccumulator {
        &self.mask
    }

    pub fn source(&self) -> Option<&RgbaImage> {
        self.source.as_ref()
    }

    pub fn composite(&self) -> Option<&RgbaImage> {
        self.compositor.composite()
    }

    pub fn compositor(&self) -> &StencilCompositor {
        &self.compositor
    }

    pub fn is_ready(&self) -> bool {
        self.compositor.composite().is_some()
    }

    /// Runs one generation chunk. Composes when this tick completes the mask
    /// and a source is already loaded.
    pub fn tick(&mut self) -> Result<Option<Tick>> {
        let tick = match self.scheduler.advance(&mut self.generator, &mut self.mask) {
            Some(tick) => tick,
            None => return Ok(None),
        };

        if tick.completed {
            self.mask.mark_ready();
            self.compose_if_ready()?;
        }

        Ok(Some(tick))
    }

    pub fn run_to_completion(&mut self) -> Result<Progress> {
        while self.tick()?.is_some() {}

        Ok(self.progress())
    }

    pub fn abort(&mut self) -> bool {
        self.scheduler.abort()
    }

    /// Starts a fresh run: back to idle with a cleared mask and a new seed.
    pub fn regenerate(&mut self) {
        self.run += 1;
        self.generator = Self::generator(&self.config, self.run);
        self.scheduler.reset();
        self.mask.reset();
        self.compositor.invalidate();

        info!("Regenerating mask (run {})", self.run);
    }

    /// Takes a load result. A failed load never discards a source that is
    /// already in place; only a session with nothing to show becomes `Failed`.
    pub fn on_source_loaded(&mut self, outcome: SourceOutcome) -> Result<()> {
        match outcome {
            SourceOutcome::Loaded { location, image, .. } => {
                info!("Source loaded: {}", location);

                self.compositor.invalidate();
                self.source = Some(fit_to_canvas(image, &self.config.size));
                self.source_state = SourceState::Loaded;
                self.compose_if_ready()
            }
            SourceOutcome::Exhausted { attempts } if self.source.is_some() => {
                warn!("No new source after {} attempts, keeping the current one", attempts);
                Ok(())
            }
            SourceOutcome::Exhausted { attempts } => {
                error!("No source could be loaded after {} attempts", attempts);

                self.source_state = SourceState::Failed { attempts };
                Ok(())
            }
        }
    }

    pub fn load_source<L>(&mut self, queue: &mut SourceQueue, loader: &mut L) -> Result<()>
    where
        L: SourceLoader + ?Sized,
    {
        let outcome = queue.fetch(loader);

        self.on_source_loaded(outcome)
    }

    /// Loads one location directly. On failure the candidate list is tried
    /// instead.
    pub fn load_location<L>(
        &mut self,
        location: &str,
        queue: &mut SourceQueue,
        loader: &mut L,
    ) -> Result<()>
    where
        L: SourceLoader + ?Sized,
    {
        match loader.load(location) {
            Ok(image) => self.on_source_loaded(SourceOutcome::Loaded {
                index: 0,
                location: location.to_string(),
                image,
            }),
            Err(e) => {
                warn!("Failed to load {}: {}", location, e);
                self.load_source(queue, loader)
            }
        }
    }

    /// Acts on a request raised by an interactive renderer.
    pub fn apply<L>(
        &mut self,
        command: RenderCommand,
        queue: &mut SourceQueue,
        loader: &mut L,
    ) -> Result<()>
    where
        L: SourceLoader + ?Sized,
    {
        match command {
            RenderCommand::NextSource => {
                if queue.advance().is_none() {
                    warn!("No other sources to switch to");
                    return Ok(());
                }

                self.load_source(queue, loader)
            }
            RenderCommand::LoadLocation(location) => self.load_location(&location, queue, loader),
            RenderCommand::Regenerate => {
                self.regenerate();
                Ok(())
            }
        }
    }

    fn compose_if_ready(&mut self) -> Result<()> {
        if !self.mask.is_ready() {
            return Ok(());
        }

        if let Some(source) = &self.source {
            self.compositor.refresh(source, self.mask.buffer())?;
        }

        Ok(())
    }
}

impl Surface for Session {
    fn size(&self) -> Size {
        self.config.size
    }

    fn view(&self, view: View) -> Option<&RgbaImage> {
        match view {
            View::Composite => self.composite(),
            View::Mask => Some(self.mask.buffer()),
            View::Source => self.source(),
        }
    }
}

fn fit_to_canvas(image: RgbaImage, size: &Size) -> RgbaImage {
    if image.dimensions() == (size.width, size.height) {
        image
    } else {
        imageops::resize(&image, size.width, size.height, FilterType::Triangle)
    }
}
