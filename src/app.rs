use crate::art::DotArt;
use crate::cli::{AppCommand, AppConfig, ArtRun, MaskRun};
use crate::counter::SaveCounter;
use crate::error::{Error, Result};
use crate::render::image_renderer::ImageRenderer;
use crate::render::{RenderCommand, RenderEvent, Renderer, Surface, View};
use crate::scheduler::RunState;
use crate::session::{Session, SourceState};
use crate::source::{FileLoader, SourceQueue};

#[cfg(feature = "visual")]
use crate::render::sdl_renderer::{SdlConfig, SdlRenderer};

use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::fs;
use std::thread;
use std::time::Duration;

const IDLE_FRAME: Duration = Duration::from_millis(16);

pub struct StippleApp {
    config: AppConfig,
}

fn progress_bar(len: u64) -> ProgressBar {
    let progress = ProgressBar::new(len);

    progress.enable_steady_tick(Duration::from_millis(200));

    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>7}/{len} {per_sec:>12}",
    ) {
        progress.set_style(style.progress_chars("#>-"));
    }

    progress
}

fn poll_commands(renderers: &mut [Box<dyn Renderer>]) -> Vec<RenderCommand> {
    let mut commands = Vec::new();

    for renderer in renderers.iter_mut() {
        while let Some(command) = renderer.poll_command() {
            commands.push(command);
        }
    }

    commands
}

fn emit(renderers: &mut [Box<dyn Renderer>], event: RenderEvent) -> Result<()> {
    for renderer in renderers.iter_mut() {
        renderer.handle_event(&event)?;
    }

    Ok(())
}

impl StippleApp {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<()> {
        match &self.config.command {
            AppCommand::Mask(run) => self.run_mask(run),
            AppCommand::Art(run) => self.run_art(run),
        }
    }

    fn run_mask(&self, run: &MaskRun) -> Result<()> {
        info!("Using seed: {}", run.stipple.seed);

        let mut session = Session::new(run.stipple.clone());

        let mut renderers = self.create_renderers()?;
        let has_sources = !run.sources.is_empty() || run.custom.is_some();

        if has_sources {
            renderers.push(Box::new(ImageRenderer::new(run.output.clone(), View::Composite)));
        }

        if let Some(path) = &run.mask_output {
            renderers.push(Box::new(ImageRenderer::new(path.clone(), View::Mask)));
        }

        if renderers.is_empty() {
            warn!("No sources and no mask output given, nothing will be saved");
        }

        for renderer in &mut renderers {
            renderer.initialize(session.size())?;
        }

        let mut queue = SourceQueue::new(run.sources.iter().cloned());
        let mut loader = FileLoader;

        if let Some(max_attempts) = run.max_attempts {
            queue = queue.with_max_attempts(max_attempts);
        }

        if has_sources {
            match &run.custom {
                Some(location) => session.load_location(location, &mut queue, &mut loader)?,
                None => session.load_source(&mut queue, &mut loader)?,
            }

            if let SourceState::Failed { attempts } = session.source_state() {
                return Err(Error::NoSourceAvailable { attempts });
            }

            emit(&mut renderers, RenderEvent::SourceLoaded)?;
        }

        let mut progress = progress_bar(run.stipple.total_dots as u64);

        emit(&mut renderers, RenderEvent::Started)?;

        // Main generation loop
        loop {
            // Check if any renderer wants to quit
            if renderers.iter_mut().any(|r| r.should_quit()) {
                if session.state() == RunState::Complete {
                    break;
                }

                session.abort();
                progress.abandon();
                return Ok(());
            }

            for command in poll_commands(&mut renderers) {
                let regenerate = command == RenderCommand::Regenerate;

                session.apply(command, &mut queue, &mut loader)?;

                if regenerate {
                    progress.abandon();
                    progress = progress_bar(run.stipple.total_dots as u64);
                    emit(&mut renderers, RenderEvent::Started)?;
                } else {
                    emit(&mut renderers, RenderEvent::SourceLoaded)?;
                }
            }

            match session.tick()? {
                Some(tick) => {
                    progress.set_position(tick.progress.generated as u64);

                    emit(&mut renderers, RenderEvent::Progress(tick.progress))?;

                    for renderer in &mut renderers {
                        renderer.update(&session)?;
                    }

                    if tick.completed {
                        progress.finish();
                        emit(&mut renderers, RenderEvent::MaskComplete)?;
                    }
                }
                // interactive renderers keep the finished mask open for more commands
                None if renderers.iter().any(|r| r.keep_alive()) => {
                    for renderer in &mut renderers {
                        renderer.update(&session)?;
                    }

                    thread::sleep(IDLE_FRAME);
                }
                None => break,
            }
        }

        emit(&mut renderers, RenderEvent::Completed)?;

        self.hold();

        // Finalize all renderers
        for renderer in &mut renderers {
            renderer.finalize(&session)?;
        }

        info!("Generation completed");
        Ok(())
    }

    fn run_art(&self, run: &ArtRun) -> Result<()> {
        info!("Using seed: {}", run.art.seed);

        let mut art = DotArt::new(run.art.clone());
        let mut counter = SaveCounter::load(&run.counter)?;
        let mut renderers = self.create_renderers()?;

        for renderer in &mut renderers {
            renderer.initialize(art.size())?;
        }

        fs::create_dir_all(&run.output_dir)?;

        for piece in 0..run.pieces {
            info!(
                "Piece {}/{}: pattern {}, palette {:?}",
                piece + 1,
                run.pieces,
                art.policy().name(),
                art.palette()
            );

            let progress = progress_bar(run.art.total_dots as u64);

            emit(&mut renderers, RenderEvent::Started)?;

            while let Some(tick) = art.frame() {
                progress.set_position(tick.progress.generated as u64);

                if renderers.iter_mut().any(|r| r.should_quit()) {
                    progress.abandon();
                    return Ok(());
                }

                emit(&mut renderers, RenderEvent::Progress(tick.progress))?;

                for renderer in &mut renderers {
                    renderer.update(&art)?;
                }
            }

            progress.finish();

            emit(&mut renderers, RenderEvent::Completed)?;

            self.hold();

            for renderer in &mut renderers {
                renderer.finalize(&art)?;
            }

            let count = counter.increment()?;
            let path = run.output_dir.join(format!("{}.png", count));

            art.canvas().save(&path)?;
            info!("Saved {}", path.display());

            art.next_pattern();
        }

        Ok(())
    }

    fn hold(&self) {
        // Hold visualization if requested
        #[cfg(feature = "visual")]
        if let (true, Some(delay)) = (self.config.renderer.visual, self.config.renderer.hold) {
            info!("Waiting for {} seconds", delay);
            thread::sleep(Duration::from_secs_f32(delay));
        }
    }

    fn create_renderers(&self) -> Result<Vec<Box<dyn Renderer>>> {
        #[allow(unused_mut)]
        let mut renderers: Vec<Box<dyn Renderer>> = Vec::new();

        // Add SDL2 renderer if requested
        #[cfg(feature = "visual")]
        if self.config.renderer.visual {
            let sdl_config = SdlConfig {
                window_size: self.config.renderer.window_size,
                vsync: self.config.renderer.vsync,
                fullscreen: self.config.renderer.fullscreen,
                render_every_step: self.config.renderer.slow,
                interactive: self.config.renderer.interactive,
            };

            renderers.push(Box::new(SdlRenderer::new(&sdl_config)?));
        }

        Ok(renderers)
    }
}
