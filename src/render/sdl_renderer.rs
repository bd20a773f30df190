use super::{RenderCommand, Renderer, Surface, View};
use crate::error::{Error, Result};
use crate::geometry::Size;

use log::info;
use std::collections::VecDeque;
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::{Color, PixelFormatEnum};
use sdl2::render::{BlendMode, Canvas, Texture, TextureCreator};
use sdl2::video::{FullscreenType, Window, WindowContext};
use sdl2::EventPump;

fn sdl_error<E: ToString>(e: E) -> Error {
    Error::Render(e.to_string())
}

/// SDL2 preview window. `D` shows the mask, `I` the source, `C` the composite,
/// `Space` switches to the next source and `R` regenerates the mask.
pub struct SdlRenderer {
    canvas: Canvas<Window>,
    events: EventPump,
    texture_creator: TextureCreator<WindowContext>,
    texture: Option<Texture>,
    view: View,
    render_every_step: bool,
    interactive: bool,
    commands: VecDeque<RenderCommand>,
    should_quit: bool,
    frame_counter: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct SdlConfig {
    pub window_size: Size,
    pub vsync: bool,
    pub fullscreen: bool,
    pub render_every_step: bool,
    pub interactive: bool,
}

impl SdlRenderer {
    pub fn new(config: &SdlConfig) -> Result<Self> {
        let context = sdl2::init().map_err(sdl_error)?;
        let video = context.video().map_err(sdl_error)?;

        let mut window = video
            .window(
                "Stipple Mask",
                config.window_size.width,
                config.window_size.height,
            )
            .position_centered()
            .build()
            .map_err(sdl_error)?;

        if config.fullscreen {
            window.set_fullscreen(FullscreenType::True).map_err(sdl_error)?;
        }

        if window.fullscreen_state() != FullscreenType::Off {
            context.mouse().show_cursor(false);
        }

        let mut builder = window.into_canvas().target_texture();

        if config.vsync {
            builder = builder.present_vsync();
        }

        let canvas = builder.build().map_err(sdl_error)?;
        let events = context.event_pump().map_err(sdl_error)?;
        let texture_creator = canvas.texture_creator();

        Ok(Self {
            canvas,
            events,
            texture_creator,
            texture: None,
            view: View::Composite,
            render_every_step: config.render_every_step,
            interactive: config.interactive,
            commands: VecDeque::new(),
            should_quit: false,
            frame_counter: 0,
        })
    }

    fn handle_events(&mut self) {
        for event in self.events.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => {
                    self.should_quit = true;
                }
                Event::KeyDown {
                    keycode: Some(Keycode::Space),
                    ..
                } => {
                    info!("Switching source");
                    self.commands.push_back(RenderCommand::NextSource);
                }
                Event::KeyDown {
                    keycode: Some(Keycode::R),
                    ..
                } => {
                    info!("Regenerating");
                    self.commands.push_back(RenderCommand::Regenerate);
                }
                Event::KeyDown {
                    keycode: Some(key), ..
                } => {
                    let view = match key {
                        Keycode::D => View::Mask,
                        Keycode::I => View::Source,
                        Keycode::C => View::Composite,
                        _ => continue,
                    };

                    info!("Showing {:?}", view);
                    self.view = view;
                }
                _ => {}
            }
        }
    }

    fn present(&mut self, surface: &dyn Surface) -> Result<()> {
        // the composite only exists once both inputs are in, show the mask until then
        let image = match surface.view(self.view).or_else(|| surface.view(View::Mask)) {
            Some(image) => image,
            None => return Ok(()),
        };
        let (width, height) = image.dimensions();

        let stale = match &self.texture {
            Some(texture) => {
                let query = texture.query();
                query.width != width || query.height != height
            }
            None => true,
        };

        if stale {
            let mut texture = self
                .texture_creator
                .create_texture_streaming(PixelFormatEnum::RGBA32, width, height)
                .map_err(sdl_error)?;

            texture.set_blend_mode(BlendMode::Blend);
            self.texture = Some(texture);
        }

        let texture = self
            .texture
            .as_mut()
            .ok_or_else(|| Error::Render("missing texture".to_string()))?;

        texture
            .update(None, image.as_raw(), width as usize * 4)
            .map_err(sdl_error)?;

        self.canvas.set_draw_color(Color::BLACK);
        self.canvas.clear();
        self.canvas.copy(texture, None, None).map_err(sdl_error)?;
        self.canvas.present();

        Ok(())
    }
}

impl Renderer for SdlRenderer {
    fn should_quit(&mut self) -> bool {
        self.should_quit
    }

    fn poll_command(&mut self) -> Option<RenderCommand> {
        self.commands.pop_front()
    }

    fn keep_alive(&self) -> bool {
        self.interactive
    }

    fn update(&mut self, surface: &dyn Surface) -> Result<()> {
        self.handle_events();

        if self.should_quit {
            return Ok(());
        }

        self.frame_counter += 1;

        // every 10th tick unless --slow
        if self.render_every_step || self.frame_counter % 10 == 0 {
            self.present(surface)?;
        }

        Ok(())
    }

    fn finalize(&mut self, surface: &dyn Surface) -> Result<()> {
        self.handle_events();
        self.present(surface)
    }
}
