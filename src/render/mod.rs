pub mod events;
pub mod image_renderer;

#[cfg(feature = "visual")]
pub mod sdl_renderer;

use image::RgbaImage;

use crate::error::Result;
use crate::geometry::Size;

pub use events::{RenderCommand, RenderEvent};

/// Which raster a presentation surface pulls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Composite,
    Mask,
    Source,
}

/// Anything that can hand out displayable rasters.
pub trait Surface {
    fn size(&self) -> Size;

    fn view(&self, view: View) -> Option<&RgbaImage>;
}

/// Core trait for presenting generation progress
pub trait Renderer {
    /// Initialize the renderer for a canvas of the given size
    fn initialize(&mut self, size: Size) -> Result<()> {
        let _ = size;
        Ok(())
    }

    /// Handle a render event during generation
    fn handle_event(&mut self, event: &RenderEvent) -> Result<()> {
        let _ = event;
        Ok(())
    }

    /// Pull the current state (for visual renderers)
    fn update(&mut self, surface: &dyn Surface) -> Result<()> {
        let _ = surface;
        Ok(())
    }

    /// Check if the user wants to quit (for interactive renderers)
    fn should_quit(&mut self) -> bool {
        false
    }

    /// Next pending user request, if any
    fn poll_command(&mut self) -> Option<RenderCommand> {
        None
    }

    /// Whether the run should stay open after the mask completes
    fn keep_alive(&self) -> bool {
        false
    }

    /// Finalize rendering with final state (e.g., save to file, display final result)
    fn finalize(&mut self, surface: &dyn Surface) -> Result<()>;
}
