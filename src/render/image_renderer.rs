use super::{Renderer, Surface, View};
use crate::error::{Error, Result};

use log::info;
use std::fs;
use std::path::PathBuf;

/// Image file renderer that saves one view of the final result to disk
pub struct ImageRenderer {
    output_path: PathBuf,
    view: View,
}

impl ImageRenderer {
    pub fn new(output_path: PathBuf, view: View) -> Self {
        Self { output_path, view }
    }

    pub fn output_path(&self) -> &PathBuf {
        &self.output_path
    }
}

impl Renderer for ImageRenderer {
    fn finalize(&mut self, surface: &dyn Surface) -> Result<()> {
        let image = surface
            .view(self.view)
            .ok_or_else(|| Error::Render(format!("no {:?} raster to save", self.view)))?;

        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        image.save(&self.output_path)?;

        info!("Saved {:?} to {}", self.view, self.output_path.display());
        Ok(())
    }
}
