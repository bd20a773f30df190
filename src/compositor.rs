use image::RgbaImage;
use log::info;

use crate::error::{Error, Result};

/// Destination-in: keeps the source colour, gated by the mask's alpha.
pub fn compose(source: &RgbaImage, mask: &RgbaImage) -> Result<RgbaImage> {
    if source.dimensions() != mask.dimensions() {
        return Err(Error::SizeMismatch {
            source_size: source.dimensions(),
            mask_size: mask.dimensions(),
        });
    }

    let mut composite = source.clone();

    for (pixel, gate) in composite.pixels_mut().zip(mask.pixels()) {
        pixel[3] = pixel[3].min(gate[3]);
    }

    Ok(composite)
}

#[derive(Default)]
pub struct StencilCompositor {
    composite: Option<RgbaImage>,
    compositions: usize,
}

impl StencilCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refresh(&mut self, source: &RgbaImage, mask: &RgbaImage) -> Result<&RgbaImage> {
        let composite = compose(source, mask)?;

        self.compositions += 1;
        info!("Composite ready ({}x{})", composite.width(), composite.height());

        Ok(self.composite.insert(composite))
    }

    pub fn invalidate(&mut self) {
        self.composite = None;
    }

    pub fn composite(&self) -> Option<&RgbaImage> {
        self.composite.as_ref()
    }

    /// How many composites have been computed so far.
    pub fn compositions(&self) -> usize {
        self.compositions
    }
}
