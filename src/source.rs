use std::path::Path;

use image::io::Reader as ImageReader;
use image::RgbaImage;
use log::{info, warn};

use crate::error::Result;

/// Fetches a source raster by location.
pub trait SourceLoader {
    fn load(&mut self, location: &str) -> Result<RgbaImage>;
}

/// Reads and decodes local image files.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileLoader;

impl SourceLoader for FileLoader {
    fn load(&mut self, location: &str) -> Result<RgbaImage> {
        let image = ImageReader::open(Path::new(location))?
            .with_guessed_format()?
            .decode()?;

        Ok(image.to_rgba8())
    }
}

#[derive(Debug)]
pub enum SourceOutcome {
    Loaded {
        index: usize,
        location: String,
        image: RgbaImage,
    },
    Exhausted {
        attempts: usize,
    },
}

/// Ordered candidate list, tried round-robin with a bounded number of loads.
#[derive(Debug, Clone)]
pub struct SourceQueue {
    locations: Vec<String>,
    current: usize,
    max_attempts: usize,
}

impl SourceQueue {
    pub fn new<I, S>(locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let locations: Vec<String> = locations.into_iter().map(Into::into).collect();

        Self {
            max_attempts: locations.len(),
            locations,
            current: 0,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn current(&self) -> Option<&str> {
        self.locations.get(self.current).map(String::as_str)
    }

    pub fn position(&self) -> usize {
        self.current
    }

    /// Moves on to the next candidate, wrapping around.
    pub fn advance(&mut self) -> Option<&str> {
        if self.locations.is_empty() {
            return None;
        }

        self.current = (self.current + 1) % self.locations.len();
        self.current()
    }

    pub fn fetch<L>(&mut self, loader: &mut L) -> SourceOutcome
    where
        L: SourceLoader + ?Sized,
    {
        if self.locations.is_empty() {
            return SourceOutcome::Exhausted { attempts: 0 };
        }

        for attempt in 1..=self.max_attempts {
            let location = self.locations[self.current].clone();

            info!("Loading source {} ({}/{})", location, attempt, self.max_attempts);

            match loader.load(&location) {
                Ok(image) => {
                    return SourceOutcome::Loaded {
                        index: self.current,
                        location,
                        image,
                    }
                }
                Err(e) => {
                    warn!("Failed to load {}: {}", location, e);
                    self.advance();
                }
            }
        }

        SourceOutcome::Exhausted {
            attempts: self.max_attempts,
        }
    }
}
