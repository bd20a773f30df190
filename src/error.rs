use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("raster size mismatch: source is {source_size:?}, mask is {mask_size:?}")]
    SizeMismatch {
        source_size: (u32, u32),
        mask_size: (u32, u32),
    },

    #[error("no source available after {attempts} attempts")]
    NoSourceAvailable { attempts: usize },

    #[error("render error: {0}")]
    Render(String),
}
