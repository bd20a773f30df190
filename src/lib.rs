pub mod art;
pub mod compositor;
pub mod counter;
pub mod error;
pub mod generator;
pub mod geometry;
pub mod mask;
pub mod render;
pub mod scheduler;
pub mod session;
pub mod source;

#[cfg(feature = "cli")]
pub mod app;
#[cfg(feature = "cli")]
pub mod cli;

pub use error::{Error, Result};
