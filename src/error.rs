use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while drawing text into the off-screen bitmap
#[derive(Debug, Error)]
pub enum RasterError {
    /// The bitmap could not be created (zero-sized or oversized canvas)
    #[error("rasterization context unavailable for {width}x{height} canvas")]
    ContextUnavailable { width: u32, height: u32 },

    /// The embedded font could not be loaded
    #[error("no usable font face for rasterization")]
    FontUnavailable,

    /// Writing the bitmap to disk failed
    #[error("failed to save bitmap: {0}")]
    Save(#[from] image::ImageError),
}

/// Errors from loading or saving configuration and presets
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Phase deadlines must be strictly increasing and non-zero
    #[error("invalid phase schedule: {0}")]
    InvalidSchedule(String),

    #[error("could not determine config directory")]
    NoConfigDir,
}

/// Errors from writing the GIF recording
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("GIF encoding error: {0}")]
    Encode(#[from] gif::EncodingError),

    #[error("recording frame size {width}x{height} exceeds GIF limits")]
    FrameTooLarge { width: usize, height: usize },
}
