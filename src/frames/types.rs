use std::path::PathBuf;

use image::{DynamicImage, GenericImageView};

/// One decoded key frame together with where it came from
#[derive(Clone, Debug)]
pub struct KeyFrame {
    /// Position in the sequence, taken from the filename stem
    pub index: u64,

    /// File the frame was decoded from
    pub path: PathBuf,

    pub image: DynamicImage,
}

impl KeyFrame {
    pub fn new<P: Into<PathBuf>>(index: u64, path: P, image: DynamicImage) -> Self {
        Self {
            index,
            path: path.into(),
            image,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// Number of key frames in the composite
    pub frame_count: usize,

    /// Composite width in pixels
    pub width: u32,

    /// Composite height in pixels
    pub height: u32,

    /// Where the composite was written
    pub output: PathBuf,
}
