//! # Frame Handling Module
//!
//! Everything between the source video and the composite image: the scratch
//! directory the frames live in, the ffmpeg extraction, loading the numbered
//! images back in order, and pasting them side by side.

pub mod types;

mod concatenator;
mod extractor;
mod loader;
mod scratch;

pub use concatenator::FrameConcatenator;
pub use extractor::FrameExtractor;
pub use loader::{parse_frame_number, SequenceLoader};
pub use scratch::ScratchDir;
pub use types::{KeyFrame, PipelineReport};
