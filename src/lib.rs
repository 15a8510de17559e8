//! # Keyframe-Strip
//!
//! Extract the key frames of a video and lay them out side by side in one image,
//! for a quick look at a file's scene and GOP structure.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use keyframe_strip::{Config, KeyframePipeline};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let mut config = Config::default();
//! config.source = "match_highlights.mp4".into();
//! config.output = "keyframes.png".into();
//!
//! let report = KeyframePipeline::new(config).run().await?;
//! println!("{} key frames, {}x{}", report.frame_count, report.width, report.height);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`frames`] - Scratch directory, ffmpeg extraction, loading and concatenation
//! - [`pipeline`] - Runs the steps in order and guarantees cleanup
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//!
//! ffmpeg must be installed and on `PATH` (or configured via
//! `extractor.ffmpeg_path`).

pub mod config;
pub mod error;
pub mod frames;
pub mod pipeline;

// Re-export commonly used types for convenience
pub use crate::{
    config::{Config, HeightPolicy},
    error::{KeyframeError, Result},
    frames::{KeyFrame, PipelineReport},
    pipeline::KeyframePipeline,
};
