use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{KeyframeError, Result};
use crate::frames::types::KeyFrame;

/// Parse the frame index out of a name like `12.png`
///
/// The stem is everything before the first `.`, so `3.tmp.png` is frame 3.
/// Stems that are empty or not an unsigned integer are rejected.
pub fn parse_frame_number(file_name: &str) -> Result<u64> {
    let stem = file_name.split('.').next().unwrap_or_default();

    // u64::from_str accepts a leading '+'
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return Err(KeyframeError::ParseFailure {
            file_name: file_name.to_string(),
        });
    }

    stem.parse().map_err(|_| KeyframeError::ParseFailure {
        file_name: file_name.to_string(),
    })
}

/// Loads every file of a frame directory as an ordered image sequence
pub struct SequenceLoader;

impl SequenceLoader {
    /// List `dir` and return its entries sorted by numeric stem
    ///
    /// Every entry counts as a frame; nothing is filtered out.
    pub fn list<P: AsRef<Path>>(dir: P) -> Result<Vec<(u64, PathBuf)>> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|e| KeyframeError::filesystem(dir, e))?;

        let mut frames = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| KeyframeError::filesystem(dir, e))?.path();

            let file_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| KeyframeError::ParseFailure {
                    file_name: path.display().to_string(),
                })?;

            let index = parse_frame_number(file_name)?;
            frames.push((index, path));
        }

        frames.sort_by_key(|(index, _)| *index);
        Ok(frames)
    }

    /// Decode every frame in `dir`, in numeric order
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Vec<KeyFrame>> {
        let dir = dir.as_ref();
        let listed = Self::list(dir)?;

        let mut frames = Vec::with_capacity(listed.len());
        for (index, path) in listed {
            let image = image::open(&path).map_err(|source| KeyframeError::DecodeFailure {
                path: path.clone(),
                source,
            })?;

            let frame = KeyFrame::new(index, path, image);
            debug!("Loaded frame {} ({}x{})", frame.index, frame.width(), frame.height());
            frames.push(frame);
        }

        info!("Loaded {} frames from {:?}", frames.len(), dir);
        Ok(frames)
    }
}
