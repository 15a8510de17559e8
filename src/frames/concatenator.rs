use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::{imageops, ImageFormat, RgbImage};
use tracing::{debug, info};

use crate::config::{is_supported_format, HeightPolicy};
use crate::error::{KeyframeError, Result};
use crate::frames::types::KeyFrame;

/// Lays frames out left to right on a single canvas
pub struct FrameConcatenator {
    policy: HeightPolicy,
}

impl FrameConcatenator {
    pub fn new(policy: HeightPolicy) -> Self {
        Self { policy }
    }

    /// Canvas size for `frames` under the configured height policy
    pub fn canvas_size(&self, frames: &[KeyFrame]) -> Result<(u32, u32)> {
        let first = frames.first().ok_or(KeyframeError::EmptyInput)?;

        let width = frames
            .iter()
            .try_fold(0u32, |total, f| total.checked_add(f.width()))
            .ok_or(KeyframeError::CanvasTooWide {
                frame_count: frames.len(),
            })?;
        let height = match self.policy {
            HeightPolicy::Reject => {
                let expected = first.height();
                if let Some((index, frame)) = frames
                    .iter()
                    .enumerate()
                    .find(|(_, f)| f.height() != expected)
                {
                    return Err(KeyframeError::HeightMismatch {
                        index,
                        expected,
                        actual: frame.height(),
                    });
                }
                expected
            }
            HeightPolicy::Pad => frames.iter().map(|f| f.height()).max().unwrap_or(0),
            HeightPolicy::Crop => frames.iter().map(|f| f.height()).min().unwrap_or(0),
        };

        Ok((width, height))
    }

    /// Build the composite: frame `i` lands at x = sum of widths before it, y = 0
    pub fn concatenate(&self, frames: &[KeyFrame]) -> Result<RgbImage> {
        let (width, height) = self.canvas_size(frames)?;
        debug!("Concatenating {} frames onto a {}x{} canvas", frames.len(), width, height);

        let mut canvas = RgbImage::new(width, height);
        let mut x: i64 = 0;
        for frame in frames {
            // Anything below the canvas is clipped by `replace`
            imageops::replace(&mut canvas, &frame.image.to_rgb8(), x, 0);
            x += i64::from(frame.width());
        }

        Ok(canvas)
    }

    /// Save `canvas` to `output`, replacing any existing file in one step
    ///
    /// The image is encoded to a temporary sibling first, so a failed write
    /// never leaves a truncated file at `output`.
    pub fn write<P: AsRef<Path>>(canvas: &RgbImage, output: P) -> Result<()> {
        let output = output.as_ref();
        let encode_failure = |reason: String| KeyframeError::EncodeFailure {
            path: output.to_path_buf(),
            reason,
        };

        let format = ImageFormat::from_path(output).map_err(|e| encode_failure(e.to_string()))?;
        if !is_supported_format(format) {
            return Err(encode_failure(format!("{:?} output is not supported", format)));
        }

        let parent = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut builder = tempfile::Builder::new();
        builder.prefix(".keyframe-strip-");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // Same mode File::create would give, after the umask
            builder.permissions(std::fs::Permissions::from_mode(0o666));
        }
        let staged = builder
            .tempfile_in(parent)
            .map_err(|e| KeyframeError::filesystem(parent, e))?;

        // A replaced output keeps its mode
        if let Ok(existing) = std::fs::metadata(output) {
            staged
                .as_file()
                .set_permissions(existing.permissions())
                .map_err(|e| KeyframeError::filesystem(output, e))?;
        }

        {
            let file: &File = staged.as_file();
            let mut writer = BufWriter::new(file);
            canvas
                .write_to(&mut writer, format)
                .map_err(|e| encode_failure(e.to_string()))?;
            writer
                .into_inner()
                .map_err(|e| encode_failure(e.to_string()))?;
        }

        staged
            .persist(output)
            .map_err(|e| KeyframeError::filesystem(output, e.error))?;
        Ok(())
    }

    /// Concatenate `frames` and write the result to `output`
    ///
    /// Nothing is written when the frames cannot be laid out.
    pub fn compose<P: AsRef<Path>>(&self, frames: &[KeyFrame], output: P) -> Result<RgbImage> {
        let output = output.as_ref();
        let canvas = self.concatenate(frames)?;
        Self::write(&canvas, output)?;

        info!(
            "Wrote {}x{} composite of {} frames to {:?}",
            canvas.width(),
            canvas.height(),
            frames.len(),
            output
        );
        Ok(canvas)
    }
}
