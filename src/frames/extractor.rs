use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::ExtractorConfig;
use crate::error::{KeyframeError, Result};

/// Keep only intra-coded pictures
const KEYFRAME_FILTER: &str = r"select=eq(pict_type\,I)";

/// Runs ffmpeg to dump every key frame of a video as a numbered image
pub struct FrameExtractor {
    config: ExtractorConfig,
}

impl FrameExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Check whether the configured ffmpeg binary can be started
    pub async fn is_available(&self) -> bool {
        Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Output pattern handed to ffmpeg, e.g. `/tmp/frame_extractor_x/%d.png`
    pub fn frame_pattern(&self, out_dir: &Path) -> PathBuf {
        out_dir.join(format!("%d.{}", self.config.frame_format))
    }

    /// Full argument list for one extraction
    ///
    /// Paths are passed through untouched, so non-UTF-8 names reach ffmpeg intact.
    pub fn command_args(&self, source: &Path, out_dir: &Path) -> Vec<OsString> {
        vec![
            OsString::from("-hide_banner"),
            OsString::from("-loglevel"),
            OsString::from("error"),
            OsString::from("-i"),
            source.as_os_str().to_owned(),
            OsString::from("-vf"),
            OsString::from(KEYFRAME_FILTER),
            // Variable frame rate: emit only the selected frames, no duplicates
            OsString::from("-vsync"),
            OsString::from("vfr"),
            self.frame_pattern(out_dir).into_os_string(),
        ]
    }

    /// Write `1.<ext>`, `2.<ext>`, ... into `out_dir`, one per key frame
    ///
    /// The directory must already exist. Nothing is cleaned up on failure.
    pub async fn extract(&self, source: &Path, out_dir: &Path) -> Result<()> {
        let tool = self.config.ffmpeg_path.clone();
        let args = self.command_args(source, out_dir);

        info!("Extracting key frames from {:?}", source);
        debug!("Running: {} {:?}", tool, args);

        let mut cmd = Command::new(&tool);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let run = cmd.output();
        let output = match self.config.timeout_secs {
            Some(seconds) => tokio::time::timeout(Duration::from_secs(seconds), run)
                .await
                .map_err(|_| {
                    warn!("{} exceeded {}s, killing it", tool, seconds);
                    KeyframeError::ExternalToolTimeout {
                        tool: tool.clone(),
                        seconds,
                    }
                })?,
            None => run.await,
        };

        let output = output.map_err(|e| KeyframeError::ExternalToolFailure {
            tool: tool.clone(),
            code: None,
            stderr: e.to_string(),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(KeyframeError::ExternalToolFailure {
                tool,
                code: output.status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        debug!("{} finished extracting into {:?}", tool, out_dir);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn extractor_with(tool: &str) -> FrameExtractor {
        FrameExtractor::new(ExtractorConfig {
            ffmpeg_path: tool.to_string(),
            ..ExtractorConfig::default()
        })
    }

    #[test]
    fn test_command_args() {
        let extractor = FrameExtractor::new(ExtractorConfig::default());
        let args = extractor.command_args(Path::new("in.mp4"), Path::new("/tmp/frames"));

        assert_eq!(
            args,
            vec![
                "-hide_banner",
                "-loglevel",
                "error",
                "-i",
                "in.mp4",
                "-vf",
                r"select=eq(pict_type\,I)",
                "-vsync",
                "vfr",
                "/tmp/frames/%d.png",
            ]
        );
    }

    #[test]
    fn test_frame_pattern_follows_format() {
        let extractor = FrameExtractor::new(ExtractorConfig {
            frame_format: "jpg".to_string(),
            ..ExtractorConfig::default()
        });
        assert_eq!(
            extractor.frame_pattern(Path::new("/tmp/frames")),
            PathBuf::from("/tmp/frames/%d.jpg")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_paths_pass_through() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let source = Path::new(OsStr::from_bytes(b"/videos/clip\xff.mp4"));
        let out_dir = Path::new(OsStr::from_bytes(b"/tmp/scratch\xfe"));
        let extractor = FrameExtractor::new(ExtractorConfig::default());
        let args = extractor.command_args(source, out_dir);

        assert_eq!(args[4].as_os_str(), source.as_os_str());
        assert_eq!(
            args[9].as_bytes(),
            b"/tmp/scratch\xfe/%d.png".as_slice()
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_reported() {
        let dir = tempdir().unwrap();
        let result = extractor_with("false")
            .extract(Path::new("missing.mp4"), dir.path())
            .await;

        match result {
            Err(KeyframeError::ExternalToolFailure { tool, code, .. }) => {
                assert_eq!(tool, "false");
                assert_eq!(code, Some(1));
            }
            other => panic!("Expected ExternalToolFailure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_tool_is_reported() {
        let dir = tempdir().unwrap();
        let extractor = extractor_with("definitely-not-a-real-ffmpeg");

        assert!(!extractor.is_available().await);

        let result = extractor.extract(Path::new("in.mp4"), dir.path()).await;
        assert!(matches!(
            result,
            Err(KeyframeError::ExternalToolFailure { code: None, .. })
        ));
    }
}
