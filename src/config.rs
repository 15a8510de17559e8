use std::path::{Path, PathBuf};

use image::ImageFormat;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Main configuration for a keyframe strip run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Video to extract key frames from
    pub source: PathBuf,

    /// Composite image to write; the format follows the extension
    pub output: PathBuf,

    /// Where extracted frames live while the run is in progress
    pub scratch: ScratchConfig,

    /// External decoder settings
    pub extractor: ExtractorConfig,

    /// Layout settings
    pub compose: ComposeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: PathBuf::from("input.mp4"),
            output: PathBuf::from("frames.png"),
            scratch: ScratchConfig::default(),
            extractor: ExtractorConfig::default(),
            compose: ComposeConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)
            .map_err(|e| crate::error::KeyframeError::filesystem(path, e))?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.source.as_os_str().is_empty() {
            return Err(invalid("source", ""));
        }

        if self.output.as_os_str().is_empty() {
            return Err(invalid("output", ""));
        }

        match ImageFormat::from_path(&self.output) {
            Ok(format) if is_supported_format(format) => {}
            _ => return Err(invalid("output", self.output.display())),
        }

        self.scratch.validate()?;
        self.extractor.validate()?;
        Ok(())
    }
}

/// Scratch directory placement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScratchConfig {
    /// Parent directory; the platform temp dir when unset
    pub root: Option<PathBuf>,

    /// Name prefix for the per-run directory
    pub prefix: String,
}

impl Default for ScratchConfig {
    fn default() -> Self {
        Self {
            root: None,
            prefix: "frame_extractor_".to_string(),
        }
    }
}

impl ScratchConfig {
    fn validate(&self) -> Result<()> {
        if let Some(root) = &self.root {
            if !root.is_dir() {
                return Err(invalid("scratch.root", root.display()));
            }
        }
        Ok(())
    }
}

/// External decoder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Program name or path of the ffmpeg binary
    pub ffmpeg_path: String,

    /// Image format extension for extracted frames
    pub frame_format: String,

    /// Kill the decoder after this many seconds
    pub timeout_secs: Option<u64>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            frame_format: "png".to_string(),
            timeout_secs: None,
        }
    }
}

impl ExtractorConfig {
    fn validate(&self) -> Result<()> {
        if self.ffmpeg_path.trim().is_empty() {
            return Err(invalid("extractor.ffmpeg_path", &self.ffmpeg_path));
        }

        match ImageFormat::from_extension(&self.frame_format) {
            Some(format) if is_supported_format(format) => {}
            _ => return Err(invalid("extractor.frame_format", &self.frame_format)),
        }

        if self.timeout_secs == Some(0) {
            return Err(invalid("extractor.timeout_secs", 0));
        }

        Ok(())
    }
}

/// How frames of differing heights are reconciled on the canvas
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeightPolicy {
    /// Every frame must match the first frame's height
    #[default]
    Reject,
    /// Canvas takes the tallest frame's height; shorter frames leave black below
    Pad,
    /// Canvas takes the shortest frame's height; taller frames lose their bottom rows
    Crop,
}

/// Composite layout configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    pub height_policy: HeightPolicy,
}

/// Formats compiled into the image crate for this build
pub(crate) fn is_supported_format(format: ImageFormat) -> bool {
    matches!(format, ImageFormat::Png | ImageFormat::Jpeg)
}

fn invalid(key: &str, value: impl std::fmt::Display) -> crate::error::KeyframeError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
    .into()
}
