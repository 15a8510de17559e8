use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the keyframe strip pipeline
#[derive(Error, Debug)]
pub enum KeyframeError {
    #[error("{tool} exited with {}: {stderr}", describe_exit(.code))]
    ExternalToolFailure {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{tool} did not finish within {seconds}s")]
    ExternalToolTimeout { tool: String, seconds: u64 },

    #[error("Malformed frame filename: {file_name:?} (expected <number>.<ext>)")]
    ParseFailure { file_name: String },

    #[error("Failed to decode frame image: {}", .path.display())]
    DecodeFailure {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Cannot concatenate an empty frame sequence")]
    EmptyInput,

    #[error("Frame {index} is {actual}px high, expected {expected}px")]
    HeightMismatch {
        index: usize,
        expected: u32,
        actual: u32,
    },

    #[error("Combined width of {frame_count} frames does not fit in an image")]
    CanvasTooWide { frame_count: usize },

    #[error("Failed to write output image {}: {reason}", .path.display())]
    EncodeFailure { path: PathBuf, reason: String },

    #[error("Filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Interrupted before the run completed")]
    Interrupted,
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using KeyframeError
pub type Result<T> = std::result::Result<T, KeyframeError>;

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status".to_string(),
    }
}

impl KeyframeError {
    pub(crate) fn filesystem<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Name of the pipeline step this error belongs to
    pub fn step(&self) -> &'static str {
        match self {
            Self::Config(_) => "configuration",
            Self::Filesystem { .. } => "filesystem",
            Self::ExternalToolFailure { .. } | Self::ExternalToolTimeout { .. } => "extraction",
            Self::ParseFailure { .. } | Self::DecodeFailure { .. } => "loading",
            Self::EmptyInput | Self::HeightMismatch { .. } | Self::CanvasTooWide { .. } => {
                "concatenation"
            }
            Self::EncodeFailure { .. } => "writing",
            Self::Interrupted => "interrupt",
        }
    }

    /// Check if running again could plausibly succeed. Nothing retries automatically.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Filesystem { .. } | Self::ExternalToolTimeout { .. } | Self::Interrupted
        )
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::ExternalToolFailure {
                tool, code: None, ..
            } => {
                format!("Could not run '{tool}'. Please check it is installed and on your PATH.")
            }
            Self::EmptyInput => {
                "The video produced no key frames, so there is nothing to concatenate.".to_string()
            }
            Self::ParseFailure { file_name } => {
                format!("Unexpected file '{file_name}' in the frame directory; only numbered frames are allowed.")
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{path}' not found.")
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_names() {
        assert_eq!(KeyframeError::EmptyInput.step(), "concatenation");
        assert_eq!(
            KeyframeError::ParseFailure {
                file_name: "frame.png".to_string()
            }
            .step(),
            "loading"
        );
        assert_eq!(
            KeyframeError::ExternalToolFailure {
                tool: "ffmpeg".to_string(),
                code: Some(1),
                stderr: String::new(),
            }
            .step(),
            "extraction"
        );
    }

    #[test]
    fn test_exit_code_in_message() {
        let err = KeyframeError::ExternalToolFailure {
            tool: "ffmpeg".to_string(),
            code: Some(1),
            stderr: "No such file or directory".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "ffmpeg exited with status 1: No such file or directory"
        );
    }

    #[test]
    fn test_missing_tool_message() {
        let err = KeyframeError::ExternalToolFailure {
            tool: "ffmpeg".to_string(),
            code: None,
            stderr: "not found".to_string(),
        };
        assert!(err.user_message().contains("PATH"));
        assert!(!err.is_recoverable());
    }
}
