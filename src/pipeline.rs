use std::future::Future;
use std::path::Path;

use image::RgbImage;
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    error::{KeyframeError, Result},
    frames::{FrameConcatenator, FrameExtractor, PipelineReport, ScratchDir, SequenceLoader},
};

/// Runs one extraction from source video to composite image
///
/// The pipeline is strictly sequential:
/// 1. Scratch - create a run-scoped directory
/// 2. Extraction - ffmpeg writes one numbered image per key frame
/// 3. Loading - read the images back in numeric order
/// 4. Concatenation - paste them left to right
/// 5. Output - remove the scratch directory, then write the composite
///
/// The scratch directory is removed on every exit path.
pub struct KeyframePipeline {
    config: Config,
}

impl KeyframePipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the pipeline, aborting cleanly on Ctrl-C
    pub async fn run(&self) -> Result<PipelineReport> {
        self.run_until(async {
            // Without a signal handler only the steps can end the run
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run the pipeline, aborting with `Interrupted` once `shutdown` completes
    pub async fn run_until<F>(&self, shutdown: F) -> Result<PipelineReport>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            result = self.run_steps() => result,
            () = shutdown => {
                // Dropping the steps future kills ffmpeg and removes the scratch dir
                warn!("Interrupted, cleaning up");
                Err(KeyframeError::Interrupted)
            }
        }
    }

    /// Run the pipeline without watching for Ctrl-C
    pub async fn run_steps(&self) -> Result<PipelineReport> {
        self.config.validate()?;

        let source = &self.config.source;
        let output = &self.config.output;

        info!("Starting keyframe strip");
        info!("   Source: {:?}", source);
        info!("   Output: {:?}", output);

        let scratch = ScratchDir::acquire(&self.config.scratch)?;
        debug!("Frames go to {:?}", scratch.path());

        // Step 2: Extraction
        let extractor = FrameExtractor::new(self.config.extractor.clone());
        if !extractor.is_available().await {
            warn!(
                "'{}' did not answer -version; extraction will likely fail",
                self.config.extractor.ffmpeg_path
            );
        }
        extractor.extract(source, scratch.path()).await?;

        // Step 3: Loading
        let frames = SequenceLoader::load(scratch.path())?;

        // Step 4: Concatenation
        let concatenator = FrameConcatenator::new(self.config.compose.height_policy);
        let canvas = concatenator.concatenate(&frames)?;
        let frame_count = frames.len();
        drop(frames);

        finish(scratch, &canvas, output)?;

        let report = PipelineReport {
            frame_count,
            width: canvas.width(),
            height: canvas.height(),
            output: output.clone(),
        };
        info!(
            "Done: {} key frames, {}x{} composite",
            report.frame_count, report.width, report.height
        );
        Ok(report)
    }
}

/// Remove the scratch directory, then write the composite
///
/// The output is only touched once nothing else can fail.
fn finish(scratch: ScratchDir, canvas: &RgbImage, output: &Path) -> Result<()> {
    scratch.close()?;
    FrameConcatenator::write(canvas, output)?;
    info!("Wrote {}x{} composite to {:?}", canvas.width(), canvas.height(), output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScratchConfig;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[cfg(unix)]
    #[tokio::test]
    async fn test_extraction_failure_cleans_up() {
        let workspace = tempdir().unwrap();
        let scratch_root = workspace.path().join("scratch");
        std::fs::create_dir(&scratch_root).unwrap();
        let output = workspace.path().join("frames.png");

        let mut config = Config::default();
        config.source = workspace.path().join("missing.mp4");
        config.output = output.clone();
        config.scratch = ScratchConfig {
            root: Some(scratch_root.clone()),
            ..ScratchConfig::default()
        };
        config.extractor.ffmpeg_path = "false".to_string();

        let result = KeyframePipeline::new(config).run_steps().await;

        match result {
            Err(err @ KeyframeError::ExternalToolFailure { code: Some(1), .. }) => {
                assert_eq!(err.step(), "extraction");
            }
            other => panic!("Expected ExternalToolFailure, got {:?}", other),
        }
        assert_eq!(std::fs::read_dir(&scratch_root).unwrap().count(), 0);
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_invalid_config_stops_before_scratch() {
        let workspace = tempdir().unwrap();

        let mut config = Config::default();
        config.output = PathBuf::from("frames.unknown");
        config.scratch.root = Some(workspace.path().to_path_buf());

        let result = KeyframePipeline::new(config).run_steps().await;
        assert!(matches!(result, Err(KeyframeError::Config(_))));
        assert_eq!(std::fs::read_dir(workspace.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_cleanup_failure_leaves_output_untouched() {
        let workspace = tempdir().unwrap();
        let output = workspace.path().join("frames.png");
        std::fs::write(&output, b"previous run").unwrap();

        let scratch = ScratchDir::acquire(&ScratchConfig {
            root: Some(workspace.path().to_path_buf()),
            ..ScratchConfig::default()
        })
        .unwrap();
        // Removing it behind the guard's back makes close() fail
        std::fs::remove_dir_all(scratch.path()).unwrap();

        let result = finish(scratch, &RgbImage::new(4, 2), &output);

        assert!(matches!(result, Err(KeyframeError::Filesystem { .. })));
        assert_eq!(std::fs::read(&output).unwrap(), b"previous run");
    }

    #[tokio::test]
    async fn test_shutdown_before_start_is_interrupted() {
        let workspace = tempdir().unwrap();

        let mut config = Config::default();
        config.scratch.root = Some(workspace.path().to_path_buf());
        config.output = workspace.path().join("frames.png");

        let result = KeyframePipeline::new(config).run_until(async {}).await;

        assert!(matches!(result, Err(KeyframeError::Interrupted)));
        assert_eq!(std::fs::read_dir(workspace.path()).unwrap().count(), 0);
    }
}
