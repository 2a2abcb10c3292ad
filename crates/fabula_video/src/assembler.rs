//! Clip rendering and concatenation through ffmpeg.

use crate::{
    VideoConfig, clip_args, concat_args, concat_list, parse_duration, placeholder_args, probe_args,
};
use async_trait::async_trait;
use fabula_error::{FabulaResult, IoError, MediaError};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Longest stderr excerpt kept in a `MediaError`.
const STDERR_PREVIEW_CHARS: usize = 400;

/// One narrated still: an illustration and its (possibly missing) audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipSource {
    /// Illustration
    pub image: PathBuf,
    /// Narration, when synthesis succeeded
    pub audio: Option<PathBuf>,
}

/// What the pipeline needs from a video renderer.
///
/// [`VideoAssembler`] is the ffmpeg implementation.
#[async_trait]
pub trait VideoBackend: Send + Sync {
    /// Render `sources` in order into one video at `output`, using
    /// `work_dir` for intermediate clips.
    async fn assemble(
        &self,
        sources: &[ClipSource],
        work_dir: &Path,
        output: &Path,
    ) -> FabulaResult<PathBuf>;

    /// Write a blank frame to `path`.
    async fn placeholder_frame(&self, path: &Path) -> FabulaResult<()>;
}

/// Renders narrated stills into clips and joins them into a video.
#[derive(Debug, Clone, Default)]
pub struct VideoAssembler {
    config: VideoConfig,
}

impl VideoAssembler {
    /// Create an assembler.
    pub fn new(config: VideoConfig) -> Self {
        Self { config }
    }

    /// Rendering settings.
    pub fn config(&self) -> &VideoConfig {
        &self.config
    }

    async fn run(&self, tool: &str, args: &[String]) -> Result<String, MediaError> {
        debug!(tool, ?args, "Running media tool");
        let output = Command::new(tool)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| MediaError::new(tool, format!("could not start: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let skip = stderr.chars().count().saturating_sub(STDERR_PREVIEW_CHARS);
            let tail: String = stderr.chars().skip(skip).collect();
            return Err(MediaError::new(
                tool,
                format!("{}: {}", output.status, tail.trim()),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Duration of `media` in seconds.
    ///
    /// # Errors
    ///
    /// Returns a `MediaError` when ffprobe fails or prints no duration.
    pub async fn probe_duration(&self, media: &Path) -> Result<f64, MediaError> {
        let stdout = self.run(self.config.ffprobe(), &probe_args(media)).await?;
        parse_duration(&stdout).ok_or_else(|| {
            MediaError::new(
                self.config.ffprobe().as_str(),
                format!("no duration reported for {}", media.display()),
            )
        })
    }

    /// Clip length for `audio`: its duration plus the tail padding.
    ///
    /// Returns `None` (render a silent clip) when there is no audio or it
    /// cannot be probed.
    pub async fn narrated_duration(&self, audio: Option<&Path>) -> Option<f64> {
        let audio = audio?;
        match self.probe_duration(audio).await {
            Ok(seconds) => Some(seconds + self.config.tail_padding().as_secs_f64()),
            Err(e) => {
                warn!(audio = %audio.display(), error = %e, "Audio probe failed, using silent clip");
                None
            }
        }
    }

    /// Render one clip to `output`.
    ///
    /// # Errors
    ///
    /// Returns a `MediaError` when ffmpeg fails.
    #[instrument(skip(self, source), fields(image = %source.image.display()))]
    pub async fn render_clip(&self, source: &ClipSource, output: &Path) -> FabulaResult<PathBuf> {
        let (audio, duration) = match self.narrated_duration(source.audio.as_deref()).await {
            Some(duration) => (source.audio.as_deref(), duration),
            None => (None, *self.config.silent_clip_secs()),
        };

        let args = clip_args(&source.image, audio, duration, output, &self.config);
        self.run(self.config.ffmpeg(), &args).await?;
        debug!(duration, silent = audio.is_none(), "Rendered clip");
        Ok(output.to_path_buf())
    }

    /// Join `clips` in order into `output`.
    ///
    /// The concat list is written next to `output`.
    ///
    /// # Errors
    ///
    /// Returns a `MediaError` when there are no clips or ffmpeg fails, and an
    /// `IoError` when the list cannot be written.
    #[instrument(skip(self, clips), fields(clips = clips.len(), output = %output.display()))]
    pub async fn concat(&self, clips: &[PathBuf], output: &Path) -> FabulaResult<PathBuf> {
        if clips.is_empty() {
            return Err(MediaError::new(self.config.ffmpeg().as_str(), "no clips to join").into());
        }

        // The concat demuxer resolves relative entries against the list's
        // own directory, not the working directory.
        let clips = clips
            .iter()
            .map(|clip| std::path::absolute(clip).map_err(|e| IoError::new(clip, e.to_string())))
            .collect::<Result<Vec<_>, _>>()?;

        let list = output.with_extension("concat.txt");
        tokio::fs::write(&list, concat_list(&clips))
            .await
            .map_err(|e| IoError::new(&list, e.to_string()))?;

        self.run(self.config.ffmpeg(), &concat_args(&list, output))
            .await?;
        info!("Final video saved");
        Ok(output.to_path_buf())
    }

    /// Render every source into `work_dir` and join the clips into `output`.
    ///
    /// # Errors
    ///
    /// Fails on the first clip that cannot be rendered, or when joining fails.
    #[instrument(skip(self, sources), fields(sources = sources.len()))]
    pub async fn assemble(
        &self,
        sources: &[ClipSource],
        work_dir: &Path,
        output: &Path,
    ) -> FabulaResult<PathBuf> {
        tokio::fs::create_dir_all(work_dir)
            .await
            .map_err(|e| IoError::new(work_dir, e.to_string()))?;

        let mut clips = Vec::with_capacity(sources.len());
        for (index, source) in sources.iter().enumerate() {
            let clip = work_dir.join(format!("clip_{}.mp4", index));
            clips.push(self.render_clip(source, &clip).await?);
        }
        self.concat(&clips, output).await
    }

    /// Write a black frame to `path`, standing in for a failed illustration.
    ///
    /// # Errors
    ///
    /// Returns a `MediaError` when ffmpeg fails.
    pub async fn placeholder_frame(&self, path: &Path) -> FabulaResult<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| IoError::new(parent, e.to_string()))?;
        }
        self.run(self.config.ffmpeg(), &placeholder_args(path, &self.config))
            .await?;
        info!(path = %path.display(), "Wrote placeholder frame");
        Ok(())
    }
}

#[async_trait]
impl VideoBackend for VideoAssembler {
    async fn assemble(
        &self,
        sources: &[ClipSource],
        work_dir: &Path,
        output: &Path,
    ) -> FabulaResult<PathBuf> {
        VideoAssembler::assemble(self, sources, work_dir, output).await
    }

    async fn placeholder_frame(&self, path: &Path) -> FabulaResult<()> {
        VideoAssembler::placeholder_frame(self, path).await
    }
}
