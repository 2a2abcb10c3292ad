//! The production run: script, narration, illustration, assembly, upload.

use crate::{Credentials, FabulaConfig, OutputLayout, setup_folders};
use fabula_cache::LanguageProfileCache;
use fabula_core::VideoMetadata;
use fabula_error::{
    FabulaErrorKind, FabulaResult, IoError, JsonError, PipelineError, PipelineErrorKind,
};
use fabula_models::{
    AudioSynthesizer, ChatClient, ImageSynthesizer, MetadataGenerator, RemoteProfileResolver,
    ScriptGenerator, build_image_prompt, story_seed,
};
use fabula_retry::{CallExecutor, ReqwestTransport, Transport};
use fabula_upload::{UploadReceipt, YouTubeUploader};
use fabula_video::{ClipSource, VideoAssembler, VideoBackend};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Language profile cache used by a pipeline.
pub type ProfileCache<T> = LanguageProfileCache<RemoteProfileResolver<T>>;

/// What one run produced and what it had to skip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Output folders of the run
    pub layout: OutputLayout,
    /// Segments in the script (scenes, lesson, blessing)
    pub segments: usize,
    /// Seed shared by every illustration
    pub seed: u64,
    /// `(language, segment)` pairs narrated as silence
    pub silent_segments: Vec<(String, usize)>,
    /// Segments illustrated with a placeholder frame
    pub placeholder_images: Vec<usize>,
    /// Finished video per language
    pub videos: BTreeMap<String, PathBuf>,
    /// Languages whose video could not be assembled
    pub video_failures: BTreeMap<String, String>,
    /// Languages whose metadata could not be generated
    pub metadata_failures: BTreeMap<String, String>,
    /// Published videos per language
    pub uploads: BTreeMap<String, UploadReceipt>,
    /// Languages whose upload failed
    pub upload_failures: BTreeMap<String, String>,
}

impl RunReport {
    fn new(layout: OutputLayout, segments: usize, seed: u64) -> Self {
        Self {
            layout,
            segments,
            seed,
            silent_segments: Vec::new(),
            placeholder_images: Vec::new(),
            videos: BTreeMap::new(),
            video_failures: BTreeMap::new(),
            metadata_failures: BTreeMap::new(),
            uploads: BTreeMap::new(),
            upload_failures: BTreeMap::new(),
        }
    }

    /// True when nothing was degraded or skipped.
    pub fn is_clean(&self) -> bool {
        self.silent_segments.is_empty()
            && self.placeholder_images.is_empty()
            && self.video_failures.is_empty()
            && self.metadata_failures.is_empty()
            && self.upload_failures.is_empty()
    }
}

/// Drives every collaborator for one topic.
///
/// All remote calls share one retry policy. The language profile cache
/// lives as long as the pipeline, so consecutive runs reuse profiles.
pub struct Pipeline<T = ReqwestTransport, V = VideoAssembler> {
    scripts: ScriptGenerator<T>,
    metadata: MetadataGenerator<RemoteProfileResolver<T>, T>,
    audio: AudioSynthesizer<T>,
    images: ImageSynthesizer<T>,
    uploader: YouTubeUploader<T>,
    video: V,
    output_root: PathBuf,
}

impl<T, V> std::fmt::Debug for Pipeline<T, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("output_root", &self.output_root)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Production pipeline over HTTP and ffmpeg.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for invalid settings, or an `HttpError` when
    /// an HTTP client cannot be built.
    pub fn from_config(config: &FabulaConfig, credentials: &Credentials) -> FabulaResult<Self> {
        config.validate()?;
        let executor = CallExecutor::from_config(config.retry())?;
        // Resumable sessions answer 308 to every intermediate chunk.
        let upload_executor = CallExecutor::with_transport(
            ReqwestTransport::without_redirects()?,
            config.retry().clone(),
        );
        Self::with_parts(
            executor,
            upload_executor,
            VideoAssembler::new(config.video().clone()),
            config,
            credentials,
        )
    }
}

impl<T: Transport, V: VideoBackend> Pipeline<T, V> {
    /// Pipeline over explicit executors and video backend.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for an invalid upload chunk size.
    pub fn with_parts(
        executor: CallExecutor<T>,
        upload_executor: CallExecutor<T>,
        video: V,
        config: &FabulaConfig,
        credentials: &Credentials,
    ) -> FabulaResult<Self> {
        let key = credentials.generation_key();
        let chat = ChatClient::new(executor.clone(), key, config.chat().clone());
        let profiles = Arc::new(LanguageProfileCache::new(RemoteProfileResolver::new(
            chat.clone(),
        )));

        let mut audio = AudioSynthesizer::new(chat.clone(), key, config.speech().clone());
        if let Some(voice_key) = credentials.voice_engine_key() {
            audio = audio.with_secondary_key(voice_key);
        }

        Ok(Self {
            scripts: ScriptGenerator::new(chat.clone()),
            metadata: MetadataGenerator::new(chat, profiles),
            audio,
            images: ImageSynthesizer::new(executor, key, config.image().clone()),
            uploader: YouTubeUploader::new(upload_executor, config.upload().clone())?,
            video,
            output_root: config.pipeline().output_root().clone(),
        })
    }

    /// Language profiles shared by every run of this pipeline.
    pub fn profiles(&self) -> &Arc<ProfileCache<T>> {
        self.metadata.profiles()
    }

    /// Produce one video per language for `topic`, publishing them when
    /// `upload` is set.
    ///
    /// Failed narrations become silent clips and failed illustrations become
    /// black frames. A language whose video, metadata or upload fails is
    /// recorded in the report and the run moves on to the next language.
    ///
    /// # Errors
    ///
    /// Aborts before any audio or image work when the topic or language list
    /// is empty, the folders cannot be created, or the script cannot be
    /// generated. Later, aborts only when an artifact cannot be written to
    /// disk.
    #[instrument(skip(self), fields(output_root = %self.output_root.display()))]
    pub async fn run(
        &self,
        topic: &str,
        languages: &[String],
        upload: bool,
    ) -> FabulaResult<RunReport> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(PipelineError::new(PipelineErrorKind::EmptyTopic).into());
        }
        if languages.is_empty() {
            return Err(PipelineError::new(PipelineErrorKind::NoLanguages).into());
        }

        let layout = setup_folders(&self.output_root, topic, languages)?;

        let script = self.scripts.generate(topic, languages).await.map_err(|e| {
            if matches!(e.kind(), FabulaErrorKind::Pipeline(_)) {
                e
            } else {
                PipelineError::new(PipelineErrorKind::ScriptUnavailable(e.to_string())).into()
            }
        })?;

        let segments = script.segments();
        let seed = story_seed();
        info!(segments = segments.len(), seed, "Starting production");
        let mut report = RunReport::new(layout.clone(), segments.len(), seed);

        let mut narrations: BTreeMap<&str, Vec<Option<PathBuf>>> = BTreeMap::new();
        for language in languages {
            let mut paths = Vec::with_capacity(segments.len());
            for (index, segment) in segments.iter().enumerate() {
                let path = layout.audio_path(language, index);
                match self
                    .audio
                    .synthesize(segment.narration_for(language), &path, language)
                    .await
                {
                    Ok(_) => paths.push(Some(path)),
                    Err(e) if e.kind.is_recoverable() => {
                        warn!(language = %language, segment = index, error = %e, "Narration failed, clip will be silent");
                        report.silent_segments.push((language.clone(), index));
                        paths.push(None);
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            narrations.insert(language.as_str(), paths);
        }

        let anchor = script.anchor();
        for (index, segment) in segments.iter().enumerate() {
            let path = layout.image_path(index);
            let prompt = build_image_prompt(segment.visual(), anchor);
            match self.images.synthesize(&prompt, &path, seed).await {
                Ok(_) => {}
                Err(e) if e.kind.is_recoverable() => {
                    warn!(segment = index, error = %e, "Illustration failed, using placeholder");
                    self.video.placeholder_frame(&path).await?;
                    report.placeholder_images.push(index);
                }
                Err(e) => return Err(e.into()),
            }
        }

        for language in languages {
            let sources: Vec<ClipSource> = narrations
                .get(language.as_str())
                .into_iter()
                .flatten()
                .enumerate()
                .map(|(index, audio)| ClipSource {
                    image: layout.image_path(index),
                    audio: audio.clone(),
                })
                .collect();

            let video = match self
                .video
                .assemble(&sources, &layout.clips_dir(language), &layout.final_video(language))
                .await
            {
                Ok(video) => video,
                Err(e) => {
                    error!(language = %language, error = %e, "Video assembly failed");
                    report.video_failures.insert(language.clone(), e.to_string());
                    continue;
                }
            };
            report.videos.insert(language.clone(), video.clone());

            let metadata = match self.metadata.generate(topic, &script, language).await {
                Ok(metadata) => metadata,
                Err(e) => {
                    error!(language = %language, error = %e, "Metadata generation failed");
                    report.metadata_failures.insert(language.clone(), e.to_string());
                    continue;
                }
            };
            info!(language = %language, title = %metadata.title, "Video metadata ready");
            write_metadata(&layout.metadata_debug(language), &metadata).await?;

            if upload {
                match self.uploader.upload(&video, &metadata).await {
                    Ok(receipt) => {
                        report.uploads.insert(language.clone(), receipt);
                    }
                    Err(e) => {
                        error!(language = %language, error = %e, "Upload failed");
                        report.upload_failures.insert(language.clone(), e.to_string());
                    }
                }
            }
        }

        info!(
            videos = report.videos.len(),
            uploads = report.uploads.len(),
            clean = report.is_clean(),
            "Production finished"
        );
        Ok(report)
    }
}

async fn write_metadata(path: &Path, metadata: &VideoMetadata) -> FabulaResult<()> {
    let pretty = serde_json::to_string_pretty(metadata).map_err(JsonError::from)?;
    tokio::fs::write(path, pretty)
        .await
        .map_err(|e| IoError::new(path, e.to_string()))?;
    Ok(())
}
