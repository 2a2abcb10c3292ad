//! Tests for the ffmpeg-backed assembler.
//!
//! Tests that render real media need ffmpeg and ffprobe on PATH and only run
//! with `--features ffmpeg`.

use fabula_error::FabulaErrorKind;
use fabula_video::{ClipSource, VideoAssembler, VideoConfig};
use std::path::PathBuf;

fn missing_tools() -> VideoAssembler {
    VideoAssembler::new(
        VideoConfig::default()
            .with_ffmpeg("fabula-test-no-such-ffmpeg".to_string())
            .with_ffprobe("fabula-test-no-such-ffprobe".to_string()),
    )
}

#[test]
fn test_video_table_parses_partially() -> anyhow::Result<()> {
    let config: VideoConfig = toml::from_str("fps = 30\nzoom_rate = 0.01")?;
    assert_eq!(*config.fps(), 30);
    assert_eq!(*config.zoom_rate(), 0.01);
    assert_eq!(*config.tail_padding_ms(), 500);
    assert_eq!(config.video_codec(), "libx264");
    Ok(())
}

#[tokio::test]
async fn test_unprobeable_audio_means_silent_clip() {
    let assembler = missing_tools();

    let duration = assembler
        .narrated_duration(Some(PathBuf::from("audio_0.mp3").as_path()))
        .await;

    assert_eq!(duration, None);
    assert_eq!(assembler.narrated_duration(None).await, None);
}

#[tokio::test]
async fn test_missing_ffmpeg_is_media_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let assembler = missing_tools();
    let source = ClipSource {
        image: dir.path().join("image_0.png"),
        audio: None,
    };

    let err = assembler
        .render_clip(&source, &dir.path().join("clip_0.mp4"))
        .await
        .unwrap_err();

    match err.kind() {
        FabulaErrorKind::Media(e) => {
            assert_eq!(e.tool, "fabula-test-no-such-ffmpeg");
            assert!(e.message.contains("could not start"));
        }
        other => panic!("expected media error, got {other}"),
    }
}

#[tokio::test]
async fn test_concat_without_clips_fails() {
    let dir = tempfile::tempdir().expect("tempdir");

    let err = VideoAssembler::default()
        .concat(&[], &dir.path().join("Final_Video_en.mp4"))
        .await
        .unwrap_err();

    assert!(matches!(err.kind(), FabulaErrorKind::Media(_)));
}

#[tokio::test]
#[cfg_attr(not(feature = "ffmpeg"), ignore)]
async fn test_renders_silent_video_from_placeholder() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let assembler = VideoAssembler::default();
    let image = dir.path().join("images").join("image_0.png");

    assembler.placeholder_frame(&image).await?;
    assert!(image.exists());

    let sources = vec![
        ClipSource {
            image: image.clone(),
            audio: None,
        },
        ClipSource {
            image,
            audio: Some(dir.path().join("missing.mp3")),
        },
    ];
    let output = dir.path().join("Final_Video_en.mp4");
    assembler
        .assemble(&sources, &dir.path().join("clips"), &output)
        .await?;

    let duration = assembler.probe_duration(&output).await?;
    assert!((duration - 10.0).abs() < 0.5, "duration was {duration}");
    Ok(())
}
