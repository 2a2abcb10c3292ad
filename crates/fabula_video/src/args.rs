//! Argument builders for ffmpeg and ffprobe.
//!
//! Pure functions, kept apart from process spawning so the exact command
//! lines can be tested without the tools installed.

use crate::VideoConfig;
use std::path::{Path, PathBuf};

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|arg| arg.to_string()).collect()
}

/// Slow centred zoom over a looped still image.
///
/// The zoom factor grows as `1 + rate * t`, `t` in seconds.
///
/// # Examples
///
/// ```
/// use fabula_video::{VideoConfig, zoom_filter};
///
/// let filter = zoom_filter(&VideoConfig::default());
/// assert!(filter.contains("z='1+0.02*on/24'"));
/// assert!(filter.contains("s=1024x576"));
/// ```
pub fn zoom_filter(config: &VideoConfig) -> String {
    format!(
        "scale={w}*4:-2,zoompan=z='1+{rate}*on/{fps}':x='iw/2-(iw/zoom/2)':y='ih/2-(ih/zoom/2)':d=1:s={size}:fps={fps},format=yuv420p",
        w = config.width(),
        rate = config.zoom_rate(),
        fps = config.fps(),
        size = config.frame_size(),
    )
}

/// `ffprobe` arguments printing a file's duration in seconds.
pub fn probe_args(media: &Path) -> Vec<String> {
    let mut args = owned(&[
        "-v",
        "error",
        "-show_entries",
        "format=duration",
        "-of",
        "default=noprint_wrappers=1:nokey=1",
    ]);
    args.push(path_arg(media));
    args
}

/// Parse `ffprobe` duration output.
///
/// # Examples
///
/// ```
/// use fabula_video::parse_duration;
///
/// assert_eq!(parse_duration("12.480000\n"), Some(12.48));
/// assert_eq!(parse_duration("N/A"), None);
/// ```
pub fn parse_duration(stdout: &str) -> Option<f64> {
    stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .and_then(|line| line.parse::<f64>().ok())
        .filter(|seconds| seconds.is_finite() && *seconds > 0.0)
}

/// `ffmpeg` arguments rendering one clip.
///
/// With `audio`, the narration is padded with silence up to `duration`.
/// Without it a silent track is generated, so every clip carries an audio
/// stream and the clips can be joined without re-encoding.
pub fn clip_args(
    image: &Path,
    audio: Option<&Path>,
    duration: f64,
    output: &Path,
    config: &VideoConfig,
) -> Vec<String> {
    let fps = config.fps().to_string();
    let mut args = owned(&["-y", "-loop", "1", "-framerate"]);
    args.push(fps.clone());
    args.push("-i".to_string());
    args.push(path_arg(image));

    match audio {
        Some(audio) => {
            args.push("-i".to_string());
            args.push(path_arg(audio));
            args.extend(owned(&["-af", "apad"]));
        }
        None => {
            args.extend(owned(&[
                "-f",
                "lavfi",
                "-i",
                "anullsrc=channel_layout=stereo:sample_rate=44100",
            ]));
        }
    }

    args.extend(owned(&["-map", "0:v:0", "-map", "1:a:0", "-vf"]));
    args.push(zoom_filter(config));
    args.push("-t".to_string());
    args.push(format!("{:.3}", duration));
    args.push("-r".to_string());
    args.push(fps);
    args.push("-c:v".to_string());
    args.push(config.video_codec().clone());
    args.push("-c:a".to_string());
    args.push(config.audio_codec().clone());
    args.push(path_arg(output));
    args
}

/// Contents of an ffmpeg concat-demuxer list for `clips`.
///
/// # Examples
///
/// ```
/// use fabula_video::concat_list;
/// use std::path::PathBuf;
///
/// let list = concat_list(&[PathBuf::from("/tmp/clip_0.mp4"), PathBuf::from("/tmp/it's.mp4")]);
/// assert_eq!(list, "file '/tmp/clip_0.mp4'\nfile '/tmp/it'\\''s.mp4'\n");
/// ```
pub fn concat_list(clips: &[PathBuf]) -> String {
    clips
        .iter()
        .map(|clip| format!("file '{}'\n", path_arg(clip).replace('\'', "'\\''")))
        .collect()
}

/// `ffmpeg` arguments joining the clips listed in `list` into `output`.
pub fn concat_args(list: &Path, output: &Path) -> Vec<String> {
    let mut args = owned(&["-y", "-f", "concat", "-safe", "0", "-i"]);
    args.push(path_arg(list));
    args.extend(owned(&["-c", "copy", "-movflags", "+faststart"]));
    args.push(path_arg(output));
    args
}

/// `ffmpeg` arguments rendering a single black frame.
pub fn placeholder_args(output: &Path, config: &VideoConfig) -> Vec<String> {
    let mut args = owned(&["-y", "-f", "lavfi", "-i"]);
    args.push(format!("color=c=black:s={}", config.frame_size()));
    args.extend(owned(&["-frames:v", "1"]));
    args.push(path_arg(output));
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(args: &[String], flag: &str) -> usize {
        args.iter()
            .position(|arg| arg == flag)
            .unwrap_or_else(|| panic!("missing {flag}"))
    }

    #[test]
    fn narrated_clip_pads_audio_to_duration() {
        let args = clip_args(
            Path::new("img.png"),
            Some(Path::new("audio.mp3")),
            6.25,
            Path::new("clip.mp4"),
            &VideoConfig::default(),
        );

        assert_eq!(args[position(&args, "-t") + 1], "6.250");
        assert_eq!(args[position(&args, "-af") + 1], "apad");
        assert_eq!(args[position(&args, "-c:v") + 1], "libx264");
        assert_eq!(args[position(&args, "-c:a") + 1], "aac");
        assert_eq!(args[position(&args, "-r") + 1], "24");
        assert!(args.contains(&"audio.mp3".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("clip.mp4"));
    }

    #[test]
    fn silent_clip_generates_audio_track() {
        let args = clip_args(
            Path::new("img.png"),
            None,
            5.0,
            Path::new("clip.mp4"),
            &VideoConfig::default(),
        );

        assert!(args.iter().any(|arg| arg.starts_with("anullsrc")));
        assert!(!args.contains(&"-af".to_string()));
        assert_eq!(args[position(&args, "-t") + 1], "5.000");
    }

    #[test]
    fn zoom_follows_configured_rate() {
        let config = VideoConfig::default().with_zoom_rate(0.05).with_fps(30);
        let filter = zoom_filter(&config);
        assert!(filter.contains("z='1+0.05*on/30'"));
        assert!(filter.contains("fps=30"));
    }

    #[test]
    fn probe_args_end_with_file() {
        let args = probe_args(Path::new("a b.mp3"));
        assert_eq!(args.last().map(String::as_str), Some("a b.mp3"));
        assert!(args.contains(&"format=duration".to_string()));
    }

    #[test]
    fn duration_rejects_garbage() {
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("0.000"), None);
        assert_eq!(parse_duration("\n3.5\n"), Some(3.5));
    }

    #[test]
    fn concat_copies_streams() {
        let args = concat_args(Path::new("list.txt"), Path::new("Final_Video_en.mp4"));
        assert_eq!(args[position(&args, "-c") + 1], "copy");
        assert_eq!(args[position(&args, "-i") + 1], "list.txt");
    }

    #[test]
    fn placeholder_is_black_frame() {
        let args = placeholder_args(Path::new("image_3.png"), &VideoConfig::default());
        assert!(args.contains(&"color=c=black:s=1024x576".to_string()));
        assert_eq!(args[position(&args, "-frames:v") + 1], "1");
    }
}
