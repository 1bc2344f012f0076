//! ffmpeg invocation for the MPEG-DASH ladder.
//!
//! Every resolution gets its own video and audio output stream: stream `i`
//! is scaled and padded from the first input video, paired with a resampled
//! copy of the first input audio, and encoded with its own rate settings.
//! The dash muxer groups all video representations into adaptation set 0 and
//! all audio representations into adaptation set 1.

use crate::common::error::DashError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Default ladder. Position in this list is the output stream index.
pub const RESOLUTIONS: [Resolution; 4] = [
    Resolution::new(1280, 720),
    Resolution::new(854, 480),
    Resolution::new(640, 360),
    Resolution::new(426, 240),
];

pub const MANIFEST_NAME: &str = "manifest.mpd";
pub const MANIFEST_EXTENSION: &str = "mpd";

const SEGMENT_DURATION_SECS: &str = "6";
const INIT_SEGMENT_TEMPLATE: &str = "init_$RepresentationID$.m4s";
const MEDIA_SEGMENT_TEMPLATE: &str = "segment_$RepresentationID$_$Number$.m4s";
const ADAPTATION_SETS: &str = "id=0,streams=v id=1,streams=a";
const DEFAULT_AUDIO_BITRATE: &str = "64k";

pub fn audio_bitrate(height: u32) -> &'static str {
    match height {
        720 => "128k",
        480 => "96k",
        360 => "64k",
        240 => "48k",
        _ => DEFAULT_AUDIO_BITRATE,
    }
}

#[derive(Debug, Clone)]
pub struct TranscodeJob {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub resolutions: Vec<Resolution>,
}

impl TranscodeJob {
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>, resolutions: &[Resolution]) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            resolutions: resolutions.to_vec(),
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.output_dir.join(MANIFEST_NAME)
    }

    /// One video and one audio filter chain per resolution, in ladder order.
    pub fn filters(&self) -> Vec<String> {
        let mut filters = Vec::with_capacity(self.resolutions.len() * 2);

        for (idx, res) in self.resolutions.iter().enumerate() {
            filters.push(format!(
                "[0:v]scale={w}x{h}:force_original_aspect_ratio=decrease,\
                 pad=width=ceil(iw/2)*2:height=ceil(ih/2)*2:x=(ow-iw)/2:y=(oh-ih)/2,\
                 format=yuv420p,setsar=1[v{idx}]",
                w = res.width,
                h = res.height,
            ));
            filters.push(format!("[0:a]aresample=async=1[a{idx}]"));
        }

        filters
    }

    fn stream_mappings(&self) -> Vec<String> {
        (0..self.resolutions.len())
            .flat_map(|idx| {
                [
                    "-map".to_string(),
                    format!("[v{idx}]"),
                    "-map".to_string(),
                    format!("[a{idx}]"),
                ]
            })
            .collect()
    }

    // Target and max video bitrate reuse the pixel width as kbps (1280 -> 1280k).
    // That is what the deployed ladder has always produced; change it only
    // together with an agreed bitrate table.
    fn output_params(&self) -> Vec<String> {
        let mut params = Vec::with_capacity(self.resolutions.len() * 16);

        for (idx, res) in self.resolutions.iter().enumerate() {
            let rate = format!("{}k", res.width);
            params.extend([
                format!("-c:v:{idx}"),
                "libx264".to_string(),
                format!("-crf:{idx}"),
                "23".to_string(),
                format!("-preset:{idx}"),
                "fast".to_string(),
                format!("-b:v:{idx}"),
                rate.clone(),
                format!("-maxrate:{idx}"),
                rate,
                format!("-bufsize:{idx}"),
                format!("{}k", res.width * 2),
                format!("-c:a:{idx}"),
                "aac".to_string(),
                format!("-b:a:{idx}"),
                audio_bitrate(res.height).to_string(),
            ]);
        }

        params
    }

    /// Full ffmpeg argument list, without the program itself.
    pub fn build_args(&self) -> Result<Vec<String>, DashError> {
        if self.resolutions.is_empty() {
            return Err(DashError::Config(
                "No valid FFmpeg filter chains or stream mappings generated.".to_string(),
            ));
        }
        if let Some(res) = self.resolutions.iter().find(|r| r.width == 0 || r.height == 0) {
            return Err(DashError::Config(format!(
                "Resolution {}x{} has a zero dimension",
                res.width, res.height
            )));
        }

        let mut args = vec![
            "-i".to_string(),
            self.input.to_string_lossy().into_owned(),
            "-y".to_string(),
            "-filter_complex".to_string(),
            self.filters().join(";"),
        ];
        args.extend(self.stream_mappings());
        args.extend(
            [
                "-f",
                "dash",
                "-seg_duration",
                SEGMENT_DURATION_SECS,
                "-use_timeline",
                "1",
                "-use_template",
                "1",
                "-init_seg_name",
                INIT_SEGMENT_TEMPLATE,
                "-media_seg_name",
                MEDIA_SEGMENT_TEMPLATE,
                "-adaptation_sets",
                ADAPTATION_SETS,
            ]
            .map(String::from),
        );
        args.extend(self.output_params());
        args.push(self.manifest_path().to_string_lossy().into_owned());

        Ok(args)
    }
}

/// Create the output directory (and parents) and open it up to any user,
/// since ffmpeg may run under a different uid than the one that staged it.
pub fn prepare_output_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dir, fs::Permissions::from_mode(0o777))?;
    }

    Ok(())
}

/// Names of the regular files directly inside `dir`, sorted.
pub fn list_output_files(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }

    names.sort();
    Ok(names)
}

/// Run the job to completion. Blocks the calling thread until ffmpeg exits.
pub fn run(ffmpeg: &Path, job: &TranscodeJob) -> Result<Vec<String>, DashError> {
    let args = job.build_args()?;
    prepare_output_dir(&job.output_dir)?;

    info!(
        "🎥 Running ffmpeg for {} ({} renditions)",
        job.input.display(),
        job.resolutions.len()
    );
    debug!(program = %ffmpeg.display(), ?args, "ffmpeg command");

    let output = Command::new(ffmpeg).args(&args).output().map_err(|e| {
        DashError::Transcode(format!("could not start {}: {}", ffmpeg.display(), e))
    })?;

    if !output.status.success() {
        return Err(DashError::Transcode(
            String::from_utf8_lossy(&output.stderr).into_owned(),
        ));
    }

    Ok(list_output_files(&job.output_dir)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(resolutions: &[Resolution]) -> TranscodeJob {
        TranscodeJob::new("/tmp/in.mp4", "/tmp/in_dash_output", resolutions)
    }

    fn count(args: &[String], needle: &str) -> usize {
        args.iter().filter(|a| a.as_str() == needle).count()
    }

    #[test]
    fn one_map_pair_and_two_filters_per_resolution() {
        for n in 1..=RESOLUTIONS.len() {
            let job = job(&RESOLUTIONS[..n]);
            let args = job.build_args().unwrap();

            let video_maps = args.iter().filter(|a| a.starts_with("[v")).count();
            let audio_maps = args.iter().filter(|a| a.starts_with("[a")).count();
            assert_eq!(video_maps, n);
            assert_eq!(audio_maps, n);
            assert_eq!(count(&args, "-map"), 2 * n);

            let graph_pos = args.iter().position(|a| a == "-filter_complex").unwrap();
            let graph = &args[graph_pos + 1];
            assert_eq!(graph.split(';').count(), 2 * n);
            assert_eq!(job.filters().len(), 2 * n);
        }
    }

    #[test]
    fn empty_ladder_is_rejected() {
        let err = job(&[]).build_args().unwrap_err();
        assert!(matches!(err, DashError::Config(_)));
    }

    #[test]
    fn zero_dimension_is_rejected() {
        let err = job(&[Resolution::new(0, 720)]).build_args().unwrap_err();
        assert!(matches!(err, DashError::Config(_)));
    }

    #[test]
    fn empty_ladder_never_spawns() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let job = TranscodeJob::new(dir.path().join("in.mp4"), &out, &[]);

        let err = run(Path::new("/definitely/not/ffmpeg"), &job).unwrap_err();
        assert!(matches!(err, DashError::Config(_)));
        assert!(!out.exists());
    }

    #[test]
    fn single_rendition_argument_list() {
        let args = job(&[Resolution::new(1280, 720)]).build_args().unwrap();

        let expected: Vec<String> = [
            "-i",
            "/tmp/in.mp4",
            "-y",
            "-filter_complex",
            "[0:v]scale=1280x720:force_original_aspect_ratio=decrease,\
             pad=width=ceil(iw/2)*2:height=ceil(ih/2)*2:x=(ow-iw)/2:y=(oh-ih)/2,\
             format=yuv420p,setsar=1[v0];[0:a]aresample=async=1[a0]",
            "-map",
            "[v0]",
            "-map",
            "[a0]",
            "-f",
            "dash",
            "-seg_duration",
            "6",
            "-use_timeline",
            "1",
            "-use_template",
            "1",
            "-init_seg_name",
            "init_$RepresentationID$.m4s",
            "-media_seg_name",
            "segment_$RepresentationID$_$Number$.m4s",
            "-adaptation_sets",
            "id=0,streams=v id=1,streams=a",
            "-c:v:0",
            "libx264",
            "-crf:0",
            "23",
            "-preset:0",
            "fast",
            "-b:v:0",
            "1280k",
            "-maxrate:0",
            "1280k",
            "-bufsize:0",
            "2560k",
            "-c:a:0",
            "aac",
            "-b:a:0",
            "128k",
            "/tmp/in_dash_output/manifest.mpd",
        ]
        .map(String::from)
        .to_vec();

        assert_eq!(args, expected);
    }

    #[test]
    fn stream_indices_follow_ladder_order() {
        let args = job(&RESOLUTIONS).build_args().unwrap();

        let rate_of = |flag: &str| {
            let pos = args.iter().position(|a| a == flag).unwrap();
            args[pos + 1].clone()
        };

        assert_eq!(rate_of("-b:v:1"), "854k");
        assert_eq!(rate_of("-bufsize:2"), "1280k");
        assert_eq!(rate_of("-b:a:3"), "48k");
        assert_eq!(args.last().unwrap(), "/tmp/in_dash_output/manifest.mpd");
    }

    #[test]
    fn audio_bitrate_falls_back_for_unknown_heights() {
        assert_eq!(audio_bitrate(720), "128k");
        assert_eq!(audio_bitrate(480), "96k");
        assert_eq!(audio_bitrate(1080), "64k");
    }

    #[cfg(unix)]
    #[test]
    fn output_dir_is_created_world_writable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("a").join("b");
        prepare_output_dir(&out).unwrap();

        let mode = fs::metadata(&out).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o777);
    }

    #[test]
    fn listing_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("manifest.mpd"), "x").unwrap();
        fs::write(dir.path().join("init_0.m4s"), "x").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        let names = list_output_files(dir.path()).unwrap();
        assert_eq!(names, vec!["init_0.m4s", "manifest.mpd"]);
    }

    #[test]
    fn missing_binary_is_a_transcode_error() {
        let dir = tempfile::tempdir().unwrap();
        let job = TranscodeJob::new(dir.path().join("in.mp4"), dir.path().join("out"), &RESOLUTIONS);

        let err = run(Path::new("/definitely/not/ffmpeg"), &job).unwrap_err();
        assert!(matches!(err, DashError::Transcode(_)));
    }
}
