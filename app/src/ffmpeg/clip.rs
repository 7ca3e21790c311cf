use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use filmfluency_core::ClipRange;

use super::{FFMpegBinary, FFmpegCommand, FFmpegError};

/// Where in a clip the screenshot frame is grabbed from.
pub const DEFAULT_SCREENSHOT_OFFSET: Duration = Duration::from_secs(2);

const CLIP_EXTENSION: &str = "mp4";
const SCREENSHOT_EXTENSION: &str = "jpg";
const AUDIO_EXTENSION: &str = "wav";

/// Builds and runs the three ffmpeg invocations used per dialogue.
///
/// Every output lands in `output_dir` under a random name.
#[derive(Debug, Clone)]
pub struct ClipCommands {
    bin: FFMpegBinary,
    output_dir: PathBuf,
    screenshot_offset: Duration,
}

impl ClipCommands {
    pub fn new<P: Into<PathBuf>>(bin: FFMpegBinary, output_dir: P) -> ClipCommands {
        ClipCommands {
            bin,
            output_dir: output_dir.into(),
            screenshot_offset: DEFAULT_SCREENSHOT_OFFSET,
        }
    }

    pub fn screenshot_offset(mut self, offset: Duration) -> Self {
        self.screenshot_offset = offset;
        self
    }

    fn output_path(&self, extension: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", uuid::Uuid::new_v4(), extension))
    }

    fn cut_command(&self, source: &Path, range: &ClipRange, output: &Path) -> FFmpegCommand {
        let mut cmd = self.bin.build_command();
        cmd.arg("-ss")
            .arg(range.start.whole_seconds().to_string())
            .arg("-to")
            .arg(range.end.whole_seconds().to_string())
            .arg("-i")
            .arg(source)
            .arg("-vcodec")
            .arg("libx264")
            .arg("-acodec")
            .arg("aac")
            .arg("-y")
            .generated_arg(format!("output.{}", CLIP_EXTENSION), output);
        cmd
    }

    fn screenshot_command(&self, clip: &Path, output: &Path) -> FFmpegCommand {
        let mut cmd = self.bin.build_command();
        cmd.arg("-ss")
            .arg(format!("{}", self.screenshot_offset.as_secs_f32()))
            .arg("-i")
            .arg(clip)
            .arg("-vframes")
            .arg("1")
            .arg("-y")
            .generated_arg(format!("output.{}", SCREENSHOT_EXTENSION), output);
        cmd
    }

    fn audio_command(&self, clip: &Path, output: &Path) -> FFmpegCommand {
        let mut cmd = self.bin.build_command();
        cmd.arg("-i")
            .arg(clip)
            .arg("-acodec")
            .arg("pcm_s16le")
            .arg("-y")
            .generated_arg(format!("output.{}", AUDIO_EXTENSION), output);
        cmd
    }

    /// Cut `range` out of `source` into a new h264/aac clip.
    pub async fn cut(&self, source: &Path, range: &ClipRange) -> Result<PathBuf, FFmpegError> {
        let output = self.output_path(CLIP_EXTENSION);
        self.cut_command(source, range, &output).run().await?;
        expect_output(output).await
    }

    /// Grab a single frame of `clip`.
    pub async fn screenshot(&self, clip: &Path) -> Result<PathBuf, FFmpegError> {
        let output = self.output_path(SCREENSHOT_EXTENSION);
        self.screenshot_command(clip, &output).run().await?;
        expect_output(output).await
    }

    /// Write the audio track of `clip` as 16 bit PCM.
    pub async fn extract_audio(&self, clip: &Path) -> Result<PathBuf, FFmpegError> {
        let output = self.output_path(AUDIO_EXTENSION);
        self.audio_command(clip, &output).run().await?;
        expect_output(output).await
    }
}

async fn expect_output(output: PathBuf) -> Result<PathBuf, FFmpegError> {
    if tokio::fs::try_exists(&output).await? {
        Ok(output)
    } else {
        Err(FFmpegError::MissingOutput(output))
    }
}

#[cfg(test)]
mod tests {
    use filmfluency_core::Timecode;

    use super::*;

    fn commands() -> ClipCommands {
        ClipCommands::new(FFMpegBinary::default(), "/clips")
    }

    #[test]
    fn cut_command() {
        let range = ClipRange::adjust(Timecode::new(0, 0, 1, 0), Timecode::new(0, 0, 2, 0));
        let cmd = commands().cut_command(
            Path::new("movie.mkv"),
            &range,
            Path::new("/clips/abc.mp4"),
        );
        assert_eq!(
            format!("{:?}", cmd.test_display()),
            r##"FFMpegTestFormat { bin: "ffmpeg", args: ["-ss", "00:00:01", "-to", "00:00:06", "-i", "movie.mkv", "-vcodec", "libx264", "-acodec", "aac", "-y", "output.mp4"] }"##,
        )
    }

    #[test]
    fn screenshot_command() {
        let cmd = commands()
            .screenshot_offset(Duration::from_millis(1500))
            .screenshot_command(Path::new("/clips/abc.mp4"), Path::new("/clips/def.jpg"));
        assert_eq!(
            format!("{:?}", cmd.test_display()),
            r##"FFMpegTestFormat { bin: "ffmpeg", args: ["-ss", "1.5", "-i", "/clips/abc.mp4", "-vframes", "1", "-y", "output.jpg"] }"##,
        )
    }

    #[test]
    fn audio_command() {
        let cmd = ClipCommands::new(FFMpegBinary::new("/usr/bin/ffmpeg"), "/clips")
            .audio_command(Path::new("/clips/abc.mp4"), Path::new("/clips/def.wav"));
        assert_eq!(
            format!("{:?}", cmd.test_display()),
            r##"FFMpegTestFormat { bin: "/usr/bin/ffmpeg", args: ["-i", "/clips/abc.mp4", "-acodec", "pcm_s16le", "-y", "output.wav"] }"##,
        )
    }

    #[test]
    fn outputs_are_unique_and_inside_output_dir() {
        let c = commands();
        let a = c.output_path(CLIP_EXTENSION);
        let b = c.output_path(CLIP_EXTENSION);
        assert_ne!(a, b);
        assert_eq!(a.parent(), Some(Path::new("/clips")));
        assert_eq!(a.extension().and_then(|e| e.to_str()), Some("mp4"));
    }

    #[tokio::test]
    async fn failed_cut_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let c = ClipCommands::new(FFMpegBinary::new("/definitely/not/ffmpeg"), dir.path());
        let range = ClipRange::adjust(Timecode::default(), Timecode::default());
        assert!(c.cut(Path::new("movie.mkv"), &range).await.is_err());
    }
}
