use std::path::PathBuf;

mod clip;
mod cmd;

pub use clip::{ClipCommands, DEFAULT_SCREENSHOT_OFFSET};
pub use cmd::FFMpegBinary;
use cmd::FFmpegCommand;

#[derive(Debug, thiserror::Error)]
pub enum FFmpegError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("ffmpeg not found at {0:?}, install it from https://ffmpeg.org/download.html")]
    NotInstalled(PathBuf),
    #[error("ffmpeg error: exit {0}")]
    Exit(i32),
    #[error("ffmpeg reported success but did not write {0:?}")]
    MissingOutput(PathBuf),
}
