use std::path::PathBuf;

pub mod config;
pub mod ffmpeg;
pub mod media;
pub mod pipeline;
pub mod report;
pub mod upload;

pub use pipeline::{
    clip_output_dir, CancelFlag, ClipOutcome, ExtractionRequest, Pipeline, RunSummary,
};

#[derive(Debug, thiserror::Error)]
pub enum FilmFluencyAppError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Subtitle(#[from] filmfluency_core::SubtitleError),
    #[error(transparent)]
    Report(#[from] report::ReportError),
    #[error(transparent)]
    FFmpeg(#[from] ffmpeg::FFmpegError),
    #[error(transparent)]
    Upload(#[from] upload::UploadError),
    #[error("could not create output directory {path:?}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
