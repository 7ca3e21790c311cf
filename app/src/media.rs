use std::path::{Path, PathBuf};

use filmfluency_core::ClipRange;

use crate::ffmpeg::{ClipCommands, FFmpegError};

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("could not cut {range} from {movie:?}")]
    Cut {
        movie: PathBuf,
        range: String,
        #[source]
        source: FFmpegError,
    },
}

/// Everything the pipeline needs from a media tool.
///
/// Only `cut` can fail; a missing screenshot or audio track is reported as
/// `None` and does not stop the clip from counting.
#[async_trait::async_trait]
pub trait MediaCollaborator: std::fmt::Debug + Send + Sync {
    async fn cut(&self, movie: &Path, range: &ClipRange) -> Result<PathBuf, MediaError>;
    async fn screenshot(&self, clip: &Path) -> Option<PathBuf>;
    async fn extract_audio(&self, clip: &Path) -> Option<PathBuf>;
}

#[async_trait::async_trait]
impl MediaCollaborator for ClipCommands {
    async fn cut(&self, movie: &Path, range: &ClipRange) -> Result<PathBuf, MediaError> {
        ClipCommands::cut(self, movie, range)
            .await
            .map_err(|source| MediaError::Cut {
                movie: movie.to_path_buf(),
                range: range.to_string(),
                source,
            })
    }

    async fn screenshot(&self, clip: &Path) -> Option<PathBuf> {
        ClipCommands::screenshot(self, clip)
            .await
            .map_err(|e| log::warn!("no screenshot for {:?}: {}", clip, e))
            .ok()
    }

    async fn extract_audio(&self, clip: &Path) -> Option<PathBuf> {
        ClipCommands::extract_audio(self, clip)
            .await
            .map_err(|e| log::warn!("no audio for {:?}: {}", clip, e))
            .ok()
    }
}
