use std::{fmt, path::Path, str::FromStr};

const S3_SCHEME: &str = "s3://";

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("invalid upload destination {0:?}, expected s3://bucket[/prefix]")]
    InvalidDestination(String),
    #[error("uploads require the `aws-sdk` feature")]
    Unsupported,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("upload of {path} failed: {reason}")]
    Remote { path: String, reason: String },
}

/// An `s3://bucket/prefix` location clips are uploaded under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Destination {
    pub bucket: String,
    pub prefix: String,
}

impl FromStr for S3Destination {
    type Err = UploadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || UploadError::InvalidDestination(s.to_owned());
        let rest = s.strip_prefix(S3_SCHEME).ok_or_else(invalid)?;
        let (bucket, prefix) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(invalid());
        }
        Ok(S3Destination {
            bucket: bucket.to_owned(),
            prefix: prefix.trim_matches('/').to_owned(),
        })
    }
}

impl fmt::Display for S3Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", S3_SCHEME, self.bucket)?;
        if !self.prefix.is_empty() {
            write!(f, "/{}", self.prefix)?;
        }
        Ok(())
    }
}

impl S3Destination {
    /// Object key for `file_name` of movie `movie_id`: `prefix/movie_id/file_name`.
    pub fn key(&self, movie_id: &str, file_name: &str) -> String {
        [self.prefix.as_str(), movie_id, file_name]
            .iter()
            .filter(|p| !p.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[cfg_attr(not(feature = "aws-sdk"), allow(dead_code))]
fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("mp4") => "video/mp4",
        Some("jpg") => "image/jpeg",
        Some("wav") => "audio/wav",
        Some("csv") => "text/csv",
        _ => "application/octet-stream",
    }
}

/// Somewhere produced artifacts can be copied to.
#[async_trait::async_trait]
pub trait ArtifactUploader: fmt::Debug + Send + Sync {
    /// Upload the file at `path`, returning where it ended up.
    async fn upload(&self, path: &Path) -> Result<String, UploadError>;
}

#[cfg(feature = "aws-sdk")]
pub use s3::S3Uploader;

/// The uploader for `destination`, if this build can talk to it.
pub async fn uploader_for(
    destination: S3Destination,
    movie_id: String,
) -> Result<Box<dyn ArtifactUploader>, UploadError> {
    #[cfg(feature = "aws-sdk")]
    {
        log::info!("uploading artifacts to {} for {}", destination, movie_id);
        Ok(Box::new(S3Uploader::from_env(destination, movie_id).await))
    }
    #[cfg(not(feature = "aws-sdk"))]
    {
        log::error!("cannot upload to {} for {}", destination, movie_id);
        Err(UploadError::Unsupported)
    }
}

#[cfg(feature = "aws-sdk")]
mod s3 {
    use std::path::Path;

    use super::{content_type, ArtifactUploader, S3Destination, UploadError};

    pub struct S3Uploader {
        client: aws_sdk_s3::Client,
        destination: S3Destination,
        movie_id: String,
    }

    impl std::fmt::Debug for S3Uploader {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("S3Uploader")
                .field("destination", &self.destination)
                .field("movie_id", &self.movie_id)
                .finish()
        }
    }

    impl S3Uploader {
        /// Build a client from the standard AWS environment/profile chain.
        pub async fn from_env(destination: S3Destination, movie_id: String) -> S3Uploader {
            let cfg = aws_config::from_env().load().await;
            let client = aws_sdk_s3::Client::new(&cfg);
            S3Uploader {
                client,
                destination,
                movie_id,
            }
        }
    }

    #[async_trait::async_trait]
    impl ArtifactUploader for S3Uploader {
        async fn upload(&self, path: &Path) -> Result<String, UploadError> {
            let file_name = path
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let key = self.destination.key(&self.movie_id, &file_name);
            let body = tokio::fs::read(path).await?;
            log::debug!("uploading {:?} ({} bytes) to {}", path, body.len(), key);

            self.client
                .put_object()
                .bucket(&self.destination.bucket)
                .key(&key)
                .content_type(content_type(path))
                .body(body.into())
                .send()
                .await
                .map_err(|e| UploadError::Remote {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;

            Ok(format!("s3://{}/{}", self.destination.bucket, key))
        }
    }
}
