use reqwest::StatusCode;
use symphonia::core::errors::Error as SymphoniaError;
use thiserror::Error;

/// Failures while turning encoded bytes into an [`AudioSegment`](crate::audio::AudioSegment).
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to decode audio: {0}")]
    Symphonia(#[from] SymphoniaError),
    #[error("no decodable audio track found")]
    NoTrack,
    #[error("audio stream does not declare a sample rate or channel layout")]
    UnknownSpec,
    #[error("I/O error while decoding: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures while writing an [`AudioSegment`](crate::audio::AudioSegment) to disk.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to write wav: {0}")]
    Wav(#[from] hound::Error),
    #[error("I/O error while encoding: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to spawn ffmpeg: {0}")]
    Spawn(std::io::Error),
    #[error("ffmpeg exited with status {status}: {stderr}")]
    Ffmpeg { status: String, stderr: String },
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid audio source {url}: {reason}")]
    InvalidSource { url: String, reason: String },
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("upstream returned {status} for {url}")]
    Status { url: String, status: StatusCode },
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("No audio files to merge")]
    Empty,
    #[error("cannot convert {from} channels to {to} channels")]
    ChannelLayout { from: usize, to: usize },
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("upload request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("upload rejected with {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown storage backend `{0}` (expected placeholder, local or gcs)")]
    UnknownBackend(String),
    #[error("{0} must be set when STORAGE_BACKEND=gcs")]
    Missing(&'static str),
}

/// Everything that can abort a merge request.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Merge(#[from] MergeError),
    #[error("failed to export merged audio: {0}")]
    Export(#[from] EncodeError),
    #[error("failed to publish merged audio: {0}")]
    Storage(#[from] StorageError),
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl PipelineError {
    /// True when the request itself was unusable rather than something failing mid-way.
    pub fn is_empty_request(&self) -> bool {
        matches!(self, PipelineError::Merge(MergeError::Empty))
    }
}
