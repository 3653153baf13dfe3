use std::path::{Path, PathBuf};

use reqwest::Client;
use tracing::info;

use crate::audio::{decode_bytes, export, AudioSegment};
use crate::error::FetchError;
use crate::source::AudioSource;

/// A downloaded source, decoded and saved under the request directory.
#[derive(Debug, Clone)]
pub struct FetchedAudio {
    pub source: AudioSource,
    pub local_path: PathBuf,
    pub segment: AudioSegment,
}

/// Downloads, decodes and saves single audio files.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    ffmpeg: String,
}

impl Fetcher {
    pub fn new(client: Client, ffmpeg: impl Into<String>) -> Self {
        Self {
            client,
            ffmpeg: ffmpeg.into(),
        }
    }

    /// Fetches `url` into `dir`, returning the decoded audio along with where it was saved.
    ///
    /// The file on disk is a re-encode of the decoded audio in the format its
    /// extension names, so it may differ byte-for-byte from what the server sent.
    pub async fn fetch(&self, url: &str, dir: &Path) -> Result<FetchedAudio, FetchError> {
        let source = AudioSource::parse(url)?;
        info!("Downloading and saving audio from {} as {}", url, source.filename);

        // 1) Download the whole body
        let resp = self
            .client
            .get(source.url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Request {
                url: url.to_string(),
                source: e,
            })?;

        if !resp.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: resp.status(),
            });
        }

        let bytes = resp.bytes().await.map_err(|e| FetchError::Request {
            url: url.to_string(),
            source: e,
        })?;
        info!("Downloaded {} bytes from {}", bytes.len(), url);

        // 2) Decode off the async workers
        let hint = source.format.clone();
        let segment =
            tokio::task::spawn_blocking(move || decode_bytes(bytes.to_vec(), Some(&hint)))
                .await??;

        // 3) Persist the decoded audio in the format its name asks for
        if !dir.exists() {
            info!("Creating directory {}", dir.display());
        }
        tokio::fs::create_dir_all(dir).await?;
        let local_path = dir.join(&source.filename);

        let to_write = segment.clone();
        let path = local_path.clone();
        let format = source.format.clone();
        let ffmpeg = self.ffmpeg.clone();
        tokio::task::spawn_blocking(move || export(&to_write, &path, &format, &ffmpeg)).await??;

        Ok(FetchedAudio {
            source,
            local_path,
            segment,
        })
    }
}
