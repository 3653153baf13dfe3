use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use tracing::info;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::audio::export;
use crate::error::{MergeError, PipelineError};
use crate::services::merger::merge_segments;
use crate::utils::filenames::merged_filename;

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub merged_filename: String,
    pub merged_path: PathBuf,
    pub public_url: String,
    pub duration: Duration,
}

/// Directory name isolating one request's files: `<YYYY-MM-DD-HH:MM>-<uuid>`.
fn request_dir_name() -> String {
    let timestamp = Local::now().format("%Y-%m-%d-%H:%M");
    format!("{}-{}", timestamp, Uuid::new_v4().simple())
}

/// Downloads every URL in order, merges them and publishes the result.
///
/// The first failing URL aborts the request. Files fetched before it stay on disk.
pub async fn merge_audio_urls(
    state: &AppState,
    urls: &[String],
) -> Result<MergeOutcome, PipelineError> {
    if urls.is_empty() {
        return Err(MergeError::Empty.into());
    }

    let dir_name = request_dir_name();
    let dir = state.config.work_dir.join(&dir_name);

    // 1) Fetch strictly one after another
    let mut fetched = Vec::with_capacity(urls.len());
    for (i, url) in urls.iter().enumerate() {
        info!("Fetching audio {}/{}: {}", i + 1, urls.len(), url);
        fetched.push(state.fetcher.fetch(url, &dir).await?);
    }

    // 2) Name the output after the inputs
    let names: Vec<&str> = fetched.iter().map(|f| f.source.filename.as_str()).collect();
    let merged_name = merged_filename(&names, &state.config.merged_format);
    let merged_path = dir.join(&merged_name);
    info!("Merging audio files into {}", merged_path.display());

    // 3) Merge the buffers the fetcher already decoded, then export
    let segments: Vec<_> = fetched.into_iter().map(|f| f.segment).collect();
    let path = merged_path.clone();
    let format = state.config.merged_format.clone();
    let ffmpeg = state.config.ffmpeg_path.clone();
    let duration = tokio::task::spawn_blocking(move || {
        let merged = merge_segments(segments)?;
        export(&merged, &path, &format, &ffmpeg)?;
        Ok::<_, PipelineError>(merged.duration())
    })
    .await??;

    // 4) Publish
    let object_name = format!("{}/{}", dir_name, merged_name);
    let public_url = state.storage.upload(&merged_path, &object_name).await?;
    info!("Merged audio available at {}", public_url);

    Ok(MergeOutcome {
        merged_filename: merged_name,
        merged_path,
        public_url,
        duration,
    })
}
