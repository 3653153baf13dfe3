use std::path::Path;

use tracing::info;

use crate::audio::{decode_file, AudioSegment};
use crate::error::MergeError;

/// Concatenates already-decoded segments in order.
///
/// The first segment seeds the result as-is, so no silence is inserted before it.
pub fn merge_segments<I>(segments: I) -> Result<AudioSegment, MergeError>
where
    I: IntoIterator<Item = AudioSegment>,
{
    let mut segments = segments.into_iter();
    let mut combined = segments.next().ok_or(MergeError::Empty)?;

    for segment in segments {
        combined.append(segment)?;
    }
    Ok(combined)
}

/// Decodes each file from disk and concatenates them in the given order.
pub fn merge_files<P: AsRef<Path>>(files: &[P]) -> Result<AudioSegment, MergeError> {
    if files.is_empty() {
        return Err(MergeError::Empty);
    }

    info!("Merging {} audio files", files.len());
    let mut combined: Option<AudioSegment> = None;
    for file in files {
        let file = file.as_ref();
        info!("Processing {}", file.display());
        let segment = decode_file(file)?;
        match combined.as_mut() {
            Some(acc) => acc.append(segment)?,
            None => combined = Some(segment),
        }
    }
    combined.ok_or(MergeError::Empty)
}
