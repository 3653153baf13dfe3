use std::path::Path;

use percent_encoding::percent_decode_str;
use reqwest::Url;
use unicode_segmentation::UnicodeSegmentation;

/// Longest file name most filesystems accept, in bytes.
pub const MAX_FILENAME_BYTES: usize = 255;

/// Last segment of the URL path, percent-decoded. Query and fragment are ignored.
///
/// Decoding happens before splitting, so an encoded `%2F` also acts as a separator.
pub fn filename_from_url(url: &Url) -> String {
    let path = percent_decode_str(url.path()).decode_utf8_lossy();
    path.rsplit('/').next().unwrap_or_default().to_string()
}

/// Name of the merged file: every input stem joined with `+`, plus `.{format}`.
///
/// `song1.mp3`, `song2.wav` and format `mp3` give `song1+song2.mp3`.
pub fn merged_filename<S: AsRef<str>>(filenames: &[S], format: &str) -> String {
    let stems: Vec<&str> = filenames
        .iter()
        .map(|name| {
            let name = name.as_ref();
            Path::new(name)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(name)
        })
        .collect();

    let suffix = format!(".{format}");
    let joined = stems.join("+");
    let stem = truncate_graphemes(&joined, MAX_FILENAME_BYTES.saturating_sub(suffix.len()));
    format!("{stem}{suffix}")
}

/// Cuts `text` to at most `max_bytes`, never splitting a grapheme.
fn truncate_graphemes(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }

    let mut end = 0;
    for (idx, grapheme) in text.grapheme_indices(true) {
        if idx + grapheme.len() > max_bytes {
            break;
        }
        end = idx + grapheme.len();
    }
    &text[..end]
}
