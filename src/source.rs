use std::path::Path;

use reqwest::Url;

use crate::audio::format_hint;
use crate::error::FetchError;
use crate::utils::filenames::filename_from_url;

/// A remote audio file and the local name it is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSource {
    pub url: Url,
    pub filename: String,
    pub format: String,
}

impl AudioSource {
    pub fn parse(raw: &str) -> Result<Self, FetchError> {
        let invalid = |reason: &str| FetchError::InvalidSource {
            url: raw.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;
        let filename = filename_from_url(&url);
        if filename.is_empty() || filename == "." || filename == ".." {
            return Err(invalid("URL path has no file name"));
        }
        let format = format_hint(Path::new(&filename))
            .ok_or_else(|| invalid("file name has no extension to use as a format hint"))?;

        Ok(Self {
            url,
            filename,
            format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_filename_and_format() {
        let src = AudioSource::parse("https://host/path/a%20b.MP3?x=1").unwrap();
        assert_eq!(src.filename, "a b.MP3");
        assert_eq!(src.format, "mp3");
    }

    #[test]
    fn dot_only_name_still_has_a_format() {
        let src = AudioSource::parse("https://host/clips/.mp3").unwrap();
        assert_eq!(src.filename, ".mp3");
        assert_eq!(src.format, "mp3");
    }

    #[test]
    fn rejects_sources_without_usable_name() {
        for raw in [
            "https://host/",
            "https://host/dir/..",
            "https://host/noext",
            "not a url",
        ] {
            let err = AudioSource::parse(raw).unwrap_err();
            assert!(matches!(err, FetchError::InvalidSource { .. }), "{raw}");
        }
    }
}
