use std::path::PathBuf;

use crate::error::ConfigError;

pub const DEFAULT_WORK_DIR: &str = "./user_files";
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://example.com";
pub const DEFAULT_MERGED_FORMAT: &str = "mp3";

/// Where merged files are published once exported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// Reports `<base_url>/<merged name>` without uploading anything.
    Placeholder { base_url: String },
    /// Links to the copy served from the work directory under `/user_files`.
    Local { public_base_url: String },
    /// Uploads to a Google Cloud Storage bucket and makes the object public.
    Gcs { bucket: String, access_token: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub work_dir: PathBuf,
    pub ffmpeg_path: String,
    pub merged_format: String,
    pub storage: StorageConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from(DEFAULT_WORK_DIR),
            ffmpeg_path: "ffmpeg".to_string(),
            merged_format: DEFAULT_MERGED_FORMAT.to_string(),
            storage: StorageConfig::Placeholder {
                base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Builds the config from a key lookup, e.g. shuttle secrets or the environment.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());
        let defaults = AppConfig::default();

        let base_url = get("PUBLIC_BASE_URL").unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.into());
        let backend = get("STORAGE_BACKEND").unwrap_or_else(|| "placeholder".into());
        let storage = match backend.to_ascii_lowercase().as_str() {
            "placeholder" => StorageConfig::Placeholder { base_url },
            "local" => StorageConfig::Local {
                public_base_url: base_url,
            },
            "gcs" => StorageConfig::Gcs {
                bucket: get("GCS_BUCKET").ok_or(ConfigError::Missing("GCS_BUCKET"))?,
                access_token: get("GCS_ACCESS_TOKEN")
                    .ok_or(ConfigError::Missing("GCS_ACCESS_TOKEN"))?,
            },
            _ => return Err(ConfigError::UnknownBackend(backend)),
        };

        Ok(Self {
            work_dir: get("MERGE_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            ffmpeg_path: get("FFMPEG_PATH").unwrap_or(defaults.ffmpeg_path),
            merged_format: get("MERGED_FORMAT")
                .map(|f| f.trim_start_matches('.').to_ascii_lowercase())
                .unwrap_or(defaults.merged_format),
            storage,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_lookup_gives_defaults() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("MERGE_WORK_DIR", "/tmp/merges"),
            ("MERGED_FORMAT", ".WAV"),
            ("STORAGE_BACKEND", "local"),
            ("PUBLIC_BASE_URL", "https://audio.example.org"),
        ]))
        .unwrap();

        assert_eq!(cfg.work_dir, PathBuf::from("/tmp/merges"));
        assert_eq!(cfg.merged_format, "wav");
        assert_eq!(
            cfg.storage,
            StorageConfig::Local {
                public_base_url: "https://audio.example.org".into()
            }
        );
    }

    #[test]
    fn gcs_needs_bucket_and_token() {
        let err = AppConfig::from_lookup(lookup(&[
            ("STORAGE_BACKEND", "gcs"),
            ("GCS_BUCKET", "bucket"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("GCS_ACCESS_TOKEN")));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("STORAGE_BACKEND", "s3")])).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownBackend(b) if b == "s3"));
    }
}
