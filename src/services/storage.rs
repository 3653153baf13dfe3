use std::path::Path;
use std::sync::Arc;

use futures::future::BoxFuture;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::Client;
use tracing::info;

use crate::config::StorageConfig;
use crate::error::StorageError;

/// Characters escaped inside a single URL path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'+')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Publishes a merged file and reports where it can be fetched from.
///
/// `object_name` is the file's path relative to the work directory, using `/`
/// separators, e.g. `2025-04-03-14:03-<id>/song1+song2.mp3`.
pub trait Storage: Send + Sync {
    fn upload<'a>(
        &'a self,
        local_path: &'a Path,
        object_name: &'a str,
    ) -> BoxFuture<'a, Result<String, StorageError>>;
}

pub fn from_config(config: &StorageConfig, client: Client) -> Arc<dyn Storage> {
    match config {
        StorageConfig::Placeholder { base_url } => Arc::new(PlaceholderStorage {
            base_url: base_url.clone(),
        }),
        StorageConfig::Local { public_base_url } => Arc::new(LocalStorage {
            public_base_url: public_base_url.clone(),
        }),
        StorageConfig::Gcs {
            bucket,
            access_token,
        } => Arc::new(GcsStorage::new(
            client,
            bucket.clone(),
            access_token.clone(),
        )),
    }
}

fn encode_object(object_name: &str) -> String {
    object_name
        .split('/')
        .map(|seg| utf8_percent_encode(seg, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Uploads nothing; the reported URL is just the base plus the merged file's name.
pub struct PlaceholderStorage {
    pub base_url: String,
}

impl Storage for PlaceholderStorage {
    fn upload<'a>(
        &'a self,
        _local_path: &'a Path,
        object_name: &'a str,
    ) -> BoxFuture<'a, Result<String, StorageError>> {
        let name = object_name.rsplit('/').next().unwrap_or(object_name);
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), name);
        Box::pin(async move { Ok(url) })
    }
}

/// Points at the file as served by the `/user_files` static mount.
pub struct LocalStorage {
    pub public_base_url: String,
}

impl Storage for LocalStorage {
    fn upload<'a>(
        &'a self,
        _local_path: &'a Path,
        object_name: &'a str,
    ) -> BoxFuture<'a, Result<String, StorageError>> {
        let url = format!(
            "{}/user_files/{}",
            self.public_base_url.trim_end_matches('/'),
            encode_object(object_name)
        );
        Box::pin(async move { Ok(url) })
    }
}

/// Google Cloud Storage media upload with a public-read ACL.
pub struct GcsStorage {
    client: Client,
    bucket: String,
    access_token: String,
    api_base: String,
}

impl GcsStorage {
    pub const API_BASE: &'static str = "https://storage.googleapis.com";

    pub fn new(client: Client, bucket: String, access_token: String) -> Self {
        Self {
            client,
            bucket,
            access_token,
            api_base: Self::API_BASE.to_string(),
        }
    }

    /// Sends uploads to another JSON API host, e.g. an emulator.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn public_url(&self, object_name: &str) -> String {
        format!(
            "{}/{}/{}",
            Self::API_BASE,
            self.bucket,
            encode_object(object_name)
        )
    }
}

impl Storage for GcsStorage {
    fn upload<'a>(
        &'a self,
        local_path: &'a Path,
        object_name: &'a str,
    ) -> BoxFuture<'a, Result<String, StorageError>> {
        Box::pin(async move {
            let body = tokio::fs::read(local_path)
                .await
                .map_err(|e| StorageError::Read {
                    path: local_path.display().to_string(),
                    source: e,
                })?;

            info!(
                "Uploading {} ({} bytes) to gs://{}/{}",
                local_path.display(),
                body.len(),
                self.bucket,
                object_name
            );

            let endpoint = format!(
                "{}/upload/storage/v1/b/{}/o",
                self.api_base.trim_end_matches('/'),
                self.bucket
            );
            let resp = self
                .client
                .post(endpoint)
                .bearer_auth(&self.access_token)
                .query(&[
                    ("uploadType", "media"),
                    ("name", object_name),
                    ("predefinedAcl", "publicRead"),
                ])
                .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
                .body(body)
                .send()
                .await?;

            if !resp.status().is_success() {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                return Err(StorageError::Rejected { status, body });
            }

            Ok(self.public_url(object_name))
        })
    }
}
