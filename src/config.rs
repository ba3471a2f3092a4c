//! Client configuration.
//! Loaded once at start from a JSON resource (`{"ApiUrl": ..., "ImageStorageUrl": ...}`)
//! with environment overrides, then passed by reference to whatever needs it.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};
use crate::models::ImageInfo;

pub const ENV_API_URL: &str = "PANTRY_API_URL";
pub const ENV_IMAGE_STORAGE_URL: &str = "PANTRY_IMAGE_STORAGE_URL";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "PANTRY_REQUEST_TIMEOUT_SECS";

/// Upper bound for `ExpiryLeewaySecs`: one day.
pub const MAX_EXPIRY_LEEWAY_SECS: i64 = 86_400;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct ClientConfig {
    /// Base URL of the REST backend; request paths are appended verbatim.
    pub api_url: String,
    /// Base URL of the blob container holding recipe thumbnails.
    pub image_storage_url: String,
    pub request_timeout_secs: u64,
    /// Tokens expiring within this many seconds are already treated as expired.
    pub expiry_leeway_secs: i64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            image_storage_url: String::new(),
            request_timeout_secs: 30,
            expiry_leeway_secs: 0,
        }
    }
}

impl ClientConfig {
    pub fn new<S: Into<String>>(api_url: S, image_storage_url: S) -> Self {
        Self { api_url: api_url.into(), image_storage_url: image_storage_url.into(), ..Default::default() }
    }

    /// Read the JSON resource at `path`, apply environment overrides and validate.
    pub fn load(path: &Path) -> ClientResult<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    pub(crate) fn load_with<F: Fn(&str) -> Option<String>>(path: &Path, lookup: F) -> ClientResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ClientError::config(format!("cannot read {}: {}", path.display(), e)))?;
        let cfg: ClientConfig = serde_json::from_str(&text)
            .map_err(|e| ClientError::config(format!("invalid config {}: {}", path.display(), e)))?;
        cfg.with_overrides_from(lookup).validated()
    }

    /// Configuration from environment variables alone.
    pub fn from_env() -> ClientResult<Self> {
        ClientConfig::default().with_env_overrides().validated()
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply `PANTRY_*` overrides read through `lookup`. An unparsable timeout is ignored.
    pub(crate) fn with_overrides_from<F: Fn(&str) -> Option<String>>(mut self, lookup: F) -> Self {
        if let Some(v) = lookup(ENV_API_URL) { self.api_url = v; }
        if let Some(v) = lookup(ENV_IMAGE_STORAGE_URL) { self.image_storage_url = v; }
        if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => self.request_timeout_secs = secs,
                Err(_) => tracing::warn!(target: "pantry::client", "ignoring {}={:?}", ENV_REQUEST_TIMEOUT_SECS, raw),
            }
        }
        self
    }

    pub fn validated(self) -> ClientResult<Self> {
        if self.api_url.trim().is_empty() {
            return Err(ClientError::config("ApiUrl is not set"));
        }
        reqwest::Url::parse(&self.api_url)
            .map_err(|e| ClientError::InvalidUrl { url: self.api_url.clone(), reason: e.to_string() })?;
        if !(0..=MAX_EXPIRY_LEEWAY_SECS).contains(&self.expiry_leeway_secs) {
            return Err(ClientError::config(format!(
                "ExpiryLeewaySecs must be between 0 and {}, got {}",
                MAX_EXPIRY_LEEWAY_SECS, self.expiry_leeway_secs
            )));
        }
        Ok(self)
    }

    pub fn request_timeout(&self) -> Duration { Duration::from_secs(self.request_timeout_secs) }

    /// Full URL of the original photo behind `image`.
    pub fn image_url(&self, image: &ImageInfo) -> String {
        format!(
            "{}/{}.{}",
            self.image_storage_url.trim_end_matches('/'),
            image.original_photo_guid,
            image.extension
        )
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
