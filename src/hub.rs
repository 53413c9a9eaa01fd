//! Model hub downloads backed by the `hf_hub` client and its cache.
//!
//! Files resolve through `{cache}/models--{org}--{name}/refs/{revision}` to
//! `snapshots/{commit}/{file}`, so anything already fetched by other hub
//! tooling into the same cache is reused without network access.

use std::path::{Path, PathBuf};

use hf_hub::api::tokio::{Api, ApiBuilder};
use hf_hub::{Cache, Repo, RepoType};
use log::{debug, info};

use crate::{BridgeError, Result};

static HF_ENDPOINT_ENV: &str = "HF_ENDPOINT";
static HF_TOKEN_ENV: &str = "HF_TOKEN";
static HF_HUB_CACHE_ENV: &str = "HF_HUB_CACHE";
static HF_HOME_ENV: &str = "HF_HOME";

static DEFAULT_ENDPOINT: &str = "https://huggingface.co";
static DEFAULT_REVISION: &str = "main";

/// Fetches a single file of a hub repository into a local cache and returns
/// its path.
pub trait HubDownload {
    fn download(
        &self,
        repo_id: &str,
        filename: &str,
        revision: Option<&str>,
        cache_dir: Option<&Path>,
    ) -> Result<PathBuf>;
}

/// Cache root used when the caller does not pass one.
pub fn default_cache_dir() -> Option<PathBuf> {
    if let Ok(cache) = std::env::var(HF_HUB_CACHE_ENV) {
        return Some(PathBuf::from(cache));
    }
    if let Ok(home) = std::env::var(HF_HOME_ENV) {
        return Some(PathBuf::from(home).join("hub"));
    }
    dirs::cache_dir().map(|d| d.join("huggingface").join("hub"))
}

pub fn model_repo(repo_id: &str, revision: Option<&str>) -> Repo {
    Repo::with_revision(
        repo_id.to_string(),
        RepoType::Model,
        revision.unwrap_or(DEFAULT_REVISION).to_string(),
    )
}

/// Looks a file up in the cache only.
pub fn cached_file(cache_dir: &Path, repo_id: &str, revision: Option<&str>, filename: &str) -> Option<PathBuf> {
    Cache::new(cache_dir.to_path_buf()).repo(model_repo(repo_id, revision)).get(filename)
}

pub struct HubClient {
    endpoint: String,
    token: Option<String>,
}

impl HubClient {
    pub fn new() -> Result<HubClient> {
        // A .env file may carry HF_ENDPOINT / HF_TOKEN; it's optional
        match dotenv::dotenv() {
            Ok(path) => debug!("Loaded hub settings from {}", path.display()),
            Err(dotenv::Error::Io(_)) => {}
            Err(e) => return Err(e.into()),
        };

        let endpoint = std::env::var(HF_ENDPOINT_ENV)
            .map(|e| e.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let token = std::env::var(HF_TOKEN_ENV).ok();

        info!("Using model hub endpoint: {}", endpoint);
        Ok(HubClient { endpoint, token })
    }

    pub fn endpoint(mut self, endpoint: &str) -> HubClient {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    fn api(&self, cache_dir: &Path) -> Result<Api> {
        let mut builder = ApiBuilder::new()
            .with_endpoint(self.endpoint.clone())
            .with_cache_dir(cache_dir.to_path_buf())
            .with_progress(false);
        if self.token.is_some() {
            builder = builder.with_token(self.token.clone());
        }
        builder.build().map_err(|e| BridgeError::Hub(format!("fail to create hub client: {}", e)))
    }

    /// Returns the cached copy when present, otherwise downloads it first.
    pub async fn download(
        &self,
        repo_id: &str,
        filename: &str,
        revision: Option<&str>,
        cache_dir: Option<&Path>,
    ) -> Result<PathBuf> {
        let cache_dir = match cache_dir {
            Some(dir) => dir.to_path_buf(),
            None => default_cache_dir()
                .ok_or_else(|| BridgeError::io_error(std::io::ErrorKind::NotFound, "no cache directory"))?,
        };

        if let Some(path) = cached_file(&cache_dir, repo_id, revision, filename) {
            debug!("Using cached {}", path.display());
            return Ok(path);
        }

        let path = self
            .api(&cache_dir)?
            .repo(model_repo(repo_id, revision))
            .get(filename)
            .await
            .map_err(|e| BridgeError::Hub(format!("fail to fetch {} from {}: {}", filename, repo_id, e)))?;

        info!("Downloaded {} to {}", filename, path.display());
        Ok(path)
    }
}
