use std::path::{Path, PathBuf};

pub use crate::{BridgeError, HubDownload, Result};

pub struct HubClient {
    _runtime: tokio::runtime::Runtime,
    handle: tokio::runtime::Handle,
    inner: super::hub::HubClient,
}

impl HubClient {
    pub fn new() -> Result<HubClient> {
        let _runtime = tokio::runtime::Runtime::new()?;
        let handle = _runtime.handle().clone();

        Ok(HubClient { inner: super::hub::HubClient::new()?, _runtime, handle })
    }

    pub fn endpoint(mut self, endpoint: &str) -> HubClient {
        self.inner = self.inner.endpoint(endpoint);
        self
    }
}

impl HubDownload for HubClient {
    fn download(
        &self,
        repo_id: &str,
        filename: &str,
        revision: Option<&str>,
        cache_dir: Option<&Path>,
    ) -> Result<PathBuf> {
        self.handle.block_on(async { self.inner.download(repo_id, filename, revision, cache_dir).await })
    }
}
