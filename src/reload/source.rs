//! Module Sources
//!
//! Where module text comes from. [`HttpSource`] fetches from the dev server
//! (or any static host) with caching disabled so a reload always observes the
//! latest edit.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CACHE_CONTROL, PRAGMA};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid module url: {0}")]
    Url(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server answered HTTP {0}")]
    Status(u16),

    #[error("{0}")]
    Other(String),
}

/// Source-of-truth for module text.
pub trait ModuleSource: Send + Sync + 'static {
    /// Fetch the full text of the module at `path` (relative to the source root).
    fn fetch(&self, path: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

impl<S: ModuleSource> ModuleSource for Arc<S> {
    fn fetch(&self, path: &str) -> impl Future<Output = Result<String, FetchError>> + Send {
        (**self).fetch(path)
    }
}

/// Fetches `GET <base_url>/<path>` bypassing every cache layer.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base: Url,
}

impl HttpSource {
    /// Build a source rooted at `base_url`.
    ///
    /// A missing trailing slash is added so relative joins stay inside the base.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn url_for(&self, path: &str) -> Result<Url, FetchError> {
        Ok(self.base.join(path)?)
    }
}

impl ModuleSource for HttpSource {
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let url = self.url_for(path)?;
        crate::debug!("reload"; "GET {}", url);

        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}
