//! Retrieval of raw style documents.

use std::collections::HashMap;

use bytes::Bytes;
use reqwest::header::USER_AGENT;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};

use super::http::{HeaderMap, HeaderValue, HttpOptions};

/// Source of style document payloads, addressed by URL.
pub trait Fetch {
    type Error: std::error::Error + Sync + Send;

    #[cfg(target_arch = "wasm32")]
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Bytes, Self::Error>>;

    #[cfg(not(target_arch = "wasm32"))]
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Bytes, Self::Error>> + Send;

    /// How many fetches of a single style may run concurrently.
    fn max_concurrency(&self) -> usize;
}

/// Fetches documents over HTTP.
pub struct HttpFetch {
    client: ClientWithMiddleware,
    user_agent: Option<HeaderValue>,
    headers: HeaderMap,
    max_parallel_downloads: usize,
}

impl HttpFetch {
    pub fn new(http_options: &HttpOptions) -> Self {
        Self {
            client: ClientBuilder::new(reqwest::Client::new()).build(),
            user_agent: http_options.user_agent.clone(),
            headers: http_options.headers.clone(),
            max_parallel_downloads: http_options.max_parallel_downloads.get(),
        }
    }
}

impl Fetch for HttpFetch {
    type Error = reqwest_middleware::Error;

    #[cfg(target_arch = "wasm32")]
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Bytes, Self::Error>> {
        self.get(url)
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Bytes, Self::Error>> + Send {
        self.get(url)
    }

    fn max_concurrency(&self) -> usize {
        self.max_parallel_downloads
    }
}

impl HttpFetch {
    async fn get(&self, url: &str) -> Result<Bytes, reqwest_middleware::Error> {
        let mut request = self.client.get(url).headers(self.headers.clone());
        if let Some(user_agent) = &self.user_agent {
            request = request.header(USER_AGENT, user_agent.clone());
        }

        let response = request.send().await?;
        log::debug!("Fetched '{url}': {}.", response.status());

        Ok(response.error_for_status()?.bytes().await?)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("There is no document at '{0}'.")]
pub struct MissingDocument(String);

/// Documents kept in memory, e.g. bundled with the application.
#[derive(Clone, Debug, Default)]
pub struct Documents {
    documents: HashMap<String, Bytes>,
}

impl Documents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        self.insert(url, payload);
        self
    }

    pub fn insert(&mut self, url: impl Into<String>, payload: impl Into<Bytes>) {
        self.documents.insert(url.into(), payload.into());
    }
}

impl Fetch for Documents {
    type Error = MissingDocument;

    fn fetch(&self, url: &str) -> impl Future<Output = Result<Bytes, Self::Error>> + Send {
        futures::future::ready(
            self.documents
                .get(url)
                .cloned()
                .ok_or_else(|| MissingDocument(url.to_owned())),
        )
    }

    fn max_concurrency(&self) -> usize {
        self.documents.len().max(1)
    }
}
