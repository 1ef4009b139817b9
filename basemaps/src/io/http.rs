use std::num::NonZeroUsize;

pub use reqwest::header::{HeaderMap, HeaderValue};

/// Controls how [`crate::HttpFetch`] talks to style servers.
#[derive(Clone, Debug)]
pub struct HttpOptions {
    /// Sent as `User-Agent`. Leave it `None` on wasm, browsers do not let scripts change it.
    pub user_agent: Option<HeaderValue>,

    /// Extra headers sent with every document request, e.g. an API key some providers expect
    /// instead of a query parameter.
    pub headers: HeaderMap,

    /// How many documents of one style may be downloaded at the same time. Style documents are
    /// small and usually come from a handful of hosts, so a few are enough.
    pub max_parallel_downloads: NonZeroUsize,
}

/// `basemaps/<version>` on native targets, nothing on wasm.
fn default_user_agent() -> Option<HeaderValue> {
    if cfg!(target_arch = "wasm32") {
        None
    } else {
        Some(HeaderValue::from_static(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        )))
    }
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            headers: HeaderMap::new(),
            max_parallel_downloads: NonZeroUsize::new(6).unwrap_or(NonZeroUsize::MIN),
        }
    }
}
