mod fetch;
pub mod http;

pub use fetch::{Documents, Fetch, HttpFetch, MissingDocument};
pub use http::{HeaderMap, HeaderValue, HttpOptions};
