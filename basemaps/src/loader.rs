//! Fetching and merging the documents a base style is made of.

use futures::{StreamExt as _, TryStreamExt as _};

use crate::{
    config::StyleSource,
    io::Fetch,
    style::{ParseError, StyleDocument},
};

#[derive(Debug, thiserror::Error)]
#[error("Could not fetch '{url}': {message}")]
pub struct FetchError {
    pub url: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

async fn fetch_document(fetch: &impl Fetch, url: &str) -> Result<StyleDocument, LoadError> {
    let payload = fetch.fetch(url).await.map_err(|error| FetchError {
        url: url.to_owned(),
        message: error.to_string(),
    })?;
    Ok(StyleDocument::from_slice(url, &payload)?)
}

/// Fetch all documents of `style` and merge them into one. Documents are fetched concurrently,
/// but merged in the order of `source`. Fails as soon as any of them fails.
pub async fn load(
    fetch: &impl Fetch,
    style: &str,
    source: &StyleSource,
) -> Result<StyleDocument, LoadError> {
    let urls = source.urls();
    log::debug!("Loading '{style}' from {} document(s).", urls.len());

    let documents: Vec<StyleDocument> = futures::stream::iter(urls)
        .map(|url| fetch_document(fetch, url))
        .buffered(fetch.max_concurrency().max(1))
        .try_collect()
        .await?;

    Ok(merge(documents))
}

/// Merge documents in order. Layers are concatenated, and later sources win on id collisions.
pub fn merge(documents: impl IntoIterator<Item = StyleDocument>) -> StyleDocument {
    let mut documents = documents.into_iter();
    let Some(mut merged) = documents.next() else {
        return StyleDocument::default();
    };
    for document in documents {
        merged.merge(document);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{Documents, HttpFetch, HttpOptions};
    use hypermocker::{Mock, StatusCode};
    use serde_json::json;
    use std::time::Duration;

    fn document(source: &str, layers: &[&str]) -> String {
        let mut sources = serde_json::Map::new();
        sources.insert(
            source.to_owned(),
            json!({"type": "vector", "url": format!("https://tiles/{source}")}),
        );
        json!({
            "version": 8,
            "sources": sources,
            "layers": layers
                .iter()
                .map(|id| json!({"id": id, "type": "fill", "source": source}))
                .collect::<Vec<_>>()
        })
        .to_string()
    }

    fn layer_ids(document: &StyleDocument) -> Vec<&str> {
        document.layers.iter().map(|l| l.id.as_str()).collect()
    }

    #[test]
    fn merging_nothing_gives_empty_document() {
        let merged = merge(Vec::new());
        assert!(merged.layers.is_empty());
        assert!(merged.sources.is_empty());
    }

    #[tokio::test]
    async fn single_document_from_memory() {
        let _ = env_logger::try_init();

        let fetch = Documents::new().with("a.json", document("a", &["water", "roads"]));

        let loaded = load(&fetch, "a", &"a.json".into()).await.unwrap();

        assert_eq!(layer_ids(&loaded), ["water", "roads"]);
        assert!(loaded.sources.contains_key("a"));
    }

    #[tokio::test]
    async fn missing_document_is_a_fetch_error() {
        let _ = env_logger::try_init();

        let fetch = Documents::new().with("a.json", document("a", &["water"]));
        let source = StyleSource::from(["a.json", "b.json"]);

        let result = load(&fetch, "a", &source).await;

        assert!(matches!(result, Err(LoadError::Fetch(FetchError { url, .. })) if url == "b.json"));
    }

    #[tokio::test]
    async fn download_single_document() {
        let _ = env_logger::try_init();

        let mock = Mock::bind().await;
        let expectation = mock.expect("/streets.json").await;
        let fetch = HttpFetch::new(&HttpOptions::default());
        let source = StyleSource::from(mock.url("/streets.json"));

        let (loaded, ()) = futures::join!(load(&fetch, "streets", &source), async {
            expectation.respond(document("osm", &["water"])).await;
        });

        assert_eq!(layer_ids(&loaded.unwrap()), ["water"]);
        assert_eq!(
            mock.received_user_agents(),
            [Some(concat!("basemaps/", env!("CARGO_PKG_VERSION")).to_owned())]
        );
    }

    #[tokio::test]
    async fn custom_user_agent_header() {
        let _ = env_logger::try_init();

        let mock = Mock::bind().await;
        let expectation = mock.expect("/streets.json").await;
        let fetch = HttpFetch::new(&HttpOptions {
            user_agent: Some(crate::HeaderValue::from_static("MyApp")),
            ..Default::default()
        });
        let source = StyleSource::from(mock.url("/streets.json"));

        let (loaded, ()) = futures::join!(load(&fetch, "streets", &source), async {
            expectation.respond(document("osm", &[])).await;
        });

        assert!(loaded.is_ok());
        assert_eq!(mock.received_user_agents(), [Some("MyApp".to_owned())]);
    }

    #[tokio::test]
    async fn configured_headers_are_sent() {
        let _ = env_logger::try_init();

        let mock = Mock::bind().await;
        let expectation = mock.expect("/streets.json").await;
        let mut options = HttpOptions::default();
        options
            .headers
            .insert("x-api-key", crate::HeaderValue::from_static("secret"));
        let fetch = HttpFetch::new(&options);
        let source = StyleSource::from(mock.url("/streets.json"));

        let (loaded, ()) = futures::join!(load(&fetch, "streets", &source), async {
            expectation.respond(document("osm", &[])).await;
        });

        assert!(loaded.is_ok());
        let received = mock.received_headers();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0]["x-api-key"], "secret");
    }

    #[tokio::test]
    async fn documents_are_merged_in_declared_order_not_completion_order() {
        let _ = env_logger::try_init();

        let mock = Mock::bind().await;
        let first = mock.expect("/base.json").await;
        let second = mock.expect("/labels.json").await;
        let fetch = HttpFetch::new(&HttpOptions::default());
        let source = StyleSource::from(vec![mock.url("/base.json"), mock.url("/labels.json")]);

        let (loaded, ()) = futures::join!(load(&fetch, "b", &source), async {
            second
                .respond(
                    json!({
                        "sources": {"shared": {"from": "labels"}},
                        "layers": [{"id": "names", "type": "symbol"}]
                    })
                    .to_string(),
                )
                .await;
            tokio::time::sleep(Duration::from_millis(100)).await;
            first
                .respond(
                    json!({
                        "sources": {"shared": {"from": "base"}, "imagery": {}},
                        "layers": [{"id": "land", "type": "fill"}, {"id": "sea", "type": "fill"}]
                    })
                    .to_string(),
                )
                .await;
        });

        let loaded = loaded.unwrap();
        assert_eq!(layer_ids(&loaded), ["land", "sea", "names"]);
        assert_eq!(loaded.sources["shared"], json!({"from": "labels"}));
        assert!(loaded.sources.contains_key("imagery"));
    }

    #[tokio::test]
    async fn http_error_status_fails_the_whole_style() {
        let _ = env_logger::try_init();

        let mock = Mock::bind().await;
        let first = mock.expect("/base.json").await;
        let second = mock.expect("/labels.json").await;
        let fetch = HttpFetch::new(&HttpOptions::default());
        let source = StyleSource::from(vec![mock.url("/base.json"), mock.url("/labels.json")]);

        let (loaded, ()) = futures::join!(load(&fetch, "b", &source), async {
            first.respond(document("osm", &["land"])).await;
            second.respond_with_status(StatusCode::NOT_FOUND).await;
        });

        assert!(matches!(loaded, Err(LoadError::Fetch(FetchError { url, .. })) if url.ends_with("/labels.json")));
    }

    #[tokio::test]
    async fn garbage_is_a_parse_error() {
        let _ = env_logger::try_init();

        let mock = Mock::bind().await;
        let expectation = mock.expect("/streets.json").await;
        let fetch = HttpFetch::new(&HttpOptions::default());
        let source = StyleSource::from(mock.url("/streets.json"));

        let (loaded, ()) = futures::join!(load(&fetch, "streets", &source), async {
            expectation.respond("definitely not a style").await;
        });

        assert!(matches!(loaded, Err(LoadError::Parse(ParseError::Json { .. }))));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_fetch_error() {
        let _ = env_logger::try_init();

        let fetch = HttpFetch::new(&HttpOptions::default());
        let source = StyleSource::from("totally invalid url");

        let result = load(&fetch, "streets", &source).await;

        assert!(matches!(result, Err(LoadError::Fetch(_))));
    }
}
