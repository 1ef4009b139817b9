use futures::channel::oneshot;
use serde_json::Value;

use super::{Renderer, RendererError};
use crate::style::{Layer, StyleDocument, Visibility};

/// Options of the [`MemoryRenderer`].
#[derive(Debug, Default)]
pub struct MemoryOptions {
    ready: Option<oneshot::Receiver<()>>,
}

impl MemoryOptions {
    /// Renderer created with these options reports ready only after [`ReadyHandle::signal`].
    pub fn deferred() -> (Self, ReadyHandle) {
        let (tx, rx) = oneshot::channel();
        (Self { ready: Some(rx) }, ReadyHandle(tx))
    }
}

/// Lets the owner decide when a [`MemoryRenderer`] becomes ready.
#[derive(Debug)]
pub struct ReadyHandle(oneshot::Sender<()>);

impl ReadyHandle {
    pub fn signal(self) {
        // Renderer might be gone already, nothing to do in this case.
        let _ = self.0.send(());
    }
}

/// Renderer which keeps the style in memory and does not draw anything. Useful for headless
/// sessions, and for testing.
#[derive(Debug)]
pub struct MemoryRenderer {
    style: StyleDocument,
    ready: Option<oneshot::Receiver<()>>,
}

impl MemoryRenderer {
    /// Renderer which is ready right away.
    pub fn with_style(style: StyleDocument) -> Self {
        Self::open(MemoryOptions::default(), style)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.style.layers.iter().position(|layer| layer.id == id)
    }
}

impl Renderer for MemoryRenderer {
    type Options = MemoryOptions;

    fn open(options: MemoryOptions, style: StyleDocument) -> Self {
        Self {
            style,
            ready: options.ready,
        }
    }

    fn ready(&mut self) -> impl Future<Output = ()> {
        let ready = self.ready.take();
        async move {
            if let Some(ready) = ready
                && ready.await.is_err()
            {
                log::warn!("Ready signal was dropped, the renderer will never become ready.");
                futures::future::pending::<()>().await;
            }
        }
    }

    fn add_source(&mut self, id: &str, source: Value) -> Result<(), RendererError> {
        if self.style.sources.contains_key(id) {
            return Err(RendererError::DuplicateSource(id.to_owned()));
        }
        self.style.sources.insert(id.to_owned(), source);
        Ok(())
    }

    fn source(&self, id: &str) -> Option<Value> {
        self.style.sources.get(id).cloned()
    }

    fn add_layer(&mut self, layer: Layer, before: Option<&str>) -> Result<(), RendererError> {
        if self.position(&layer.id).is_some() {
            return Err(RendererError::DuplicateLayer(layer.id));
        }

        match before {
            Some(before) => {
                let index = self
                    .position(before)
                    .ok_or_else(|| RendererError::UnknownAnchor(before.to_owned()))?;
                self.style.layers.insert(index, layer);
            }
            None => self.style.layers.push(layer),
        }

        Ok(())
    }

    fn layer(&self, id: &str) -> Option<Layer> {
        self.position(id).map(|index| self.style.layers[index].clone())
    }

    fn remove_layer(&mut self, id: &str) -> Result<(), RendererError> {
        let index = self
            .position(id)
            .ok_or_else(|| RendererError::UnknownLayer(id.to_owned()))?;
        self.style.layers.remove(index);
        Ok(())
    }

    fn set_layer_visibility(
        &mut self,
        id: &str,
        visibility: Visibility,
    ) -> Result<(), RendererError> {
        let layer = self
            .style
            .layers
            .iter_mut()
            .find(|layer| layer.id == id)
            .ok_or_else(|| RendererError::UnknownLayer(id.to_owned()))?;
        layer.set_visibility(visibility);
        Ok(())
    }

    fn style(&self) -> StyleDocument {
        self.style.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt as _;
    use serde_json::json;

    fn ids(renderer: &MemoryRenderer) -> Vec<String> {
        renderer.style().layers.into_iter().map(|l| l.id).collect()
    }

    #[test]
    fn layers_are_inserted_before_anchor() {
        let mut renderer = MemoryRenderer::with_style(StyleDocument::default());
        renderer.add_layer(Layer::new("top", "fill"), None).unwrap();
        renderer.add_layer(Layer::new("a", "fill"), Some("top")).unwrap();
        renderer.add_layer(Layer::new("b", "fill"), Some("top")).unwrap();
        renderer.add_layer(Layer::new("c", "fill"), Some("a")).unwrap();

        assert_eq!(ids(&renderer), ["c", "a", "b", "top"]);
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut renderer = MemoryRenderer::with_style(StyleDocument::default());
        renderer.add_layer(Layer::new("a", "fill"), None).unwrap();
        renderer.add_source("s", json!({})).unwrap();

        assert_eq!(
            renderer.add_layer(Layer::new("a", "line"), None),
            Err(RendererError::DuplicateLayer("a".to_owned()))
        );
        assert_eq!(
            renderer.add_source("s", json!({"other": true})),
            Err(RendererError::DuplicateSource("s".to_owned()))
        );
        assert_eq!(renderer.source("s"), Some(json!({})));
    }

    #[test]
    fn missing_layers_are_reported() {
        let mut renderer = MemoryRenderer::with_style(StyleDocument::default());

        assert_eq!(
            renderer.set_layer_visibility("a", Visibility::Hidden),
            Err(RendererError::UnknownLayer("a".to_owned()))
        );
        assert_eq!(
            renderer.remove_layer("a"),
            Err(RendererError::UnknownLayer("a".to_owned()))
        );
    }

    #[test]
    fn ready_right_away_by_default() {
        let mut renderer = MemoryRenderer::with_style(StyleDocument::default());
        assert!(renderer.ready().now_or_never().is_some());
    }

    #[test]
    fn deferred_ready_waits_for_signal() {
        let (options, handle) = MemoryOptions::deferred();
        let mut renderer = MemoryRenderer::open(options, StyleDocument::default());

        let mut ready = Box::pin(renderer.ready());
        assert!((&mut ready).now_or_never().is_none());

        handle.signal();
        assert!(ready.now_or_never().is_some());
    }
}
