//! Map renderer a [`crate::Session`] drives. Modeled after MapLibre's `Map` object, but only the
//! operations a session actually needs.

mod memory;

pub use memory::{MemoryOptions, MemoryRenderer, ReadyHandle};

use serde_json::Value;

use crate::style::{Layer, StyleDocument, Visibility};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RendererError {
    #[error("Layer '{0}' already exists.")]
    DuplicateLayer(String),
    #[error("Source '{0}' already exists.")]
    DuplicateSource(String),
    #[error("Layer '{0}' to insert before does not exist.")]
    UnknownAnchor(String),
    #[error("Layer '{0}' does not exist.")]
    UnknownLayer(String),
    #[error("Layer '{0}' is managed by the session and cannot be removed.")]
    ProtectedLayer(String),
}

pub trait Renderer {
    /// Whatever the renderer needs to be created, such as the container it draws into.
    type Options;

    /// Create the renderer, initially showing `style`.
    fn open(options: Self::Options, style: StyleDocument) -> Self
    where
        Self: Sized;

    /// Resolves once the renderer finished loading its initial style. Called exactly once.
    fn ready(&mut self) -> impl Future<Output = ()>;

    fn add_source(&mut self, id: &str, source: Value) -> Result<(), RendererError>;

    fn source(&self, id: &str) -> Option<Value>;

    /// Insert `layer` directly beneath `before`, or on top of all layers if `before` is `None`.
    fn add_layer(&mut self, layer: Layer, before: Option<&str>) -> Result<(), RendererError>;

    fn layer(&self, id: &str) -> Option<Layer>;

    fn remove_layer(&mut self, id: &str) -> Result<(), RendererError>;

    fn set_layer_visibility(
        &mut self,
        id: &str,
        visibility: Visibility,
    ) -> Result<(), RendererError>;

    /// Snapshot of the current style, layers ordered bottom to top.
    fn style(&self) -> StyleDocument;
}
