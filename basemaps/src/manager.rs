use crate::{
    config::{ManagerOptions, StyleDeclarations},
    indicators::{self, BASE_MAP},
    io::{Fetch, HttpFetch},
    loader::{self, LoadError},
    policy::{self, Placement},
    registry::Registry,
    renderer::{Renderer, RendererError},
    session::{self, Session},
    style::{Layer, StyleDocument},
};

#[derive(Debug, thiserror::Error)]
pub enum StyleLoadError {
    #[error("Could not load style '{style}': {source}")]
    Load { style: String, source: LoadError },
    #[error("Could not install style '{style}': {source}")]
    Install {
        style: String,
        source: RendererError,
    },
    #[error("Could not install indicator layers: {0}")]
    Indicators(RendererError),
}

/// Loads declared base styles into renderer sessions.
///
/// # Examples
///
/// ```
/// use basemaps::{
///     Documents, ManagerOptions, StyleDeclarations, StyleManager,
///     renderer::{MemoryOptions, MemoryRenderer},
/// };
///
/// # futures::executor::block_on(async {
/// let fetch = Documents::new()
///     .with("streets.json", r#"{"sources": {}, "layers": [{"id": "water", "type": "fill"}]}"#)
///     .with("satellite.json", r#"{"sources": {}, "layers": [{"id": "water", "type": "raster"}]}"#);
///
/// let styles = StyleDeclarations::new()
///     .with_style("streets", "streets.json")
///     .with_style("satellite", "satellite.json");
///
/// let manager = StyleManager::with_fetch(fetch, styles, ManagerOptions::default());
/// let mut session = manager
///     .create_session::<MemoryRenderer>(MemoryOptions::default(), "streets")
///     .await
///     .unwrap();
///
/// assert_eq!(session.visible_layer_ids(), ["streets-water"]);
///
/// session.change_base_style("satellite");
/// assert_eq!(session.visible_layer_ids(), ["satellite-water"]);
/// # });
/// ```
pub struct StyleManager<F = HttpFetch> {
    fetch: F,
    styles: StyleDeclarations,
    options: ManagerOptions,
}

impl StyleManager<HttpFetch> {
    /// Construct new [`StyleManager`] fetching documents over HTTP with default options.
    pub fn new(styles: StyleDeclarations) -> Self {
        Self::with_options(styles, ManagerOptions::default())
    }

    /// Construct new [`StyleManager`] fetching documents over HTTP with supplied options.
    pub fn with_options(styles: StyleDeclarations, options: ManagerOptions) -> Self {
        let fetch = HttpFetch::new(&options.http);
        Self::with_fetch(fetch, styles, options)
    }
}

impl<F: Fetch> StyleManager<F> {
    pub fn with_fetch(fetch: F, styles: StyleDeclarations, options: ManagerOptions) -> Self {
        Self {
            fetch,
            styles,
            options,
        }
    }

    pub fn declared_styles(&self) -> impl Iterator<Item = &str> {
        self.styles.names()
    }

    /// Open a renderer, load all declared styles into it, and show `default_style`.
    ///
    /// Waits for the renderer to become ready, without any timeout. Styles are loaded one
    /// after another, and the first one failing aborts the whole creation.
    pub async fn create_session<R: Renderer>(
        &self,
        renderer_options: R::Options,
        default_style: &str,
    ) -> Result<Session<R>, StyleLoadError> {
        let mut renderer = R::open(renderer_options, self.options.blank_style());
        renderer.ready().await;
        log::debug!("Renderer is ready.");

        indicators::install(&mut renderer).map_err(StyleLoadError::Indicators)?;

        let mut registry = Registry::default();
        for (style, source) in self.styles.iter() {
            let document = loader::load(&self.fetch, style, source)
                .await
                .map_err(|source| StyleLoadError::Load {
                    style: style.to_owned(),
                    source,
                })?;

            install(&mut renderer, &mut registry, style, document).map_err(|source| {
                StyleLoadError::Install {
                    style: style.to_owned(),
                    source,
                }
            })?;
        }

        log::info!(
            "Session created with {} base style(s), showing '{default_style}'.",
            self.styles.len()
        );

        let mut session = Session::new(renderer, registry);
        session.change_base_style(default_style);
        Ok(session)
    }
}

/// Put sources and layers of `document` into the renderer, and record them as owned by `style`.
/// Sources and layers which are already there are left alone.
fn install(
    renderer: &mut impl Renderer,
    registry: &mut Registry,
    style: &str,
    document: StyleDocument,
) -> Result<(), RendererError> {
    registry.register(style);

    for (id, source) in document.sources {
        if renderer.source(&id).is_some() {
            log::debug!("Source '{id}' is already there, skipping.");
            continue;
        }
        renderer.add_source(&id, source)?;
    }

    for layer in document.layers {
        let layer = layer.namespaced(style);
        if !session::is_free(renderer, &layer.id) {
            continue;
        }

        let id = layer.id.clone();
        policy::insert(renderer, layer, &Placement::beneath(BASE_MAP))?;
        registry.record_layer(style, id);
    }

    log::debug!(
        "Installed {} layer(s) of '{style}'.",
        registry.layers_of(style).len()
    );
    Ok(())
}

/// Physical id of layer `id` of base style `style`.
pub fn physical_layer_id(style: &str, id: &str) -> String {
    Layer::physical_id(style, id)
}
