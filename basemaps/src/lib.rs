#![doc = include_str!("../README.md")]
#![deny(clippy::unwrap_used, rustdoc::broken_intra_doc_links)]

mod config;
mod indicators;
mod io;
mod loader;
mod manager;
mod order;
mod policy;
mod registry;
pub mod renderer;
mod session;
mod style;
mod visibility;

pub use config::{ManagerOptions, StyleDeclarations, StyleSource};
pub use indicators::{BASE_MAP, INDICATORS, LINE_LAYER, POINT_LAYER, POLYGON_LAYER};
pub use io::{
    Documents, Fetch, HeaderMap, HeaderValue, HttpFetch, HttpOptions, MissingDocument,
};
pub use loader::{FetchError, LoadError, load, merge};
pub use manager::{StyleLoadError, StyleManager, physical_layer_id};
pub use order::{LayerOrder, Stratum};
pub use policy::{Category, Placement};
pub use session::Session;
pub use style::{Layer, ParseError, StyleDocument, Visibility};
