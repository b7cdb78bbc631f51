//! # staticmaps
//!
//! Create static map images from tile imagery and vector overlays.
//!
//! A [`Context`] collects overlay objects (markers, lines, areas, geodesic
//! circles), picks a tile provider, and renders everything to a raster
//! image, an SVG document, or (with the `cairo` feature) a cairo surface.
//! The projection work — Web Mercator, automatic zoom selection, tile
//! addressing with horizontal world wrap — lives in [`Transformer`].
//!
//! ```no_run
//! use staticmaps::{Context, GeoPoint, Marker, TileProvider};
//!
//! let mut ctx = Context::new();
//! ctx.set_tile_provider(TileProvider::open_street_map());
//! ctx.add_object(Marker::new(GeoPoint::normalized(48.13, 11.57)));
//! let image = ctx.render_raster(800, 500)?;
//! image.save_png("munich.png").unwrap();
//! # Ok::<(), staticmaps::Error>(())
//! ```

pub mod color;
pub mod context;
pub mod geo;
pub mod objects;
pub mod render;
pub mod tiles;
pub mod transformer;

// Re-export public API
pub use color::Color;
pub use context::Context;
pub use geo::{BoundingRegion, GeoPoint, PixelPoint};
pub use objects::{Area, Circle, ImageMarker, Line, Marker, Object, PixelBounds};
pub use render::{cairo_is_supported, Renderer, SvgDocument};
pub use tiles::{TileDownloader, TileFetcher, TileProvider};
pub use transformer::Transformer;

#[cfg(feature = "cairo")]
pub use render::cairo::CairoRenderer;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cairo backend is unavailable; build with the `cairo` feature")]
    CairoUnavailable,

    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("invalid color: {0}")]
    InvalidColor(String),

    #[error("invalid object: {0}")]
    InvalidObject(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("tile fetch failed: {0}")]
    TileFetch(String),

    #[error("decode error: {0}")]
    Decode(#[from] image::error::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}
