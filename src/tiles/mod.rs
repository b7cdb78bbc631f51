//! Tile providers and tile fetching.
//!
//! The renderer only sees the [`TileFetcher`] seam: fetch bytes for
//! (zoom, x, y) or report the tile absent. The x index arrives
//! pre-wrapped modulo the tile count and y pre-validated in range.
//! [`TileDownloader`] is the stock HTTP implementation; callers may
//! inject their own caching or concurrent fetcher instead.

pub mod downloader;
pub mod provider;

pub use downloader::TileDownloader;
pub use provider::TileProvider;

use crate::Result;

/// Produces encoded tile images. `Ok(None)` means the tile does not
/// exist; errors are absorbed by the renderer, which leaves the cell
/// blank and keeps going.
pub trait TileFetcher {
    fn fetch(&self, zoom: u8, x: u64, y: u64) -> Result<Option<Vec<u8>>>;
}
