use std::fs;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use lru::LruCache;

use crate::tiles::{TileFetcher, TileProvider};
use crate::{Error, Result};

const DEFAULT_CACHE_CAPACITY: usize = 1024;
const DEFAULT_USER_AGENT: &str = concat!(
    "staticmaps-rust/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/PoHsuanLai/staticmaps)"
);

/// Cache key: provider name plus tile coordinate.
type TileKey = (String, u8, u64, u64);

/// Blocking HTTP tile downloader with an in-memory LRU cache and an
/// optional on-disk cache.
///
/// Tiles above the provider's maximum zoom resolve to `Ok(None)`, as
/// do HTTP 404 responses. Any other non-success status is an error.
pub struct TileDownloader {
    client: reqwest::blocking::Client,
    user_agent: String,
    cache: Mutex<LruCache<TileKey, Arc<Vec<u8>>>>,
    cache_dir: Option<PathBuf>,
}

impl TileDownloader {
    /// Create a downloader with the default memory cache capacity
    /// (1024 tiles) and no disk cache.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Create a downloader whose memory cache holds up to `capacity`
    /// tiles.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .unwrap_or(NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap());
        Self {
            client: reqwest::blocking::Client::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cache: Mutex::new(LruCache::new(capacity)),
            cache_dir: None,
        }
    }

    /// Persist downloaded tiles under `dir/{provider}/{z}/{x}/{y}.png`
    /// and serve repeat requests from disk across runs.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Override the User-Agent sent with tile requests. Public tile
    /// servers usually require an identifying agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Fetch one tile from `provider`, consulting the memory cache,
    /// then the disk cache, then the network.
    pub fn get_tile(
        &self,
        provider: &TileProvider,
        zoom: u8,
        x: u64,
        y: u64,
    ) -> Result<Option<Vec<u8>>> {
        if zoom > provider.max_zoom() {
            return Ok(None);
        }

        let key = (provider.name().to_string(), zoom, x, y);
        if let Some(data) = self.cache_get(&key) {
            log::debug!("tile {}/{}/{}/{}: memory cache hit", key.0, zoom, x, y);
            return Ok(Some(data.as_ref().clone()));
        }

        let file = self.tile_path(provider, zoom, x, y);
        if let Some(path) = &file {
            if let Ok(data) = fs::read(path) {
                log::debug!("tile {}/{}/{}/{}: disk cache hit", key.0, zoom, x, y);
                let data = Arc::new(data);
                self.cache_put(key, Arc::clone(&data));
                return Ok(Some(data.as_ref().clone()));
            }
        }

        let url = provider.tile_url(zoom, x, y);
        log::debug!("downloading {url}");
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Error::TileFetch(format!(
                "{url}: status {}",
                response.status()
            )));
        }
        let data = response.bytes()?.to_vec();

        if let Some(path) = &file {
            if let Err(err) = write_tile(path, &data) {
                log::warn!("failed to cache tile at {}: {err}", path.display());
            }
        }
        let data = Arc::new(data);
        self.cache_put(key, Arc::clone(&data));
        Ok(Some(data.as_ref().clone()))
    }

    fn cache_get(&self, key: &TileKey) -> Option<Arc<Vec<u8>>> {
        self.cache.lock().ok()?.get(key).cloned()
    }

    fn cache_put(&self, key: TileKey, data: Arc<Vec<u8>>) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key, data);
        }
    }

    fn tile_path(&self, provider: &TileProvider, zoom: u8, x: u64, y: u64) -> Option<PathBuf> {
        let dir = self.cache_dir.as_ref()?;
        Some(
            dir.join(provider.name())
                .join(zoom.to_string())
                .join(x.to_string())
                .join(format!("{y}.png")),
        )
    }
}

impl Default for TileDownloader {
    fn default() -> Self {
        Self::new()
    }
}

fn write_tile(path: &std::path::Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, data)
}

/// Binds a downloader to one provider so the renderer can fetch tiles
/// through the [`TileFetcher`] seam without knowing about providers.
pub(crate) struct ProviderFetcher<'a> {
    pub downloader: &'a TileDownloader,
    pub provider: &'a TileProvider,
}

impl TileFetcher for ProviderFetcher<'_> {
    fn fetch(&self, zoom: u8, x: u64, y: u64) -> Result<Option<Vec<u8>>> {
        self.downloader.get_tile(self.provider, zoom, x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_cache_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "staticmaps-test-{tag}-{}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_zoom_beyond_provider_max_is_absent() {
        let downloader = TileDownloader::new();
        let osm = TileProvider::open_street_map();
        let tile = downloader.get_tile(&osm, osm.max_zoom() + 1, 0, 0).unwrap();
        assert!(tile.is_none());
    }

    #[test]
    fn test_disk_cache_hit_skips_network() {
        let dir = temp_cache_dir("disk");
        let osm = TileProvider::open_street_map();
        let downloader = TileDownloader::new().with_cache_dir(&dir);

        let path = downloader.tile_path(&osm, 3, 2, 1).unwrap();
        write_tile(&path, b"tile-bytes").unwrap();

        // Served from disk; no request leaves the process.
        let tile = downloader.get_tile(&osm, 3, 2, 1).unwrap().unwrap();
        assert_eq!(tile, b"tile-bytes");

        // Disk hits prime the memory cache.
        fs::remove_file(&path).unwrap();
        let tile = downloader.get_tile(&osm, 3, 2, 1).unwrap().unwrap();
        assert_eq!(tile, b"tile-bytes");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_cache_keys_are_per_provider() {
        let dir = temp_cache_dir("providers");
        let downloader = TileDownloader::new().with_cache_dir(&dir);
        let osm = TileProvider::open_street_map();
        let dark = TileProvider::carto_dark();

        let osm_path = downloader.tile_path(&osm, 1, 0, 0).unwrap();
        let dark_path = downloader.tile_path(&dark, 1, 0, 0).unwrap();
        assert_ne!(osm_path, dark_path);

        write_tile(&osm_path, b"osm").unwrap();
        let tile = downloader.get_tile(&osm, 1, 0, 0).unwrap().unwrap();
        assert_eq!(tile, b"osm");

        fs::remove_dir_all(&dir).unwrap();
    }
}
