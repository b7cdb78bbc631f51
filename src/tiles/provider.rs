/// A slippy-map tile server: URL pattern, shard subdomains, attribution
/// text, tile size and maximum zoom.
#[derive(Debug, Clone)]
pub struct TileProvider {
    name: String,
    url_pattern: String,
    shards: Vec<String>,
    attribution: Option<String>,
    tile_size: u32,
    max_zoom: u8,
}

impl TileProvider {
    /// Creates a custom provider. The URL pattern uses `{z}`, `{x}`,
    /// `{y}` placeholders plus optional `{s}` for a shard subdomain.
    pub fn new(
        name: impl Into<String>,
        url_pattern: impl Into<String>,
        shards: Vec<String>,
        attribution: Option<String>,
        tile_size: u32,
        max_zoom: u8,
    ) -> Self {
        Self {
            name: name.into(),
            url_pattern: url_pattern.into(),
            shards,
            attribution,
            tile_size,
            max_zoom,
        }
    }

    pub fn open_street_map() -> Self {
        Self::new(
            "osm",
            "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
            vec!["a".into(), "b".into(), "c".into()],
            Some("Maps & Data (C) openstreetmap.org and contributors".into()),
            256,
            19,
        )
    }

    pub fn carto_dark() -> Self {
        Self::new(
            "carto-dark",
            "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}.png",
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            Some("Maps (C) CARTO (C) OpenStreetMap contributors".into()),
            256,
            20,
        )
    }

    pub fn carto_positron() -> Self {
        Self::new(
            "carto-positron",
            "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}.png",
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            Some("Maps (C) CARTO (C) OpenStreetMap contributors".into()),
            256,
            20,
        )
    }

    pub fn arcgis_world_imagery() -> Self {
        Self::new(
            "arcgis-worldimagery",
            "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
            vec![],
            Some("Source: Esri, Maxar, Earthstar Geographics, and the GIS User Community".into()),
            256,
            18,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribution(&self) -> Option<&str> {
        self.attribution.as_deref()
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn max_zoom(&self) -> u8 {
        self.max_zoom
    }

    /// Builds the URL for one tile, picking a shard from (x + y) like a
    /// browser map client would, so neighboring tiles spread across
    /// subdomains.
    pub fn tile_url(&self, zoom: u8, x: u64, y: u64) -> String {
        let mut url = self
            .url_pattern
            .replace("{z}", &zoom.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string());
        if url.contains("{s}") {
            let shard = if self.shards.is_empty() {
                String::new()
            } else {
                self.shards[((x + y) % self.shards.len() as u64) as usize].clone()
            };
            url = url.replace("{s}", &shard);
        }
        url
    }
}
