//! The map context: collects objects and settings, then renders.

use crate::geo::{BoundingRegion, GeoPoint};
use crate::objects::{Object, PixelBounds};
use crate::render::{render_pass, RasterRenderer, Renderer, SvgDocument, SvgRenderer};
use crate::tiles::downloader::ProviderFetcher;
use crate::tiles::{TileDownloader, TileFetcher, TileProvider};
use crate::transformer::Transformer;
use crate::{Color, Error, Result};

/// Tile edge length assumed when no provider is configured.
pub const DEFAULT_TILE_SIZE: u32 = 256;
/// Zoom ceiling when no provider sets its own.
pub const DEFAULT_MAX_ZOOM: u8 = 19;

/// Accumulates map objects and render settings, then produces images.
///
/// A context starts without a tile provider; maps render offline on a
/// plain background until [`set_tile_provider`](Self::set_tile_provider)
/// is called. The context itself holds no projection state: a fresh
/// [`Transformer`] is derived for every render call.
///
/// ```no_run
/// use staticmaps::{Context, GeoPoint, Marker, TileProvider};
///
/// let mut ctx = Context::new();
/// ctx.set_tile_provider(TileProvider::open_street_map());
/// ctx.add_object(Marker::new(GeoPoint::new(48.0, 8.0)?));
/// let pixmap = ctx.render_raster(800, 500)?;
/// pixmap.save_png("marker.png")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Context {
    objects: Vec<Box<dyn Object>>,
    tile_provider: Option<TileProvider>,
    downloader: TileDownloader,
    background_color: Option<Color>,
    center: Option<GeoPoint>,
    zoom: Option<u8>,
    tighten_to_bounds: bool,
}

impl Context {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            tile_provider: None,
            downloader: TileDownloader::new(),
            background_color: None,
            center: None,
            zoom: None,
            tighten_to_bounds: false,
        }
    }

    /// Render map tiles from `provider` underneath the objects.
    pub fn set_tile_provider(&mut self, provider: TileProvider) {
        self.tile_provider = Some(provider);
    }

    /// Replace the default tile downloader, e.g. to add a disk cache
    /// or a custom User-Agent.
    pub fn set_tile_downloader(&mut self, downloader: TileDownloader) {
        self.downloader = downloader;
    }

    /// Fill the image with `color` before tiles and objects are drawn.
    pub fn set_background_color(&mut self, color: Color) {
        self.background_color = Some(color);
    }

    /// Pin the map center instead of deriving it from the objects.
    pub fn set_center(&mut self, center: GeoPoint) {
        self.center = Some(center);
    }

    /// Pin the zoom level instead of fitting it to the objects. Values
    /// above the provider's maximum are clamped at render time.
    pub fn set_zoom(&mut self, zoom: u8) {
        self.zoom = Some(zoom);
    }

    /// Shrink the image to the object bounds (plus margins) when the
    /// auto-fitted zoom leaves slack; the image never grows beyond the
    /// requested size.
    pub fn set_tighten_to_bounds(&mut self, tighten: bool) {
        self.tighten_to_bounds = tighten;
    }

    pub fn add_object<O: Object + 'static>(&mut self, object: O) {
        self.objects.push(Box::new(object));
    }

    /// Geographic extent of all added objects, or `None` when empty.
    pub fn object_bounds(&self) -> Option<BoundingRegion> {
        let mut objects = self.objects.iter();
        let mut region = objects.next()?.bounds();
        for object in objects {
            region = region.union(&object.bounds());
        }
        Some(region)
    }

    /// Resolve the center and zoom a render at `width` x `height` will
    /// use: explicit settings win, the rest is fitted to the objects.
    pub fn determine_center_zoom(&self, width: u32, height: u32) -> Result<(GeoPoint, u8)> {
        let max_zoom = self.max_zoom();
        if let (Some(center), Some(zoom)) = (self.center, self.zoom) {
            return Ok((center, zoom.min(max_zoom)));
        }
        let region = self.object_bounds().ok_or_else(|| {
            Error::Render(
                "cannot determine center and zoom: set them explicitly or add objects"
                    .to_string(),
            )
        })?;
        let center = self.center.unwrap_or_else(|| region.center());
        let zoom = match self.zoom {
            Some(zoom) => zoom.min(max_zoom),
            None => Transformer::find_zoom(
                width,
                height,
                self.tile_size(),
                max_zoom,
                &region,
                &self.extra_margins(),
            ),
        };
        Ok((center, zoom))
    }

    /// Render to an RGBA bitmap.
    pub fn render_raster(&self, width: u32, height: u32) -> Result<tiny_skia::Pixmap> {
        let trans = self.prepare(width, height)?;
        let mut renderer = RasterRenderer::new(&trans)?;
        self.run(&mut renderer);
        Ok(renderer.into_pixmap())
    }

    /// Render to an SVG document.
    pub fn render_svg(&self, width: u32, height: u32) -> Result<SvgDocument> {
        let trans = self.prepare(width, height)?;
        let mut renderer = SvgRenderer::new(&trans);
        self.run(&mut renderer);
        Ok(renderer.into_document())
    }

    /// Render to a cairo image surface. Only available with the
    /// `cairo` feature; check [`crate::cairo_is_supported`] first.
    #[cfg(feature = "cairo")]
    pub fn render_cairo(&self, width: u32, height: u32) -> Result<::cairo::ImageSurface> {
        let trans = self.prepare(width, height)?;
        let mut renderer = crate::render::CairoRenderer::new(&trans)?;
        self.run(&mut renderer);
        Ok(renderer.into_surface())
    }

    fn run<R: Renderer>(&self, renderer: &mut R) {
        let fetcher = self.tile_provider.as_ref().map(|provider| ProviderFetcher {
            downloader: &self.downloader,
            provider,
        });
        let attribution = self
            .tile_provider
            .as_ref()
            .and_then(TileProvider::attribution);
        render_pass(
            renderer,
            self.background_color,
            fetcher.as_ref().map(|f| f as &dyn TileFetcher),
            &self.objects,
            attribution,
        );
    }

    fn prepare(&self, width: u32, height: u32) -> Result<Transformer> {
        let (center, zoom) = self.determine_center_zoom(width, height)?;
        let tile_size = self.tile_size();
        if self.tighten_to_bounds {
            if let Some(region) = self.object_bounds() {
                let (w, h) =
                    Transformer::tightened_size(tile_size, zoom, &region, &self.extra_margins());
                return Transformer::new(
                    w.min(width),
                    h.min(height),
                    zoom,
                    region.center(),
                    tile_size,
                );
            }
        }
        Transformer::new(width, height, zoom, center, tile_size)
    }

    fn extra_margins(&self) -> PixelBounds {
        self.objects
            .iter()
            .fold(PixelBounds::ZERO, |acc, object| {
                acc.union(&object.extra_pixel_bounds())
            })
    }

    fn tile_size(&self) -> u32 {
        self.tile_provider
            .as_ref()
            .map_or(DEFAULT_TILE_SIZE, TileProvider::tile_size)
    }

    fn max_zoom(&self) -> u8 {
        self.tile_provider
            .as_ref()
            .map_or(DEFAULT_MAX_ZOOM, TileProvider::max_zoom)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
