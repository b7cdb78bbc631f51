//! The renderer contract and its backends.
//!
//! A render pass always runs the same four phases against one
//! [`Transformer`]: background fill, tile layer, overlay objects,
//! attribution banner. The phases are sequenced here; the backends
//! (raster bitmap, SVG document, optional cairo surface) only supply the
//! drawing primitives of the [`Canvas`] contract plus their own
//! attribution text handling.

#[cfg(feature = "cairo")]
pub mod cairo;
pub mod raster;
pub mod svg;

#[cfg(feature = "cairo")]
pub use cairo::CairoRenderer;
pub use raster::RasterRenderer;
pub use svg::{SvgDocument, SvgRenderer};

use std::borrow::Cow;
use std::io::Cursor;

use crate::color::{self, Color};
use crate::geo::PixelPoint;
use crate::objects::Object;
use crate::tiles::TileFetcher;
use crate::transformer::Transformer;
use crate::Result;

/// Whether the cairo backend was compiled in. Callable before
/// constructing a `CairoRenderer`; a pure query, not a mutable flag.
pub fn cairo_is_supported() -> bool {
    cfg!(feature = "cairo")
}

/// Backend-neutral drawing primitives.
///
/// All coordinates are viewport pixels from the active
/// [`Transformer::to_image`] mapping; implementations add the current
/// world offset so the world-duplication pass works identically on every
/// backend.
pub trait Canvas {
    fn transformer(&self) -> &Transformer;

    /// Sets the horizontal world-copy offset applied to all subsequent
    /// drawing calls.
    fn set_world_offset(&mut self, offset: f64);

    fn world_offset(&self) -> f64;

    /// Strokes an open polyline.
    fn draw_polyline(&mut self, points: &[PixelPoint], color: Color, width: f64);

    /// Fills and/or outlines a closed polygon. Transparent colors skip
    /// the respective part.
    fn draw_polygon(&mut self, points: &[PixelPoint], fill: Color, outline: Color, width: f64);

    /// Fills and/or outlines a circle in pixel space.
    fn draw_circle(&mut self, center: PixelPoint, radius: f64, fill: Color, outline: Color, width: f64);

    /// Paints an encoded image (PNG or JPEG bytes) with its top-left
    /// corner at `top_left`. Undecodable bytes are absorbed: the call
    /// logs and draws nothing, since one bad tile must not abort a
    /// render.
    fn draw_image(&mut self, top_left: PixelPoint, data: &[u8], width: f64, height: f64);
}

/// The shared renderer contract: four phases against one transformer.
pub trait Renderer: Canvas {
    /// Fills the whole viewport, if a background color is set.
    fn render_background(&mut self, background: Option<Color>)
    where
        Self: Sized,
    {
        let Some(color) = background else { return };
        let width = f64::from(self.transformer().width());
        let height = f64::from(self.transformer().height());
        let rect = [
            PixelPoint::new(0.0, 0.0),
            PixelPoint::new(width, 0.0),
            PixelPoint::new(width, height),
            PixelPoint::new(0.0, height),
        ];
        self.set_world_offset(0.0);
        self.draw_polygon(&rect, color, color::TRANSPARENT, 0.0);
    }

    /// Draws the tile layer; per-tile failures are absorbed.
    fn render_tiles(&mut self, fetcher: &dyn TileFetcher)
    where
        Self: Sized,
    {
        render_tiles_on(self, fetcher);
    }

    /// Renders every object once per world copy.
    fn render_objects(&mut self, objects: &[Box<dyn Object>])
    where
        Self: Sized,
    {
        render_objects_on(self, objects);
    }

    /// Draws a translucent single-line attribution banner at the bottom
    /// of the viewport; no-op for an empty or absent string.
    fn render_attribution(&mut self, attribution: Option<&str>);
}

/// Runs one complete render pass.
pub(crate) fn render_pass<R: Renderer>(
    renderer: &mut R,
    background: Option<Color>,
    fetcher: Option<&dyn TileFetcher>,
    objects: &[Box<dyn Object>],
    attribution: Option<&str>,
) {
    renderer.render_background(background);
    if let Some(fetcher) = fetcher {
        renderer.render_tiles(fetcher);
    }
    renderer.render_objects(objects);
    renderer.render_attribution(attribution);
}

/// Number of extra world copies needed on each side of the viewport:
/// `ceil(width / (2 * world_width))`. Objects are rendered once per
/// offset in `[-x_count, x_count]`, so content near either horizontal
/// edge appears correctly even when the viewport spans several worlds.
pub fn world_copies(trans: &Transformer) -> i32 {
    (f64::from(trans.width()) / (2.0 * trans.world_width())).ceil() as i32
}

fn render_tiles_on<C: Canvas>(canvas: &mut C, fetcher: &dyn TileFetcher) {
    let trans = canvas.transformer().clone();
    let tile_size = f64::from(trans.tile_size());

    canvas.set_world_offset(0.0);
    for yy in 0..trans.tiles_y() {
        let y = trans.first_tile_y() + yy;
        if !trans.valid_tile_y(y) {
            continue;
        }
        for xx in 0..trans.tiles_x() {
            let x = trans.wrap_tile_x(trans.first_tile_x() + xx);
            match fetcher.fetch(trans.zoom(), x, y as u64) {
                Ok(Some(data)) => {
                    let top_left = PixelPoint::new(
                        xx as f64 * tile_size + trans.tile_offset_x(),
                        yy as f64 * tile_size + trans.tile_offset_y(),
                    );
                    canvas.draw_image(top_left, &data, tile_size, tile_size);
                }
                Ok(None) => {}
                Err(err) => {
                    log::warn!(
                        "skipping tile z={} x={} y={}: {}",
                        trans.zoom(),
                        x,
                        y,
                        err
                    );
                }
            }
        }
    }
}

fn render_objects_on<C: Canvas>(canvas: &mut C, objects: &[Box<dyn Object>]) {
    let x_count = world_copies(canvas.transformer());
    let world_width = canvas.transformer().world_width();
    for object in objects {
        for p in -x_count..=x_count {
            canvas.set_world_offset(f64::from(p) * world_width);
            object.render(canvas);
        }
    }
    canvas.set_world_offset(0.0);
}

/// Shrinks a font size from 9.0 in 0.25 steps until the measured text
/// width fits within `viewport_width - 4` (single line, no wrapping).
pub fn fit_font_size<F: FnMut(f64) -> f64>(viewport_width: f64, mut measure: F) -> f64 {
    let mut size = 9.0;
    while size > 1.0 && measure(size) >= viewport_width - 4.0 {
        size -= 0.25;
    }
    size
}

const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// Passes PNG bytes through untouched; any other decodable raster format
/// is transcoded losslessly through PNG, the one format every backend
/// ingests natively.
pub(crate) fn ensure_png(data: &[u8]) -> Result<Cow<'_, [u8]>> {
    if data.starts_with(&PNG_MAGIC) {
        return Ok(Cow::Borrowed(data));
    }
    let decoded = image::load_from_memory(data)?;
    let mut encoded = Cursor::new(Vec::new());
    decoded.write_to(&mut encoded, image::ImageOutputFormat::Png)?;
    Ok(Cow::Owned(encoded.into_inner()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;

    fn transformer(width: u32, zoom: u8) -> Transformer {
        Transformer::new(width, 600, zoom, GeoPoint::default(), 256).unwrap()
    }

    #[test]
    fn test_world_copies() {
        // zoom 0: world is 256px wide; an 800px viewport needs copies.
        assert_eq!(world_copies(&transformer(800, 0)), 2);
        assert_eq!(world_copies(&transformer(800, 1)), 1);
        // High zoom: world far exceeds the viewport, one copy per side.
        assert_eq!(world_copies(&transformer(800, 12)), 1);
        for zoom in 0..=12u8 {
            let t = transformer(800, zoom);
            let expected = (800.0 / (2.0 * t.world_width())).ceil() as i32;
            assert_eq!(world_copies(&t), expected);
        }
    }

    #[test]
    fn test_fit_font_size() {
        // Fits immediately.
        assert_eq!(fit_font_size(800.0, |size| size * 10.0), 9.0);
        // Shrinks in 0.25 decrements until it fits.
        let fitted = fit_font_size(100.0, |size| size * 20.0);
        assert!(fitted < 9.0);
        assert!(fitted * 20.0 < 100.0 - 4.0);
        assert_eq!((9.0 - fitted) % 0.25, 0.0);
        // Never shrinks below the floor, even if the text cannot fit.
        assert!(fit_font_size(2.0, |_| 1000.0) >= 1.0);
    }

    #[test]
    fn test_ensure_png_passthrough_and_transcode() {
        let mut pixmap = tiny_skia::Pixmap::new(2, 2).unwrap();
        pixmap.fill(tiny_skia::Color::from_rgba8(0, 128, 255, 255));
        let png = pixmap.encode_png().unwrap();
        assert!(matches!(ensure_png(&png).unwrap(), Cow::Borrowed(_)));

        let jpeg = {
            let img = image::RgbImage::from_pixel(2, 2, image::Rgb([10, 20, 30]));
            let mut buf = Cursor::new(Vec::new());
            image::DynamicImage::ImageRgb8(img)
                .write_to(&mut buf, image::ImageOutputFormat::Jpeg(90))
                .unwrap();
            buf.into_inner()
        };
        let converted = ensure_png(&jpeg).unwrap();
        assert!(converted.starts_with(&PNG_MAGIC));

        assert!(ensure_png(&[0xde, 0xad, 0xbe, 0xef]).is_err());
    }
}
