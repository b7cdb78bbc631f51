use std::path::Path;

use crate::geo::{BoundingRegion, GeoPoint, PixelPoint};
use crate::objects::{Object, PixelBounds};
use crate::render::Canvas;
use crate::Result;

/// A raster icon anchored at a geographic position.
///
/// `origin_x`/`origin_y` give the anchor pixel inside the image: the
/// projected position ends up under that pixel, so an icon whose tip is
/// at (27, 35) is placed with `origin_x = 27, origin_y = 35`.
#[derive(Debug, Clone)]
pub struct ImageMarker {
    position: GeoPoint,
    data: Vec<u8>,
    width: u32,
    height: u32,
    origin_x: f64,
    origin_y: f64,
}

impl ImageMarker {
    /// Creates an image marker from encoded image bytes (PNG or JPEG).
    pub fn new(position: GeoPoint, data: Vec<u8>, origin_x: f64, origin_y: f64) -> Result<Self> {
        let decoded = image::load_from_memory(&data)?;
        Ok(Self {
            position,
            width: decoded.width(),
            height: decoded.height(),
            data,
            origin_x,
            origin_y,
        })
    }

    /// Creates an image marker by loading an image file.
    pub fn from_path<P: AsRef<Path>>(
        position: GeoPoint,
        path: P,
        origin_x: f64,
        origin_y: f64,
    ) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::new(position, data, origin_x, origin_y)
    }

    pub fn position(&self) -> GeoPoint {
        self.position
    }

    pub fn image_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Object for ImageMarker {
    fn bounds(&self) -> BoundingRegion {
        BoundingRegion::from_point(self.position)
    }

    fn extra_pixel_bounds(&self) -> PixelBounds {
        PixelBounds::new(
            self.origin_x.max(0.0),
            self.origin_y.max(0.0),
            (f64::from(self.width) - self.origin_x).max(0.0),
            (f64::from(self.height) - self.origin_y).max(0.0),
        )
    }

    fn render(&self, canvas: &mut dyn Canvas) {
        let anchor = canvas.transformer().to_image(self.position);
        let top_left = PixelPoint::new(anchor.x - self.origin_x, anchor.y - self.origin_y);
        canvas.draw_image(
            top_left,
            &self.data,
            f64::from(self.width),
            f64::from(self.height),
        );
    }
}
