use std::f64::consts::PI;

use crate::geo::{BoundingRegion, GeoPoint, PixelPoint, MAX_LATITUDE};
use crate::objects::PixelBounds;
use crate::{Error, Result};

/// Hard upper bound on zoom; beyond this the world width no longer fits
/// comfortably in f64 pixel arithmetic. Providers cap far lower.
pub const MAX_ZOOM: u8 = 30;

/// The projection and tile-addressing state for one render call.
///
/// Maps between geographic coordinates, the unbounded projected pixel
/// plane, and viewport (image) coordinates, and keeps the tile-grid
/// bookkeeping for the tile layer. Immutable once constructed; a fresh
/// one is built per render.
#[derive(Debug, Clone)]
pub struct Transformer {
    width: u32,
    height: u32,
    zoom: u8,
    tile_size: u32,
    number_of_tiles: i64,
    world_width: f64,
    center: GeoPoint,
    center_px: PixelPoint,
    tiles_x: i64,
    tiles_y: i64,
    first_tile_x: i64,
    first_tile_y: i64,
    tile_offset_x: f64,
    tile_offset_y: f64,
}

impl Transformer {
    pub fn new(width: u32, height: u32, zoom: u8, center: GeoPoint, tile_size: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::Render(format!(
                "image dimensions must be non-zero, got {width}x{height}"
            )));
        }
        if tile_size == 0 {
            return Err(Error::Render("tile size must be non-zero".to_string()));
        }
        if zoom > MAX_ZOOM {
            return Err(Error::Render(format!(
                "zoom {zoom} exceeds maximum {MAX_ZOOM}"
            )));
        }

        let number_of_tiles = 1i64 << zoom;
        let world_width = f64::from(tile_size) * number_of_tiles as f64;
        let center_px = project_with(world_width, center);

        let tiles_x = (f64::from(width) / f64::from(tile_size)).ceil() as i64 + 1;
        let tiles_y = (f64::from(height) / f64::from(tile_size)).ceil() as i64 + 1;
        // May be negative or beyond the tile count; x is wrapped modulo
        // number_of_tiles at fetch time, y is range-checked instead.
        let first_tile_x = (center_px.x / f64::from(tile_size)).floor() as i64 - tiles_x / 2;
        let first_tile_y = (center_px.y / f64::from(tile_size)).floor() as i64 - tiles_y / 2;

        let tile_offset_x =
            f64::from(width) / 2.0 - (center_px.x - (first_tile_x * i64::from(tile_size)) as f64);
        let tile_offset_y =
            f64::from(height) / 2.0 - (center_px.y - (first_tile_y * i64::from(tile_size)) as f64);

        Ok(Self {
            width,
            height,
            zoom,
            tile_size,
            number_of_tiles,
            world_width,
            center,
            center_px,
            tiles_x,
            tiles_y,
            first_tile_x,
            first_tile_y,
            tile_offset_x,
            tile_offset_y,
        })
    }

    /// Projects a geographic point onto the unbounded pixel plane using
    /// spherical Web Mercator. Latitude is clamped to ±85.0511° first;
    /// the projection diverges beyond that, and clamping keeps the result
    /// finite instead of silently producing NaN.
    pub fn project(&self, point: GeoPoint) -> PixelPoint {
        project_with(self.world_width, point)
    }

    /// Inverse of [`project`](Self::project).
    pub fn unproject(&self, pixel: PixelPoint) -> GeoPoint {
        let lng = pixel.x / self.world_width * 360.0 - 180.0;
        let lat = (2.0
            * ((self.world_width / 2.0 - pixel.y) * 2.0 * PI / self.world_width)
                .exp()
                .atan()
            - PI / 2.0)
            .to_degrees();
        GeoPoint::normalized(lat, lng)
    }

    /// Maps a geographic point to viewport coordinates, with the center
    /// at (width/2, height/2). The result is unbounded horizontally; the
    /// world-duplication pass shifts it by whole world widths.
    pub fn to_image(&self, point: GeoPoint) -> PixelPoint {
        let px = self.project(point);
        PixelPoint::new(
            f64::from(self.width) / 2.0 + (px.x - self.center_px.x),
            f64::from(self.height) / 2.0 + (px.y - self.center_px.y),
        )
    }

    /// Maps viewport coordinates back to a geographic point.
    pub fn from_image(&self, pixel: PixelPoint) -> GeoPoint {
        self.unproject(PixelPoint::new(
            self.center_px.x + (pixel.x - f64::from(self.width) / 2.0),
            self.center_px.y + (pixel.y - f64::from(self.height) / 2.0),
        ))
    }

    /// Wraps a tile column index into [0, number_of_tiles); longitude is
    /// cyclic, so any integer maps to a valid column.
    pub fn wrap_tile_x(&self, x: i64) -> u64 {
        x.rem_euclid(self.number_of_tiles) as u64
    }

    /// Latitude is not cyclic: tile rows outside [0, number_of_tiles)
    /// are simply not rendered.
    pub fn valid_tile_y(&self, y: i64) -> bool {
        (0..self.number_of_tiles).contains(&y)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn center(&self) -> GeoPoint {
        self.center
    }

    /// Total pixel width of the projected world: `tile_size * 2^zoom`.
    pub fn world_width(&self) -> f64 {
        self.world_width
    }

    pub fn number_of_tiles(&self) -> i64 {
        self.number_of_tiles
    }

    pub fn tiles_x(&self) -> i64 {
        self.tiles_x
    }

    pub fn tiles_y(&self) -> i64 {
        self.tiles_y
    }

    pub fn first_tile_x(&self) -> i64 {
        self.first_tile_x
    }

    pub fn first_tile_y(&self) -> i64 {
        self.first_tile_y
    }

    /// Sub-tile pixel offset of the first tile's left edge in the viewport.
    pub fn tile_offset_x(&self) -> f64 {
        self.tile_offset_x
    }

    pub fn tile_offset_y(&self) -> f64 {
        self.tile_offset_y
    }

    /// Finds the maximum zoom in [0, max_zoom] at which `region` (plus
    /// pixel margins) fits into a width x height viewport.
    ///
    /// Never fails: if even zoom 0 does not fit, 0 is returned anyway —
    /// a map should always render something, clipped if need be.
    pub fn find_zoom(
        width: u32,
        height: u32,
        tile_size: u32,
        max_zoom: u8,
        region: &BoundingRegion,
        margins: &PixelBounds,
    ) -> u8 {
        for zoom in (0..=max_zoom.min(MAX_ZOOM)).rev() {
            if region_fits(width, height, tile_size, zoom, region, margins) {
                return zoom;
            }
        }
        0
    }

    /// Pixel span (width, height) of a region at a given zoom, with the
    /// longitude span measured wrap-aware across the antimeridian.
    pub fn region_pixel_span(tile_size: u32, zoom: u8, region: &BoundingRegion) -> (f64, f64) {
        let world_width = f64::from(tile_size) * (1i64 << zoom.min(MAX_ZOOM)) as f64;
        let span_x = region.lng_span() / 360.0 * world_width;
        let north = project_with(world_width, GeoPoint::normalized(region.lat_max(), 0.0));
        let south = project_with(world_width, GeoPoint::normalized(region.lat_min(), 0.0));
        (span_x, south.y - north.y)
    }

    /// Image dimensions that exactly fit a region at a zoom, plus margins;
    /// used by the tighten-to-bounds render mode.
    pub fn tightened_size(
        tile_size: u32,
        zoom: u8,
        region: &BoundingRegion,
        margins: &PixelBounds,
    ) -> (u32, u32) {
        let (span_x, span_y) = Self::region_pixel_span(tile_size, zoom, region);
        let width = (span_x + margins.left + margins.right).ceil().max(1.0);
        let height = (span_y + margins.top + margins.bottom).ceil().max(1.0);
        (width as u32, height as u32)
    }
}

fn project_with(world_width: f64, point: GeoPoint) -> PixelPoint {
    let lat = point.lat().clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let x = (point.lng() + 180.0) / 360.0 * world_width;
    let y = world_width / 2.0
        - world_width * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln() / (2.0 * PI);
    PixelPoint::new(x, y)
}

fn region_fits(
    width: u32,
    height: u32,
    tile_size: u32,
    zoom: u8,
    region: &BoundingRegion,
    margins: &PixelBounds,
) -> bool {
    let (span_x, span_y) = Transformer::region_pixel_span(tile_size, zoom, region);
    span_x + margins.left + margins.right <= f64::from(width)
        && span_y + margins.top + margins.bottom <= f64::from(height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transformer(zoom: u8) -> Transformer {
        Transformer::new(800, 600, zoom, GeoPoint::normalized(48.0, 11.0), 256).unwrap()
    }

    #[test]
    fn test_validation() {
        let center = GeoPoint::default();
        assert!(Transformer::new(0, 600, 3, center, 256).is_err());
        assert!(Transformer::new(800, 600, 31, center, 256).is_err());
        assert!(Transformer::new(800, 600, 3, center, 0).is_err());
    }

    #[test]
    fn test_world_width_and_tile_count() {
        for zoom in 0..=20u8 {
            let t = transformer(zoom);
            assert_eq!(t.number_of_tiles(), 1i64 << zoom);
            assert_eq!(t.world_width(), 256.0 * (1i64 << zoom) as f64);
        }
    }

    #[test]
    fn test_project_unproject_round_trip() {
        let t = transformer(10);
        for &(lat, lng) in &[
            (0.0, 0.0),
            (48.137, 11.575),
            (-33.86, 151.21),
            (66.0, -179.9),
            (-84.9, 179.9),
        ] {
            let p = GeoPoint::normalized(lat, lng);
            let q = t.unproject(t.project(p));
            assert!((q.lat() - lat).abs() < 1e-9, "lat {lat} -> {}", q.lat());
            assert!((q.lng() - lng).abs() < 1e-9, "lng {lng} -> {}", q.lng());
        }
    }

    #[test]
    fn test_projection_clamps_polar_latitudes() {
        let t = transformer(3);
        let north = t.project(GeoPoint::normalized(90.0, 0.0));
        let clamped = t.project(GeoPoint::normalized(MAX_LATITUDE, 0.0));
        assert!(north.y.is_finite());
        assert_eq!(north.y, clamped.y);
    }

    #[test]
    fn test_to_image_center() {
        let t = transformer(7);
        let c = t.to_image(t.center());
        assert!((c.x - 400.0).abs() < 1e-9);
        assert!((c.y - 300.0).abs() < 1e-9);

        let back = t.from_image(PixelPoint::new(400.0, 300.0));
        assert!((back.lat() - 48.0).abs() < 1e-9);
        assert!((back.lng() - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_tile_x_wrapping() {
        let t = transformer(4);
        let n = t.number_of_tiles();
        for x in [-1i64, -17, 0, 5, 16, 33, i64::from(i32::MAX)] {
            let wrapped = t.wrap_tile_x(x);
            assert!((wrapped as i64) < n);
            assert_eq!(wrapped as i64, ((x % n) + n) % n);
        }
        assert_eq!(t.wrap_tile_x(-1), (n - 1) as u64);
    }

    #[test]
    fn test_tile_grid_covers_viewport() {
        for zoom in [0u8, 2, 5, 12] {
            let t = transformer(zoom);
            let left = t.tile_offset_x();
            let right = left + (t.tiles_x() * i64::from(t.tile_size())) as f64;
            assert!(left <= 0.0, "zoom {zoom}: grid starts at {left}");
            assert!(right >= 800.0, "zoom {zoom}: grid ends at {right}");

            let top = t.tile_offset_y();
            let bottom = top + (t.tiles_y() * i64::from(t.tile_size())) as f64;
            assert!(top <= 0.0);
            assert!(bottom >= 600.0);
        }
    }

    #[test]
    fn test_find_zoom_maximality() {
        let region = BoundingRegion::from_points(&[
            GeoPoint::normalized(0.0, -10.0),
            GeoPoint::normalized(66.0, 10.0),
        ])
        .unwrap();
        let margins = PixelBounds::ZERO;
        let zoom = Transformer::find_zoom(800, 600, 256, 19, &region, &margins);
        assert!(region_fits(800, 600, 256, zoom, &region, &margins));
        assert!(!region_fits(800, 600, 256, zoom + 1, &region, &margins));
    }

    #[test]
    fn test_find_zoom_caps_for_point_and_world() {
        let point = BoundingRegion::from_point(GeoPoint::normalized(48.0, 11.0));
        assert_eq!(
            Transformer::find_zoom(800, 600, 256, 19, &point, &PixelBounds::ZERO),
            19
        );

        // Near-full world extent: nothing fits a tiny viewport, clamp to 0.
        let world = BoundingRegion::from_points(&[
            GeoPoint::normalized(-85.0, -179.0),
            GeoPoint::normalized(85.0, 179.0),
        ])
        .unwrap();
        assert_eq!(
            Transformer::find_zoom(64, 64, 256, 19, &world, &PixelBounds::ZERO),
            0
        );
    }

    #[test]
    fn test_find_zoom_respects_wrapped_region() {
        // 20 degrees of longitude across the antimeridian should pick the
        // same zoom as 20 degrees anywhere else.
        let wrapped = BoundingRegion::from_points(&[
            GeoPoint::normalized(0.0, 170.0),
            GeoPoint::normalized(10.0, -170.0),
        ])
        .unwrap();
        let plain = BoundingRegion::from_points(&[
            GeoPoint::normalized(0.0, -10.0),
            GeoPoint::normalized(10.0, 10.0),
        ])
        .unwrap();
        let a = Transformer::find_zoom(800, 600, 256, 19, &wrapped, &PixelBounds::ZERO);
        let b = Transformer::find_zoom(800, 600, 256, 19, &plain, &PixelBounds::ZERO);
        assert_eq!(a, b);
    }

    #[test]
    fn test_tightened_size() {
        let region = BoundingRegion::from_points(&[
            GeoPoint::normalized(0.0, 0.0),
            GeoPoint::normalized(1.0, 1.0),
        ])
        .unwrap();
        let (span_x, span_y) = Transformer::region_pixel_span(256, 5, &region);
        let (w, h) = Transformer::tightened_size(256, 5, &region, &PixelBounds::ZERO);
        assert_eq!(w, span_x.ceil() as u32);
        assert_eq!(h, span_y.ceil() as u32);

        let margins = PixelBounds::new(10.0, 30.0, 10.0, 0.0);
        let (w2, h2) = Transformer::tightened_size(256, 5, &region, &margins);
        assert_eq!(w2, (span_x + 20.0).ceil() as u32);
        assert_eq!(h2, (span_y + 30.0).ceil() as u32);
    }
}
