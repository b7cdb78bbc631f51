use crate::color::{self, Color};
use crate::geo::{BoundingRegion, GeoPoint, PixelPoint};
use crate::objects::{Object, PixelBounds};
use crate::render::Canvas;

/// A balloon-style pin anchored at its geographic position.
///
/// The pin tip sits exactly on the projected point; the round head of
/// radius `size` floats `2 * size` pixels above it.
#[derive(Debug, Clone)]
pub struct Marker {
    position: GeoPoint,
    color: Color,
    size: f64,
}

impl Marker {
    pub fn new(position: GeoPoint) -> Self {
        Self {
            position,
            color: color::RED,
            size: 10.0,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size.max(1.0);
        self
    }

    pub fn position(&self) -> GeoPoint {
        self.position
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn size(&self) -> f64 {
        self.size
    }
}

impl Object for Marker {
    fn bounds(&self) -> BoundingRegion {
        BoundingRegion::from_point(self.position)
    }

    fn extra_pixel_bounds(&self) -> PixelBounds {
        PixelBounds::new(self.size, 3.0 * self.size, self.size, 0.0)
    }

    fn render(&self, canvas: &mut dyn Canvas) {
        let tip = canvas.transformer().to_image(self.position);
        let s = self.size;

        let triangle = [
            PixelPoint::new(tip.x, tip.y),
            PixelPoint::new(tip.x - s, tip.y - 2.0 * s),
            PixelPoint::new(tip.x + s, tip.y - 2.0 * s),
        ];
        canvas.draw_polygon(&triangle, self.color, color::TRANSPARENT, 0.0);
        canvas.draw_circle(
            PixelPoint::new(tip.x, tip.y - 2.0 * s),
            s,
            self.color,
            color::TRANSPARENT,
            0.0,
        );
    }
}
