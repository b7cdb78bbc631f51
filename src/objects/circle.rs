use crate::color::{self, Color};
use crate::geo::{BoundingRegion, GeoPoint};
use crate::objects::{image_path, Object};
use crate::render::Canvas;
use crate::{Error, Result};

/// A geodesic circle: all points at a fixed ground distance from a
/// center. Rendered as a polygon sampled at one-degree bearings, so it
/// stays a circle of the right size at any latitude, unlike a circle
/// drawn in projected pixel space.
#[derive(Debug, Clone)]
pub struct Circle {
    center: GeoPoint,
    radius: f64,
    outline: Vec<GeoPoint>,
    fill_color: Color,
    color: Color,
    width: f64,
}

impl Circle {
    /// Creates a circle with the given radius in meters.
    pub fn new(center: GeoPoint, radius: f64) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::InvalidObject(format!(
                "circle radius must be positive, got {radius}"
            )));
        }
        let outline = (0..=360)
            .map(|bearing| center.destination(radius, f64::from(bearing)))
            .collect();
        Ok(Self {
            center,
            radius,
            outline,
            fill_color: color::TRANSPARENT,
            color: color::RED,
            width: 2.0,
        })
    }

    pub fn with_fill_color(mut self, fill_color: Color) -> Self {
        self.fill_color = fill_color;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width.max(0.0);
        self
    }

    pub fn center(&self) -> GeoPoint {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl Object for Circle {
    fn bounds(&self) -> BoundingRegion {
        // The outline always has 361 samples.
        BoundingRegion::from_points(&self.outline).expect("circle outline is never empty")
    }

    fn render(&self, canvas: &mut dyn Canvas) {
        let path = image_path(canvas.transformer(), &self.outline);
        canvas.draw_polygon(&path, self.fill_color, self.color, self.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_rejects_bad_radius() {
        let center = GeoPoint::default();
        assert!(Circle::new(center, 0.0).is_err());
        assert!(Circle::new(center, -5.0).is_err());
        assert!(Circle::new(center, f64::NAN).is_err());
    }

    #[test]
    fn test_circle_bounds_span_radius() {
        let center = GeoPoint::normalized(48.0, 11.0);
        let circle = Circle::new(center, 2000.0).unwrap();
        let bounds = circle.bounds();

        let north = GeoPoint::normalized(bounds.lat_max(), 11.0);
        let south = GeoPoint::normalized(bounds.lat_min(), 11.0);
        assert!((north.distance_to(&south) - 4000.0).abs() < 10.0);
        assert!(bounds.contains_lng(11.0));
        let c = bounds.center();
        assert!((c.lat() - 48.0).abs() < 0.001);
    }
}
