use crate::color::{self, Color};
use crate::geo::{BoundingRegion, GeoPoint};
use crate::objects::{image_path, Object};
use crate::render::Canvas;
use crate::{Error, Result};

/// An open polyline along a sequence of geographic points.
#[derive(Debug, Clone)]
pub struct Line {
    points: Vec<GeoPoint>,
    color: Color,
    width: f64,
}

impl Line {
    /// Creates a line; at least two points are required.
    pub fn new(points: Vec<GeoPoint>) -> Result<Self> {
        if points.len() < 2 {
            return Err(Error::InvalidObject(format!(
                "a line needs at least 2 points, got {}",
                points.len()
            )));
        }
        Ok(Self {
            points,
            color: color::RED,
            width: 2.0,
        })
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width.max(0.0);
        self
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }
}

impl Object for Line {
    fn bounds(&self) -> BoundingRegion {
        // Constructor guarantees at least two points.
        BoundingRegion::from_points(&self.points).expect("line is never empty")
    }

    fn render(&self, canvas: &mut dyn Canvas) {
        if self.width <= 0.0 || self.color.is_transparent() {
            return;
        }
        let path = image_path(canvas.transformer(), &self.points);
        canvas.draw_polyline(&path, self.color, self.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_needs_two_points() {
        assert!(Line::new(vec![]).is_err());
        assert!(Line::new(vec![GeoPoint::default()]).is_err());
        assert!(Line::new(vec![GeoPoint::default(), GeoPoint::normalized(1.0, 1.0)]).is_ok());
    }

    #[test]
    fn test_line_bounds() {
        let line = Line::new(vec![
            GeoPoint::normalized(0.0, 0.0),
            GeoPoint::normalized(10.0, 20.0),
            GeoPoint::normalized(-5.0, 5.0),
        ])
        .unwrap();
        let bounds = line.bounds();
        assert_eq!(bounds.lat_min(), -5.0);
        assert_eq!(bounds.lat_max(), 10.0);
        assert_eq!(bounds.lng_span(), 20.0);
    }
}
