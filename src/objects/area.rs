use crate::color::{self, Color};
use crate::geo::{BoundingRegion, GeoPoint};
use crate::objects::{image_path, Object};
use crate::render::Canvas;
use crate::{Error, Result};

/// A closed, filled polygon.
#[derive(Debug, Clone)]
pub struct Area {
    points: Vec<GeoPoint>,
    fill_color: Color,
    color: Color,
    width: f64,
}

impl Area {
    /// Creates an area; at least three points are required. A closing
    /// point equal to the first is accepted but not required.
    pub fn new(points: Vec<GeoPoint>) -> Result<Self> {
        let mut points = points;
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        if points.len() < 3 {
            return Err(Error::InvalidObject(format!(
                "an area needs at least 3 distinct points, got {}",
                points.len()
            )));
        }
        Ok(Self {
            points,
            fill_color: Color::rgba(0xff, 0x00, 0x00, 0x64),
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

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }
}

impl Object for Area {
    fn bounds(&self) -> BoundingRegion {
        // Constructor guarantees at least three points.
        BoundingRegion::from_points(&self.points).expect("area is never empty")
    }

    fn render(&self, canvas: &mut dyn Canvas) {
        let path = image_path(canvas.transformer(), &self.points);
        canvas.draw_polygon(&path, self.fill_color, self.color, self.width);
    }
}
