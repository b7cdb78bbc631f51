//! Overlay objects drawn on top of the tile layer.
//!
//! Every object exposes its geographic [`BoundingRegion`] (used for
//! auto-fit zoom selection and tighten-to-bounds sizing) and renders
//! itself through the backend-neutral [`Canvas`](crate::render::Canvas)
//! primitive set, projecting its own geometry via the active
//! [`Transformer`](crate::transformer::Transformer). Renderers treat all
//! objects uniformly; they never inspect concrete types.

pub mod area;
pub mod circle;
pub mod image_marker;
pub mod line;
pub mod marker;

pub use area::Area;
pub use circle::Circle;
pub use image_marker::ImageMarker;
pub use line::Line;
pub use marker::Marker;

use serde::{Deserialize, Serialize};

use crate::geo::{BoundingRegion, GeoPoint, PixelPoint};
use crate::render::Canvas;
use crate::transformer::Transformer;

/// The drawable object contract consumed by the renderers.
pub trait Object {
    /// Geographic extent of the object.
    fn bounds(&self) -> BoundingRegion;

    /// Pixel padding the object needs beyond its projected geographic
    /// bounds, e.g. a marker's icon extents.
    fn extra_pixel_bounds(&self) -> PixelBounds {
        PixelBounds::ZERO
    }

    /// Draws the object onto a backend canvas. Called once per world
    /// copy; the canvas carries the active horizontal world offset.
    fn render(&self, canvas: &mut dyn Canvas);
}

/// Pixel-space padding around a projected point or region:
/// (left, top, right, bottom), all non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelBounds {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl PixelBounds {
    pub const ZERO: PixelBounds = PixelBounds {
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
    };

    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Component-wise maximum of two paddings.
    pub fn union(&self, other: &PixelBounds) -> PixelBounds {
        PixelBounds {
            left: self.left.max(other.left),
            top: self.top.max(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }
}

/// Projects a point sequence into viewport coordinates, keeping
/// consecutive points on the same world copy. A segment crossing the
/// antimeridian would otherwise jump by a whole world width; the
/// world-duplication pass then shows the continuous path in the copy
/// that overlaps the viewport.
pub(crate) fn image_path(trans: &Transformer, points: &[GeoPoint]) -> Vec<PixelPoint> {
    let world_width = trans.world_width();
    let mut out: Vec<PixelPoint> = Vec::with_capacity(points.len());
    for point in points {
        let mut px = trans.to_image(*point);
        if let Some(prev) = out.last() {
            while px.x - prev.x > world_width / 2.0 {
                px.x -= world_width;
            }
            while prev.x - px.x > world_width / 2.0 {
                px.x += world_width;
            }
        }
        out.push(px);
    }
    out
}
