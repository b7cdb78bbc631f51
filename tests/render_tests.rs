use std::cell::Cell;
use std::rc::Rc;

use staticmaps::render::Canvas;
use staticmaps::{
    BoundingRegion, Circle, Color, Context, GeoPoint, Line, Marker, Object, PixelBounds,
    Transformer,
};

fn point(lat: f64, lng: f64) -> GeoPoint {
    GeoPoint::new(lat, lng).unwrap()
}

/// True if any pixel in a 5x5 window around (cx, cy) is predominantly
/// red. Strokes are antialiased, so exact-pixel checks are too strict.
fn has_reddish(pixmap: &tiny_skia::Pixmap, cx: i32, cy: i32) -> bool {
    for dy in -2..=2 {
        for dx in -2..=2 {
            let (x, y) = (cx + dx, cy + dy);
            if x < 0 || y < 0 {
                continue;
            }
            if let Some(p) = pixmap.pixel(x as u32, y as u32) {
                let c = p.demultiply();
                if c.red() > 150 && c.green() < 100 && c.blue() < 100 {
                    return true;
                }
            }
        }
    }
    false
}

#[test]
fn test_geodesic_circles_stroke_at_projected_edge() {
    let mut ctx = Context::new();
    ctx.set_background_color(staticmaps::color::WHITE);
    ctx.set_center(point(33.0, 0.0));
    ctx.set_zoom(3);
    ctx.add_object(Circle::new(point(0.0, 0.0), 2_000_000.0).unwrap());
    ctx.add_object(Circle::new(point(66.0, 0.0), 2_000_000.0).unwrap());
    let pixmap = ctx.render_raster(800, 600).unwrap();

    // Same projection the render used.
    let trans = Transformer::new(800, 600, 3, point(33.0, 0.0), 256).unwrap();

    // Northern edge of the equator circle and southern edge of the
    // high-latitude one both land inside the viewport.
    let north_edge = trans.to_image(point(0.0, 0.0).destination(2_000_000.0, 0.0));
    assert!(has_reddish(
        &pixmap,
        north_edge.x.round() as i32,
        north_edge.y.round() as i32
    ));
    let south_edge = trans.to_image(point(66.0, 0.0).destination(2_000_000.0, 180.0));
    assert!(has_reddish(
        &pixmap,
        south_edge.x.round() as i32,
        south_edge.y.round() as i32
    ));

    // Circles have no fill: the interior stays background white.
    let interior = trans.to_image(point(0.0, 0.0));
    let c = pixmap
        .pixel(interior.x.round() as u32, interior.y.round() as u32)
        .unwrap()
        .demultiply();
    assert_eq!((c.red(), c.green(), c.blue()), (255, 255, 255));
}

#[test]
fn test_marker_over_uniform_background() {
    let mut ctx = Context::new();
    ctx.set_background_color(staticmaps::color::BLUE);
    ctx.set_center(point(20.0, 10.0));
    ctx.set_zoom(5);
    ctx.add_object(Marker::new(point(20.0, 10.0)));
    let pixmap = ctx.render_raster(400, 300).unwrap();

    // Corners are untouched background.
    for (x, y) in [(1, 1), (398, 1), (1, 298), (398, 298)] {
        let c = pixmap.pixel(x, y).unwrap().demultiply();
        assert_eq!((c.red(), c.green(), c.blue()), (0, 0, 255));
    }

    // The marker tip sits at the image center; its body extends upward.
    assert!(has_reddish(&pixmap, 200, 140));
}

#[test]
fn test_tighten_to_bounds_shrinks_to_region() {
    let positions = [point(10.0, 20.0), point(11.0, 21.0)];
    let mut ctx = Context::new();
    for p in positions {
        ctx.add_object(Marker::new(p));
    }
    ctx.set_zoom(6);
    ctx.set_tighten_to_bounds(true);
    let pixmap = ctx.render_raster(500, 400).unwrap();

    let region = BoundingRegion::from_points(&positions).unwrap();
    // Default marker padding: size 10 on the sides, 3x above the tip.
    let margins = PixelBounds::new(10.0, 30.0, 10.0, 0.0);
    let (w, h) = Transformer::tightened_size(256, 6, &region, &margins);
    assert_eq!(pixmap.width(), w.min(500));
    assert_eq!(pixmap.height(), h.min(400));
    assert!(pixmap.width() < 500);
    assert!(pixmap.height() < 400);
}

struct CountingObject {
    calls: Rc<Cell<usize>>,
}

impl Object for CountingObject {
    fn bounds(&self) -> BoundingRegion {
        BoundingRegion::from_point(GeoPoint::normalized(0.0, 0.0))
    }

    fn render(&self, _canvas: &mut dyn Canvas) {
        self.calls.set(self.calls.get() + 1);
    }
}

#[test]
fn test_objects_rendered_once_per_world_copy() {
    let calls = Rc::new(Cell::new(0));
    let mut ctx = Context::new();
    ctx.add_object(CountingObject {
        calls: Rc::clone(&calls),
    });
    ctx.set_center(point(0.0, 0.0));

    // Zoom 0: the world is 256px wide, so an 800px viewport needs two
    // extra copies per side. 2 * 2 + 1 render calls.
    ctx.set_zoom(0);
    ctx.render_raster(800, 600).unwrap();
    assert_eq!(calls.get(), 5);

    // Zoom 8: the world dwarfs the viewport, but objects still render
    // once per side for edge cases near the antimeridian.
    calls.set(0);
    ctx.set_zoom(8);
    ctx.render_raster(800, 600).unwrap();
    assert_eq!(calls.get(), 3);
}

#[test]
fn test_svg_scene_contains_shapes() {
    let mut ctx = Context::new();
    ctx.set_background_color(Color::rgb(0xf0, 0xf0, 0xf0));
    ctx.add_object(Line::new(vec![point(48.0, 8.0), point(49.0, 9.0)]).unwrap());
    ctx.add_object(Marker::new(point(48.5, 8.5)));
    ctx.set_zoom(7);
    let doc = ctx.render_svg(400, 300).unwrap();
    let svg = doc.to_string();

    assert!(svg.contains("<svg"));
    assert!(svg.contains("width=\"400\""));
    // Line and marker body are paths, the marker head is a circle.
    assert!(svg.contains("<path"));
    assert!(svg.contains("<circle"));
    assert!(svg.contains("stroke=\"#ff0000\""));
}

#[test]
fn test_raster_and_svg_share_center_zoom() {
    let mut ctx = Context::new();
    ctx.add_object(Marker::new(point(10.0, 20.0)));
    ctx.add_object(Marker::new(point(30.0, 40.0)));
    let (center, zoom) = ctx.determine_center_zoom(400, 300).unwrap();
    assert!(zoom > 0);
    assert!((center.lat() - 20.0).abs() < 1e-9);
    assert!((center.lng() - 30.0).abs() < 1e-9);
}
