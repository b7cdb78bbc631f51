//! Two 2000 km geodesic circles, one on the equator and one at 66°N,
//! showing how projection distortion grows toward the poles.

use staticmaps::{color, Circle, Color, Context, GeoPoint, Marker, TileProvider};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut ctx = Context::new();
    ctx.set_tile_provider(TileProvider::open_street_map());

    for center in [GeoPoint::new(66.0, 0.0)?, GeoPoint::new(0.0, 0.0)?] {
        ctx.add_object(
            Circle::new(center, 2_000_000.0)?
                .with_fill_color(Color::rgba(0xff, 0x00, 0x00, 0x64))
                .with_color(color::RED)
                .with_width(2.0),
        );
        ctx.add_object(Marker::new(center).with_color(color::BLUE).with_size(6.0));
    }

    let pixmap = ctx.render_raster(800, 600)?;
    pixmap
        .save_png("geodesic_circles.png")
        .map_err(|err| anyhow::anyhow!("writing png: {err}"))?;

    let svg = ctx.render_svg(800, 600)?;
    svg.write(std::fs::File::create("geodesic_circles.svg")?, true)?;

    Ok(())
}
