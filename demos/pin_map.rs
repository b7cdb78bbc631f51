//! A handful of city pins on an OpenStreetMap base layer, with the
//! viewport fitted automatically and tightened to the pins.

use staticmaps::{color, Context, GeoPoint, Line, Marker, TileProvider};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cities = [
        ("Berlin", GeoPoint::new(52.52, 13.405)?),
        ("Munich", GeoPoint::new(48.137, 11.575)?),
        ("Hamburg", GeoPoint::new(53.551, 9.994)?),
        ("Cologne", GeoPoint::new(50.938, 6.96)?),
    ];

    let mut ctx = Context::new();
    ctx.set_tile_provider(TileProvider::open_street_map());
    ctx.set_tighten_to_bounds(true);

    for (name, position) in cities {
        log::info!("pinning {name} at {position}");
        ctx.add_object(Marker::new(position).with_size(12.0));
    }
    ctx.add_object(
        Line::new(cities.iter().map(|(_, p)| *p).collect())?
            .with_color(color::BLUE)
            .with_width(3.0),
    );

    let pixmap = ctx.render_raster(800, 600)?;
    pixmap
        .save_png("pin_map.png")
        .map_err(|err| anyhow::anyhow!("writing png: {err}"))?;

    Ok(())
}
