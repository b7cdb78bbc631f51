use std::fmt;
use std::io::{self, Write};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use svg::node::element::path::Data;
use svg::node::element::{Circle, Group, Image, Path, Rectangle, Text};
use svg::Document;

use crate::color::Color;
use crate::geo::PixelPoint;
use crate::render::{ensure_png, fit_font_size, Canvas, Renderer};
use crate::transformer::Transformer;

/// Average glyph advance relative to font size for a generic sans-serif
/// face; SVG has no text measurement, so the attribution fit uses this
/// estimate.
const GLYPH_WIDTH_RATIO: f64 = 0.6;

/// Renders to an SVG document.
pub struct SvgRenderer<'a> {
    trans: &'a Transformer,
    document: Document,
    offset: f64,
}

impl<'a> SvgRenderer<'a> {
    pub fn new(trans: &'a Transformer) -> Self {
        let document = Document::new()
            .set("width", trans.width())
            .set("height", trans.height())
            .set("viewBox", (0, 0, trans.width(), trans.height()))
            .set("xmlns:xlink", "http://www.w3.org/1999/xlink");
        Self {
            trans,
            document,
            offset: 0.0,
        }
    }

    /// Consumes the renderer, returning the finished document.
    pub fn into_document(self) -> SvgDocument {
        SvgDocument {
            document: self.document,
        }
    }

    fn push<T: svg::Node>(&mut self, node: T) {
        let document = std::mem::replace(&mut self.document, Document::new());
        self.document = document.add(node);
    }

    fn path_data(&self, points: &[PixelPoint], close: bool) -> Option<Data> {
        let (first, rest) = points.split_first()?;
        let mut data = Data::new().move_to((first.x + self.offset, first.y));
        for p in rest {
            data = data.line_to((p.x + self.offset, p.y));
        }
        if close {
            data = data.close();
        }
        Some(data)
    }

    fn shape(data: Data, fill: Color, outline: Color, width: f64) -> Path {
        let mut path = Path::new().set("d", data).set("fill-rule", "evenodd");
        if fill.is_transparent() {
            path = path.set("fill", "none");
        } else {
            path = path
                .set("fill", fill.hex_rgb())
                .set("fill-opacity", fill.float_a());
        }
        if outline.is_transparent() || width <= 0.0 {
            path = path.set("stroke", "none");
        } else {
            path = path
                .set("stroke", outline.hex_rgb())
                .set("stroke-opacity", outline.float_a())
                .set("stroke-width", width)
                .set("stroke-linecap", "round")
                .set("stroke-linejoin", "round");
        }
        path
    }
}

impl Canvas for SvgRenderer<'_> {
    fn transformer(&self) -> &Transformer {
        self.trans
    }

    fn set_world_offset(&mut self, offset: f64) {
        self.offset = offset;
    }

    fn world_offset(&self) -> f64 {
        self.offset
    }

    fn draw_polyline(&mut self, points: &[PixelPoint], color: Color, width: f64) {
        if color.is_transparent() || width <= 0.0 {
            return;
        }
        let Some(data) = self.path_data(points, false) else {
            return;
        };
        let path = Self::shape(data, crate::color::TRANSPARENT, color, width);
        self.push(path);
    }

    fn draw_polygon(&mut self, points: &[PixelPoint], fill: Color, outline: Color, width: f64) {
        if fill.is_transparent() && (outline.is_transparent() || width <= 0.0) {
            return;
        }
        let Some(data) = self.path_data(points, true) else {
            return;
        };
        self.push(Self::shape(data, fill, outline, width));
    }

    fn draw_circle(
        &mut self,
        center: PixelPoint,
        radius: f64,
        fill: Color,
        outline: Color,
        width: f64,
    ) {
        let mut circle = Circle::new()
            .set("cx", center.x + self.offset)
            .set("cy", center.y)
            .set("r", radius);
        if fill.is_transparent() {
            circle = circle.set("fill", "none");
        } else {
            circle = circle
                .set("fill", fill.hex_rgb())
                .set("fill-opacity", fill.float_a());
        }
        if outline.is_transparent() || width <= 0.0 {
            circle = circle.set("stroke", "none");
        } else {
            circle = circle
                .set("stroke", outline.hex_rgb())
                .set("stroke-opacity", outline.float_a())
                .set("stroke-width", width);
        }
        self.push(circle);
    }

    fn draw_image(&mut self, top_left: PixelPoint, data: &[u8], width: f64, height: f64) {
        let png = match ensure_png(data) {
            Ok(png) => png,
            Err(err) => {
                log::warn!("skipping undecodable image: {err}");
                return;
            }
        };
        let image = Image::new()
            .set("x", top_left.x + self.offset)
            .set("y", top_left.y)
            .set("width", width)
            .set("height", height)
            .set(
                "xlink:href",
                format!("data:image/png;base64,{}", BASE64.encode(png.as_ref())),
            );
        self.push(image);
    }
}

impl Renderer for SvgRenderer<'_> {
    fn render_attribution(&mut self, attribution: Option<&str>) {
        let Some(text) = attribution.filter(|t| !t.is_empty()) else {
            return;
        };
        let width = f64::from(self.trans.width());
        let height = f64::from(self.trans.height());
        let glyphs = text.chars().count() as f64;
        let size = fit_font_size(width, |s| glyphs * s * GLYPH_WIDTH_RATIO);

        let banner_height = size * 1.2 + 4.0;
        let banner = Rectangle::new()
            .set("x", 0)
            .set("y", height - banner_height)
            .set("width", width)
            .set("height", banner_height)
            .set("fill", "#ffffff")
            .set("fill-opacity", 0.8);
        let label = Text::new(text)
            .set("x", 4)
            .set("y", height - 4.0)
            .set("font-family", "sans-serif")
            .set("font-size", size)
            .set("fill", "#000000");
        let group = Group::new().add(banner).add(label);
        self.push(group);
    }
}

/// A finished SVG map, writable in pretty or compact form.
pub struct SvgDocument {
    document: Document,
}

impl SvgDocument {
    /// Writes the document. With `pretty`, elements keep the formatted
    /// layout; without it, inter-element whitespace is stripped.
    pub fn write<W: Write>(&self, mut writer: W, pretty: bool) -> io::Result<()> {
        let rendered = self.document.to_string();
        if pretty {
            writer.write_all(rendered.as_bytes())
        } else {
            let mut first = true;
            for line in rendered.lines() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if !first && !line.starts_with('<') {
                    writer.write_all(b" ")?;
                }
                writer.write_all(line.as_bytes())?;
                first = false;
            }
            Ok(())
        }
    }

    pub fn inner(&self) -> &Document {
        &self.document
    }
}

impl fmt::Display for SvgDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.document.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color;
    use crate::geo::GeoPoint;

    fn transformer() -> Transformer {
        Transformer::new(400, 300, 3, GeoPoint::default(), 256).unwrap()
    }

    fn render_to_string(renderer: SvgRenderer<'_>, pretty: bool) -> String {
        let mut out = Vec::new();
        renderer.into_document().write(&mut out, pretty).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_document_dimensions() {
        let trans = transformer();
        let svg = render_to_string(SvgRenderer::new(&trans), true);
        assert!(svg.contains("width=\"400\""));
        assert!(svg.contains("height=\"300\""));
    }

    #[test]
    fn test_polyline_and_polygon_elements() {
        let trans = transformer();
        let mut r = SvgRenderer::new(&trans);
        r.draw_polyline(
            &[PixelPoint::new(0.0, 0.0), PixelPoint::new(10.0, 10.0)],
            color::RED,
            2.0,
        );
        r.draw_polygon(
            &[
                PixelPoint::new(0.0, 0.0),
                PixelPoint::new(10.0, 0.0),
                PixelPoint::new(10.0, 10.0),
            ],
            color::BLUE,
            color::TRANSPARENT,
            0.0,
        );
        let svg = render_to_string(r, true);
        assert!(svg.contains("stroke=\"#ff0000\""));
        assert!(svg.contains("fill=\"#0000ff\""));
        // The open polyline is not closed, the polygon is.
        assert!(svg.contains('z') || svg.contains('Z'));
    }

    #[test]
    fn test_world_offset_applies_to_coordinates() {
        let trans = transformer();
        let mut r = SvgRenderer::new(&trans);
        r.set_world_offset(2048.0);
        r.draw_circle(
            PixelPoint::new(10.0, 20.0),
            5.0,
            color::RED,
            color::TRANSPARENT,
            0.0,
        );
        let svg = render_to_string(r, true);
        assert!(svg.contains("cx=\"2058\""));
    }

    #[test]
    fn test_image_embedded_as_data_uri() {
        let trans = transformer();
        let mut r = SvgRenderer::new(&trans);
        let mut tile = tiny_skia::Pixmap::new(4, 4).unwrap();
        tile.fill(tiny_skia::Color::from_rgba8(1, 2, 3, 255));
        r.draw_image(
            PixelPoint::new(0.0, 0.0),
            &tile.encode_png().unwrap(),
            4.0,
            4.0,
        );
        let svg = render_to_string(r, true);
        assert!(svg.contains("data:image/png;base64,"));
    }

    #[test]
    fn test_attribution_banner() {
        let trans = transformer();
        let mut r = SvgRenderer::new(&trans);
        r.render_attribution(Some("Maps (C) Test"));
        let svg = render_to_string(r, true);
        assert!(svg.contains("Maps (C) Test"));
        assert!(svg.contains("font-size"));
    }

    #[test]
    fn test_compact_mode_strips_whitespace() {
        let trans = transformer();
        let draw = |r: &mut SvgRenderer<'_>| {
            r.draw_circle(
                PixelPoint::new(1.0, 1.0),
                1.0,
                color::RED,
                color::TRANSPARENT,
                0.0,
            );
        };
        let mut a = SvgRenderer::new(&trans);
        draw(&mut a);
        let pretty = render_to_string(a, true);
        let mut b = SvgRenderer::new(&trans);
        draw(&mut b);
        let compact = render_to_string(b, false);
        assert!(compact.len() <= pretty.len());
        assert!(!compact.contains('\n'));
        assert!(compact.contains("<circle"));
    }
}
