use std::fs;

use fontdue::{Font, FontSettings};
use once_cell::sync::Lazy;
use tiny_skia::{
    FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, PixmapPaint,
    PremultipliedColorU8, Rect, Stroke, Transform,
};

use crate::color::Color;
use crate::geo::PixelPoint;
use crate::render::{ensure_png, fit_font_size, Canvas, Renderer};
use crate::transformer::Transformer;
use crate::{Error, Result};

/// Candidate fonts for the attribution banner, probed in order. The
/// `STATICMAPS_FONT` environment variable overrides the list.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static ATTRIBUTION_FONT: Lazy<Option<Font>> = Lazy::new(load_attribution_font);

fn load_attribution_font() -> Option<Font> {
    let override_path = std::env::var("STATICMAPS_FONT").ok();
    let candidates = override_path
        .iter()
        .map(String::as_str)
        .chain(FONT_CANDIDATES.iter().copied());
    for path in candidates {
        let Ok(data) = fs::read(path) else { continue };
        match Font::from_bytes(data, FontSettings::default()) {
            Ok(font) => {
                log::debug!("attribution font: {path}");
                return Some(font);
            }
            Err(err) => log::debug!("cannot use font {path}: {err}"),
        }
    }
    None
}

/// Renders to an in-memory RGBA bitmap via tiny-skia.
pub struct RasterRenderer<'a> {
    trans: &'a Transformer,
    pixmap: Pixmap,
    offset: f64,
}

impl<'a> RasterRenderer<'a> {
    pub fn new(trans: &'a Transformer) -> Result<Self> {
        let pixmap = Pixmap::new(trans.width(), trans.height()).ok_or_else(|| {
            Error::Render(format!(
                "cannot allocate {}x{} pixmap",
                trans.width(),
                trans.height()
            ))
        })?;
        Ok(Self {
            trans,
            pixmap,
            offset: 0.0,
        })
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Consumes the renderer, returning the finished bitmap.
    pub fn into_pixmap(self) -> Pixmap {
        self.pixmap
    }

    fn paint(color: Color) -> Paint<'static> {
        let (r, g, b, a) = color.int_rgba();
        let mut paint = Paint::default();
        paint.set_color(tiny_skia::Color::from_rgba8(r, g, b, a));
        paint.anti_alias = true;
        paint
    }

    fn stroke(width: f64) -> Stroke {
        Stroke {
            width: width as f32,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        }
    }

    fn build_path(&self, points: &[PixelPoint], close: bool) -> Option<Path> {
        let (first, rest) = points.split_first()?;
        let mut builder = PathBuilder::new();
        builder.move_to((first.x + self.offset) as f32, first.y as f32);
        for p in rest {
            builder.line_to((p.x + self.offset) as f32, p.y as f32);
        }
        if close {
            builder.close();
        }
        builder.finish()
    }

    fn fill(&mut self, path: &Path, color: Color) {
        self.pixmap.fill_path(
            path,
            &Self::paint(color),
            FillRule::EvenOdd,
            Transform::identity(),
            None,
        );
    }

    fn stroke_path(&mut self, path: &Path, color: Color, width: f64) {
        self.pixmap.stroke_path(
            path,
            &Self::paint(color),
            &Self::stroke(width),
            Transform::identity(),
            None,
        );
    }
}

impl Canvas for RasterRenderer<'_> {
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
        if let Some(path) = self.build_path(points, false) {
            self.stroke_path(&path, color, width);
        }
    }

    fn draw_polygon(&mut self, points: &[PixelPoint], fill: Color, outline: Color, width: f64) {
        let Some(path) = self.build_path(points, true) else {
            return;
        };
        if !fill.is_transparent() {
            self.fill(&path, fill);
        }
        if !outline.is_transparent() && width > 0.0 {
            self.stroke_path(&path, outline, width);
        }
    }

    fn draw_circle(
        &mut self,
        center: PixelPoint,
        radius: f64,
        fill: Color,
        outline: Color,
        width: f64,
    ) {
        let mut builder = PathBuilder::new();
        builder.push_circle(
            (center.x + self.offset) as f32,
            center.y as f32,
            radius as f32,
        );
        let Some(path) = builder.finish() else { return };
        if !fill.is_transparent() {
            self.fill(&path, fill);
        }
        if !outline.is_transparent() && width > 0.0 {
            self.stroke_path(&path, outline, width);
        }
    }

    fn draw_image(&mut self, top_left: PixelPoint, data: &[u8], _width: f64, _height: f64) {
        let png = match ensure_png(data) {
            Ok(png) => png,
            Err(err) => {
                log::warn!("skipping undecodable image: {err}");
                return;
            }
        };
        let tile = match Pixmap::decode_png(&png) {
            Ok(tile) => tile,
            Err(err) => {
                log::warn!("skipping undecodable image: {err}");
                return;
            }
        };
        self.pixmap.draw_pixmap(
            (top_left.x + self.offset).round() as i32,
            top_left.y.round() as i32,
            tile.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }
}

impl Renderer for RasterRenderer<'_> {
    fn render_attribution(&mut self, attribution: Option<&str>) {
        let Some(text) = attribution.filter(|t| !t.is_empty()) else {
            return;
        };
        let Some(font) = ATTRIBUTION_FONT.as_ref() else {
            log::warn!("no usable font found, skipping attribution banner");
            return;
        };

        let width = f64::from(self.trans.width());
        let height = f64::from(self.trans.height());
        let size = fit_font_size(width, |s| text_width(font, text, s));

        let (ascent, descent) = match font.horizontal_line_metrics(size as f32) {
            Some(m) => (f64::from(m.ascent), f64::from(m.descent)),
            None => (size, -size * 0.25),
        };
        let banner_top = height - (ascent - descent) - 2.0;
        if let Some(rect) =
            Rect::from_xywh(0.0, banner_top as f32, width as f32, (height - banner_top) as f32)
        {
            self.pixmap.fill_rect(
                rect,
                &Self::paint(Color::rgba(0xff, 0xff, 0xff, 0xcc)),
                Transform::identity(),
                None,
            );
        }

        // descent is negative; the baseline sits descent above the bottom.
        let baseline = height + descent - 2.0;
        let mut pen = 4.0f64;
        for ch in text.chars() {
            let (metrics, coverage) = font.rasterize(ch, size as f32);
            let left = pen.round() as i64 + i64::from(metrics.xmin);
            let top = baseline.round() as i64 - i64::from(metrics.ymin) - metrics.height as i64;
            for (i, &cov) in coverage.iter().enumerate() {
                let gx = left + (i % metrics.width) as i64;
                let gy = top + (i / metrics.width) as i64;
                blend_black(&mut self.pixmap, gx, gy, cov);
            }
            pen += f64::from(metrics.advance_width);
        }
    }
}

fn text_width(font: &Font, text: &str, size: f64) -> f64 {
    text.chars()
        .map(|ch| f64::from(font.metrics(ch, size as f32).advance_width))
        .sum()
}

/// Blends black at the given coverage onto one pixel.
fn blend_black(pixmap: &mut Pixmap, x: i64, y: i64, coverage: u8) {
    if coverage == 0 {
        return;
    }
    let (w, h) = (i64::from(pixmap.width()), i64::from(pixmap.height()));
    if x < 0 || y < 0 || x >= w || y >= h {
        return;
    }
    let idx = (y * w + x) as usize;
    let dst = pixmap.pixels_mut()[idx];
    let inv = 255 - u16::from(coverage);
    let fade = |c: u8| ((u16::from(c) * inv + 127) / 255) as u8;
    let alpha = u16::from(coverage) + (u16::from(dst.alpha()) * inv + 127) / 255;
    if let Some(px) = PremultipliedColorU8::from_rgba(
        fade(dst.red()),
        fade(dst.green()),
        fade(dst.blue()),
        alpha.min(255) as u8,
    ) {
        pixmap.pixels_mut()[idx] = px;
    }
}
