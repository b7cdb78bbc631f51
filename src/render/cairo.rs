//! Native 2D backend on top of cairo. Only compiled with the `cairo`
//! feature; availability is queryable up front via
//! [`cairo_is_supported`](crate::render::cairo_is_supported), and
//! construction fails with [`Error::CairoUnavailable`] rather than
//! panicking if the capability is missing.

use ::cairo::{Context as CairoContext, Format, FontSlant, FontWeight, ImageSurface, LineCap, LineJoin};

use crate::color::Color;
use crate::geo::PixelPoint;
use crate::render::{cairo_is_supported, ensure_png, fit_font_size, Canvas, Renderer};
use crate::transformer::Transformer;
use crate::{Error, Result};

/// Renders to a cairo image surface.
pub struct CairoRenderer<'a> {
    trans: &'a Transformer,
    surface: ImageSurface,
    context: CairoContext,
    offset: f64,
}

impl<'a> CairoRenderer<'a> {
    pub fn new(trans: &'a Transformer) -> Result<Self> {
        if !cairo_is_supported() {
            return Err(Error::CairoUnavailable);
        }
        let surface = ImageSurface::create(
            Format::ARgb32,
            trans.width() as i32,
            trans.height() as i32,
        )
        .map_err(|e| Error::Render(format!("cannot create cairo surface: {e}")))?;
        let context = CairoContext::new(&surface)
            .map_err(|e| Error::Render(format!("cannot create cairo context: {e}")))?;
        Ok(Self {
            trans,
            surface,
            context,
            offset: 0.0,
        })
    }

    /// Consumes the renderer, returning the finished surface. Write it
    /// out with [`ImageSurface::write_to_png`].
    pub fn into_surface(self) -> ImageSurface {
        drop(self.context);
        self.surface
    }

    pub fn context(&self) -> &CairoContext {
        &self.context
    }

    fn set_source(&self, color: Color) {
        let (r, g, b) = color.float_rgb();
        self.context.set_source_rgba(r, g, b, color.float_a());
    }

    fn trace_path(&self, points: &[PixelPoint], close: bool) -> bool {
        let Some((first, rest)) = points.split_first() else {
            return false;
        };
        self.context.new_path();
        self.context.move_to(first.x + self.offset, first.y);
        for p in rest {
            self.context.line_to(p.x + self.offset, p.y);
        }
        if close {
            self.context.close_path();
        }
        true
    }

    fn fill_and_stroke(&self, fill: Color, outline: Color, width: f64) {
        if !fill.is_transparent() {
            self.set_source(fill);
            if let Err(e) = self.context.fill_preserve() {
                log::warn!("cairo fill failed: {e}");
            }
        }
        if !outline.is_transparent() && width > 0.0 {
            self.set_source(outline);
            self.context.set_line_width(width);
            self.context.set_line_cap(LineCap::Round);
            self.context.set_line_join(LineJoin::Round);
            if let Err(e) = self.context.stroke() {
                log::warn!("cairo stroke failed: {e}");
            }
        } else {
            self.context.new_path();
        }
    }
}

impl Canvas for CairoRenderer<'_> {
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
        if color.is_transparent() || width <= 0.0 || !self.trace_path(points, false) {
            return;
        }
        self.set_source(color);
        self.context.set_line_width(width);
        self.context.set_line_cap(LineCap::Round);
        self.context.set_line_join(LineJoin::Round);
        if let Err(e) = self.context.stroke() {
            log::warn!("cairo stroke failed: {e}");
        }
    }

    fn draw_polygon(&mut self, points: &[PixelPoint], fill: Color, outline: Color, width: f64) {
        if !self.trace_path(points, true) {
            return;
        }
        self.fill_and_stroke(fill, outline, width);
    }

    fn draw_circle(
        &mut self,
        center: PixelPoint,
        radius: f64,
        fill: Color,
        outline: Color,
        width: f64,
    ) {
        self.context.new_path();
        self.context.arc(
            center.x + self.offset,
            center.y,
            radius,
            0.0,
            2.0 * std::f64::consts::PI,
        );
        self.fill_and_stroke(fill, outline, width);
    }

    fn draw_image(&mut self, top_left: PixelPoint, data: &[u8], _width: f64, _height: f64) {
        let png = match ensure_png(data) {
            Ok(png) => png,
            Err(err) => {
                log::warn!("skipping undecodable image: {err}");
                return;
            }
        };
        let surface = match ImageSurface::create_from_png(&mut png.as_ref()) {
            Ok(surface) => surface,
            Err(err) => {
                log::warn!("skipping undecodable image: {err}");
                return;
            }
        };
        let draw = || -> std::result::Result<(), ::cairo::Error> {
            self.context.save()?;
            self.context.set_source_surface(
                &surface,
                (top_left.x + self.offset).round(),
                top_left.y.round(),
            )?;
            self.context.paint()?;
            self.context.restore()
        };
        if let Err(e) = draw() {
            log::warn!("cairo image paint failed: {e}");
        }
    }
}

impl Renderer for CairoRenderer<'_> {
    fn render_attribution(&mut self, attribution: Option<&str>) {
        let Some(text) = attribution.filter(|t| !t.is_empty()) else {
            return;
        };
        let width = f64::from(self.trans.width());
        let height = f64::from(self.trans.height());

        self.context
            .select_font_face("Sans", FontSlant::Normal, FontWeight::Normal);
        let size = fit_font_size(width, |s| {
            self.context.set_font_size(s);
            self.context
                .text_extents(text)
                .map(|e| e.width())
                .unwrap_or(0.0)
        });
        self.context.set_font_size(size);
        let (descent, font_height) = match self.context.font_extents() {
            Ok(e) => (e.descent(), e.height()),
            Err(_) => (size * 0.25, size * 1.25),
        };

        let banner_height = font_height + descent + 2.0;
        self.context.set_source_rgba(1.0, 1.0, 1.0, 0.8);
        self.context
            .rectangle(0.0, height - banner_height, width, banner_height);
        if let Err(e) = self.context.fill() {
            log::warn!("cairo fill failed: {e}");
        }

        self.context.set_source_rgb(0.0, 0.0, 0.0);
        self.context.move_to(4.0, height - descent - 2.0);
        if let Err(e) = self.context.show_text(text) {
            log::warn!("cairo text failed: {e}");
        }
    }
}
