//! A [`Surface`] that rasterizes fills into a tiny-skia [`Pixmap`].
//!
//! Each fill samples the source through a clamped image pattern, so pixels
//! outside the source (or outside a band clip) repeat the nearest edge.
//! Desaturated and clipped fills work on a temporary copy of the source that
//! is dropped before `fill` returns.

use alloc::borrow::Cow;

use tiny_skia::{
    FillRule, FilterQuality, IntSize, Paint as SkPaint, Path, PathBuilder, Pattern, Pixmap,
    SpreadMode, Transform,
};

use crate::geometry::{RectF, Size};
use crate::mask::{Shape, Tone};
use crate::surface::{Paint, Surface};

/// Circle/ellipse cubic control point factor.
const KAPPA: f32 = 0.552_284_75;

/// Surface creation error.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    #[error("cannot allocate a {width}x{height} pixmap")]
    InvalidSize { width: u32, height: u32 },
}

/// A tiny-skia backed drawing surface.
#[derive(Clone, Debug)]
pub struct PixmapSurface {
    pixmap: Pixmap,
    filter: FilterQuality,
    anti_alias: bool,
}

impl PixmapSurface {
    /// A transparent surface of `size`.
    pub fn new(size: Size) -> Result<Self, SurfaceError> {
        let pixmap = Pixmap::new(size.width, size.height).ok_or(SurfaceError::InvalidSize {
            width: size.width,
            height: size.height,
        })?;
        Ok(Self {
            pixmap,
            filter: FilterQuality::Bilinear,
            anti_alias: true,
        })
    }

    /// Sampling filter for the source pattern. Defaults to bilinear.
    pub fn with_filter(mut self, filter: FilterQuality) -> Self {
        self.filter = filter;
        self
    }

    /// Edge anti-aliasing. On by default.
    pub fn with_anti_alias(mut self, anti_alias: bool) -> Self {
        self.anti_alias = anti_alias;
        self
    }

    pub fn size(&self) -> Size {
        Size::new(self.pixmap.width(), self.pixmap.height())
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn into_pixmap(self) -> Pixmap {
        self.pixmap
    }

    /// Straight-alpha RGBA of one pixel, `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }
}

impl Surface for PixmapSurface {
    fn fill(&mut self, shape: &Shape, paint: &Paint<'_>) {
        let region = paint.source_region();
        if region.width == 0 || region.height == 0 {
            tracing::trace!(?region, "fill skipped: empty source region");
            return;
        }

        let buffer = paint.buffer;
        let mut pixels = if region.is_full(buffer.width(), buffer.height()) {
            Cow::Borrowed(buffer)
        } else {
            Cow::Owned(buffer.region(region))
        };
        if paint.tone == Tone::Desaturated {
            pixels = Cow::Owned(pixels.desaturated());
        }

        let mut data = pixels.to_rgba8();
        premultiply_rgba8_in_place(&mut data);
        let Some(source) = IntSize::from_wh(region.width, region.height)
            .and_then(|size| Pixmap::from_vec(data, size))
        else {
            tracing::debug!(?region, "fill skipped: cannot wrap source pixels");
            return;
        };

        let Some(path) = build_path(shape) else {
            tracing::trace!(?shape, "fill skipped: degenerate shape");
            return;
        };

        // The pattern's origin is the region's top-left, not the source's.
        let t = paint.transform;
        let transform = Transform::from_row(
            t.sx,
            0.0,
            0.0,
            t.sy,
            t.tx + t.sx * region.x as f32,
            t.ty + t.sy * region.y as f32,
        );
        let sk_paint = SkPaint {
            shader: Pattern::new(
                source.as_ref(),
                SpreadMode::Pad,
                self.filter,
                1.0,
                transform,
            ),
            anti_alias: self.anti_alias,
            ..SkPaint::default()
        };
        self.pixmap.fill_path(
            &path,
            &sk_paint,
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }
}

fn build_path(shape: &Shape) -> Option<Path> {
    match *shape {
        Shape::Circle { center, radius } => PathBuilder::from_circle(center.x, center.y, radius),
        Shape::Rect(r) => rect(r).map(PathBuilder::from_rect),
        Shape::RoundRect { rect: r, radius } => round_rect(r, radius),
    }
}

fn rect(r: RectF) -> Option<tiny_skia::Rect> {
    tiny_skia::Rect::from_ltrb(r.left, r.top, r.right, r.bottom)
}

/// Rounded rectangle with the same radius on every corner. The radius is
/// limited to half the shorter side.
fn round_rect(r: RectF, radius: f32) -> Option<Path> {
    let radius = radius.min(r.width() / 2.0).min(r.height() / 2.0);
    if radius <= 0.0 {
        return rect(r).map(PathBuilder::from_rect);
    }
    let (left, top, right, bottom) = (r.left, r.top, r.right, r.bottom);
    let k = radius * KAPPA;

    let mut pb = PathBuilder::new();
    pb.move_to(left + radius, top);
    pb.line_to(right - radius, top);
    pb.cubic_to(right - radius + k, top, right, top + radius - k, right, top + radius);
    pb.line_to(right, bottom - radius);
    pb.cubic_to(right, bottom - radius + k, right - radius + k, bottom, right - radius, bottom);
    pb.line_to(left + radius, bottom);
    pb.cubic_to(left + radius - k, bottom, left, bottom - radius + k, left, bottom - radius);
    pb.line_to(left, top + radius);
    pb.cubic_to(left, top + radius - k, left + radius - k, top, left + radius, top);
    pb.close();
    pb.finish()
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}
