//! Fit policies and the source → viewport sampling transform.
//!
//! [`compute_fit`] maps a source bitmap onto a viewport. The result is a
//! [`Transform2D`] (scale then translate) that the surface uses as the
//! sampling basis for every masked fill, or [`Fit::PassThrough`] when the
//! policy declines to transform the source at all.
//!
//! # Example
//!
//! ```
//! use zenmask::{Fit, FitPolicy, Gravity, Size, compute_fit};
//!
//! let fit = compute_fit(
//!     Size::new(500, 1000),
//!     Size::new(400, 400),
//!     FitPolicy::VerticalCoverCenterCrop,
//!     Gravity::Center,
//! )
//! .unwrap();
//! let t = fit.transform().unwrap();
//! assert_eq!((t.sx, t.sy), (0.8, 0.8));
//! assert_eq!(t.ty, -200.0);
//! ```

use num_traits::Float;

use crate::geometry::{PointF, Rect, RectF, Size};

/// How a source is scaled into the viewport.
#[non_exhaustive]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FitPolicy {
    /// Scale each axis independently to exactly fill the viewport.
    /// Ignores aspect ratio; the image may distort.
    ContainScaled,

    /// Scale uniformly to fill the viewport, cropping overflow.
    /// The overflowing axis is positioned by [`Gravity`].
    CoverCropped,

    /// Scale uniformly so the source's shorter side spans the circle diameter
    /// (the viewport's shorter side). No translation.
    CircleCover,

    /// Portrait video-cover: cover and center both axes, but only for
    /// portrait sources. Landscape and square sources pass through untouched.
    VerticalCoverCenterCrop,
}

/// Where the overflowing axis sits when cropping.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum Gravity {
    /// Aligned to the top (or left) edge.
    Start,
    /// Centered.
    #[default]
    Center,
    /// Position by fraction. `0.0` = start, `1.0` = end. Clamped.
    Percentage(f32),
}

impl Gravity {
    /// The gravity as a fraction of the overflow, in `0.0..=1.0`.
    pub fn fraction(&self) -> f32 {
        match *self {
            Self::Start => 0.0,
            Self::Center => 0.5,
            Self::Percentage(p) if p.is_nan() => 0.5,
            Self::Percentage(p) => p.clamp(0.0, 1.0),
        }
    }
}

/// Scale followed by translate, mapping source pixels into viewport space.
///
/// `x' = sx · x + tx`, `y' = sy · y + ty`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform2D {
    pub sx: f32,
    pub sy: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform2D {
    pub const IDENTITY: Self = Self {
        sx: 1.0,
        sy: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// A pure scale.
    pub const fn scale(sx: f32, sy: f32) -> Self {
        Self {
            sx,
            sy,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Append a translation (applied after the scale).
    pub const fn post_translate(self, dx: f32, dy: f32) -> Self {
        Self {
            tx: self.tx + dx,
            ty: self.ty + dy,
            ..self
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Map a source point into viewport space.
    pub fn map_point(&self, p: PointF) -> PointF {
        PointF::new(self.sx * p.x + self.tx, self.sy * p.y + self.ty)
    }

    /// Map a viewport point back into source space.
    ///
    /// Returns `None` when either scale factor is zero.
    pub fn invert_point(&self, p: PointF) -> Option<PointF> {
        if self.sx == 0.0 || self.sy == 0.0 {
            return None;
        }
        Some(PointF::new((p.x - self.tx) / self.sx, (p.y - self.ty) / self.sy))
    }

    /// Map a source rectangle into viewport space.
    pub fn map_rect(&self, r: RectF) -> RectF {
        let a = self.map_point(PointF::new(r.left, r.top));
        let b = self.map_point(PointF::new(r.right, r.bottom));
        RectF::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
    }

    /// Source pixels that land inside the viewport, expanded to whole pixels
    /// and clamped to the source bounds.
    pub fn visible_source(&self, viewport: Size, source: Size) -> Rect {
        let (Some(a), Some(b)) = (
            self.invert_point(PointF::new(0.0, 0.0)),
            self.invert_point(PointF::new(viewport.width as f32, viewport.height as f32)),
        ) else {
            return Rect::new(0, 0, 0, 0);
        };
        let sw = source.width as f32;
        let sh = source.height as f32;
        let left = Float::floor(a.x.min(b.x)).clamp(0.0, sw);
        let top = Float::floor(a.y.min(b.y)).clamp(0.0, sh);
        let right = Float::ceil(a.x.max(b.x)).clamp(0.0, sw);
        let bottom = Float::ceil(a.y.max(b.y)).clamp(0.0, sh);
        Rect::new(
            left as u32,
            top as u32,
            (right - left) as u32,
            (bottom - top) as u32,
        )
    }
}

/// Outcome of a fit computation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Fit {
    /// Sample the source through this transform.
    Transform(Transform2D),
    /// Paint the source unscaled and unmasked.
    PassThrough,
}

impl Fit {
    /// The transform, if the source is transformed at all.
    pub fn transform(&self) -> Option<Transform2D> {
        match self {
            Self::Transform(t) => Some(*t),
            Self::PassThrough => None,
        }
    }

    /// The transform to sample with; identity for pass-through.
    pub fn sampling_transform(&self) -> Transform2D {
        self.transform().unwrap_or(Transform2D::IDENTITY)
    }
}

/// Fit computation error.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FitError {
    /// Source image has zero width or height.
    #[error("source has a zero dimension")]
    ZeroSourceDimension,
    /// Viewport has zero width or height.
    #[error("viewport has a zero dimension")]
    ZeroViewportDimension,
}

/// Compute the sampling transform that maps `source` onto `viewport`.
///
/// `gravity` only affects [`FitPolicy::CoverCropped`].
pub fn compute_fit(
    source: Size,
    viewport: Size,
    policy: FitPolicy,
    gravity: Gravity,
) -> Result<Fit, FitError> {
    if source.is_empty() {
        return Err(FitError::ZeroSourceDimension);
    }
    if viewport.is_empty() {
        return Err(FitError::ZeroViewportDimension);
    }

    let sw = source.width as f32;
    let sh = source.height as f32;
    let dw = viewport.width as f32;
    let dh = viewport.height as f32;
    let ratio_w = dw / sw;
    let ratio_h = dh / sh;

    let transform = match policy {
        FitPolicy::ContainScaled => Transform2D::scale(ratio_w, ratio_h),

        FitPolicy::CoverCropped => {
            let s = ratio_w.max(ratio_h);
            let g = gravity.fraction();
            Transform2D::scale(s, s).post_translate(-(sw * s - dw) * g, -(sh * s - dh) * g)
        }

        FitPolicy::CircleCover => {
            let s = viewport.min_side() as f32 / source.min_side() as f32;
            Transform2D::scale(s, s)
        }

        FitPolicy::VerticalCoverCenterCrop => {
            if !source.is_portrait() {
                return Ok(Fit::PassThrough);
            }
            let s = ratio_w.max(ratio_h);
            Transform2D::scale(s, s).post_translate(-(sw * s - dw) / 2.0, -(sh * s - dh) / 2.0)
        }
    };

    Ok(Fit::Transform(transform))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform(src: (u32, u32), dst: (u32, u32), policy: FitPolicy, g: Gravity) -> Transform2D {
        compute_fit(
            Size::new(src.0, src.1),
            Size::new(dst.0, dst.1),
            policy,
            g,
        )
        .unwrap()
        .transform()
        .unwrap()
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() <= 1e-3 * a.abs().max(b.abs()).max(1.0)
    }

    // ── ContainScaled ───────────────────────────────────────────────────

    #[test]
    fn contain_scales_axes_independently() {
        let t = transform((1000, 500), (400, 300), FitPolicy::ContainScaled, Gravity::Center);
        assert_eq!(t, Transform2D::scale(0.4, 0.6));
    }

    // ── CoverCropped ────────────────────────────────────────────────────

    #[test]
    fn cover_uses_larger_ratio() {
        let t = transform((1000, 500), (400, 300), FitPolicy::CoverCropped, Gravity::Start);
        assert_eq!((t.sx, t.sy), (0.6, 0.6));
        assert_eq!((t.tx, t.ty), (0.0, 0.0));
    }

    #[test]
    fn cover_centers_overflowing_axis() {
        // 1000×500 at 0.6 → 600×300; 200px horizontal overflow.
        let t = transform((1000, 500), (400, 300), FitPolicy::CoverCropped, Gravity::Center);
        assert!(close(t.tx, -100.0), "{t:?}");
        assert!(close(t.ty, 0.0), "{t:?}");

        // 500×1000 into 400×400 → scale 0.8 → 400×800; 400px vertical overflow.
        let t = transform((500, 1000), (400, 400), FitPolicy::CoverCropped, Gravity::Center);
        assert!(close(t.ty, -200.0), "{t:?}");
        assert!(close(t.tx, 0.0), "{t:?}");
    }

    #[test]
    fn cover_gravity_end_aligns_bottom() {
        let t = transform(
            (500, 1000),
            (400, 400),
            FitPolicy::CoverCropped,
            Gravity::Percentage(1.0),
        );
        assert!(close(t.ty, -400.0), "{t:?}");
    }

    #[test]
    fn cover_fills_viewport_everywhere() {
        let sizes = [1u32, 3, 17, 100, 333, 640, 1001, 4000];
        for &sw in &sizes {
            for &sh in &sizes {
                for &dw in &sizes {
                    for &dh in &sizes {
                        let t = transform((sw, sh), (dw, dh), FitPolicy::CoverCropped, Gravity::Center);
                        let expected = (dw as f32 / sw as f32).max(dh as f32 / sh as f32);
                        assert_eq!(t.sx, expected);
                        assert_eq!(t.sy, expected);
                        let tag = format!("{sw}x{sh} -> {dw}x{dh}");
                        assert!(sw as f32 * t.sx >= dw as f32 * (1.0 - 1e-6), "{tag}");
                        assert!(sh as f32 * t.sy >= dh as f32 * (1.0 - 1e-6), "{tag}");
                        // Scaled image covers [0, dw] × [0, dh].
                        let r = t.map_rect(RectF::from_size(Size::new(sw, sh)));
                        let eps = 1e-3 * dw.max(dh) as f32;
                        assert!(r.left <= eps && r.top <= eps, "{tag}: {r:?}");
                        assert!(r.right >= dw as f32 - eps, "{tag}: {r:?}");
                        assert!(r.bottom >= dh as f32 - eps, "{tag}: {r:?}");
                    }
                }
            }
        }
    }

    // ── CircleCover ─────────────────────────────────────────────────────

    #[test]
    fn circle_cover_uses_short_sides() {
        let t = transform((1000, 500), (200, 200), FitPolicy::CircleCover, Gravity::Center);
        assert_eq!(t, Transform2D::scale(0.4, 0.4));
        let t = transform((300, 900), (150, 150), FitPolicy::CircleCover, Gravity::Center);
        assert_eq!(t, Transform2D::scale(0.5, 0.5));
    }

    // ── VerticalCoverCenterCrop ─────────────────────────────────────────

    #[test]
    fn vertical_cover_portrait_scenario() {
        let t = transform(
            (500, 1000),
            (400, 400),
            FitPolicy::VerticalCoverCenterCrop,
            Gravity::Start,
        );
        assert_eq!(t.sx, 0.8);
        assert_eq!(t.sy, 0.8);
        assert!(close(t.tx, 0.0), "{t:?}");
        assert!(close(t.ty, -200.0), "{t:?}");
    }

    #[test]
    fn vertical_cover_landscape_passes_through() {
        let fit = compute_fit(
            Size::new(1000, 500),
            Size::new(400, 400),
            FitPolicy::VerticalCoverCenterCrop,
            Gravity::Center,
        )
        .unwrap();
        assert_eq!(fit, Fit::PassThrough);
        assert_eq!(fit.sampling_transform(), Transform2D::IDENTITY);
    }

    #[test]
    fn vertical_cover_square_passes_through() {
        let fit = compute_fit(
            Size::new(600, 600),
            Size::new(400, 400),
            FitPolicy::VerticalCoverCenterCrop,
            Gravity::Center,
        )
        .unwrap();
        assert_eq!(fit, Fit::PassThrough);
    }

    // ── Errors and purity ───────────────────────────────────────────────

    #[test]
    fn zero_dimensions_rejected() {
        let p = FitPolicy::CoverCropped;
        assert_eq!(
            compute_fit(Size::new(0, 10), Size::new(10, 10), p, Gravity::Center),
            Err(FitError::ZeroSourceDimension)
        );
        assert_eq!(
            compute_fit(Size::new(10, 10), Size::new(10, 0), p, Gravity::Center),
            Err(FitError::ZeroViewportDimension)
        );
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        for policy in [
            FitPolicy::ContainScaled,
            FitPolicy::CoverCropped,
            FitPolicy::CircleCover,
            FitPolicy::VerticalCoverCenterCrop,
        ] {
            let a = transform((333, 777), (123, 321), policy, Gravity::Center);
            let b = transform((333, 777), (123, 321), policy, Gravity::Center);
            assert_eq!(a.sx.to_bits(), b.sx.to_bits());
            assert_eq!(a.sy.to_bits(), b.sy.to_bits());
            assert_eq!(a.tx.to_bits(), b.tx.to_bits());
            assert_eq!(a.ty.to_bits(), b.ty.to_bits());
        }
    }

    // ── Gravity and transform helpers ───────────────────────────────────

    #[test]
    fn gravity_fraction_clamps() {
        assert_eq!(Gravity::Start.fraction(), 0.0);
        assert_eq!(Gravity::Center.fraction(), 0.5);
        assert_eq!(Gravity::Percentage(-3.0).fraction(), 0.0);
        assert_eq!(Gravity::Percentage(7.0).fraction(), 1.0);
        assert_eq!(Gravity::Percentage(f32::NAN).fraction(), 0.5);
    }

    #[test]
    fn invert_round_trips() {
        let t = Transform2D::scale(0.5, 2.0).post_translate(-10.0, 4.0);
        let p = PointF::new(12.0, 7.0);
        let back = t.invert_point(t.map_point(p)).unwrap();
        assert!(close(back.x, p.x) && close(back.y, p.y));
        assert!(Transform2D::scale(0.0, 1.0).invert_point(p).is_none());
    }

    #[test]
    fn visible_source_of_centered_cover() {
        let t = transform((500, 1000), (400, 400), FitPolicy::CoverCropped, Gravity::Center);
        // Rows 250..750 of the source land in the viewport.
        assert_eq!(
            t.visible_source(Size::new(400, 400), Size::new(500, 1000)),
            Rect::new(0, 250, 500, 500)
        );
    }
}
