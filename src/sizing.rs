//! Viewport measurement policy.
//!
//! Decides the final viewport dimensions from the size the host layout
//! measured plus the sizing hints carried by the configuration. Policies are
//! tried in a fixed priority order and the first that applies wins:
//!
//! 1. an injected intrinsic size scales to the measured width,
//! 2. circle mode forces a square of the smaller measured side,
//! 3. a positive aspect ratio derives the height from the measured width,
//! 4. otherwise the measured size passes through.
//!
//! # Example
//!
//! ```
//! use zenmask::{Size, Sizing};
//!
//! // Circle mode never upscales beyond what layout measured.
//! assert_eq!(Sizing::circle().resolve(300, 200), Size::new(200, 200));
//!
//! // An injected 16:9 size wins over circle mode.
//! let s = Sizing::circle().injected_size(1600, 900).resolve(320, 1000);
//! assert_eq!(s, Size::new(320, 180));
//! ```

use crate::geometry::{PointF, RectF, Size};

/// Sizing hints for one viewport.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Sizing {
    /// Force a square bounding box (circle mode).
    pub circle: bool,
    /// Intrinsic `(width, height)` injected by the host, overriding layout.
    pub injected: Option<(u32, u32)>,
    /// Target width / height ratio. Values `<= 0` disable it.
    pub aspect_ratio: f32,
}

impl Sizing {
    /// Sizing for a non-circular viewport with no hints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sizing for a circular viewport.
    pub fn circle() -> Self {
        Self {
            circle: true,
            ..Self::default()
        }
    }

    /// Inject an intrinsic size. Ignored unless both axes are positive.
    pub fn injected_size(mut self, width: u32, height: u32) -> Self {
        self.injected = Some((width, height));
        self
    }

    /// Set the width / height ratio.
    pub fn aspect_ratio(mut self, ratio: f32) -> Self {
        self.aspect_ratio = ratio;
        self
    }

    /// Resolve the final viewport size from the measured layout size.
    pub fn resolve(&self, measured_w: u32, measured_h: u32) -> Size {
        if let Some((iw, ih)) = self.injected
            && iw > 0
            && ih > 0
        {
            let scale = ih as f32 / iw as f32;
            let height = if measured_w > 0 {
                (measured_w as f32 * scale) as u32
            } else {
                measured_h
            };
            return Size::new(measured_w, height);
        }

        if self.circle {
            let side = measured_w.min(measured_h);
            return Size::new(side, side);
        }

        if self.aspect_ratio > 0.0 {
            let height = (measured_w as f32 / self.aspect_ratio) as u32;
            return Size::new(measured_w, height);
        }

        Size::new(measured_w, measured_h)
    }
}

/// A resolved viewport, cached between layout passes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ViewportGeometry {
    pub size: Size,
}

impl ViewportGeometry {
    pub const fn new(size: Size) -> Self {
        Self { size }
    }

    /// Destination rectangle for rounded mode: the full viewport.
    pub fn bounds(&self) -> RectF {
        RectF::from_size(self.size)
    }

    /// Circle center and radius for circle mode.
    ///
    /// The radius is half the smaller side in whole pixels; the center is the
    /// viewport center, which differs from `(radius, radius)` only when an
    /// injected size leaves the viewport non-square.
    pub fn circle(&self) -> (PointF, f32) {
        let r = (self.size.min_side() / 2) as f32;
        let center = PointF::new(
            self.size.width as f32 / 2.0,
            self.size.height as f32 / 2.0,
        );
        (center, r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_without_hints() {
        assert_eq!(Sizing::new().resolve(640, 480), Size::new(640, 480));
    }

    #[test]
    fn circle_takes_smaller_side() {
        for (w, h) in [(300, 200), (200, 300), (0, 50), (128, 128), (1, 9999)] {
            let s = Sizing::circle().resolve(w, h);
            assert_eq!(s.width, s.height, "{w}x{h}");
            assert_eq!(s.width, w.min(h), "{w}x{h}");
        }
    }

    #[test]
    fn injected_size_scales_to_width() {
        for mw in [0u32, 1, 7, 320, 1080, 4096] {
            let s = Sizing::new().injected_size(400, 300).resolve(mw, 55);
            assert_eq!(s.width, mw);
            if mw > 0 {
                assert_eq!(s.height, (mw as f32 * (300.0 / 400.0)) as u32);
            } else {
                assert_eq!(s.height, 55);
            }
        }
    }

    #[test]
    fn injected_size_beats_circle_and_aspect() {
        let s = Sizing::circle()
            .aspect_ratio(2.0)
            .injected_size(100, 300)
            .resolve(200, 50);
        assert_eq!(s, Size::new(200, 600));
    }

    #[test]
    fn injected_zero_axis_is_ignored() {
        let s = Sizing::circle().injected_size(0, 300).resolve(200, 50);
        assert_eq!(s, Size::new(50, 50));
    }

    #[test]
    fn circle_beats_aspect_ratio() {
        let s = Sizing::circle().aspect_ratio(0.5).resolve(200, 100);
        assert_eq!(s, Size::new(100, 100));
    }

    #[test]
    fn aspect_ratio_derives_height() {
        assert_eq!(
            Sizing::new().aspect_ratio(1.5).resolve(300, 999),
            Size::new(300, 200)
        );
        // Truncates, like integer layout.
        assert_eq!(
            Sizing::new().aspect_ratio(3.0).resolve(100, 999),
            Size::new(100, 33)
        );
    }

    #[test]
    fn non_positive_aspect_ratio_disabled() {
        for r in [0.0, -1.0, f32::NAN] {
            assert_eq!(
                Sizing::new().aspect_ratio(r).resolve(300, 120),
                Size::new(300, 120)
            );
        }
    }

    #[test]
    fn viewport_circle_geometry() {
        let (c, r) = ViewportGeometry::new(Size::new(100, 100)).circle();
        assert_eq!(r, 50.0);
        assert_eq!(c, PointF::new(50.0, 50.0));
        let (c, r) = ViewportGeometry::new(Size::new(101, 101)).circle();
        assert_eq!(r, 50.0);
        assert_eq!(c, PointF::new(50.5, 50.5));
        // Injected sizes can leave circle mode non-square.
        let (c, r) = ViewportGeometry::new(Size::new(120, 80)).circle();
        assert_eq!(r, 40.0);
        assert_eq!(c, PointF::new(60.0, 40.0));
        let b = ViewportGeometry::new(Size::new(30, 20)).bounds();
        assert_eq!(b, RectF::new(0.0, 0.0, 30.0, 20.0));
    }
}
