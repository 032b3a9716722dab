//! The masked image: configuration, cached raster, and paint passes.
//!
//! [`MaskedImage`] owns an [`ImageConfig`] snapshot, an optional source, the
//! rasterized buffer of that source, and the viewport fixed by the last
//! [`measure`](MaskedImage::measure). Each [`paint`](MaskedImage::paint)
//! recomputes the fit and the mask (both cheap and viewport-dependent) and
//! hands the primitives to a [`Surface`] in order. The source is rasterized
//! once per source change.
//!
//! # Example
//!
//! ```
//! use zenmask::{ImageConfig, MaskShape, MaskedImage, PaintOutcome, RecordingSurface, Size, SolidColor};
//!
//! let mut image = MaskedImage::new(ImageConfig {
//!     shape: MaskShape::Round,
//!     radius: 12,
//!     ..ImageConfig::default()
//! });
//! image.set_source(Some(Box::new(SolidColor::new([200, 40, 40, 255], 64, 48))));
//! let viewport = image.measure(128, 96);
//!
//! let mut surface = RecordingSurface::new(viewport);
//! assert_eq!(image.paint(&mut surface), PaintOutcome::Painted { primitives: 1 });
//! ```

use alloc::boxed::Box;
use alloc::borrow::Cow;

use crate::fit::{FitError, FitPolicy, Gravity, compute_fit};
use crate::geometry::Size;
use crate::mask::{CornerRadii, MaskSpec, build_mask};
use crate::raster::{Drawable, PixelBuffer, RasterError, rasterize};
use crate::sizing::{Sizing, ViewportGeometry};
use crate::surface::{Paint, Surface};

/// Shape of the rounded-image variant.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum MaskShape {
    #[default]
    Circle,
    Round,
}

impl MaskShape {
    /// Integer code: `0` circle, `1` round. Anything else is a circle.
    pub fn from_i32(v: i32) -> Self {
        match v {
            1 => Self::Round,
            _ => Self::Circle,
        }
    }

    pub fn as_i32(self) -> i32 {
        match self {
            Self::Circle => 0,
            Self::Round => 1,
        }
    }
}

/// Scale behavior of the rounded-image variant.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScaleMode {
    /// Stretch each axis to the viewport (`1`).
    Contain,
    /// Cover, centered on the overflowing axis (`2`).
    #[default]
    Cover,
    /// Cover, anchored at the top-left (any other code).
    CoverTop,
}

impl ScaleMode {
    pub fn from_i32(v: i32) -> Self {
        match v {
            1 => Self::Contain,
            2 => Self::Cover,
            _ => Self::CoverTop,
        }
    }

    pub fn as_i32(self) -> i32 {
        match self {
            Self::Contain => 1,
            Self::Cover => 2,
            Self::CoverTop => 0,
        }
    }
}

/// Which kind of image view this is.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Circle or rounded rectangle, per [`MaskShape`].
    #[default]
    Rounded,
    /// Desaturated image with a full-color bottom band.
    Band,
    /// Portrait video cover, center-cropped.
    VideoCover,
}

/// Immutable configuration snapshot. Setters on [`MaskedImage`] replace it
/// wholesale.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ImageConfig {
    pub variant: Variant,
    pub shape: MaskShape,
    /// Uniform corner radius in pixels, already resolved.
    pub radius: i32,
    pub left_top_radius: i32,
    pub left_bottom_radius: i32,
    pub right_top_radius: i32,
    pub right_bottom_radius: i32,
    pub scale_mode: ScaleMode,
    /// Width / height. `<= 0` disables.
    pub aspect_ratio: f32,
    /// Intrinsic size injected by the host.
    pub init_size: Option<(u32, u32)>,
    /// Fraction of the source height shown in full color (band variant).
    pub band_fraction: f32,
    /// Pixels per density-independent unit.
    pub density: f32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            variant: Variant::Rounded,
            shape: MaskShape::Circle,
            radius: 0,
            left_top_radius: 0,
            left_bottom_radius: 0,
            right_top_radius: 0,
            right_bottom_radius: 0,
            scale_mode: ScaleMode::Cover,
            aspect_ratio: -1.0,
            init_size: None,
            band_fraction: 0.5,
            density: 1.0,
        }
    }
}

impl ImageConfig {
    fn is_circle(&self) -> bool {
        self.variant == Variant::Rounded && self.shape == MaskShape::Circle
    }

    /// Corner radii for the rounded mask.
    pub fn corner_radii(&self) -> CornerRadii {
        CornerRadii {
            top_left: self.left_top_radius as f32,
            top_right: self.right_top_radius as f32,
            bottom_left: self.left_bottom_radius as f32,
            bottom_right: self.right_bottom_radius as f32,
            uniform: self.radius as f32,
        }
    }

    /// Measurement hints.
    pub fn sizing(&self) -> Sizing {
        let mut sizing = if self.is_circle() {
            Sizing::circle()
        } else {
            Sizing::new()
        }
        .aspect_ratio(self.aspect_ratio);
        if let Some((w, h)) = self.init_size {
            sizing = sizing.injected_size(w, h);
        }
        sizing
    }

    /// Fit policy and gravity for the current variant.
    pub fn fit_policy(&self) -> (FitPolicy, Gravity) {
        match self.variant {
            Variant::Band => (FitPolicy::ContainScaled, Gravity::Start),
            Variant::VideoCover => (FitPolicy::VerticalCoverCenterCrop, Gravity::Center),
            Variant::Rounded => match (self.scale_mode, self.shape) {
                (ScaleMode::Contain, _) => (FitPolicy::ContainScaled, Gravity::Start),
                (_, MaskShape::Circle) => (FitPolicy::CircleCover, Gravity::Start),
                (ScaleMode::Cover, MaskShape::Round) => (FitPolicy::CoverCropped, Gravity::Center),
                (ScaleMode::CoverTop, MaskShape::Round) => (FitPolicy::CoverCropped, Gravity::Start),
            },
        }
    }

    /// Mask for the current variant.
    pub fn mask_spec(&self) -> MaskSpec {
        match self.variant {
            Variant::Band => MaskSpec::Band {
                fraction: self.band_fraction,
            },
            Variant::VideoCover => MaskSpec::CenterCropBand,
            Variant::Rounded => match self.shape {
                MaskShape::Circle => MaskSpec::Circle,
                MaskShape::Round => MaskSpec::Rounded(self.corner_radii()),
            },
        }
    }

    /// `trunc(dp · density)`.
    fn dp_to_px(&self, dp: i32) -> i32 {
        (dp as f32 * self.density) as i32
    }

    /// `trunc(dp · density + 0.5)`.
    fn dp_to_px_rounded(&self, dp: i32) -> i32 {
        (dp as f32 * self.density + 0.5) as i32
    }
}

/// Work requested of the host since the last
/// [`take_invalidation`](MaskedImage::take_invalidation).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Invalidation {
    /// Measure again before the next paint.
    pub layout: bool,
    /// Paint again.
    pub redraw: bool,
}

impl Invalidation {
    pub fn is_empty(&self) -> bool {
        !self.layout && !self.redraw
    }
}

/// State persisted across host teardown.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SavedState {
    pub mode: i32,
    pub radius: i32,
}

/// Why a paint pass drew nothing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    NoSource,
    /// [`MaskedImage::measure`] has not been called.
    NotMeasured,
    Raster(RasterError),
    Fit(FitError),
}

/// Result of one paint pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PaintOutcome {
    Painted { primitives: usize },
    Skipped(SkipReason),
}

/// A source image painted through a configurable mask.
#[derive(Default)]
pub struct MaskedImage {
    config: ImageConfig,
    source: Option<Box<dyn Drawable>>,
    raster: Option<PixelBuffer>,
    viewport: Option<ViewportGeometry>,
    pending: Invalidation,
}

impl core::fmt::Debug for MaskedImage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MaskedImage")
            .field("config", &self.config)
            .field("has_source", &self.has_source())
            .field("cached", &self.raster.is_some())
            .field("viewport", &self.viewport)
            .field("pending", &self.pending)
            .finish()
    }
}

impl MaskedImage {
    pub fn new(config: ImageConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &ImageConfig {
        &self.config
    }

    /// Replace the whole configuration.
    pub fn set_config(&mut self, config: ImageConfig) {
        if config != self.config {
            self.config = config;
            self.pending.layout = true;
            self.pending.redraw = true;
        }
    }

    /// Set the uniform radius in density-independent units. No-op when the
    /// pixel value is unchanged.
    pub fn set_radius(&mut self, dp: i32) {
        let px = self.config.dp_to_px(dp);
        if px != self.config.radius {
            self.config = ImageConfig {
                radius: px,
                ..self.config
            };
            self.pending.redraw = true;
        }
    }

    /// Set both left corners and the uniform radius.
    pub fn set_left_radius(&mut self, dp: i32) {
        let px = self.config.dp_to_px_rounded(dp);
        self.config = ImageConfig {
            left_top_radius: px,
            left_bottom_radius: px,
            radius: px,
            ..self.config
        };
        self.pending.redraw = true;
    }

    /// Set both right corners and the uniform radius.
    pub fn set_right_radius(&mut self, dp: i32) {
        let px = self.config.dp_to_px_rounded(dp);
        self.config = ImageConfig {
            right_top_radius: px,
            right_bottom_radius: px,
            radius: px,
            ..self.config
        };
        self.pending.redraw = true;
    }

    /// Set the shape by integer code. Unknown codes become a circle.
    pub fn set_type(&mut self, mode: i32) {
        let shape = MaskShape::from_i32(mode);
        if shape != self.config.shape {
            self.config = ImageConfig {
                shape,
                ..self.config
            };
            self.pending.layout = true;
        }
    }

    pub fn set_aspect_ratio(&mut self, ratio: f32) {
        self.config = ImageConfig {
            aspect_ratio: ratio,
            ..self.config
        };
        self.pending.layout = true;
    }

    /// Inject an intrinsic size that overrides the measured aspect.
    pub fn set_init_size(&mut self, width: u32, height: u32) {
        self.config = ImageConfig {
            init_size: Some((width, height)),
            ..self.config
        };
        self.pending.redraw = true;
    }

    pub fn set_band_fraction(&mut self, fraction: f32) {
        self.config = ImageConfig {
            band_fraction: fraction,
            ..self.config
        };
        self.pending.redraw = true;
    }

    /// Replace the source. Drops any cached raster.
    pub fn set_source(&mut self, source: Option<Box<dyn Drawable>>) {
        self.source = source;
        self.raster = None;
        self.pending.redraw = true;
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Take and clear the pending invalidation.
    pub fn take_invalidation(&mut self) -> Invalidation {
        core::mem::take(&mut self.pending)
    }

    /// Fix the viewport from the size layout measured.
    pub fn measure(&mut self, measured_w: u32, measured_h: u32) -> Size {
        let size = self.config.sizing().resolve(measured_w, measured_h);
        self.viewport = Some(ViewportGeometry::new(size));
        self.pending.layout = false;
        size
    }

    /// The viewport fixed by the last [`measure`](Self::measure).
    pub fn viewport(&self) -> Option<Size> {
        self.viewport.map(|v| v.size)
    }

    pub fn save_state(&self) -> SavedState {
        SavedState {
            mode: self.config.shape.as_i32(),
            radius: self.config.radius,
        }
    }

    pub fn restore_state(&mut self, state: &SavedState) {
        self.config = ImageConfig {
            shape: MaskShape::from_i32(state.mode),
            radius: state.radius,
            ..self.config
        };
    }

    /// Rasterize the source if it is not a bitmap and nothing is cached.
    fn ensure_raster(&mut self) -> Result<(), RasterError> {
        let Some(source) = self.source.as_deref() else {
            return Ok(());
        };
        if self.raster.is_some() || source.as_bitmap().is_some() {
            return Ok(());
        }
        if let Cow::Owned(buffer) = rasterize(source)? {
            self.raster = Some(buffer);
        }
        Ok(())
    }

    fn buffer(&self) -> Option<&PixelBuffer> {
        let source = self.source.as_deref()?;
        source.as_bitmap().or(self.raster.as_ref())
    }

    /// Paint one pass onto `surface`.
    pub fn paint(&mut self, surface: &mut dyn Surface) -> PaintOutcome {
        if !self.has_source() {
            tracing::debug!("paint skipped: no source");
            return PaintOutcome::Skipped(SkipReason::NoSource);
        }
        let Some(viewport) = self.viewport else {
            tracing::debug!("paint skipped: not measured");
            return PaintOutcome::Skipped(SkipReason::NotMeasured);
        };
        if let Err(e) = self.ensure_raster() {
            tracing::debug!(error = %e, "paint skipped: rasterization failed");
            return PaintOutcome::Skipped(SkipReason::Raster(e));
        }
        let Some(buffer) = self.buffer() else {
            return PaintOutcome::Skipped(SkipReason::NoSource);
        };

        let (policy, gravity) = self.config.fit_policy();
        let fit = match compute_fit(buffer.size(), viewport.size, policy, gravity) {
            Ok(fit) => fit,
            Err(e) => {
                tracing::debug!(error = %e, ?policy, "paint skipped: no fit");
                return PaintOutcome::Skipped(SkipReason::Fit(e));
            }
        };

        let primitives = build_mask(viewport.size, &self.config.mask_spec(), buffer.size(), &fit);
        for primitive in &primitives {
            tracing::trace!(role = ?primitive.role, tone = ?primitive.tone, "fill");
            surface.fill(&primitive.shape, &Paint::for_primitive(buffer, primitive));
        }
        self.pending.redraw = false;
        PaintOutcome::Painted {
            primitives: primitives.len(),
        }
    }
}
