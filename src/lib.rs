//! Image fitting and shape masking for constrained viewports.
//!
//! Paints a source image into a circle, a rounded rectangle with
//! independently squared corners, a desaturated frame with a full-color
//! bottom band, or a center-cropped portrait cover. The crate computes
//! *what* to paint (the source → viewport transform and an ordered list of
//! fill primitives) and hands it to a [`Surface`].
//!
//! # Modules
//!
//! - [`raster`]: `Drawable` sources, pixel buffers, rasterization
//! - [`sizing`]: viewport measurement (circle squares, aspect ratio, injected size)
//! - [`fit`]: fit policies and the sampling transform
//! - [`mask`]: mask geometry as ordered fill primitives
//! - [`render`]: `MaskedImage`, configuration snapshots, paint passes
//! - [`surface`]: the `Surface` hand-off and a recording surface
//! - [`attrs`]: `key=value&...` attribute strings
//! - `skia` (feature `tiny-skia`): a tiny-skia pixmap surface
//! - `svg` (feature `svg`): debug documents of mask geometry
//!
//! # Example
//!
//! ```
//! use zenmask::{MaskedImage, PaintOutcome, RecordingSurface, SolidColor, attrs};
//!
//! let config = attrs::parse("shape=rounded&radius=16&right_top_radius=16&right_bottom_radius=16")
//!     .attributes
//!     .to_config();
//! let mut image = MaskedImage::new(config);
//! image.set_source(Some(Box::new(SolidColor::new([30, 90, 200, 255], 320, 240))));
//!
//! let viewport = image.measure(160, 120);
//! let mut surface = RecordingSurface::new(viewport);
//!
//! // Rounded base plus square patches on both left corners.
//! assert_eq!(image.paint(&mut surface), PaintOutcome::Painted { primitives: 3 });
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

pub mod attrs;
pub mod fit;
pub mod geometry;
pub mod mask;
pub mod raster;
pub mod render;
pub mod sizing;
#[cfg(feature = "tiny-skia")]
pub mod skia;
pub mod surface;
#[cfg(feature = "svg")]
pub mod svg;

pub use fit::{Fit, FitError, FitPolicy, Gravity, Transform2D, compute_fit};
pub use geometry::{PointF, Rect, RectF, Size};
pub use mask::{Corner, CornerRadii, FillPrimitive, MaskSpec, Role, Shape, Tone, build_mask};
pub use raster::{Drawable, Opacity, PixelBuffer, PixelFormat, RasterError, SolidColor, rasterize};
pub use render::{
    ImageConfig, Invalidation, MaskShape, MaskedImage, PaintOutcome, SavedState, ScaleMode,
    SkipReason, Variant,
};
pub use sizing::{Sizing, ViewportGeometry};
#[cfg(feature = "tiny-skia")]
pub use skia::{PixmapSurface, SurfaceError};
pub use surface::{DrawCommand, Paint, RecordingSurface, Surface};
