//! Mask geometry: the ordered fill primitives that paint a masked image.
//!
//! [`build_mask`] turns a viewport, a [`MaskSpec`], and the fit computed for
//! the current source into a list of [`FillPrimitive`]s. Order matters: later
//! primitives paint over earlier ones where they overlap (corner patches over
//! the rounded base, the full-color band over the desaturated base).
//!
//! Every primitive carries its own sampling transform and tone, so a surface
//! can fill them one by one without knowing which mask produced them.

use alloc::vec::Vec;

use crate::fit::{Fit, Transform2D};
use crate::geometry::{PointF, Rect, RectF, Size};
use crate::sizing::ViewportGeometry;

/// One corner of a rectangle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// Patch order: top-left, top-right, bottom-left, bottom-right.
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];
}

/// Per-corner radii plus the uniform radius used for every arc of the base
/// rounded rectangle.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct CornerRadii {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_left: f32,
    pub bottom_right: f32,
    /// Radius of all four arcs of the base shape, and the side of each
    /// square corner patch.
    pub uniform: f32,
}

impl CornerRadii {
    /// Resolve radii from an optional explicit uniform radius and the four
    /// per-corner values.
    ///
    /// Without an explicit radius, the first nonzero corner in the order
    /// bottom-left, top-left, bottom-right, top-right becomes the uniform
    /// radius (top-right is taken as-is, even when zero).
    pub fn new(
        explicit: Option<f32>,
        top_left: f32,
        top_right: f32,
        bottom_left: f32,
        bottom_right: f32,
    ) -> Self {
        let uniform = explicit.unwrap_or_else(|| {
            [bottom_left, top_left, bottom_right]
                .into_iter()
                .find(|&r| r != 0.0)
                .unwrap_or(top_right)
        });
        Self {
            top_left,
            top_right,
            bottom_left,
            bottom_right,
            uniform,
        }
    }

    /// A plain rounded rectangle: uniform arcs, no per-corner overrides.
    pub fn uniform(radius: f32) -> Self {
        Self {
            uniform: radius,
            ..Self::default()
        }
    }

    /// The configured radius of one corner.
    pub fn get(&self, corner: Corner) -> f32 {
        match corner {
            Corner::TopLeft => self.top_left,
            Corner::TopRight => self.top_right,
            Corner::BottomLeft => self.bottom_left,
            Corner::BottomRight => self.bottom_right,
        }
    }

    /// Whether any corner carries its own nonzero radius. Patches are only
    /// emitted in that case.
    pub fn has_corner_overrides(&self) -> bool {
        Corner::ALL.iter().any(|&c| self.get(c) != 0.0)
    }

    /// Corners that get a square patch, in patch order.
    pub fn squared_corners(&self) -> impl Iterator<Item = Corner> + '_ {
        let active = self.has_corner_overrides();
        Corner::ALL
            .into_iter()
            .filter(move |&c| active && self.get(c) == 0.0)
    }
}

/// Which mask to build.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MaskSpec {
    /// A circle of the viewport's shorter side, anchored top-left.
    Circle,
    /// A rounded rectangle over the full viewport, with optional square corners.
    Rounded(CornerRadii),
    /// Desaturated image with a full-color band along the bottom `fraction`
    /// of the source height. The fraction is clamped to `0.0..=1.0`.
    Band { fraction: f32 },
    /// The full viewport, filled through a portrait center crop.
    CenterCropBand,
}

/// Geometry of one fill.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Shape {
    Circle { center: PointF, radius: f32 },
    RoundRect { rect: RectF, radius: f32 },
    Rect(RectF),
}

impl Shape {
    /// Axis-aligned bounds of the shape.
    pub fn bounds(&self) -> RectF {
        match *self {
            Shape::Circle { center, radius } => RectF::new(
                center.x - radius,
                center.y - radius,
                center.x + radius,
                center.y + radius,
            ),
            Shape::RoundRect { rect, .. } | Shape::Rect(rect) => rect,
        }
    }
}

/// What a primitive is for. Informational; surfaces fill every role alike.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// The main masked fill.
    Base,
    /// A square repaint over one corner of the rounded base.
    CornerPatch(Corner),
    /// Full-viewport desaturated pass of a band mask.
    BandBase,
    /// Full-color bottom band.
    BandOverlay,
    /// Unscaled, unmasked source.
    PassThrough,
}

/// Color treatment applied to the sampled source.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Tone {
    #[default]
    Full,
    Desaturated,
}

/// One ordered fill: a shape, painted with the source sampled through
/// `transform`, optionally restricted to `source_clip` rows/columns.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FillPrimitive {
    pub shape: Shape,
    pub role: Role,
    pub tone: Tone,
    pub transform: Transform2D,
    /// Region of the source to sample. Pixels outside it read as
    /// the clip's clamped edge.
    pub source_clip: Option<Rect>,
}

impl FillPrimitive {
    fn new(shape: Shape, role: Role, transform: Transform2D) -> Self {
        Self {
            shape,
            role,
            tone: Tone::Full,
            transform,
            source_clip: None,
        }
    }
}

/// Build the fill primitives for one paint pass.
///
/// `fit` must have been computed for this `source` and `viewport`. Pure:
/// repeated calls with equal inputs produce identical output.
pub fn build_mask(
    viewport: Size,
    spec: &MaskSpec,
    source: Size,
    fit: &Fit,
) -> Vec<FillPrimitive> {
    let geometry = ViewportGeometry::new(viewport);
    let transform = fit.sampling_transform();

    if let Fit::PassThrough = fit {
        let rect = RectF::from_size(source);
        return alloc::vec![FillPrimitive::new(
            Shape::Rect(rect),
            Role::PassThrough,
            Transform2D::IDENTITY,
        )];
    }

    match *spec {
        MaskSpec::Circle => {
            let (center, radius) = geometry.circle();
            // The fit scales without translating; anchor the image to the
            // circle's bounding box.
            let transform = transform.post_translate(center.x - radius, center.y - radius);
            alloc::vec![FillPrimitive::new(
                Shape::Circle { center, radius },
                Role::Base,
                transform,
            )]
        }

        MaskSpec::Rounded(radii) => rounded(geometry.bounds(), &radii, transform),

        MaskSpec::Band { fraction } => band(geometry.bounds(), source, fraction, transform),

        MaskSpec::CenterCropBand => alloc::vec![FillPrimitive::new(
            Shape::Rect(geometry.bounds()),
            Role::Base,
            transform,
        )],
    }
}

fn rounded(bounds: RectF, radii: &CornerRadii, transform: Transform2D) -> Vec<FillPrimitive> {
    let r = radii.uniform;
    let mut out = Vec::with_capacity(5);
    out.push(FillPrimitive::new(
        Shape::RoundRect {
            rect: bounds,
            radius: r,
        },
        Role::Base,
        transform,
    ));
    for corner in radii.squared_corners() {
        let patch = match corner {
            Corner::TopLeft => RectF::new(bounds.left, bounds.top, bounds.left + r, bounds.top + r),
            Corner::TopRight => {
                RectF::new(bounds.right - r, bounds.top, bounds.right, bounds.top + r)
            }
            Corner::BottomLeft => {
                RectF::new(bounds.left, bounds.bottom - r, bounds.left + r, bounds.bottom)
            }
            Corner::BottomRight => {
                RectF::new(bounds.right - r, bounds.bottom - r, bounds.right, bounds.bottom)
            }
        };
        out.push(FillPrimitive::new(
            Shape::Rect(patch),
            Role::CornerPatch(corner),
            transform,
        ));
    }
    out
}

fn band(bounds: RectF, source: Size, fraction: f32, transform: Transform2D) -> Vec<FillPrimitive> {
    let p = if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    };
    let sh = source.height as f32;
    let band_rows = (sh * p) as u32;
    // The clip always ends on the last source row.
    let skip_rows = source.height.saturating_sub(band_rows);

    let mut base = FillPrimitive::new(Shape::Rect(bounds), Role::BandBase, transform);
    base.tone = Tone::Desaturated;
    if band_rows == 0 {
        return alloc::vec![base];
    }

    let band_height = band_rows as f32 * transform.sy;
    let top = bounds.bottom - band_height;
    let rect = RectF::new(bounds.left, top, bounds.right, bounds.bottom);
    let overlay_transform = Transform2D {
        ty: top - transform.sy * skip_rows as f32,
        ..transform
    };
    let mut overlay = FillPrimitive::new(Shape::Rect(rect), Role::BandOverlay, overlay_transform);
    overlay.source_clip =
        Some(Rect::new(0, skip_rows, source.width, band_rows).clamp_to(source.width, source.height));

    alloc::vec![base, overlay]
}
