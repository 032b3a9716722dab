//! Parsed representation of an attribute string.

use crate::render::{MaskShape, ScaleMode, Variant};

/// Parsed attributes. Every field is `None` when its key was absent.
///
/// Produced by [`crate::attrs::parse()`], consumed by
/// [`to_config()`](Self::to_config).
#[derive(Debug, Clone, Default, PartialEq)]
#[non_exhaustive]
pub struct Attributes {
    /// View kind (`variant`).
    pub variant: Option<Variant>,
    /// Mask shape (`shape`, `type`).
    pub shape: Option<MaskShape>,
    /// Explicit uniform radius in pixels (`radius`).
    pub radius: Option<i32>,
    /// `left_top_radius`, in pixels.
    pub left_top_radius: Option<i32>,
    /// `left_bottom_radius`, in pixels.
    pub left_bottom_radius: Option<i32>,
    /// `right_top_radius`, in pixels.
    pub right_top_radius: Option<i32>,
    /// `right_bottom_radius`, in pixels.
    pub right_bottom_radius: Option<i32>,
    /// Scale behavior (`scale_mode`, `scale_type`).
    pub scale_mode: Option<ScaleMode>,
    /// Width / height ratio (`aspect_ratio`).
    pub aspect_ratio: Option<f32>,
    /// Injected intrinsic size (`init_size=w,h`).
    pub init_size: Option<(u32, u32)>,
    /// Full-color band fraction (`band_fraction`, `percentage`).
    pub band_fraction: Option<f32>,
    /// Display density (`density`).
    pub density: Option<f32>,
}

impl Attributes {
    /// Create empty attributes.
    pub fn new() -> Self {
        Self::default()
    }
}
