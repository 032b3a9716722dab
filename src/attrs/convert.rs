//! Convert parsed [`Attributes`] into an [`ImageConfig`].

use crate::mask::CornerRadii;
use crate::render::ImageConfig;

use super::attributes::Attributes;

impl Attributes {
    /// Build a configuration, filling absent keys with defaults.
    ///
    /// Without an explicit `radius`, the uniform radius falls back to the
    /// first nonzero corner in the order left-bottom, left-top, right-bottom,
    /// right-top.
    pub fn to_config(&self) -> ImageConfig {
        let defaults = ImageConfig::default();
        let lt = self.left_top_radius.unwrap_or(0);
        let lb = self.left_bottom_radius.unwrap_or(0);
        let rt = self.right_top_radius.unwrap_or(0);
        let rb = self.right_bottom_radius.unwrap_or(0);
        let radius = match self.radius {
            Some(r) => r,
            None => {
                CornerRadii::new(None, lt as f32, rt as f32, lb as f32, rb as f32).uniform as i32
            }
        };

        ImageConfig {
            variant: self.variant.unwrap_or(defaults.variant),
            shape: self.shape.unwrap_or(defaults.shape),
            radius,
            left_top_radius: lt,
            left_bottom_radius: lb,
            right_top_radius: rt,
            right_bottom_radius: rb,
            scale_mode: self.scale_mode.unwrap_or(defaults.scale_mode),
            aspect_ratio: self.aspect_ratio.unwrap_or(defaults.aspect_ratio),
            init_size: self.init_size.or(defaults.init_size),
            band_fraction: self.band_fraction.unwrap_or(defaults.band_fraction),
            density: self.density.unwrap_or(defaults.density),
        }
    }
}
