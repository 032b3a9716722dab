//! Source rasterization: turning any [`Drawable`] into a [`PixelBuffer`].
//!
//! A source that already is a bitmap is handed back borrowed, without a copy.
//! Anything else (solid colors, decoded images held in another container,
//! host-provided vector sources) is painted once into a freshly allocated
//! buffer whose format depends on the source's opacity:
//!
//! - opaque sources get [`PixelFormat::Rgb565`] (half the memory, no alpha),
//! - everything else gets [`PixelFormat::Rgba8888`].
//!
//! # Example
//!
//! ```
//! use zenmask::{PixelFormat, SolidColor, rasterize};
//!
//! let red = SolidColor::new([255, 0, 0, 255], 4, 3);
//! let buf = rasterize(&red).unwrap();
//! assert_eq!(buf.format(), PixelFormat::Rgb565);
//! assert_eq!(buf.pixel(2, 1), [255, 0, 0, 255]);
//! ```

use alloc::borrow::Cow;
use alloc::vec;
use alloc::vec::Vec;

use crate::geometry::{Rect, Size};

/// Storage layout of a [`PixelBuffer`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 16-bit packed RGB, little-endian, no alpha channel.
    Rgb565,
    /// 8 bits per channel RGBA, straight (non-premultiplied) alpha.
    Rgba8888,
}

impl PixelFormat {
    /// Bytes used by a single pixel.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb565 => 2,
            Self::Rgba8888 => 4,
        }
    }

    /// Whether the format can carry transparency.
    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::Rgba8888)
    }
}

/// How much of a source shows what is behind it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Opacity {
    /// Every pixel is fully opaque.
    Opaque,
    /// Some pixels are partially or fully transparent.
    Translucent,
    /// Every pixel is fully transparent.
    Transparent,
}

/// Rasterization error.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RasterError {
    /// The source reports no intrinsic size on at least one axis.
    #[error("source has no intrinsic size ({width}x{height})")]
    ZeroIntrinsicSize { width: u32, height: u32 },
    /// Raw pixel data does not match the declared dimensions.
    #[error("pixel data is {actual} bytes, expected {expected}")]
    BufferSizeMismatch { expected: usize, actual: usize },
}

/// An immutable-once-produced block of pixels.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Allocate a zeroed buffer (transparent black, or black for `Rgb565`).
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let len = width as usize * height as usize * format.bytes_per_pixel();
        Self {
            width,
            height,
            format,
            data: vec![0; len],
        }
    }

    /// Wrap straight-alpha RGBA8 data.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> Result<Self, RasterError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(RasterError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format: PixelFormat::Rgba8888,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Raw storage in [`format`](Self::format) layout, row-major, no padding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.format.bytes_per_pixel()
    }

    /// Read one pixel as straight RGBA. `Rgb565` pixels read back with alpha 255.
    ///
    /// Panics when `(x, y)` is out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        assert!(
            x < self.width && y < self.height,
            "({x},{y}) out of bounds {}x{}",
            self.width,
            self.height
        );
        let i = self.offset(x, y);
        match self.format {
            PixelFormat::Rgba8888 => [
                self.data[i],
                self.data[i + 1],
                self.data[i + 2],
                self.data[i + 3],
            ],
            PixelFormat::Rgb565 => {
                unpack_565(u16::from_le_bytes([self.data[i], self.data[i + 1]]))
            }
        }
    }

    /// Write one pixel from straight RGBA. Alpha is dropped for `Rgb565`.
    ///
    /// Panics when `(x, y)` is out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        assert!(
            x < self.width && y < self.height,
            "({x},{y}) out of bounds {}x{}",
            self.width,
            self.height
        );
        let i = self.offset(x, y);
        match self.format {
            PixelFormat::Rgba8888 => self.data[i..i + 4].copy_from_slice(&rgba),
            PixelFormat::Rgb565 => {
                let packed = pack_565(rgba[0], rgba[1], rgba[2]).to_le_bytes();
                self.data[i..i + 2].copy_from_slice(&packed);
            }
        }
    }

    /// Fill every pixel with one color.
    pub fn fill(&mut self, rgba: [u8; 4]) {
        match self.format {
            PixelFormat::Rgba8888 => {
                for px in self.data.chunks_exact_mut(4) {
                    px.copy_from_slice(&rgba);
                }
            }
            PixelFormat::Rgb565 => {
                let packed = pack_565(rgba[0], rgba[1], rgba[2]).to_le_bytes();
                for px in self.data.chunks_exact_mut(2) {
                    px.copy_from_slice(&packed);
                }
            }
        }
    }

    /// Expand to straight RGBA8, whatever the storage format.
    pub fn to_rgba8(&self) -> Vec<u8> {
        match self.format {
            PixelFormat::Rgba8888 => self.data.clone(),
            PixelFormat::Rgb565 => {
                let mut out = Vec::with_capacity(self.width as usize * self.height as usize * 4);
                for px in self.data.chunks_exact(2) {
                    out.extend_from_slice(&unpack_565(u16::from_le_bytes([px[0], px[1]])));
                }
                out
            }
        }
    }

    /// Whether every pixel is fully opaque.
    pub fn is_opaque(&self) -> bool {
        !self.format.has_alpha() || self.data.chunks_exact(4).all(|px| px[3] == 255)
    }

    /// A grayscale copy using the zero-saturation color matrix
    /// (luma weights 0.213 / 0.715 / 0.072). Alpha and format are kept.
    pub fn desaturated(&self) -> Self {
        let mut out = self.clone();
        for y in 0..self.height {
            for x in 0..self.width {
                let [r, g, b, a] = self.pixel(x, y);
                let luma = (213 * r as u32 + 715 * g as u32 + 72 * b as u32 + 500) / 1000;
                let l = luma.min(255) as u8;
                out.set_pixel(x, y, [l, l, l, a]);
            }
        }
        out
    }

    /// Copy out a region, clamped to the buffer bounds.
    pub fn region(&self, rect: Rect) -> Self {
        let r = rect.clamp_to(self.width, self.height);
        let bpp = self.format.bytes_per_pixel();
        let mut data = Vec::with_capacity(r.width as usize * r.height as usize * bpp);
        for y in r.y..r.y + r.height {
            let start = self.offset(r.x, y);
            data.extend_from_slice(&self.data[start..start + r.width as usize * bpp]);
        }
        Self {
            width: r.width,
            height: r.height,
            format: self.format,
            data,
        }
    }
}

/// Pack 8-bit channels into RGB565.
fn pack_565(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 >> 3) << 11) | ((g as u16 >> 2) << 5) | (b as u16 >> 3)
}

/// Expand RGB565 to RGBA8, replicating high bits into the low bits.
fn unpack_565(v: u16) -> [u8; 4] {
    let r = ((v >> 11) & 0x1f) as u8;
    let g = ((v >> 5) & 0x3f) as u8;
    let b = (v & 0x1f) as u8;
    [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2), 255]
}

/// Anything that can paint itself into a pixel buffer.
///
/// Hosts implement this for their own image containers. Bitmap-backed
/// sources should override [`as_bitmap`](Self::as_bitmap) so rasterization
/// can skip the copy.
pub trait Drawable {
    /// Natural dimensions of the source, in pixels.
    fn intrinsic_size(&self) -> Size;

    /// Opacity of the source as a whole. Decides the synthesized buffer format.
    fn opacity(&self) -> Opacity;

    /// Paint the whole source into `target`, whose size equals
    /// [`intrinsic_size`](Self::intrinsic_size).
    fn draw(&self, target: &mut PixelBuffer);

    /// The underlying bitmap, when the source is one.
    fn as_bitmap(&self) -> Option<&PixelBuffer> {
        None
    }
}

impl Drawable for PixelBuffer {
    fn intrinsic_size(&self) -> Size {
        self.size()
    }

    fn opacity(&self) -> Opacity {
        if self.is_opaque() {
            Opacity::Opaque
        } else {
            Opacity::Translucent
        }
    }

    fn draw(&self, target: &mut PixelBuffer) {
        let w = target.width().min(self.width);
        let h = target.height().min(self.height);
        for y in 0..h {
            for x in 0..w {
                target.set_pixel(x, y, self.pixel(x, y));
            }
        }
    }

    fn as_bitmap(&self) -> Option<&PixelBuffer> {
        Some(self)
    }
}

/// A flat color with a fixed intrinsic size.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SolidColor {
    pub rgba: [u8; 4],
    pub size: Size,
}

impl SolidColor {
    pub const fn new(rgba: [u8; 4], width: u32, height: u32) -> Self {
        Self {
            rgba,
            size: Size::new(width, height),
        }
    }
}

impl Drawable for SolidColor {
    fn intrinsic_size(&self) -> Size {
        self.size
    }

    fn opacity(&self) -> Opacity {
        match self.rgba[3] {
            255 => Opacity::Opaque,
            0 => Opacity::Transparent,
            _ => Opacity::Translucent,
        }
    }

    fn draw(&self, target: &mut PixelBuffer) {
        target.fill(self.rgba);
    }
}

/// Turn a source into pixels.
///
/// Bitmaps come back borrowed. Other sources are painted into a new buffer
/// sized to their intrinsic dimensions, `Rgb565` when opaque and
/// `Rgba8888` otherwise.
pub fn rasterize(source: &dyn Drawable) -> Result<Cow<'_, PixelBuffer>, RasterError> {
    if let Some(bitmap) = source.as_bitmap() {
        return Ok(Cow::Borrowed(bitmap));
    }
    let size = source.intrinsic_size();
    if size.is_empty() {
        return Err(RasterError::ZeroIntrinsicSize {
            width: size.width,
            height: size.height,
        });
    }
    let format = match source.opacity() {
        Opacity::Opaque => PixelFormat::Rgb565,
        Opacity::Translucent | Opacity::Transparent => PixelFormat::Rgba8888,
    };
    let mut buf = PixelBuffer::new(size.width, size.height, format);
    source.draw(&mut buf);
    tracing::trace!(
        width = size.width,
        height = size.height,
        ?format,
        "rasterized drawable source"
    );
    Ok(Cow::Owned(buf))
}

#[cfg(feature = "image")]
mod image_support {
    use image::{DynamicImage, GenericImageView, RgbaImage};

    use super::{Drawable, Opacity, PixelBuffer};
    use crate::geometry::Size;

    fn opacity_of(mut alphas: impl Iterator<Item = u8>) -> Opacity {
        let Some(first) = alphas.next() else {
            return Opacity::Transparent;
        };
        let (mut all_opaque, mut all_clear) = (first == 255, first == 0);
        for a in alphas {
            all_opaque &= a == 255;
            all_clear &= a == 0;
            if !all_opaque && !all_clear {
                break;
            }
        }
        if all_opaque {
            Opacity::Opaque
        } else if all_clear {
            Opacity::Transparent
        } else {
            Opacity::Translucent
        }
    }

    impl From<RgbaImage> for PixelBuffer {
        fn from(img: RgbaImage) -> Self {
            let (width, height) = img.dimensions();
            Self {
                width,
                height,
                format: super::PixelFormat::Rgba8888,
                data: img.into_raw(),
            }
        }
    }

    impl Drawable for RgbaImage {
        fn intrinsic_size(&self) -> Size {
            let (w, h) = self.dimensions();
            Size::new(w, h)
        }

        fn opacity(&self) -> Opacity {
            opacity_of(self.pixels().map(|p| p.0[3]))
        }

        fn draw(&self, target: &mut PixelBuffer) {
            let w = target.width().min(self.width());
            let h = target.height().min(self.height());
            for y in 0..h {
                for x in 0..w {
                    target.set_pixel(x, y, self.get_pixel(x, y).0);
                }
            }
        }
    }

    impl Drawable for DynamicImage {
        fn intrinsic_size(&self) -> Size {
            let (w, h) = self.dimensions();
            Size::new(w, h)
        }

        fn opacity(&self) -> Opacity {
            if !self.color().has_alpha() {
                return Opacity::Opaque;
            }
            opacity_of(self.pixels().map(|(_, _, p)| p.0[3]))
        }

        fn draw(&self, target: &mut PixelBuffer) {
            let (sw, sh) = self.dimensions();
            let w = target.width().min(sw);
            let h = target.height().min(sh);
            for y in 0..h {
                for x in 0..w {
                    target.set_pixel(x, y, self.get_pixel(x, y).0);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitmap_source_is_borrowed_not_copied() {
        let buf = PixelBuffer::new(8, 4, PixelFormat::Rgba8888);
        let out = rasterize(&buf).unwrap();
        assert!(matches!(out, Cow::Borrowed(_)));
        assert!(core::ptr::eq(out.as_ref(), &buf));
    }

    #[test]
    fn opaque_source_gets_565() {
        let src = SolidColor::new([10, 200, 30, 255], 5, 7);
        let out = rasterize(&src).unwrap();
        assert!(matches!(out, Cow::Owned(_)));
        assert_eq!(out.format(), PixelFormat::Rgb565);
        assert_eq!(out.size(), Size::new(5, 7));
        assert_eq!(out.as_bytes().len(), 5 * 7 * 2);
    }

    #[test]
    fn translucent_source_gets_8888() {
        let src = SolidColor::new([10, 200, 30, 128], 5, 7);
        let out = rasterize(&src).unwrap();
        assert_eq!(out.format(), PixelFormat::Rgba8888);
        assert_eq!(out.pixel(4, 6), [10, 200, 30, 128]);
    }

    #[test]
    fn transparent_source_gets_8888() {
        let src = SolidColor::new([0, 0, 0, 0], 2, 2);
        let out = rasterize(&src).unwrap();
        assert_eq!(out.format(), PixelFormat::Rgba8888);
    }

    #[test]
    fn zero_intrinsic_size_fails() {
        let err = rasterize(&SolidColor::new([0, 0, 0, 255], 0, 10)).unwrap_err();
        assert_eq!(
            err,
            RasterError::ZeroIntrinsicSize {
                width: 0,
                height: 10
            }
        );
    }

    #[test]
    fn rgb565_round_trips_primaries() {
        let mut buf = PixelBuffer::new(3, 1, PixelFormat::Rgb565);
        buf.set_pixel(0, 0, [255, 0, 0, 255]);
        buf.set_pixel(1, 0, [0, 255, 0, 255]);
        buf.set_pixel(2, 0, [0, 0, 255, 17]);
        assert_eq!(buf.pixel(0, 0), [255, 0, 0, 255]);
        assert_eq!(buf.pixel(1, 0), [0, 255, 0, 255]);
        // Alpha is not stored.
        assert_eq!(buf.pixel(2, 0), [0, 0, 255, 255]);
    }

    #[test]
    fn rgb565_quantizes_low_bits() {
        let mut buf = PixelBuffer::new(1, 1, PixelFormat::Rgb565);
        buf.set_pixel(0, 0, [0x13, 0x13, 0x13, 255]);
        // Red and blue keep 5 bits, green keeps 6: 0x13 and 0x1c both land on 16.
        assert_eq!(buf.pixel(0, 0), [16, 16, 16, 255]);
        buf.set_pixel(0, 0, [0x1c, 0x1c, 0x1c, 255]);
        assert_eq!(buf.pixel(0, 0), [24, 28, 24, 255]);
    }

    #[test]
    fn from_rgba8_checks_length() {
        let err = PixelBuffer::from_rgba8(2, 2, vec![0; 15]).unwrap_err();
        assert_eq!(
            err,
            RasterError::BufferSizeMismatch {
                expected: 16,
                actual: 15
            }
        );
        assert!(PixelBuffer::from_rgba8(2, 2, vec![0; 16]).is_ok());
    }

    #[test]
    fn desaturate_uses_luma_weights() {
        let mut buf = PixelBuffer::new(3, 1, PixelFormat::Rgba8888);
        buf.set_pixel(0, 0, [255, 0, 0, 255]);
        buf.set_pixel(1, 0, [0, 255, 0, 200]);
        buf.set_pixel(2, 0, [255, 255, 255, 255]);
        let gray = buf.desaturated();
        assert_eq!(gray.pixel(0, 0), [54, 54, 54, 255]);
        assert_eq!(gray.pixel(1, 0), [182, 182, 182, 200]);
        assert_eq!(gray.pixel(2, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn region_copies_rows() {
        let mut buf = PixelBuffer::new(2, 4, PixelFormat::Rgba8888);
        for y in 0..4 {
            buf.set_pixel(0, y, [y as u8, 0, 0, 255]);
        }
        let band = buf.region(Rect::new(0, 2, 2, 5));
        assert_eq!(band.size(), Size::new(2, 2));
        assert_eq!(band.pixel(0, 0), [2, 0, 0, 255]);
        assert_eq!(band.pixel(0, 1), [3, 0, 0, 255]);
    }

    #[test]
    fn opacity_of_buffers() {
        let mut buf = PixelBuffer::new(2, 1, PixelFormat::Rgba8888);
        buf.fill([1, 2, 3, 255]);
        assert_eq!(buf.opacity(), Opacity::Opaque);
        buf.set_pixel(1, 0, [1, 2, 3, 0]);
        assert_eq!(buf.opacity(), Opacity::Translucent);
        assert_eq!(
            PixelBuffer::new(1, 1, PixelFormat::Rgb565).opacity(),
            Opacity::Opaque
        );
    }

    #[cfg(feature = "image")]
    #[test]
    fn rgba_image_synthesizes_buffer() {
        let mut img = image::RgbaImage::new(3, 2);
        img.put_pixel(1, 1, image::Rgba([9, 8, 7, 255]));
        let out = rasterize(&img).unwrap();
        assert!(matches!(out, Cow::Owned(_)));
        // Mostly transparent pixels → alpha-capable format.
        assert_eq!(out.format(), PixelFormat::Rgba8888);
        assert_eq!(out.pixel(1, 1), [9, 8, 7, 255]);

        let buf: PixelBuffer = img.into();
        assert_eq!(buf.size(), Size::new(3, 2));
        assert_eq!(buf.pixel(1, 1), [9, 8, 7, 255]);
    }

    #[cfg(feature = "image")]
    #[test]
    fn opaque_dynamic_image_gets_565() {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            4,
            4,
            image::Rgb([200, 100, 0]),
        ));
        let out = rasterize(&img).unwrap();
        assert_eq!(out.format(), PixelFormat::Rgb565);
    }
}
