//! Drawing surfaces.
//!
//! A [`Surface`] receives the ordered fills of one paint pass. The renderer
//! hands it the shape plus a [`Paint`]: the rasterized source, the sampling
//! transform, the tone, and an optional source clip. [`RecordingSurface`]
//! keeps a log of the fills for inspection; the `tiny-skia` feature adds a
//! surface that rasterizes them into a pixmap.

use alloc::vec::Vec;

use crate::fit::Transform2D;
use crate::geometry::{Rect, Size};
use crate::mask::{FillPrimitive, Shape, Tone};
use crate::raster::PixelBuffer;

/// Paint source for one fill.
#[derive(Copy, Clone, Debug)]
pub struct Paint<'a> {
    /// The rasterized source image.
    pub buffer: &'a PixelBuffer,
    /// Source → viewport transform.
    pub transform: Transform2D,
    pub tone: Tone,
    /// Only this region of the source is sampled.
    pub source_clip: Option<Rect>,
}

impl<'a> Paint<'a> {
    /// Paint for one primitive, sampling `buffer`.
    pub fn for_primitive(buffer: &'a PixelBuffer, primitive: &FillPrimitive) -> Self {
        Self {
            buffer,
            transform: primitive.transform,
            tone: primitive.tone,
            source_clip: primitive.source_clip,
        }
    }

    /// The region of the source this paint samples: the clip, or the full
    /// buffer.
    pub fn source_region(&self) -> Rect {
        let size = self.buffer.size();
        self.source_clip
            .map(|r| r.clamp_to(size.width, size.height))
            .unwrap_or(Rect::new(0, 0, size.width, size.height))
    }
}

/// Something a masked image can be painted onto.
pub trait Surface {
    /// Fill `shape` with `paint`. Fills arrive in paint order.
    fn fill(&mut self, shape: &Shape, paint: &Paint<'_>);
}

/// One recorded fill.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DrawCommand {
    pub shape: Shape,
    pub transform: Transform2D,
    pub tone: Tone,
    pub source_clip: Option<Rect>,
    /// Size of the source buffer that was painted.
    pub source_size: Size,
    /// Source pixels that land inside the recording viewport.
    pub visible_source: Rect,
}

/// A surface that records fills instead of drawing them.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    viewport: Size,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(viewport: Size) -> Self {
        Self {
            viewport,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drop recorded commands, keeping the viewport.
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Surface for RecordingSurface {
    fn fill(&mut self, shape: &Shape, paint: &Paint<'_>) {
        let source_size = paint.buffer.size();
        let region = paint.source_region();
        let visible = paint.transform.visible_source(self.viewport, source_size);
        // Intersect with the clip so the record reflects what can actually show.
        let x0 = visible.x.max(region.x);
        let y0 = visible.y.max(region.y);
        let x1 = (visible.x + visible.width).min(region.x + region.width);
        let y1 = (visible.y + visible.height).min(region.y + region.height);
        let visible_source = Rect::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0));

        self.commands.push(DrawCommand {
            shape: *shape,
            transform: paint.transform,
            tone: paint.tone,
            source_clip: paint.source_clip,
            source_size,
            visible_source,
        });
    }
}
