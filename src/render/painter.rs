use crate::assets::color::Color;
use crate::assets::decode::PreparedImage;
use crate::assets::fonts::PreparedText;
use crate::foundation::core::{Affine, Canvas, Size};
use crate::foundation::error::{PlacardError, PlacardResult};
use crate::scene::model::ElementId;

/// Pixel readback of a finished frame.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

/// One draw call of a [`PaintPlan`], already resolved to drawable resources.
#[derive(Clone, Debug)]
pub enum DrawOp {
    /// Raster scaled into a `size` box at the local origin, then mapped by `transform`.
    Image {
        /// `None` for the base image.
        element: Option<ElementId>,
        image: PreparedImage,
        transform: Affine,
        size: Size,
    },
    /// Shaped glyph run whose layout origin is mapped by `transform`.
    Text {
        element: ElementId,
        text: PreparedText,
        transform: Affine,
    },
}

impl DrawOp {
    pub fn element(&self) -> Option<ElementId> {
        match self {
            DrawOp::Image { element, .. } => *element,
            DrawOp::Text { element, .. } => Some(*element),
        }
    }
}

/// Everything needed to paint a composition, in paint order.
#[derive(Clone, Debug)]
pub struct PaintPlan {
    pub canvas: Canvas,
    pub background: Color,
    pub ops: Vec<DrawOp>,
}

/// Raster target the rasterizer draws through.
pub trait Painter {
    /// Allocate a `canvas`-sized surface filled with `background`.
    fn begin(&mut self, canvas: Canvas, background: Color) -> PlacardResult<()>;

    fn draw_image(
        &mut self,
        image: &PreparedImage,
        transform: Affine,
        size: Size,
    ) -> PlacardResult<()>;

    fn draw_text(&mut self, text: &PreparedText, transform: Affine) -> PlacardResult<()>;

    fn readback_rgba8(&mut self) -> PlacardResult<FrameRGBA>;
}

/// Replay `plan` on `painter` strictly in op order.
pub fn execute_plan<P: Painter + ?Sized>(
    painter: &mut P,
    plan: &PaintPlan,
) -> PlacardResult<FrameRGBA> {
    painter.begin(plan.canvas, plan.background)?;

    for op in &plan.ops {
        match op {
            DrawOp::Image {
                image,
                transform,
                size,
                ..
            } => painter.draw_image(image, *transform, *size)?,
            DrawOp::Text {
                text, transform, ..
            } => painter.draw_text(text, *transform)?,
        }
    }

    let frame = painter.readback_rgba8()?;
    if frame.width != plan.canvas.width || frame.height != plan.canvas.height {
        return Err(PlacardError::render(format!(
            "painter returned {}x{} frame for {}x{} canvas",
            frame.width, frame.height, plan.canvas.width, plan.canvas.height
        )));
    }
    Ok(frame)
}

#[cfg(test)]
#[path = "../../tests/unit/render/painter.rs"]
mod tests;
