use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::color::Color;
use crate::assets::decode::PreparedImage;
use crate::assets::fonts::PreparedText;
use crate::foundation::core::{Affine, Canvas, Size};
use crate::foundation::error::{PlacardError, PlacardResult};
use crate::geometry::transform::image_fit_affine;
use crate::render::painter::{FrameRGBA, Painter};

/// [`Painter`] backed by the `vello_cpu` software rasterizer.
pub struct CpuPainter {
    surface: Option<CpuSurface>,
    image_cache: HashMap<usize, vello_cpu::Image>,
    font_cache: HashMap<(usize, u32), vello_cpu::peniko::FontData>,
}

struct CpuSurface {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
}

impl Default for CpuPainter {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuPainter {
    pub fn new() -> Self {
        Self {
            surface: None,
            image_cache: HashMap::new(),
            font_cache: HashMap::new(),
        }
    }

    fn surface_mut(&mut self) -> PlacardResult<&mut CpuSurface> {
        self.surface
            .as_mut()
            .ok_or_else(|| PlacardError::render("painter used before begin()"))
    }

    fn image_paint_for(&mut self, image: &PreparedImage) -> PlacardResult<vello_cpu::Image> {
        let key = Arc::as_ptr(&image.rgba8_premul) as usize;
        if let Some(paint) = self.image_cache.get(&key) {
            return Ok(paint.clone());
        }
        let pixmap = image_premul_bytes_to_pixmap(&image.rgba8_premul, image.width, image.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.image_cache.insert(key, paint.clone());
        Ok(paint)
    }

    fn font_for(&mut self, text: &PreparedText) -> vello_cpu::peniko::FontData {
        let key = (Arc::as_ptr(&text.face.bytes) as usize, text.face.index);
        self.font_cache
            .entry(key)
            .or_insert_with(|| {
                vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(text.face.bytes.as_ref().clone()),
                    text.face.index,
                )
            })
            .clone()
    }
}

impl Painter for CpuPainter {
    fn begin(&mut self, canvas: Canvas, background: Color) -> PlacardResult<()> {
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| PlacardError::render("canvas width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| PlacardError::render("canvas height exceeds u16"))?;

        // Cache keys are buffer addresses, only valid for the plan being painted.
        self.image_cache.clear();
        self.font_cache.clear();

        let mut ctx = vello_cpu::RenderContext::new(width, height);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            background.r,
            background.g,
            background.b,
            background.a,
        ));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(width),
            f64::from(height),
        ));
        self.surface = Some(CpuSurface {
            width,
            height,
            ctx,
            pixmap: vello_cpu::Pixmap::new(width, height),
        });
        Ok(())
    }

    fn draw_image(
        &mut self,
        image: &PreparedImage,
        transform: Affine,
        size: Size,
    ) -> PlacardResult<()> {
        let paint = self.image_paint_for(image)?;
        let fit = image_fit_affine(image.width, image.height, size);
        let s = self.surface_mut()?;

        s.ctx.set_transform(affine_to_cpu(transform * fit));
        s.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        s.ctx.set_paint(paint);
        s.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(image.width),
            f64::from(image.height),
        ));
        Ok(())
    }

    fn draw_text(&mut self, text: &PreparedText, transform: Affine) -> PlacardResult<()> {
        let font = self.font_for(text);
        let s = self.surface_mut()?;

        s.ctx.set_transform(affine_to_cpu(transform));
        s.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        for line in text.layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                s.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                // Glyph x/y are offsets from the pen; advance it along the baseline.
                let mut pen_x = run.offset();
                let baseline = run.baseline();
                let glyphs = run
                    .glyphs()
                    .map(|g| {
                        let glyph = vello_cpu::Glyph {
                            id: g.id,
                            x: pen_x + g.x,
                            y: baseline - g.y,
                        };
                        pen_x += g.advance;
                        glyph
                    })
                    .collect::<Vec<_>>();
                s.ctx
                    .glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs.into_iter());
            }
        }
        Ok(())
    }

    fn readback_rgba8(&mut self) -> PlacardResult<FrameRGBA> {
        let mut s = self
            .surface
            .take()
            .ok_or_else(|| PlacardError::render("readback without an active surface"))?;
        s.ctx.flush();
        s.ctx.render_to_pixmap(&mut s.pixmap);

        Ok(FrameRGBA {
            width: u32::from(s.width),
            height: u32::from(s.height),
            data: s.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> PlacardResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| PlacardError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| PlacardError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(PlacardError::render("prepared image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
