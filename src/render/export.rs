use std::collections::HashMap;
use std::path::{Path, PathBuf};

use futures::future::{try_join, try_join_all};

use crate::assets::color::Color;
use crate::assets::decode::{PreparedImage, encode_png};
use crate::assets::fonts::{FontBook, TextLayoutEngine};
use crate::assets::source::{ImageLoader, ImageRef, load_image};
use crate::config::EditorConfig;
use crate::foundation::core::{Affine, Size};
use crate::foundation::error::{PlacardError, PlacardResult};
use crate::foundation::math::premultiply_rgba8_in_place;
use crate::geometry::transform::{
    centered_offset, compose_base_image_transform, compose_element_transform, element_size,
};
use crate::render::cpu::CpuPainter;
use crate::render::painter::{DrawOp, FrameRGBA, PaintPlan, Painter, execute_plan};
use crate::scene::model::{ElementBody, ElementId};
use crate::scene::state::SceneState;

/// Export settings.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportOpts {
    /// Fill behind the base image.
    pub background: Color,
    /// Suggested download name.
    pub file_name: String,
}

impl Default for ExportOpts {
    fn default() -> Self {
        Self::from(&EditorConfig::default())
    }
}

impl From<&EditorConfig> for ExportOpts {
    fn from(cfg: &EditorConfig) -> Self {
        Self {
            background: cfg.background,
            file_name: cfg.export_file_name.clone(),
        }
    }
}

/// Finished export: PNG bytes plus the suggested file name.
#[derive(Clone, Debug)]
pub struct ExportedImage {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
    pub file_name: String,
}

impl ExportedImage {
    /// Write the PNG into `dir` under [`ExportedImage::file_name`].
    pub fn save_in(&self, dir: impl AsRef<Path>) -> PlacardResult<PathBuf> {
        let path = dir.as_ref().join(&self.file_name);
        self.save_as(&path)?;
        Ok(path)
    }

    pub fn save_as(&self, path: impl AsRef<Path>) -> PlacardResult<()> {
        let path = path.as_ref();
        std::fs::write(path, &self.png).map_err(|e| {
            PlacardError::Other(anyhow::anyhow!("write export '{}': {e}", path.display()))
        })
    }
}

/// Decoded images a composition needs, keyed by source.
#[derive(Clone, Debug)]
pub struct SceneImages {
    pub base: PreparedImage,
    pub overlays: HashMap<ImageRef, PreparedImage>,
}

/// Load the base image and every distinct overlay source concurrently.
///
/// Fails with [`PlacardError::BaseImageLoad`] or, naming the first element using the failed
/// source, [`PlacardError::OverlayImageLoad`].
pub async fn load_scene_images(
    loader: &dyn ImageLoader,
    scene: &SceneState,
) -> PlacardResult<SceneImages> {
    let base_source = &scene.base.source;
    let base = async {
        load_image(loader, base_source)
            .await
            .map_err(|e| PlacardError::base_image_load(format!("{base_source}: {e}")))
    };

    let mut distinct: Vec<(&ImageRef, ElementId)> = Vec::new();
    for el in &scene.elements {
        if let ElementBody::Image(img) = &el.body
            && !distinct.iter().any(|(src, _)| *src == &img.source)
        {
            distinct.push((&img.source, el.id));
        }
    }
    let overlays = try_join_all(distinct.into_iter().map(|(source, id)| async move {
        let img = load_image(loader, source)
            .await
            .map_err(|e| PlacardError::overlay_image_load(id, format!("{source}: {e}")))?;
        Ok::<_, PlacardError>((source.clone(), img))
    }));

    let (base, overlays) = try_join(base, overlays).await?;
    Ok(SceneImages {
        base,
        overlays: overlays.into_iter().collect(),
    })
}

/// Resolve fonts, shape text and place every draw in collection order.
pub fn compile_plan(
    scene: &SceneState,
    images: &SceneImages,
    fonts: &mut FontBook,
    layout: &mut TextLayoutEngine,
    background: Color,
) -> PlacardResult<PaintPlan> {
    let canvas = scene.base.canvas();
    let mut ops = Vec::with_capacity(scene.elements.len() + 1);

    ops.push(DrawOp::Image {
        element: None,
        image: images.base.clone(),
        transform: compose_base_image_transform(&scene.base.transform, canvas).to_affine(),
        size: canvas.size(),
    });

    for el in &scene.elements {
        let placed = compose_element_transform(el).to_affine();
        match &el.body {
            ElementBody::Text(t) => {
                if t.text.is_empty() {
                    continue;
                }
                let face = fonts.resolve(&t.font_family)?;
                let prepared = layout.layout_line(&t.text, &face, t.font_size as f32, t.color.into())?;
                let offset = centered_offset(
                    Size::new(prepared.width(), prepared.height()),
                    element_size(el),
                );
                ops.push(DrawOp::Text {
                    element: el.id,
                    text: prepared,
                    transform: placed * Affine::translate(offset),
                });
            }
            ElementBody::Image(i) => {
                let image = images.overlays.get(&i.source).ok_or_else(|| {
                    PlacardError::overlay_image_load(el.id, format!("{} was not loaded", i.source))
                })?;
                ops.push(DrawOp::Image {
                    element: Some(el.id),
                    image: image.clone(),
                    transform: placed,
                    size: Size::new(i.width, i.height),
                });
            }
        }
    }

    Ok(PaintPlan {
        canvas,
        background,
        ops,
    })
}

/// Encode a frame as straight-alpha PNG.
pub fn encode_frame(frame: &FrameRGBA) -> PlacardResult<Vec<u8>> {
    if frame.premultiplied {
        return encode_png(frame.width, frame.height, &frame.data);
    }
    let mut premul = frame.data.clone();
    premultiply_rgba8_in_place(&mut premul);
    encode_png(frame.width, frame.height, &premul)
}

/// Rasterize `scene` with the CPU painter and encode it as PNG.
///
/// Nothing is produced unless every image loads; the scene is only read.
pub async fn export_composition(
    scene: &SceneState,
    loader: &dyn ImageLoader,
    fonts: &mut FontBook,
    layout: &mut TextLayoutEngine,
    opts: &ExportOpts,
) -> PlacardResult<ExportedImage> {
    let mut painter = CpuPainter::new();
    export_with_painter(&mut painter, scene, loader, fonts, layout, opts).await
}

/// [`export_composition`] against any [`Painter`].
#[tracing::instrument(
    skip_all,
    fields(
        width = scene.base.original_width(),
        height = scene.base.original_height(),
        elements = scene.elements.len(),
    )
)]
pub async fn export_with_painter<P: Painter + ?Sized>(
    painter: &mut P,
    scene: &SceneState,
    loader: &dyn ImageLoader,
    fonts: &mut FontBook,
    layout: &mut TextLayoutEngine,
    opts: &ExportOpts,
) -> PlacardResult<ExportedImage> {
    let images = load_scene_images(loader, scene).await?;
    let plan = compile_plan(scene, &images, fonts, layout, opts.background)?;
    let frame = execute_plan(painter, &plan)?;
    let png = encode_frame(&frame)?;
    tracing::debug!(bytes = png.len(), ops = plan.ops.len(), "exported composition");

    Ok(ExportedImage {
        width: frame.width,
        height: frame.height,
        png,
        file_name: opts.file_name.clone(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/export.rs"]
mod tests;
