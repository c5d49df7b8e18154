//! Placard is the core of an overlay editor: load a base image, place draggable text and image
//! overlays on it, rotate or mirror the base, and export the composition as a PNG.
//!
//! # Architecture
//!
//! 1. **Scene** ([`Scene`]): the single source of truth. Every mutation goes through it and
//!    produces a new immutable [`SceneState`] snapshot.
//! 2. **Geometry** ([`compose_base_image_transform`], [`compose_element_transform`]): pure
//!    functions shared by both renderers, so the live view and the export agree.
//! 3. **Live view** ([`LiveView`]): a retained visual tree with hit testing and pointer routing.
//!    Each element node owns a [`DragController`]; drags commit to the scene once, on release.
//! 4. **Export** ([`export_composition`]): loads every image, paints in collection order through
//!    a [`Painter`] (CPU by default), and encodes a straight-alpha PNG.
//!
//! [`Editor`] wires these together with a selection and an [`ImageLoader`].
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Single-threaded**: image loads are the only suspension points; nothing blocks.
//! - **Atomic failures**: a failed add or export leaves the scene untouched and writes nothing.
#![forbid(unsafe_code)]

pub mod assets {
    pub mod color;
    pub mod decode;
    pub mod fonts;
    pub mod source;
}
pub mod config;
pub mod editor;
pub mod foundation {
    pub mod core;
    pub mod error;
    pub(crate) mod math;
}
pub mod geometry {
    pub mod transform;
}
pub mod interaction {
    pub mod drag;
    pub mod listeners;
}
pub mod render {
    pub mod cpu;
    pub mod export;
    pub mod live;
    pub mod painter;
}
pub mod scene {
    pub mod document;
    pub mod model;
    pub mod state;
}

pub use assets::color::Color;
pub use assets::decode::{PreparedImage, decode_image, encode_png};
pub use assets::fonts::{FontBook, FontFace, PreparedText, TextBrushRgba8, TextLayoutEngine};
pub use assets::source::{FileImageLoader, ImageLoader, ImageRef, MemoryImageLoader, load_image};
pub use config::{EditorConfig, SelectionStyle, TextDefaults};
pub use editor::Editor;
pub use foundation::core::{Affine, Canvas, Point, Rect, Rgba8Premul, Size, Transform2D, Vec2};
pub use foundation::error::{PlacardError, PlacardResult};
pub use geometry::transform::{
    compose_base_image_transform, compose_element_transform, element_center, element_size,
    fit_within,
};
pub use interaction::drag::{DragController, DragEvent};
pub use interaction::listeners::{ListenerGuard, PointerEventKind, PointerListeners};
pub use render::cpu::CpuPainter;
pub use render::export::{ExportOpts, ExportedImage, export_composition, export_with_painter};
pub use render::live::{Action, LiveView, VisualTree};
pub use render::painter::{DrawOp, FrameRGBA, PaintPlan, Painter, execute_plan};
pub use scene::document::SceneDocument;
pub use scene::model::{
    BaseImage, BaseTransform, BaseTransformPatch, BodyPatch, CanvasElement, ElementBody,
    ElementId, ElementKind, ElementPatch, ImageBody, ImagePatch, TextBody, TextPatch,
};
pub use scene::state::{Scene, SceneState};
