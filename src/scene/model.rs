use std::fmt;

use crate::assets::color::Color;
use crate::assets::source::ImageRef;
use crate::foundation::core::Canvas;
use crate::foundation::error::{PlacardError, PlacardResult};

/// Stable identifier of an overlay element, generated at creation.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct ElementId(uuid::Uuid);

impl ElementId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Rotation and mirror flips applied to the base image around its own center.
pub struct BaseTransform {
    /// Rotation in degrees, clockwise positive.
    #[serde(default)]
    pub rotate_deg: f64,
    /// Horizontal mirror: `1` or `-1`.
    #[serde(default = "unit_scale")]
    pub scale_x: f64,
    /// Vertical mirror: `1` or `-1`.
    #[serde(default = "unit_scale")]
    pub scale_y: f64,
}

fn unit_scale() -> f64 {
    1.0
}

impl Default for BaseTransform {
    fn default() -> Self {
        Self {
            rotate_deg: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Partial update for [`BaseTransform`]; only `Some` fields change.
pub struct BaseTransformPatch {
    pub rotate_deg: Option<f64>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
}

impl BaseTransform {
    /// Validate and merge `patch`. Nothing changes on error.
    pub fn apply(&mut self, patch: &BaseTransformPatch) -> PlacardResult<()> {
        patch.validate()?;
        if let Some(r) = patch.rotate_deg {
            self.rotate_deg = r;
        }
        if let Some(v) = patch.scale_x {
            self.scale_x = v;
        }
        if let Some(v) = patch.scale_y {
            self.scale_y = v;
        }
        Ok(())
    }
}

impl BaseTransformPatch {
    fn validate(&self) -> PlacardResult<()> {
        if let Some(r) = self.rotate_deg
            && !r.is_finite()
        {
            return Err(PlacardError::validation("base rotation must be finite"));
        }
        for (name, v) in [("scale_x", self.scale_x), ("scale_y", self.scale_y)] {
            if let Some(v) = v
                && v.abs() != 1.0
            {
                return Err(PlacardError::validation(format!(
                    "base {name} must be 1 or -1, got {v}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// The image everything is composed on; its natural size fixes the canvas.
pub struct BaseImage {
    /// Image bytes reference.
    pub source: ImageRef,
    /// Accessible description.
    #[serde(default)]
    pub alt: String,
    /// Rotation/flip state.
    #[serde(default)]
    pub transform: BaseTransform,
    original_width: u32,
    original_height: u32,
}

impl BaseImage {
    /// Build a base image with fixed natural dimensions.
    pub fn new(
        source: ImageRef,
        alt: impl Into<String>,
        original_width: u32,
        original_height: u32,
    ) -> PlacardResult<Self> {
        if original_width == 0 || original_height == 0 {
            return Err(PlacardError::validation(
                "base image dimensions must be > 0",
            ));
        }
        Ok(Self {
            source,
            alt: alt.into(),
            transform: BaseTransform::default(),
            original_width,
            original_height,
        })
    }

    pub fn original_width(&self) -> u32 {
        self.original_width
    }

    pub fn original_height(&self) -> u32 {
        self.original_height
    }

    /// Composition surface, sized to the base image.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.original_width,
            height: self.original_height,
        }
    }

    pub(crate) fn validate(&self) -> PlacardResult<()> {
        if self.original_width == 0 || self.original_height == 0 {
            return Err(PlacardError::validation(
                "base image dimensions must be > 0",
            ));
        }
        let t = self.transform;
        BaseTransformPatch {
            rotate_deg: Some(t.rotate_deg),
            scale_x: Some(t.scale_x),
            scale_y: Some(t.scale_y),
        }
        .validate()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Discriminant of [`ElementBody`].
pub enum ElementKind {
    Text,
    Image,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ElementKind::Text => "text",
            ElementKind::Image => "image",
        })
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// An overlay placed on the base image.
///
/// Position is the top-left corner in base-image pixel space; rotation pivots on the element's
/// own center. Stacking follows collection order.
pub struct CanvasElement {
    pub id: ElementId,
    pub x: f64,
    pub y: f64,
    /// Rotation in degrees, clockwise positive.
    #[serde(default)]
    pub rotation_deg: f64,
    #[serde(flatten)]
    pub body: ElementBody,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
/// Variant-specific element payload.
pub enum ElementBody {
    Text(TextBody),
    Image(ImageBody),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A single-line text run.
pub struct TextBody {
    /// May be empty.
    pub text: String,
    pub color: Color,
    /// Font size in pixels; also the box height used for the rotation pivot.
    pub font_size: f64,
    /// CSS family list, e.g. `"Inter, sans-serif"`.
    pub font_family: String,
    /// Layout width used for centering and the rotation pivot. Not a clip box.
    pub width: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A raster overlay drawn scaled to `width`×`height`.
pub struct ImageBody {
    pub source: ImageRef,
    pub width: f64,
    pub height: f64,
}

impl CanvasElement {
    pub fn kind(&self) -> ElementKind {
        match self.body {
            ElementBody::Text(_) => ElementKind::Text,
            ElementBody::Image(_) => ElementKind::Image,
        }
    }

    pub fn as_text(&self) -> Option<&TextBody> {
        match &self.body {
            ElementBody::Text(t) => Some(t),
            ElementBody::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageBody> {
        match &self.body {
            ElementBody::Image(i) => Some(i),
            ElementBody::Text(_) => None,
        }
    }

    /// Validate and merge `patch`. The element variant can never change; a patch carrying the
    /// other variant's fields is rejected and nothing is modified.
    pub fn apply(&mut self, patch: &ElementPatch) -> PlacardResult<()> {
        let kind = self.kind();
        patch.validate_for(kind)?;

        match (&mut self.body, &patch.body) {
            (_, None) => {}
            (ElementBody::Text(t), Some(BodyPatch::Text(p))) => {
                if let Some(text) = &p.text {
                    t.text.clone_from(text);
                }
                if let Some(color) = p.color {
                    t.color = color;
                }
                if let Some(size) = p.font_size {
                    t.font_size = size;
                }
                if let Some(family) = &p.font_family {
                    t.font_family.clone_from(family);
                }
                if let Some(width) = p.width {
                    t.width = width;
                }
            }
            (ElementBody::Image(i), Some(BodyPatch::Image(p))) => {
                if let Some(width) = p.width {
                    i.width = width;
                }
                if let Some(height) = p.height {
                    i.height = height;
                }
            }
            (ElementBody::Text(_), Some(BodyPatch::Image(_)))
            | (ElementBody::Image(_), Some(BodyPatch::Text(_))) => {
                return Err(PlacardError::validation(format!(
                    "patch does not match element type '{kind}'"
                )));
            }
        }

        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(r) = patch.rotation_deg {
            self.rotation_deg = r;
        }
        Ok(())
    }

    /// Check field invariants of a fully built element.
    pub fn validate(&self) -> PlacardResult<()> {
        let as_patch = ElementPatch {
            x: Some(self.x),
            y: Some(self.y),
            rotation_deg: Some(self.rotation_deg),
            body: Some(match &self.body {
                ElementBody::Text(t) => BodyPatch::Text(TextPatch {
                    font_size: Some(t.font_size),
                    font_family: Some(t.font_family.clone()),
                    width: Some(t.width),
                    ..TextPatch::default()
                }),
                ElementBody::Image(i) => BodyPatch::Image(ImagePatch {
                    width: Some(i.width),
                    height: Some(i.height),
                }),
            }),
        };
        as_patch.validate_for(self.kind())
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Partial update for a [`CanvasElement`] (merge semantics).
pub struct ElementPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub rotation_deg: Option<f64>,
    pub body: Option<BodyPatch>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
/// Variant-specific part of an [`ElementPatch`].
pub enum BodyPatch {
    Text(TextPatch),
    Image(ImagePatch),
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TextPatch {
    pub text: Option<String>,
    pub color: Option<Color>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub width: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ImagePatch {
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl ElementPatch {
    /// Move to `(x, y)`.
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Set rotation in degrees.
    pub fn rotation(deg: f64) -> Self {
        Self {
            rotation_deg: Some(deg),
            ..Self::default()
        }
    }

    /// Text-only field changes.
    pub fn text(patch: TextPatch) -> Self {
        Self {
            body: Some(BodyPatch::Text(patch)),
            ..Self::default()
        }
    }

    /// Image-only field changes.
    pub fn image(patch: ImagePatch) -> Self {
        Self {
            body: Some(BodyPatch::Image(patch)),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.rotation_deg.is_none() && self.body.is_none()
    }

    fn validate_for(&self, kind: ElementKind) -> PlacardResult<()> {
        for (name, v) in [
            ("x", self.x),
            ("y", self.y),
            ("rotation_deg", self.rotation_deg),
        ] {
            if let Some(v) = v
                && !v.is_finite()
            {
                return Err(PlacardError::validation(format!("{name} must be finite")));
            }
        }

        match (kind, &self.body) {
            (_, None) => Ok(()),
            (ElementKind::Text, Some(BodyPatch::Text(p))) => {
                positive("font_size", p.font_size)?;
                positive("width", p.width)?;
                if let Some(family) = &p.font_family
                    && family.trim().is_empty()
                {
                    return Err(PlacardError::validation("font_family must be non-empty"));
                }
                Ok(())
            }
            (ElementKind::Image, Some(BodyPatch::Image(p))) => {
                positive("width", p.width)?;
                positive("height", p.height)
            }
            (kind, Some(_)) => {
                Err(PlacardError::validation(format!(
                    "patch does not match element type '{kind}'; element type cannot change"
                )))
            }
        }
    }
}

fn positive(name: &str, v: Option<f64>) -> PlacardResult<()> {
    match v {
        Some(v) if !(v.is_finite() && v > 0.0) => Err(PlacardError::validation(format!(
            "{name} must be finite and > 0, got {v}"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
