use crate::foundation::core::{Affine, Canvas, Point, Size, Transform2D, Vec2};
use crate::scene::model::{BaseTransform, CanvasElement, ElementBody};

/// Rotation/flip of the base image around the canvas center.
///
/// The base image fills the canvas at identity, so its pivot is the canvas center. Rotation is
/// applied after the mirror scale in local space, matching `rotate(..) scale(..)` ordering.
pub fn compose_base_image_transform(t: &BaseTransform, canvas: Canvas) -> Transform2D {
    let center = canvas.center();
    Transform2D {
        translate: Vec2::ZERO,
        rotation_rad: t.rotate_deg.to_radians(),
        scale: Vec2::new(t.scale_x, t.scale_y),
        anchor: center.to_vec2(),
    }
}

/// Local-to-canvas transform of an overlay element at its stored position.
pub fn compose_element_transform(el: &CanvasElement) -> Transform2D {
    element_transform_at(el, Point::new(el.x, el.y))
}

/// Same as [`compose_element_transform`] with `top_left` substituted for the stored position.
///
/// Used while dragging, when the displayed position runs ahead of the committed one.
pub fn element_transform_at(el: &CanvasElement, top_left: Point) -> Transform2D {
    let size = element_size(el);
    Transform2D {
        translate: top_left.to_vec2(),
        rotation_rad: el.rotation_deg.to_radians(),
        scale: Vec2::new(1.0, 1.0),
        anchor: Vec2::new(size.width / 2.0, size.height / 2.0),
    }
}

/// Box used for the rotation pivot: `width`×`font_size` for text, `width`×`height` for images.
pub fn element_size(el: &CanvasElement) -> Size {
    match &el.body {
        ElementBody::Text(t) => Size::new(t.width, t.font_size),
        ElementBody::Image(i) => Size::new(i.width, i.height),
    }
}

/// Rotation pivot in canvas space.
pub fn element_center(el: &CanvasElement) -> Point {
    let size = element_size(el);
    Point::new(el.x + size.width / 2.0, el.y + size.height / 2.0)
}

/// Scale `natural` down so its longer side is at most `max_side`, keeping the aspect ratio.
///
/// Sizes already within the bound are returned unchanged.
pub fn fit_within(natural: Size, max_side: f64) -> Size {
    let longer = natural.width.max(natural.height);
    if longer <= max_side || longer <= 0.0 {
        return natural;
    }
    let k = max_side / longer;
    Size::new(natural.width * k, natural.height * k)
}

/// Wrap degrees into `[0, 360)`.
pub fn normalize_degrees(deg: f64) -> f64 {
    let r = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if r >= 360.0 { 0.0 } else { r }
}

/// Maps a `src_w`×`src_h` pixel grid onto a `dst` box anchored at the local origin.
pub fn image_fit_affine(src_w: u32, src_h: u32, dst: Size) -> Affine {
    let sx = if src_w == 0 {
        1.0
    } else {
        dst.width / f64::from(src_w)
    };
    let sy = if src_h == 0 {
        1.0
    } else {
        dst.height / f64::from(src_h)
    };
    Affine::scale_non_uniform(sx, sy)
}

/// Offset that centers `content` inside `frame` (both anchored at the origin).
pub fn centered_offset(content: Size, frame: Size) -> Vec2 {
    Vec2::new(
        (frame.width - content.width) / 2.0,
        (frame.height - content.height) / 2.0,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/transform.rs"]
mod tests;
