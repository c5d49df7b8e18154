use serde_json::json;

use super::*;

fn text_element() -> CanvasElement {
    CanvasElement {
        id: ElementId::new(),
        x: 50.0,
        y: 50.0,
        rotation_deg: 0.0,
        body: ElementBody::Text(TextBody {
            text: "Hello".to_string(),
            color: Color::BLACK,
            font_size: 48.0,
            font_family: "Inter, sans-serif".to_string(),
            width: 300.0,
        }),
    }
}

fn image_element() -> CanvasElement {
    CanvasElement {
        id: ElementId::new(),
        x: 100.0,
        y: 100.0,
        rotation_deg: 0.0,
        body: ElementBody::Image(ImageBody {
            source: ImageRef::from("logo.png"),
            width: 200.0,
            height: 50.0,
        }),
    }
}

#[test]
fn element_ids_are_unique() {
    let a = ElementId::new();
    let b = ElementId::new();
    assert_ne!(a, b);
}

#[test]
fn patch_changes_only_named_fields() {
    let mut el = text_element();
    let before = el.clone();

    el.apply(&ElementPatch::text(TextPatch {
        color: Some(Color::rgb(255, 0, 0)),
        ..TextPatch::default()
    }))
    .unwrap();

    let t = el.as_text().unwrap();
    assert_eq!(t.color, Color::rgb(255, 0, 0));
    assert_eq!(t.text, "Hello");
    assert_eq!(t.font_size, 48.0);
    assert_eq!((el.x, el.y, el.rotation_deg), (before.x, before.y, before.rotation_deg));
    assert_eq!(el.id, before.id);
    assert_eq!(el.kind(), ElementKind::Text);
}

#[test]
fn patch_with_other_variant_is_rejected_atomically() {
    let mut el = text_element();
    let before = el.clone();

    let patch = ElementPatch {
        x: Some(1.0),
        body: Some(BodyPatch::Image(ImagePatch {
            width: Some(10.0),
            height: None,
        })),
        ..ElementPatch::default()
    };
    let err = el.apply(&patch).unwrap_err();
    assert!(err.to_string().contains("element type"));
    assert_eq!(el, before);
}

#[test]
fn patch_values_are_validated() {
    let mut el = text_element();
    for bad in [0.0, -4.0, f64::NAN, f64::INFINITY] {
        assert!(
            el.apply(&ElementPatch::text(TextPatch {
                font_size: Some(bad),
                ..TextPatch::default()
            }))
            .is_err()
        );
    }
    assert!(el.apply(&ElementPatch::position(f64::NAN, 0.0)).is_err());

    let mut img = image_element();
    assert!(
        img.apply(&ElementPatch::image(ImagePatch {
            width: None,
            height: Some(0.0),
        }))
        .is_err()
    );
    img.apply(&ElementPatch::rotation(45.0)).unwrap();
    assert_eq!(img.rotation_deg, 45.0);
}

#[test]
fn empty_patch_is_a_no_op() {
    let mut el = image_element();
    let before = el.clone();
    let patch = ElementPatch::default();
    assert!(patch.is_empty());
    el.apply(&patch).unwrap();
    assert_eq!(el, before);
}

#[test]
fn base_transform_patch_requires_unit_scale() {
    let mut t = BaseTransform::default();
    t.apply(&BaseTransformPatch {
        scale_x: Some(-1.0),
        ..BaseTransformPatch::default()
    })
    .unwrap();
    assert_eq!(t.scale_x, -1.0);
    assert_eq!(t.scale_y, 1.0);

    let err = t
        .apply(&BaseTransformPatch {
            rotate_deg: Some(90.0),
            scale_y: Some(2.0),
            ..BaseTransformPatch::default()
        })
        .unwrap_err();
    assert!(err.to_string().contains("scale_y"));
    assert_eq!(t.rotate_deg, 0.0);
}

#[test]
fn base_image_rejects_zero_dimensions() {
    assert!(BaseImage::new(ImageRef::from("a.png"), "", 0, 10).is_err());
    let base = BaseImage::new(ImageRef::from("a.png"), "crowd", 800, 600).unwrap();
    assert_eq!(base.canvas(), Canvas { width: 800, height: 600 });
    assert_eq!(base.transform, BaseTransform::default());
}

#[test]
fn element_json_is_tagged_by_type() {
    let el = image_element();
    let v = serde_json::to_value(&el).unwrap();
    assert_eq!(v["type"], json!("image"));
    assert_eq!(v["source"], json!("logo.png"));
    assert_eq!(v["width"], json!(200.0));

    let back: CanvasElement = serde_json::from_value(v).unwrap();
    assert_eq!(back, el);

    let text: CanvasElement = serde_json::from_value(json!({
        "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
        "type": "text",
        "x": 1.0,
        "y": 2.0,
        "text": "Hi",
        "color": "#ff0000",
        "font_size": 24.0,
        "font_family": "serif",
        "width": 120.0
    }))
    .unwrap();
    assert_eq!(text.kind(), ElementKind::Text);
    assert_eq!(text.rotation_deg, 0.0);
    text.validate().unwrap();
}
