use super::*;

#[test]
fn canvas_rejects_empty_dimensions() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(10, 0).is_err());
    let c = Canvas::new(800, 600).unwrap();
    assert_eq!(c.center(), Point::new(400.0, 300.0));
    assert_eq!(c.rect(), Rect::new(0.0, 0.0, 800.0, 600.0));
}

#[test]
fn transform_to_affine_identity_and_translation() {
    let t = Transform2D::default();
    assert_eq!(t.to_affine(), Affine::IDENTITY);

    let t = Transform2D {
        translate: Vec2::new(10.0, -2.5),
        ..Transform2D::default()
    };
    assert_eq!(t.to_affine(), Affine::translate(Vec2::new(10.0, -2.5)));
}

#[test]
fn transform_rotates_around_anchor() {
    let t = Transform2D {
        rotation_rad: std::f64::consts::FRAC_PI_2,
        anchor: Vec2::new(5.0, 5.0),
        ..Transform2D::default()
    };
    let a = t.to_affine();
    let pivot = a * Point::new(5.0, 5.0);
    assert!((pivot.x - 5.0).abs() < 1e-9 && (pivot.y - 5.0).abs() < 1e-9);

    // Clockwise in y-down space: a point right of the pivot moves below it.
    let p = a * Point::new(10.0, 5.0);
    assert!((p.x - 5.0).abs() < 1e-9);
    assert!((p.y - 10.0).abs() < 1e-9);
}

#[test]
fn premul_from_straight_rounds() {
    let p = Rgba8Premul::from_straight_rgba(255, 128, 0, 128);
    assert_eq!(p.to_array(), [128, 64, 0, 128]);
    assert_eq!(Rgba8Premul::transparent().to_array(), [0, 0, 0, 0]);
}
