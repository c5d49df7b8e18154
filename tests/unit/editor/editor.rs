use std::collections::HashSet;
use std::io::Cursor;

use futures::executor::block_on;

use super::*;
use crate::assets::color::Color;
use crate::assets::source::MemoryImageLoader;
use crate::scene::model::TextPatch;

fn png(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn loader() -> MemoryImageLoader {
    MemoryImageLoader::new()
        .with("base.png", png(400, 300, [255, 255, 255, 255]))
        .with("wide.png", png(400, 100, [0, 128, 0, 255]))
        .with("small.png", png(40, 30, [0, 0, 255, 255]))
        .with("junk.bin", b"definitely not an image".to_vec())
}

fn editor() -> Editor {
    let base = BaseImage::new(ImageRef::from("base.png"), "street", 400, 300).unwrap();
    Editor::with_fonts(
        Scene::new(base),
        Box::new(loader()),
        EditorConfig::default(),
        FontBook::empty(),
    )
}

#[test]
fn added_ids_are_unique_and_live() {
    let mut ed = editor();
    let mut issued = Vec::new();
    for i in 0..6 {
        let id = if i % 2 == 0 {
            ed.add_text_element()
        } else {
            block_on(ed.add_image_element(ImageRef::from("small.png"))).unwrap()
        };
        issued.push(id);
    }
    ed.delete_element(issued[1]);
    ed.delete_element(issued[4]);

    let ids: Vec<_> = ed.elements().iter().map(|e| e.id).collect();
    let unique: HashSet<_> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len());
    assert_eq!(ids, vec![issued[0], issued[2], issued[3], issued[5]]);
}

#[test]
fn add_selects_new_element() {
    let mut ed = editor();
    let a = ed.add_text_element();
    assert_eq!(ed.selection(), Some(a));
    let b = block_on(ed.add_image_element(ImageRef::from("small.png"))).unwrap();
    assert_eq!(ed.selection(), Some(b));
    assert!(ed.visual_tree().elements[1].selected);
}

#[test]
fn delete_always_clears_selection() {
    let mut ed = editor();
    let a = ed.add_text_element();
    let b = ed.add_text_element();
    ed.select(Some(a));

    ed.delete_element(b);
    assert_eq!(ed.selection(), None);
    assert!(ed.scene().contains(a));

    ed.select(Some(a));
    ed.delete_element(ElementId::new());
    assert_eq!(ed.selection(), None);
    assert_eq!(ed.elements().len(), 1);
}

#[test]
fn update_changes_only_the_field() {
    let mut ed = editor();
    let id = ed.add_text_element();
    let before = ed.scene().element(id).unwrap().clone();

    ed.update_element(
        id,
        &ElementPatch::text(TextPatch {
            color: Some(Color::rgb(200, 0, 0)),
            ..TextPatch::default()
        }),
    )
    .unwrap();

    let after = ed.scene().element(id).unwrap();
    assert_eq!(after.kind(), before.kind());
    assert_eq!((after.x, after.y), (before.x, before.y));
    assert_eq!(after.as_text().unwrap().color, Color::rgb(200, 0, 0));
    assert_eq!(after.as_text().unwrap().text, before.as_text().unwrap().text);

    // Unknown ids are silently ignored.
    ed.update_element(ElementId::new(), &ElementPatch::position(0.0, 0.0))
        .unwrap();
}

#[test]
fn wide_image_is_capped_to_200() {
    let mut ed = editor();
    let id = block_on(ed.add_image_element(ImageRef::from("wide.png"))).unwrap();
    let el = ed.scene().element(id).unwrap();
    let img = el.as_image().unwrap();
    assert_eq!((img.width, img.height), (200.0, 50.0));
    assert_eq!((el.x, el.y, el.rotation_deg), (100.0, 100.0, 0.0));
}

#[test]
fn undecodable_image_is_rejected_without_mutation() {
    let mut ed = editor();
    let keep = ed.add_text_element();
    let rev = ed.scene().revision();

    for source in ["junk.bin", "nowhere.png"] {
        let err = block_on(ed.add_image_element(ImageRef::from(source))).unwrap_err();
        assert!(matches!(err, PlacardError::ImageDecode(_)), "{err}");
    }
    assert_eq!(ed.elements().len(), 1);
    assert_eq!(ed.scene().revision(), rev);
    assert_eq!(ed.selection(), Some(keep));
}

#[test]
fn base_tools_round_trip() {
    let mut ed = editor();
    for _ in 0..4 {
        ed.rotate_base_clockwise();
    }
    assert_eq!(ed.scene().base().transform.rotate_deg.rem_euclid(360.0), 0.0);

    ed.flip_base_horizontal();
    ed.flip_base_horizontal();
    assert_eq!(ed.scene().base().transform.scale_x, 1.0);

    ed.update_base_image_transform(&BaseTransformPatch {
        scale_y: Some(-1.0),
        ..BaseTransformPatch::default()
    })
    .unwrap();
    assert_eq!(ed.scene().base().transform.scale_y, -1.0);
}

#[test]
fn drag_commits_position_once() {
    let mut ed = editor();
    let id = ed.add_text_element();
    ed.select(None);
    let origin = Point::new(20.0, 10.0);
    ed.set_frame_origin(origin);
    let at = |x: f64, y: f64| Point::new(origin.x + x, origin.y + y);

    let down = ed.pointer_down(at(55.0, 55.0));
    assert_eq!(down, vec![Action::Select(id)]);
    assert_eq!(ed.selection(), Some(id));

    let rev = ed.scene().revision();
    for (x, y) in [(70.0, 60.0), (100.0, 75.0), (125.0, 85.0)] {
        ed.pointer_move(at(x, y));
    }
    assert_eq!(ed.scene().revision(), rev);

    let up = ed.pointer_up(at(125.0, 85.0));
    let commits: Vec<_> = up
        .iter()
        .filter(|a| matches!(a, Action::Commit { .. }))
        .collect();
    assert_eq!(commits.len(), 1);
    assert_eq!(ed.scene().revision(), rev + 1);

    let el = ed.scene().element(id).unwrap();
    assert_eq!((el.x, el.y), (120.0, 80.0));
    assert_eq!(ed.view().listeners().attached_count(), 0);
}

#[test]
fn clicking_empty_space_clears_selection() {
    let mut ed = editor();
    ed.add_text_element();
    assert!(ed.selection().is_some());
    assert_eq!(
        ed.pointer_down(Point::new(390.0, 290.0)),
        vec![Action::ClearSelection]
    );
    assert_eq!(ed.selection(), None);
}

#[test]
fn export_fails_when_base_cannot_load() {
    let base = BaseImage::new(ImageRef::from("gone.png"), "", 10, 10).unwrap();
    let mut ed = Editor::with_fonts(
        Scene::new(base),
        Box::new(loader()),
        EditorConfig::default(),
        FontBook::empty(),
    );
    let before = ed.snapshot();
    let err = block_on(ed.export_composition()).unwrap_err();
    assert!(matches!(err, PlacardError::BaseImageLoad(_)), "{err}");
    assert_eq!(*ed.snapshot(), *before);
}

#[test]
fn export_matches_canvas_size_and_name() {
    let mut ed = editor();
    block_on(ed.add_image_element(ImageRef::from("wide.png"))).unwrap();
    let out = block_on(ed.export_composition()).unwrap();
    assert_eq!((out.width, out.height), (400, 300));
    assert_eq!(out.file_name, "protest-canvas.png");

    let img = image::load_from_memory(&out.png).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (400, 300));
    assert_eq!(img.get_pixel(200, 125).0, [0, 128, 0, 255]);
    assert_eq!(img.get_pixel(10, 10).0, [255, 255, 255, 255]);
}

#[test]
fn exported_text_lands_near_its_center() {
    let mut ed = editor();
    let id = ed.add_text_element();
    ed.update_element(
        id,
        &ElementPatch::text(TextPatch {
            text: Some("MMMM".to_string()),
            ..TextPatch::default()
        }),
    )
    .unwrap();

    let out = block_on(ed.export_composition()).unwrap();
    let img = image::load_from_memory(&out.png).unwrap().to_rgba8();

    // Pivot is (50 + 300/2, 50 + 48/2) = (200, 74).
    let mut dark_near_center = 0;
    for y in 50..100 {
        for x in 150..250 {
            let [r, g, b, _] = img.get_pixel(x, y).0;
            if r < 128 && g < 128 && b < 128 {
                dark_near_center += 1;
            }
        }
    }
    assert!(dark_near_center > 0);

    let [r, g, b, _] = img.get_pixel(390, 290).0;
    assert_eq!((r, g, b), (255, 255, 255));
}

#[test]
fn open_reads_base_dimensions() {
    let ed = block_on(Editor::open(
        ImageRef::from("small.png"),
        "tiny",
        Box::new(loader()),
        EditorConfig::default(),
    ))
    .unwrap();
    assert_eq!(ed.scene().base().original_width(), 40);
    assert_eq!(ed.scene().base().original_height(), 30);
    assert_eq!(ed.scene().base().alt, "tiny");

    let err = block_on(Editor::open(
        ImageRef::from("junk.bin"),
        "",
        Box::new(loader()),
        EditorConfig::default(),
    ))
    .err()
    .unwrap();
    assert!(matches!(err, PlacardError::BaseImageLoad(_)));
}
