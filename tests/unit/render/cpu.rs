use super::*;
use crate::render::painter::{DrawOp, PaintPlan, execute_plan};

fn solid(w: u32, h: u32, rgba: [u8; 4]) -> PreparedImage {
    let mut data = Vec::with_capacity((w * h * 4) as usize);
    for _ in 0..w * h {
        data.extend_from_slice(&rgba);
    }
    PreparedImage {
        width: w,
        height: h,
        rgba8_premul: Arc::new(data),
    }
}

fn px(frame: &FrameRGBA, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [
        frame.data[i],
        frame.data[i + 1],
        frame.data[i + 2],
        frame.data[i + 3],
    ]
}

#[test]
fn begin_fills_background() {
    let mut painter = CpuPainter::new();
    let plan = PaintPlan {
        canvas: Canvas {
            width: 8,
            height: 6,
        },
        background: Color::rgb(10, 20, 30),
        ops: Vec::new(),
    };
    let frame = execute_plan(&mut painter, &plan).unwrap();
    assert_eq!((frame.width, frame.height), (8, 6));
    assert_eq!(frame.data.len(), 8 * 6 * 4);
    assert_eq!(px(&frame, 3, 3), [10, 20, 30, 255]);
}

#[test]
fn image_is_scaled_into_its_box() {
    let mut painter = CpuPainter::new();
    let plan = PaintPlan {
        canvas: Canvas {
            width: 20,
            height: 20,
        },
        background: Color::WHITE,
        ops: vec![DrawOp::Image {
            element: None,
            image: solid(2, 2, [255, 0, 0, 255]),
            transform: Affine::translate((5.0, 5.0)),
            size: Size::new(10.0, 10.0),
        }],
    };
    let frame = execute_plan(&mut painter, &plan).unwrap();
    assert_eq!(px(&frame, 10, 10), [255, 0, 0, 255]);
    assert_eq!(px(&frame, 1, 1), [255, 255, 255, 255]);
    assert_eq!(px(&frame, 18, 18), [255, 255, 255, 255]);
}

#[test]
fn later_ops_paint_over_earlier_ones() {
    let mut painter = CpuPainter::new();
    let plan = PaintPlan {
        canvas: Canvas {
            width: 10,
            height: 10,
        },
        background: Color::WHITE,
        ops: vec![
            DrawOp::Image {
                element: None,
                image: solid(1, 1, [255, 0, 0, 255]),
                transform: Affine::IDENTITY,
                size: Size::new(10.0, 10.0),
            },
            DrawOp::Image {
                element: None,
                image: solid(1, 1, [0, 0, 255, 255]),
                transform: Affine::translate((2.0, 2.0)),
                size: Size::new(6.0, 6.0),
            },
        ],
    };
    let frame = execute_plan(&mut painter, &plan).unwrap();
    assert_eq!(px(&frame, 5, 5), [0, 0, 255, 255]);
    assert_eq!(px(&frame, 0, 0), [255, 0, 0, 255]);
}

#[test]
fn drawing_before_begin_fails() {
    let mut painter = CpuPainter::new();
    let err = painter
        .draw_image(&solid(1, 1, [0, 0, 0, 255]), Affine::IDENTITY, Size::new(1.0, 1.0))
        .unwrap_err();
    assert!(matches!(err, PlacardError::Render(_)));
    assert!(painter.readback_rgba8().is_err());
}
