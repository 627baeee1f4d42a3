use super::*;
use crate::{
    color::model::Color,
    foundation::core::{Canvas, Vec2},
    scene::model::{CircleShape, Element},
};

fn rasterizer() -> SvgRasterizer {
    SvgRasterizer::new::<&Path>(&[])
}

#[test]
fn renders_background_and_shapes() {
    let mut s = Scene::new(
        Canvas {
            width: 64,
            height: 32,
        },
        Color::from_hex("#222222").unwrap(),
    );
    let root = s.root();
    s.add(
        root,
        Element::new(CircleShape::new(16.0).fill(Color::from_hex("#ff0000").unwrap()))
            .at(Vec2::new(16.0, 0.0)),
    )
    .unwrap();

    let frame = rasterizer().render_scene(&s).unwrap();
    assert_eq!((frame.width, frame.height), (64, 32));
    assert_eq!(frame.data.len(), 64 * 32 * 4);
    assert!(frame.premultiplied);
    assert_eq!(frame.pixel(0, 0), Some([0x22, 0x22, 0x22, 255]));
    assert_eq!(frame.pixel(48, 16), Some([255, 0, 0, 255]));
    assert_eq!(frame.pixel(64, 0), None);
}

#[test]
fn rejects_bad_sizes_and_documents() {
    let r = rasterizer();
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4"></svg>"#;
    assert!(r.rasterize(svg, 0, 4).is_err());
    assert!(r.rasterize(svg, 4, MAX_DIM + 1).is_err());
    assert!(r.rasterize("not svg", 4, 4).is_err());

    let empty = r.rasterize(svg, 4, 4).unwrap();
    assert!(empty.data.iter().all(|b| *b == 0));
}

#[test]
fn missing_font_dir_is_not_fatal() {
    let r = SvgRasterizer::new(&["target/definitely-missing-font-dir"]);
    let _ = r.font_faces();
}
