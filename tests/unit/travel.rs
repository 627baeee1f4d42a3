use super::*;
use crate::{
    color::model::Color,
    foundation::core::{Canvas, Fps, Point, Vec2},
    scene::model::{ElementKind, LineShape},
    timeline::scheduler::Timeline,
};

fn scene_with_line(points: Vec<Point>) -> (Scene, ElementId) {
    let mut s = Scene::new(Canvas::default(), Color::from_hex("#222222").unwrap());
    let root = s.root();
    let line = s
        .add(
            root,
            Element::new(LineShape::new(points.into_iter().map(Into::into).collect())),
        )
        .unwrap();
    (s, line)
}

fn last_child(s: &Scene, parent: ElementId) -> ElementId {
    *s.element(parent).unwrap().children().last().unwrap()
}

#[test]
fn inset_is_radius_over_length() {
    assert_eq!(end_inset(2.0, 20.0), 0.1);
    assert_eq!(end_inset(15.0, 20.0), 0.5);
    assert_eq!(end_inset(10.0, 0.0), 0.5);
}

#[test]
fn marker_stays_a_radius_away_from_both_ends() {
    let (mut s, line) = scene_with_line(vec![
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(10.0, 10.0),
    ]);
    assert!((s.path_length(line).unwrap() - 20.0).abs() < 1e-9);

    let root = s.root();
    let mut tl = Timeline::new(travel_along(root, line, 1.0, 4.0), Fps::new(8, 1).unwrap());
    tl.step(&mut s).unwrap();

    let marker = last_child(&s, root);
    assert_ne!(marker, line);
    let start = s.world_position(marker).unwrap();
    assert!((start - Vec2::new(2.0, 0.0)).hypot() < 1e-9, "{start:?}");
    assert_eq!(s.number(s.element(marker).unwrap().opacity).unwrap(), 0.0);

    tl.step(&mut s).unwrap();
    assert_eq!(s.number(s.element(marker).unwrap().opacity).unwrap(), 1.0);

    while !tl.is_finished() {
        tl.step(&mut s).unwrap();
    }
    let end = s.world_position(marker).unwrap();
    assert!((end - Vec2::new(10.0, 8.0)).hypot() < 1e-9, "{end:?}");
    assert_eq!(s.number(s.element(marker).unwrap().opacity).unwrap(), 0.0);
}

#[test]
fn marker_contrasts_with_parent_fill() {
    let (mut s, line) = scene_with_line(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)]);
    let root = s.root();
    Timeline::new(
        travel_along(root, line, 0.5, DEFAULT_MARKER_SIZE),
        Fps::new(30, 1).unwrap(),
    )
    .run_to_end(&mut s)
    .unwrap();

    let marker = last_child(&s, root);
    match &s.element(marker).unwrap().kind {
        ElementKind::Circle(c) => {
            assert_eq!(s.number(c.size).unwrap(), DEFAULT_MARKER_SIZE);
            assert_eq!(s.color(c.fill.as_ref().unwrap()).unwrap(), Color::WHITE);
        }
        other => panic!("marker is {other:?}"),
    }
}

#[test]
fn degenerate_line_parks_marker_at_midpoint() {
    let (mut s, line) = scene_with_line(vec![Point::new(5.0, 5.0), Point::new(5.0, 5.0)]);
    let root = s.root();
    Timeline::new(travel_along(root, line, 0.4, 20.0), Fps::new(10, 1).unwrap())
        .run_to_end(&mut s)
        .unwrap();
    let marker = last_child(&s, root);
    assert_eq!(s.world_position(marker).unwrap(), Vec2::new(5.0, 5.0));
}
