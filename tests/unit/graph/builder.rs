use super::*;
use crate::{
    foundation::core::{Canvas, Fps},
    graph::combinators,
    scene::model::RectShape,
    timeline::scheduler::Timeline,
};

fn scene() -> Scene {
    Scene::new(Canvas::default(), Color::from_hex("#222222").unwrap())
}

fn run(scene: &mut Scene, task: BoxTask) {
    Timeline::new(task, Fps::new(30, 1).unwrap())
        .run_to_end(scene)
        .unwrap();
}

fn map(entries: Vec<(&str, NodeDescriptor)>) -> IndexMap<String, NodeDescriptor> {
    entries
        .into_iter()
        .map(|(id, d)| (id.to_string(), d))
        .collect()
}

#[test]
fn unconnected_node_gets_a_single_black_input() {
    let mut s = scene();
    let root = s.root();
    let graph = Graph::build(
        &mut s,
        root,
        map(vec![(
            "a",
            NodeDescriptor::new("A", Vec2::ZERO).combinator(|inputs: &[Rgb]| {
                assert_eq!(inputs, &[[0.0, 0.0, 0.0]]);
                [10.0, 20.0, 30.0]
            }),
        )]),
        DEFAULT_REFERENCE_HEIGHT,
    )
    .unwrap();

    let a = graph.node("a").unwrap();
    assert_eq!(s.signal_color(a.color).unwrap(), Color::from_rgb(10.0, 20.0, 30.0));
    assert_eq!(
        a.derived_color(&s).unwrap(),
        Some(Color::from_rgb(10.0, 20.0, 30.0))
    );
}

#[test]
fn connected_inputs_follow_connection_order() {
    let mut s = scene();
    let root = s.root();
    let firsts = |inputs: &[Rgb]| [inputs[0][0], inputs[0][1], inputs.len() as f64];
    let graph = Graph::build(
        &mut s,
        root,
        map(vec![
            (
                "a",
                NodeDescriptor::new("A", Vec2::new(-200.0, 0.0))
                    .combinator(combinators::constant([10.0, 0.0, 0.0])),
            ),
            (
                "b",
                NodeDescriptor::new("B", Vec2::new(200.0, 0.0))
                    .combinator(combinators::constant([0.0, 20.0, 0.0])),
            ),
            (
                "ab",
                NodeDescriptor::new("AB", Vec2::new(0.0, 200.0))
                    .connections(["a", "b"])
                    .combinator(firsts),
            ),
            (
                "ba",
                NodeDescriptor::new("BA", Vec2::new(0.0, -200.0))
                    .connections(["b", "a"])
                    .combinator(firsts),
            ),
        ]),
        DEFAULT_REFERENCE_HEIGHT,
    )
    .unwrap();

    let ab = graph.node("ab").unwrap().derived_color(&s).unwrap().unwrap();
    let ba = graph.node("ba").unwrap().derived_color(&s).unwrap().unwrap();
    assert_eq!(ab.rgb(), [10.0, 0.0, 2.0]);
    assert_eq!(ba.rgb(), [0.0, 20.0, 2.0]);

    let keys: Vec<_> = graph.node("ba").unwrap().connection_lines.keys().cloned().collect();
    assert_eq!(keys, ["b", "a"]);
}

#[test]
fn derived_color_reads_upstream_at_call_time() {
    let mut s = scene();
    let root = s.root();
    let graph = Graph::build(
        &mut s,
        root,
        map(vec![
            ("root", NodeDescriptor::new("Value", Vec2::new(-300.0, 0.0))),
            (
                "child",
                NodeDescriptor::new("Invert", Vec2::new(300.0, 0.0))
                    .connect("root")
                    .combinator(combinators::invert),
            ),
        ]),
        DEFAULT_REFERENCE_HEIGHT,
    )
    .unwrap();
    let root_node = graph.node("root").unwrap();
    let child = graph.node("child").unwrap();

    assert_eq!(s.signal_color(root_node.color).unwrap(), Color::BLACK);
    assert_eq!(s.signal_color(child.color).unwrap().hex(), "#ffffff");

    s.signals
        .set(root_node.color, Color::from_hex("#adff5c").unwrap())
        .unwrap();
    // Nothing updates until a recompute runs.
    assert_eq!(s.signal_color(child.color).unwrap().hex(), "#ffffff");
    assert_eq!(
        child.derived_color(&s).unwrap().unwrap().hex(),
        "#5200a3"
    );
}

#[test]
fn recompute_propagates_one_hop() {
    let mut s = scene();
    let root = s.root();
    let graph = Graph::build(
        &mut s,
        root,
        map(vec![
            ("root", NodeDescriptor::new("Value", Vec2::new(-300.0, 0.0))),
            (
                "child",
                NodeDescriptor::new("Same", Vec2::new(300.0, 0.0))
                    .connect("root")
                    .combinator(combinators::identity),
            ),
        ]),
        DEFAULT_REFERENCE_HEIGHT,
    )
    .unwrap();
    let root_node = graph.node("root").unwrap();
    let child = graph.node("child").unwrap();

    run(
        &mut s,
        chain([
            root_node.set_color(Color::from_hex("#adff5c").unwrap(), 1.0),
            child.recompute_color(1.5, None),
        ]),
    );

    assert_eq!(s.signal_color(child.color).unwrap().hex(), "#adff5c");
    assert!(s.signals.get(child.glow).unwrap().abs() < 1e-9);
}

#[test]
fn recompute_without_combinator_keeps_color() {
    let mut s = scene();
    let root = s.root();
    let graph = Graph::build(
        &mut s,
        root,
        map(vec![("root", NodeDescriptor::new("Value", Vec2::ZERO))]),
        DEFAULT_REFERENCE_HEIGHT,
    )
    .unwrap();
    let node = graph.node("root").unwrap();
    s.signals
        .set(node.color, Color::from_hex("#fab000").unwrap())
        .unwrap();

    run(&mut s, node.recompute_color(0.9, Some(Ease::Linear)));
    assert_eq!(s.signal_color(node.color).unwrap().hex(), "#fab000");
}

#[test]
fn missing_connection_is_a_warning() {
    let mut s = scene();
    let root = s.root();
    let graph = Graph::build(
        &mut s,
        root,
        map(vec![
            (
                "early",
                NodeDescriptor::new("Early", Vec2::ZERO)
                    .connections(["late", "ghost"])
                    .combinator(combinators::identity),
            ),
            ("late", NodeDescriptor::new("Late", Vec2::new(200.0, 0.0))),
        ]),
        DEFAULT_REFERENCE_HEIGHT,
    )
    .unwrap();

    let early = graph.node("early").unwrap();
    assert!(early.connection_lines.is_empty());
    assert_eq!(
        graph.warnings(),
        &[
            GraphWarning::MissingConnection {
                node: "early".to_string(),
                connection: "late".to_string(),
            },
            GraphWarning::MissingConnection {
                node: "early".to_string(),
                connection: "ghost".to_string(),
            },
        ]
    );
    assert!(graph.warnings()[1].to_string().contains("ghost"));
    assert!(graph.line("early", "late").is_err());
    // Falls back to the black placeholder.
    assert_eq!(s.signal_color(early.color).unwrap(), Color::BLACK);
}

#[test]
fn edge_endpoints_stay_outside_both_circles() {
    for diameter in [20.0, 60.0, 100.0, 180.0] {
        let mut s = scene();
        let root = s.root();
        let graph = Graph::build(
            &mut s,
            root,
            map(vec![
                (
                    "up",
                    NodeDescriptor::new("Up", Vec2::new(-400.0, -120.0)).diameter(diameter),
                ),
                (
                    "down",
                    NodeDescriptor::new("Down", Vec2::new(250.0, 90.0))
                        .diameter(diameter * 1.5)
                        .connect("up")
                        .combinator(combinators::identity),
                ),
            ]),
            DEFAULT_REFERENCE_HEIGHT,
        )
        .unwrap();

        let up = graph.node("up").unwrap();
        let down = graph.node("down").unwrap();
        let line = graph.line("down", "up").unwrap();
        let pts = s.line_points(line).unwrap();
        assert_eq!(pts.len(), 2);

        let origin = s.world_position(graph.line_layer).unwrap();
        for (circle, radius) in [(up.circle, diameter * 0.55), (down.circle, diameter * 0.825)] {
            let center = s.world_position(circle).unwrap() - origin;
            for p in &pts {
                let d = (p.to_vec2() - center).hypot();
                assert!(d >= radius, "diameter {diameter}: {d} < {radius}");
            }
        }
        // Arrowhead end sits at the downstream circle.
        let down_center = s.world_position(down.circle).unwrap() - origin;
        let to_start = (pts[0].to_vec2() - down_center).hypot();
        let to_end = (pts[1].to_vec2() - down_center).hypot();
        assert!(to_end < to_start);
    }
}

#[test]
fn sizes_scale_with_parent_height() {
    let mut s = scene();
    let root = s.root();
    let half = s
        .add(
            root,
            Element::new(RectShape::new(Vec2::new(960.0, 540.0)).fill(Color::WHITE)),
        )
        .unwrap();
    let graph = Graph::build(
        &mut s,
        half,
        map(vec![
            ("a", NodeDescriptor::new("A", Vec2::new(-100.0, 0.0))),
            (
                "b",
                NodeDescriptor::new("B", Vec2::new(100.0, 0.0))
                    .connect("a")
                    .combinator(combinators::identity),
            ),
        ]),
        DEFAULT_REFERENCE_HEIGHT,
    )
    .unwrap();

    assert_eq!(graph.scale(), 0.5);
    let b = graph.node("b").unwrap();
    let circle = s.circle(b.circle).unwrap();
    assert_eq!(s.number(circle.size).unwrap(), 50.0);
    assert_eq!(circle.line_width, 5.0);
    assert!(circle.stroke_first);
    // White parent: strokes and labels turn black.
    assert_eq!(
        s.color(circle.stroke.as_ref().unwrap()).unwrap(),
        Color::BLACK
    );

    let line = s.line(graph.line("b", "a").unwrap()).unwrap();
    assert_eq!(line.line_width, 1.5);
    assert_eq!(line.arrow_size, 5.0);
    assert!(line.end_arrow);

    match &s.element(b.label).unwrap().kind {
        ElementKind::Text(t) => assert_eq!(t.font_size, 10.0),
        other => panic!("label is {other:?}"),
    }
}

#[test]
fn labels_follow_their_circle() {
    let mut s = scene();
    let root = s.root();
    let graph = Graph::build(
        &mut s,
        root,
        map(vec![("a", NodeDescriptor::new("A", Vec2::new(-100.0, 40.0)))]),
        DEFAULT_REFERENCE_HEIGHT,
    )
    .unwrap();
    let a = graph.node("a").unwrap();

    assert_eq!(
        s.world_position(a.label).unwrap(),
        Vec2::new(-100.0, 120.0)
    );
    assert_eq!(s.world_position(a.readout).unwrap(), Vec2::new(-100.0, 40.0));

    s.element_mut(a.container).unwrap().position = PositionSource::Const(Vec2::new(300.0, -10.0));
    assert_eq!(s.world_position(a.label).unwrap(), Vec2::new(300.0, 70.0));
    assert_eq!(s.world_position(a.readout).unwrap(), Vec2::new(300.0, -10.0));
}

#[test]
fn readout_shows_hex_in_contrasting_color() {
    let mut s = scene();
    let root = s.root();
    let graph = Graph::build(
        &mut s,
        root,
        map(vec![(
            "a",
            NodeDescriptor::new("A", Vec2::ZERO).combinator(combinators::constant([
                173.0, 255.0, 92.0,
            ])),
        )]),
        DEFAULT_REFERENCE_HEIGHT,
    )
    .unwrap();
    let a = graph.node("a").unwrap();
    match &s.element(a.readout).unwrap().kind {
        ElementKind::Text(t) => {
            assert_eq!(s.text(&t.text).unwrap(), "#adff5c");
            assert_eq!(s.color(&t.fill).unwrap(), Color::BLACK);
        }
        other => panic!("readout is {other:?}"),
    }
    match &s.element(a.label).unwrap().kind {
        ElementKind::Text(t) => assert_eq!(s.color(&t.fill).unwrap(), Color::WHITE),
        other => panic!("label is {other:?}"),
    }
}

#[test]
fn pulse_peaks_by_glow_luminance_and_returns() {
    let mut s = scene();
    let root = s.root();
    let graph = Graph::build(
        &mut s,
        root,
        map(vec![("a", NodeDescriptor::new("A", Vec2::ZERO))]),
        DEFAULT_REFERENCE_HEIGHT,
    )
    .unwrap();
    let a = graph.node("a").unwrap();

    let mut tl = Timeline::new(a.pulse(0.8, Some(Color::BLACK)), Fps::new(10, 1).unwrap());
    // frame 0 plus 0.4 s: inside the hold phase (0.3 s .. 0.5 s)
    for _ in 0..5 {
        tl.step(&mut s).unwrap();
    }
    assert!((s.signals.get(a.glow).unwrap() - 60.0).abs() < 1e-9);
    match &s.circle(a.circle).unwrap().shadow_color {
        ColorSource::Const(c) => assert_eq!(*c, Color::BLACK),
        other => panic!("shadow color is {other:?}"),
    }

    tl.run_to_end(&mut s).unwrap();
    assert!(s.signals.get(a.glow).unwrap().abs() < 1e-9);

    let mut white = Timeline::new(a.pulse(0.8, Some(Color::WHITE)), Fps::new(10, 1).unwrap());
    for _ in 0..5 {
        white.step(&mut s).unwrap();
    }
    assert!((s.signals.get(a.glow).unwrap() - 20.0).abs() < 1e-9);
}

#[test]
fn lookups_and_parent_checks() {
    let mut s = scene();
    let root = s.root();
    let group = s.add(root, Element::group()).unwrap();
    assert!(Graph::build(&mut s, group, IndexMap::new(), DEFAULT_REFERENCE_HEIGHT).is_err());
    assert!(Graph::build(&mut s, root, IndexMap::new(), 0.0).is_err());

    let graph = Graph::build(&mut s, root, IndexMap::new(), DEFAULT_REFERENCE_HEIGHT).unwrap();
    assert!(graph.node("nope").is_err());
    assert!(graph.nodes().is_empty());
}

#[test]
fn snapshot_lists_nodes_in_order() {
    let mut s = scene();
    let root = s.root();
    let graph = Graph::build(
        &mut s,
        root,
        map(vec![
            ("a", NodeDescriptor::new("A", Vec2::new(-10.0, 0.0))),
            (
                "b",
                NodeDescriptor::new("B", Vec2::new(10.0, 0.0))
                    .connect("a")
                    .combinator(combinators::invert),
            ),
        ]),
        DEFAULT_REFERENCE_HEIGHT,
    )
    .unwrap();

    let snap = graph.snapshot(&s).unwrap();
    assert_eq!(snap.nodes.len(), 2);
    assert_eq!(snap.nodes[0].id, "a");
    assert_eq!(snap.nodes[0].derived, None);
    assert_eq!(snap.nodes[1].connections, ["a"]);
    assert_eq!(snap.nodes[1].position, [10.0, 0.0]);

    let json = serde_json::to_value(&snap).unwrap();
    assert_eq!(json["nodes"][1]["color"], "#ffffff");
    assert!(json["nodes"][0].get("derived").is_none());
}
