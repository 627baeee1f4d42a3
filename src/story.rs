//! The "recalculate on change" story: a six-node color graph and its narrated timeline.

use indexmap::IndexMap;

use crate::{
    animation::ease::Ease,
    color::model::Color,
    foundation::{
        core::{Canvas, Vec2},
        error::RecalcResult,
    },
    graph::{
        builder::{Graph, NodeDescriptor},
        combinators,
    },
    scene::{
        model::{ColorSource, Element, ElementId, RectShape, Scene, TextShape, TextSource},
        signal::Signal,
    },
    timeline::{
        flow::{all, chain, spawn, wait},
        task::BoxTask,
        tween::tween,
    },
    travel::{DEFAULT_MARKER_SIZE, travel_along},
};

/// Length of the story script in seconds.
pub const DURATION_SECS: f64 = 85.0;

/// Canvas height the story layout is designed for.
pub const DESIGN_HEIGHT: f64 = 1080.0;

const FIRST_CAPTION: &str = "1. Set Value";

/// Node descriptors of the story graph, in build order.
pub fn descriptors() -> IndexMap<String, NodeDescriptor> {
    let nodes = [
        (
            "node-0",
            NodeDescriptor::new("Value", Vec2::new(-500.0, 0.0))
                .combinator(combinators::constant([173.0, 173.0, 173.0])),
        ),
        (
            "node-1",
            NodeDescriptor::new("Invert", Vec2::new(0.0, 300.0))
                .connect("node-0")
                .combinator(combinators::invert),
        ),
        (
            "node-2",
            NodeDescriptor::new("Pick Red", Vec2::new(-200.0, -200.0))
                .connect("node-0")
                .combinator(combinators::pick_red),
        ),
        (
            "node-3",
            NodeDescriptor::new("Value", Vec2::new(-400.0, 200.0))
                .combinator(combinators::constant([255.0, 0.0, 255.0])),
        ),
        (
            "node-4",
            NodeDescriptor::new("Desaturate", Vec2::new(200.0, -200.0))
                .connect("node-2")
                .combinator(combinators::desaturate(255.0)),
        ),
        (
            "node-5",
            NodeDescriptor::new("Average", Vec2::new(300.0, 50.0))
                .connections(["node-1", "node-2", "node-3", "node-4"])
                .combinator(combinators::average),
        ),
    ];
    nodes
        .into_iter()
        .map(|(id, d)| (id.to_string(), d))
        .collect()
}

/// Scene, graph and handles the script animates.
#[derive(Clone, Debug)]
pub struct Story {
    /// The scene; its root view is filled with the background color.
    pub scene: Scene,
    /// The story graph.
    pub graph: Graph,
    /// Rectangle holding the graph, offset right of center.
    pub parent: ElementId,
    /// Caption element.
    pub title: ElementId,
    /// Caption text.
    pub caption: Signal<String>,
}

impl Story {
    /// Lay out the story on `canvas`.
    #[tracing::instrument(skip(canvas), fields(width = canvas.width, height = canvas.height))]
    pub fn new(canvas: Canvas, background: Color, reference_height: f64) -> RecalcResult<Self> {
        canvas.validate()?;
        let mut scene = Scene::new(canvas, background);
        let view = scene.root();
        let vs = f64::from(canvas.height) / DESIGN_HEIGHT;
        let contrast = ColorSource::opposite_of_fill(view);

        let parent = scene.add(
            view,
            Element::new(RectShape::new(canvas.size()).fill(ColorSource::FillOf(view)))
                .named("graph")
                .at(Vec2::new(100.0 * vs, 0.0)),
        )?;

        let caption = scene.signals.create(FIRST_CAPTION.to_string());
        let title = scene.add(
            view,
            Element::new(
                TextShape::new(TextSource::Signal(caption))
                    .fill(contrast)
                    .font_family("Montserrat, sans-serif")
                    .font_size(48.0 * vs)
                    .font_weight(500),
            )
            .named("title")
            .at(Vec2::new(0.0, -450.0 * vs)),
        )?;

        let graph = Graph::build(&mut scene, parent, descriptors(), reference_height)?;
        scene.validate()?;

        Ok(Self {
            scene,
            graph,
            parent,
            title,
            caption,
        })
    }

    fn retitle(&self, text: &str) -> BoxTask {
        tween(self.caption, text.to_string(), 2.0, Ease::default())
    }

    fn travel(&self, node: &str, upstream: &str) -> RecalcResult<BoxTask> {
        Ok(travel_along(
            self.parent,
            self.graph.line(node, upstream)?,
            2.0,
            DEFAULT_MARKER_SIZE,
        ))
    }

    fn calc(&self, node: &str, duration: f64) -> RecalcResult<BoxTask> {
        Ok(self.graph.node(node)?.recompute_color(duration, None))
    }

    fn pulse(&self, node: &str, duration: f64, color: Option<Color>) -> RecalcResult<BoxTask> {
        Ok(self.graph.node(node)?.pulse(duration, color))
    }

    fn set_root(&self, hex: &str) -> RecalcResult<BoxTask> {
        Ok(self
            .graph
            .node("node-0")?
            .set_color(Color::from_hex(hex)?, 2.0))
    }

    /// Root color change followed by the downstream recalculation wave.
    fn wave(&self, hex: &str) -> RecalcResult<Vec<BoxTask>> {
        Ok(vec![
            self.set_root(hex)?,
            spawn(self.calc("node-1", 2.0)?),
            self.calc("node-2", 2.0)?,
            self.calc("node-4", 2.0)?,
            self.calc("node-5", 2.0)?,
        ])
    }

    /// The narrated timeline.
    ///
    /// Spawned recalculations overlap the step that follows them; everything else runs in
    /// sequence.
    pub fn script(&self) -> RecalcResult<BoxTask> {
        let highlight = self.scene.color(&ColorSource::opposite_of_fill(self.scene.root()))?;

        let mut steps: Vec<BoxTask> = vec![
            wait(3.0),
            self.set_root("#adff5c")?,
            self.pulse("node-0", 2.0, Some(Color::from_hex("#adff5c")?))?,
            self.retitle("2. Recalculate"),
            wait(2.0),
            all([self.travel("node-1", "node-0")?, self.travel("node-2", "node-0")?]),
            spawn(self.calc("node-1", 3.0)?),
            self.calc("node-2", 3.0)?,
            self.retitle("3. Check for Changes"),
            wait(2.0),
            self.pulse("node-1", 3.0, Some(highlight))?,
            self.retitle("4. Recalculate"),
            wait(2.0),
            all([self.travel("node-5", "node-1")?]),
            spawn(self.calc("node-5", 3.0)?),
            self.retitle("5. Check for Changes"),
            wait(2.0),
            self.pulse("node-5", 3.0, Some(highlight))?,
            wait(3.0),
            self.retitle("6. Wait for Changes"),
            wait(3.0),
            wait(3.0),
        ];
        steps.extend(self.wave("#fab000")?);
        steps.push(wait(3.0));
        steps.push(wait(3.0));
        steps.extend(self.wave("#000000")?);
        steps.push(wait(3.0));
        steps.extend(self.wave("#adadad")?);
        steps.push(wait(3.0));
        steps.push(self.retitle(FIRST_CAPTION));
        Ok(chain(steps))
    }
}

#[cfg(test)]
#[path = "../tests/unit/story.rs"]
mod tests;
