use std::{fmt, sync::Arc};

use indexmap::IndexMap;

use crate::{
    animation::ease::Ease,
    color::model::{Color, Rgb},
    foundation::{
        core::Vec2,
        error::{RecalcError, RecalcResult},
    },
    scene::{
        model::{
            CircleShape, ColorSource, Element, ElementId, ElementKind, LineShape, PointSource,
            PositionSource, Scene, TextShape, TextSource,
        },
        signal::Signal,
    },
    timeline::{
        flow::{chain, defer, wait},
        task::BoxTask,
        tween::tween,
    },
};

/// Diameter used when a descriptor does not set one.
pub const DEFAULT_DIAMETER: f64 = 100.0;

/// Parent height the base sizes are designed for.
pub const DEFAULT_REFERENCE_HEIGHT: f64 = 1080.0;

const LABEL_FONT: &str = "Montserrat, sans-serif";
const READOUT_FONT: &str = "monospace";

/// Shared color combinator.
pub type Combinator = Arc<dyn Fn(&[Rgb]) -> Rgb + Send + Sync>;

/// Input parameters for one graph node.
#[derive(Clone)]
pub struct NodeDescriptor {
    /// Display name shown under the circle.
    pub name: String,
    /// Container position in the graph parent's space.
    pub position: Vec2,
    /// Maps upstream colors to this node's color; `None` for nodes whose color is set directly.
    pub combinator: Option<Combinator>,
    /// Upstream node identifiers, in combinator input order.
    pub connections: Vec<String>,
    /// Unscaled circle diameter.
    pub diameter: f64,
}

impl NodeDescriptor {
    /// Node named `name` at `position`, with no combinator and no connections.
    pub fn new(name: impl Into<String>, position: Vec2) -> Self {
        Self {
            name: name.into(),
            position,
            combinator: None,
            connections: Vec::new(),
            diameter: DEFAULT_DIAMETER,
        }
    }

    /// Set the color combinator.
    pub fn combinator<F>(mut self, f: F) -> Self
    where
        F: Fn(&[Rgb]) -> Rgb + Send + Sync + 'static,
    {
        self.combinator = Some(Arc::new(f));
        self
    }

    /// Append one upstream connection.
    pub fn connect(mut self, upstream: impl Into<String>) -> Self {
        self.connections.push(upstream.into());
        self
    }

    /// Append several upstream connections.
    pub fn connections<I, S>(mut self, upstream: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.connections.extend(upstream.into_iter().map(Into::into));
        self
    }

    /// Set the unscaled diameter.
    pub fn diameter(mut self, diameter: f64) -> Self {
        self.diameter = diameter;
        self
    }
}

impl fmt::Debug for NodeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeDescriptor")
            .field("name", &self.name)
            .field("position", &self.position)
            .field("combinator", &self.combinator.as_ref().map(|_| "Fn"))
            .field("connections", &self.connections)
            .field("diameter", &self.diameter)
            .finish()
    }
}

/// Non-fatal problems found while building a graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphWarning {
    /// A connection named a node that was not built before it.
    MissingConnection {
        /// Node declaring the connection.
        node: String,
        /// The unresolved upstream identifier.
        connection: String,
    },
}

impl fmt::Display for GraphWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingConnection { node, connection } => write!(
                f,
                "node '{node}' connects to nonexistent node '{connection}'; is it declared first?"
            ),
        }
    }
}

/// A node after construction: scene handles, signals and its animation operations.
#[derive(Clone, Debug)]
pub struct GraphNode {
    /// Identifier from the descriptor map.
    pub id: String,
    /// Descriptor the node was built from.
    pub descriptor: NodeDescriptor,
    /// Group positioned at the descriptor position.
    pub container: ElementId,
    /// The node circle.
    pub circle: ElementId,
    /// Name label.
    pub label: ElementId,
    /// Hex readout drawn over the circle.
    pub readout: ElementId,
    /// Current node color.
    pub color: Signal<Color>,
    /// Current glow radius.
    pub glow: Signal<f64>,
    /// Line per resolved upstream connection, keyed by upstream identifier.
    pub connection_lines: IndexMap<String, ElementId>,
    upstream: Vec<Signal<Color>>,
    scale: f64,
}

impl GraphNode {
    /// Scale factor applied to every absolute size of this node.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Combinator output for the upstream colors as they are right now.
    ///
    /// `None` when the node has no combinator.
    pub fn derived_color(&self, scene: &Scene) -> RecalcResult<Option<Color>> {
        let Some(combinator) = self.descriptor.combinator.as_ref() else {
            return Ok(None);
        };
        let inputs = upstream_inputs(scene, &self.upstream)?;
        Ok(Some(Color::from(combinator(&inputs))))
    }

    /// Tween to the derived color over a third of `duration`, then pulse for the rest.
    ///
    /// The target is read when the task starts. Without a combinator the color is kept.
    pub fn recompute_color(&self, duration: f64, ease: Option<Ease>) -> BoxTask {
        let node = self.clone();
        defer(move |scene| {
            let target = match node.derived_color(scene)? {
                Some(c) => c,
                None => scene.signal_color(node.color)?,
            };
            let ease = ease.unwrap_or_default();
            Ok(chain([
                tween(node.color, target, duration / 3.0, ease),
                node.pulse(duration * 2.0 / 3.0, None),
            ]))
        })
    }

    /// Glow in `color` (default: the derived color, else the current one) and fade back.
    ///
    /// Ramp up over 3/8 of `duration`, hold 2/8, return to the starting radius over 3/8. Darker
    /// glow colors get a wider glow.
    pub fn pulse(&self, duration: f64, color: Option<Color>) -> BoxTask {
        let node = self.clone();
        defer(move |scene| {
            let glow_color = match color {
                Some(c) => c,
                None => match node.derived_color(scene)? {
                    Some(c) => c,
                    None => scene.signal_color(node.color)?,
                },
            };
            scene.circle_mut(node.circle)?.shadow_color = ColorSource::Const(glow_color);

            let start = *scene.signals.get(node.glow)?;
            let peak = node.scale * 40.0 * (1.5 - glow_color.luminance());
            let eighth = duration / 8.0;
            Ok(chain([
                tween(node.glow, peak, eighth * 3.0, Ease::InCubic),
                wait(eighth * 2.0),
                tween(node.glow, start, eighth * 3.0, Ease::OutCubic),
            ]))
        })
    }

    /// Tween the color directly to `target`.
    pub fn set_color(&self, target: Color, duration: f64) -> BoxTask {
        tween(self.color, target, duration, Ease::default())
    }
}

fn upstream_inputs(scene: &Scene, upstream: &[Signal<Color>]) -> RecalcResult<Vec<Rgb>> {
    if upstream.is_empty() {
        return Ok(vec![[0.0; 3]]);
    }
    upstream
        .iter()
        .map(|s| Ok(scene.signal_color(*s)?.rgb()))
        .collect()
}

/// A built graph: three layers under the parent plus the nodes in declaration order.
#[derive(Clone, Debug)]
pub struct Graph {
    /// Layer holding connection lines (painted first).
    pub line_layer: ElementId,
    /// Layer holding node containers and circles.
    pub node_layer: ElementId,
    /// Layer holding labels and readouts (painted last).
    pub text_layer: ElementId,
    nodes: IndexMap<String, GraphNode>,
    warnings: Vec<GraphWarning>,
    scale: f64,
}

impl Graph {
    /// Build every node of `descriptors` under `parent`, in map order.
    ///
    /// `parent` must be a rectangle; its height divided by `reference_height` scales every size.
    /// Connections to nodes not declared earlier are dropped with a warning.
    #[tracing::instrument(skip(scene, descriptors), fields(nodes = descriptors.len()))]
    pub fn build(
        scene: &mut Scene,
        parent: ElementId,
        descriptors: IndexMap<String, NodeDescriptor>,
        reference_height: f64,
    ) -> RecalcResult<Self> {
        if !reference_height.is_finite() || reference_height <= 0.0 {
            return Err(RecalcError::validation(
                "graph reference height must be finite and > 0",
            ));
        }
        let parent_height = match &scene.element(parent)?.kind {
            ElementKind::Rect(r) => r.size.y,
            _ => {
                return Err(RecalcError::validation(
                    "graph parent must be a rectangle",
                ));
            }
        };
        let scale = parent_height / reference_height;

        let line_layer = scene.add(parent, Element::group().named("lines"))?;
        let node_layer = scene.add(parent, Element::group().named("nodes"))?;
        let text_layer = scene.add(parent, Element::group().named("text"))?;

        let mut graph = Self {
            line_layer,
            node_layer,
            text_layer,
            nodes: IndexMap::with_capacity(descriptors.len()),
            warnings: Vec::new(),
            scale,
        };
        for (id, descriptor) in descriptors {
            let node = graph.build_node(scene, parent, id.clone(), descriptor)?;
            graph.nodes.insert(id, node);
        }
        Ok(graph)
    }

    fn build_node(
        &mut self,
        scene: &mut Scene,
        parent: ElementId,
        id: String,
        descriptor: NodeDescriptor,
    ) -> RecalcResult<GraphNode> {
        if !descriptor.diameter.is_finite() || descriptor.diameter <= 0.0 {
            return Err(RecalcError::validation(format!(
                "node '{id}' diameter must be finite and > 0"
            )));
        }
        let s = self.scale;
        let size = descriptor.diameter * s;

        let mut resolved: IndexMap<String, (ElementId, Signal<Color>)> = IndexMap::new();
        for connection in &descriptor.connections {
            match self.nodes.get(connection) {
                Some(up) => {
                    resolved.insert(connection.clone(), (up.circle, up.color));
                }
                None => {
                    tracing::warn!(
                        node = %id,
                        connection = %connection,
                        "trying to connect to nonexistent node; is it declared first?"
                    );
                    self.warnings.push(GraphWarning::MissingConnection {
                        node: id.clone(),
                        connection: connection.clone(),
                    });
                }
            }
        }
        let upstream: Vec<Signal<Color>> = resolved.values().map(|(_, c)| *c).collect();

        let initial = match descriptor.combinator.as_ref() {
            Some(f) => Color::from(f(&upstream_inputs(scene, &upstream)?)),
            None => Color::BLACK,
        };
        let color = scene.signals.create(initial);
        let glow = scene.signals.create(0.0_f64);
        let parent_contrast = ColorSource::opposite_of_fill(parent);

        let container = scene.add(
            self.node_layer,
            Element::group().named(id.clone()).at(descriptor.position),
        )?;
        let circle = scene.add(
            container,
            Element::new(
                CircleShape::new(size)
                    .fill(color)
                    .stroke(parent_contrast.clone(), size / 10.0)
                    .stroke_first(true)
                    .shadow(glow, color),
            )
            .named(format!("{id}-circle")),
        )?;

        let label = scene.add(
            self.text_layer,
            Element::new(
                TextShape::new(TextSource::Const(descriptor.name.clone()))
                    .fill(parent_contrast.clone())
                    .font_family(LABEL_FONT)
                    .font_size(size / 5.0),
            )
            .named(format!("{id}-label"))
            .at(PositionSource::Follow {
                target: circle,
                offset: Vec2::new(0.0, size * 0.8),
            }),
        )?;
        let readout = scene.add(
            self.text_layer,
            Element::new(
                TextShape::new(TextSource::HexOf(color))
                    .fill(ColorSource::from(color).opposite())
                    .font_family(READOUT_FONT)
                    .font_size(size / 5.0),
            )
            .named(format!("{id}-hex"))
            .at(PositionSource::Follow {
                target: circle,
                offset: Vec2::ZERO,
            }),
        )?;

        let mut connection_lines = IndexMap::with_capacity(resolved.len());
        for (upstream_id, (upstream_circle, _)) in &resolved {
            let padding = 10.0 * s;
            let line = scene.add(
                self.line_layer,
                Element::new(
                    LineShape::new(vec![
                        PointSource::Rim {
                            of: *upstream_circle,
                            toward: circle,
                            padding,
                        },
                        PointSource::Rim {
                            of: circle,
                            toward: *upstream_circle,
                            padding,
                        },
                    ])
                    .stroke(parent_contrast.clone(), 3.0 * s)
                    .end_arrow(10.0 * s),
                )
                .named(format!("{upstream_id}->{id}")),
            )?;
            connection_lines.insert(upstream_id.clone(), line);
        }

        tracing::debug!(node = %id, color = %initial, edges = connection_lines.len(), "built node");
        Ok(GraphNode {
            id,
            descriptor,
            container,
            circle,
            label,
            readout,
            color,
            glow,
            connection_lines,
            upstream,
            scale: s,
        })
    }

    /// Look up a node.
    pub fn node(&self, id: &str) -> RecalcResult<&GraphNode> {
        self.nodes
            .get(id)
            .ok_or_else(|| RecalcError::validation(format!("unknown graph node '{id}'")))
    }

    /// All nodes in declaration order.
    pub fn nodes(&self) -> &IndexMap<String, GraphNode> {
        &self.nodes
    }

    /// Line rendering the connection `upstream -> node`.
    pub fn line(&self, node: &str, upstream: &str) -> RecalcResult<ElementId> {
        self.node(node)?
            .connection_lines
            .get(upstream)
            .copied()
            .ok_or_else(|| {
                RecalcError::validation(format!("node '{node}' has no connection from '{upstream}'"))
            })
    }

    /// Problems found while building.
    pub fn warnings(&self) -> &[GraphWarning] {
        &self.warnings
    }

    /// Parent height over reference height.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Serializable view of the graph as the scene holds it now.
    pub fn snapshot(&self, scene: &Scene) -> RecalcResult<GraphSnapshot> {
        let nodes = self
            .nodes
            .values()
            .map(|n| {
                let p = scene.world_position(n.circle)?;
                Ok(NodeSnapshot {
                    id: n.id.clone(),
                    name: n.descriptor.name.clone(),
                    position: [p.x, p.y],
                    diameter: n.descriptor.diameter * n.scale,
                    connections: n.connection_lines.keys().cloned().collect(),
                    color: scene.signal_color(n.color)?,
                    derived: n.derived_color(scene)?,
                })
            })
            .collect::<RecalcResult<Vec<_>>>()?;
        Ok(GraphSnapshot {
            scale: self.scale,
            nodes,
            warnings: self.warnings.iter().map(ToString::to_string).collect(),
        })
    }
}

/// Serializable graph state.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct GraphSnapshot {
    /// Scale factor.
    pub scale: f64,
    /// Nodes in declaration order.
    pub nodes: Vec<NodeSnapshot>,
    /// Build warnings, rendered as text.
    pub warnings: Vec<String>,
}

/// Serializable state of one node.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct NodeSnapshot {
    /// Node identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Circle center in scene space.
    pub position: [f64; 2],
    /// Scaled diameter.
    pub diameter: f64,
    /// Resolved upstream identifiers.
    pub connections: Vec<String>,
    /// Current color.
    pub color: Color,
    /// Combinator output for the current upstream colors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derived: Option<Color>,
}

#[cfg(test)]
#[path = "../../tests/unit/graph/builder.rs"]
mod tests;
