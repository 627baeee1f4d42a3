use crate::{
    color::model::Color,
    foundation::{
        core::{Canvas, Point, Vec2},
        error::{RecalcError, RecalcResult},
    },
    scene::signal::{Signal, SignalStore},
};

/// Index of an element in a [`Scene`] arena.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ElementId(pub(crate) usize);

/// Where a color comes from when a frame is evaluated.
#[derive(Clone, Debug)]
pub enum ColorSource {
    /// Fixed color.
    Const(Color),
    /// Current value of a color signal.
    Signal(Signal<Color>),
    /// Black or white, whichever contrasts with the inner source.
    OppositeExtreme(Box<ColorSource>),
    /// Fill of another element, black when it has none.
    FillOf(ElementId),
}

impl ColorSource {
    /// Contrast color against `self`.
    pub fn opposite(self) -> Self {
        Self::OppositeExtreme(Box::new(self))
    }

    /// Contrast color against the fill of `element`.
    pub fn opposite_of_fill(element: ElementId) -> Self {
        Self::FillOf(element).opposite()
    }
}

impl From<Color> for ColorSource {
    fn from(value: Color) -> Self {
        Self::Const(value)
    }
}

impl From<Signal<Color>> for ColorSource {
    fn from(value: Signal<Color>) -> Self {
        Self::Signal(value)
    }
}

/// Where a scalar comes from when a frame is evaluated.
#[derive(Clone, Copy, Debug)]
pub enum NumberSource {
    /// Fixed value.
    Const(f64),
    /// Current value of a number signal.
    Signal(Signal<f64>),
}

impl From<f64> for NumberSource {
    fn from(value: f64) -> Self {
        Self::Const(value)
    }
}

impl From<Signal<f64>> for NumberSource {
    fn from(value: Signal<f64>) -> Self {
        Self::Signal(value)
    }
}

/// Where a text element gets its string.
#[derive(Clone, Debug)]
pub enum TextSource {
    /// Fixed text.
    Const(String),
    /// Current value of a string signal.
    Signal(Signal<String>),
    /// Hex code of a color signal.
    HexOf(Signal<Color>),
}

/// Position of an element relative to its parent.
#[derive(Clone, Copy, Debug)]
pub enum PositionSource {
    /// Fixed offset from the parent origin.
    Const(Vec2),
    /// Current value of a vector signal.
    Signal(Signal<Vec2>),
    /// The absolute position of `target` expressed in this element's parent space, plus `offset`.
    Follow {
        /// Element being tracked.
        target: ElementId,
        /// Extra offset in parent space.
        offset: Vec2,
    },
    /// Point on a line's path at `start + (end - start) * progress` of its arc length.
    OnPath {
        /// Line element providing the path.
        line: ElementId,
        /// Progress signal in `0..=1`.
        progress: Signal<f64>,
        /// Path fraction at progress 0.
        start: f64,
        /// Path fraction at progress 1.
        end: f64,
    },
}

impl Default for PositionSource {
    fn default() -> Self {
        Self::Const(Vec2::ZERO)
    }
}

impl From<Vec2> for PositionSource {
    fn from(value: Vec2) -> Self {
        Self::Const(value)
    }
}

/// A line vertex, evaluated in the line's parent space.
#[derive(Clone, Copy, Debug)]
pub enum PointSource {
    /// Fixed point.
    Const(Point),
    /// Point on the outer rim of circle `of` facing circle `toward`, pushed out by `padding`.
    Rim {
        /// Circle the point sits on.
        of: ElementId,
        /// Circle the point faces.
        toward: ElementId,
        /// Extra distance beyond the stroke-adjusted radius.
        padding: f64,
    },
}

impl From<Point> for PointSource {
    fn from(value: Point) -> Self {
        Self::Const(value)
    }
}

/// Axis-aligned rectangle centered on its position.
#[derive(Clone, Debug)]
pub struct RectShape {
    /// Width and height.
    pub size: Vec2,
    /// Optional fill.
    pub fill: Option<ColorSource>,
}

impl RectShape {
    /// Unfilled rectangle of `size`.
    pub fn new(size: Vec2) -> Self {
        Self { size, fill: None }
    }

    /// Set the fill.
    pub fn fill(mut self, fill: impl Into<ColorSource>) -> Self {
        self.fill = Some(fill.into());
        self
    }
}

/// Circle centered on its position, with an optional glow.
#[derive(Clone, Debug)]
pub struct CircleShape {
    /// Diameter.
    pub size: NumberSource,
    /// Optional fill.
    pub fill: Option<ColorSource>,
    /// Optional stroke.
    pub stroke: Option<ColorSource>,
    /// Stroke width, centered on the rim.
    pub line_width: f64,
    /// Paint the stroke below the fill.
    pub stroke_first: bool,
    /// Glow radius; zero disables the glow.
    pub shadow_blur: NumberSource,
    /// Glow color.
    pub shadow_color: ColorSource,
}

impl CircleShape {
    /// Unfilled circle with diameter `size`.
    pub fn new(size: impl Into<NumberSource>) -> Self {
        Self {
            size: size.into(),
            fill: None,
            stroke: None,
            line_width: 0.0,
            stroke_first: false,
            shadow_blur: NumberSource::Const(0.0),
            shadow_color: ColorSource::Const(Color::BLACK),
        }
    }

    /// Set the fill.
    pub fn fill(mut self, fill: impl Into<ColorSource>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    /// Set stroke color and width.
    pub fn stroke(mut self, stroke: impl Into<ColorSource>, line_width: f64) -> Self {
        self.stroke = Some(stroke.into());
        self.line_width = line_width;
        self
    }

    /// Paint the stroke before the fill.
    pub fn stroke_first(mut self, stroke_first: bool) -> Self {
        self.stroke_first = stroke_first;
        self
    }

    /// Set glow radius and color.
    pub fn shadow(mut self, blur: impl Into<NumberSource>, color: impl Into<ColorSource>) -> Self {
        self.shadow_blur = blur.into();
        self.shadow_color = color.into();
        self
    }
}

/// Single-line text centered on its position.
#[derive(Clone, Debug)]
pub struct TextShape {
    /// Text content.
    pub text: TextSource,
    /// Text color.
    pub fill: ColorSource,
    /// Font family list, CSS syntax.
    pub font_family: String,
    /// Font size in pixels.
    pub font_size: f64,
    /// CSS font weight.
    pub font_weight: u16,
}

impl TextShape {
    /// White 48px sans-serif text.
    pub fn new(text: TextSource) -> Self {
        Self {
            text,
            fill: ColorSource::Const(Color::WHITE),
            font_family: "sans-serif".to_string(),
            font_size: 48.0,
            font_weight: 400,
        }
    }

    /// Set the text color.
    pub fn fill(mut self, fill: impl Into<ColorSource>) -> Self {
        self.fill = fill.into();
        self
    }

    /// Set the font family list.
    pub fn font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    /// Set the font size.
    pub fn font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    /// Set the font weight.
    pub fn font_weight(mut self, weight: u16) -> Self {
        self.font_weight = weight;
        self
    }
}

/// Polyline with an optional arrowhead at its last point.
#[derive(Clone, Debug)]
pub struct LineShape {
    /// Vertices in the line's parent space.
    pub points: Vec<PointSource>,
    /// Stroke color (also used for the arrowhead).
    pub stroke: ColorSource,
    /// Stroke width.
    pub line_width: f64,
    /// Draw an arrowhead at the last point.
    pub end_arrow: bool,
    /// Arrowhead length and width.
    pub arrow_size: f64,
}

impl LineShape {
    /// White 1px polyline through `points`.
    pub fn new(points: Vec<PointSource>) -> Self {
        Self {
            points,
            stroke: ColorSource::Const(Color::WHITE),
            line_width: 1.0,
            end_arrow: false,
            arrow_size: 10.0,
        }
    }

    /// Set stroke color and width.
    pub fn stroke(mut self, stroke: impl Into<ColorSource>, line_width: f64) -> Self {
        self.stroke = stroke.into();
        self.line_width = line_width;
        self
    }

    /// Draw an arrowhead of `size` at the last point.
    pub fn end_arrow(mut self, size: f64) -> Self {
        self.end_arrow = true;
        self.arrow_size = size;
        self
    }
}

/// Visual payload of an element.
#[derive(Clone, Debug)]
pub enum ElementKind {
    /// Invisible container.
    Group,
    /// Rectangle.
    Rect(RectShape),
    /// Circle.
    Circle(CircleShape),
    /// Text.
    Text(TextShape),
    /// Polyline.
    Line(LineShape),
}

impl From<RectShape> for ElementKind {
    fn from(value: RectShape) -> Self {
        Self::Rect(value)
    }
}

impl From<CircleShape> for ElementKind {
    fn from(value: CircleShape) -> Self {
        Self::Circle(value)
    }
}

impl From<TextShape> for ElementKind {
    fn from(value: TextShape) -> Self {
        Self::Text(value)
    }
}

impl From<LineShape> for ElementKind {
    fn from(value: LineShape) -> Self {
        Self::Line(value)
    }
}

/// Node in the scene tree.
#[derive(Clone, Debug)]
pub struct Element {
    /// Debug name, also emitted as the SVG `id`.
    pub name: Option<String>,
    /// Position relative to the parent.
    pub position: PositionSource,
    /// Opacity multiplier applied to the element and its children.
    pub opacity: NumberSource,
    /// Visual payload.
    pub kind: ElementKind,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl Element {
    /// Element at the parent origin.
    pub fn new(kind: impl Into<ElementKind>) -> Self {
        Self {
            name: None,
            position: PositionSource::default(),
            opacity: NumberSource::Const(1.0),
            kind: kind.into(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Invisible container.
    pub fn group() -> Self {
        Self::new(ElementKind::Group)
    }

    /// Set the debug name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the position binding.
    pub fn at(mut self, position: impl Into<PositionSource>) -> Self {
        self.position = position.into();
        self
    }

    /// Set the opacity binding.
    pub fn opacity(mut self, opacity: impl Into<NumberSource>) -> Self {
        self.opacity = opacity.into();
        self
    }

    /// Parent element; `None` only for the scene root.
    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    /// Children in paint order.
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    /// Fill color binding, if this kind has one.
    pub fn fill(&self) -> Option<&ColorSource> {
        match &self.kind {
            ElementKind::Rect(r) => r.fill.as_ref(),
            ElementKind::Circle(c) => c.fill.as_ref(),
            ElementKind::Text(t) => Some(&t.fill),
            ElementKind::Group | ElementKind::Line(_) => None,
        }
    }
}

/// Arena-backed scene tree plus its signal store.
///
/// The root is a canvas-sized rectangle centered on the origin; `+y` points down.
#[derive(Clone, Debug)]
pub struct Scene {
    canvas: Canvas,
    elements: Vec<Element>,
    /// Values animated by timeline tasks.
    pub signals: SignalStore,
}

impl Scene {
    /// Create a scene whose root view is filled with `background`.
    pub fn new(canvas: Canvas, background: Color) -> Self {
        let root = Element::new(RectShape::new(canvas.size()).fill(background)).named("view");
        Self {
            canvas,
            elements: vec![root],
            signals: SignalStore::default(),
        }
    }

    /// Output canvas.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Root view element.
    pub fn root(&self) -> ElementId {
        ElementId(0)
    }

    /// Number of elements, root included.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// `false` for every scene (the root always exists).
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Append `element` as the last child of `parent`.
    pub fn add(&mut self, parent: ElementId, mut element: Element) -> RecalcResult<ElementId> {
        let id = ElementId(self.elements.len());
        let parent_el = self.element_mut(parent)?;
        parent_el.children.push(id);
        element.parent = Some(parent);
        element.children.clear();
        self.elements.push(element);
        Ok(id)
    }

    /// Borrow an element.
    pub fn element(&self, id: ElementId) -> RecalcResult<&Element> {
        self.elements
            .get(id.0)
            .ok_or_else(|| RecalcError::evaluation(format!("unknown element {id:?}")))
    }

    /// Mutably borrow an element.
    pub fn element_mut(&mut self, id: ElementId) -> RecalcResult<&mut Element> {
        self.elements
            .get_mut(id.0)
            .ok_or_else(|| RecalcError::evaluation(format!("unknown element {id:?}")))
    }

    /// Borrow a circle element's shape.
    pub fn circle(&self, id: ElementId) -> RecalcResult<&CircleShape> {
        match &self.element(id)?.kind {
            ElementKind::Circle(c) => Ok(c),
            _ => Err(RecalcError::evaluation(format!("{id:?} is not a circle"))),
        }
    }

    /// Mutably borrow a circle element's shape.
    pub fn circle_mut(&mut self, id: ElementId) -> RecalcResult<&mut CircleShape> {
        match &mut self.element_mut(id)?.kind {
            ElementKind::Circle(c) => Ok(c),
            _ => Err(RecalcError::evaluation(format!("{id:?} is not a circle"))),
        }
    }

    /// Borrow a line element's shape.
    pub fn line(&self, id: ElementId) -> RecalcResult<&LineShape> {
        match &self.element(id)?.kind {
            ElementKind::Line(l) => Ok(l),
            _ => Err(RecalcError::evaluation(format!("{id:?} is not a line"))),
        }
    }

    /// Replace the fill of a rect, circle or text element.
    pub fn set_fill(&mut self, id: ElementId, fill: ColorSource) -> RecalcResult<()> {
        match &mut self.element_mut(id)?.kind {
            ElementKind::Rect(r) => r.fill = Some(fill),
            ElementKind::Circle(c) => c.fill = Some(fill),
            ElementKind::Text(t) => t.fill = fill,
            ElementKind::Group | ElementKind::Line(_) => {
                return Err(RecalcError::evaluation(format!("{id:?} has no fill")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
