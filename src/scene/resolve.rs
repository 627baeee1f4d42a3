//! Frame-time evaluation of scene bindings.
//!
//! Every binding is pulled on demand: positions compose through the parent chain, line vertices
//! follow the circles they connect, and derived colors read the signal store as it is right now.

use kurbo::{Line, ParamCurve, ParamCurveArclen};

use crate::{
    color::{contrast::opposite_extreme, model::Color},
    foundation::{
        core::{Point, Vec2},
        error::{RecalcError, RecalcResult},
        math::map,
    },
    scene::{
        model::{
            ColorSource, ElementId, ElementKind, NumberSource, PointSource, PositionSource, Scene,
            TextSource,
        },
        signal::Signal,
    },
};

/// Bindings nested deeper than this are treated as cycles.
const MAX_DEPTH: usize = 64;

const ARCLEN_ACCURACY: f64 = 1e-6;

fn guard(depth: usize) -> RecalcResult<usize> {
    if depth >= MAX_DEPTH {
        return Err(RecalcError::evaluation(
            "binding nesting too deep (cyclic position or fill reference?)",
        ));
    }
    Ok(depth + 1)
}

impl Scene {
    /// Absolute position of an element (root space, origin at the canvas center).
    pub fn world_position(&self, id: ElementId) -> RecalcResult<Vec2> {
        self.world_position_at(id, 0)
    }

    /// Position of `id` expressed in the local space of `space`.
    pub fn position_in(&self, id: ElementId, space: ElementId) -> RecalcResult<Vec2> {
        Ok(self.world_position(id)? - self.world_position(space)?)
    }

    /// Position of an element relative to its parent.
    pub fn local_position(&self, id: ElementId) -> RecalcResult<Vec2> {
        self.local_position_at(id, 0)
    }

    fn world_position_at(&self, id: ElementId, depth: usize) -> RecalcResult<Vec2> {
        let depth = guard(depth)?;
        let el = self.element(id)?;
        let local = self.local_position_at(id, depth)?;
        match el.parent() {
            Some(parent) => Ok(self.world_position_at(parent, depth)? + local),
            None => Ok(local),
        }
    }

    fn parent_world_at(&self, id: ElementId, depth: usize) -> RecalcResult<Vec2> {
        match self.element(id)?.parent() {
            Some(parent) => self.world_position_at(parent, depth),
            None => Ok(Vec2::ZERO),
        }
    }

    fn local_position_at(&self, id: ElementId, depth: usize) -> RecalcResult<Vec2> {
        let depth = guard(depth)?;
        match self.element(id)?.position {
            PositionSource::Const(v) => Ok(v),
            PositionSource::Signal(s) => Ok(*self.signals.get(s)?),
            PositionSource::Follow { target, offset } => {
                let target_world = self.world_position_at(target, depth)?;
                Ok(target_world - self.parent_world_at(id, depth)? + offset)
            }
            PositionSource::OnPath {
                line,
                progress,
                start,
                end,
            } => {
                let t = map(start, end, *self.signals.get(progress)?);
                let on_line = self.point_at_percentage_at(line, t, depth)?.to_vec2();
                let line_origin = self.parent_world_at(line, depth)?;
                Ok(line_origin + on_line - self.parent_world_at(id, depth)?)
            }
        }
    }

    /// Evaluate a color binding.
    pub fn color(&self, source: &ColorSource) -> RecalcResult<Color> {
        self.color_at(source, 0)
    }

    fn color_at(&self, source: &ColorSource, depth: usize) -> RecalcResult<Color> {
        let depth = guard(depth)?;
        match source {
            ColorSource::Const(c) => Ok(*c),
            ColorSource::Signal(s) => Ok(*self.signals.get(*s)?),
            ColorSource::OppositeExtreme(inner) => {
                Ok(opposite_extreme(self.color_at(inner, depth)?))
            }
            ColorSource::FillOf(id) => match self.element(*id)?.fill() {
                Some(fill) => self.color_at(fill, depth),
                None => Ok(Color::BLACK),
            },
        }
    }

    /// Evaluate the fill of an element, if it has one.
    pub fn fill_color(&self, id: ElementId) -> RecalcResult<Option<Color>> {
        self.element(id)?
            .fill()
            .map(|fill| self.color(fill))
            .transpose()
    }

    /// Evaluate a scalar binding.
    pub fn number(&self, source: NumberSource) -> RecalcResult<f64> {
        match source {
            NumberSource::Const(v) => Ok(v),
            NumberSource::Signal(s) => Ok(*self.signals.get(s)?),
        }
    }

    /// Evaluate a text binding.
    pub fn text(&self, source: &TextSource) -> RecalcResult<String> {
        match source {
            TextSource::Const(s) => Ok(s.clone()),
            TextSource::Signal(s) => Ok(self.signals.get(*s)?.clone()),
            TextSource::HexOf(c) => Ok(self.signals.get(*c)?.hex()),
        }
    }

    /// Read a color signal.
    pub fn signal_color(&self, signal: Signal<Color>) -> RecalcResult<Color> {
        Ok(*self.signals.get(signal)?)
    }

    /// Outer radius of a circle: half its diameter plus half its stroke.
    pub fn circle_outer_radius(&self, id: ElementId) -> RecalcResult<f64> {
        let circle = self.circle(id)?;
        let size = self.number(circle.size)?;
        let stroke = if circle.stroke.is_some() {
            circle.line_width
        } else {
            0.0
        };
        Ok(size / 2.0 + stroke / 2.0)
    }

    /// Vertices of a line in its parent space.
    pub fn line_points(&self, id: ElementId) -> RecalcResult<Vec<Point>> {
        self.line_points_at(id, 0)
    }

    fn line_points_at(&self, id: ElementId, depth: usize) -> RecalcResult<Vec<Point>> {
        let depth = guard(depth)?;
        let line = self.line(id)?;
        let origin = self.parent_world_at(id, depth)?;

        line.points
            .iter()
            .map(|p| match *p {
                PointSource::Const(p) => Ok(p),
                PointSource::Rim {
                    of,
                    toward,
                    padding,
                } => {
                    let center = self.world_position_at(of, depth)? - origin;
                    let other = self.world_position_at(toward, depth)? - origin;
                    let delta = other - center;
                    let dir = if delta.hypot() > f64::EPSILON {
                        delta.normalize()
                    } else {
                        Vec2::new(1.0, 0.0)
                    };
                    let reach = padding + self.circle_outer_radius(of)?;
                    Ok((center + dir * reach).to_point())
                }
            })
            .collect()
    }

    /// Total length of a line's path.
    pub fn path_length(&self, id: ElementId) -> RecalcResult<f64> {
        Ok(polyline_length(&self.line_points(id)?))
    }

    /// Point at fraction `t` of a line's arc length, in the line's parent space.
    pub fn point_at_percentage(&self, id: ElementId, t: f64) -> RecalcResult<Point> {
        self.point_at_percentage_at(id, t, 0)
    }

    fn point_at_percentage_at(&self, id: ElementId, t: f64, depth: usize) -> RecalcResult<Point> {
        let points = self.line_points_at(id, depth)?;
        point_along_polyline(&points, t)
            .ok_or_else(|| RecalcError::evaluation(format!("line {id:?} has no points")))
    }

    /// Check that every element's bindings resolve.
    pub fn validate(&self) -> RecalcResult<()> {
        for index in 0..self.len() {
            let id = ElementId(index);
            self.world_position(id)?;
            let el = self.element(id)?;
            if let Some(fill) = el.fill() {
                self.color(fill)?;
            }
            if let ElementKind::Line(_) = el.kind {
                self.line_points(id)?;
            }
        }
        Ok(())
    }
}

/// Sum of consecutive segment lengths.
pub fn polyline_length(points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|w| Line::new(w[0], w[1]).arclen(ARCLEN_ACCURACY))
        .sum()
}

/// Point at fraction `t` (clamped to `0..=1`) of the polyline's arc length.
pub fn point_along_polyline(points: &[Point], t: f64) -> Option<Point> {
    let first = *points.first()?;
    let total = polyline_length(points);
    if total <= 0.0 {
        return Some(first);
    }

    let mut remaining = t.clamp(0.0, 1.0) * total;
    for w in points.windows(2) {
        let seg = Line::new(w[0], w[1]);
        let len = seg.arclen(ARCLEN_ACCURACY);
        if remaining <= len {
            let local = if len > 0.0 { remaining / len } else { 0.0 };
            return Some(seg.eval(local));
        }
        remaining -= len;
    }
    points.last().copied()
}

#[cfg(test)]
#[path = "../../tests/unit/scene/resolve.rs"]
mod tests;
