//! Markers traveling along connection lines.

use crate::{
    animation::ease::Ease,
    foundation::error::RecalcResult,
    scene::{
        model::{CircleShape, ColorSource, Element, ElementId, PositionSource, Scene},
        signal::Signal,
    },
    timeline::{
        flow::{chain, defer, set},
        task::BoxTask,
        tween::tween,
    },
};

/// Marker diameter used by the story.
pub const DEFAULT_MARKER_SIZE: f64 = 20.0;

/// Path fraction that keeps a marker of `radius` inside a path of `length`.
pub fn end_inset(radius: f64, length: f64) -> f64 {
    if length <= 0.0 {
        return 0.5;
    }
    (radius / length).min(0.5)
}

/// Move a dot along `line`, from just past its start to just before its end.
///
/// The marker is added to `parent` when the task starts, filled with the contrast color of the
/// parent fill. It fades in over an eighth of `duration`, travels for the remaining seven
/// eighths, then disappears instantly.
pub fn travel_along(parent: ElementId, line: ElementId, duration: f64, marker_size: f64) -> BoxTask {
    defer(move |scene| {
        let (marker, opacity, progress) = spawn_marker(scene, parent, line, marker_size)?;
        tracing::debug!(?line, ?marker, duration, "travel along line");
        Ok(chain([
            tween(opacity, 1.0, duration / 8.0, Ease::default()),
            tween(progress, 1.0, duration / 8.0 * 7.0, Ease::default()),
            set(opacity, 0.0),
        ]))
    })
}

fn spawn_marker(
    scene: &mut Scene,
    parent: ElementId,
    line: ElementId,
    marker_size: f64,
) -> RecalcResult<(ElementId, Signal<f64>, Signal<f64>)> {
    let length = scene.path_length(line)?;
    let inset = end_inset(marker_size / 2.0, length);

    let opacity = scene.signals.create(0.0_f64);
    let progress = scene.signals.create(0.0_f64);
    let marker = scene.add(
        parent,
        Element::new(CircleShape::new(marker_size).fill(ColorSource::opposite_of_fill(parent)))
            .named("marker")
            .opacity(opacity)
            .at(PositionSource::OnPath {
                line,
                progress,
                start: inset,
                end: 1.0 - inset,
            }),
    )?;
    Ok((marker, opacity, progress))
}

#[cfg(test)]
#[path = "../tests/unit/travel.rs"]
mod tests;
