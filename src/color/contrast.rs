use crate::color::model::Color;

/// Luminance at or above which a reference counts as light.
pub const LIGHT_THRESHOLD: f64 = 0.5;

/// Fully desaturated black or white, whichever contrasts with `reference`.
///
/// White is chosen iff `reference.luminance() < 0.5`. Alpha is preserved.
pub fn opposite_extreme(reference: Color) -> Color {
    let target = if reference.luminance() < LIGHT_THRESHOLD {
        1.0
    } else {
        0.0
    };
    reference.desaturate(f64::from(u8::MAX)).with_luminance(target)
}

#[cfg(test)]
#[path = "../../tests/unit/color/contrast.rs"]
mod tests;
