use crate::{color::model::Color, foundation::core::Vec2};

/// Values that a tween can interpolate.
pub trait Lerp: Sized {
    /// Interpolate from `a` to `b` at eased progress `t`.
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Vec2 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Vec2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }
}

impl Lerp for Color {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Color::lerp_lch(*a, *b, t)
    }
}

/// Caption transition: erase back to the shared prefix, then type the new suffix.
impl Lerp for String {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        if t <= 0.0 {
            return a.clone();
        }
        if t >= 1.0 {
            return b.clone();
        }

        let prefix = a
            .chars()
            .zip(b.chars())
            .take_while(|(x, y)| x == y)
            .count();

        let (source, visible) = if t < 0.5 {
            let tail = a.chars().count() - prefix;
            (a, prefix + ((tail as f64) * (1.0 - 2.0 * t)).round() as usize)
        } else {
            let tail = b.chars().count() - prefix;
            (b, prefix + ((tail as f64) * (2.0 * t - 1.0)).round() as usize)
        };
        source.chars().take(visible).collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/lerp.rs"]
mod tests;
