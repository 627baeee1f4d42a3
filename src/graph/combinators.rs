//! Color combinators: pure functions from upstream colors to a node color.
//!
//! Inputs are rounded `0..=255` RGB triples in connection order. A node without resolved
//! connections receives a single black input.

use crate::color::model::{Color, Rgb};

fn first(inputs: &[Rgb]) -> Rgb {
    inputs.first().copied().unwrap_or([0.0; 3])
}

/// Ignore the inputs and return `rgb`.
pub fn constant(rgb: Rgb) -> impl Fn(&[Rgb]) -> Rgb + Send + Sync + 'static {
    move |_| rgb
}

/// Pass the first input through.
pub fn identity(inputs: &[Rgb]) -> Rgb {
    first(inputs)
}

/// `255 - c` per channel of the first input.
pub fn invert(inputs: &[Rgb]) -> Rgb {
    first(inputs).map(|c| 255.0 - c)
}

/// Keep only the red channel of the first input.
pub fn pick_red(inputs: &[Rgb]) -> Rgb {
    let [r, _, _] = first(inputs);
    [r, 0.0, 0.0]
}

/// Desaturate the first input by `amount` chroma steps.
pub fn desaturate(amount: f64) -> impl Fn(&[Rgb]) -> Rgb + Send + Sync + 'static {
    move |inputs| Color::from(first(inputs)).desaturate(amount).rgb()
}

/// Channel-wise mean of all inputs.
pub fn average(inputs: &[Rgb]) -> Rgb {
    if inputs.is_empty() {
        return [0.0; 3];
    }
    let n = inputs.len() as f64;
    let mut sum = [0.0; 3];
    for rgb in inputs {
        for (acc, c) in sum.iter_mut().zip(rgb) {
            *acc += c;
        }
    }
    sum.map(|c| c / n)
}

#[cfg(test)]
#[path = "../../tests/unit/graph/combinators.rs"]
mod tests;
