use std::fmt;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{RecalcError, RecalcResult};

/// Raw RGB triple with channels in `0..=255` (not necessarily integral).
pub type Rgb = [f64; 3];

// D65 reference white and the Lab companding constants.
const XN: f64 = 0.950_470;
const YN: f64 = 1.0;
const ZN: f64 = 1.088_830;
const T0: f64 = 0.137_931_034;
const T1: f64 = 0.206_896_552;
const T2: f64 = 0.128_418_55;
const T3: f64 = 0.008_856_452;

/// Chroma units removed per unit of [`Color::desaturate`].
const SATURATION_STEP: f64 = 18.0;

/// Straight-alpha color with RGB channels in `0..=255` and alpha in `0..=1`.
///
/// Channels are kept unrounded; [`Color::rgb`] and [`Color::hex`] round on the way out, so a
/// color that passes through a combinator and back compares equal by hex.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    r: f64,
    g: f64,
    b: f64,
    a: f64,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    /// Opaque white.
    pub const WHITE: Self = Self {
        r: 255.0,
        g: 255.0,
        b: 255.0,
        a: 1.0,
    };

    /// Create an opaque color from RGB channels, clamped to `0..=255`.
    pub fn from_rgb(r: f64, g: f64, b: f64) -> Self {
        Self::from_rgba(r, g, b, 1.0)
    }

    /// Create a color from RGB channels (`0..=255`) and alpha (`0..=1`).
    pub fn from_rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        fn channel(v: f64) -> f64 {
            if v.is_finite() { v.clamp(0.0, 255.0) } else { 0.0 }
        }

        Self {
            r: channel(r),
            g: channel(g),
            b: channel(b),
            a: if a.is_finite() { a.clamp(0.0, 1.0) } else { 1.0 },
        }
    }

    /// Parse `#rrggbb`, `#rrggbbaa`, `#rgb` (leading `#` optional, case-insensitive).
    pub fn from_hex(s: &str) -> RecalcResult<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);

        fn hex_byte(pair: &str) -> RecalcResult<f64> {
            u8::from_str_radix(pair, 16)
                .map(f64::from)
                .map_err(|_| RecalcError::validation(format!("invalid hex byte \"{pair}\"")))
        }

        if !s.is_ascii() {
            return Err(RecalcError::validation(format!("invalid hex color \"{s}\"")));
        }

        match s.len() {
            3 => {
                let mut rgb = [0.0; 3];
                for (slot, ch) in rgb.iter_mut().zip(s.chars()) {
                    *slot = hex_byte(&format!("{ch}{ch}"))?;
                }
                Ok(Self::from_rgb(rgb[0], rgb[1], rgb[2]))
            }
            6 => Ok(Self::from_rgb(
                hex_byte(&s[0..2])?,
                hex_byte(&s[2..4])?,
                hex_byte(&s[4..6])?,
            )),
            8 => Ok(Self::from_rgba(
                hex_byte(&s[0..2])?,
                hex_byte(&s[2..4])?,
                hex_byte(&s[4..6])?,
                hex_byte(&s[6..8])? / 255.0,
            )),
            _ => Err(RecalcError::validation(
                "hex color must be #RGB, #RRGGBB or #RRGGBBAA (case-insensitive)",
            )),
        }
    }

    /// Rounded RGB channels, as consumed by combinators.
    pub fn rgb(self) -> Rgb {
        [self.r.round(), self.g.round(), self.b.round()]
    }

    /// Alpha in `0..=1`.
    pub fn alpha(self) -> f64 {
        self.a
    }

    /// Return a copy with alpha replaced.
    pub fn with_alpha(self, a: f64) -> Self {
        Self::from_rgba(self.r, self.g, self.b, a)
    }

    /// Lowercase `#rrggbb`, or `#rrggbbaa` when the color is translucent.
    pub fn hex(self) -> String {
        let [r, g, b] = self.rgb().map(|c| c as u8);
        if self.a < 1.0 {
            let a = (self.a * 255.0).round() as u8;
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}")
        }
    }

    /// Straight-alpha RGBA8.
    pub fn to_rgba8(self) -> [u8; 4] {
        let [r, g, b] = self.rgb().map(|c| c as u8);
        [r, g, b, (self.a * 255.0).round() as u8]
    }

    /// WCAG relative luminance in `0..=1`.
    pub fn luminance(self) -> f64 {
        fn linear(c: f64) -> f64 {
            let c = c / 255.0;
            if c <= 0.039_28 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }

        0.2126 * linear(self.r) + 0.7152 * linear(self.g) + 0.0722 * linear(self.b)
    }

    /// Return a color with the requested relative luminance.
    ///
    /// `0` and `1` map exactly to black and white (alpha kept); other targets are reached by
    /// bisecting toward black or white in RGB.
    pub fn with_luminance(self, lum: f64) -> Self {
        const EPS: f64 = 1e-7;
        const MAX_ITER: usize = 20;

        if lum <= 0.0 {
            return Self::BLACK.with_alpha(self.a);
        }
        if lum >= 1.0 {
            return Self::WHITE.with_alpha(self.a);
        }

        let current = self.luminance();
        let (mut low, mut high) = if current > lum {
            (Self::BLACK, self)
        } else {
            (self, Self::WHITE)
        };

        let mut mid = self;
        for _ in 0..MAX_ITER {
            mid = Self::mix_rgb(low, high, 0.5);
            let l = mid.luminance();
            if (lum - l).abs() < EPS {
                break;
            }
            if l > lum {
                high = mid;
            } else {
                low = mid;
            }
        }
        mid.with_alpha(self.a)
    }

    /// Reduce LCH chroma by `18 * amount`, clamped at zero.
    pub fn desaturate(self, amount: f64) -> Self {
        self.saturate(-amount)
    }

    /// Increase LCH chroma by `18 * amount` (negative amounts desaturate).
    pub fn saturate(self, amount: f64) -> Self {
        let [l, c, h] = self.to_lch();
        let c = (c + SATURATION_STEP * amount).max(0.0);
        Self::from_lch(l, c, h, self.a)
    }

    /// Interpolate in LCH space along the shorter hue arc.
    pub fn lerp_lch(a: Self, b: Self, t: f64) -> Self {
        if t <= 0.0 {
            return a;
        }
        if t >= 1.0 {
            return b;
        }

        let [l0, c0, h0] = a.to_lch();
        let [l1, c1, h1] = b.to_lch();

        let (hue, c0, c1) = match (h0.is_nan(), h1.is_nan()) {
            (false, false) => {
                let dh = if h1 > h0 && h1 - h0 > 180.0 {
                    h1 - (h0 + 360.0)
                } else if h1 < h0 && h0 - h1 > 180.0 {
                    h1 + 360.0 - h0
                } else {
                    h1 - h0
                };
                (h0 + t * dh, c0, c1)
            }
            // Achromatic endpoints carry no hue; borrow the other one.
            (false, true) => (h0, c0, c1),
            (true, false) => (h1, c0, c1),
            (true, true) => (f64::NAN, c0, c1),
        };

        Self::from_lch(
            l0 + t * (l1 - l0),
            c0 + t * (c1 - c0),
            hue,
            a.a + t * (b.a - a.a),
        )
    }

    fn mix_rgb(a: Self, b: Self, t: f64) -> Self {
        Self::from_rgba(
            a.r + (b.r - a.r) * t,
            a.g + (b.g - a.g) * t,
            a.b + (b.b - a.b) * t,
            a.a + (b.a - a.a) * t,
        )
    }

    /// `[L, a, b]` under D65.
    pub fn to_lab(self) -> [f64; 3] {
        fn rgb_xyz(c: f64) -> f64 {
            let c = c / 255.0;
            if c <= 0.040_45 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }

        fn xyz_lab(t: f64) -> f64 {
            if t > T3 { t.cbrt() } else { t / T2 + T0 }
        }

        let r = rgb_xyz(self.r);
        let g = rgb_xyz(self.g);
        let b = rgb_xyz(self.b);

        let x = xyz_lab((0.412_456_4 * r + 0.357_576_1 * g + 0.180_437_5 * b) / XN);
        let y = xyz_lab((0.212_672_9 * r + 0.715_152_2 * g + 0.072_175_0 * b) / YN);
        let z = xyz_lab((0.019_333_9 * r + 0.119_192_0 * g + 0.950_304_1 * b) / ZN);

        let l = 116.0 * y - 16.0;
        [l.max(0.0), 500.0 * (x - y), 200.0 * (y - z)]
    }

    /// Build a color from `[L, a, b]` under D65.
    pub fn from_lab(l: f64, a: f64, b: f64, alpha: f64) -> Self {
        fn lab_xyz(t: f64) -> f64 {
            if t > T1 { t * t * t } else { T2 * (t - T0) }
        }

        fn xyz_rgb(c: f64) -> f64 {
            255.0
                * if c <= 0.003_04 {
                    12.92 * c
                } else {
                    1.055 * c.powf(1.0 / 2.4) - 0.055
                }
        }

        let y = (l + 16.0) / 116.0;
        let x = if a.is_nan() { y } else { y + a / 500.0 };
        let z = if b.is_nan() { y } else { y - b / 200.0 };

        let y = YN * lab_xyz(y);
        let x = XN * lab_xyz(x);
        let z = ZN * lab_xyz(z);

        Self::from_rgba(
            xyz_rgb(3.240_454_2 * x - 1.537_138_5 * y - 0.498_531_4 * z),
            xyz_rgb(-0.969_266_0 * x + 1.876_010_8 * y + 0.041_556_0 * z),
            xyz_rgb(0.055_643_4 * x - 0.204_025_9 * y + 1.057_225_2 * z),
            alpha,
        )
    }

    /// `[L, C, H]`; hue is `NaN` for achromatic colors.
    pub fn to_lch(self) -> [f64; 3] {
        let [l, a, b] = self.to_lab();
        let c = (a * a + b * b).sqrt();
        let h = if (c * 10_000.0).round() == 0.0 {
            f64::NAN
        } else {
            (b.atan2(a).to_degrees() + 360.0) % 360.0
        };
        [l, c, h]
    }

    /// Build a color from `[L, C, H]`; a `NaN` hue is treated as achromatic.
    pub fn from_lch(l: f64, c: f64, h: f64, alpha: f64) -> Self {
        let h = if h.is_nan() { 0.0 } else { h.to_radians() };
        Self::from_lab(l, h.cos() * c, h.sin() * c, alpha)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl From<Rgb> for Color {
    fn from([r, g, b]: Rgb) -> Self {
        Self::from_rgb(r, g, b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

impl std::str::FromStr for Color {
    type Err = RecalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            Arr(Vec<f64>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => Self::from_hex(&s).map_err(serde::de::Error::custom),
            Repr::Arr(v) => match v.as_slice() {
                [r, g, b] => Ok(Self::from_rgb(*r, *g, *b)),
                [r, g, b, a] => Ok(Self::from_rgba(*r, *g, *b, *a)),
                _ => Err(serde::de::Error::custom(
                    "color array must have len 3 ([r,g,b]) or 4 ([r,g,b,a])",
                )),
            },
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/color/model.rs"]
mod tests;
