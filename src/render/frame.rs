use crate::foundation::math::{flatten_premul_over_bg, mul_div255_u16};

/// A rendered frame as RGBA8 pixels.
///
/// Frames produced by the rasterizer are premultiplied; the flag makes that explicit at sink
/// boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// RGBA bytes of the pixel at `(x, y)`, if inside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Opaque straight RGBA8 copy of the frame, composited over `bg_rgba`.
    pub fn flattened(&self, bg_rgba: [u8; 4]) -> Vec<u8> {
        let mut out = vec![0u8; self.data.len()];
        if self.premultiplied {
            flatten_premul_over_bg(&mut out, &self.data, bg_rgba);
        } else {
            for (d, s) in out.chunks_exact_mut(4).zip(self.data.chunks_exact(4)) {
                let a = u16::from(s[3]);
                let inv = 255 - a;
                for ((dc, &sc), &bc) in d.iter_mut().zip(&s[..3]).zip(&bg_rgba[..3]) {
                    *dc = (mul_div255_u16(u16::from(sc), a) + mul_div255_u16(u16::from(bc), inv))
                        .min(255) as u8;
                }
                d[3] = 255;
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
