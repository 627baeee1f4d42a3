//! Render configuration loaded from JSON.

use std::{fs::File, io::BufReader, path::Path, path::PathBuf};

use crate::{
    color::model::Color,
    foundation::{
        core::{Canvas, Fps},
        error::{RecalcError, RecalcResult},
    },
    graph::builder::DEFAULT_REFERENCE_HEIGHT,
};

/// Output and layout settings for a render.
///
/// Every field is optional in JSON; missing fields take the defaults (1920x1080 at 30 fps on
/// `#222222`).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Output size in pixels.
    pub canvas: Canvas,
    /// Output frame rate.
    pub fps: Fps,
    /// View background; also the fill the graph contrasts against.
    pub background: Color,
    /// Parent height the graph's base sizes are designed for.
    pub reference_height: f64,
    /// Extra directories scanned for `.ttf`/`.otf`/`.ttc` fonts.
    pub font_dirs: Vec<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            fps: Fps::default(),
            background: Color::from_rgb(34.0, 34.0, 34.0),
            reference_height: DEFAULT_REFERENCE_HEIGHT,
            font_dirs: Vec::new(),
        }
    }
}

impl RenderConfig {
    /// Parse from a JSON reader and validate.
    pub fn from_reader<R: std::io::Read>(r: R) -> RecalcResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| RecalcError::serde(format!("parse render config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse from a JSON file and validate.
    pub fn from_path(path: impl AsRef<Path>) -> RecalcResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            RecalcError::validation(format!("open render config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check value ranges.
    pub fn validate(&self) -> RecalcResult<()> {
        self.canvas.validate()?;
        Fps::new(self.fps.num, self.fps.den)?;
        if !self.reference_height.is_finite() || self.reference_height <= 0.0 {
            return Err(RecalcError::validation(
                "reference_height must be finite and > 0",
            ));
        }
        Ok(())
    }

    /// Opaque RGBA8 background, used to flatten frames for encoders.
    pub fn background_rgba8(&self) -> [u8; 4] {
        let [r, g, b, _] = self.background.to_rgba8();
        [r, g, b, 255]
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
