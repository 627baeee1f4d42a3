use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    encode::sink::{FrameSink, SinkConfig, check_frame, check_order},
    foundation::{
        core::FrameIndex,
        error::{RecalcError, RecalcResult},
        math::flatten_premul_over_bg,
    },
    render::frame::FrameRGBA,
};

/// Writes every frame as `frame_000000.png`, `frame_000001.png`, ... into a directory.
pub struct PngSequenceSink {
    dir: PathBuf,
    bg_rgba: [u8; 4],
    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    written: u64,
}

impl PngSequenceSink {
    /// Sink writing into `dir`, flattening translucent pixels over `bg_rgba`.
    pub fn new(dir: impl Into<PathBuf>, bg_rgba: [u8; 4]) -> Self {
        Self {
            dir: dir.into(),
            bg_rgba,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
            written: 0,
        }
    }

    /// Path a frame index is written to.
    pub fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        frame_path(&self.dir, idx)
    }

    /// Frames written since `begin`.
    pub fn written(&self) -> u64 {
        self.written
    }
}

fn frame_path(dir: &Path, idx: FrameIndex) -> PathBuf {
    dir.join(format!("frame_{:06}.png", idx.0))
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> RecalcResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(RecalcError::validation(
                "png sink width/height must be non-zero",
            ));
        }
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create frames directory '{}'", self.dir.display()))?;
        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> RecalcResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| RecalcError::evaluation("png sink not started"))?;
        check_order(self.last_idx, idx)?;
        check_frame(&cfg, frame)?;
        self.last_idx = Some(idx);

        let pixels: &[u8] = if frame.premultiplied {
            flatten_premul_over_bg(&mut self.scratch, &frame.data, self.bg_rgba);
            &self.scratch
        } else {
            &frame.data
        };
        let path = frame_path(&self.dir, idx);
        image::save_buffer_with_format(
            &path,
            pixels,
            cfg.width,
            cfg.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> RecalcResult<()> {
        if self.cfg.take().is_none() {
            return Err(RecalcError::evaluation("png sink not started"));
        }
        tracing::debug!(dir = %self.dir.display(), frames = self.written, "png sequence written");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
