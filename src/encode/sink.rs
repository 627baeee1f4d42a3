use crate::{
    foundation::{
        core::{Fps, FrameIndex},
        error::{RecalcError, RecalcResult},
    },
    render::frame::FrameRGBA,
};

/// Stream parameters handed to a [`FrameSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Playback rate.
    pub fps: Fps,
}

/// Consumer of rendered frames.
///
/// `push_frame` is called with strictly increasing indices between `begin` and `end`.
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> RecalcResult<()>;
    /// Push the next frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> RecalcResult<()>;
    /// Called once after the last frame.
    fn end(&mut self) -> RecalcResult<()>;
}

/// Sink that keeps every frame in memory.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    ended: bool,
}

impl InMemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured by `begin`.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Captured frames in push order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// `true` once `end` was called.
    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> RecalcResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> RecalcResult<()> {
        check_order(self.frames.last().map(|(i, _)| *i), idx)?;
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> RecalcResult<()> {
        self.ended = true;
        Ok(())
    }
}

pub(crate) fn check_order(last: Option<FrameIndex>, idx: FrameIndex) -> RecalcResult<()> {
    match last {
        Some(last) if idx.0 <= last.0 => Err(RecalcError::evaluation(format!(
            "out-of-order frame index {} after {}",
            idx.0, last.0
        ))),
        _ => Ok(()),
    }
}

pub(crate) fn check_frame(cfg: &SinkConfig, frame: &FrameRGBA) -> RecalcResult<()> {
    if frame.width != cfg.width || frame.height != cfg.height {
        return Err(RecalcError::validation(format!(
            "frame size mismatch: got {}x{}, expected {}x{}",
            frame.width, frame.height, cfg.width, cfg.height
        )));
    }
    if frame.data.len() != (cfg.width as usize) * (cfg.height as usize) * 4 {
        return Err(RecalcError::validation(
            "frame.data size mismatch with width*height*4",
        ));
    }
    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &std::path::Path) -> RecalcResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
