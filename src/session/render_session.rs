use crate::{
    config::RenderConfig,
    encode::sink::{FrameSink, SinkConfig},
    foundation::{
        core::FrameIndex,
        error::{RecalcError, RecalcResult},
    },
    render::{frame::FrameRGBA, raster::SvgRasterizer},
    story::Story,
    timeline::scheduler::Timeline,
};

/// Render statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RenderStats {
    /// Frames pushed to the sink.
    pub frames: u64,
    /// Scene time covered, in seconds.
    pub duration_secs: f64,
}

/// Renders the story frame by frame.
///
/// The font database is loaded once per session. Every render starts from a freshly built story,
/// so a session can render any number of times.
pub struct RenderSession {
    config: RenderConfig,
    rasterizer: SvgRasterizer,
}

impl RenderSession {
    /// Validate `config` and prepare the rasterizer.
    pub fn new(config: RenderConfig) -> RecalcResult<Self> {
        config.validate()?;
        let rasterizer = SvgRasterizer::new(config.font_dirs.as_slice());
        Ok(Self { config, rasterizer })
    }

    /// Active configuration.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Build the story at its initial state.
    pub fn story(&self) -> RecalcResult<Story> {
        Story::new(
            self.config.canvas,
            self.config.background,
            self.config.reference_height,
        )
    }

    fn start(&self) -> RecalcResult<(Story, Timeline)> {
        let story = self.story()?;
        let timeline = Timeline::new(story.script()?, self.config.fps);
        Ok((story, timeline))
    }

    /// Number of frames a full render produces, found by stepping the timeline without drawing.
    #[tracing::instrument(skip(self))]
    pub fn duration_frames(&self) -> RecalcResult<u64> {
        let (mut story, mut timeline) = self.start()?;
        timeline.run_to_end(&mut story.scene)
    }

    /// Render a single frame.
    #[tracing::instrument(skip(self))]
    pub fn render_frame(&self, frame: FrameIndex) -> RecalcResult<FrameRGBA> {
        let (mut story, mut timeline) = self.start()?;
        while timeline.frames() <= frame.0 {
            if timeline.is_finished() {
                return Err(RecalcError::validation(format!(
                    "frame {} is past the end of the story ({} frames)",
                    frame.0,
                    timeline.frames()
                )));
            }
            timeline.step(&mut story.scene)?;
        }
        self.rasterizer.render_scene(&story.scene)
    }

    /// Render every frame of the story into `sink`.
    #[tracing::instrument(skip(self, sink), fields(width = self.config.canvas.width, height = self.config.canvas.height))]
    pub fn render_all(&self, sink: &mut dyn FrameSink) -> RecalcResult<RenderStats> {
        let (mut story, mut timeline) = self.start()?;
        sink.begin(SinkConfig {
            width: self.config.canvas.width,
            height: self.config.canvas.height,
            fps: self.config.fps,
        })?;

        while !timeline.is_finished() {
            let idx = timeline.next_frame();
            timeline.step(&mut story.scene)?;
            let frame = self.rasterizer.render_scene(&story.scene)?;
            sink.push_frame(idx, &frame)?;
            tracing::debug!(frame = idx.0, "frame rendered");
        }
        sink.end()?;

        let stats = RenderStats {
            frames: timeline.frames(),
            duration_secs: timeline.elapsed_secs(),
        };
        tracing::info!(frames = stats.frames, secs = stats.duration_secs, "render finished");
        Ok(stats)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/render_session.rs"]
mod tests;
