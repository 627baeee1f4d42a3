use crate::{
    foundation::{
        core::{FrameIndex, Fps},
        error::{RecalcError, RecalcResult},
    },
    scene::model::Scene,
    timeline::task::{BoxTask, Progress, TaskCtx},
};

/// Drives a root script plus everything it spawns, one frame at a time.
///
/// Frame 0 advances with a zero slice so that instant setup steps land in the first frame; every
/// later frame advances by exactly one frame duration. Background tasks run before the script on
/// each frame, and tasks spawned during a frame start within that same frame.
pub struct Timeline {
    script: Option<BoxTask>,
    background: Vec<BoxTask>,
    fps: Fps,
    frames: u64,
}

impl Timeline {
    /// Schedule `script` at `fps`.
    pub fn new(script: BoxTask, fps: Fps) -> Self {
        Self {
            script: Some(script),
            background: Vec::new(),
            fps,
            frames: 0,
        }
    }

    /// `true` once the root script has completed.
    pub fn is_finished(&self) -> bool {
        self.script.is_none()
    }

    /// Number of frames stepped so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Index of the frame the next [`Timeline::step`] produces.
    pub fn next_frame(&self) -> FrameIndex {
        FrameIndex(self.frames)
    }

    /// Scene time reached after the frames stepped so far.
    pub fn elapsed_secs(&self) -> f64 {
        self.frames.saturating_sub(1) as f64 * self.fps.frame_duration_secs()
    }

    /// Number of background tasks still running.
    pub fn background_len(&self) -> usize {
        self.background.len()
    }

    /// Advance the scene to the next frame.
    pub fn step(&mut self, scene: &mut Scene) -> RecalcResult<()> {
        if self.script.is_none() {
            return Err(RecalcError::animation("timeline already finished"));
        }
        let dt = if self.frames == 0 {
            0.0
        } else {
            self.fps.frame_duration_secs()
        };

        let mut spawned: Vec<(BoxTask, f64)> = Vec::new();
        let mut running = Vec::with_capacity(self.background.len());

        for mut task in self.background.drain(..) {
            let mut ctx = TaskCtx::new(scene, &mut spawned);
            if let Progress::Pending = task.advance(&mut ctx, dt)? {
                running.push(task);
            }
        }

        if let Some(script) = self.script.as_mut() {
            let mut ctx = TaskCtx::new(scene, &mut spawned);
            if let Progress::Done { .. } = script.advance(&mut ctx, dt)? {
                self.script = None;
                tracing::debug!(frame = self.frames, "script finished");
            }
        }

        while !spawned.is_empty() {
            for (mut task, slice) in std::mem::take(&mut spawned) {
                let mut ctx = TaskCtx::new(scene, &mut spawned);
                if let Progress::Pending = task.advance(&mut ctx, slice)? {
                    running.push(task);
                }
            }
        }

        if self.script.is_some() {
            self.background = running;
        } else if !running.is_empty() {
            tracing::debug!(dropped = running.len(), "dropping background tasks at script end");
        }
        self.frames += 1;
        Ok(())
    }

    /// Step until the script finishes; returns the number of frames produced.
    pub fn run_to_end(&mut self, scene: &mut Scene) -> RecalcResult<u64> {
        while !self.is_finished() {
            self.step(scene)?;
        }
        Ok(self.frames)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/scheduler.rs"]
mod tests;
