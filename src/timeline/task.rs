use crate::{foundation::error::RecalcResult, scene::model::Scene};

/// Boxed cooperative task.
pub type BoxTask = Box<dyn Task>;

/// Outcome of advancing a task by a time slice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Progress {
    /// The task consumed the whole slice and wants more time.
    Pending,
    /// The task completed; `leftover` seconds of the slice were not used.
    Done {
        /// Unused part of the slice, handed to whatever runs next.
        leftover: f64,
    },
}

impl Progress {
    /// `true` for [`Progress::Done`].
    pub fn is_done(self) -> bool {
        matches!(self, Self::Done { .. })
    }
}

/// Mutable state a task may touch while advancing.
pub struct TaskCtx<'a> {
    /// The scene being animated.
    pub scene: &'a mut Scene,
    spawned: &'a mut Vec<(BoxTask, f64)>,
}

impl<'a> TaskCtx<'a> {
    pub(crate) fn new(scene: &'a mut Scene, spawned: &'a mut Vec<(BoxTask, f64)>) -> Self {
        Self { scene, spawned }
    }

    /// Start `task` alongside the caller; it first runs with `slice` seconds this frame.
    pub fn spawn(&mut self, task: BoxTask, slice: f64) {
        self.spawned.push((task, slice));
    }
}

/// A cooperative animation step function.
///
/// `advance` is called once per frame with the frame's time slice (zero on the first frame).
/// Instant tasks return `Done` with the whole slice as leftover, so a sequence of instant steps
/// all happen within one frame.
pub trait Task {
    /// Advance by `dt` seconds.
    fn advance(&mut self, ctx: &mut TaskCtx<'_>, dt: f64) -> RecalcResult<Progress>;
}

