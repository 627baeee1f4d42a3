use std::collections::VecDeque;

use crate::{
    foundation::error::{RecalcError, RecalcResult},
    scene::{
        model::Scene,
        signal::{Signal, SignalValue},
    },
    timeline::task::{BoxTask, Progress, Task, TaskCtx},
};

/// Completion slack for accumulated frame slices.
pub(crate) const TIME_EPSILON: f64 = 1e-9;

/// Idle for `secs` seconds.
pub fn wait(secs: f64) -> BoxTask {
    Box::new(Wait {
        duration: secs.max(0.0),
        elapsed: 0.0,
    })
}

struct Wait {
    duration: f64,
    elapsed: f64,
}

impl Task for Wait {
    fn advance(&mut self, _ctx: &mut TaskCtx<'_>, dt: f64) -> RecalcResult<Progress> {
        self.elapsed += dt;
        if self.elapsed + TIME_EPSILON >= self.duration {
            return Ok(Progress::Done {
                leftover: (self.elapsed - self.duration).max(0.0),
            });
        }
        Ok(Progress::Pending)
    }
}

/// Run tasks one after another; each starts with the time its predecessor left over.
pub fn chain(tasks: impl IntoIterator<Item = BoxTask>) -> BoxTask {
    Box::new(Chain {
        queue: tasks.into_iter().collect(),
    })
}

struct Chain {
    queue: VecDeque<BoxTask>,
}

impl Task for Chain {
    fn advance(&mut self, ctx: &mut TaskCtx<'_>, dt: f64) -> RecalcResult<Progress> {
        let mut slice = dt;
        while let Some(current) = self.queue.front_mut() {
            match current.advance(ctx, slice)? {
                Progress::Pending => return Ok(Progress::Pending),
                Progress::Done { leftover } => {
                    self.queue.pop_front();
                    slice = leftover;
                }
            }
        }
        Ok(Progress::Done { leftover: slice })
    }
}

/// Run tasks side by side and finish when the last one does.
pub fn all(tasks: impl IntoIterator<Item = BoxTask>) -> BoxTask {
    Box::new(All {
        running: tasks.into_iter().map(Some).collect(),
        leftover: None,
    })
}

struct All {
    running: Vec<Option<BoxTask>>,
    leftover: Option<f64>,
}

impl Task for All {
    fn advance(&mut self, ctx: &mut TaskCtx<'_>, dt: f64) -> RecalcResult<Progress> {
        let mut frame_leftover: Option<f64> = None;
        for slot in &mut self.running {
            let Some(task) = slot.as_mut() else {
                continue;
            };
            if let Progress::Done { leftover } = task.advance(ctx, dt)? {
                *slot = None;
                frame_leftover = Some(frame_leftover.map_or(leftover, |l| l.min(leftover)));
            }
        }

        if let Some(l) = frame_leftover {
            self.leftover = Some(l);
        }
        if self.running.iter().any(Option::is_some) {
            return Ok(Progress::Pending);
        }
        // The slice of the frame in which the last child finished.
        Ok(Progress::Done {
            leftover: frame_leftover.or(self.leftover).unwrap_or(dt),
        })
    }
}

/// Start `task` without waiting for it (fire and forget).
pub fn spawn(task: BoxTask) -> BoxTask {
    Box::new(Spawn { task: Some(task) })
}

struct Spawn {
    task: Option<BoxTask>,
}

impl Task for Spawn {
    fn advance(&mut self, ctx: &mut TaskCtx<'_>, dt: f64) -> RecalcResult<Progress> {
        let task = self
            .task
            .take()
            .ok_or_else(|| RecalcError::animation("spawn task advanced twice"))?;
        ctx.spawn(task, dt);
        Ok(Progress::Done { leftover: dt })
    }
}

/// Build the real task from the scene state at the moment it starts.
pub fn defer<F>(build: F) -> BoxTask
where
    F: FnOnce(&mut Scene) -> RecalcResult<BoxTask> + 'static,
{
    Box::new(Defer {
        build: Some(Box::new(build)),
        inner: None,
    })
}

type Builder = Box<dyn FnOnce(&mut Scene) -> RecalcResult<BoxTask>>;

struct Defer {
    build: Option<Builder>,
    inner: Option<BoxTask>,
}

impl Task for Defer {
    fn advance(&mut self, ctx: &mut TaskCtx<'_>, dt: f64) -> RecalcResult<Progress> {
        if let Some(build) = self.build.take() {
            self.inner = Some(build(&mut *ctx.scene)?);
        }
        match self.inner.as_mut() {
            Some(inner) => inner.advance(ctx, dt),
            None => Err(RecalcError::animation("deferred task has no body")),
        }
    }
}

/// Apply an instant scene mutation.
pub fn call<F>(f: F) -> BoxTask
where
    F: FnOnce(&mut Scene) -> RecalcResult<()> + 'static,
{
    Box::new(Call {
        f: Some(Box::new(f)),
    })
}

type Mutation = Box<dyn FnOnce(&mut Scene) -> RecalcResult<()>>;

struct Call {
    f: Option<Mutation>,
}

impl Task for Call {
    fn advance(&mut self, ctx: &mut TaskCtx<'_>, dt: f64) -> RecalcResult<Progress> {
        let f = self
            .f
            .take()
            .ok_or_else(|| RecalcError::animation("call task advanced twice"))?;
        f(&mut *ctx.scene)?;
        Ok(Progress::Done { leftover: dt })
    }
}

/// Set a signal instantly.
pub fn set<T: SignalValue>(signal: Signal<T>, value: T) -> BoxTask {
    call(move |scene| scene.signals.set(signal, value))
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/flow.rs"]
mod tests;
