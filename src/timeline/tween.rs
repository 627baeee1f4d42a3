use crate::{
    animation::{ease::Ease, lerp::Lerp},
    foundation::error::RecalcResult,
    scene::signal::{Signal, SignalValue},
    timeline::{
        flow::TIME_EPSILON,
        task::{BoxTask, Progress, Task, TaskCtx},
    },
};

/// Animate `signal` from whatever it holds when the tween starts to `target`.
///
/// The start value is captured on the first advance, not at construction, so a tween placed
/// late in a script picks up every change made before it.
pub fn tween<T>(signal: Signal<T>, target: T, duration: f64, ease: Ease) -> BoxTask
where
    T: SignalValue + Lerp,
{
    Box::new(Tween {
        signal,
        from: None,
        target,
        duration: duration.max(0.0),
        elapsed: 0.0,
        ease,
    })
}

struct Tween<T> {
    signal: Signal<T>,
    from: Option<T>,
    target: T,
    duration: f64,
    elapsed: f64,
    ease: Ease,
}

impl<T> Task for Tween<T>
where
    T: SignalValue + Lerp,
{
    fn advance(&mut self, ctx: &mut TaskCtx<'_>, dt: f64) -> RecalcResult<Progress> {
        let from = match &self.from {
            Some(from) => from,
            None => &*self.from.insert(ctx.scene.signals.get(self.signal)?.clone()),
        };

        self.elapsed += dt;
        if self.elapsed + TIME_EPSILON >= self.duration {
            ctx.scene.signals.set(self.signal, self.target.clone())?;
            return Ok(Progress::Done {
                leftover: (self.elapsed - self.duration).max(0.0),
            });
        }

        let t = self.ease.apply(self.elapsed / self.duration);
        let value = T::lerp(from, &self.target, t);
        ctx.scene.signals.set(self.signal, value)?;
        Ok(Progress::Pending)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/tween.rs"]
mod tests;
