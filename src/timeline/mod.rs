pub(crate) mod flow;
pub(crate) mod scheduler;
pub(crate) mod task;
pub(crate) mod tween;
