//! Delayed task seam. The controller schedules the end of the success window
//! through this trait so the browser can use `setTimeout` while tests advance
//! time by hand.

/// Runs a task once after a delay on the current thread.
pub trait Scheduler {
    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>);
}

/// Browser scheduler backed by `gloo-timers`.
#[cfg(target_arch = "wasm32")]
#[derive(Clone, Copy, Debug, Default)]
pub struct TimeoutScheduler;

#[cfg(target_arch = "wasm32")]
impl Scheduler for TimeoutScheduler {
    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) {
        // The task owns its own liveness check, so the timer can be detached.
        gloo_timers::callback::Timeout::new(delay_ms, task).forget();
    }
}
