use newsletter_gate::app_lib::schedule::Scheduler;
use std::{cell::RefCell, rc::Rc};

type Task = (u32, Box<dyn FnOnce()>);

/// Scheduler whose tasks only run when a test says so.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    tasks: Rc<RefCell<Vec<Task>>>,
}

impl ManualScheduler {
    /// Delays of the tasks still waiting, in scheduling order.
    #[must_use]
    pub fn pending_delays(&self) -> Vec<u32> {
        self.tasks.borrow().iter().map(|(delay, _)| *delay).collect()
    }

    /// Runs every waiting task, as if all their delays elapsed. Returns how
    /// many ran.
    pub fn run_all(&self) -> usize {
        let tasks: Vec<Task> = self.tasks.borrow_mut().drain(..).collect();
        let count = tasks.len();
        for (_, task) in tasks {
            task();
        }
        count
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) {
        self.tasks.borrow_mut().push((delay_ms, task));
    }
}
