//! Rolling-timer debounce.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use super::host::{EventKind, Events, ListenOptions, ListenTarget};
use super::timer::{Scheduler, TaskHandle};

/// Collapses a burst of calls into one action `wait` after the last call.
pub struct Debouncer<S: Scheduler> {
    scheduler: Rc<S>,
    wait: Duration,
    pending: RefCell<Option<TaskHandle>>,
    action: Rc<dyn Fn()>,
    runs: Rc<Cell<u32>>,
}

impl<S: Scheduler> Debouncer<S> {
    pub fn new(scheduler: Rc<S>, wait: Duration, action: impl Fn() + 'static) -> Self {
        Self {
            scheduler,
            wait,
            pending: RefCell::new(None),
            action: Rc::new(action),
            runs: Rc::new(Cell::new(0)),
        }
    }

    /// Times the action has run.
    pub fn runs(&self) -> u32 {
        self.runs.get()
    }

    /// Cancels any pending run and restarts the delay.
    pub fn call(&self) {
        if let Some(previous) = self.pending.borrow_mut().take() {
            previous.cancel();
        }
        let action = self.action.clone();
        let runs = self.runs.clone();
        let handle = self.scheduler.schedule(self.wait, move || {
            runs.set(runs.get() + 1);
            action();
        });
        *self.pending.borrow_mut() = Some(handle);
    }

    pub fn cancel(&self) {
        if let Some(pending) = self.pending.borrow_mut().take() {
            pending.cancel();
        }
    }
}

/// Debounced window resize handler that reports the settled viewport width.
pub fn bind_resize<H>(host: &Rc<H>, wait: Duration) -> Rc<Debouncer<H>>
where
    H: Events + Scheduler,
{
    let report = host.clone();
    let debouncer = Rc::new(Debouncer::new(host.clone(), wait, move || {
        tracing::debug!("Window resized to {}px", report.viewport_width());
    }));

    let on_resize = debouncer.clone();
    host.listen(
        ListenTarget::Window,
        EventKind::Resize,
        ListenOptions::default(),
        Box::new(move |_| on_resize.call()),
    );

    debouncer
}
