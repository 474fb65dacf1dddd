//! Timer and frame scheduling.
//!
//! Every delayed action in the motion layer goes through [`Scheduler`]. The
//! browser host backs it with `setTimeout`/`requestAnimationFrame`; the
//! [`TimerWheel`] backs it with an explicitly advanced virtual clock so the
//! same bindings run deterministically without a browser.
//!
//! Scheduled tasks are fire-and-forget unless their [`TaskHandle`] is
//! cancelled. Dropping a handle does not cancel the task.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::ops::ControlFlow;
use std::rc::Rc;
use std::time::Duration;

/// Cancellation handle for a scheduled task.
#[derive(Debug, Clone, Default)]
pub struct TaskHandle {
    cancelled: Rc<Cell<bool>>,
}

impl TaskHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// Host capability for delayed and per-frame callbacks.
pub trait Scheduler: 'static {
    /// Run `task` once after `delay`.
    fn defer(&self, delay: Duration, task: Box<dyn FnOnce()>);

    /// Run `task` once before the next rendered frame.
    fn next_frame(&self, task: Box<dyn FnOnce()>);

    /// Run `task` after `delay` unless the returned handle is cancelled first.
    fn schedule(&self, delay: Duration, task: impl FnOnce() + 'static) -> TaskHandle
    where
        Self: Sized,
    {
        let handle = TaskHandle::new();
        let guard = handle.clone();
        self.defer(
            delay,
            Box::new(move || {
                if !guard.is_cancelled() {
                    task();
                }
            }),
        );
        handle
    }

    fn request_frame(&self, task: impl FnOnce() + 'static)
    where
        Self: Sized,
    {
        self.next_frame(Box::new(task));
    }
}

/// Calls `tick` every `period` until it breaks or the handle is cancelled.
///
/// Implemented as a chain of one-shot timeouts, so a tick that breaks never
/// has a successor armed.
pub fn every<S, F>(scheduler: &Rc<S>, period: Duration, tick: F) -> TaskHandle
where
    S: Scheduler,
    F: FnMut() -> ControlFlow<()> + 'static,
{
    let handle = TaskHandle::new();
    arm(
        scheduler.clone(),
        period,
        Rc::new(RefCell::new(tick)),
        handle.clone(),
    );
    handle
}

fn arm<S, F>(scheduler: Rc<S>, period: Duration, tick: Rc<RefCell<F>>, handle: TaskHandle)
where
    S: Scheduler,
    F: FnMut() -> ControlFlow<()> + 'static,
{
    let next = scheduler.clone();
    scheduler.defer(
        period,
        Box::new(move || {
            if handle.is_cancelled() {
                return;
            }
            let flow = (tick.borrow_mut())();
            if flow.is_continue() {
                arm(next, period, tick, handle);
            }
        }),
    );
}

type Task = Box<dyn FnOnce()>;

/// Single-threaded virtual clock with a deadline-ordered task queue.
///
/// Time only moves through [`TimerWheel::advance`]; frames only render
/// through [`TimerWheel::run_frame`]. Tasks due at the same instant run in
/// the order they were scheduled.
#[derive(Default)]
pub struct TimerWheel {
    now: Cell<Duration>,
    seq: Cell<u64>,
    timers: RefCell<BTreeMap<(Duration, u64), Task>>,
    frames: RefCell<Vec<Task>>,
    frames_rendered: Cell<u64>,
}

impl TimerWheel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now.get()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.borrow().len()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered.get()
    }

    /// Moves the clock forward, running every task that falls due on the way.
    ///
    /// Tasks scheduled by running tasks are picked up if they fall inside the
    /// same window.
    pub fn advance(&self, by: Duration) {
        let until = self.now.get() + by;
        loop {
            let due = {
                let mut timers = self.timers.borrow_mut();
                let ready = timers
                    .first_key_value()
                    .is_some_and(|(&(deadline, _), _)| deadline <= until);
                if ready { timers.pop_first() } else { None }
            };
            match due {
                Some(((deadline, _), task)) => {
                    self.now.set(deadline);
                    task();
                }
                None => break,
            }
        }
        self.now.set(until);
    }

    /// Runs the callbacks queued for the next frame.
    ///
    /// Callbacks requested while the frame runs wait for the following frame.
    pub fn run_frame(&self) {
        let batch = std::mem::take(&mut *self.frames.borrow_mut());
        self.frames_rendered.set(self.frames_rendered.get() + 1);
        for task in batch {
            task();
        }
    }
}

impl Scheduler for TimerWheel {
    fn defer(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        let seq = self.seq.get();
        self.seq.set(seq + 1);
        self.timers
            .borrow_mut()
            .insert((self.now.get() + delay, seq), task);
    }

    fn next_frame(&self, task: Box<dyn FnOnce()>) {
        self.frames.borrow_mut().push(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_tasks_run_in_deadline_order() {
        let wheel = TimerWheel::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for (delay, label) in [(300, "c"), (100, "a"), (200, "b")] {
            let log = log.clone();
            wheel.schedule(ms(delay), move || log.borrow_mut().push(label));
        }

        wheel.advance(ms(150));
        assert_eq!(*log.borrow(), vec!["a"]);
        assert_eq!(wheel.now(), ms(150));

        wheel.advance(ms(200));
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert_eq!(wheel.pending_timers(), 0);
    }

    #[test]
    fn test_same_deadline_keeps_schedule_order() {
        let wheel = TimerWheel::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for label in 0..5 {
            let log = log.clone();
            wheel.schedule(ms(10), move || log.borrow_mut().push(label));
        }
        wheel.advance(ms(10));
        assert_eq!(*log.borrow(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_cancelled_task_never_runs() {
        let wheel = TimerWheel::new();
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        let handle = wheel.schedule(ms(50), move || flag.set(true));

        handle.cancel();
        wheel.advance(ms(100));
        assert!(!fired.get());
        assert!(handle.is_cancelled());
    }

    #[test]
    fn test_dropped_handle_still_fires() {
        let wheel = TimerWheel::new();
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        drop(wheel.schedule(ms(50), move || flag.set(true)));

        wheel.advance(ms(50));
        assert!(fired.get());
    }

    #[test]
    fn test_task_scheduled_inside_window_runs() {
        let wheel = Rc::new(TimerWheel::new());
        let log = Rc::new(RefCell::new(Vec::new()));

        let inner_wheel = wheel.clone();
        let inner_log = log.clone();
        wheel.schedule(ms(10), move || {
            inner_log.borrow_mut().push(inner_wheel.now());
            let log = inner_log.clone();
            let clock = inner_wheel.clone();
            inner_wheel.schedule(ms(10), move || log.borrow_mut().push(clock.now()));
        });

        wheel.advance(ms(100));
        assert_eq!(*log.borrow(), vec![ms(10), ms(20)]);
    }

    #[test]
    fn test_every_stops_on_break() {
        let wheel = Rc::new(TimerWheel::new());
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();

        every(&wheel, ms(16), move || {
            counter.set(counter.get() + 1);
            if counter.get() == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        wheel.advance(ms(1000));
        assert_eq!(count.get(), 3);
        assert_eq!(wheel.pending_timers(), 0);
    }

    #[test]
    fn test_every_cancel() {
        let wheel = Rc::new(TimerWheel::new());
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();

        let handle = every(&wheel, ms(16), move || {
            counter.set(counter.get() + 1);
            ControlFlow::Continue(())
        });

        wheel.advance(ms(48));
        assert_eq!(count.get(), 3);

        handle.cancel();
        wheel.advance(ms(1000));
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn test_frames_requested_during_frame_wait() {
        let wheel = Rc::new(TimerWheel::new());
        let count = Rc::new(Cell::new(0));

        let inner_wheel = wheel.clone();
        let inner_count = count.clone();
        wheel.request_frame(move || {
            inner_count.set(inner_count.get() + 1);
            let count = inner_count.clone();
            inner_wheel.request_frame(move || count.set(count.get() + 1));
        });

        wheel.run_frame();
        assert_eq!(count.get(), 1);
        assert_eq!(wheel.pending_frames(), 1);

        wheel.run_frame();
        assert_eq!(count.get(), 2);
        assert_eq!(wheel.frames_rendered(), 2);
    }
}
