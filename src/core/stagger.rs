//! Staggered scheduling: one action per element at `offset + index * step`.

use std::rc::Rc;
use std::time::Duration;

use super::timer::{Scheduler, TaskHandle};

/// Ordered (element, delay) pairs computed once at trigger time.
#[derive(Debug, Clone, PartialEq)]
pub struct StaggerSchedule<E> {
    slots: Vec<(E, Duration)>,
}

impl<E: Clone + 'static> StaggerSchedule<E> {
    pub fn new(elements: impl IntoIterator<Item = E>, step: Duration, offset: Duration) -> Self {
        let slots = elements
            .into_iter()
            .enumerate()
            .map(|(index, element)| (element, offset + step * index as u32))
            .collect();
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn delay_of(&self, index: usize) -> Option<Duration> {
        self.slots.get(index).map(|(_, delay)| *delay)
    }

    pub fn slots(&self) -> &[(E, Duration)] {
        &self.slots
    }

    /// Schedules `action(index, element)` for every slot.
    pub fn run<S, F>(self, scheduler: &S, action: F) -> StaggerRun
    where
        S: Scheduler,
        F: Fn(usize, &E) + 'static,
    {
        let action = Rc::new(action);
        let handles = self
            .slots
            .into_iter()
            .enumerate()
            .map(|(index, (element, delay))| {
                let action = action.clone();
                scheduler.schedule(delay, move || action(index, &element))
            })
            .collect();
        StaggerRun { handles }
    }
}

/// Handles for the tasks of one schedule.
///
/// Not cancelling is the default: tasks already scheduled keep firing even
/// if whatever started them is gone.
#[derive(Debug, Default)]
pub struct StaggerRun {
    handles: Vec<TaskHandle>,
}

impl StaggerRun {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Cancels every task that has not fired yet.
    pub fn cancel(&self) {
        for handle in &self.handles {
            handle.cancel();
        }
    }
}
