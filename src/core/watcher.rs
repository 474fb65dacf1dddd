//! Visibility watcher: turns raw intersection entries into reveal decisions.
//!
//! The watcher itself is a plain state machine over [`VisibilityEntry`]
//! batches. [`watch`] wires it to a host observer and carries out the
//! unobserve/disconnect steps it decides on.

use std::rc::Rc;

use super::error::Result;
use super::geometry::RootMargin;
use super::host::Visibility;

/// When a watcher lets go of its targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchPolicy {
    /// The first qualifying entry disengages the watcher for every target.
    OneShotGroup,
    /// Each target is released after its own first qualifying entry.
    OneShotElement,
    /// Targets are re-hidden when they drop below the threshold again.
    Repeating,
}

/// Threshold, trigger margin and policy shared by one watcher group.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchOptions {
    pub threshold: f64,
    pub root_margin: RootMargin,
    pub policy: WatchPolicy,
}

impl WatchOptions {
    pub fn new(threshold: f64, root_margin: RootMargin, policy: WatchPolicy) -> Self {
        Self {
            threshold,
            root_margin,
            policy,
        }
    }

    /// Whether an entry counts as "in view" under these options.
    pub fn qualifies<E>(&self, entry: &VisibilityEntry<E>) -> bool {
        entry.is_intersecting && entry.ratio >= self.threshold
    }
}

/// One intersection observation.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityEntry<E> {
    pub target: E,
    pub ratio: f64,
    pub is_intersecting: bool,
}

/// Decision produced by [`VisibilityWatcher::handle`].
#[derive(Debug, Clone, PartialEq)]
pub enum WatchStep<E> {
    Enter(E),
    Exit(E),
    Unobserve(E),
    Disconnect,
}

/// Event delivered to bindings by [`watch`].
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent<E> {
    Entered(E),
    Exited(E),
}

#[derive(Debug, Clone)]
pub struct VisibilityWatcher<E> {
    options: WatchOptions,
    engaged: bool,
    shown: Vec<E>,
}

impl<E: Clone + PartialEq> VisibilityWatcher<E> {
    pub fn new(options: WatchOptions) -> Self {
        Self {
            options,
            engaged: true,
            shown: Vec::new(),
        }
    }

    pub fn options(&self) -> &WatchOptions {
        &self.options
    }

    /// False once a whole-group watcher has fired.
    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    pub fn handle(&mut self, entries: impl IntoIterator<Item = VisibilityEntry<E>>) -> Vec<WatchStep<E>> {
        let mut steps = Vec::new();
        if !self.engaged {
            return steps;
        }

        for entry in entries {
            let qualifies = self.options.qualifies(&entry);
            match self.options.policy {
                WatchPolicy::OneShotGroup => {
                    if qualifies {
                        steps.push(WatchStep::Enter(entry.target));
                        steps.push(WatchStep::Disconnect);
                        self.engaged = false;
                        break;
                    }
                }
                WatchPolicy::OneShotElement => {
                    if qualifies && !self.shown.contains(&entry.target) {
                        self.shown.push(entry.target.clone());
                        steps.push(WatchStep::Enter(entry.target.clone()));
                        steps.push(WatchStep::Unobserve(entry.target));
                    }
                }
                WatchPolicy::Repeating => {
                    let position = self.shown.iter().position(|t| *t == entry.target);
                    match (qualifies, position) {
                        (true, None) => {
                            self.shown.push(entry.target.clone());
                            steps.push(WatchStep::Enter(entry.target));
                        }
                        (false, Some(index)) => {
                            self.shown.remove(index);
                            steps.push(WatchStep::Exit(entry.target));
                        }
                        _ => {}
                    }
                }
            }
        }

        steps
    }
}

/// Observes `targets` on the host and forwards enter/exit events.
///
/// Returns the host observer so callers can add targets later; the watcher
/// releases targets itself according to `options.policy`.
pub fn watch<H, F>(
    host: &Rc<H>,
    targets: &[H::Element],
    options: WatchOptions,
    mut on_event: F,
) -> Result<H::Observer>
where
    H: Visibility,
    F: FnMut(WatchEvent<H::Element>) + 'static,
{
    let mut watcher = VisibilityWatcher::new(options.clone());
    let glue = host.clone();

    let observer = host.create_observer(
        &options,
        Box::new(move |entries, observer| {
            for step in watcher.handle(entries) {
                match step {
                    WatchStep::Enter(target) => on_event(WatchEvent::Entered(target)),
                    WatchStep::Exit(target) => on_event(WatchEvent::Exited(target)),
                    WatchStep::Unobserve(target) => glue.unobserve(observer, &target),
                    WatchStep::Disconnect => glue.disconnect(observer),
                }
            }
        }),
    )?;

    for target in targets {
        host.observe(&observer, target);
    }

    Ok(observer)
}
