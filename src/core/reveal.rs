//! Reveal controller: hide a group up front, show it when it scrolls into view.
//!
//! Two shapes cover every reveal on the page:
//! - [`reveal_each`] watches each element on its own and shows it in place;
//! - [`reveal_staggered`] watches one container and, on the first qualifying
//!   entry, shows the container's children lane by lane with a per-index
//!   delay.

use std::rc::Rc;
use std::time::Duration;

use super::error::Result;
use super::host::Host;
use super::stagger::StaggerSchedule;
use super::style::RevealStyle;
use super::watcher::{WatchEvent, WatchOptions, WatchPolicy, watch};

/// Children of a staggered container that share one style and cadence.
#[derive(Debug, Clone, PartialEq)]
pub struct StaggerLane {
    pub selector: String,
    pub style: RevealStyle,
    pub step: Duration,
    pub offset: Duration,
}

/// Hides every element matching `selector` and reveals each one as it
/// enters the view.
///
/// With [`WatchPolicy::Repeating`] elements are hidden again on exit.
/// Returns the number of elements bound.
pub fn reveal_each<H: Host>(
    host: &Rc<H>,
    selector: &str,
    style: RevealStyle,
    options: WatchOptions,
) -> Result<usize> {
    let elements = host.query_all(selector);
    if elements.is_empty() {
        tracing::debug!("No elements match {}, reveal skipped", selector);
        return Ok(0);
    }

    for element in &elements {
        host.prepare_reveal(element, &style);
    }

    let reveal_host = host.clone();
    watch(host, &elements, options, move |event| match event {
        WatchEvent::Entered(element) => reveal_host.set_visual_state(&element, &style.shown),
        WatchEvent::Exited(element) => reveal_host.set_visual_state(&element, &style.hidden),
    })?;

    Ok(elements.len())
}

/// Hides the lanes of the first `container` match and reveals them,
/// staggered, the first time the container qualifies.
///
/// Children are looked up again at trigger time; the schedule is fixed from
/// that moment on. Returns false when there is no container.
pub fn reveal_staggered<H: Host>(
    host: &Rc<H>,
    container: &str,
    lanes: Vec<StaggerLane>,
    threshold_options: WatchOptions,
) -> Result<bool> {
    let Some(root) = host.query_one(container) else {
        tracing::debug!("No {} element, staggered reveal skipped", container);
        return Ok(false);
    };

    for lane in &lanes {
        for child in host.query_within(&root, &lane.selector) {
            host.prepare_reveal(&child, &lane.style);
        }
    }

    let options = WatchOptions {
        policy: WatchPolicy::OneShotGroup,
        ..threshold_options
    };
    let reveal_host = host.clone();

    watch(host, std::slice::from_ref(&root), options, move |event| {
        let WatchEvent::Entered(root) = event else {
            return;
        };
        for lane in &lanes {
            let children = reveal_host.query_within(&root, &lane.selector);
            let shown = lane.style.shown;
            let host = reveal_host.clone();
            StaggerSchedule::new(children, lane.step, lane.offset).run(&*reveal_host, move |_, child| {
                host.set_visual_state(child, &shown);
            });
        }
    })?;

    Ok(true)
}

