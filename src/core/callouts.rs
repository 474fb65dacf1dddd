//! Pulsing design callouts, started one after another.

use std::rc::Rc;
use std::time::Duration;

use super::config::CalloutConfig;
use super::host::Surface;
use super::stagger::{StaggerRun, StaggerSchedule};
use super::style::StyleProperty;
use super::timer::Scheduler;

/// Inline animation for the dot at `index`; each dot also gets a growing
/// animation delay so the pulses stay out of phase.
pub fn pulse_animation(config: &CalloutConfig, index: usize) -> String {
    format!(
        "{} {}s ease {}s infinite",
        config.animation,
        config.duration_s,
        index as f64 * config.delay_step_s
    )
}

pub fn bind_callouts<H>(host: &Rc<H>, config: &CalloutConfig) -> StaggerRun
where
    H: Surface + Scheduler,
{
    let dots = host.query_all(&config.selector);
    let pulse_host = host.clone();
    let pulse_config = config.clone();

    StaggerSchedule::new(dots, Duration::from_millis(config.start_step_ms), Duration::ZERO).run(
        &**host,
        move |index, dot| {
            let animation = pulse_animation(&pulse_config, index);
            pulse_host.set_style(dot, StyleProperty::Animation, &animation);
        },
    )
}
