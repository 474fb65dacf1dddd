//! Hero parallax: scroll-linked translation, at most one update per frame.

use std::cell::Cell;
use std::rc::Rc;

use super::config::ParallaxConfig;
use super::host::{EventKind, Events, ListenOptions, ListenTarget};
use super::style::{StyleProperty, Transform};
use super::timer::Scheduler;

/// Pending-frame flag used to coalesce bursts of events into one frame.
#[derive(Debug, Default)]
pub struct FrameGate {
    pending: Cell<bool>,
}

impl FrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the caller should request a frame.
    pub fn try_arm(&self) -> bool {
        !self.pending.replace(true)
    }

    /// Clears the flag; called from inside the frame callback.
    pub fn release(&self) {
        self.pending.set(false);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }
}

pub fn parallax_transform(scroll_offset: f64, speed: f64) -> Transform {
    Transform::TranslateY(scroll_offset * speed)
}

/// Binds the scroll listener when the parallax element exists.
pub fn bind_parallax<H>(host: &Rc<H>, config: &ParallaxConfig) -> bool
where
    H: Events + Scheduler,
{
    let Some(target) = host.query_one(&config.selector) else {
        tracing::debug!("No {} element, parallax disabled", config.selector);
        return false;
    };

    let gate = Rc::new(FrameGate::new());
    let speed = config.speed;
    let scroll_host = host.clone();

    host.listen(
        ListenTarget::Window,
        EventKind::Scroll,
        ListenOptions::passive(),
        Box::new(move |_| {
            if !gate.try_arm() {
                return;
            }
            let host = scroll_host.clone();
            let target = target.clone();
            let gate = gate.clone();
            scroll_host.request_frame(move || {
                let transform = parallax_transform(host.scroll_offset(), speed);
                host.set_style(&target, StyleProperty::Transform, &transform.to_string());
                gate.release();
            });
        }),
    );

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_arms_once_until_released() {
        let gate = FrameGate::new();
        assert!(gate.try_arm());
        for _ in 0..99 {
            assert!(!gate.try_arm());
        }
        assert!(gate.is_pending());

        gate.release();
        assert!(!gate.is_pending());
        assert!(gate.try_arm());
    }

    #[test]
    fn test_transform_lags_scroll() {
        assert_eq!(parallax_transform(0.0, 0.5).to_string(), "translateY(0)");
        assert_eq!(parallax_transform(300.0, 0.5).to_string(), "translateY(150px)");
    }
}
