//! Konami code easter egg.
//!
//! The detector keeps the most recent key presses in a bounded FIFO sized to
//! the pattern and compares after every push. Matching while the effect is
//! still running triggers again; each trigger schedules its own revert.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use super::config::KonamiConfig;
use super::host::{DomEvent, EventKind, Events, ListenOptions, ListenTarget};
use super::style::StyleProperty;
use super::timer::Scheduler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KonamiState {
    Watching,
    Cooldown,
}

#[derive(Debug, Clone)]
pub struct KonamiDetector {
    pattern: Vec<String>,
    buffer: VecDeque<String>,
    state: KonamiState,
    triggers: u32,
}

impl KonamiDetector {
    pub fn new(pattern: Vec<String>) -> Self {
        Self {
            buffer: VecDeque::with_capacity(pattern.len()),
            pattern,
            state: KonamiState::Watching,
            triggers: 0,
        }
    }

    pub fn state(&self) -> KonamiState {
        self.state
    }

    pub fn triggers(&self) -> u32 {
        self.triggers
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Records a key press. Returns true when the buffer now equals the pattern.
    pub fn push(&mut self, key: &str) -> bool {
        if self.buffer.len() == self.pattern.len() {
            self.buffer.pop_front();
        }
        self.buffer.push_back(key.to_string());

        let matched = self.buffer.iter().eq(self.pattern.iter());
        if matched {
            self.state = KonamiState::Cooldown;
            self.triggers += 1;
        }
        matched
    }

    /// Effect finished; back to watching.
    pub fn cool_down(&mut self) {
        self.state = KonamiState::Watching;
    }
}

/// Listens for key presses on the document and plays the body effect.
pub fn bind_konami<H>(host: &Rc<H>, config: &KonamiConfig) -> Rc<RefCell<KonamiDetector>>
where
    H: Events + Scheduler,
{
    let detector = Rc::new(RefCell::new(KonamiDetector::new(config.pattern.clone())));
    let effect = Duration::from_millis(config.effect_ms);
    let animation = config.animation.clone();

    let key_host = host.clone();
    let key_detector = detector.clone();
    host.listen(
        ListenTarget::Document,
        EventKind::KeyDown,
        ListenOptions::default(),
        Box::new(move |event| {
            let DomEvent::KeyDown { key } = event else {
                return;
            };
            if !key_detector.borrow_mut().push(key) {
                return;
            }
            let Some(body) = key_host.body() else {
                return;
            };

            tracing::info!("Konami code entered");
            key_host.set_style(&body, StyleProperty::Animation, &animation);

            let host = key_host.clone();
            let detector = key_detector.clone();
            key_host.schedule(effect, move || {
                host.set_style(&body, StyleProperty::Animation, "");
                detector.borrow_mut().cool_down();
            });
        }),
    );

    detector
}
