//! Animated numeric counters for the hero figures.

use std::ops::ControlFlow;
use std::rc::Rc;
use std::time::Duration;

use super::config::CounterConfig;
use super::error::{MotionError, Result};
use super::geometry::RootMargin;
use super::host::{Host, Surface};
use super::stagger::StaggerSchedule;
use super::timer::{Scheduler, every};
use super::watcher::{WatchEvent, WatchOptions, WatchPolicy, watch};

/// Target value and suffix read from a counter's displayed text.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterText {
    pub target: f64,
    pub suffix: String,
}

impl CounterText {
    /// Reads every ASCII digit as one number. The suffix is `"+"` when the
    /// text contains a plus sign anywhere, otherwise empty; unit text is
    /// dropped.
    ///
    /// `"1,300+"` parses to 1300 with suffix `"+"`, `"145 hp"` to 145 with no
    /// suffix.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let digits: String = text.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return Err(MotionError::CounterText(text.to_string()));
        }

        let target = digits
            .parse::<f64>()
            .map_err(|_| MotionError::CounterText(text.to_string()))?;
        let suffix = String::from(if text.contains('+') { "+" } else { "" });

        Ok(Self { target, suffix })
    }
}

/// One rendered counter tick.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterFrame {
    pub text: String,
    pub finished: bool,
}

/// Counter animation state: (current, target, increment, elapsed ticks).
#[derive(Debug, Clone, PartialEq)]
pub struct CounterAnimation {
    current: f64,
    target: f64,
    increment: f64,
    ticks: u32,
    suffix: String,
}

impl CounterAnimation {
    pub fn new(start: f64, end: f64, duration: Duration, tick: Duration, suffix: impl Into<String>) -> Self {
        let steps = duration.as_nanos() as f64 / tick.as_nanos() as f64;
        let increment = if steps > 0.0 {
            (end - start) / steps
        } else {
            end - start
        };
        Self {
            current: start,
            target: end,
            increment,
            ticks: 0,
            suffix: suffix.into(),
        }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn increment(&self) -> f64 {
        self.increment
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Advances one tick, clamping to the target on overshoot either way.
    ///
    /// A zero increment (start equals end) finishes on the first tick.
    pub fn tick(&mut self) -> CounterFrame {
        self.ticks += 1;
        self.current += self.increment;

        let overshot = (self.increment > 0.0 && self.current >= self.target)
            || (self.increment < 0.0 && self.current <= self.target)
            || self.increment == 0.0;
        if overshot {
            self.current = self.target;
        }

        CounterFrame {
            text: self.render(),
            finished: overshot,
        }
    }

    pub fn render(&self) -> String {
        format!("{}{}", self.current.floor(), self.suffix)
    }
}

/// Starts one counter per element, staggered by index.
///
/// Elements whose text has no digits are left untouched.
pub fn start_counters<H>(host: &Rc<H>, elements: Vec<H::Element>, config: &CounterConfig)
where
    H: Surface + Scheduler,
{
    let duration = config.duration();
    let tick = config.tick();

    let parsed: Vec<(H::Element, CounterText)> = elements
        .into_iter()
        .filter_map(|element| match CounterText::parse(&host.text_content(&element)) {
            Ok(text) => Some((element, text)),
            // Deliberately skipped instead of counting towards NaN.
            Err(err) => {
                tracing::warn!("Skipping counter: {}", err);
                None
            }
        })
        .collect();

    let runner = host.clone();
    StaggerSchedule::new(parsed, config.stagger(), Duration::ZERO).run(
        &**host,
        move |_, (element, text)| {
            let mut animation = CounterAnimation::new(0.0, text.target, duration, tick, text.suffix.clone());
            let host = runner.clone();
            let element = element.clone();
            every(&runner, tick, move || {
                let frame = animation.tick();
                host.set_text_content(&element, &frame.text);
                if frame.finished {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            });
        },
    );
}

/// Starts the counters the first time the trigger section is half visible.
///
/// Counter elements are looked up when the trigger fires. Returns false when
/// the trigger section is missing.
pub fn bind_counters<H: Host>(host: &Rc<H>, config: &CounterConfig) -> Result<bool> {
    let Some(trigger) = host.query_one(&config.trigger) else {
        tracing::debug!("No {} element, counters disabled", config.trigger);
        return Ok(false);
    };

    let options = WatchOptions::new(config.threshold, RootMargin::ZERO, WatchPolicy::OneShotGroup);
    let counter_host = host.clone();
    let counter_config = config.clone();

    watch(host, &[trigger], options, move |event| {
        if let WatchEvent::Entered(_) = event {
            let values = counter_host.query_all(&counter_config.selector);
            start_counters(&counter_host, values, &counter_config);
        }
    })?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_parse_plain_number() {
        let text = CounterText::parse("42").unwrap();
        assert_eq!(text.target, 42.0);
        assert_eq!(text.suffix, "");
    }

    #[test]
    fn test_parse_keeps_suffix() {
        let text = CounterText::parse("  145+ \n").unwrap();
        assert_eq!(text.target, 145.0);
        assert_eq!(text.suffix, "+");

        let text = CounterText::parse("1,300 cc").unwrap();
        assert_eq!(text.target, 1300.0);
        assert_eq!(text.suffix, "");
    }

    #[test]
    fn test_plus_anywhere_becomes_suffix() {
        let text = CounterText::parse("+42").unwrap();
        assert_eq!(text.target, 42.0);
        assert_eq!(text.suffix, "+");

        let mut animation = CounterAnimation::new(0.0, text.target, ms(48), ms(16), text.suffix);
        let last = std::iter::repeat_with(|| animation.tick())
            .take(10)
            .find(|frame| frame.finished)
            .unwrap();
        assert_eq!(last.text, "42+");
    }

    #[test]
    fn test_unit_text_is_dropped() {
        let text = CounterText::parse("145 hp").unwrap();
        assert_eq!(text.target, 145.0);
        assert_eq!(text.suffix, "");

        let mut animation = CounterAnimation::new(0.0, text.target, ms(16), ms(16), text.suffix);
        assert_eq!(animation.tick().text, "145");
    }

    #[test]
    fn test_parse_without_digits_fails() {
        assert!(matches!(
            CounterText::parse("N/A"),
            Err(MotionError::CounterText(_))
        ));
        assert!(CounterText::parse("").is_err());
    }

    #[test]
    fn test_runs_to_exact_target() {
        let mut animation = CounterAnimation::new(0.0, 42.0, ms(1500), ms(16), "");
        let mut last = 0.0;
        let mut frame = animation.tick();
        while !frame.finished {
            let shown: f64 = frame.text.parse().unwrap();
            assert!(shown >= last, "displayed value went backwards");
            last = shown;
            frame = animation.tick();
        }
        assert_eq!(frame.text, "42");
        // 1500 / 16 = 93.75 steps, so the 94th tick overshoots and clamps.
        assert_eq!(animation.ticks(), 94);
    }

    #[test]
    fn test_suffix_reappended_every_tick() {
        let mut animation = CounterAnimation::new(0.0, 42.0, ms(1500), ms(16), "+");
        let first = animation.tick();
        assert_eq!(first.text, "0+");
        let mut frame = first;
        while !frame.finished {
            assert!(frame.text.ends_with('+'));
            frame = animation.tick();
        }
        assert_eq!(frame.text, "42+");
    }

    #[test]
    fn test_counts_down_and_clamps() {
        let mut animation = CounterAnimation::new(10.0, 0.0, ms(64), ms(16), "");
        assert!(animation.increment() < 0.0);
        let frames: Vec<CounterFrame> = (0..4).map(|_| animation.tick()).collect();
        assert_eq!(frames.last().unwrap().text, "0");
        assert!(frames.last().unwrap().finished);
        assert!(!frames[0].finished);
    }

    #[test]
    fn test_zero_range_finishes_immediately() {
        let mut animation = CounterAnimation::new(0.0, 0.0, ms(1500), ms(16), "");
        let frame = animation.tick();
        assert!(frame.finished);
        assert_eq!(frame.text, "0");
    }

    #[test]
    fn test_values_are_floored() {
        let mut animation = CounterAnimation::new(0.0, 10.0, ms(48), ms(16), "");
        assert_eq!(animation.tick().text, "3");
        assert_eq!(animation.tick().text, "6");
        assert_eq!(animation.tick().text, "10");
    }
}
