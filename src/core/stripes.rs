//! Racing-stripe background that slowly rotates every frame.

use std::cell::RefCell;
use std::rc::Rc;

use super::config::StripesConfig;
use super::host::Surface;
use super::style::StyleProperty;
use super::timer::Scheduler;

/// Desktop-only: strictly wider than the breakpoint.
pub fn should_animate(viewport_width: f64, config: &StripesConfig) -> bool {
    viewport_width > config.min_viewport_px
}

/// Rotation angle state for the stripe gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct StripeAnimator {
    angle: f64,
    step: f64,
    color: String,
    gap: f64,
    width: f64,
}

impl StripeAnimator {
    pub fn new(config: &StripesConfig) -> Self {
        Self {
            angle: config.start_deg,
            step: config.step_deg,
            color: config.color.clone(),
            gap: config.gap_px,
            width: config.width_px,
        }
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Steps the angle and returns the new background image.
    pub fn advance(&mut self) -> String {
        self.angle += self.step;
        self.gradient()
    }

    pub fn gradient(&self) -> String {
        let stripe_end = self.gap + self.width;
        format!(
            "repeating-linear-gradient({}deg, transparent, transparent {}px, {} {}px, {} {}px)",
            self.angle, self.gap, self.color, self.gap, self.color, stripe_end
        )
    }
}

/// Starts the frame loop when the element exists and the viewport is wide
/// enough. Evaluated once; never restarted or stopped on resize.
pub fn bind_stripes<H>(host: &Rc<H>, config: &StripesConfig) -> bool
where
    H: Surface + Scheduler,
{
    let width = host.viewport_width();
    if !should_animate(width, config) {
        tracing::debug!("Racing stripes disabled at viewport width {}", width);
        return false;
    }
    let Some(stripes) = host.query_one(&config.selector) else {
        tracing::debug!("No {} element, racing stripes disabled", config.selector);
        return false;
    };

    let animator = Rc::new(RefCell::new(StripeAnimator::new(config)));
    render_frame(host.clone(), stripes, animator);
    true
}

fn render_frame<H>(host: Rc<H>, stripes: H::Element, animator: Rc<RefCell<StripeAnimator>>)
where
    H: Surface + Scheduler,
{
    let background = animator.borrow_mut().advance();
    host.set_style(&stripes, StyleProperty::BackgroundImage, &background);

    let next = host.clone();
    host.request_frame(move || render_frame(next, stripes, animator));
}
