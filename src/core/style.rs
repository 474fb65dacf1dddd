//! Visual state model: the handful of inline style properties motion touches.

use std::fmt;
use std::time::Duration;

/// Inline style properties written by the bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleProperty {
    Opacity,
    Transform,
    TransformOrigin,
    Transition,
    Animation,
    BackgroundImage,
}

impl StyleProperty {
    pub fn css_name(&self) -> &'static str {
        match self {
            StyleProperty::Opacity => "opacity",
            StyleProperty::Transform => "transform",
            StyleProperty::TransformOrigin => "transform-origin",
            StyleProperty::Transition => "transition",
            StyleProperty::Animation => "animation",
            StyleProperty::BackgroundImage => "background-image",
        }
    }
}

/// Formats a CSS number, writing zero without a unit like hand-written CSS does.
pub(crate) fn css_length(value: f64, unit: &str) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        format!("{}{}", value, unit)
    }
}

/// 2-D transform applied to a target element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    TranslateX(f64),
    TranslateY(f64),
    Scale(f64),
    ScaleX(f64),
    /// Perspective rotation used by tilt cards; `lift` is applied upwards.
    Tilt {
        perspective: f64,
        rotate_x: f64,
        rotate_y: f64,
        lift: f64,
    },
}

impl Transform {
    pub fn is_identity(&self) -> bool {
        match *self {
            Transform::TranslateX(v) | Transform::TranslateY(v) => v == 0.0,
            Transform::Scale(v) | Transform::ScaleX(v) => v == 1.0,
            Transform::Tilt {
                rotate_x,
                rotate_y,
                lift,
                ..
            } => rotate_x == 0.0 && rotate_y == 0.0 && lift == 0.0,
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Transform::TranslateX(px) => write!(f, "translateX({})", css_length(px, "px")),
            Transform::TranslateY(px) => write!(f, "translateY({})", css_length(px, "px")),
            Transform::Scale(factor) => write!(f, "scale({})", factor),
            Transform::ScaleX(factor) => write!(f, "scaleX({})", factor),
            Transform::Tilt {
                perspective,
                rotate_x,
                rotate_y,
                lift,
            } => write!(
                f,
                "perspective({}px) rotateX({}) rotateY({}) translateY({})",
                perspective,
                css_length(rotate_x, "deg"),
                css_length(rotate_y, "deg"),
                css_length(-lift, "px"),
            ),
        }
    }
}

/// Opacity and transform pair; `None` leaves the property untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VisualState {
    pub opacity: Option<f64>,
    pub transform: Option<Transform>,
}

impl VisualState {
    pub fn new(opacity: f64, transform: Transform) -> Self {
        Self {
            opacity: Some(opacity),
            transform: Some(transform),
        }
    }

    pub fn opacity(opacity: f64) -> Self {
        Self {
            opacity: Some(opacity),
            transform: None,
        }
    }
}

/// Which properties a transition covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionTarget {
    OpacityOnly,
    OpacityAndTransform,
}

/// Transition descriptor handed to the host's CSS engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub duration: Duration,
    pub easing: String,
    pub target: TransitionTarget,
}

impl Transition {
    pub fn ease(duration: Duration) -> Self {
        Self {
            duration,
            easing: "ease".to_string(),
            target: TransitionTarget::OpacityAndTransform,
        }
    }

    pub fn opacity_only(mut self) -> Self {
        self.target = TransitionTarget::OpacityOnly;
        self
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seconds = self.duration.as_secs_f64();
        match self.target {
            TransitionTarget::OpacityOnly => write!(f, "opacity {}s {}", seconds, self.easing),
            TransitionTarget::OpacityAndTransform => write!(
                f,
                "opacity {}s {}, transform {}s {}",
                seconds, self.easing, seconds, self.easing
            ),
        }
    }
}

/// Hidden and shown states of a reveal, plus how to move between them.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealStyle {
    pub hidden: VisualState,
    pub shown: VisualState,
    pub transition: Transition,
    pub transform_origin: Option<String>,
}

impl RevealStyle {
    /// Fade in while sliding up from `offset` pixels below.
    pub fn fade_up(offset: f64, duration: Duration) -> Self {
        Self {
            hidden: VisualState::new(0.0, Transform::TranslateY(offset)),
            shown: VisualState::new(1.0, Transform::TranslateY(0.0)),
            transition: Transition::ease(duration),
            transform_origin: None,
        }
    }

    /// Fade in while sliding horizontally from `offset` pixels.
    pub fn slide_x(offset: f64, duration: Duration) -> Self {
        Self {
            hidden: VisualState::new(0.0, Transform::TranslateX(offset)),
            shown: VisualState::new(1.0, Transform::TranslateX(0.0)),
            transition: Transition::ease(duration),
            transform_origin: None,
        }
    }

    /// Fade in while growing from `from` to full size.
    pub fn pop(from: f64, duration: Duration) -> Self {
        Self {
            hidden: VisualState::new(0.0, Transform::Scale(from)),
            shown: VisualState::new(1.0, Transform::Scale(1.0)),
            transition: Transition::ease(duration),
            transform_origin: None,
        }
    }

    /// Horizontal wipe anchored at the left edge.
    pub fn wipe_x(duration: Duration) -> Self {
        Self {
            hidden: VisualState::new(0.0, Transform::ScaleX(0.0)),
            shown: VisualState::new(1.0, Transform::ScaleX(1.0)),
            transition: Transition::ease(duration),
            transform_origin: Some("left center".to_string()),
        }
    }

    /// Opacity-only fade.
    pub fn fade(duration: Duration) -> Self {
        Self {
            hidden: VisualState::opacity(0.0),
            shown: VisualState::opacity(1.0),
            transition: Transition::ease(duration).opacity_only(),
            transform_origin: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_css() {
        assert_eq!(Transform::TranslateY(40.0).to_string(), "translateY(40px)");
        assert_eq!(Transform::TranslateY(0.0).to_string(), "translateY(0)");
        assert_eq!(Transform::TranslateX(-30.0).to_string(), "translateX(-30px)");
        assert_eq!(Transform::Scale(0.8).to_string(), "scale(0.8)");
        assert_eq!(Transform::ScaleX(0.0).to_string(), "scaleX(0)");
        assert_eq!(Transform::ScaleX(1.0).to_string(), "scaleX(1)");
    }

    #[test]
    fn test_tilt_css() {
        let tilt = Transform::Tilt {
            perspective: 1000.0,
            rotate_x: 2.5,
            rotate_y: -1.25,
            lift: 8.0,
        };
        assert_eq!(
            tilt.to_string(),
            "perspective(1000px) rotateX(2.5deg) rotateY(-1.25deg) translateY(-8px)"
        );

        let rest = Transform::Tilt {
            perspective: 1000.0,
            rotate_x: 0.0,
            rotate_y: 0.0,
            lift: 0.0,
        };
        assert_eq!(
            rest.to_string(),
            "perspective(1000px) rotateX(0) rotateY(0) translateY(0)"
        );
        assert!(rest.is_identity());
        assert!(!tilt.is_identity());
    }

    #[test]
    fn test_transition_css() {
        let both = Transition::ease(Duration::from_millis(800));
        assert_eq!(both.to_string(), "opacity 0.8s ease, transform 0.8s ease");

        let fade = Transition::ease(Duration::from_millis(800)).opacity_only();
        assert_eq!(fade.to_string(), "opacity 0.8s ease");
    }

    #[test]
    fn test_reveal_presets() {
        let wipe = RevealStyle::wipe_x(Duration::from_millis(400));
        assert_eq!(wipe.transform_origin.as_deref(), Some("left center"));
        assert_eq!(wipe.hidden.transform, Some(Transform::ScaleX(0.0)));

        let fade = RevealStyle::fade(Duration::from_millis(800));
        assert!(fade.hidden.transform.is_none());
        assert_eq!(fade.shown.opacity, Some(1.0));
    }

    #[test]
    fn test_property_names() {
        assert_eq!(StyleProperty::TransformOrigin.css_name(), "transform-origin");
        assert_eq!(StyleProperty::BackgroundImage.css_name(), "background-image");
    }
}
