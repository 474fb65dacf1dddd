//! Tilt-on-hover for cards.

use std::rc::Rc;

use super::config::TiltConfig;
use super::geometry::Rect;
use super::host::{DomEvent, EventKind, Events, ListenOptions, ListenTarget};
use super::style::{StyleProperty, Transform};

/// Rotation for a pointer at client coordinates over `rect` (also client).
///
/// Angles grow with the distance from the card center and shrink with
/// `config.sensitivity`. Depends only on the latest pointer position.
pub fn tilt_for(config: &TiltConfig, rect: &Rect, client_x: f64, client_y: f64) -> Transform {
    let (center_x, center_y) = rect.center();

    Transform::Tilt {
        perspective: config.perspective_px,
        rotate_x: (client_y - center_y) / config.sensitivity,
        rotate_y: (center_x - client_x) / config.sensitivity,
        lift: config.lift_px,
    }
}

/// Flat, unlifted card.
pub fn rest(config: &TiltConfig) -> Transform {
    Transform::Tilt {
        perspective: config.perspective_px,
        rotate_x: 0.0,
        rotate_y: 0.0,
        lift: 0.0,
    }
}

/// Attaches pointer listeners to every card matching `config.selector`.
///
/// Returns the number of cards bound.
pub fn bind_tilt<H: Events>(host: &Rc<H>, config: &TiltConfig) -> usize {
    let cards = host.query_all(&config.selector);

    for card in &cards {
        let move_host = host.clone();
        let move_card = card.clone();
        let move_config = config.clone();
        host.listen(
            ListenTarget::Element(card.clone()),
            EventKind::PointerMove,
            ListenOptions::default(),
            Box::new(move |event| {
                if let DomEvent::PointerMove { client_x, client_y } = event {
                    let rect = move_host.bounding_rect(&move_card);
                    let transform = tilt_for(&move_config, &rect, *client_x, *client_y);
                    move_host.set_style(&move_card, StyleProperty::Transform, &transform.to_string());
                }
            }),
        );

        let leave_host = host.clone();
        let leave_card = card.clone();
        let flat = rest(config).to_string();
        host.listen(
            ListenTarget::Element(card.clone()),
            EventKind::PointerLeave,
            ListenOptions::default(),
            Box::new(move |_| {
                leave_host.set_style(&leave_card, StyleProperty::Transform, &flat);
            }),
        );
    }

    cards.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_has_no_rotation() {
        let config = TiltConfig::default();
        let rect = Rect::new(100.0, 50.0, 400.0, 200.0);
        assert_eq!(
            tilt_for(&config, &rect, 300.0, 150.0).to_string(),
            "perspective(1000px) rotateX(0) rotateY(0) translateY(-8px)"
        );
    }

    #[test]
    fn test_offset_card_uses_its_own_center() {
        let config = TiltConfig::default();
        let rect = Rect::new(500.0, 300.0, 300.0, 300.0);
        assert_eq!(
            tilt_for(&config, &rect, 500.0, 300.0).to_string(),
            "perspective(1000px) rotateX(-7.5deg) rotateY(7.5deg) translateY(-8px)"
        );
    }

    #[test]
    fn test_corner_rotation() {
        let config = TiltConfig::default();
        let rect = Rect::new(0.0, 0.0, 400.0, 200.0);

        // Top-left corner: tips the top edge away, left edge towards.
        let transform = tilt_for(&config, &rect, 0.0, 0.0);
        assert_eq!(
            transform,
            Transform::Tilt {
                perspective: 1000.0,
                rotate_x: -5.0,
                rotate_y: 10.0,
                lift: 8.0,
            }
        );

        let transform = tilt_for(&config, &rect, 400.0, 200.0);
        assert_eq!(
            transform.to_string(),
            "perspective(1000px) rotateX(5deg) rotateY(-10deg) translateY(-8px)"
        );
    }

    #[test]
    fn test_sensitivity_scales_angles() {
        let config = TiltConfig {
            sensitivity: 40.0,
            ..TiltConfig::default()
        };
        let rect = Rect::new(0.0, 0.0, 400.0, 200.0);
        match tilt_for(&config, &rect, 0.0, 0.0) {
            Transform::Tilt {
                rotate_x, rotate_y, ..
            } => {
                assert_eq!(rotate_x, -2.5);
                assert_eq!(rotate_y, 5.0);
            }
            other => panic!("unexpected transform {other:?}"),
        }
    }

    #[test]
    fn test_rest_transform() {
        assert_eq!(
            rest(&TiltConfig::default()).to_string(),
            "perspective(1000px) rotateX(0) rotateY(0) translateY(0)"
        );
    }
}
