//! Image fade-in on first sight.

use std::rc::Rc;
use std::time::Duration;

use super::config::LazyImageConfig;
use super::error::Result;
use super::geometry::RootMargin;
use super::host::{EventKind, Events, ListenOptions, ListenTarget, Visibility};
use super::style::{RevealStyle, StyleProperty};
use super::watcher::{WatchEvent, WatchOptions, WatchPolicy, watch};

/// What to do with an image the first time it intersects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LazyReveal {
    Now,
    OnLoad,
}

pub fn on_first_sight(loaded: bool) -> LazyReveal {
    if loaded {
        LazyReveal::Now
    } else {
        LazyReveal::OnLoad
    }
}

/// Observes every image once and fades it in when it has loaded.
///
/// Returns the number of images observed.
pub fn bind_lazy_images<H>(host: &Rc<H>, config: &LazyImageConfig) -> Result<usize>
where
    H: Events + Visibility,
{
    let images = host.query_all(&config.selector);
    if images.is_empty() {
        return Ok(0);
    }

    let style = RevealStyle::fade(Duration::from_millis(config.duration_ms));
    let options = WatchOptions::new(0.0, RootMargin::ZERO, WatchPolicy::OneShotElement);
    let reveal_host = host.clone();

    watch(host, &images, options, move |event| {
        let WatchEvent::Entered(image) = event else {
            return;
        };
        reveal_host.prepare_reveal(&image, &style);

        match on_first_sight(reveal_host.is_loaded(&image)) {
            LazyReveal::Now => reveal_host.set_visual_state(&image, &style.shown),
            LazyReveal::OnLoad => {
                let host = reveal_host.clone();
                let target = image.clone();
                reveal_host.listen(
                    ListenTarget::Element(image),
                    EventKind::Load,
                    ListenOptions::once(),
                    Box::new(move |_| {
                        host.set_style(&target, StyleProperty::Opacity, "1");
                    }),
                );
            }
        }
    })?;

    Ok(images.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy() {
        assert_eq!(on_first_sight(true), LazyReveal::Now);
        assert_eq!(on_first_sight(false), LazyReveal::OnLoad);
    }
}
