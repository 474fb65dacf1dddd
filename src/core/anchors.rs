//! Smooth scrolling for in-page anchor links.

use std::rc::Rc;

use super::config::AnchorConfig;
use super::host::{EventKind, Events, ListenOptions, ListenTarget};

/// Selector an in-page `href` points at, if any. A bare `#` points nowhere.
pub fn anchor_selector(href: &str) -> Option<&str> {
    let href = href.trim();
    if href.len() > 1 && href.starts_with('#') {
        Some(href)
    } else {
        None
    }
}

/// Replaces the default jump of every in-page link with a smooth scroll.
///
/// The `href` is read when the link is clicked, so links retargeted after
/// startup scroll to their new target.
pub fn bind_anchors<H: Events>(host: &Rc<H>, config: &AnchorConfig) -> usize {
    let links = host.query_all(&config.selector);

    for link in &links {
        let click_host = host.clone();
        let click_link = link.clone();
        host.listen(
            ListenTarget::Element(link.clone()),
            EventKind::Click,
            ListenOptions::prevent_default(),
            Box::new(move |_| {
                let Some(href) = click_host.attribute(&click_link, "href") else {
                    return;
                };
                let target = anchor_selector(&href).and_then(|selector| click_host.query_one(selector));
                match target {
                    Some(target) => click_host.scroll_into_view(&target),
                    None => tracing::debug!("Anchor {} has no target", href),
                }
            }),
        );
    }

    links.len()
}
