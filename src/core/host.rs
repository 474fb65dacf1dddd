//! Capability traits the motion bindings are written against.
//!
//! A host provides four things: a [`Surface`] to query elements and write
//! inline styles, [`Events`] to listen for page events, [`Visibility`]
//! notifications for intersection changes, and a
//! [`Scheduler`](super::timer::Scheduler) for timers and frames. The browser
//! host lives in `crate::ui`; [`HeadlessPage`](super::headless::HeadlessPage)
//! implements the same traits in memory.

use super::error::Result;
use super::geometry::Rect;
use super::style::{RevealStyle, StyleProperty, VisualState};
use super::timer::Scheduler;
use super::watcher::{VisibilityEntry, WatchOptions};

/// Element queries and inline style writes.
pub trait Surface: 'static {
    type Element: Clone + PartialEq + 'static;

    /// All elements matching `selector`, in document order.
    fn query_all(&self, selector: &str) -> Vec<Self::Element>;

    /// Descendants of `scope` matching `selector`, in document order.
    fn query_within(&self, scope: &Self::Element, selector: &str) -> Vec<Self::Element>;

    fn query_one(&self, selector: &str) -> Option<Self::Element> {
        self.query_all(selector).into_iter().next()
    }

    fn body(&self) -> Option<Self::Element>;

    fn set_style(&self, element: &Self::Element, property: StyleProperty, value: &str);

    fn text_content(&self, element: &Self::Element) -> String;

    fn set_text_content(&self, element: &Self::Element, text: &str);

    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;

    /// Border box relative to the viewport.
    fn bounding_rect(&self, element: &Self::Element) -> Rect;

    /// Whether an image has finished loading. Non-images count as loaded.
    fn is_loaded(&self, element: &Self::Element) -> bool;

    /// Smooth-scrolls so the element's top aligns with the viewport top.
    fn scroll_into_view(&self, element: &Self::Element);

    /// Vertical scroll offset of the page.
    fn scroll_offset(&self) -> f64;

    fn viewport_width(&self) -> f64;

    /// Appends a `<style>` block to the document head.
    fn inject_stylesheet(&self, css: &str);

    /// Writes a `%c`-styled console line.
    fn console_banner(&self, message: &str, css: &str);

    fn set_visual_state(&self, element: &Self::Element, state: &VisualState) {
        if let Some(opacity) = state.opacity {
            self.set_style(element, StyleProperty::Opacity, &opacity.to_string());
        }
        if let Some(transform) = &state.transform {
            self.set_style(element, StyleProperty::Transform, &transform.to_string());
        }
    }

    /// Puts an element in the hidden state of `style`, ready to transition.
    fn prepare_reveal(&self, element: &Self::Element, style: &RevealStyle) {
        self.set_visual_state(element, &style.hidden);
        if let Some(origin) = &style.transform_origin {
            self.set_style(element, StyleProperty::TransformOrigin, origin);
        }
        self.set_style(
            element,
            StyleProperty::Transition,
            &style.transition.to_string(),
        );
    }
}

/// Where a listener is attached.
#[derive(Debug, Clone, PartialEq)]
pub enum ListenTarget<E> {
    Window,
    Document,
    Element(E),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Scroll,
    Resize,
    KeyDown,
    PointerMove,
    PointerLeave,
    Click,
    Load,
}

impl EventKind {
    pub fn dom_name(&self) -> &'static str {
        match self {
            EventKind::Scroll => "scroll",
            EventKind::Resize => "resize",
            EventKind::KeyDown => "keydown",
            EventKind::PointerMove => "mousemove",
            EventKind::PointerLeave => "mouseleave",
            EventKind::Click => "click",
            EventKind::Load => "load",
        }
    }
}

/// Page event as seen by a binding.
#[derive(Debug, Clone, PartialEq)]
pub enum DomEvent {
    Scroll,
    Resize,
    KeyDown { key: String },
    PointerMove { client_x: f64, client_y: f64 },
    PointerLeave,
    Click,
    Load,
}

impl DomEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DomEvent::Scroll => EventKind::Scroll,
            DomEvent::Resize => EventKind::Resize,
            DomEvent::KeyDown { .. } => EventKind::KeyDown,
            DomEvent::PointerMove { .. } => EventKind::PointerMove,
            DomEvent::PointerLeave => EventKind::PointerLeave,
            DomEvent::Click => EventKind::Click,
            DomEvent::Load => EventKind::Load,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListenOptions {
    pub passive: bool,
    pub once: bool,
    pub prevent_default: bool,
}

impl ListenOptions {
    pub fn passive() -> Self {
        Self {
            passive: true,
            ..Self::default()
        }
    }

    pub fn once() -> Self {
        Self {
            once: true,
            ..Self::default()
        }
    }

    pub fn prevent_default() -> Self {
        Self {
            prevent_default: true,
            ..Self::default()
        }
    }
}

pub type Handler = Box<dyn FnMut(&DomEvent)>;

/// Event listener registration.
pub trait Events: Surface {
    /// Listeners stay registered for the page lifetime unless `once` is set.
    fn listen(
        &self,
        target: ListenTarget<Self::Element>,
        kind: EventKind,
        options: ListenOptions,
        handler: Handler,
    );
}

pub type VisibilityCallback<E, O> = Box<dyn FnMut(Vec<VisibilityEntry<E>>, &O)>;

/// Intersection notifications.
///
/// Contract: the callback receives at least one entry per observed element
/// reflecting its state when observation starts, even if the element is
/// already on screen; later entries arrive when an element crosses the
/// threshold or stops/starts intersecting.
pub trait Visibility: Surface {
    type Observer: Clone + 'static;

    fn create_observer(
        &self,
        options: &WatchOptions,
        callback: VisibilityCallback<Self::Element, Self::Observer>,
    ) -> Result<Self::Observer>;

    fn observe(&self, observer: &Self::Observer, element: &Self::Element);

    fn unobserve(&self, observer: &Self::Observer, element: &Self::Element);

    fn disconnect(&self, observer: &Self::Observer);
}

/// Everything a binding needs from the page.
pub trait Host: Events + Visibility + Scheduler {}

impl<T: Events + Visibility + Scheduler> Host for T {}
