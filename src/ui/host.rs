//! Browser host backed by `web-sys`.
//!
//! Listener, observer and frame closures are leaked with `forget()`: the
//! bindings live as long as the page does.

use std::time::Duration;

use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, Document, EventTarget, HtmlElement, HtmlImageElement,
    IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, KeyboardEvent,
    MouseEvent, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition, Window,
};

use crate::core::geometry::Rect;
use crate::core::host::{
    DomEvent, EventKind, Events, Handler, ListenOptions, ListenTarget, Surface, Visibility,
    VisibilityCallback,
};
use crate::core::style::StyleProperty;
use crate::core::timer::Scheduler;
use crate::core::watcher::{VisibilityEntry, WatchOptions};
use crate::core::{MotionError, Result};

fn host_error(err: JsValue) -> MotionError {
    MotionError::Host(format!("{:?}", err))
}

pub struct BrowserHost {
    window: Window,
    document: Document,
}

impl BrowserHost {
    pub fn new() -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| MotionError::Host("no window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| MotionError::Host("no document".to_string()))?;
        Ok(Self { window, document })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn collect(list: std::result::Result<web_sys::NodeList, JsValue>) -> Vec<HtmlElement> {
        let list = match list {
            Ok(list) => list,
            Err(err) => {
                tracing::warn!("Selector query failed: {}", host_error(err));
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|index| list.item(index))
            .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
            .collect()
    }
}

fn to_dom_event(kind: EventKind, event: &web_sys::Event) -> DomEvent {
    match kind {
        EventKind::Scroll => DomEvent::Scroll,
        EventKind::Resize => DomEvent::Resize,
        EventKind::KeyDown => DomEvent::KeyDown {
            key: event
                .dyn_ref::<KeyboardEvent>()
                .map(|key| key.key())
                .unwrap_or_default(),
        },
        EventKind::PointerMove => {
            let (client_x, client_y) = event
                .dyn_ref::<MouseEvent>()
                .map(|mouse| (mouse.client_x() as f64, mouse.client_y() as f64))
                .unwrap_or_default();
            DomEvent::PointerMove { client_x, client_y }
        }
        EventKind::PointerLeave => DomEvent::PointerLeave,
        EventKind::Click => DomEvent::Click,
        EventKind::Load => DomEvent::Load,
    }
}

impl Surface for BrowserHost {
    type Element = HtmlElement;

    fn query_all(&self, selector: &str) -> Vec<HtmlElement> {
        Self::collect(self.document.query_selector_all(selector))
    }

    fn query_within(&self, scope: &HtmlElement, selector: &str) -> Vec<HtmlElement> {
        Self::collect(scope.query_selector_all(selector))
    }

    fn query_one(&self, selector: &str) -> Option<HtmlElement> {
        match self.document.query_selector(selector) {
            Ok(found) => found.and_then(|element| element.dyn_into::<HtmlElement>().ok()),
            Err(err) => {
                tracing::warn!("Selector query failed: {}", host_error(err));
                None
            }
        }
    }

    fn body(&self) -> Option<HtmlElement> {
        self.document.body()
    }

    fn set_style(&self, element: &HtmlElement, property: StyleProperty, value: &str) {
        if let Err(err) = element.style().set_property(property.css_name(), value) {
            tracing::warn!("Failed to set {}: {}", property.css_name(), host_error(err));
        }
    }

    fn text_content(&self, element: &HtmlElement) -> String {
        element.text_content().unwrap_or_default()
    }

    fn set_text_content(&self, element: &HtmlElement, text: &str) {
        element.set_text_content(Some(text));
    }

    fn attribute(&self, element: &HtmlElement, name: &str) -> Option<String> {
        element.get_attribute(name)
    }

    fn bounding_rect(&self, element: &HtmlElement) -> Rect {
        let rect = element.get_bounding_client_rect();
        Rect::new(rect.x(), rect.y(), rect.width(), rect.height())
    }

    fn is_loaded(&self, element: &HtmlElement) -> bool {
        element
            .dyn_ref::<HtmlImageElement>()
            .map(|image| image.complete())
            .unwrap_or(true)
    }

    fn scroll_into_view(&self, element: &HtmlElement) {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Start);
        element.scroll_into_view_with_scroll_into_view_options(&options);
    }

    fn scroll_offset(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn viewport_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|width| width.as_f64())
            .unwrap_or(0.0)
    }

    fn inject_stylesheet(&self, css: &str) {
        let style = match self.document.create_element("style") {
            Ok(style) => style,
            Err(err) => {
                tracing::warn!("Failed to create stylesheet: {}", host_error(err));
                return;
            }
        };
        style.set_text_content(Some(css));

        let Some(head) = self.document.head() else {
            tracing::warn!("Document has no head, stylesheet dropped");
            return;
        };
        if let Err(err) = head.append_child(&style) {
            tracing::warn!("Failed to append stylesheet: {}", host_error(err));
        }
    }

    fn console_banner(&self, message: &str, css: &str) {
        web_sys::console::log_2(
            &JsValue::from_str(&format!("%c{}", message)),
            &JsValue::from_str(css),
        );
    }
}

impl Events for BrowserHost {
    fn listen(
        &self,
        target: ListenTarget<HtmlElement>,
        kind: EventKind,
        options: ListenOptions,
        mut handler: Handler,
    ) {
        let target: EventTarget = match target {
            ListenTarget::Window => self.window.clone().into(),
            ListenTarget::Document => self.document.clone().into(),
            ListenTarget::Element(element) => element.into(),
        };

        let prevent_default = options.prevent_default && !options.passive;
        let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
            if prevent_default {
                event.prevent_default();
            }
            handler(&to_dom_event(kind, &event));
        }) as Box<dyn FnMut(web_sys::Event)>);

        let listen_options = AddEventListenerOptions::new();
        listen_options.set_passive(options.passive);
        listen_options.set_once(options.once);

        if let Err(err) = target.add_event_listener_with_callback_and_add_event_listener_options(
            kind.dom_name(),
            closure.as_ref().unchecked_ref(),
            &listen_options,
        ) {
            tracing::warn!("Failed to listen for {}: {}", kind.dom_name(), host_error(err));
        }

        closure.forget();
    }
}

impl Visibility for BrowserHost {
    type Observer = IntersectionObserver;

    fn create_observer(
        &self,
        options: &WatchOptions,
        mut callback: VisibilityCallback<HtmlElement, IntersectionObserver>,
    ) -> Result<IntersectionObserver> {
        let closure = Closure::wrap(Box::new(
            move |entries: js_sys::Array, observer: IntersectionObserver| {
                let entries = entries
                    .iter()
                    .filter_map(|value| value.dyn_into::<IntersectionObserverEntry>().ok())
                    .filter_map(|entry| {
                        let target = entry.target().dyn_into::<HtmlElement>().ok()?;
                        Some(VisibilityEntry {
                            target,
                            ratio: entry.intersection_ratio(),
                            is_intersecting: entry.is_intersecting(),
                        })
                    })
                    .collect();
                callback(entries, &observer);
            },
        ) as Box<dyn FnMut(js_sys::Array, IntersectionObserver)>);

        let init = IntersectionObserverInit::new();
        init.set_root_margin(&options.root_margin.to_string());
        init.set_threshold(&JsValue::from_f64(options.threshold));

        let observer = IntersectionObserver::new_with_options(closure.as_ref().unchecked_ref(), &init)
            .map_err(host_error)?;
        closure.forget();
        Ok(observer)
    }

    fn observe(&self, observer: &IntersectionObserver, element: &HtmlElement) {
        observer.observe(element);
    }

    fn unobserve(&self, observer: &IntersectionObserver, element: &HtmlElement) {
        observer.unobserve(element);
    }

    fn disconnect(&self, observer: &IntersectionObserver) {
        observer.disconnect();
    }
}

impl Scheduler for BrowserHost {
    fn defer(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        Timeout::new(millis, task).forget();
    }

    fn next_frame(&self, task: Box<dyn FnOnce()>) {
        let callback = Closure::once_into_js(move || task());
        if let Err(err) = self.window.request_animation_frame(callback.unchecked_ref()) {
            tracing::warn!("Failed to request a frame: {}", host_error(err));
        }
    }
}
