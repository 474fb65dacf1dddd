//! In-memory page that implements every host capability.
//!
//! `HeadlessPage` keeps a small element tree with document-space boxes, a
//! scroll position and a viewport, and runs timers and frames on a
//! [`TimerWheel`]. Visibility entries are computed from the boxes and
//! delivered on [`HeadlessPage::flush_visibility`], which scrolling,
//! resizing and every clock step call.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::time::Duration;

use super::error::Result;
use super::geometry::{Rect, intersection_ratio};
use super::host::{
    DomEvent, EventKind, Events, Handler, ListenOptions, ListenTarget, Surface, Visibility,
    VisibilityCallback,
};
use super::style::StyleProperty;
use super::timer::{Scheduler, TimerWheel};
use super::watcher::{VisibilityEntry, WatchOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(usize);

#[derive(Debug)]
struct Node {
    tag: String,
    attributes: BTreeMap<String, String>,
    children: Vec<NodeId>,
    rect: Rect,
    text: String,
    loaded: bool,
    styles: BTreeMap<StyleProperty, String>,
}

impl Node {
    fn has_class(&self, class: &str) -> bool {
        self.attributes
            .get("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }
}

// ============================================================================
// Selectors
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum AttributeMatch {
    Exists(String),
    Equals(String, String),
    Prefix(String, String),
}

impl AttributeMatch {
    fn parse(inner: &str) -> Self {
        let unquote = |value: &str| value.trim().trim_matches(['"', '\'']).to_string();
        if let Some((name, value)) = inner.split_once("^=") {
            AttributeMatch::Prefix(name.trim().to_string(), unquote(value))
        } else if let Some((name, value)) = inner.split_once('=') {
            AttributeMatch::Equals(name.trim().to_string(), unquote(value))
        } else {
            AttributeMatch::Exists(inner.trim().to_string())
        }
    }

    fn matches(&self, node: &Node) -> bool {
        match self {
            AttributeMatch::Exists(name) => node.attributes.contains_key(name),
            AttributeMatch::Equals(name, value) => node.attributes.get(name) == Some(value),
            AttributeMatch::Prefix(name, value) => node
                .attributes
                .get(name)
                .is_some_and(|actual| actual.starts_with(value.as_str())),
        }
    }
}

/// One compound selector: `tag.class#id[attr^="v"]`. No combinators.
#[derive(Debug, Clone, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeMatch>,
}

impl Compound {
    fn parse(text: &str) -> Self {
        let mut compound = Compound::default();
        let text = text.trim();
        let tag_end = text.find(['.', '#', '[']).unwrap_or(text.len());
        if tag_end > 0 && &text[..tag_end] != "*" {
            compound.tag = Some(text[..tag_end].to_ascii_lowercase());
        }

        let mut rest = &text[tag_end..];
        while let Some(first) = rest.chars().next() {
            match first {
                '.' | '#' => {
                    let body = &rest[1..];
                    let end = body.find(['.', '#', '[']).unwrap_or(body.len());
                    let name = body[..end].to_string();
                    if first == '.' {
                        compound.classes.push(name);
                    } else {
                        compound.id = Some(name);
                    }
                    rest = &body[end..];
                }
                '[' => {
                    let end = rest.find(']').unwrap_or(rest.len());
                    compound.attributes.push(AttributeMatch::parse(&rest[1..end]));
                    rest = rest.get(end + 1..).unwrap_or("");
                }
                _ => break,
            }
        }
        compound
    }

    fn matches(&self, node: &Node) -> bool {
        self.tag.as_ref().is_none_or(|tag| *tag == node.tag)
            && self
                .id
                .as_ref()
                .is_none_or(|id| node.attributes.get("id") == Some(id))
            && self.classes.iter().all(|class| node.has_class(class))
            && self.attributes.iter().all(|attr| attr.matches(node))
    }
}

fn parse_selector(selector: &str) -> Vec<Compound> {
    selector
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(Compound::parse)
        .collect()
}

// ============================================================================
// Listeners and observers
// ============================================================================

struct Listener {
    id: u64,
    target: ListenTarget<NodeId>,
    kind: EventKind,
    options: ListenOptions,
    handler: Option<Handler>,
}

struct ObserverState {
    options: WatchOptions,
    callback: Option<VisibilityCallback<NodeId, ObserverId>>,
    /// Observed targets with the last delivered (intersecting, qualifies) pair.
    targets: Vec<(NodeId, Option<(bool, bool)>)>,
}

/// What a dispatched event ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dispatch {
    pub handled: usize,
    pub default_prevented: bool,
}

// ============================================================================
// Page
// ============================================================================

pub struct HeadlessPage {
    nodes: RefCell<Vec<Node>>,
    scroll_y: Cell<f64>,
    viewport: Cell<(f64, f64)>,
    clock: TimerWheel,
    listeners: RefCell<Vec<Listener>>,
    next_listener: Cell<u64>,
    observers: RefCell<Vec<ObserverState>>,
    stylesheets: RefCell<Vec<String>>,
    console: RefCell<Vec<(String, String)>>,
    scrolled_into_view: RefCell<Vec<NodeId>>,
}

impl HeadlessPage {
    const BODY: NodeId = NodeId(0);

    /// Empty page with a `width` x `height` viewport scrolled to the top.
    pub fn new(width: f64, height: f64) -> Self {
        let body = Node {
            tag: "body".to_string(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            rect: Rect::new(0.0, 0.0, width, height),
            text: String::new(),
            loaded: true,
            styles: BTreeMap::new(),
        };
        Self {
            nodes: RefCell::new(vec![body]),
            scroll_y: Cell::new(0.0),
            viewport: Cell::new((width, height)),
            clock: TimerWheel::new(),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
            observers: RefCell::new(Vec::new()),
            stylesheets: RefCell::new(Vec::new()),
            console: RefCell::new(Vec::new()),
            scrolled_into_view: RefCell::new(Vec::new()),
        }
    }

    /// Appends an element described by a compound selector, e.g.
    /// `div.tech-card` or `a[href="#specs"]`, under `parent` (or the body).
    pub fn element(&self, shorthand: &str, parent: Option<NodeId>) -> NodeId {
        let compound = Compound::parse(shorthand);
        let mut attributes = BTreeMap::new();
        if let Some(id) = compound.id {
            attributes.insert("id".to_string(), id);
        }
        if !compound.classes.is_empty() {
            attributes.insert("class".to_string(), compound.classes.join(" "));
        }
        for attribute in compound.attributes {
            match attribute {
                AttributeMatch::Exists(name) => attributes.insert(name, String::new()),
                AttributeMatch::Equals(name, value) | AttributeMatch::Prefix(name, value) => {
                    attributes.insert(name, value)
                }
            };
        }

        let mut nodes = self.nodes.borrow_mut();
        let id = NodeId(nodes.len());
        nodes.push(Node {
            tag: compound.tag.unwrap_or_else(|| "div".to_string()),
            attributes,
            children: Vec::new(),
            rect: Rect::default(),
            text: String::new(),
            loaded: true,
            styles: BTreeMap::new(),
        });
        nodes[parent.unwrap_or(Self::BODY).0].children.push(id);
        id
    }

    /// Places an element in document coordinates.
    pub fn set_rect(&self, id: NodeId, rect: Rect) {
        self.nodes.borrow_mut()[id.0].rect = rect;
    }

    pub fn set_text(&self, id: NodeId, text: &str) {
        self.nodes.borrow_mut()[id.0].text = text.to_string();
    }

    pub fn set_attribute(&self, id: NodeId, name: &str, value: &str) {
        self.nodes.borrow_mut()[id.0]
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    pub fn set_loaded(&self, id: NodeId, loaded: bool) {
        self.nodes.borrow_mut()[id.0].loaded = loaded;
    }

    pub fn style(&self, id: NodeId, property: StyleProperty) -> Option<String> {
        self.nodes.borrow()[id.0].styles.get(&property).cloned()
    }

    pub fn text(&self, id: NodeId) -> String {
        self.nodes.borrow()[id.0].text.clone()
    }

    pub fn stylesheets(&self) -> Vec<String> {
        self.stylesheets.borrow().clone()
    }

    pub fn console_lines(&self) -> Vec<(String, String)> {
        self.console.borrow().clone()
    }

    pub fn scrolled_into_view(&self) -> Vec<NodeId> {
        self.scrolled_into_view.borrow().clone()
    }

    pub fn clock(&self) -> &TimerWheel {
        &self.clock
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|listener| listener.kind == kind)
            .count()
    }

    /// Number of targets still observed across all observers.
    pub fn observed_count(&self) -> usize {
        self.observers
            .borrow()
            .iter()
            .map(|observer| observer.targets.len())
            .sum()
    }

    // ------------------------------------------------------------------------
    // Clock
    // ------------------------------------------------------------------------

    pub fn advance(&self, by: Duration) {
        self.flush_visibility();
        self.clock.advance(by);
        self.flush_visibility();
    }

    pub fn run_frame(&self) {
        self.flush_visibility();
        self.clock.run_frame();
        self.flush_visibility();
    }

    // ------------------------------------------------------------------------
    // Dispatch helpers
    // ------------------------------------------------------------------------

    pub fn scroll_to(&self, y: f64) -> Dispatch {
        self.scroll_y.set(y.max(0.0));
        let outcome = self.dispatch(&ListenTarget::Window, &DomEvent::Scroll);
        self.flush_visibility();
        outcome
    }

    pub fn resize(&self, width: f64, height: f64) -> Dispatch {
        self.viewport.set((width, height));
        let outcome = self.dispatch(&ListenTarget::Window, &DomEvent::Resize);
        self.flush_visibility();
        outcome
    }

    pub fn press_key(&self, key: &str) -> Dispatch {
        self.dispatch(
            &ListenTarget::Document,
            &DomEvent::KeyDown {
                key: key.to_string(),
            },
        )
    }

    /// Moves the pointer to a point given relative to the element's box.
    pub fn pointer_move(&self, id: NodeId, local_x: f64, local_y: f64) -> Dispatch {
        let rect = self.bounding_rect(&id);
        self.dispatch(
            &ListenTarget::Element(id),
            &DomEvent::PointerMove {
                client_x: rect.x + local_x,
                client_y: rect.y + local_y,
            },
        )
    }

    pub fn pointer_leave(&self, id: NodeId) -> Dispatch {
        self.dispatch(&ListenTarget::Element(id), &DomEvent::PointerLeave)
    }

    pub fn click(&self, id: NodeId) -> Dispatch {
        self.dispatch(&ListenTarget::Element(id), &DomEvent::Click)
    }

    /// Marks an image as loaded and fires its `load` event.
    pub fn finish_loading(&self, id: NodeId) -> Dispatch {
        self.set_loaded(id, true);
        self.dispatch(&ListenTarget::Element(id), &DomEvent::Load)
    }

    /// Runs the listeners for `event` on `target` in registration order.
    ///
    /// Listeners added while dispatching wait for the next event.
    pub fn dispatch(&self, target: &ListenTarget<NodeId>, event: &DomEvent) -> Dispatch {
        let kind = event.kind();
        let ids: Vec<u64> = self
            .listeners
            .borrow()
            .iter()
            .filter(|listener| listener.kind == kind && listener.target == *target)
            .map(|listener| listener.id)
            .collect();

        let mut outcome = Dispatch::default();
        for id in ids {
            let taken = {
                let mut listeners = self.listeners.borrow_mut();
                listeners
                    .iter_mut()
                    .find(|listener| listener.id == id)
                    .and_then(|listener| listener.handler.take().map(|h| (h, listener.options)))
            };
            let Some((mut handler, options)) = taken else {
                continue;
            };

            handler(event);
            outcome.handled += 1;
            outcome.default_prevented |= options.prevent_default && !options.passive;

            let mut listeners = self.listeners.borrow_mut();
            if options.once {
                listeners.retain(|listener| listener.id != id);
            } else if let Some(listener) = listeners.iter_mut().find(|listener| listener.id == id) {
                listener.handler = Some(handler);
            }
        }
        outcome
    }

    // ------------------------------------------------------------------------
    // Visibility
    // ------------------------------------------------------------------------

    /// Delivers pending intersection entries until every observer is settled.
    ///
    /// An entry is pending for a target that has not been reported yet, or
    /// whose intersecting/qualifying state changed since the last report.
    pub fn flush_visibility(&self) {
        loop {
            let mut delivered = false;
            let count = self.observers.borrow().len();

            for index in 0..count {
                let entries = self.pending_entries(index);
                if entries.is_empty() {
                    continue;
                }
                delivered = true;

                let callback = self.observers.borrow_mut()[index].callback.take();
                if let Some(mut callback) = callback {
                    callback(entries, &ObserverId(index));
                    self.observers.borrow_mut()[index].callback = Some(callback);
                }
            }

            if !delivered {
                break;
            }
        }
    }

    fn viewport_rect(&self) -> Rect {
        let (width, height) = self.viewport.get();
        Rect::new(0.0, self.scroll_y.get(), width, height)
    }

    fn pending_entries(&self, index: usize) -> Vec<VisibilityEntry<NodeId>> {
        let viewport = self.viewport_rect();
        let nodes = self.nodes.borrow();
        let mut observers = self.observers.borrow_mut();
        let observer = &mut observers[index];
        let root = observer.options.root_margin.apply(&viewport);
        let threshold = observer.options.threshold;

        let mut entries = Vec::new();
        for (target, last) in observer.targets.iter_mut() {
            let (ratio, is_intersecting) = intersection_ratio(&nodes[target.0].rect, &root);
            let state = (is_intersecting, is_intersecting && ratio >= threshold);
            if *last != Some(state) {
                *last = Some(state);
                entries.push(VisibilityEntry {
                    target: *target,
                    ratio,
                    is_intersecting,
                });
            }
        }
        entries
    }

    fn collect(&self, nodes: &[Node], from: NodeId, compounds: &[Compound], out: &mut Vec<NodeId>) {
        for &child in &nodes[from.0].children {
            if compounds.iter().any(|compound| compound.matches(&nodes[child.0])) {
                out.push(child);
            }
            self.collect(nodes, child, compounds, out);
        }
    }
}

impl Surface for HeadlessPage {
    type Element = NodeId;

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        let compounds = parse_selector(selector);
        let nodes = self.nodes.borrow();
        let mut found = Vec::new();
        if compounds.iter().any(|compound| compound.matches(&nodes[Self::BODY.0])) {
            found.push(Self::BODY);
        }
        self.collect(&nodes, Self::BODY, &compounds, &mut found);
        found
    }

    fn query_within(&self, scope: &NodeId, selector: &str) -> Vec<NodeId> {
        let compounds = parse_selector(selector);
        let nodes = self.nodes.borrow();
        let mut found = Vec::new();
        self.collect(&nodes, *scope, &compounds, &mut found);
        found
    }

    fn body(&self) -> Option<NodeId> {
        Some(Self::BODY)
    }

    fn set_style(&self, element: &NodeId, property: StyleProperty, value: &str) {
        self.nodes.borrow_mut()[element.0]
            .styles
            .insert(property, value.to_string());
    }

    fn text_content(&self, element: &NodeId) -> String {
        self.text(*element)
    }

    fn set_text_content(&self, element: &NodeId, text: &str) {
        self.set_text(*element, text);
    }

    fn attribute(&self, element: &NodeId, name: &str) -> Option<String> {
        self.nodes.borrow()[element.0].attributes.get(name).cloned()
    }

    fn bounding_rect(&self, element: &NodeId) -> Rect {
        self.nodes.borrow()[element.0]
            .rect
            .translate(0.0, -self.scroll_y.get())
    }

    fn is_loaded(&self, element: &NodeId) -> bool {
        self.nodes.borrow()[element.0].loaded
    }

    fn scroll_into_view(&self, element: &NodeId) {
        let top = self.nodes.borrow()[element.0].rect.y;
        self.scroll_y.set(top.max(0.0));
        self.scrolled_into_view.borrow_mut().push(*element);
    }

    fn scroll_offset(&self) -> f64 {
        self.scroll_y.get()
    }

    fn viewport_width(&self) -> f64 {
        self.viewport.get().0
    }

    fn inject_stylesheet(&self, css: &str) {
        self.stylesheets.borrow_mut().push(css.to_string());
    }

    fn console_banner(&self, message: &str, css: &str) {
        self.console
            .borrow_mut()
            .push((message.to_string(), css.to_string()));
    }
}

impl Events for HeadlessPage {
    fn listen(
        &self,
        target: ListenTarget<NodeId>,
        kind: EventKind,
        options: ListenOptions,
        handler: Handler,
    ) {
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        self.listeners.borrow_mut().push(Listener {
            id,
            target,
            kind,
            options,
            handler: Some(handler),
        });
    }
}

impl Visibility for HeadlessPage {
    type Observer = ObserverId;

    fn create_observer(
        &self,
        options: &WatchOptions,
        callback: VisibilityCallback<NodeId, ObserverId>,
    ) -> Result<ObserverId> {
        let mut observers = self.observers.borrow_mut();
        observers.push(ObserverState {
            options: options.clone(),
            callback: Some(callback),
            targets: Vec::new(),
        });
        Ok(ObserverId(observers.len() - 1))
    }

    fn observe(&self, observer: &ObserverId, element: &NodeId) {
        let mut observers = self.observers.borrow_mut();
        let targets = &mut observers[observer.0].targets;
        if !targets.iter().any(|(target, _)| target == element) {
            targets.push((*element, None));
        }
    }

    fn unobserve(&self, observer: &ObserverId, element: &NodeId) {
        self.observers.borrow_mut()[observer.0]
            .targets
            .retain(|(target, _)| target != element);
    }

    fn disconnect(&self, observer: &ObserverId) {
        self.observers.borrow_mut()[observer.0].targets.clear();
    }
}

impl Scheduler for HeadlessPage {
    fn defer(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        self.clock.defer(delay, task);
    }

    fn next_frame(&self, task: Box<dyn FnOnce()>) {
        self.clock.next_frame(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::RootMargin;
    use crate::core::watcher::WatchPolicy;

    #[test]
    fn test_selector_matching() {
        let page = HeadlessPage::new(1200.0, 800.0);
        let grid = page.element("section.tech-grid", None);
        let card = page.element("div.tech-card.wide", Some(grid));
        let link = page.element("a[href=\"#specs\"]", None);
        let image = page.element("img#hero", None);

        assert_eq!(page.query_all(".tech-card"), vec![card]);
        assert_eq!(page.query_all("div.wide"), vec![card]);
        assert_eq!(page.query_all("a[href^=\"#\"]"), vec![link]);
        assert_eq!(page.query_all("#hero"), vec![image]);
        assert_eq!(page.query_all(".tech-grid, img"), vec![grid, image]);
        assert_eq!(page.query_within(&grid, ".tech-card"), vec![card]);
        assert!(page.query_within(&card, ".tech-card").is_empty());
        assert!(page.query_all(".missing").is_empty());
    }

    #[test]
    fn test_document_order_follows_tree() {
        let page = HeadlessPage::new(1200.0, 800.0);
        let first = page.element("div.section", None);
        let second = page.element("div.section", None);
        let nested = page.element("div.section", Some(first));

        assert_eq!(page.query_all(".section"), vec![first, nested, second]);
    }

    #[test]
    fn test_once_listener_runs_once() {
        let page = HeadlessPage::new(1200.0, 800.0);
        let image = page.element("img", None);
        let count = std::rc::Rc::new(Cell::new(0));
        let counter = count.clone();
        page.listen(
            ListenTarget::Element(image),
            EventKind::Load,
            ListenOptions::once(),
            Box::new(move |_| counter.set(counter.get() + 1)),
        );

        assert_eq!(page.finish_loading(image).handled, 1);
        assert_eq!(page.finish_loading(image).handled, 0);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_visibility_delivers_initial_and_changes() {
        let page = HeadlessPage::new(1000.0, 800.0);
        let below = page.element("div", None);
        page.set_rect(below, Rect::new(0.0, 1000.0, 100.0, 100.0));

        let seen = std::rc::Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let observer = page
            .create_observer(
                &WatchOptions::new(0.5, RootMargin::ZERO, WatchPolicy::Repeating),
                Box::new(move |entries, _| log.borrow_mut().extend(entries)),
            )
            .unwrap();
        page.observe(&observer, &below);
        page.flush_visibility();
        assert_eq!(seen.borrow().len(), 1);
        assert!(!seen.borrow()[0].is_intersecting);

        // Partly visible but under the threshold: one new entry.
        page.scroll_to(230.0);
        assert_eq!(seen.borrow().len(), 2);
        assert!(seen.borrow()[1].is_intersecting);

        // Crossing the threshold.
        page.scroll_to(300.0);
        assert_eq!(seen.borrow().len(), 3);
        assert_eq!(seen.borrow()[2].ratio, 1.0);

        // No state change, no entry.
        page.scroll_to(310.0);
        assert_eq!(seen.borrow().len(), 3);
    }
}
