//! In-memory `Page` for unit tests: a node tree with a tiny selector matcher,
//! bubbling event dispatch, a virtual timer clock and manual frame/visibility
//! triggers.

use crate::page::{EventKind, Handler, Page, PageEvent, Rect, Target, VisibilityOptions};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::iter::Peekable;
use std::rc::Rc;
use std::str::Chars;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

const ROOT: NodeId = NodeId(0);
const HEAD: NodeId = NodeId(1);
const BODY: NodeId = NodeId(2);

#[derive(Default)]
struct Node {
    tag: String,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    text: String,
    inner_html: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    offset_top: f64,
    client_height: f64,
    rect: Rect,
    form_values: BTreeMap<String, String>,
    disabled: bool,
}

struct Timer {
    due: u64,
    seq: u64,
    callback: Box<dyn FnOnce()>,
}

struct Observation {
    element: NodeId,
    options: VisibilityOptions,
    callback: Rc<dyn Fn(&NodeId)>,
}

pub struct MockPage {
    nodes: RefCell<Vec<Node>>,
    listeners: RefCell<Vec<(Target<NodeId>, EventKind, Handler<NodeId>)>>,
    timers: RefCell<Vec<Timer>>,
    frames: RefCell<Vec<Box<dyn FnOnce(f64)>>>,
    observations: RefCell<Vec<Observation>>,
    now_ms: Cell<u64>,
    next_seq: Cell<u64>,
    frame_clock: Cell<f64>,
    scroll_y: Cell<f64>,
    inner_width: Cell<f64>,
}

impl MockPage {
    pub fn new() -> Rc<Self> {
        let page = Self {
            nodes: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            timers: RefCell::new(Vec::new()),
            frames: RefCell::new(Vec::new()),
            observations: RefCell::new(Vec::new()),
            now_ms: Cell::new(0),
            next_seq: Cell::new(0),
            frame_clock: Cell::new(0.0),
            scroll_y: Cell::new(0.0),
            inner_width: Cell::new(1280.0),
        };

        let root = page.push_node("html");
        let head = page.push_node("head");
        let body = page.push_node("body");
        page.attach(root, head);
        page.attach(root, body);
        debug_assert_eq!((root, head, body), (ROOT, HEAD, BODY));

        Rc::new(page)
    }

    pub fn body_node(&self) -> NodeId {
        BODY
    }

    /// Adds an attached element; `id` and `class` go through `attributes`.
    pub fn add(&self, parent: NodeId, tag: &str, attributes: &[(&str, &str)]) -> NodeId {
        let node = self.push_node(tag);
        {
            let mut nodes = self.nodes.borrow_mut();
            for (name, value) in attributes {
                nodes[node.0]
                    .attributes
                    .insert(name.to_string(), value.to_string());
            }
        }
        self.attach(parent, node);
        node
    }

    pub fn set_layout(&self, node: NodeId, offset_top: f64, client_height: f64) {
        let mut nodes = self.nodes.borrow_mut();
        nodes[node.0].offset_top = offset_top;
        nodes[node.0].client_height = client_height;
    }

    pub fn set_rect(&self, node: NodeId, rect: Rect) {
        self.nodes.borrow_mut()[node.0].rect = rect;
    }

    pub fn set_form_field(&self, form: NodeId, name: &str, value: &str) {
        self.nodes.borrow_mut()[form.0]
            .form_values
            .insert(name.to_string(), value.to_string());
    }

    pub fn set_inner_width(&self, width: f64) {
        self.inner_width.set(width);
    }

    pub fn text(&self, node: NodeId) -> String {
        self.nodes.borrow()[node.0].text.clone()
    }

    pub fn is_disabled(&self, node: NodeId) -> bool {
        self.nodes.borrow()[node.0].disabled
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes.borrow()[node.0].children.clone()
    }

    pub fn now(&self) -> u64 {
        self.now_ms.get()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.borrow().len()
    }

    pub fn observed_threshold(&self, node: NodeId) -> Option<f64> {
        self.observations
            .borrow()
            .iter()
            .find(|observation| observation.element == node)
            .map(|observation| observation.options.threshold)
    }

    pub fn click(&self, node: NodeId) -> PageEvent<NodeId> {
        self.dispatch(
            Target::Element(node),
            EventKind::Click,
            PageEvent::new(Some(node)),
        )
    }

    pub fn pointer(&self, node: NodeId, kind: EventKind, client_x: f64, client_y: f64) {
        self.dispatch(
            Target::Element(node),
            kind,
            PageEvent::new(Some(node)).with_pointer(client_x, client_y),
        );
    }

    pub fn key_down(&self, target: Target<NodeId>, key: &str) -> PageEvent<NodeId> {
        let event_target = match &target {
            Target::Element(node) => Some(*node),
            _ => None,
        };
        self.dispatch(
            target,
            EventKind::KeyDown,
            PageEvent::new(event_target).with_key(key),
        )
    }

    pub fn submit(&self, form: NodeId) -> PageEvent<NodeId> {
        self.dispatch(
            Target::Element(form),
            EventKind::Submit,
            PageEvent::new(Some(form)),
        )
    }

    pub fn scroll_window(&self, y: f64) {
        self.scroll_y.set(y);
        self.dispatch(Target::Window, EventKind::Scroll, PageEvent::new(None));
    }

    pub fn dispatch(
        &self,
        target: Target<NodeId>,
        kind: EventKind,
        event: PageEvent<NodeId>,
    ) -> PageEvent<NodeId> {
        let mut path = Vec::new();
        match target {
            Target::Element(node) => {
                path.push(Target::Element(node));
                if kind.bubbles() {
                    let mut cursor = self.parent_of(node);
                    while let Some(parent) = cursor {
                        path.push(Target::Element(parent));
                        cursor = self.parent_of(parent);
                    }
                    if self.is_attached(&node) {
                        path.push(Target::Document);
                        path.push(Target::Window);
                    }
                }
            }
            Target::Document => {
                path.push(Target::Document);
                if kind.bubbles() {
                    path.push(Target::Window);
                }
            }
            Target::Window => path.push(Target::Window),
        }

        for step in path {
            let handlers: Vec<Handler<NodeId>> = self
                .listeners
                .borrow()
                .iter()
                .filter(|(target, listener_kind, _)| *target == step && *listener_kind == kind)
                .map(|(_, _, handler)| Rc::clone(handler))
                .collect();

            for handler in handlers {
                handler(&event);
            }

            if event.is_propagation_stopped() {
                break;
            }
        }

        event
    }

    /// Moves the virtual clock forward, firing due timers in schedule order
    /// (including timers scheduled by other timers within the window).
    pub fn advance(&self, ms: u64) {
        let until = self.now_ms.get() + ms;

        loop {
            let next = self
                .timers
                .borrow()
                .iter()
                .enumerate()
                .filter(|(_, timer)| timer.due <= until)
                .min_by_key(|(_, timer)| (timer.due, timer.seq))
                .map(|(index, _)| index);

            let Some(index) = next else {
                break;
            };

            let timer = self.timers.borrow_mut().remove(index);
            self.now_ms.set(timer.due.max(self.now_ms.get()));
            (timer.callback)();
        }

        self.now_ms.set(until);
    }

    /// Runs frame rounds `step_ms` apart until none are pending or `limit`
    /// rounds have run. Returns the number of rounds.
    pub fn run_frames(&self, step_ms: f64, limit: usize) -> usize {
        let mut rounds = 0;

        while rounds < limit {
            let frames = std::mem::take(&mut *self.frames.borrow_mut());
            if frames.is_empty() {
                break;
            }

            let timestamp = self.frame_clock.get() + step_ms;
            self.frame_clock.set(timestamp);
            for frame in frames {
                frame(timestamp);
            }
            rounds += 1;
        }

        rounds
    }

    /// Simulates `node` scrolling into view.
    pub fn reveal(&self, node: NodeId) {
        let triggered: Vec<Rc<dyn Fn(&NodeId)>> = {
            let mut observations = self.observations.borrow_mut();
            let mut triggered = Vec::new();
            observations.retain(|observation| {
                if observation.element == node {
                    triggered.push(Rc::clone(&observation.callback));
                    false
                } else {
                    true
                }
            });
            triggered
        };

        for callback in triggered {
            callback(&node);
        }
    }

    fn push_node(&self, tag: &str) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(Node {
            tag: tag.to_ascii_lowercase(),
            ..Node::default()
        });
        NodeId(nodes.len() - 1)
    }

    fn attach(&self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let mut nodes = self.nodes.borrow_mut();
        nodes[child.0].parent = Some(parent);
        nodes[parent.0].children.push(child);
    }

    fn detach(&self, child: NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        if let Some(parent) = nodes[child.0].parent.take() {
            nodes[parent.0].children.retain(|node| *node != child);
        }
    }

    fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.borrow()[node.0].parent
    }

    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let nodes = self.nodes.borrow();
        let mut ordered = Vec::new();
        let mut stack: Vec<NodeId> = nodes[root.0].children.iter().rev().copied().collect();

        while let Some(node) = stack.pop() {
            ordered.push(node);
            stack.extend(nodes[node.0].children.iter().rev().copied());
        }

        ordered
    }

    fn matches(&self, node: NodeId, selector: &str) -> bool {
        selector
            .split(',')
            .map(str::trim)
            .filter(|alternative| !alternative.is_empty())
            .any(|alternative| {
                let compounds: Vec<Compound> =
                    alternative.split_whitespace().map(Compound::parse).collect();
                self.matches_chain(node, &compounds)
            })
    }

    fn matches_chain(&self, node: NodeId, compounds: &[Compound]) -> bool {
        let Some((last, ancestors)) = compounds.split_last() else {
            return false;
        };
        if !self.matches_compound(node, last) {
            return false;
        }

        let mut remaining = ancestors;
        let mut cursor = self.parent_of(node);
        while let Some((wanted, rest)) = remaining.split_last() {
            let Some(candidate) = cursor else {
                return false;
            };
            if self.matches_compound(candidate, wanted) {
                remaining = rest;
            }
            cursor = self.parent_of(candidate);
        }

        true
    }

    fn matches_compound(&self, node: NodeId, compound: &Compound) -> bool {
        let nodes = self.nodes.borrow();
        let data = &nodes[node.0];

        if let Some(tag) = compound.tag.as_deref() {
            if !data.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        if let Some(id) = compound.id.as_deref() {
            if data.attributes.get("id").map(String::as_str) != Some(id) {
                return false;
            }
        }

        let classes: Vec<&str> = data
            .attributes
            .get("class")
            .map(|value| value.split_whitespace().collect())
            .unwrap_or_default();
        if !compound
            .classes
            .iter()
            .all(|class| classes.contains(&class.as_str()))
        {
            return false;
        }

        compound.attributes.iter().all(|(name, value)| {
            match (data.attributes.get(name), value) {
                (Some(actual), Some(expected)) => actual == expected,
                (Some(_), None) => true,
                (None, _) => false,
            }
        })
    }
}

#[derive(Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
}

impl Compound {
    fn parse(text: &str) -> Self {
        let mut compound = Self::default();
        let mut chars = text.chars().peekable();

        let tag = take_ident(&mut chars);
        if !tag.is_empty() && tag != "*" {
            compound.tag = Some(tag);
        }

        while let Some(marker) = chars.next() {
            match marker {
                '.' => compound.classes.push(take_ident(&mut chars)),
                '#' => compound.id = Some(take_ident(&mut chars)),
                '[' => {
                    let inner: String = chars.by_ref().take_while(|c| *c != ']').collect();
                    let attribute = match inner.split_once('=') {
                        Some((name, value)) => (
                            name.trim().to_string(),
                            Some(value.trim().trim_matches(['"', '\'']).to_string()),
                        ),
                        None => (inner.trim().to_string(), None),
                    };
                    compound.attributes.push(attribute);
                }
                _ => {}
            }
        }

        compound
    }
}

fn take_ident(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut ident = String::new();
    while let Some(&c) = chars.peek() {
        if matches!(c, '.' | '#' | '[') {
            break;
        }
        ident.push(c);
        chars.next();
    }
    ident
}

fn parse_css_text(css: &str) -> BTreeMap<String, String> {
    css.split(';')
        .filter_map(|declaration| declaration.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .filter(|(name, _)| !name.is_empty())
        .collect()
}

impl Page for MockPage {
    type Element = NodeId;

    fn query(&self, selector: &str) -> Option<NodeId> {
        self.query_all(selector).into_iter().next()
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        std::iter::once(ROOT)
            .chain(self.descendants(ROOT))
            .filter(|node| self.matches(*node, selector))
            .collect()
    }

    fn query_within(&self, root: &NodeId, selector: &str) -> Option<NodeId> {
        self.descendants(*root)
            .into_iter()
            .find(|node| self.matches(*node, selector))
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(ROOT).into_iter().find(|node| {
            self.nodes.borrow()[node.0].attributes.get("id").map(String::as_str) == Some(id)
        })
    }

    fn closest(&self, element: &NodeId, selector: &str) -> Option<NodeId> {
        let mut cursor = Some(*element);
        while let Some(node) = cursor {
            if self.matches(node, selector) {
                return Some(node);
            }
            cursor = self.parent_of(node);
        }
        None
    }

    fn body(&self) -> Option<NodeId> {
        Some(BODY)
    }

    fn head(&self) -> Option<NodeId> {
        Some(HEAD)
    }

    fn create_element(&self, tag: &str) -> Option<NodeId> {
        Some(self.push_node(tag))
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) {
        self.attach(*parent, *child);
    }

    fn remove(&self, element: &NodeId) {
        self.detach(*element);
    }

    fn is_attached(&self, element: &NodeId) -> bool {
        let mut cursor = Some(*element);
        while let Some(node) = cursor {
            if node == ROOT {
                return true;
            }
            cursor = self.parent_of(node);
        }
        false
    }

    fn set_text(&self, element: &NodeId, text: &str) {
        self.nodes.borrow_mut()[element.0].text = text.to_string();
    }

    fn inner_html(&self, element: &NodeId) -> String {
        self.nodes.borrow()[element.0].inner_html.clone()
    }

    fn set_inner_html(&self, element: &NodeId, html: &str) {
        self.nodes.borrow_mut()[element.0].inner_html = html.to_string();
    }

    fn attribute(&self, element: &NodeId, name: &str) -> Option<String> {
        self.nodes.borrow()[element.0].attributes.get(name).cloned()
    }

    fn set_attribute(&self, element: &NodeId, name: &str, value: &str) {
        self.nodes.borrow_mut()[element.0]
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn set_disabled(&self, element: &NodeId, disabled: bool) {
        self.nodes.borrow_mut()[element.0].disabled = disabled;
    }

    fn class_list(&self, element: &NodeId) -> Vec<String> {
        self.nodes.borrow()[element.0]
            .attributes
            .get("class")
            .map(|value| value.split_whitespace().map(ToString::to_string).collect())
            .unwrap_or_default()
    }

    fn set_class_name(&self, element: &NodeId, class_name: &str) {
        self.set_attribute(element, "class", class_name);
    }

    fn toggle_class(&self, element: &NodeId, class: &str, on: bool) {
        let mut classes = self.class_list(element);
        classes.retain(|value| value != class);
        if on {
            classes.push(class.to_string());
        }
        self.set_class_name(element, &classes.join(" "));
    }

    fn style(&self, element: &NodeId, property: &str) -> String {
        self.nodes.borrow()[element.0]
            .styles
            .get(property)
            .cloned()
            .unwrap_or_default()
    }

    fn set_style(&self, element: &NodeId, property: &str, value: &str) {
        let mut nodes = self.nodes.borrow_mut();
        let styles = &mut nodes[element.0].styles;
        if value.is_empty() {
            styles.remove(property);
        } else {
            styles.insert(property.to_string(), value.to_string());
        }
    }

    fn set_css_text(&self, element: &NodeId, css: &str) {
        self.nodes.borrow_mut()[element.0].styles = parse_css_text(css);
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y.get()
    }

    fn scroll_to(&self, y: f64) {
        self.scroll_y.set(y);
    }

    fn inner_width(&self) -> f64 {
        self.inner_width.get()
    }

    fn offset_top(&self, element: &NodeId) -> f64 {
        self.nodes.borrow()[element.0].offset_top
    }

    fn client_height(&self, element: &NodeId) -> f64 {
        self.nodes.borrow()[element.0].client_height
    }

    fn bounding_rect(&self, element: &NodeId) -> Rect {
        self.nodes.borrow()[element.0].rect
    }

    fn form_value(&self, form: &NodeId, name: &str) -> Option<String> {
        self.nodes.borrow()[form.0].form_values.get(name).cloned()
    }

    fn reset_form(&self, form: &NodeId) {
        for value in self.nodes.borrow_mut()[form.0].form_values.values_mut() {
            value.clear();
        }
    }

    fn listen(&self, target: Target<NodeId>, kind: EventKind, handler: Handler<NodeId>) {
        self.listeners.borrow_mut().push((target, kind, handler));
    }

    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        self.timers.borrow_mut().push(Timer {
            due: self.now_ms.get() + u64::from(delay_ms),
            seq,
            callback,
        });
    }

    fn request_animation_frame(&self, callback: Box<dyn FnOnce(f64)>) {
        self.frames.borrow_mut().push(callback);
    }

    fn observe_visibility_once(
        &self,
        elements: &[NodeId],
        options: VisibilityOptions,
        callback: Rc<dyn Fn(&NodeId)>,
    ) {
        let mut observations = self.observations.borrow_mut();
        for element in elements {
            observations.push(Observation {
                element: *element,
                options,
                callback: Rc::clone(&callback),
            });
        }
    }
}

mod tests {
    use super::*;

    #[test]
    fn descendant_and_attribute_selectors_match() {
        let page = MockPage::new();
        let nav = page.add(page.body_node(), "nav", &[]);
        let list = page.add(nav, "div", &[("class", "nav-links")]);
        let link = page.add(list, "a", &[("href", "#about")]);
        let stray = page.add(page.body_node(), "a", &[("href", "#x")]);
        let section = page.add(page.body_node(), "section", &[("id", "about")]);
        let anonymous = page.add(page.body_node(), "section", &[]);
        let home = page.add(page.body_node(), "main", &[("id", "home")]);

        assert_eq!(page.query_all("nav .nav-links a"), vec![link]);
        assert_eq!(page.query_all("section[id], main#home"), vec![section, home]);
        assert_eq!(page.query_all("a"), vec![link, stray]);
        assert!(!page.query_all("section[id]").contains(&anonymous));
    }

    #[test]
    fn stopped_propagation_skips_ancestors_and_document() {
        let page = MockPage::new();
        let outer = page.add(page.body_node(), "div", &[]);
        let inner = page.add(outer, "button", &[]);
        let hits = Rc::new(Cell::new(0));

        let counter = Rc::clone(&hits);
        page.listen(
            Target::Document,
            EventKind::Click,
            Rc::new(move |_: &PageEvent<NodeId>| counter.set(counter.get() + 1)),
        );
        page.listen(
            Target::Element(inner),
            EventKind::Click,
            Rc::new(|event: &PageEvent<NodeId>| event.stop_propagation()),
        );

        page.click(outer);
        page.click(inner);

        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn timers_fire_in_due_order_including_nested() {
        let page = MockPage::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&order);
        let nested_page = Rc::clone(&page);
        page.set_timeout(
            20,
            Box::new(move || {
                log.borrow_mut().push("a");
                let log = Rc::clone(&log);
                nested_page.set_timeout(5, Box::new(move || log.borrow_mut().push("c")));
            }),
        );
        let log = Rc::clone(&order);
        page.set_timeout(22, Box::new(move || log.borrow_mut().push("b")));

        page.advance(24);
        assert_eq!(*order.borrow(), vec!["a", "b"]);
        page.advance(1);
        assert_eq!(*order.borrow(), vec!["a", "b", "c"]);
    }
}
