//! The slice of the host page the components are allowed to touch.
//!
//! `DomPage` (wasm32) backs this with `web-sys`; tests use `MockPage`.

use std::cell::Cell;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    MouseMove,
    MouseEnter,
    MouseLeave,
    KeyDown,
    Scroll,
    Submit,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::MouseMove => "mousemove",
            Self::MouseEnter => "mouseenter",
            Self::MouseLeave => "mouseleave",
            Self::KeyDown => "keydown",
            Self::Scroll => "scroll",
            Self::Submit => "submit",
        }
    }

    pub fn bubbles(self) -> bool {
        !matches!(self, Self::MouseEnter | Self::MouseLeave | Self::Scroll)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Target<E> {
    Window,
    Document,
    Element(E),
}

/// A dispatched event. Handlers flag propagation/default changes here and
/// the page applies them after the handler returns.
pub struct PageEvent<E> {
    target: Option<E>,
    client_x: f64,
    client_y: f64,
    key: Option<String>,
    propagation_stopped: Cell<bool>,
    default_prevented: Cell<bool>,
}

impl<E> PageEvent<E> {
    pub fn new(target: Option<E>) -> Self {
        Self {
            target,
            client_x: 0.0,
            client_y: 0.0,
            key: None,
            propagation_stopped: Cell::new(false),
            default_prevented: Cell::new(false),
        }
    }

    pub fn with_pointer(mut self, client_x: f64, client_y: f64) -> Self {
        self.client_x = client_x;
        self.client_y = client_y;
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn target(&self) -> Option<&E> {
        self.target.as_ref()
    }

    pub fn client_x(&self) -> f64 {
        self.client_x
    }

    pub fn client_y(&self) -> f64 {
        self.client_y
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

pub type Handler<E> = Rc<dyn Fn(&PageEvent<E>)>;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibilityOptions {
    pub threshold: f64,
    pub root_margin: &'static str,
}

pub trait Page: 'static {
    type Element: Clone + PartialEq + 'static;

    fn query(&self, selector: &str) -> Option<Self::Element>;
    fn query_all(&self, selector: &str) -> Vec<Self::Element>;
    fn query_within(&self, root: &Self::Element, selector: &str) -> Option<Self::Element>;
    fn element_by_id(&self, id: &str) -> Option<Self::Element>;
    fn closest(&self, element: &Self::Element, selector: &str) -> Option<Self::Element>;
    fn body(&self) -> Option<Self::Element>;
    fn head(&self) -> Option<Self::Element>;

    fn create_element(&self, tag: &str) -> Option<Self::Element>;
    fn append_child(&self, parent: &Self::Element, child: &Self::Element);
    fn remove(&self, element: &Self::Element);
    fn is_attached(&self, element: &Self::Element) -> bool;

    fn set_text(&self, element: &Self::Element, text: &str);
    fn inner_html(&self, element: &Self::Element) -> String;
    fn set_inner_html(&self, element: &Self::Element, html: &str);
    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;
    fn set_attribute(&self, element: &Self::Element, name: &str, value: &str);
    fn set_disabled(&self, element: &Self::Element, disabled: bool);

    fn class_list(&self, element: &Self::Element) -> Vec<String>;
    fn set_class_name(&self, element: &Self::Element, class_name: &str);
    fn toggle_class(&self, element: &Self::Element, class: &str, on: bool);

    fn has_class(&self, element: &Self::Element, class: &str) -> bool {
        self.class_list(element).iter().any(|value| value == class)
    }

    /// Reads an inline style property (CSS name, custom properties included).
    fn style(&self, element: &Self::Element, property: &str) -> String;
    fn set_style(&self, element: &Self::Element, property: &str, value: &str);
    fn set_css_text(&self, element: &Self::Element, css: &str);

    fn scroll_y(&self) -> f64;
    fn scroll_to(&self, y: f64);
    fn inner_width(&self) -> f64;
    fn offset_top(&self, element: &Self::Element) -> f64;
    fn client_height(&self, element: &Self::Element) -> f64;
    fn bounding_rect(&self, element: &Self::Element) -> Rect;

    fn form_value(&self, form: &Self::Element, name: &str) -> Option<String>;
    fn reset_form(&self, form: &Self::Element);

    fn listen(&self, target: Target<Self::Element>, kind: EventKind, handler: Handler<Self::Element>);
    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>);
    /// The callback receives a monotonic timestamp in milliseconds.
    fn request_animation_frame(&self, callback: Box<dyn FnOnce(f64)>);
    /// Calls `callback` the first time each element becomes visible, then
    /// stops watching that element.
    fn observe_visibility_once(
        &self,
        elements: &[Self::Element],
        options: VisibilityOptions,
        callback: Rc<dyn Fn(&Self::Element)>,
    );
}
