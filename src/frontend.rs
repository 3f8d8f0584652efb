use crate::app::Portfolio;
use crate::page::{EventKind, Handler, Page, PageEvent, Rect, Target, VisibilityOptions};
use gloo::events::{EventListener, EventListenerOptions};
use gloo::timers::callback::Timeout;
use js_sys::Array;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    window, Document, Element, Event, EventTarget, FormData, HtmlElement,
    HtmlFormElement, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    KeyboardEvent, MouseEvent, Window,
};

type ObserverCallback = Closure<dyn FnMut(Array, IntersectionObserver)>;

thread_local! {
    static SESSION: RefCell<Option<Portfolio<DomPage>>> = const { RefCell::new(None) };
}

/// `Page` over the live document. Listeners and observers are owned here so
/// they stay registered for the whole session.
pub struct DomPage {
    window: Window,
    document: Document,
    listeners: RefCell<Vec<EventListener>>,
    observers: RefCell<Vec<(IntersectionObserver, ObserverCallback)>>,
}

impl DomPage {
    pub fn new() -> Option<Self> {
        let window = window()?;
        let document = window.document()?;

        Some(Self {
            window,
            document,
            listeners: RefCell::new(Vec::new()),
            observers: RefCell::new(Vec::new()),
        })
    }

    fn event_target(&self, target: Target<Element>) -> EventTarget {
        match target {
            Target::Window => self.window.clone().into(),
            Target::Document => self.document.clone().into(),
            Target::Element(element) => element.into(),
        }
    }
}

fn html_element(element: &Element) -> Option<&HtmlElement> {
    element.dyn_ref::<HtmlElement>()
}

fn page_event(event: &Event) -> PageEvent<Element> {
    let target = event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok());
    let mut page_event = PageEvent::new(target);

    if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
        page_event =
            page_event.with_pointer(f64::from(mouse.client_x()), f64::from(mouse.client_y()));
    }
    if let Some(keyboard) = event.dyn_ref::<KeyboardEvent>() {
        page_event = page_event.with_key(keyboard.key());
    }

    page_event
}

impl Page for DomPage {
    type Element = Element;

    fn query(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn query_all(&self, selector: &str) -> Vec<Element> {
        let Ok(nodes) = self.document.query_selector_all(selector) else {
            return Vec::new();
        };

        (0..nodes.length())
            .filter_map(|index| nodes.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn query_within(&self, root: &Element, selector: &str) -> Option<Element> {
        root.query_selector(selector).ok().flatten()
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn closest(&self, element: &Element, selector: &str) -> Option<Element> {
        element.closest(selector).ok().flatten()
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn head(&self) -> Option<Element> {
        self.document.head().map(Element::from)
    }

    fn create_element(&self, tag: &str) -> Option<Element> {
        self.document.create_element(tag).ok()
    }

    fn append_child(&self, parent: &Element, child: &Element) {
        let _ = parent.append_child(child);
    }

    fn remove(&self, element: &Element) {
        element.remove();
    }

    fn is_attached(&self, element: &Element) -> bool {
        element.is_connected()
    }

    fn set_text(&self, element: &Element, text: &str) {
        element.set_text_content(Some(text));
    }

    fn inner_html(&self, element: &Element) -> String {
        element.inner_html()
    }

    fn set_inner_html(&self, element: &Element, html: &str) {
        element.set_inner_html(html);
    }

    fn attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.get_attribute(name)
    }

    fn set_attribute(&self, element: &Element, name: &str, value: &str) {
        let _ = element.set_attribute(name, value);
    }

    fn set_disabled(&self, element: &Element, disabled: bool) {
        if disabled {
            let _ = element.set_attribute("disabled", "");
        } else {
            let _ = element.remove_attribute("disabled");
        }
    }

    fn class_list(&self, element: &Element) -> Vec<String> {
        let classes = element.class_list();
        (0..classes.length())
            .filter_map(|index| classes.item(index))
            .collect()
    }

    fn set_class_name(&self, element: &Element, class_name: &str) {
        element.set_class_name(class_name);
    }

    fn toggle_class(&self, element: &Element, class: &str, on: bool) {
        let _ = element.class_list().toggle_with_force(class, on);
    }

    fn style(&self, element: &Element, property: &str) -> String {
        html_element(element)
            .and_then(|html| html.style().get_property_value(property).ok())
            .unwrap_or_default()
    }

    fn set_style(&self, element: &Element, property: &str, value: &str) {
        let Some(html) = html_element(element) else {
            return;
        };

        let style = html.style();
        if value.is_empty() {
            let _ = style.remove_property(property);
        } else {
            let _ = style.set_property(property, value);
        }
    }

    fn set_css_text(&self, element: &Element, css: &str) {
        if let Some(html) = html_element(element) {
            html.style().set_css_text(css);
        }
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn scroll_to(&self, y: f64) {
        self.window.scroll_to_with_x_and_y(0.0, y);
    }

    fn inner_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or(0.0)
    }

    fn offset_top(&self, element: &Element) -> f64 {
        html_element(element)
            .map(|html| f64::from(html.offset_top()))
            .unwrap_or(0.0)
    }

    fn client_height(&self, element: &Element) -> f64 {
        f64::from(element.client_height())
    }

    fn bounding_rect(&self, element: &Element) -> Rect {
        let rect = element.get_bounding_client_rect();
        Rect {
            left: rect.left(),
            top: rect.top(),
            width: rect.width(),
            height: rect.height(),
        }
    }

    fn form_value(&self, form: &Element, name: &str) -> Option<String> {
        let form = form.dyn_ref::<HtmlFormElement>()?;
        FormData::new_with_form(form).ok()?.get(name).as_string()
    }

    fn reset_form(&self, form: &Element) {
        if let Some(form) = form.dyn_ref::<HtmlFormElement>() {
            form.reset();
        }
    }

    fn listen(&self, target: Target<Element>, kind: EventKind, handler: Handler<Element>) {
        let event_target = self.event_target(target);
        let listener = EventListener::new_with_options(
            &event_target,
            kind.as_str(),
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                let forwarded = page_event(event);
                handler(&forwarded);

                if forwarded.is_default_prevented() {
                    event.prevent_default();
                }
                if forwarded.is_propagation_stopped() {
                    event.stop_propagation();
                }
            },
        );

        self.listeners.borrow_mut().push(listener);
    }

    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) {
        Timeout::new(delay_ms, callback).forget();
    }

    fn request_animation_frame(&self, callback: Box<dyn FnOnce(f64)>) {
        let frame = Closure::once_into_js(move |timestamp: f64| callback(timestamp));
        let _ = self.window.request_animation_frame(frame.unchecked_ref());
    }

    fn observe_visibility_once(
        &self,
        elements: &[Element],
        options: VisibilityOptions,
        callback: Rc<dyn Fn(&Element)>,
    ) {
        let on_change = ObserverCallback::new(move |entries: Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                if !entry.is_intersecting() {
                    continue;
                }

                let target = entry.target();
                observer.unobserve(&target);
                callback(&target);
            }
        });

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        init.set_root_margin(options.root_margin);

        let Ok(observer) =
            IntersectionObserver::new_with_options(on_change.as_ref().unchecked_ref(), &init)
        else {
            return;
        };

        for element in elements {
            observer.observe(element);
        }
        self.observers.borrow_mut().push((observer, on_change));
    }
}

fn start(page: Rc<DomPage>) {
    let config = Portfolio::config_from_page(page.as_ref());
    let portfolio = Portfolio::start(page, &config);
    SESSION.with(|session| *session.borrow_mut() = Some(portfolio));
}

pub fn run() {
    let Some(page) = DomPage::new() else {
        return;
    };
    let page = Rc::new(page);

    if page.document.ready_state() == "loading" {
        let document = page.document.clone();
        EventListener::once(&document, "DOMContentLoaded", move |_| start(page)).forget();
    } else {
        start(page);
    }
}
