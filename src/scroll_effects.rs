use crate::config::RuntimeConfig;
use crate::logging::Logger;
use crate::page::{EventKind, Page, PageEvent, Target, VisibilityOptions};
use crate::smooth_scroll::SmoothScroller;
use serde_json::json;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

const FADE_SELECTOR: &str = ".fade-in";
const PROFILE_SELECTOR: &str = ".profile-pic";
const HOME_TARGET: &str = "#home";

const FADE_OPTIONS: VisibilityOptions = VisibilityOptions {
    threshold: 0.1,
    root_margin: "0px 0px -50px 0px",
};

const SCROLL_TOP_STYLE: &str = "position: fixed; bottom: 80px; right: 20px; width: 50px; \
     height: 50px; border-radius: 50%; background-color: #6fb3a8; color: white; border: none; \
     cursor: pointer; display: none; z-index: 99; box-shadow: 0 2px 10px rgba(0,0,0,0.3); \
     transition: all 0.3s ease;";
const RESTING_SHADOW: &str = "0 2px 10px rgba(0,0,0,0.3)";
const RAISED_SHADOW: &str = "0 4px 15px rgba(0,0,0,0.4)";

pub fn parallax_offset(scroll_y: f64, rate: f64) -> f64 {
    scroll_y * rate + 0.0
}

pub struct ScrollEffects<P: Page> {
    page: Rc<P>,
    scroller: Rc<SmoothScroller<P>>,
    logger: Logger,
    parallax_rate: f64,
    parallax_min_width: f64,
    scroll_top_threshold: f64,
    scroll_top_button: RefCell<Option<P::Element>>,
}

impl<P: Page> ScrollEffects<P> {
    pub fn new(
        page: Rc<P>,
        scroller: Rc<SmoothScroller<P>>,
        config: &RuntimeConfig,
        logger: Logger,
    ) -> Rc<Self> {
        Rc::new(Self {
            page,
            scroller,
            logger,
            parallax_rate: config.parallax_rate,
            parallax_min_width: config.parallax_min_width,
            scroll_top_threshold: config.scroll_top_threshold,
            scroll_top_button: RefCell::new(None),
        })
    }

    pub fn install(self: &Rc<Self>) {
        self.install_fade_in();
        self.install_scroll_top_button();

        let effects: Weak<Self> = Rc::downgrade(self);
        self.page.listen(
            Target::Window,
            EventKind::Scroll,
            Rc::new(move |_: &PageEvent<P::Element>| {
                if let Some(effects) = effects.upgrade() {
                    effects.on_scroll();
                }
            }),
        );
    }

    pub fn scroll_top_button(&self) -> Option<P::Element> {
        self.scroll_top_button.borrow().clone()
    }

    pub fn on_scroll(&self) {
        let scroll_y = self.page.scroll_y();

        if self.page.inner_width() > self.parallax_min_width {
            if let Some(profile) = self.page.query(PROFILE_SELECTOR) {
                let offset = parallax_offset(scroll_y, self.parallax_rate);
                self.page.set_style(
                    &profile,
                    "transform",
                    &format!("translateY({offset}px) scale(1.05)"),
                );
            }
        }

        if let Some(button) = self.scroll_top_button() {
            if scroll_y > self.scroll_top_threshold {
                self.page.set_style(&button, "display", "flex");
                self.page.set_style(&button, "justify-content", "center");
                self.page.set_style(&button, "align-items", "center");
            } else {
                self.page.set_style(&button, "display", "none");
            }
        }
    }

    fn install_fade_in(&self) {
        let elements = self.page.query_all(FADE_SELECTOR);
        if elements.is_empty() {
            return;
        }

        for element in &elements {
            self.page.set_style(element, "opacity", "0");
            self.page.set_style(element, "transform", "translateY(20px)");
            self.page
                .set_style(element, "transition", "opacity 0.8s ease, transform 0.8s ease");
        }

        let page = Rc::downgrade(&self.page);
        self.page.observe_visibility_once(
            &elements,
            FADE_OPTIONS,
            Rc::new(move |element: &P::Element| {
                if let Some(page) = page.upgrade() {
                    page.set_style(element, "opacity", "1");
                    page.set_style(element, "transform", "translateY(0)");
                }
            }),
        );
    }

    fn install_scroll_top_button(self: &Rc<Self>) {
        let Some(body) = self.page.body() else {
            self.logger
                .debug("component_skipped", json!({ "component": "scroll_top", "missing": "body" }));
            return;
        };
        let Some(button) = self.page.create_element("button") else {
            return;
        };

        if let Some(icon) = self.page.create_element("i") {
            self.page.set_class_name(&icon, "fas fa-chevron-up");
            self.page.append_child(&button, &icon);
        }
        self.page.set_attribute(&button, "aria-label", "Scroll to top");
        self.page.set_css_text(&button, SCROLL_TOP_STYLE);

        for (kind, transform, shadow) in [
            (EventKind::MouseEnter, "translateY(-3px)", RAISED_SHADOW),
            (EventKind::MouseLeave, "translateY(0)", RESTING_SHADOW),
        ] {
            let page = Rc::downgrade(&self.page);
            let hovered = button.clone();
            self.page.listen(
                Target::Element(button.clone()),
                kind,
                Rc::new(move |_: &PageEvent<P::Element>| {
                    if let Some(page) = page.upgrade() {
                        page.set_style(&hovered, "transform", transform);
                        page.set_style(&hovered, "box-shadow", shadow);
                    }
                }),
            );
        }

        let scroller = Rc::downgrade(&self.scroller);
        self.page.listen(
            Target::Element(button.clone()),
            EventKind::Click,
            Rc::new(move |_: &PageEvent<P::Element>| {
                if let Some(scroller) = scroller.upgrade() {
                    scroller.scroll_to(HOME_TARGET);
                }
            }),
        );

        self.page.append_child(&body, &button);
        *self.scroll_top_button.borrow_mut() = Some(button);
    }
}
