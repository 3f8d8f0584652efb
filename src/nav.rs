use crate::config::RuntimeConfig;
use crate::logging::Logger;
use crate::page::{EventKind, Page, PageEvent, Target};
use crate::smooth_scroll::SmoothScroller;
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

const LINK_SELECTOR: &str = "nav .nav-links a";
const SECTION_SELECTOR: &str = "section[id], main#home";
const START_BUTTON_ID: &str = "start-btn";
const START_TARGET: &str = "#skills";
const ACTIVE_CLASS: &str = "active";

#[derive(Clone, Debug, PartialEq)]
pub struct SectionBounds {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

/// Last section (document order) whose `[top, top + height)` contains
/// `scroll_y + lookahead`.
pub fn active_section(scroll_y: f64, lookahead: f64, sections: &[SectionBounds]) -> Option<&str> {
    let position = scroll_y + lookahead;
    sections
        .iter()
        .filter(|section| position >= section.top && position < section.top + section.height)
        .last()
        .map(|section| section.id.as_str())
}

pub struct NavController<P: Page> {
    page: Rc<P>,
    scroller: Rc<SmoothScroller<P>>,
    logger: Logger,
    lookahead: f64,
    debounce_ms: u32,
    links: Vec<P::Element>,
    sections: Vec<P::Element>,
    scrolling: Cell<bool>,
    scroll_generation: Cell<u64>,
    current_section: RefCell<Option<String>>,
}

impl<P: Page> NavController<P> {
    pub fn new(
        page: Rc<P>,
        scroller: Rc<SmoothScroller<P>>,
        config: &RuntimeConfig,
        logger: Logger,
    ) -> Rc<Self> {
        let links = page.query_all(LINK_SELECTOR);
        let sections = page.query_all(SECTION_SELECTOR);

        Rc::new(Self {
            page,
            scroller,
            logger,
            lookahead: config.nav_lookahead,
            debounce_ms: config.scroll_debounce_ms,
            links,
            sections,
            scrolling: Cell::new(false),
            scroll_generation: Cell::new(0),
            current_section: RefCell::new(None),
        })
    }

    pub fn install(self: &Rc<Self>) {
        for link in &self.links {
            let nav = Rc::downgrade(self);
            let clicked = link.clone();
            self.page.listen(
                Target::Element(link.clone()),
                EventKind::Click,
                Rc::new(move |event: &PageEvent<P::Element>| {
                    if let Some(nav) = nav.upgrade() {
                        event.prevent_default();
                        nav.follow_link(&clicked);
                    }
                }),
            );
        }

        if let Some(start) = self.page.element_by_id(START_BUTTON_ID) {
            let scroller = Rc::downgrade(&self.scroller);
            self.page.listen(
                Target::Element(start),
                EventKind::Click,
                Rc::new(move |_: &PageEvent<P::Element>| {
                    if let Some(scroller) = scroller.upgrade() {
                        scroller.scroll_to(START_TARGET);
                    }
                }),
            );
        } else {
            self.logger
                .debug("component_skipped", json!({ "component": "start_button" }));
        }

        let nav: Weak<Self> = Rc::downgrade(self);
        self.page.listen(
            Target::Window,
            EventKind::Scroll,
            Rc::new(move |_: &PageEvent<P::Element>| {
                if let Some(nav) = nav.upgrade() {
                    nav.on_scroll();
                }
            }),
        );

        self.refresh_active_link();
    }

    pub fn is_scrolling(&self) -> bool {
        self.scrolling.get()
    }

    /// Marks the burst as in progress; the recomputation runs once the
    /// debounce window passes with no newer scroll event.
    pub fn on_scroll(self: &Rc<Self>) {
        self.scrolling.set(true);
        let generation = self.scroll_generation.get().wrapping_add(1);
        self.scroll_generation.set(generation);

        let nav = Rc::clone(self);
        self.page.set_timeout(
            self.debounce_ms,
            Box::new(move || {
                if nav.scroll_generation.get() != generation {
                    return;
                }
                nav.scrolling.set(false);
                nav.refresh_active_link();
            }),
        );
    }

    pub fn refresh_active_link(&self) {
        if self.scrolling.get() {
            return;
        }

        let bounds: Vec<SectionBounds> = self
            .sections
            .iter()
            .filter_map(|section| {
                Some(SectionBounds {
                    id: self.page.attribute(section, "id")?,
                    top: self.page.offset_top(section),
                    height: self.page.client_height(section),
                })
            })
            .collect();
        let current = active_section(self.page.scroll_y(), self.lookahead, &bounds).map(str::to_string);
        let wanted_href = current.as_ref().map(|id| format!("#{id}"));

        for link in &self.links {
            let is_active = wanted_href.is_some()
                && self.page.attribute(link, "href") == wanted_href;
            self.page.toggle_class(link, ACTIVE_CLASS, is_active);
        }

        let mut previous = self.current_section.borrow_mut();
        if *previous != current {
            self.logger
                .debug("nav_section_changed", json!({ "section": current }));
            *previous = current;
        }
    }

    fn follow_link(&self, link: &P::Element) {
        if let Some(href) = self.page.attribute(link, "href") {
            self.scroller.scroll_to(&href);
        }

        for other in &self.links {
            self.page.toggle_class(other, ACTIVE_CLASS, other == link);
        }
    }
}
